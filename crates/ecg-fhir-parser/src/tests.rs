use std::fs;
use std::path::PathBuf;

use crate::errors::ParserError;
use crate::model::{ExtractOptions, RecordingMetadata, RowPolicy};
use crate::{extract_samples, parse_header, parse_recording};

fn fixture(path: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let full_path = base.join("tests/data").join(path);
    fs::read_to_string(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

#[test]
fn parses_opensignals_header() {
    let content = fixture("opensignals_ecg.txt");
    let header = parse_header(&content);

    assert_eq!(header.comment_lines, 3);
    let metadata = header
        .recording_metadata(None)
        .expect("metadata should resolve");

    assert_eq!(metadata.device_id, "98:D3:21:FC:8B:12");
    assert_eq!(metadata.sampling_rate, 1000.0);
    assert_eq!(metadata.date, "2024-11-5");
    assert_eq!(metadata.time, "10:37:21.394");
    assert_eq!(metadata.device_name.as_deref(), Some("98:D3:21:FC:8B:12"));
    assert_eq!(metadata.columns.len(), 7);
    assert_eq!(metadata.columns[6], "A2");
    assert_eq!(metadata.labels, vec!["A1", "A2"]);
}

#[test]
fn extracts_signal_column_in_row_order() {
    let content = fixture("opensignals_ecg.txt");
    let parsed = parse_recording(&content, &ExtractOptions::default()).expect("parse failed");

    let values: Vec<f64> = parsed.samples.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![0.125, 0.131, -0.042, 1.25, 0.5]);

    let sequences: Vec<Option<f64>> = parsed.samples.iter().map(|s| s.sequence).collect();
    assert_eq!(
        sequences,
        vec![Some(0.0), Some(1.0), Some(2.0), Some(3.0), Some(4.0)]
    );
    assert_eq!(parsed.samples[0].line_index, 4);
    assert_eq!(parsed.short_rows, 0);
    assert!(parsed.rejected.is_empty());
}

#[test]
fn header_without_json_has_no_metadata() {
    let content = fixture("no_metadata.txt");
    let header = parse_header(&content);

    assert_eq!(header.comment_lines, 2);
    assert!(!header.has_metadata());
    let err = header.recording_metadata(None).unwrap_err();
    assert!(matches!(err, ParserError::MetadataMissing { .. }));
}

#[test]
fn short_rows_are_skipped_silently() {
    let content = fixture("no_metadata.txt");
    let extraction = extract_samples(&content, &ExtractOptions::default()).expect("extract");

    assert_eq!(extraction.samples.len(), 3);
    assert_eq!(extraction.short_rows, 1);
    assert_eq!(extraction.samples[2].sequence, Some(13.0));
    assert_eq!(extraction.samples[2].value, 0.4);
}

#[test]
fn malformed_row_aborts_by_default() {
    let content = fixture("malformed_row.txt");
    let err = extract_samples(&content, &ExtractOptions::default()).unwrap_err();

    match err {
        ParserError::MalformedRow {
            line_index, column, ..
        } => {
            assert_eq!(line_index, 3);
            assert_eq!(column, 6);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_row_is_recorded_when_skipping() {
    let content = fixture("malformed_row.txt");
    let options = ExtractOptions {
        row_policy: RowPolicy::Skip,
        ..ExtractOptions::default()
    };
    let extraction = extract_samples(&content, &options).expect("extract");

    let values: Vec<f64> = extraction.samples.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![1.25, -0.5]);
    assert_eq!(extraction.rejected.len(), 1);
    assert_eq!(extraction.rejected[0].line_index, 3);
    assert!(extraction.rejected[0].message.contains("bad"));
}

#[test]
fn comment_only_input_yields_no_samples() {
    let content = "# {\"D\": {\"sampling rate\": 10, \"date\": \"2024-01-01\", \"time\": \"00:00:00.0\"}}\n# EndOfHeader\n";
    let parsed = parse_recording(content, &ExtractOptions::default()).expect("parse");

    assert!(parsed.header.has_metadata());
    assert!(parsed.samples.is_empty());
}

#[test]
fn metadata_after_body_is_ignored() {
    let content = "0\t0\t0\t0\t0\t0\t1.0\n# {\"D\": {\"sampling rate\": 10}}\n1\t0\t0\t0\t0\t0\t2.0\n";
    let parsed = parse_recording(content, &ExtractOptions::default()).expect("parse");

    assert!(!parsed.header.has_metadata());
    assert_eq!(parsed.header.comment_lines, 0);
    assert_eq!(parsed.samples.len(), 2);
}

#[test]
fn first_json_comment_wins() {
    let content = "# not json\n# {broken\n# {\"A\": {\"sampling rate\": 250, \"date\": \"2024-02-02\", \"time\": \"01:02:03.5\"}}\n# {\"B\": {}}\n";
    let header = parse_header(content);

    let metadata = header.recording_metadata(None).expect("metadata");
    assert_eq!(metadata.device_id, "A");
    assert_eq!(metadata.sampling_rate, 250.0);
    assert_eq!(header.comment_lines, 4);
}

#[test]
fn selects_requested_device() {
    let content = "# {\"A\": {\"sampling rate\": 250, \"date\": \"2024-02-02\", \"time\": \"01:02:03\"}, \"B\": {\"sampling rate\": 500, \"date\": \"2024-03-03\", \"time\": \"04:05:06\"}}\n";
    let header = parse_header(content);

    let metadata = header.recording_metadata(Some("B")).expect("device B");
    assert_eq!(metadata.sampling_rate, 500.0);
    assert_eq!(metadata.date, "2024-03-03");

    let err = header.recording_metadata(Some("C")).unwrap_err();
    assert!(err.to_string().contains("device 'C'"));
}

#[test]
fn rejects_unusable_sampling_rate() {
    let map = serde_json::json!({
        "DEV": {"sampling rate": 0, "date": "2024-01-01", "time": "00:00:00"}
    });
    let map = map.as_object().expect("object").clone();

    let err = RecordingMetadata::from_header(&map, None).unwrap_err();
    assert!(err.to_string().contains("not positive"));
}

#[test]
fn missing_time_is_reported() {
    let map = serde_json::json!({"DEV": {"sampling rate": 100, "date": "2024-01-01"}});
    let map = map.as_object().expect("object").clone();

    let err = RecordingMetadata::from_header(&map, None).unwrap_err();
    assert!(err.to_string().contains("has no time"));
}

#[test]
fn handles_crlf_and_bom() {
    let content = "\u{feff}# {\"D\": {\"sampling rate\": 100, \"date\": \"2024-01-01\", \"time\": \"00:00:00\"}}\r\n0\t0\t0\t0\t0\t0\t3.5\r\n";
    let parsed = parse_recording(content, &ExtractOptions::default()).expect("parse");

    assert!(parsed.header.has_metadata());
    assert_eq!(parsed.samples.len(), 1);
    assert_eq!(parsed.samples[0].value, 3.5);
}

#[test]
fn custom_signal_column() {
    let content = "0\t7\t1.5\n1\t8\n";
    let options = ExtractOptions {
        signal_column: 2,
        ..ExtractOptions::default()
    };
    let extraction = extract_samples(content, &options).expect("extract");

    assert_eq!(extraction.samples.len(), 1);
    assert_eq!(extraction.samples[0].value, 1.5);
    assert_eq!(extraction.short_rows, 1);
}

#[test]
fn row_policy_from_str() {
    assert_eq!(RowPolicy::try_from("Skip").unwrap(), RowPolicy::Skip);
    assert_eq!(RowPolicy::try_from("abort").unwrap(), RowPolicy::Abort);
    assert!(RowPolicy::try_from("maybe").is_err());
}

#[test]
fn malformed_first_row_reports_its_file_line() {
    let content = "# a\n# b\n# c\n0\t0\t0\t0\t0\t0\tbad\n";
    let err = extract_samples(content, &ExtractOptions::default()).unwrap_err();

    assert!(err.to_string().starts_with("data row 4 invalid in column 6"));
}

#[test]
fn line_numbers_count_blank_and_inline_comment_lines() {
    let content = "# header\n\n0\t0\t0\t0\t0\t0\t1.0\n# note\n\n1\t0\t0\t0\t0\t0\t2.0\n";
    let extraction = extract_samples(content, &ExtractOptions::default()).expect("extract");

    let lines: Vec<usize> = extraction.samples.iter().map(|s| s.line_index).collect();
    assert_eq!(lines, vec![3, 6]);
    assert_eq!(extraction.short_rows, 0);
}

#[test]
fn non_finite_signal_values_are_malformed() {
    for raw in ["inf", "NaN", "-infinity", "1e400"] {
        let content = format!("0\t0\t0\t0\t0\t0\t{raw}\n");
        let err = extract_samples(&content, &ExtractOptions::default()).unwrap_err();

        match err {
            ParserError::MalformedRow {
                line_index,
                column,
                message,
            } => {
                assert_eq!(line_index, 1);
                assert_eq!(column, 6);
                assert!(message.contains("not a finite number"), "{raw}: {message}");
            }
            other => panic!("unexpected error for {raw}: {other}"),
        }
    }
}

#[test]
fn non_finite_sequence_numbers_are_malformed() {
    let content = "NaN\t0\t0\t0\t0\t0\t1.0\n1\t0\t0\t0\t0\t0\t2.0\n";
    let err = extract_samples(content, &ExtractOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        ParserError::MalformedRow {
            line_index: 1,
            column: 0,
            ..
        }
    ));

    let options = ExtractOptions {
        row_policy: RowPolicy::Skip,
        ..ExtractOptions::default()
    };
    let extraction = extract_samples(content, &options).expect("extract");
    assert_eq!(extraction.samples.len(), 1);
    assert_eq!(extraction.samples[0].value, 2.0);
    assert_eq!(extraction.rejected.len(), 1);
    assert_eq!(extraction.rejected[0].line_index, 1);
}
