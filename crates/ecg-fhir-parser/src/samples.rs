use crate::errors::{ParserError, RejectedRow};
use crate::header::strip_bom;
use crate::model::{ExtractOptions, RowPolicy, Sample, SampleExtraction};

const DELIMITER: char = '\t';
const COMMENT_MARKER: char = '#';

/// Reads every non-comment line as tab-separated columns and keeps the rows
/// wide enough to contain the signal column.
pub fn extract_samples(
    content: &str,
    options: &ExtractOptions,
) -> Result<SampleExtraction, ParserError> {
    let mut extraction = SampleExtraction::default();

    for (row_index, line) in strip_bom(content).lines().enumerate() {
        let line_index = row_index + 1;
        if line.starts_with(COMMENT_MARKER) || line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
        if fields.len() <= options.signal_column {
            extraction.short_rows += 1;
            continue;
        }

        match parse_row(&fields, line_index, options) {
            Ok(sample) => extraction.samples.push(sample),
            Err(err) => match options.row_policy {
                RowPolicy::Abort => return Err(err),
                RowPolicy::Skip => extraction
                    .rejected
                    .push(RejectedRow::new(line_index, err.to_string())),
            },
        }
    }

    Ok(extraction)
}

fn parse_row(
    fields: &[&str],
    line_index: usize,
    options: &ExtractOptions,
) -> Result<Sample, ParserError> {
    let value = parse_f64(fields, options.signal_column, line_index)?
        .ok_or_else(|| ParserError::MalformedRow {
            line_index,
            column: options.signal_column,
            message: "signal column is empty".to_string(),
        })?;
    let sequence = parse_f64(fields, options.sequence_column, line_index)?;

    Ok(Sample {
        line_index,
        sequence,
        value,
    })
}

fn parse_f64(
    fields: &[&str],
    column: usize,
    line_index: usize,
) -> Result<Option<f64>, ParserError> {
    let Some(raw) = fields.get(column).copied().filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let parsed = raw.parse::<f64>().map_err(|err| ParserError::MalformedRow {
        line_index,
        column,
        message: format!("failed to parse '{raw}' as float: {err}"),
    })?;
    if !parsed.is_finite() {
        return Err(ParserError::MalformedRow {
            line_index,
            column,
            message: format!("'{raw}' is not a finite number"),
        });
    }
    Ok(Some(parsed))
}
