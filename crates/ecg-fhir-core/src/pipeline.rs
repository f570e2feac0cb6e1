use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use ecg_fhir_parser::{parse_recording, ParserError, RecordingHeader, RowPolicy, Sample};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{ConverterConfig, IdentifierSource, MetadataMode};
use crate::discovery::resolve_input;
use crate::error::{ConvertError, Result};
use crate::observation::Observation;
use crate::outputs::write_observations;
use crate::timestamps::{format_effective, parse_start_time, SampleClock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingSource {
    Header,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionSummary {
    pub timing_source: TimingSource,
    pub device_id: Option<String>,
    pub sampling_rate: f64,
    pub start: NaiveDateTime,
    pub observations: usize,
    pub short_rows: usize,
    pub rejected_rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub observations: Vec<Observation>,
    pub summary: ConversionSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub summary: ConversionSummary,
}

struct Timing {
    clock: SampleClock,
    source: TimingSource,
    device_id: Option<String>,
}

/// Converts one recording held in memory. `source` only labels errors.
pub fn build_observations(
    content: &str,
    source: &Path,
    config: &ConverterConfig,
) -> Result<Conversion> {
    let parsed = parse_recording(content, &config.extract_options()).map_err(|err| {
        ConvertError::Parse {
            path: source.to_path_buf(),
            source: err,
        }
    })?;

    let timing = resolve_timing(&parsed.header, source, config)?;
    let clock = timing.clock;

    for rejected in &parsed.rejected {
        warn!(input = %source.display(), "skipping malformed row {rejected}");
    }
    let mut rejected_rows = parsed.rejected.len();

    let sampling_rate = config.include_sampling_rate.then_some(clock.sampling_rate());
    let mut observations = Vec::with_capacity(parsed.samples.len());
    let mut previous_offset: Option<f64> = None;
    let mut out_of_order = 0usize;

    for sample in &parsed.samples {
        let offset = match sample_offset(sample, observations.len(), config) {
            Ok(offset) => offset,
            Err(err) if config.malformed_rows == RowPolicy::Skip => {
                warn!(input = %source.display(), "skipping malformed row: {err}");
                rejected_rows += 1;
                continue;
            }
            Err(err) => {
                return Err(ConvertError::Parse {
                    path: source.to_path_buf(),
                    source: err,
                })
            }
        };

        if previous_offset.is_some_and(|prev| offset <= prev) {
            out_of_order += 1;
        }
        previous_offset = Some(offset);

        let effective = format_effective(&clock.at(offset)?);
        observations.push(Observation::ecg(
            format_offset(offset),
            effective,
            sample.value,
            sampling_rate,
        ));
    }

    if out_of_order > 0 {
        warn!(
            input = %source.display(),
            rows = out_of_order,
            "sequence numbers are not strictly increasing; timestamps and ids may repeat"
        );
    }

    let summary = ConversionSummary {
        timing_source: timing.source,
        device_id: timing.device_id,
        sampling_rate: clock.sampling_rate(),
        start: clock.start(),
        observations: observations.len(),
        short_rows: parsed.short_rows,
        rejected_rows,
    };

    Ok(Conversion {
        observations,
        summary,
    })
}

/// Resolves the input, converts it and writes the output file.
pub fn run(config: &ConverterConfig) -> Result<ConversionReport> {
    config.validate()?;

    let input = resolve_input(config)?;
    info!(input = %input.display(), "converting recording");

    let content = fs::read_to_string(&input).map_err(ConvertError::io(&input))?;
    let conversion = build_observations(&content, &input, config)?;

    write_observations(&config.output_path, &conversion.observations)?;
    info!(
        output = %config.output_path.display(),
        observations = conversion.summary.observations,
        sampling_rate = conversion.summary.sampling_rate,
        "FHIR observations written"
    );

    Ok(ConversionReport {
        input,
        output: config.output_path.clone(),
        summary: conversion.summary,
    })
}

fn resolve_timing(
    header: &RecordingHeader,
    source: &Path,
    config: &ConverterConfig,
) -> Result<Timing> {
    match header_timing(header, config) {
        Ok(timing) => Ok(timing),
        Err(reason) => match config.metadata_mode {
            MetadataMode::Strict => Err(ConvertError::MetadataMissing {
                path: source.to_path_buf(),
                reason,
            }),
            MetadataMode::Lenient => {
                warn!(
                    input = %source.display(),
                    sampling_rate = config.default_sampling_rate,
                    start = %config.fallback_start_time,
                    "header metadata unavailable ({reason}); using defaults"
                );
                Ok(Timing {
                    clock: SampleClock::new(config.fallback_start()?, config.default_sampling_rate)?,
                    source: TimingSource::Fallback,
                    device_id: None,
                })
            }
        },
    }
}

fn header_timing(
    header: &RecordingHeader,
    config: &ConverterConfig,
) -> std::result::Result<Timing, String> {
    let metadata = header
        .recording_metadata(config.device.as_deref())
        .map_err(|err| match err {
            ParserError::MetadataMissing { reason } => reason,
            other => other.to_string(),
        })?;
    let start = parse_start_time(&metadata.date, &metadata.time).map_err(|err| err.to_string())?;
    let clock = SampleClock::new(start, metadata.sampling_rate).map_err(|err| err.to_string())?;

    Ok(Timing {
        clock,
        source: TimingSource::Header,
        device_id: Some(metadata.device_id),
    })
}

fn sample_offset(
    sample: &Sample,
    position: usize,
    config: &ConverterConfig,
) -> std::result::Result<f64, ParserError> {
    match config.identifier {
        IdentifierSource::Position => Ok(position as f64),
        IdentifierSource::Sequence => sample.sequence.ok_or_else(|| ParserError::MalformedRow {
            line_index: sample.line_index,
            column: config.sequence_column,
            message: "sequence number column is empty".to_string(),
        }),
    }
}

// f64 Display drops the fraction of integral values, so 12.0 prints as "12".
fn format_offset(offset: f64) -> String {
    offset.to_string()
}
