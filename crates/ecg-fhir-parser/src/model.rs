use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ParserError, RejectedRow};

/// What to do with a retained row whose numeric columns do not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    #[default]
    Abort,
    Skip,
}

impl RowPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowPolicy::Abort => "abort",
            RowPolicy::Skip => "skip",
        }
    }
}

impl fmt::Display for RowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for RowPolicy {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "abort" | "strict" => Ok(RowPolicy::Abort),
            "skip" | "lenient" => Ok(RowPolicy::Skip),
            other => Err(format!("unknown malformed row policy '{other}'")),
        }
    }
}

/// Column layout of the tab-separated body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub signal_column: usize,
    pub sequence_column: usize,
    pub row_policy: RowPolicy,
}

impl ExtractOptions {
    /// OpenSignals exports put `nSeq` first and the ECG channel (A2) seventh.
    pub const DEFAULT_SIGNAL_COLUMN: usize = 6;
    pub const DEFAULT_SEQUENCE_COLUMN: usize = 0;
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            signal_column: Self::DEFAULT_SIGNAL_COLUMN,
            sequence_column: Self::DEFAULT_SEQUENCE_COLUMN,
            row_policy: RowPolicy::Abort,
        }
    }
}

/// Leading `#` block of a recording.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingHeader {
    pub metadata: Option<Map<String, Value>>,
    pub comment_lines: usize,
}

impl RecordingHeader {
    pub fn has_metadata(&self) -> bool {
        self.metadata.is_some()
    }

    /// Resolves the device entry, see [`RecordingMetadata::from_header`].
    pub fn recording_metadata(&self, device: Option<&str>) -> Result<RecordingMetadata, ParserError> {
        let map = self
            .metadata
            .as_ref()
            .ok_or_else(|| ParserError::metadata_missing("no JSON object in header comments"))?;
        RecordingMetadata::from_header(map, device)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct DeviceEntry {
    #[serde(rename = "sampling rate")]
    sampling_rate: Option<f64>,
    date: Option<String>,
    time: Option<String>,
    #[serde(rename = "device name")]
    device_name: Option<String>,
    #[serde(default)]
    column: Vec<String>,
    #[serde(default)]
    label: Vec<String>,
    #[serde(default)]
    sensor: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub device_id: String,
    pub sampling_rate: f64,
    pub date: String,
    pub time: String,
    pub device_name: Option<String>,
    pub columns: Vec<String>,
    pub labels: Vec<String>,
    pub sensors: Vec<String>,
}

impl RecordingMetadata {
    /// Picks `device` from the header mapping, or the first device listed when
    /// none is requested, and validates the fields needed for timing.
    pub fn from_header(
        header: &Map<String, Value>,
        device: Option<&str>,
    ) -> Result<Self, ParserError> {
        let (device_id, raw) = match device {
            Some(id) => header
                .get(id)
                .map(|raw| (id, raw))
                .ok_or_else(|| ParserError::metadata_missing(format!("device '{id}' not in header")))?,
            None => header
                .iter()
                .next()
                .map(|(id, raw)| (id.as_str(), raw))
                .ok_or_else(|| ParserError::metadata_missing("header JSON lists no devices"))?,
        };

        let entry: DeviceEntry = serde_json::from_value(raw.clone()).map_err(|err| {
            ParserError::metadata_missing(format!("device '{device_id}' entry invalid: {err}"))
        })?;

        let sampling_rate = entry.sampling_rate.ok_or_else(|| {
            ParserError::metadata_missing(format!("device '{device_id}' has no sampling rate"))
        })?;
        if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
            return Err(ParserError::metadata_missing(format!(
                "device '{device_id}' sampling rate {sampling_rate} is not positive"
            )));
        }

        let date = non_empty(entry.date).ok_or_else(|| {
            ParserError::metadata_missing(format!("device '{device_id}' has no date"))
        })?;
        let time = non_empty(entry.time).ok_or_else(|| {
            ParserError::metadata_missing(format!("device '{device_id}' has no time"))
        })?;

        Ok(Self {
            device_id: device_id.to_string(),
            sampling_rate,
            date,
            time,
            device_name: non_empty(entry.device_name),
            columns: entry.column,
            labels: entry.label,
            sensors: entry.sensor,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// 1-based line number in the source text.
    pub line_index: usize,
    pub sequence: Option<f64>,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleExtraction {
    pub samples: Vec<Sample>,
    /// Rows with too few columns to hold the signal.
    pub short_rows: usize,
    pub rejected: Vec<RejectedRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecording {
    pub header: RecordingHeader,
    pub samples: Vec<Sample>,
    pub short_rows: usize,
    pub rejected: Vec<RejectedRow>,
}
