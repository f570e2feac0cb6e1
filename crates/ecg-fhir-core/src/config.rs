use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use ecg_fhir_parser::{ExtractOptions, RowPolicy};
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};
use crate::timestamps::parse_datetime;

pub const DEFAULT_INPUT_DIR: &str = "data";
pub const DEFAULT_OUTPUT_PATH: &str = "output/fhir_observations.json";
pub const DEFAULT_SAMPLING_RATE: f64 = 100.0;
pub const DEFAULT_FALLBACK_START: &str = "2024-01-01 00:00:00.000000";

/// Whether a recording must carry usable header metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataMode {
    #[default]
    Strict,
    /// Missing metadata falls back to the configured rate and start time.
    Lenient,
}

impl MetadataMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataMode::Strict => "strict",
            MetadataMode::Lenient => "lenient",
        }
    }
}

impl fmt::Display for MetadataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MetadataMode {
    type Error = String;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(MetadataMode::Strict),
            "lenient" | "fallback" => Ok(MetadataMode::Lenient),
            other => Err(format!("unknown metadata mode '{other}'")),
        }
    }
}

/// Source of each observation's `id` and time offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierSource {
    /// Position among the retained rows, starting at 0.
    #[default]
    Position,
    /// The row's own sequence-number column.
    Sequence,
}

impl IdentifierSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierSource::Position => "position",
            IdentifierSource::Sequence => "sequence",
        }
    }
}

impl fmt::Display for IdentifierSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for IdentifierSource {
    type Error = String;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "position" | "index" | "row" => Ok(IdentifierSource::Position),
            "sequence" | "seq" | "nseq" => Ok(IdentifierSource::Sequence),
            other => Err(format!("unknown identifier source '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    /// Searched for the first `.txt` file when `input_path` is unset.
    pub input_dir: PathBuf,
    pub input_path: Option<PathBuf>,
    pub output_path: PathBuf,
    pub default_sampling_rate: f64,
    pub fallback_start_time: String,
    pub metadata_mode: MetadataMode,
    pub include_sampling_rate: bool,
    pub identifier: IdentifierSource,
    pub malformed_rows: RowPolicy,
    /// Header device key; the first device listed when unset.
    pub device: Option<String>,
    pub signal_column: usize,
    pub sequence_column: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            input_path: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            default_sampling_rate: DEFAULT_SAMPLING_RATE,
            fallback_start_time: DEFAULT_FALLBACK_START.to_string(),
            metadata_mode: MetadataMode::default(),
            include_sampling_rate: true,
            identifier: IdentifierSource::default(),
            malformed_rows: RowPolicy::default(),
            device: None,
            signal_column: ExtractOptions::DEFAULT_SIGNAL_COLUMN,
            sequence_column: ExtractOptions::DEFAULT_SEQUENCE_COLUMN,
        }
    }
}

impl ConverterConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str::<ConverterConfig>(toml_str)?)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(ConvertError::io(path))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.default_sampling_rate.is_finite() || self.default_sampling_rate <= 0.0 {
            return Err(ConvertError::InvalidSamplingRate(self.default_sampling_rate));
        }
        self.fallback_start()?;
        if self.signal_column == self.sequence_column {
            return Err(ConvertError::Config(format!(
                "signal and sequence columns must differ (both {})",
                self.signal_column
            )));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(ConvertError::Config("output path is empty".to_string()));
        }
        Ok(())
    }

    pub fn fallback_start(&self) -> Result<NaiveDateTime> {
        parse_datetime(&self.fallback_start_time)
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            signal_column: self.signal_column,
            sequence_column: self.sequence_column,
            row_policy: self.malformed_rows,
        }
    }
}
