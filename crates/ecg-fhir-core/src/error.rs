// crates/ecg-fhir-core/src/error.rs

use std::path::PathBuf;

use ecg_fhir_parser::ParserError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("no .txt input file found in '{}'", dir.display())]
    NoInputFile { dir: PathBuf },

    #[error("recording metadata missing in '{}': {reason}", path.display())]
    MetadataMissing { path: PathBuf, reason: String },

    #[error("failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParserError,
    },

    #[error("file I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid timestamp '{value}': {message}")]
    InvalidTimestamp { value: String, message: String },

    #[error("sampling rate {0} must be a positive number")]
    InvalidSamplingRate(f64),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to parse configuration TOML: {0}")]
    ConfigToml(#[from] toml::de::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input search pattern: {0}")]
    Glob(#[from] glob::PatternError),
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| ConvertError::Io { path, source }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
