use std::fmt;

use thiserror::Error;

/// A body row dropped under [`RowPolicy::Skip`](crate::RowPolicy::Skip).
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    pub line_index: usize,
    pub message: String,
}

impl RejectedRow {
    pub fn new(line_index: usize, message: impl Into<String>) -> Self {
        Self {
            line_index,
            message: message.into(),
        }
    }
}

impl fmt::Display for RejectedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line_index, self.message)
    }
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("recording metadata missing: {reason}")]
    MetadataMissing { reason: String },

    #[error("data row {line_index} invalid in column {column}: {message}")]
    MalformedRow {
        line_index: usize,
        column: usize,
        message: String,
    },
}

impl ParserError {
    pub(crate) fn metadata_missing(reason: impl Into<String>) -> Self {
        ParserError::MetadataMissing {
            reason: reason.into(),
        }
    }
}
