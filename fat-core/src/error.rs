use thiserror::Error;

use crate::domain::Locator;

#[derive(Error, Debug)]
pub enum FatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no segment stored at {locator}")]
    NotFound { locator: Locator },

    #[error("invalid selection {index}: {reason}")]
    InvalidSelection { index: usize, reason: String },

    #[error("malformed {what} record: {detail}")]
    MalformedRecord { what: String, detail: String },

    /// A live catalog entry whose chain cannot be resolved.
    #[error("integrity error: {0}")]
    Integrity(String),

    #[error("config error: {0}")]
    Config(String),
}

impl FatError {
    pub fn invalid_selection(index: usize, reason: impl Into<String>) -> Self {
        FatError::InvalidSelection {
            index,
            reason: reason.into(),
        }
    }

    pub fn malformed(what: impl Into<String>, detail: impl ToString) -> Self {
        FatError::MalformedRecord {
            what: what.into(),
            detail: detail.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FatError::NotFound { .. })
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, FatError>;
