use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while classifying, analysing and reporting hybrid reads.
#[derive(Error, Debug)]
pub enum Error {
    /// Classification was requested without a usable strategy.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An analysis step ran before the step it depends on.
    #[error("Record '{record}': {message}")]
    PrecursorState { record: String, message: String },

    /// A property query named a category outside the recognized set.
    #[error("Unrecognized property category: '{0}'")]
    UnrecognizedCategory(String),

    #[error("IO error: {source} ({path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    /// Line numbers are 1-based.
    #[error("Invalid format on line {line}: {message}")]
    InvalidFormat { line: usize, message: String },
}

impl Error {
    /// Wrap an `io::Error` with the path it occurred on.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }

    pub(crate) fn precursor(record: &str, message: impl Into<String>) -> Self {
        Self::PrecursorState {
            record: record.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
