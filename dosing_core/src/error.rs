//! Error types for the dosing_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dosing_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Medication name has no entry in the guideline table
    #[error("Unknown medication: {0}")]
    UnknownMedication(String),

    /// Unrecognised status or enum value
    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    /// Numeric input outside its physically sensible domain
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for the evaluation errors a caller can fix by changing its input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownMedication(_) | Error::InvalidCategory(_) | Error::InvalidInput(_)
        )
    }
}
