//! Error types for the demand_forecast crate

use thiserror::Error;

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Malformed or missing input rows, unparseable dates
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Too few rows or distinct dates to fit a model
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Inference or save attempted before a successful train/load
    #[error("Not trained: {0}")]
    NotTrained(String),

    /// Category label absent from the trained encoder
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Size label absent from the trained encoder
    #[error("Unknown size: {0}")]
    UnknownSize(String),

    /// Corrupt, partial or unwritable model bundle
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A shared forecaster's lock was poisoned by a panicking holder
    #[error("Concurrency error: {0}")]
    ConcurrencyError(String),

    /// Training was interrupted between phases
    #[error("Training cancelled")]
    Cancelled,

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reading CSV input
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error loading configuration
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// Error from numeric routines
    #[error("Math error: {0}")]
    MathError(#[from] demand_math::MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::PersistenceError(err.to_string())
    }
}
