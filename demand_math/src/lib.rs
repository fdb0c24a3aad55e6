//! # Demand Math
//!
//! Numeric building blocks for the demand forecasting models.
//! This crate provides a small dense least-squares solver, descriptive
//! statistics and Fourier basis features used for seasonality terms.

use thiserror::Error;

pub mod fourier;
pub mod linear;
pub mod stats;

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;
