//! Metrics for evaluating forecast performance

use crate::error::{ForecastError, Result};
use demand_math::stats;

/// Accuracy of predictions against observed quantities
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error over non-zero actuals
    pub mape: f64,
    /// Number of evaluated observations
    pub observations: usize,
}

/// Evaluate predictions against actual values
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Result<ErrorMetrics> {
    if actual.len() != predicted.len() || actual.is_empty() {
        return Err(ForecastError::ValidationError(
            "Predicted and actual values must have the same non-zero length".to_string(),
        ));
    }

    let mae = stats::mean_absolute_error(actual, predicted)?;
    let mse = stats::mean_squared_error(actual, predicted)?;
    let rmse = stats::root_mean_squared_error(actual, predicted)?;

    let (pct_sum, pct_count) = actual
        .iter()
        .zip(predicted.iter())
        .filter(|(a, _)| **a != 0.0)
        .fold((0.0, 0usize), |(sum, count), (a, p)| {
            (sum + ((a - p) / a).abs() * 100.0, count + 1)
        });
    let mape = if pct_count > 0 {
        pct_sum / pct_count as f64
    } else {
        0.0
    };

    Ok(ErrorMetrics {
        mae,
        mse,
        rmse,
        mape,
        observations: actual.len(),
    })
}

impl std::fmt::Display for ErrorMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Holdout Accuracy ({} rows):", self.observations)?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        Ok(())
    }
}
