//! Fourier basis features for periodic seasonality

use crate::{MathError, Result};
use std::f64::consts::PI;

/// Sine/cosine pairs for harmonics `1..=order` of a cycle with the given period.
///
/// The result has `2 * order` columns laid out as `[sin(1), cos(1), sin(2), cos(2), ...]`.
/// `t` and `period` must share a unit (days throughout this workspace).
pub fn fourier_terms(t: f64, period: f64, order: usize) -> Result<Vec<f64>> {
    if period <= 0.0 || !period.is_finite() {
        return Err(MathError::InvalidInput(format!(
            "Seasonal period must be positive, got {}",
            period
        )));
    }

    let mut terms = Vec::with_capacity(2 * order);
    for k in 1..=order {
        let angle = 2.0 * PI * k as f64 * t / period;
        terms.push(angle.sin());
        terms.push(angle.cos());
    }

    Ok(terms)
}
