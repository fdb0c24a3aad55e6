//! Descriptive statistics and error measures over `f64` slices

use crate::{MathError, Result};

/// Arithmetic mean of the values
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the mean of an empty slice".to_string(),
        ));
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

fn check_paired(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.len() != predicted.len() {
        return Err(MathError::InvalidInput(format!(
            "Actual length ({}) doesn't match predicted length ({})",
            actual.len(),
            predicted.len()
        )));
    }
    if actual.is_empty() {
        return Err(MathError::InsufficientData(
            "Need at least one paired observation".to_string(),
        ));
    }
    Ok(())
}

/// Mean absolute error between actual and predicted values
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_paired(actual, predicted)?;

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();

    Ok(sum / actual.len() as f64)
}

/// Mean squared error between actual and predicted values
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_paired(actual, predicted)?;

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    Ok(sum / actual.len() as f64)
}

/// Root mean squared error between actual and predicted values
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    Ok(mean_squared_error(actual, predicted)?.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

        assert_eq!(mean(&values).unwrap(), 5.0);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(mean(&[]), Err(MathError::InsufficientData(_))));
        assert!(mean_absolute_error(&[], &[]).is_err());
    }

    #[test]
    fn test_error_measures() {
        let actual = [10.0, 20.0, 30.0, 40.0, 50.0];
        let predicted = [12.0, 18.0, 33.0, 37.0, 52.0];

        // |2| + |2| + |3| + |3| + |2| = 12
        assert!((mean_absolute_error(&actual, &predicted).unwrap() - 2.4).abs() < 1e-12);
        // 4 + 4 + 9 + 9 + 4 = 30
        assert!((mean_squared_error(&actual, &predicted).unwrap() - 6.0).abs() < 1e-12);
        assert!((root_mean_squared_error(&actual, &predicted).unwrap() - 6.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        let result = mean_absolute_error(&[1.0, 2.0], &[1.0]);
        assert!(matches!(result, Err(MathError::InvalidInput(_))));
    }
}
