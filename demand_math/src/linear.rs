//! Dense linear least squares
//!
//! Fits `y ≈ X·β` by solving the (optionally ridge-penalised) normal equations
//! `(XᵀX + diag(λ))·β = Xᵀy` directly with Gaussian elimination.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Fitted linear model coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    coefficients: Vec<f64>,
}

impl LinearFit {
    /// Fit coefficients by least squares.
    ///
    /// `penalties` holds one ridge penalty per column; use `0.0` for columns
    /// that should stay unpenalised (intercept, slope).
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], penalties: &[f64]) -> Result<Self> {
        if rows.is_empty() {
            return Err(MathError::InsufficientData(
                "Need at least one observation to fit a linear model".to_string(),
            ));
        }
        if rows.len() != targets.len() {
            return Err(MathError::InvalidInput(format!(
                "Design has {} rows but {} targets",
                rows.len(),
                targets.len()
            )));
        }

        let width = rows[0].len();
        if width == 0 {
            return Err(MathError::InvalidInput(
                "Design matrix has no columns".to_string(),
            ));
        }
        if penalties.len() != width {
            return Err(MathError::InvalidInput(format!(
                "Expected {} penalties, got {}",
                width,
                penalties.len()
            )));
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != width) {
            return Err(MathError::InvalidInput(format!(
                "Row {} has {} columns, expected {}",
                bad,
                rows[bad].len(),
                width
            )));
        }

        let mut gram = vec![vec![0.0; width]; width];
        let mut moment = vec![0.0; width];
        for (row, &y) in rows.iter().zip(targets.iter()) {
            for i in 0..width {
                moment[i] += row[i] * y;
                for j in i..width {
                    gram[i][j] += row[i] * row[j];
                }
            }
        }
        for i in 0..width {
            for j in 0..i {
                gram[i][j] = gram[j][i];
            }
            gram[i][i] += penalties[i];
        }

        let coefficients = solve(gram, moment)?;
        Ok(Self { coefficients })
    }

    /// Rebuild a fit from stored coefficients
    pub fn from_coefficients(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    /// Fitted coefficients in column order
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Evaluate the model for one design row
    pub fn predict(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.coefficients.len() {
            return Err(MathError::InvalidInput(format!(
                "Row has {} columns, model expects {}",
                row.len(),
                self.coefficients.len()
            )));
        }

        Ok(row
            .iter()
            .zip(self.coefficients.iter())
            .map(|(x, b)| x * b)
            .sum())
    }
}

/// Solve `a·x = b` for a square system using Gaussian elimination with partial pivoting
pub fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(
            "System matrix must be square and match the right-hand side".to_string(),
        ));
    }

    for col in 0..n {
        let mut pivot = col;
        for row in col + 1..n {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if a[pivot][col].abs() < 1e-12 {
            return Err(MathError::CalculationError(
                "Cannot solve: system matrix is singular".to_string(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    if x.iter().any(|v| !v.is_finite()) {
        return Err(MathError::CalculationError(
            "Solution contains non-finite values".to_string(),
        ));
    }

    Ok(x)
}
