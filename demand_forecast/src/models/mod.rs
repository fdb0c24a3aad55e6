//! Forecasting models
//!
//! Each model comes as a pair: an untrained configuration implementing the
//! training trait, and the trained state it produces.

use crate::error::Result;
use crate::features::FeatureVector;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Expected aggregate volume for one date with its uncertainty band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendEstimate {
    pub expected: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Trained univariate trend model
pub trait TrainedTrendModel: Debug {
    /// Estimate the aggregate level at `date`
    fn estimate(&self, date: NaiveDate) -> Result<TrendEstimate>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Trend model that can be trained on a daily aggregate series
pub trait TrendModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedTrendModel;

    /// Train on `(date, total quantity)` pairs in ascending date order
    fn train(&self, history: &[(NaiveDate, f64)]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Trained feature-based regression model
pub trait TrainedRegressionModel: Debug {
    /// Predict the target for one feature vector
    fn predict(&self, features: &FeatureVector) -> f64;

    /// Predict the target for many feature vectors
    fn predict_batch(&self, rows: &[FeatureVector]) -> Vec<f64> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Name of the model
    fn name(&self) -> &str;
}

/// Regression model that can be trained on feature vectors
pub trait RegressionModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedRegressionModel;

    /// Train on feature rows and their targets
    fn train(&self, features: &[FeatureVector], targets: &[f64]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod gradient_boosting;
pub mod trend;
