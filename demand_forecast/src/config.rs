//! Forecaster configuration
//!
//! Defaults reproduce the behaviour the back office has always shipped with.
//! Values can be layered from an optional file and from environment variables
//! prefixed with `BOUTIQUE_FORECAST`, using `__` to separate nested keys
//! (e.g. `BOUTIQUE_FORECAST__SPLIT__SEED=7`).

use crate::error::{ForecastError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "BOUTIQUE_FORECAST";

/// Whether a seasonal component is fitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seasonality {
    /// Enabled when the history is long enough to observe the cycle twice
    Auto,
    Enabled,
    Disabled,
}

/// Parameters of the aggregate trend model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub weekly_seasonality: Seasonality,
    pub yearly_seasonality: Seasonality,
    /// Fourier order of the weekly cycle
    pub weekly_order: usize,
    /// Fourier order of the yearly cycle
    pub yearly_order: usize,
    /// Ridge penalty applied to seasonal coefficients
    pub seasonality_penalty: f64,
    /// Coverage of the uncertainty band, in (0, 1)
    pub interval_width: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            weekly_seasonality: Seasonality::Auto,
            yearly_seasonality: Seasonality::Auto,
            weekly_order: 3,
            yearly_order: 10,
            seasonality_penalty: 0.005,
            interval_width: 0.8,
        }
    }
}

/// Parameters of the gradient-boosted regression model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    /// L2 penalty on leaf weights
    pub l2_regularization: f64,
    /// Minimum number of rows on each side of a split
    pub min_child_weight: f64,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.3,
            max_depth: 6,
            l2_regularization: 1.0,
            min_child_weight: 1.0,
        }
    }
}

/// Train/holdout partition policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Seed of the shuffle that assigns rows to the holdout set
    pub seed: u64,
    pub holdout_ratio: f64,
    pub min_rows: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            holdout_ratio: 0.2,
            min_rows: 5,
        }
    }
}

/// How the trend and regression estimates are combined at inference time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombineConfig {
    /// Divisor turning the trend level into a scale factor
    pub trend_normalizer: f64,
    pub confidence_cap: f64,
    /// Trend levels with a smaller magnitude yield zero confidence
    pub trend_epsilon: f64,
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            trend_normalizer: 10.0,
            confidence_cap: 0.9,
            trend_epsilon: 1e-9,
        }
    }
}

impl CombineConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.trend_normalizer > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "combine.trend_normalizer must be positive".to_string(),
            ));
        }
        if !(self.confidence_cap > 0.0 && self.confidence_cap <= 1.0) {
            return Err(ForecastError::InvalidParameter(
                "combine.confidence_cap must be in (0, 1]".to_string(),
            ));
        }
        if !(self.trend_epsilon >= 0.0) {
            return Err(ForecastError::InvalidParameter(
                "combine.trend_epsilon must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete forecaster configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecasterConfig {
    pub trend: TrendConfig,
    pub boosting: BoostingConfig,
    pub split: SplitConfig,
    pub combine: CombineConfig,
}

impl ForecasterConfig {
    /// Load configuration from an optional file overlaid with environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            debug!(path = %path.display(), "reading forecaster configuration file");
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: ForecasterConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check every parameter is within its usable range
    pub fn validate(&self) -> Result<()> {
        let trend = &self.trend;
        if !(trend.interval_width > 0.0 && trend.interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter(
                "trend.interval_width must be between 0 and 1".to_string(),
            ));
        }
        if !(trend.seasonality_penalty > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "trend.seasonality_penalty must be positive".to_string(),
            ));
        }

        let boosting = &self.boosting;
        if boosting.n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "boosting.n_estimators must be positive".to_string(),
            ));
        }
        if !(boosting.learning_rate > 0.0 && boosting.learning_rate <= 1.0) {
            return Err(ForecastError::InvalidParameter(
                "boosting.learning_rate must be in (0, 1]".to_string(),
            ));
        }
        if boosting.max_depth == 0 {
            return Err(ForecastError::InvalidParameter(
                "boosting.max_depth must be positive".to_string(),
            ));
        }
        if !(boosting.l2_regularization >= 0.0) || !(boosting.min_child_weight >= 0.0) {
            return Err(ForecastError::InvalidParameter(
                "boosting regularization terms must be non-negative".to_string(),
            ));
        }

        let split = &self.split;
        if !(split.holdout_ratio > 0.0 && split.holdout_ratio < 1.0) {
            return Err(ForecastError::InvalidParameter(
                "split.holdout_ratio must be between 0 and 1".to_string(),
            ));
        }
        if split.min_rows < 2 {
            return Err(ForecastError::InvalidParameter(
                "split.min_rows must leave at least one row on each side".to_string(),
            ));
        }

        self.combine.validate()
    }
}
