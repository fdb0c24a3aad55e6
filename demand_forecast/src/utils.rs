//! Utility functions for the demand_forecast crate

use crate::config::SplitConfig;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices assigned to the training and holdout partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub holdout: Vec<usize>,
}

/// Partition `n` rows into training and holdout sets.
///
/// Rows are shuffled with an RNG seeded from `config.seed`, so identical
/// inputs and configuration always produce the same partition. The holdout
/// set takes `ceil(n * holdout_ratio)` rows and never fewer than one.
pub fn train_test_split(n: usize, config: &SplitConfig) -> Result<SplitIndices> {
    if n < config.min_rows {
        return Err(ForecastError::InsufficientData(format!(
            "Need at least {} rows for a train/holdout split, got {}",
            config.min_rows, n
        )));
    }
    if !(config.holdout_ratio > 0.0 && config.holdout_ratio < 1.0) {
        return Err(ForecastError::InvalidParameter(
            "Holdout ratio must be between 0 and 1".to_string(),
        ));
    }

    let holdout_size = ((n as f64 * config.holdout_ratio).ceil() as usize).max(1);
    if holdout_size >= n {
        return Err(ForecastError::InsufficientData(format!(
            "A holdout of {} rows leaves nothing to train on",
            holdout_size
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(holdout_size);
    Ok(SplitIndices {
        train,
        holdout: indices,
    })
}

/// First day of the month following `today`
pub fn next_forecast_month(today: NaiveDate) -> Result<NaiveDate> {
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        ForecastError::ValidationError(format!("No month follows {}", today))
    })
}
