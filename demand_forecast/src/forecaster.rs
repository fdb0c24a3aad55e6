//! Demand forecaster combining an aggregate trend with per-category/size regression
//!
//! Lifecycle: `prepare` starts a training run and installs fresh encoders,
//! `train_trend` and `train_regression` fit the two models, and `predict`
//! becomes available once both are fitted. `load` replaces the encoders and
//! both models in one step from a persisted bundle.

use crate::config::{CombineConfig, ForecasterConfig};
use crate::data::SalesRecord;
use crate::encoder::LabelEncoder;
use crate::error::{ForecastError, Result};
use crate::features::{feature_vector, FeatureVector, FEATURE_NAMES};
use crate::metrics::{self, ErrorMetrics};
use crate::models::gradient_boosting::{GradientBoosting, TrainedGradientBoosting};
use crate::models::trend::{SeasonalTrend, TrainedSeasonalTrend};
use crate::models::{
    RegressionModel, TrainedRegressionModel, TrainedTrendModel, TrendEstimate, TrendModel,
};
use crate::persistence::{self, ModelBundle, BUNDLE_FORMAT_VERSION};
use crate::preparer::{DataPreparer, PreparedSeries};
use crate::utils::train_test_split;
use chrono::{NaiveDate, Utc};
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Where a forecaster is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecasterStage {
    /// No encoders: nothing prepared or loaded
    Untrained,
    /// Encoders installed, no model fitted
    Prepared,
    TrendReady,
    RegressionReady,
    /// Both models fitted or loaded; predictions available
    Ready,
}

/// Category and size encoders of one training run
#[derive(Debug, Clone, PartialEq)]
pub struct Encoders {
    pub category: LabelEncoder,
    pub size: LabelEncoder,
}

/// Predicted demand for one category/size/date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandPrediction {
    /// Units expected, never below 1
    pub demand: u64,
    /// In `[0, confidence_cap]`
    pub confidence: f64,
}

/// Outcome of a complete training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub rows: usize,
    pub distinct_dates: usize,
    pub categories: usize,
    pub sizes: usize,
    /// Mean absolute error of the regression model on the holdout rows
    pub holdout_mae: f64,
}

/// Combine a regression estimate with the trend level into a demand prediction.
///
/// Demand is the regression estimate scaled by `expected / trend_normalizer`,
/// truncated, floored at 1 and saturated at `u64::MAX`. Confidence is `upper / expected` clamped into
/// `[0, confidence_cap]`, and zero when the trend level is within
/// `trend_epsilon` of zero.
pub fn combine(config: &CombineConfig, regression: f64, trend: &TrendEstimate) -> DemandPrediction {
    if !trend.expected.is_finite() || trend.expected.abs() < config.trend_epsilon {
        return DemandPrediction {
            demand: 1,
            confidence: 0.0,
        };
    }

    let scaled = regression * (trend.expected / config.trend_normalizer);
    let demand = if scaled.is_nan() || scaled < 1.0 {
        1
    } else {
        // float-to-int `as` saturates, +inf included
        scaled.trunc() as u64
    };

    let ratio = trend.upper / trend.expected;
    let confidence = if ratio.is_finite() {
        ratio.clamp(0.0, config.confidence_cap)
    } else {
        0.0
    };

    DemandPrediction { demand, confidence }
}

/// Owns the trend model, the regression model and both encoders
#[derive(Debug, Clone)]
pub struct DemandForecaster {
    config: ForecasterConfig,
    preparer: DataPreparer,
    trend_model: SeasonalTrend,
    regression_model: GradientBoosting,
    /// Combination rule of the installed models
    combine: CombineConfig,
    encoders: Option<Encoders>,
    trend: Option<TrainedSeasonalTrend>,
    regression: Option<TrainedGradientBoosting>,
    evaluation: Option<ErrorMetrics>,
}

impl DemandForecaster {
    /// Create an untrained forecaster
    pub fn new(config: ForecasterConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            preparer: DataPreparer::new(),
            trend_model: SeasonalTrend::new(config.trend.clone())?,
            regression_model: GradientBoosting::new(config.boosting.clone())?,
            combine: config.combine.clone(),
            config,
            encoders: None,
            trend: None,
            regression: None,
            evaluation: None,
        })
    }

    pub fn config(&self) -> &ForecasterConfig {
        &self.config
    }

    /// Combination rule used by `predict`; taken from the bundle after `load`
    pub fn combine_config(&self) -> &CombineConfig {
        &self.combine
    }

    pub fn stage(&self) -> ForecasterStage {
        match (&self.encoders, &self.trend, &self.regression) {
            (None, _, _) => ForecasterStage::Untrained,
            (Some(_), None, None) => ForecasterStage::Prepared,
            (Some(_), Some(_), None) => ForecasterStage::TrendReady,
            (Some(_), None, Some(_)) => ForecasterStage::RegressionReady,
            (Some(_), Some(_), Some(_)) => ForecasterStage::Ready,
        }
    }

    /// Encoders of the current training run or loaded bundle
    pub fn encoders(&self) -> Option<&Encoders> {
        self.encoders.as_ref()
    }

    /// Holdout metrics of the last regression fit in this lifetime
    pub fn evaluation(&self) -> Option<&ErrorMetrics> {
        self.evaluation.as_ref()
    }

    /// Start a training run: aggregate `records` and install fresh encoders.
    ///
    /// Previously fitted models are discarded so they can never be paired with
    /// encoders from another run.
    pub fn prepare(&mut self, records: &[SalesRecord]) -> Result<PreparedSeries> {
        let series = self.preparer.prepare(records)?;

        self.encoders = Some(Encoders {
            category: series.category_encoder().clone(),
            size: series.size_encoder().clone(),
        });
        self.trend = None;
        self.regression = None;
        self.evaluation = None;
        self.combine = self.config.combine.clone();

        info!(
            records = records.len(),
            rows = series.len(),
            categories = series.category_encoder().len(),
            sizes = series.size_encoder().len(),
            "prepared training series"
        );
        Ok(series)
    }

    fn check_series(&self, series: &PreparedSeries) -> Result<()> {
        let encoders = self.encoders.as_ref().ok_or_else(|| {
            ForecastError::NotTrained(
                "call prepare() or load() before training a model".to_string(),
            )
        })?;

        if &encoders.category != series.category_encoder() || &encoders.size != series.size_encoder()
        {
            return Err(ForecastError::ValidationError(
                "Series was prepared by a different training run".to_string(),
            ));
        }
        Ok(())
    }

    /// Fit the trend model on the daily totals of `series`
    pub fn train_trend(&mut self, series: &PreparedSeries) -> Result<()> {
        self.check_series(series)?;

        let totals = series.daily_totals();
        if totals.len() < 2 {
            return Err(ForecastError::InsufficientData(format!(
                "Trend needs at least 2 distinct dates, got {}",
                totals.len()
            )));
        }

        let trained = self.trend_model.train(&totals)?;
        info!(
            model = self.trend_model.name(),
            dates = totals.len(),
            "trained trend model"
        );
        self.trend = Some(trained);
        Ok(())
    }

    /// Fit the regression model and return its holdout mean absolute error
    pub fn train_regression(&mut self, series: &PreparedSeries) -> Result<f64> {
        self.check_series(series)?;

        let split = train_test_split(series.len(), &self.config.split)?;
        let rows = series.rows();
        let features: Vec<FeatureVector> = rows
            .iter()
            .map(|row| feature_vector(row.category_code, row.size_code, row.date))
            .collect();
        let targets: Vec<f64> = rows.iter().map(|row| row.quantity as f64).collect();

        let train_features: Vec<FeatureVector> = split.train.iter().map(|&i| features[i]).collect();
        let train_targets: Vec<f64> = split.train.iter().map(|&i| targets[i]).collect();
        let trained = self
            .regression_model
            .train(&train_features, &train_targets)?;

        let holdout_features: Vec<FeatureVector> =
            split.holdout.iter().map(|&i| features[i]).collect();
        let holdout_targets: Vec<f64> = split.holdout.iter().map(|&i| targets[i]).collect();
        let predicted = trained.predict_batch(&holdout_features);
        let evaluation = metrics::evaluate(&holdout_targets, &predicted)?;

        info!(
            model = self.regression_model.name(),
            features = ?FEATURE_NAMES,
            train_rows = split.train.len(),
            holdout_rows = split.holdout.len(),
            mae = evaluation.mae,
            "trained regression model"
        );

        let mae = evaluation.mae;
        self.regression = Some(trained);
        self.evaluation = Some(evaluation);
        Ok(mae)
    }

    /// Run a whole training pass.
    ///
    /// `cancel` is asked with the reached stage after `prepare` and after the
    /// trend fit; returning `true` stops with `Cancelled` and keeps the phases
    /// already completed.
    pub fn train<C>(&mut self, records: &[SalesRecord], cancel: C) -> Result<TrainingSummary>
    where
        C: Fn(ForecasterStage) -> bool,
    {
        let series = self.prepare(records)?;
        if cancel(self.stage()) {
            info!("training cancelled after prepare");
            return Err(ForecastError::Cancelled);
        }

        self.train_trend(&series)?;
        if cancel(self.stage()) {
            info!("training cancelled after trend fit");
            return Err(ForecastError::Cancelled);
        }

        let holdout_mae = self.train_regression(&series)?;

        Ok(TrainingSummary {
            rows: series.len(),
            distinct_dates: series.distinct_dates(),
            categories: series.category_encoder().len(),
            sizes: series.size_encoder().len(),
            holdout_mae,
        })
    }

    /// Predict demand for `category` in `size` on `date`
    pub fn predict(&self, category: &str, size: &str, date: NaiveDate) -> Result<DemandPrediction> {
        let (encoders, trend, regression) = match (&self.encoders, &self.trend, &self.regression) {
            (Some(encoders), Some(trend), Some(regression)) => (encoders, trend, regression),
            _ => {
                return Err(ForecastError::NotTrained(format!(
                    "forecaster is {:?}; train both models or load a bundle first",
                    self.stage()
                )))
            }
        };

        let category_code = encoders.category.encode(category)?;
        let size_code = encoders.size.encode(size)?;

        let estimate = trend.estimate(date)?;
        let regression_estimate =
            regression.predict(&feature_vector(category_code, size_code, date));
        let prediction = combine(&self.combine, regression_estimate, &estimate);

        debug!(
            category,
            size,
            %date,
            trend = estimate.expected,
            regression = regression_estimate,
            demand = prediction.demand,
            confidence = prediction.confidence,
            "predicted demand"
        );
        Ok(prediction)
    }

    /// Snapshot the trained state as a bundle
    pub fn to_bundle(&self) -> Result<ModelBundle> {
        match (&self.encoders, &self.trend, &self.regression) {
            (Some(encoders), Some(trend), Some(regression)) => Ok(ModelBundle {
                format_version: BUNDLE_FORMAT_VERSION,
                created_at: Utc::now(),
                trend: trend.clone(),
                regression: regression.clone(),
                category_encoder: encoders.category.clone(),
                size_encoder: encoders.size.clone(),
                combine: self.combine.clone(),
            }),
            _ => Err(ForecastError::NotTrained(format!(
                "cannot save a forecaster that is {:?}",
                self.stage()
            ))),
        }
    }

    /// Persist both models and encoders to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        persistence::save_bundle(&self.to_bundle()?, path)
    }

    /// Replace all trained state from the bundle at `path`.
    ///
    /// On any failure the current state is left untouched.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let bundle = persistence::load_bundle(path)?;
        self.install(bundle);
        Ok(())
    }

    /// Replace all trained state with an already validated bundle
    pub fn install(&mut self, bundle: ModelBundle) {
        self.encoders = Some(Encoders {
            category: bundle.category_encoder,
            size: bundle.size_encoder,
        });
        self.trend = Some(bundle.trend);
        self.regression = Some(bundle.regression);
        self.combine = bundle.combine;
        self.evaluation = None;
    }
}

/// Forecaster shared between threads.
///
/// Predictions and saves take the read lock; loads and completed training
/// runs swap state in under the write lock.
#[derive(Debug, Clone)]
pub struct SharedForecaster {
    inner: Arc<RwLock<DemandForecaster>>,
}

impl SharedForecaster {
    pub fn new(forecaster: DemandForecaster) -> Self {
        Self {
            inner: Arc::new(RwLock::new(forecaster)),
        }
    }

    fn poisoned<T>(_: T) -> ForecastError {
        ForecastError::ConcurrencyError("forecaster lock poisoned".to_string())
    }

    pub fn stage(&self) -> Result<ForecasterStage> {
        Ok(self.inner.read().map_err(Self::poisoned)?.stage())
    }

    pub fn predict(&self, category: &str, size: &str, date: NaiveDate) -> Result<DemandPrediction> {
        self.inner
            .read()
            .map_err(Self::poisoned)?
            .predict(category, size, date)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.inner.read().map_err(Self::poisoned)?.save(path)
    }

    /// Read and validate the bundle, then swap it in
    pub fn load(&self, path: &Path) -> Result<()> {
        let bundle = persistence::load_bundle(path)?;
        self.inner.write().map_err(Self::poisoned)?.install(bundle);
        Ok(())
    }

    /// Train a fresh forecaster and swap it in once training succeeds.
    ///
    /// Readers keep using the previous state while training runs.
    pub fn train<C>(&self, records: &[SalesRecord], cancel: C) -> Result<TrainingSummary>
    where
        C: Fn(ForecasterStage) -> bool,
    {
        let config = self.inner.read().map_err(Self::poisoned)?.config().clone();
        let mut fresh = DemandForecaster::new(config)?;
        let summary = fresh.train(records, cancel)?;

        *self.inner.write().map_err(Self::poisoned)? = fresh;
        Ok(summary)
    }

    /// Run `f` against the forecaster under the read lock
    pub fn with_read<T>(&self, f: impl FnOnce(&DemandForecaster) -> T) -> Result<T> {
        let guard = self.inner.read().map_err(Self::poisoned)?;
        Ok(f(&guard))
    }
}
