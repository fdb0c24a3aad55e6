//! Seasonal trend model for the aggregate daily series
//!
//! A linear trend in scaled time plus optional weekly and yearly Fourier
//! seasonality, fitted by least squares with a ridge penalty on the seasonal
//! terms. The uncertainty band assumes Gaussian residuals.

use crate::config::{Seasonality, TrendConfig};
use crate::error::{ForecastError, Result};
use crate::models::{TrainedTrendModel, TrendEstimate, TrendModel};
use chrono::NaiveDate;
use demand_math::fourier::fourier_terms;
use demand_math::linear::LinearFit;
use demand_math::stats;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

const WEEKLY_PERIOD: f64 = 7.0;
const YEARLY_PERIOD: f64 = 365.25;
/// History needed before `Auto` seasonality switches on: two full cycles
const WEEKLY_AUTO_MIN_DAYS: i64 = 14;
const YEARLY_AUTO_MIN_DAYS: i64 = 730;

/// Untrained seasonal trend model
#[derive(Debug, Clone)]
pub struct SeasonalTrend {
    /// Name of the model
    name: String,
    config: TrendConfig,
}

/// Trained seasonal trend model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedSeasonalTrend {
    /// First date of the history; day offsets are measured from here
    origin: NaiveDate,
    /// Days between first and last observation, used to scale the trend term
    span_days: f64,
    /// Fitted weekly Fourier order, 0 when the component is off
    weekly_order: usize,
    /// Fitted yearly Fourier order, 0 when the component is off
    yearly_order: usize,
    fit: LinearFit,
    /// Residual standard deviation
    sigma: f64,
    /// Normal quantile matching the configured interval width
    z: f64,
    observations: usize,
}

impl SeasonalTrend {
    /// Create a new seasonal trend model
    pub fn new(config: TrendConfig) -> Result<Self> {
        if !(config.interval_width > 0.0 && config.interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter(
                "Interval width must be between 0 and 1".to_string(),
            ));
        }
        if !(config.seasonality_penalty > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "Seasonality penalty must be positive".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Seasonal Trend (interval={})", config.interval_width),
            config,
        })
    }

    fn resolve(setting: Seasonality, order: usize, span_days: i64, auto_min_days: i64) -> usize {
        match setting {
            Seasonality::Enabled => order,
            Seasonality::Disabled => 0,
            Seasonality::Auto if span_days >= auto_min_days => order,
            Seasonality::Auto => 0,
        }
    }
}

impl TrendModel for SeasonalTrend {
    type Trained = TrainedSeasonalTrend;

    fn train(&self, history: &[(NaiveDate, f64)]) -> Result<Self::Trained> {
        if history.len() < 2 {
            return Err(ForecastError::InsufficientData(format!(
                "Trend needs at least 2 distinct dates, got {}",
                history.len()
            )));
        }
        if history.windows(2).any(|pair| pair[0].0 >= pair[1].0) {
            return Err(ForecastError::ValidationError(
                "Trend history must be in strictly ascending date order".to_string(),
            ));
        }
        if history.iter().any(|(_, y)| !y.is_finite()) {
            return Err(ForecastError::ValidationError(
                "Trend history contains non-finite quantities".to_string(),
            ));
        }

        let origin = history[0].0;
        let span = (history[history.len() - 1].0 - origin).num_days();
        let weekly_order = Self::resolve(
            self.config.weekly_seasonality,
            self.config.weekly_order,
            span,
            WEEKLY_AUTO_MIN_DAYS,
        );
        let yearly_order = Self::resolve(
            self.config.yearly_seasonality,
            self.config.yearly_order,
            span,
            YEARLY_AUTO_MIN_DAYS,
        );

        let z = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?
            .inverse_cdf(0.5 + self.config.interval_width / 2.0);

        let mut trained = TrainedSeasonalTrend {
            origin,
            span_days: span as f64,
            weekly_order,
            yearly_order,
            fit: LinearFit::from_coefficients(Vec::new()),
            sigma: 0.0,
            z,
            observations: history.len(),
        };

        let rows = history
            .iter()
            .map(|(date, _)| trained.design_row(*date))
            .collect::<Result<Vec<_>>>()?;
        let targets: Vec<f64> = history.iter().map(|(_, y)| *y).collect();

        let mut penalties = vec![0.0, 0.0];
        penalties.resize(trained.width(), self.config.seasonality_penalty);

        trained.fit = LinearFit::fit(&rows, &targets, &penalties)?;

        let fitted = rows
            .iter()
            .map(|row| trained.fit.predict(row))
            .collect::<demand_math::Result<Vec<_>>>()?;
        trained.sigma = stats::root_mean_squared_error(&targets, &fitted)?;

        debug!(
            observations = history.len(),
            span_days = span,
            weekly_order,
            yearly_order,
            sigma = trained.sigma,
            "fitted seasonal trend"
        );

        Ok(trained)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSeasonalTrend {
    fn width(&self) -> usize {
        2 + 2 * (self.weekly_order + self.yearly_order)
    }

    fn design_row(&self, date: NaiveDate) -> Result<Vec<f64>> {
        let days = (date - self.origin).num_days() as f64;

        let mut row = Vec::with_capacity(self.width());
        row.push(1.0);
        row.push(days / self.span_days);
        row.extend(fourier_terms(days, WEEKLY_PERIOD, self.weekly_order)?);
        row.extend(fourier_terms(days, YEARLY_PERIOD, self.yearly_order)?);
        Ok(row)
    }

    /// Number of observations the model was fitted on
    pub fn observations(&self) -> usize {
        self.observations
    }

    /// Residual standard deviation of the fit
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Check that restored state is internally consistent
    pub fn validate(&self) -> Result<()> {
        if !(self.span_days > 0.0) {
            return Err(ForecastError::PersistenceError(
                "trend span must be positive".to_string(),
            ));
        }
        if self.fit.coefficients().len() != self.width() {
            return Err(ForecastError::PersistenceError(format!(
                "trend has {} coefficients, expected {}",
                self.fit.coefficients().len(),
                self.width()
            )));
        }
        let scalars = [self.span_days, self.sigma, self.z];
        if scalars
            .iter()
            .chain(self.fit.coefficients())
            .any(|v| !v.is_finite())
            || self.sigma < 0.0
        {
            return Err(ForecastError::PersistenceError(
                "trend parameters are not finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl TrainedTrendModel for TrainedSeasonalTrend {
    fn estimate(&self, date: NaiveDate) -> Result<TrendEstimate> {
        let expected = self.fit.predict(&self.design_row(date)?)?;
        let half_width = self.z * self.sigma;

        Ok(TrendEstimate {
            expected,
            lower: expected - half_width,
            upper: expected + half_width,
        })
    }

    fn name(&self) -> &str {
        "Seasonal Trend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn daily(start: NaiveDate, values: &[f64]) -> Vec<(NaiveDate, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (start + Duration::days(i as i64), *v))
            .collect()
    }

    #[test]
    fn test_two_points_define_a_line() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let model = SeasonalTrend::new(TrendConfig::default()).unwrap();
        let trained = model.train(&daily(start, &[10.0, 12.0])).unwrap();

        let estimate = trained.estimate(start + Duration::days(2)).unwrap();
        assert!((estimate.expected - 14.0).abs() < 1e-9);
        // perfect fit: no residual spread
        assert!((estimate.upper - estimate.expected).abs() < 1e-9);
    }

    #[test]
    fn test_single_date_is_insufficient() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let model = SeasonalTrend::new(TrendConfig::default()).unwrap();

        assert!(matches!(
            model.train(&daily(start, &[5.0])),
            Err(ForecastError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_weekly_pattern_is_learned() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let pattern = [10.0, 10.0, 10.0, 10.0, 10.0, 30.0, 30.0];
        let values: Vec<f64> = (0..56).map(|i| pattern[i % 7]).collect();

        let model = SeasonalTrend::new(TrendConfig::default()).unwrap();
        let trained = model.train(&daily(start, &values)).unwrap();

        let weekday = trained.estimate(start + Duration::days(56)).unwrap();
        let weekend = trained.estimate(start + Duration::days(61)).unwrap();
        assert!(weekend.expected > weekday.expected + 10.0);
        assert!(weekday.upper >= weekday.expected);
        assert!(weekday.lower <= weekday.expected);
    }

    #[test]
    fn test_unsorted_history_is_rejected() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let model = SeasonalTrend::new(TrendConfig::default()).unwrap();

        assert!(model.train(&[(a, 1.0), (b, 2.0)]).is_err());
    }
}
