//! Forecast generation over every category and size combination

use crate::error::{ForecastError, Result};
use crate::forecaster::{DemandForecaster, DemandPrediction, SharedForecaster};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Size labels forecast for every category
pub const SIZE_LABELS: [&str; 6] = ["XS", "S", "M", "L", "XL", "XXL"];

/// Anything that can predict demand for a category/size/date
pub trait DemandPredictor {
    fn predict_demand(&self, category: &str, size: &str, date: NaiveDate)
        -> Result<DemandPrediction>;
}

impl DemandPredictor for DemandForecaster {
    fn predict_demand(
        &self,
        category: &str,
        size: &str,
        date: NaiveDate,
    ) -> Result<DemandPrediction> {
        self.predict(category, size, date)
    }
}

impl DemandPredictor for SharedForecaster {
    fn predict_demand(
        &self,
        category: &str,
        size: &str,
        date: NaiveDate,
    ) -> Result<DemandPrediction> {
        self.predict(category, size, date)
    }
}

/// One generated forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub category: String,
    pub size: String,
    pub forecast_month: NaiveDate,
    pub predicted_demand: u64,
    pub confidence_score: f64,
}

/// Predict demand for every `categories` x `sizes` pair in `month`.
///
/// A combination that fails (for example a size the model never saw) is
/// logged and skipped; the rest are still produced.
pub fn generate_forecasts<P, C, S>(
    predictor: &P,
    categories: &[C],
    sizes: &[S],
    month: NaiveDate,
) -> Vec<ForecastResult>
where
    P: DemandPredictor + ?Sized,
    C: AsRef<str>,
    S: AsRef<str>,
{
    let mut results = Vec::with_capacity(categories.len() * sizes.len());
    let mut skipped = 0usize;

    for category in categories {
        for size in sizes {
            let (category, size) = (category.as_ref(), size.as_ref());
            match predictor.predict_demand(category, size, month) {
                Ok(prediction) => results.push(ForecastResult {
                    category: category.to_string(),
                    size: size.to_string(),
                    forecast_month: month,
                    predicted_demand: prediction.demand,
                    confidence_score: prediction.confidence,
                }),
                Err(e) => {
                    skipped += 1;
                    warn!(category, size, %month, error = %e, "skipping forecast");
                }
            }
        }
    }

    info!(
        generated = results.len(),
        skipped,
        %month,
        "generated forecasts"
    );
    results
}

/// Forecast every trained category in every size label for `month`
pub fn generate_catalogue_forecasts(
    forecaster: &DemandForecaster,
    month: NaiveDate,
) -> Result<Vec<ForecastResult>> {
    let encoders = forecaster.encoders().ok_or_else(|| {
        ForecastError::NotTrained("no trained category catalogue to forecast".to_string())
    })?;

    Ok(generate_forecasts(
        forecaster,
        encoders.category.labels(),
        &SIZE_LABELS,
        month,
    ))
}
