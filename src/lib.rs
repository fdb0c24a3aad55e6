//! # Boutique Forecast
//!
//! Umbrella crate for the boutique demand forecasting workspace.
//!
//! - [`demand_forecast`]: data preparation, the trend and regression models,
//!   the combined forecaster, persistence and forecast generation
//! - [`demand_math`]: numeric building blocks (least squares, Fourier terms, statistics)
//!
//! ## Example
//!
//! ```
//! use boutique_workspace::SIZE_LABELS;
//!
//! assert_eq!(SIZE_LABELS.len(), 6);
//! assert_eq!(SIZE_LABELS[0], "XS");
//! ```

pub use demand_forecast;
pub use demand_math;

pub use demand_forecast::{
    generate_forecasts, DemandForecaster, DemandPrediction, ForecastError, ForecastResult,
    ForecastStore, ForecasterConfig, SalesRecord, SharedForecaster, SIZE_LABELS,
};
