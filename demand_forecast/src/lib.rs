//! # Demand Forecast
//!
//! Monthly demand forecasting for a boutique catalogue of categories and sizes.
//!
//! ## Features
//!
//! - Sales history loading from CSV exports
//! - Deterministic aggregation into (date, category, size) rows with label encoders
//! - A seasonal trend model over total daily sales
//! - A gradient boosted regression model over category, size and calendar features
//! - Atomic persistence of both models and their encoders as one bundle
//! - Forecast generation over every category and size label
//!
//! ## Quick Start
//!
//! ```no_run
//! use demand_forecast::config::ForecasterConfig;
//! use demand_forecast::data::DataLoader;
//! use demand_forecast::forecaster::DemandForecaster;
//!
//! # fn main() -> demand_forecast::Result<()> {
//! let records = DataLoader::from_csv("sales.csv")?;
//!
//! let mut forecaster = DemandForecaster::new(ForecasterConfig::default())?;
//! let summary = forecaster.train(&records, |_| false)?;
//! println!("holdout MAE: {:.3}", summary.holdout_mae);
//!
//! let date = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! let prediction = forecaster.predict("Lehenga", "M", date)?;
//! println!("{} units, confidence {:.2}", prediction.demand, prediction.confidence);
//!
//! forecaster.save(std::path::Path::new("forecasting_models.json"))?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod encoder;
pub mod error;
pub mod features;
pub mod forecaster;
pub mod metrics;
pub mod models;
pub mod persistence;
pub mod pipeline;
pub mod preparer;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use crate::config::ForecasterConfig;
pub use crate::data::{DataLoader, SalesRecord};
pub use crate::error::{ForecastError, Result};
pub use crate::forecaster::{
    DemandForecaster, DemandPrediction, ForecasterStage, SharedForecaster, TrainingSummary,
};
pub use crate::pipeline::{
    generate_catalogue_forecasts, generate_forecasts, ForecastResult, SIZE_LABELS,
};
pub use crate::preparer::{DataPreparer, PreparedSeries};
pub use crate::store::{ForecastRecord, ForecastStore};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
