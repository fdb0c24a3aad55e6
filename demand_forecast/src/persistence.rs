//! Model bundle persistence
//!
//! The trend model, the boosted ensemble and both encoders are written and
//! read as one JSON document. Saving goes through a temporary file in the
//! destination directory followed by a rename, so readers never observe a
//! half-written bundle. Loading validates the whole document before any of
//! it is handed to a forecaster.

use crate::config::CombineConfig;
use crate::encoder::{LabelEncoder, LabelKind};
use crate::error::{ForecastError, Result};
use crate::models::gradient_boosting::TrainedGradientBoosting;
use crate::models::trend::TrainedSeasonalTrend;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Current bundle layout version
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

/// Default bundle file name
pub const DEFAULT_BUNDLE_PATH: &str = "forecasting_models.json";

/// Everything needed for inference, persisted as a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub trend: TrainedSeasonalTrend,
    pub regression: TrainedGradientBoosting,
    pub category_encoder: LabelEncoder,
    pub size_encoder: LabelEncoder,
    /// Combination rule the models were trained for
    pub combine: CombineConfig,
}

impl ModelBundle {
    /// Check version and internal consistency of every component
    pub fn validate(&self) -> Result<()> {
        if self.format_version != BUNDLE_FORMAT_VERSION {
            return Err(ForecastError::PersistenceError(format!(
                "Unsupported bundle version {} (expected {})",
                self.format_version, BUNDLE_FORMAT_VERSION
            )));
        }
        if self.category_encoder.kind() != LabelKind::Category
            || self.size_encoder.kind() != LabelKind::Size
        {
            return Err(ForecastError::PersistenceError(
                "Bundle encoders are swapped or mislabelled".to_string(),
            ));
        }
        self.combine.validate().map_err(|e| {
            ForecastError::PersistenceError(format!("Bundle combine settings: {}", e))
        })?;
        self.trend.validate()?;
        self.regression.validate()?;
        Ok(())
    }
}

/// Write `bundle` to `path`, replacing any existing file atomically
pub fn save_bundle(bundle: &ModelBundle, path: &Path) -> Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(directory)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        serde_json::to_writer(&mut writer, bundle)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| ForecastError::IoError(e.error))?;

    info!(
        path = %path.display(),
        categories = bundle.category_encoder.len(),
        sizes = bundle.size_encoder.len(),
        trees = bundle.regression.trees().len(),
        "saved model bundle"
    );
    Ok(())
}

/// Read and validate a bundle from `path`
pub fn load_bundle(path: &Path) -> Result<ModelBundle> {
    let file = File::open(path)?;
    let bundle: ModelBundle = serde_json::from_reader(BufReader::new(file))?;
    bundle.validate()?;

    info!(
        path = %path.display(),
        created_at = %bundle.created_at,
        "loaded model bundle"
    );
    Ok(bundle)
}
