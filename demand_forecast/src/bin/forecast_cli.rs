//! Command-line entry points for training and forecast generation
//!
//! ```text
//! forecast_cli train <sales.csv> [bundle]
//! forecast_cli forecast <bundle> [category]...
//! ```
//!
//! `FORECAST_CONFIG` names an optional configuration file; `RUST_LOG`
//! overrides the default `info` log level.

use chrono::Utc;
use demand_forecast::config::ForecasterConfig;
use demand_forecast::data::DataLoader;
use demand_forecast::forecaster::DemandForecaster;
use demand_forecast::persistence::DEFAULT_BUNDLE_PATH;
use demand_forecast::pipeline::{generate_catalogue_forecasts, generate_forecasts, SIZE_LABELS};
use demand_forecast::store::ForecastStore;
use demand_forecast::utils::next_forecast_month;
use demand_forecast::{ForecastError, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;

const USAGE: &str = "usage:\n  forecast_cli train <sales.csv> [bundle]\n  forecast_cli forecast <bundle> [category]...";

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "demand_forecast=info,forecast_cli=info".to_string());

    let _ = fmt()
        .with_env_filter(EnvFilter::new(filter_directive))
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config() -> Result<ForecasterConfig> {
    let path = env::var_os("FORECAST_CONFIG").map(PathBuf::from);
    ForecasterConfig::load(path.as_deref())
}

fn train(csv_path: &Path, bundle_path: &Path) -> Result<()> {
    let records = DataLoader::from_csv(csv_path)?;
    let mut forecaster = DemandForecaster::new(load_config()?)?;

    let summary = forecaster.train(&records, |_| false)?;
    forecaster.save(bundle_path)?;

    println!(
        "trained on {} rows ({} dates, {} categories, {} sizes)",
        summary.rows, summary.distinct_dates, summary.categories, summary.sizes
    );
    println!("holdout MAE: {:.4}", summary.holdout_mae);
    println!("bundle written to {}", bundle_path.display());
    Ok(())
}

fn forecast(bundle_path: &Path, categories: &[String]) -> Result<()> {
    if !bundle_path.exists() {
        return Err(ForecastError::NotTrained(format!(
            "no model bundle at {}; run `forecast_cli train` first",
            bundle_path.display()
        )));
    }

    let mut forecaster = DemandForecaster::new(load_config()?)?;
    forecaster.load(bundle_path)?;

    let month = next_forecast_month(Utc::now().date_naive())?;
    let results = if categories.is_empty() {
        generate_catalogue_forecasts(&forecaster, month)?
    } else {
        generate_forecasts(&forecaster, categories, &SIZE_LABELS, month)
    };

    let mut store = ForecastStore::new();
    store.extend(results);

    for record in store.recent(store.len()) {
        let result = &record.result;
        println!(
            "{}\t{}\t{}\t{}\t{:.2}",
            result.forecast_month,
            result.category,
            result.size,
            result.predicted_demand,
            result.confidence_score
        );
    }
    Ok(())
}

fn run(args: &[String]) -> Result<()> {
    match args {
        [command, csv] if command == "train" => train(Path::new(csv), Path::new(DEFAULT_BUNDLE_PATH)),
        [command, csv, bundle] if command == "train" => train(Path::new(csv), Path::new(bundle)),
        [command, bundle, categories @ ..] if command == "forecast" => {
            forecast(Path::new(bundle), categories)
        }
        _ => Err(ForecastError::InvalidParameter(USAGE.to_string())),
    }
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "forecast_cli failed");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
