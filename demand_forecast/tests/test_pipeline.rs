use chrono::{Duration, NaiveDate, TimeZone, Utc};
use demand_forecast::config::ForecasterConfig;
use demand_forecast::data::SalesRecord;
use demand_forecast::forecaster::{DemandForecaster, SharedForecaster};
use demand_forecast::pipeline::{
    generate_catalogue_forecasts, generate_forecasts, ForecastResult, SIZE_LABELS,
};
use demand_forecast::ForecastError;
use demand_forecast::store::{ForecastStore, DEFAULT_RECENT_LIMIT};
use demand_forecast::utils::next_forecast_month;
use pretty_assertions::assert_eq;

fn trained_forecaster() -> DemandForecaster {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut records = Vec::new();
    for day in 0..21i64 {
        let date = (start + Duration::days(day)).format("%Y-%m-%d").to_string();
        records.push(SalesRecord::new("Lehenga", "M", day % 4 + 2, &date));
        records.push(SalesRecord::new("Lehenga", "L", day % 3 + 1, &date));
        records.push(SalesRecord::new("Suit", "S", day % 5 + 1, &date));
    }

    let mut forecaster = DemandForecaster::new(ForecasterConfig::default()).unwrap();
    forecaster.train(&records, |_| false).unwrap();
    forecaster
}

fn result(category: &str, size: &str, demand: u64) -> ForecastResult {
    ForecastResult {
        category: category.to_string(),
        size: size.to_string(),
        forecast_month: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        predicted_demand: demand,
        confidence_score: 0.5,
    }
}

#[test]
fn test_generate_skips_unknown_combinations() {
    let forecaster = trained_forecaster();
    let month = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

    let results = generate_forecasts(&forecaster, &["Lehenga", "Suit", "Kurta"], &SIZE_LABELS, month);

    let pairs: Vec<(&str, &str)> = results
        .iter()
        .map(|r| (r.category.as_str(), r.size.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("Lehenga", "S"),
            ("Lehenga", "M"),
            ("Lehenga", "L"),
            ("Suit", "S"),
            ("Suit", "M"),
            ("Suit", "L"),
        ]
    );
    for result in &results {
        assert_eq!(result.forecast_month, month);
        assert!(result.predicted_demand >= 1);
        assert!((0.0..=1.0).contains(&result.confidence_score));
    }
}

#[test]
fn test_catalogue_forecasts_cover_trained_categories() {
    let forecaster = trained_forecaster();
    let month = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

    let results = generate_catalogue_forecasts(&forecaster, month).unwrap();

    assert_eq!(
        results,
        generate_forecasts(&forecaster, &["Lehenga", "Suit"], &SIZE_LABELS, month)
    );
    assert_eq!(results.len(), 6);
}

#[test]
fn test_catalogue_needs_trained_forecaster() {
    let forecaster = DemandForecaster::new(ForecasterConfig::default()).unwrap();
    let month = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

    assert!(matches!(
        generate_catalogue_forecasts(&forecaster, month),
        Err(ForecastError::NotTrained(_))
    ));
}

#[test]
fn test_generate_with_shared_forecaster() {
    let forecaster = trained_forecaster();
    let month = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    let direct = generate_forecasts(&forecaster, &["Suit"], &["S"], month);

    let shared = SharedForecaster::new(forecaster);
    let via_shared = generate_forecasts(&shared, &["Suit"], &["S"], month);

    assert_eq!(direct, via_shared);
    assert_eq!(direct.len(), 1);
}

#[test]
fn test_untrained_forecaster_yields_nothing() {
    let forecaster = DemandForecaster::new(ForecasterConfig::default()).unwrap();
    let month = next_forecast_month(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()).unwrap();

    let results = generate_forecasts(&forecaster, &["Lehenga"], &SIZE_LABELS, month);

    assert!(results.is_empty());
}

#[test]
fn test_store_upsert_keeps_created_at() {
    let mut store = ForecastStore::new();
    let first = Utc.with_ymd_and_hms(2024, 1, 31, 9, 0, 0).unwrap();
    let later = Utc.with_ymd_and_hms(2024, 1, 31, 10, 0, 0).unwrap();

    store.upsert_at(result("Lehenga", "M", 4), first);
    store.upsert_at(result("Lehenga", "M", 7), later);

    assert_eq!(store.len(), 1);
    let month = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    let record = store.get("Lehenga", "M", month).unwrap();
    assert_eq!(record.result.predicted_demand, 7);
    assert_eq!(record.created_at, first);
}

#[test]
fn test_store_recent_orders_newest_first() {
    let mut store = ForecastStore::new();
    let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let late = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();

    store.upsert_at(result("Suit", "S", 1), late);
    store.upsert_at(result("Lehenga", "M", 2), early);
    store.upsert_at(result("Lehenga", "L", 3), late);

    let order: Vec<(&str, &str)> = store
        .recent(DEFAULT_RECENT_LIMIT)
        .into_iter()
        .map(|r| (r.result.category.as_str(), r.result.size.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![("Lehenga", "L"), ("Suit", "S"), ("Lehenga", "M")]
    );
    assert_eq!(store.recent(1).len(), 1);
    assert!(ForecastStore::new().recent(DEFAULT_RECENT_LIMIT).is_empty());
}

#[test]
fn test_store_extend_from_pipeline() {
    let forecaster = trained_forecaster();
    let month = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    let mut store = ForecastStore::new();

    store.extend(generate_forecasts(&forecaster, &["Lehenga"], &SIZE_LABELS, month));
    store.extend(generate_forecasts(&forecaster, &["Lehenga"], &SIZE_LABELS, month));

    assert_eq!(store.len(), 3);
}
