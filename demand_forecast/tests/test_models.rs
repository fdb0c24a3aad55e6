use approx::assert_abs_diff_eq;
use chrono::{Duration, NaiveDate};
use demand_forecast::config::{BoostingConfig, Seasonality, TrendConfig};
use demand_forecast::features::{feature_vector, FeatureVector};
use demand_forecast::models::gradient_boosting::{GradientBoosting, TrainedGradientBoosting};
use demand_forecast::models::trend::{SeasonalTrend, TrainedSeasonalTrend};
use demand_forecast::models::{
    RegressionModel, TrainedRegressionModel, TrainedTrendModel, TrendModel,
};

fn create_test_history() -> Vec<(NaiveDate, f64)> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    (0..42)
        .map(|i| {
            let weekend = if i % 7 >= 5 { 8.0 } else { 0.0 };
            (start + Duration::days(i), 20.0 + 0.5 * i as f64 + weekend)
        })
        .collect()
}

fn create_test_features() -> (Vec<FeatureVector>, Vec<f64>) {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut features = Vec::new();
    let mut targets = Vec::new();
    for day in 0..28 {
        let date = start + Duration::days(day);
        for category in 0..2 {
            features.push(feature_vector(category, 0, date));
            targets.push(1.0 + 4.0 * category as f64);
        }
    }
    (features, targets)
}

#[test]
fn test_seasonal_trend() {
    let history = create_test_history();
    let model = SeasonalTrend::new(TrendConfig::default()).unwrap();

    let trained = model.train(&history).unwrap();
    assert_eq!(trained.observations(), 42);

    let next_monday = NaiveDate::from_ymd_opt(2023, 2, 13).unwrap();
    let estimate = trained.estimate(next_monday).unwrap();
    assert_abs_diff_eq!(estimate.expected, 41.0, epsilon = 2.0);
    assert!(estimate.lower <= estimate.expected && estimate.expected <= estimate.upper);
}

#[test]
fn test_seasonality_switched_off() {
    let history = create_test_history();
    let config = TrendConfig {
        weekly_seasonality: Seasonality::Disabled,
        ..TrendConfig::default()
    };
    let trained = SeasonalTrend::new(config).unwrap().train(&history).unwrap();

    let saturday = trained
        .estimate(NaiveDate::from_ymd_opt(2023, 2, 11).unwrap())
        .unwrap();
    let monday = trained
        .estimate(NaiveDate::from_ymd_opt(2023, 2, 13).unwrap())
        .unwrap();
    // a pure line keeps rising through the weekend
    assert!(monday.expected > saturday.expected);
    assert!(trained.sigma() > 0.0);
}

#[test]
fn test_trend_json_round_trip_keeps_estimates() {
    let trained = SeasonalTrend::new(TrendConfig::default())
        .unwrap()
        .train(&create_test_history())
        .unwrap();

    let json = serde_json::to_string(&trained).unwrap();
    let restored: TrainedSeasonalTrend = serde_json::from_str(&json).unwrap();

    let date = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
    assert_eq!(
        restored.estimate(date).unwrap(),
        trained.estimate(date).unwrap()
    );
}

#[test]
fn test_gradient_boosting() {
    let (features, targets) = create_test_features();
    let model = GradientBoosting::new(BoostingConfig::default()).unwrap();

    let trained = model.train(&features, &targets).unwrap();

    let predicted = trained.predict_batch(&features);
    assert_eq!(predicted.len(), targets.len());
    for (p, t) in predicted.iter().zip(targets.iter()) {
        assert_abs_diff_eq!(*p, *t, epsilon = 0.01);
    }
    assert!(trained.trees().len() <= 100);
    assert!(!model.name().is_empty());
}

#[test]
fn test_gradient_boosting_rejects_bad_input() {
    let model = GradientBoosting::new(BoostingConfig::default()).unwrap();

    assert!(model.train(&[], &[]).is_err());
    assert!(model.train(&[[0.0, 0.0, 1.0, 0.0]], &[1.0, 2.0]).is_err());
    assert!(model.train(&[[f64::NAN, 0.0, 1.0, 0.0]], &[1.0]).is_err());
}

#[test]
fn test_ensemble_json_round_trip_keeps_predictions() {
    let (features, targets) = create_test_features();
    let trained = GradientBoosting::new(BoostingConfig {
        n_estimators: 10,
        ..BoostingConfig::default()
    })
    .unwrap()
    .train(&features, &targets)
    .unwrap();

    let json = serde_json::to_string(&trained).unwrap();
    let restored: TrainedGradientBoosting = serde_json::from_str(&json).unwrap();

    assert!(restored.validate().is_ok());
    assert_eq!(restored.predict_batch(&features), trained.predict_batch(&features));
}
