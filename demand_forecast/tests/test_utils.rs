use chrono::NaiveDate;
use demand_forecast::config::SplitConfig;
use demand_forecast::utils::{next_forecast_month, train_test_split};
use demand_forecast::ForecastError;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case(5, 1)]
#[case(10, 2)]
#[case(11, 3)]
#[case(540, 108)]
fn test_holdout_size(#[case] n: usize, #[case] holdout: usize) {
    let split = train_test_split(n, &SplitConfig::default()).unwrap();

    assert_eq!(split.holdout.len(), holdout);
    assert_eq!(split.train.len(), n - holdout);

    let mut all: Vec<usize> = split.train.iter().chain(&split.holdout).copied().collect();
    all.sort_unstable();
    assert_eq!(all, (0..n).collect::<Vec<_>>());
}

#[test]
fn test_split_is_reproducible() {
    let config = SplitConfig::default();
    assert_eq!(
        train_test_split(50, &config).unwrap(),
        train_test_split(50, &config).unwrap()
    );

    let other_seed = SplitConfig {
        seed: 7,
        ..SplitConfig::default()
    };
    assert_ne!(
        train_test_split(50, &config).unwrap(),
        train_test_split(50, &other_seed).unwrap()
    );
}

#[test]
fn test_split_needs_minimum_rows() {
    let result = train_test_split(4, &SplitConfig::default());
    assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
}

#[rstest]
#[case("2024-01-15", "2024-02-01")]
#[case("2024-01-31", "2024-02-01")]
#[case("2024-12-01", "2025-01-01")]
#[case("2023-02-28", "2023-03-01")]
fn test_next_forecast_month(#[case] today: &str, #[case] expected: &str) {
    let today: NaiveDate = today.parse().unwrap();
    let expected: NaiveDate = expected.parse().unwrap();

    assert_eq!(next_forecast_month(today).unwrap(), expected);
}
