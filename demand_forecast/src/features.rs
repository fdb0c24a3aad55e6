//! Feature vectors for the regression model

use chrono::{Datelike, NaiveDate};

/// Number of regression features
pub const FEATURE_COUNT: usize = 4;

/// Feature names in column order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["category_code", "size_code", "month", "day_of_week"];

/// `[category_code, size_code, month (1-12), day_of_week (Monday = 0)]`
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Build the feature vector for an encoded category/size on a given date
pub fn feature_vector(category_code: usize, size_code: usize, date: NaiveDate) -> FeatureVector {
    [
        category_code as f64,
        size_code as f64,
        date.month() as f64,
        date.weekday().num_days_from_monday() as f64,
    ]
}
