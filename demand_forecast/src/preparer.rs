//! Aggregation of raw sales rows into a daily series per category and size

use crate::data::SalesRecord;
use crate::encoder::{LabelEncoder, LabelKind};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Summed quantity for one (date, category, size) triple
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRow {
    pub date: NaiveDate,
    pub category: String,
    pub size: String,
    pub quantity: i64,
    pub category_code: usize,
    pub size_code: usize,
}

/// Daily series keyed by (date, category, size) plus the encoders that produced its codes
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSeries {
    /// One row per distinct triple, ordered by date, category, size
    rows: Vec<PreparedRow>,
    category_encoder: LabelEncoder,
    size_encoder: LabelEncoder,
}

impl PreparedSeries {
    pub fn rows(&self) -> &[PreparedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn category_encoder(&self) -> &LabelEncoder {
        &self.category_encoder
    }

    pub fn size_encoder(&self) -> &LabelEncoder {
        &self.size_encoder
    }

    /// Total quantity per date across all categories and sizes, in date order
    pub fn daily_totals(&self) -> Vec<(NaiveDate, f64)> {
        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for row in &self.rows {
            *totals.entry(row.date).or_insert(0.0) += row.quantity as f64;
        }
        totals.into_iter().collect()
    }

    /// Number of distinct dates in the series
    pub fn distinct_dates(&self) -> usize {
        // rows are date-ordered
        let mut count = 0;
        let mut last = None;
        for row in &self.rows {
            if last != Some(row.date) {
                count += 1;
                last = Some(row.date);
            }
        }
        count
    }
}

/// Builds a [`PreparedSeries`] from exported sales rows
#[derive(Debug, Default, Clone, Copy)]
pub struct DataPreparer;

impl DataPreparer {
    pub fn new() -> Self {
        Self
    }

    /// Group records by (date, category, size), sum their quantities and encode the labels.
    ///
    /// The result does not depend on the order of `records`.
    pub fn prepare(&self, records: &[SalesRecord]) -> Result<PreparedSeries> {
        if records.is_empty() {
            return Err(ForecastError::ValidationError(
                "No sales records to aggregate".to_string(),
            ));
        }

        let mut groups: BTreeMap<(NaiveDate, String, String), i64> = BTreeMap::new();
        for (index, record) in records.iter().enumerate() {
            if record.category.trim().is_empty() {
                return Err(ForecastError::ValidationError(format!(
                    "Record {} has an empty category",
                    index
                )));
            }
            if record.size.trim().is_empty() {
                return Err(ForecastError::ValidationError(format!(
                    "Record {} has an empty size",
                    index
                )));
            }
            if record.quantity < 0 {
                return Err(ForecastError::ValidationError(format!(
                    "Record {} has a negative quantity ({})",
                    index, record.quantity
                )));
            }
            let date = record.date()?;

            let total = groups
                .entry((date, record.category.clone(), record.size.clone()))
                .or_insert(0);
            *total = total.checked_add(record.quantity).ok_or_else(|| {
                ForecastError::ValidationError(format!(
                    "Quantity overflow for {} {} on {}",
                    record.category, record.size, date
                ))
            })?;
        }

        let category_encoder =
            LabelEncoder::fit(LabelKind::Category, groups.keys().map(|(_, c, _)| c))?;
        let size_encoder = LabelEncoder::fit(LabelKind::Size, groups.keys().map(|(_, _, s)| s))?;

        let mut rows = Vec::with_capacity(groups.len());
        for ((date, category, size), quantity) in groups {
            let category_code = category_encoder.encode(&category)?;
            let size_code = size_encoder.encode(&size)?;
            rows.push(PreparedRow {
                date,
                category,
                size,
                quantity,
                category_code,
                size_code,
            });
        }

        debug!(
            records = records.len(),
            rows = rows.len(),
            categories = category_encoder.len(),
            sizes = size_encoder.len(),
            "prepared sales series"
        );

        Ok(PreparedSeries {
            rows,
            category_encoder,
            size_encoder,
        })
    }
}
