//! In-memory store of generated forecasts

use crate::pipeline::ForecastResult;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;

/// Default number of records returned by a listing
pub const DEFAULT_RECENT_LIMIT: usize = 50;

/// A stored forecast
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRecord {
    pub result: ForecastResult,
    /// When the `(category, size, month)` triple was first stored
    pub created_at: DateTime<Utc>,
    /// Insertion order, breaks ties between equal timestamps
    sequence: u64,
}

type RecordKey = (String, String, NaiveDate);

/// Forecast records unique per `(category, size, month)`
#[derive(Debug, Default)]
pub struct ForecastStore {
    records: HashMap<RecordKey, ForecastRecord>,
    next_sequence: u64,
}

impl ForecastStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert `result` stamped now
    pub fn upsert(&mut self, result: ForecastResult) {
        self.upsert_at(result, Utc::now());
    }

    /// Insert `result`, replacing demand and confidence of an existing record
    /// for the same triple while keeping its `created_at`
    pub fn upsert_at(&mut self, result: ForecastResult, now: DateTime<Utc>) {
        let key = (
            result.category.clone(),
            result.size.clone(),
            result.forecast_month,
        );

        match self.records.get_mut(&key) {
            Some(existing) => {
                existing.result.predicted_demand = result.predicted_demand;
                existing.result.confidence_score = result.confidence_score;
            }
            None => {
                let sequence = self.next_sequence;
                self.next_sequence += 1;
                self.records.insert(
                    key,
                    ForecastRecord {
                        result,
                        created_at: now,
                        sequence,
                    },
                );
            }
        }
    }

    pub fn extend<I: IntoIterator<Item = ForecastResult>>(&mut self, results: I) {
        for result in results {
            self.upsert(result);
        }
    }

    pub fn get(&self, category: &str, size: &str, month: NaiveDate) -> Option<&ForecastRecord> {
        self.records
            .get(&(category.to_string(), size.to_string(), month))
    }

    /// Up to `limit` records, newest first
    pub fn recent(&self, limit: usize) -> Vec<&ForecastRecord> {
        let mut records: Vec<&ForecastRecord> = self.records.values().collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.sequence.cmp(&a.sequence))
        });
        records.truncate(limit);
        records
    }
}
