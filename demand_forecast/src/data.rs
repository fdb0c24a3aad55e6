//! Historical sales rows and their loading

use crate::error::{ForecastError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// One historical order line as produced by the sales export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Category name
    pub category: String,
    /// Size code
    pub size: String,
    /// Quantity sold
    pub quantity: i64,
    /// Order date as exported, parsed during preparation
    pub order_date: String,
    /// Unit price; empty when the export has no SKU price for the category
    #[serde(rename = "price", default)]
    pub unit_price: Option<f64>,
}

impl SalesRecord {
    /// Create a record without a unit price
    pub fn new(category: &str, size: &str, quantity: i64, order_date: &str) -> Self {
        Self {
            category: category.to_string(),
            size: size.to_string(),
            quantity,
            order_date: order_date.to_string(),
            unit_price: None,
        }
    }

    /// Attach a unit price
    pub fn with_price(mut self, price: f64) -> Self {
        self.unit_price = Some(price);
        self
    }

    /// Parse the order date
    pub fn date(&self) -> Result<NaiveDate> {
        parse_order_date(&self.order_date)
    }
}

/// Parse an order date in any of the formats the export is known to emit
pub fn parse_order_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Ok(datetime.date());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Ok(datetime.date());
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Ok(datetime.date_naive());
    }

    Err(ForecastError::ValidationError(format!(
        "Unparseable order date: '{}'",
        text
    )))
}

/// Data loader for exported sales data
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load sales records from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<SalesRecord>> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let records = Self::from_reader(file)?;

        info!(path = %path.display(), records = records.len(), "loaded sales export");
        Ok(records)
    }

    /// Load sales records from any CSV source with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<SalesRecord>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for row in csv_reader.deserialize() {
            let record: SalesRecord = row?;
            records.push(record);
        }

        Ok(records)
    }
}
