//! Label encoding for categorical features
//!
//! Codes are assigned in sorted label order, so the same set of labels always
//! produces the same mapping regardless of the order rows arrive in.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which categorical field an encoder covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    Category,
    Size,
}

/// Bidirectional mapping between labels and dense indices in `[0, N)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EncoderRepr")]
pub struct LabelEncoder {
    kind: LabelKind,
    /// Sorted, unique; a label's position is its code
    labels: Vec<String>,
}

#[derive(Deserialize)]
struct EncoderRepr {
    kind: LabelKind,
    labels: Vec<String>,
}

impl TryFrom<EncoderRepr> for LabelEncoder {
    type Error = String;

    fn try_from(repr: EncoderRepr) -> std::result::Result<Self, Self::Error> {
        if repr.labels.is_empty() {
            return Err(format!("{:?} encoder has no labels", repr.kind));
        }
        if repr.labels.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(format!(
                "{:?} encoder labels are not sorted and unique",
                repr.kind
            ));
        }

        Ok(Self {
            kind: repr.kind,
            labels: repr.labels,
        })
    }
}

impl LabelEncoder {
    /// Build an encoder from the distinct labels observed
    pub fn fit<I, S>(kind: LabelKind, labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = labels
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();

        if distinct.is_empty() {
            return Err(ForecastError::ValidationError(format!(
                "Cannot build a {:?} encoder without labels",
                kind
            )));
        }

        Ok(Self {
            kind,
            labels: distinct.into_iter().collect(),
        })
    }

    /// Code assigned to `label`
    pub fn encode(&self, label: &str) -> Result<usize> {
        self.labels
            .binary_search_by(|known| known.as_str().cmp(label))
            .map_err(|_| match self.kind {
                LabelKind::Category => ForecastError::UnknownCategory(label.to_string()),
                LabelKind::Size => ForecastError::UnknownSize(label.to_string()),
            })
    }

    /// Label behind `code`
    pub fn decode(&self, code: usize) -> Result<&str> {
        self.labels
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| {
                ForecastError::ValidationError(format!(
                    "{:?} code {} is out of range (0..{})",
                    self.kind,
                    code,
                    self.labels.len()
                ))
            })
    }

    pub fn kind(&self) -> LabelKind {
        self.kind
    }

    /// Known labels in code order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
