//! Feature Alignment
//!
//! Reconciles a locally encoded row with the layout a model was fit on:
//! - layout columns missing locally → inserted with 0
//! - local columns unknown to the layout → dropped
//! - result is in exact layout order
//!
//! Dropping unknown columns means a category never seen in training
//! contributes an all-zero block for its field. That is kept as is for
//! compatibility with existing artifacts, and reported through
//! [`AlignmentReport`] so it can be observed.

use serde::{Deserialize, Serialize};

use super::encoding::EncodedRow;
use super::layout::{FeatureLayout, FEATURE_LAYOUT_VERSION};

/// A category value the model never saw during training
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownCategory {
    pub field: String,
    pub value: String,
}

/// Diagnostics of one alignment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentReport {
    /// Layout columns that had no local value
    pub zero_filled: usize,
    /// Local columns absent from the layout
    pub dropped_columns: Vec<String>,
    /// Categorical values behind the dropped indicator columns
    pub unknown_categories: Vec<UnknownCategory>,
}

impl AlignmentReport {
    pub fn has_unknown_categories(&self) -> bool {
        !self.unknown_categories.is_empty()
    }
}

/// Row in exact layout order, stamped with the layout it was aligned to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    pub version: u8,
    pub layout_hash: u32,
    pub values: Vec<f32>,
}

impl AlignedRow {
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// JSON form for logging: values keyed by column name
    pub fn to_log_entry(&self, layout: &FeatureLayout) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "values": self.values,
            "named_values": layout.columns().iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.clone(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

pub fn align(row: &EncodedRow, layout: &FeatureLayout) -> (AlignedRow, AlignmentReport) {
    let mut values = vec![0.0f32; layout.len()];
    let mut filled = vec![false; layout.len()];
    let mut report = AlignmentReport::default();

    for column in row.columns() {
        match layout.index_of(&column.name) {
            Some(i) => {
                values[i] = column.value;
                filled[i] = true;
            }
            None => {
                report.dropped_columns.push(column.name.clone());
                if let Some(category) = &column.category {
                    report.unknown_categories.push(UnknownCategory {
                        field: column.field.clone(),
                        value: category.clone(),
                    });
                }
            }
        }
    }

    report.zero_filled = filled.iter().filter(|f| !**f).count();

    let aligned = AlignedRow {
        version: FEATURE_LAYOUT_VERSION,
        layout_hash: layout.hash(),
        values,
    };

    (aligned, report)
}
