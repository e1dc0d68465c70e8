//! Feature Layout - Training-time Feature Definition
//!
//! **CRITICAL: a layout is the contract between trainer and predictor**
//!
//! ## Rules (NEVER break these):
//! 1. The layout is captured once, when the model is fit
//! 2. Every row fed to that model uses exactly this set and order
//! 3. Change the encoding scheme → increment FEATURE_LAYOUT_VERSION
//!
//! Unlike a fixed compile-time layout, the columns here depend on the
//! categories seen in the training data, so the layout travels with the
//! model artifact and is hashed for mismatch detection.

use std::collections::HashMap;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Encoding scheme version.
/// MUST be incremented when the column naming or ordering rules change.
pub const FEATURE_LAYOUT_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT
// ============================================================================

/// Ordered feature-column names captured at training time.
///
/// Name lookup and the layout hash are computed once on construction;
/// a layout is built when a model is loaded and reused for every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLayout {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    hash: u32,
}

impl FeatureLayout {
    pub fn new(columns: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        let hash = compute_layout_hash(&columns);

        Self { columns, index, hash }
    }

    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        Self::new(names.iter().map(|n| n.as_ref().to_string()).collect())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get feature index by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Get feature name by index
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    /// CRC32 over the version byte and every column name, NUL separated
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Validate that incoming data was produced against this layout
    pub fn validate(&self, incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
        let current_hash = self.hash();

        if incoming_version != FEATURE_LAYOUT_VERSION || incoming_hash != current_hash {
            return Err(LayoutMismatchError {
                expected_version: FEATURE_LAYOUT_VERSION,
                expected_hash: current_hash,
                actual_version: incoming_version,
                actual_hash: incoming_hash,
            });
        }

        Ok(())
    }

    pub fn info(&self) -> LayoutInfo {
        LayoutInfo {
            version: FEATURE_LAYOUT_VERSION,
            hash: self.hash(),
            feature_count: self.len(),
            feature_names: self.columns.clone(),
        }
    }
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

pub fn compute_layout_hash<S: AsRef<str>>(columns: &[S]) -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_LAYOUT_VERSION]);

    for name in columns {
        hasher.update(name.as_ref().as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information, reported by the prediction status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when feature layout doesn't match expected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), got v{actual_version} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FeatureLayout {
        FeatureLayout::from_names(&[
            "DISTRICT_A1",
            "DISTRICT_A7",
            "DAY_OF_WEEK_Monday",
            "DAY_OF_WEEK_Tuesday",
            "HOUR",
        ])
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(sample().hash(), sample().hash());
        assert_ne!(sample().hash(), 0);
    }

    #[test]
    fn test_layout_hash_depends_on_order() {
        let reordered = FeatureLayout::from_names(&[
            "DISTRICT_A7",
            "DISTRICT_A1",
            "DAY_OF_WEEK_Monday",
            "DAY_OF_WEEK_Tuesday",
            "HOUR",
        ]);
        assert_ne!(sample().hash(), reordered.hash());
    }

    #[test]
    fn test_separator_prevents_concatenation_collisions() {
        let a = FeatureLayout::from_names(&["AB", "C"]);
        let b = FeatureLayout::from_names(&["A", "BC"]);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_validate_layout() {
        let layout = sample();
        assert!(layout.validate(FEATURE_LAYOUT_VERSION, layout.hash()).is_ok());
        assert!(layout.validate(FEATURE_LAYOUT_VERSION + 1, layout.hash()).is_err());

        let err = layout
            .validate(FEATURE_LAYOUT_VERSION, layout.hash().wrapping_add(1))
            .unwrap_err();
        assert_eq!(err.expected_hash, layout.hash());
    }

    #[test]
    fn test_feature_index() {
        let layout = sample();
        assert_eq!(layout.index_of("DISTRICT_A1"), Some(0));
        assert_eq!(layout.index_of("HOUR"), Some(4));
        assert_eq!(layout.index_of("DISTRICT_B9"), None);
        assert_eq!(layout.name_at(2), Some("DAY_OF_WEEK_Monday"));
        assert_eq!(layout.name_at(100), None);
    }

    #[test]
    fn test_cached_hash_matches_columns() {
        let layout = sample();
        assert_eq!(layout.hash(), compute_layout_hash(layout.columns()));
    }

    #[test]
    fn test_duplicate_names_resolve_to_first() {
        let layout = FeatureLayout::from_names(&["HOUR", "HOUR"]);
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.index_of("HOUR"), Some(0));
    }

    #[test]
    fn test_layout_info() {
        let info = sample().info();
        assert_eq!(info.version, FEATURE_LAYOUT_VERSION);
        assert_eq!(info.hash, sample().hash());
        assert_eq!(info.feature_count, 5);
        assert_eq!(info.feature_names.len(), 5);
    }
}
