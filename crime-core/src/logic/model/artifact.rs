//! Model Artifact - persisted trained classifier
//!
//! On disk the artifact is a JSON envelope:
//!
//! ```text
//! {
//!   "format_version": 1,
//!   "feature_version": 1,
//!   "layout_hash": 2739612213,
//!   "checksum": "<sha256 of the canonical model JSON>",
//!   "model": { ... ModelArtifact ... }
//! }
//! ```
//!
//! The artifact is immutable once loaded; retraining writes a new file.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::forest::{ForestParams, RandomForest};
use super::inference::{Classifier, InferenceError};
use crate::logic::features::{FeatureLayout, InputField, LayoutMismatchError, FEATURE_LAYOUT_VERSION};

/// Envelope format understood by this build
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

pub const MODEL_TYPE_RANDOM_FOREST: &str = "random_forest";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model file not found: {0}")]
    NotFound(String),

    #[error("failed to read/write model: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid model JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported artifact format v{0}")]
    UnsupportedFormat(u32),

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error(transparent)]
    Layout(#[from] LayoutMismatchError),

    #[error("invalid model: {0}")]
    Invalid(String),
}

// ============================================================================
// ARTIFACT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model_type: String,
    /// Ordered feature columns the forest was fit on.
    /// Absent in artifacts that did not record them; such a model cannot
    /// be used for prediction.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub input_schema: Vec<InputField>,
    pub target: String,
    /// Class index → label
    pub classes: Vec<String>,
    pub forest: RandomForest,
    pub params: ForestParams,
    pub seed: u64,
    pub training_rows: usize,
    pub trained_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactEnvelope {
    format_version: u32,
    feature_version: u8,
    #[serde(default)]
    layout_hash: Option<u32>,
    checksum: String,
    model: serde_json::Value,
}

fn checksum(model: &serde_json::Value) -> Result<String, ModelError> {
    let bytes = serde_json::to_vec(model)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

impl ModelArtifact {
    pub fn layout(&self) -> Option<FeatureLayout> {
        self.feature_names.as_ref().map(|names| FeatureLayout::new(names.clone()))
    }

    /// Consistency between recorded metadata and the forest itself
    pub fn validate(&self) -> Result<(), ModelError> {
        self.forest.validate().map_err(ModelError::Invalid)?;

        if self.classes.len() != self.forest.n_classes() {
            return Err(ModelError::Invalid(format!(
                "{} class labels for a {}-class forest",
                self.classes.len(),
                self.forest.n_classes()
            )));
        }

        if let Some(names) = &self.feature_names {
            if names.len() != self.forest.n_features() {
                return Err(ModelError::Invalid(format!(
                    "{} feature names for a forest fit on {} features",
                    names.len(),
                    self.forest.n_features()
                )));
            }
        }

        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ModelError> {
        let model = serde_json::to_value(self)?;
        let envelope = ArtifactEnvelope {
            format_version: ARTIFACT_FORMAT_VERSION,
            feature_version: FEATURE_LAYOUT_VERSION,
            layout_hash: self.layout().map(|l| l.hash()),
            checksum: checksum(&model)?,
            model,
        };
        Ok(serde_json::to_vec(&envelope)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let envelope: ArtifactEnvelope = serde_json::from_slice(bytes)?;

        if envelope.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelError::UnsupportedFormat(envelope.format_version));
        }

        let actual = checksum(&envelope.model)?;
        if actual != envelope.checksum {
            return Err(ModelError::ChecksumMismatch { expected: envelope.checksum, actual });
        }

        let artifact: ModelArtifact = serde_json::from_value(envelope.model)?;

        if let (Some(layout), Some(hash)) = (artifact.layout(), envelope.layout_hash) {
            layout.validate(envelope.feature_version, hash)?;
        }

        artifact.validate()?;
        Ok(artifact)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let bytes = self.to_bytes()?;
        fs::write(path, &bytes)?;

        log::info!(
            "Model saved to {} ({} trees, {} classes, {} KB)",
            path.display(),
            self.forest.n_trees(),
            self.classes.len(),
            bytes.len() / 1024
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        log::info!("Loading model from: {}", path.display());

        if !path.exists() {
            return Err(ModelError::NotFound(path.display().to_string()));
        }

        let artifact = Self::from_slice(&fs::read(path)?)?;

        log::info!(
            "Model loaded: {} trees, {} features, {} classes (trained {})",
            artifact.forest.n_trees(),
            artifact.forest.n_features(),
            artifact.classes.len(),
            artifact.trained_at.format("%Y-%m-%d %H:%M:%S")
        );
        Ok(artifact)
    }
}

impl Classifier for ModelArtifact {
    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn input_schema(&self) -> &[InputField] {
        &self.input_schema
    }

    fn predict(&self, rows: ArrayView2<f32>) -> Result<Vec<String>, InferenceError> {
        if rows.ncols() != self.forest.n_features() {
            return Err(InferenceError::ShapeMismatch {
                expected: self.forest.n_features(),
                actual: rows.ncols(),
            });
        }

        self.forest
            .predict_batch(rows)
            .into_iter()
            .map(|class| {
                self.classes
                    .get(class)
                    .cloned()
                    .ok_or(InferenceError::UnknownClass(class))
            })
            .collect()
    }

    fn confidence(&self, row: &[f32]) -> Option<f32> {
        Some(self.forest.predict_with_votes(row).confidence)
    }

    fn name(&self) -> String {
        format!("{} ({} trees)", self.model_type, self.forest.n_trees())
    }
}
