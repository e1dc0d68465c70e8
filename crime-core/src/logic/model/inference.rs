//! Inference - Feature Alignment & Prediction Pipeline
//!
//! `observation → local one-hot encode → align to training layout → predict`
//!
//! The pipeline never mutates the model or the observation. The model is
//! shared read-only (`Arc`) for the whole session, so predictions need no
//! locking; only the engine's counters are atomics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::logic::features::{
    align, encode_observation, AlignedRow, AlignmentReport, EncodingError, FeatureLayout, InputField,
    LayoutInfo, Observation,
};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("model expects {expected} feature columns, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("model produced class index {0} with no label")]
    UnknownClass(usize),

    #[error("model returned no prediction")]
    EmptyOutput,

    #[error("{0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("model artifact does not expose its trained feature columns")]
    MissingFeatureMetadata,

    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Trait for trained classifiers (random forest, external runtimes, test doubles)
pub trait Classifier: Send + Sync {
    /// Ordered feature columns the model was fit on, if it recorded them
    fn feature_names(&self) -> Option<&[String]>;

    /// Raw fields an observation must supply
    fn input_schema(&self) -> &[InputField];

    /// `N rows × K aligned columns → N labels`
    fn predict(&self, rows: ArrayView2<f32>) -> Result<Vec<String>, InferenceError>;

    /// Probability of the predicted label for one aligned row
    fn confidence(&self, _row: &[f32]) -> Option<f32> {
        None
    }

    fn name(&self) -> String {
        "classifier".to_string()
    }
}

// ============================================================================
// PREDICTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: Option<f32>,
    /// Exact row handed to the model
    pub aligned: AlignedRow,
    pub report: AlignmentReport,
    pub inference_time_us: u64,
}

/// Run the three pipeline steps for one observation
pub fn predict(model: &dyn Classifier, observation: &Observation) -> Result<Prediction, PredictionError> {
    let layout = model
        .feature_names()
        .map(FeatureLayout::from_names)
        .ok_or(PredictionError::MissingFeatureMetadata)?;

    predict_with_layout(model, &layout, observation)
}

/// Same pipeline against a layout already built from `model.feature_names()`
pub fn predict_with_layout(
    model: &dyn Classifier,
    layout: &FeatureLayout,
    observation: &Observation,
) -> Result<Prediction, PredictionError> {
    let start_time = Instant::now();

    // Step 1 - local encode
    let encoded = encode_observation(model.input_schema(), observation)?;

    // Step 2 - align
    let (aligned, report) = align(&encoded, layout);

    // Step 3 - predict
    let input = Array2::from_shape_vec((1, aligned.len()), aligned.values.clone())
        .map_err(|e| InferenceError::Backend(format!("Array error: {}", e)))?;

    let label = model
        .predict(input.view())?
        .into_iter()
        .next()
        .ok_or(InferenceError::EmptyOutput)?;

    let confidence = model.confidence(aligned.as_slice());

    Ok(Prediction {
        label,
        confidence,
        aligned,
        report,
        inference_time_us: start_time.elapsed().as_micros() as u64,
    })
}

// ============================================================================
// SESSION ENGINE
// ============================================================================

/// Engine status for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub model_name: String,
    /// Training layout, absent when the model did not record it
    pub layout: Option<LayoutInfo>,
    pub prediction_count: u64,
    pub failure_count: u64,
    /// Unknown categories silently dropped during alignment, cumulative
    pub dropped_category_count: u64,
    pub avg_latency_ms: f32,
}

/// Session-scoped wrapper around a loaded model, with counters.
/// The training layout is built once here and shared by every prediction.
pub struct PredictionEngine {
    model: Arc<dyn Classifier>,
    layout: Option<FeatureLayout>,
    latency_sum_us: AtomicU64,
    prediction_count: AtomicU64,
    failure_count: AtomicU64,
    dropped_categories: AtomicU64,
}

impl PredictionEngine {
    pub fn new(model: Arc<dyn Classifier>) -> Self {
        let layout = model.feature_names().map(FeatureLayout::from_names);
        match &layout {
            Some(layout) => log::info!(
                "Model {} layout: {} columns (hash: {:08x})",
                model.name(),
                layout.len(),
                layout.hash()
            ),
            None => log::warn!("Model {} has no feature metadata; predictions will fail", model.name()),
        }

        Self {
            model,
            layout,
            latency_sum_us: AtomicU64::new(0),
            prediction_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            dropped_categories: AtomicU64::new(0),
        }
    }

    pub fn predict(&self, observation: &Observation) -> Result<Prediction, PredictionError> {
        let result = match &self.layout {
            Some(layout) => predict_with_layout(self.model.as_ref(), layout, observation),
            None => Err(PredictionError::MissingFeatureMetadata),
        };

        match result {
            Ok(prediction) => {
                let dropped = prediction.report.unknown_categories.len() as u64;
                if dropped > 0 {
                    log::warn!(
                        "Dropped {} unknown categor{} during alignment: {:?}",
                        dropped,
                        if dropped == 1 { "y" } else { "ies" },
                        prediction.report.unknown_categories
                    );
                }
                log::debug!(
                    "Predicted {} in {}us ({} columns zero-filled)",
                    prediction.label,
                    prediction.inference_time_us,
                    prediction.report.zero_filled
                );
                if log::log_enabled!(log::Level::Debug) {
                    if let Some(layout) = &self.layout {
                        log::debug!("Aligned row: {}", prediction.aligned.to_log_entry(layout));
                    }
                }

                self.dropped_categories.fetch_add(dropped, Ordering::Relaxed);
                self.latency_sum_us.fetch_add(prediction.inference_time_us, Ordering::Relaxed);
                self.prediction_count.fetch_add(1, Ordering::Relaxed);
                Ok(prediction)
            }
            Err(e) => {
                log::error!("Prediction failed: {}", e);
                self.failure_count.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    pub fn status(&self) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.prediction_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        EngineStatus {
            model_loaded: true,
            model_name: self.model.name(),
            layout: self.layout.as_ref().map(FeatureLayout::info),
            prediction_count: count,
            failure_count: self.failure_count.load(Ordering::Relaxed),
            dropped_category_count: self.dropped_categories.load(Ordering::Relaxed),
            avg_latency_ms: avg,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::crime_schema;
    use parking_lot::Mutex;

    /// Records every row it is given and answers with a fixed label
    struct RecordingClassifier {
        features: Option<Vec<String>>,
        schema: Vec<InputField>,
        seen: Mutex<Vec<Vec<f32>>>,
    }

    impl RecordingClassifier {
        fn new(features: Option<&[&str]>) -> Self {
            Self {
                features: features.map(|f| f.iter().map(|s| s.to_string()).collect()),
                schema: crime_schema(),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last_row(&self) -> Vec<f32> {
            self.seen.lock().last().cloned().unwrap()
        }
    }

    impl Classifier for RecordingClassifier {
        fn feature_names(&self) -> Option<&[String]> {
            self.features.as_deref()
        }

        fn input_schema(&self) -> &[InputField] {
            &self.schema
        }

        fn predict(&self, rows: ArrayView2<f32>) -> Result<Vec<String>, InferenceError> {
            let mut seen = self.seen.lock();
            let mut out = Vec::new();
            for row in rows.rows() {
                seen.push(row.to_vec());
                // label depends on the row so determinism is observable
                out.push(if row.sum() > 2.0 { "Larceny".to_string() } else { "Vandalism".to_string() });
            }
            Ok(out)
        }
    }

    const FEATURES: &[&str] = &[
        "DISTRICT_A1",
        "DISTRICT_A7",
        "DAY_OF_WEEK_Monday",
        "DAY_OF_WEEK_Tuesday",
        "HOUR",
    ];

    #[test]
    fn test_model_receives_aligned_row() {
        let model = RecordingClassifier::new(Some(FEATURES));
        let prediction = predict(&model, &Observation::crime("A1", "Monday", 14)).unwrap();

        assert_eq!(model.last_row(), vec![1.0, 0.0, 1.0, 0.0, 14.0]);
        assert_eq!(prediction.aligned.values, vec![1.0, 0.0, 1.0, 0.0, 14.0]);
        assert_eq!(prediction.label, "Larceny");
        assert!(prediction.report.unknown_categories.is_empty());
    }

    #[test]
    fn test_unseen_categories_still_predict() {
        let model = RecordingClassifier::new(Some(FEATURES));
        let prediction = predict(&model, &Observation::crime("B9", "Sunday", 3)).unwrap();

        assert_eq!(model.last_row(), vec![0.0, 0.0, 0.0, 0.0, 3.0]);
        assert_eq!(prediction.report.unknown_categories.len(), 2);
        assert!(!prediction.label.is_empty());
    }

    #[test]
    fn test_missing_feature_metadata() {
        let model = RecordingClassifier::new(None);
        let err = predict(&model, &Observation::crime("A1", "Monday", 14)).unwrap_err();

        assert_eq!(err, PredictionError::MissingFeatureMetadata);
        assert!(model.seen.lock().is_empty());
    }

    #[test]
    fn test_missing_field_is_encoding_error() {
        let model = RecordingClassifier::new(Some(FEATURES));
        let obs = Observation::new().with("DISTRICT", "A1").with("HOUR", 14);
        let err = predict(&model, &obs).unwrap_err();

        assert!(matches!(err, PredictionError::Encoding(EncodingError::MissingField(_))));
        assert!(model.seen.lock().is_empty());
    }

    #[test]
    fn test_deterministic_and_pure() {
        let model = RecordingClassifier::new(Some(FEATURES));
        let obs = Observation::crime("A7", "Tuesday", 22);
        let before = obs.clone();

        let first = predict(&model, &obs).unwrap();
        for _ in 0..5 {
            let again = predict(&model, &obs).unwrap();
            assert_eq!(again.label, first.label);
            assert_eq!(again.aligned, first.aligned);
        }
        assert_eq!(obs, before);
        assert_eq!(model.feature_names().unwrap().len(), FEATURES.len());
    }

    #[test]
    fn test_engine_counts_dropped_categories() {
        let engine = PredictionEngine::new(Arc::new(RecordingClassifier::new(Some(FEATURES))));

        engine.predict(&Observation::crime("A1", "Monday", 1)).unwrap();
        engine.predict(&Observation::crime("B9", "Monday", 1)).unwrap();
        engine.predict(&Observation::crime("B9", "Sunday", 1)).unwrap();
        assert!(engine.predict(&Observation::new()).is_err());

        let status = engine.status();
        assert_eq!(status.prediction_count, 3);
        assert_eq!(status.failure_count, 1);
        assert_eq!(status.dropped_category_count, 3);
        let layout = status.layout.unwrap();
        assert_eq!(layout.feature_count, 5);
        assert_eq!(layout.hash, FeatureLayout::from_names(FEATURES).hash());
    }

    #[test]
    fn test_engine_reuses_layout_built_at_load() {
        let engine = PredictionEngine::new(Arc::new(RecordingClassifier::new(Some(FEATURES))));

        let first = engine.predict(&Observation::crime("A1", "Monday", 14)).unwrap();
        let second = engine.predict(&Observation::crime("A7", "Tuesday", 3)).unwrap();

        assert_eq!(first.aligned.values, vec![1.0, 0.0, 1.0, 0.0, 14.0]);
        assert_eq!(second.aligned.values, vec![0.0, 1.0, 0.0, 1.0, 3.0]);
        assert_eq!(first.aligned.layout_hash, second.aligned.layout_hash);
    }

    #[test]
    fn test_engine_without_metadata_counts_failures() {
        let engine = PredictionEngine::new(Arc::new(RecordingClassifier::new(None)));

        let err = engine.predict(&Observation::crime("A1", "Monday", 14)).unwrap_err();
        assert_eq!(err, PredictionError::MissingFeatureMetadata);

        let status = engine.status();
        assert!(status.layout.is_none());
        assert_eq!(status.failure_count, 1);
    }
}
