//! Model Module - Classifier & Inference Pipeline
//!
//! Training primitives (tree, forest), the persisted artifact,
//! and the prediction pipeline that aligns observations to it.

pub mod tree;
pub mod forest;
pub mod artifact;
pub mod inference;

// Re-export common types
pub use tree::{DecisionTree, MaxFeatures, TreeParams};
pub use forest::{ForestParams, ForestVote, RandomForest};
pub use artifact::{ModelArtifact, ModelError};
pub use inference::{
    predict, predict_with_layout, Classifier, EngineStatus, InferenceError, Prediction, PredictionEngine,
    PredictionError,
};
