//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.

/// Historical incident export, relative to the working directory
pub const DEFAULT_DATA_PATH: &str = "data/crime.csv";

/// Trained model artifact, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "models/crime_model.json";

/// Document collection holding the incident records
pub const DEFAULT_COLLECTION: &str = "crimes";

/// Default number of trees in the forest
pub const DEFAULT_TRAIN_TREES: usize = 100;

/// Default RNG seed for training
pub const DEFAULT_TRAIN_SEED: u64 = 42;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Crime Dashboard";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model artifact path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Get incident collection name from environment or use default
pub fn get_collection() -> String {
    std::env::var("CRIME_COLLECTION")
        .unwrap_or_else(|_| DEFAULT_COLLECTION.to_string())
}

/// Get tree count from environment or use default
pub fn get_train_trees() -> usize {
    std::env::var("CRIME_TRAIN_TREES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TRAIN_TREES)
}

/// Get training seed from environment or use default
pub fn get_train_seed() -> u64 {
    std::env::var("CRIME_TRAIN_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TRAIN_SEED)
}

/// Get maximum tree depth from environment; unlimited if unset
pub fn get_train_max_depth() -> Option<usize> {
    std::env::var("CRIME_TRAIN_MAX_DEPTH")
        .ok()
        .and_then(|s| s.parse().ok())
}
