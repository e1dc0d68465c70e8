//! Trainer - offline fit of the offense-group classifier
//!
//! `records → (DISTRICT, DAY_OF_WEEK, HOUR, OFFENSE_CODE_GROUP) → one-hot → forest`
//!
//! The fitted encoder's layout becomes the artifact's `feature_names`, so
//! the prediction pipeline sees exactly the columns the forest was fit on.

use std::collections::BTreeSet;
use std::time::Instant;

use chrono::Utc;

use crate::constants;
use crate::logic::dataset::CrimeRecord;
use crate::logic::features::{crime_schema, observation, EncodingError, Observation, OneHotEncoder};
use crate::logic::model::{
    artifact::MODEL_TYPE_RANDOM_FOREST, ForestParams, ModelArtifact, RandomForest, TreeParams,
};

#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("no complete training rows")]
    NoTrainingData,

    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("forest fit failed: {0}")]
    Fit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainerConfig {
    pub n_estimators: usize,
    pub seed: u64,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_estimators: constants::DEFAULT_TRAIN_TREES,
            seed: constants::DEFAULT_TRAIN_SEED,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl TrainerConfig {
    /// Defaults overridden by `CRIME_TRAIN_TREES`, `CRIME_TRAIN_SEED`
    /// and `CRIME_TRAIN_MAX_DEPTH`
    pub fn from_env() -> Self {
        Self {
            n_estimators: constants::get_train_trees(),
            seed: constants::get_train_seed(),
            max_depth: constants::get_train_max_depth(),
            ..Default::default()
        }
    }

    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_estimators: self.n_estimators,
            bootstrap: true,
            tree: TreeParams {
                max_depth: self.max_depth,
                min_samples_split: self.min_samples_split,
                min_samples_leaf: self.min_samples_leaf,
                ..Default::default()
            },
        }
    }
}

/// Predictor observations and target labels of every complete record
pub fn training_rows(records: &[CrimeRecord]) -> (Vec<Observation>, Vec<String>) {
    records
        .iter()
        .filter_map(|r| Some((r.observation()?, r.offense_code_group.clone()?)))
        .unzip()
}

pub fn train(records: &[CrimeRecord], config: &TrainerConfig) -> Result<ModelArtifact, TrainError> {
    let start_time = Instant::now();

    let (rows, labels) = training_rows(records);
    if rows.is_empty() {
        return Err(TrainError::NoTrainingData);
    }
    log::info!(
        "Training on {} of {} records ({} incomplete dropped)",
        rows.len(),
        records.len(),
        records.len() - rows.len()
    );

    let schema = crime_schema();
    let encoder = OneHotEncoder::fit(&schema, &rows)?;
    let x = encoder.transform(&rows)?;

    let classes: Vec<String> = labels.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();
    let y: Vec<usize> = labels
        .iter()
        .map(|label| classes.binary_search(label).unwrap_or_default())
        .collect();

    log::info!(
        "Fitting {} trees on {} features, {} classes",
        config.n_estimators,
        encoder.layout().len(),
        classes.len()
    );

    let params = config.forest_params();
    let forest =
        RandomForest::fit(x.view(), &y, classes.len(), &params, config.seed).map_err(TrainError::Fit)?;

    log::info!(
        "Forest fit in {:.1}s: {} nodes, avg depth {:.1}",
        start_time.elapsed().as_secs_f64(),
        forest.total_nodes(),
        forest.avg_depth()
    );

    Ok(ModelArtifact {
        model_type: MODEL_TYPE_RANDOM_FOREST.to_string(),
        feature_names: Some(encoder.layout().columns().to_vec()),
        input_schema: schema,
        target: observation::OFFENSE_CODE_GROUP.to_string(),
        classes,
        forest,
        params,
        seed: config.seed,
        training_rows: rows.len(),
        trained_at: Utc::now(),
    })
}
