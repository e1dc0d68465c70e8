//! Dashboard session: the dataset and prediction engine loaded at startup.
//!
//! A session is immutable. Reload builds a new one and swaps it in;
//! requests already holding the old `Arc` finish against it.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crime_core::logic::dataset::CrimeFrame;
use crime_core::logic::model::{ModelArtifact, PredictionEngine};

use crate::config::Config;
use crate::error::AppError;
use crate::store::{self, LoadError};

pub struct DashboardSession {
    dataset: Result<Arc<CrimeFrame>, LoadError>,
    engine: Result<Arc<PredictionEngine>, String>,
    loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub dataset_loaded: bool,
    pub record_count: usize,
    pub dataset_error: Option<String>,
    pub model_loaded: bool,
    pub model_error: Option<String>,
    pub loaded_at: DateTime<Utc>,
}

impl DashboardSession {
    pub fn new(
        dataset: Result<Arc<CrimeFrame>, LoadError>,
        engine: Result<Arc<PredictionEngine>, String>,
    ) -> Self {
        Self { dataset, engine, loaded_at: Utc::now() }
    }

    /// Load records from the store and the model from disk
    pub async fn load(config: &Config) -> Self {
        let dataset = store::load_dataset(config).await.map(Arc::new);
        if let Err(e) = &dataset {
            tracing::warn!("Dashboard starting without data: {}", e);
        }

        let model_path = config.model_path.clone();
        let engine = tokio::task::spawn_blocking(move || load_engine(&model_path))
            .await
            .unwrap_or_else(|e| Err(format!("model loader panicked: {}", e)));
        if let Err(e) = &engine {
            tracing::warn!("Predictions disabled: {}", e);
        }

        Self::new(dataset, engine)
    }

    pub fn dataset(&self) -> Result<&Arc<CrimeFrame>, AppError> {
        self.dataset.as_ref().map_err(|e| AppError::from(e.clone()))
    }

    /// Prediction needs both the model and the dataset
    pub fn engine(&self) -> Result<&Arc<PredictionEngine>, AppError> {
        let engine = self
            .engine
            .as_ref()
            .map_err(|e| AppError::PredictionDisabled(format!("Prediction disabled: {}", e)))?;

        if let Err(e) = &self.dataset {
            return Err(AppError::PredictionDisabled(format!("Prediction disabled: {}", e)));
        }
        Ok(engine)
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            dataset_loaded: self.dataset.is_ok(),
            record_count: self.dataset.as_ref().map(|d| d.len()).unwrap_or(0),
            dataset_error: self.dataset.as_ref().err().map(|e| e.to_string()),
            model_loaded: self.engine.is_ok(),
            model_error: self.engine.as_ref().err().cloned(),
            loaded_at: self.loaded_at,
        }
    }
}

pub fn load_engine(path: impl AsRef<Path>) -> Result<Arc<PredictionEngine>, String> {
    let artifact = ModelArtifact::load(path).map_err(|e| e.to_string())?;
    Ok(Arc::new(PredictionEngine::new(Arc::new(artifact))))
}

/// Current session, swapped wholesale on reload
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<RwLock<Arc<DashboardSession>>>,
}

impl SessionHandle {
    pub fn new(session: DashboardSession) -> Self {
        Self { inner: Arc::new(RwLock::new(Arc::new(session))) }
    }

    pub fn current(&self) -> Arc<DashboardSession> {
        self.inner.read().clone()
    }

    pub fn replace(&self, session: DashboardSession) {
        *self.inner.write() = Arc::new(session);
    }
}
