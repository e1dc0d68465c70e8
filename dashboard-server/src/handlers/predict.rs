//! Prediction handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use validator::Validate;

use crime_core::logic::model::EngineStatus;

use crate::models::{PredictRequest, PredictResponse};
use crate::{AppResult, AppState};

/// Predict the likely offense group for a district, day and hour
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let session = state.session.current();
    let engine = session.engine()?;

    let prediction = engine.predict(&req.observation())?;
    tracing::debug!(
        "Prediction for {}/{}/{}: {}",
        req.district,
        req.day_of_week,
        req.hour,
        prediction.label
    );

    Ok(Json(prediction.into()))
}

/// Cumulative engine counters
pub async fn status(State(state): State<AppState>) -> AppResult<Json<EngineStatus>> {
    let session = state.session.current();
    Ok(Json(session.engine()?.status()))
}
