//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::session::SessionStatus;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    session: SessionStatus,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let session = state.session.current().status();

    Json(HealthResponse {
        status: if session.dataset_loaded { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        session,
    })
}
