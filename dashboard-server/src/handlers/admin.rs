//! Admin handlers

use axum::{extract::State, Json};

use crate::session::{DashboardSession, SessionStatus};
use crate::AppState;

/// Reload the dataset and the model, replacing the current session
pub async fn reload(State(state): State<AppState>) -> Json<SessionStatus> {
    tracing::info!("Reloading dashboard session...");

    let session = DashboardSession::load(&state.config).await;
    let status = session.status();
    state.session.replace(session);

    tracing::info!(
        "Session reloaded: {} records, model {}",
        status.record_count,
        if status.model_loaded { "loaded" } else { "unavailable" }
    );
    Json(status)
}
