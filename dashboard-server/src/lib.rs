//! Crime Dashboard Server
//!
//! Crime analysis & prediction API over the historical incident records.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      CRIME DASHBOARD                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────────┐  ┌───────────────────┐  │
//! │  │  API      │  │  Session         │  │  Prediction       │  │
//! │  │  (Axum)   │──│  dataset + model │──│  encode → align   │  │
//! │  │           │  │  (swap on reload)│  │  → forest         │  │
//! │  └───────────┘  └────────┬─────────┘  └───────────────────┘  │
//! │                          ▼ load (open → query → close)       │
//! │                   ┌─────────────┐                            │
//! │                   │ PostgreSQL  │                            │
//! │                   └─────────────┘                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod store;
pub mod session;
pub mod models;
pub mod handlers;
pub mod middleware;
pub mod error;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};

pub use error::{AppError, AppResult};
use session::SessionHandle;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub session: SessionHandle,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    // Dashboard routes
    let crime_routes = Router::new()
        .route("/api/v1/filters", get(handlers::filters::options))
        .route("/api/v1/crimes/summary", get(handlers::stats::summary))
        .route("/api/v1/crimes/trends/monthly", get(handlers::stats::monthly_trends))
        .route("/api/v1/crimes/top-offenses", get(handlers::stats::top_offenses))
        .route("/api/v1/crimes/heatmap", get(handlers::stats::heatmap));

    // Prediction routes
    let predict_routes = Router::new()
        .route("/api/v1/predict", post(handlers::predict::predict))
        .route("/api/v1/predict/status", get(handlers::predict::status));

    // Admin routes (bearer token from ADMIN_TOKEN)
    let admin_routes = Router::new()
        .route("/api/v1/admin/reload", post(handlers::admin::reload))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_admin_token,
        ));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health::check))
        .merge(admin_routes)
        .merge(crime_routes)
        .merge(predict_routes)
        .fallback(handlers::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
