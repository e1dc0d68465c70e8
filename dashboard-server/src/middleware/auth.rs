//! Admin authentication middleware

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{AppError, AppState};

/// Middleware: Require the configured admin bearer token
pub async fn require_admin_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let expected = state.config.admin_token.as_deref().ok_or_else(|| {
        tracing::warn!("Admin request rejected: ADMIN_TOKEN is not configured");
        AppError::Forbidden
    })?;

    let token = extract_bearer_token(&req)?;
    if !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
        tracing::warn!("Admin request rejected: invalid token");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(req).await)
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(req: &Request) -> Result<&str, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    auth_header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
