// src/api/auth.rs
// Bearer-token gate for the control API

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::error::ApiError;
use crate::state::AppState;

/// Reject requests that don't carry `Authorization: Bearer <DASH_TOKEN>`
pub async fn require_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.dash_token.as_deref() else {
        return Err(ApiError::forbidden("Control API disabled: set DASH_TOKEN"));
    };

    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    match presented {
        Some(token) if token == expected => Ok(next.run(request).await),
        Some(_) => {
            warn!("Rejected control API request with a bad token");
            Err(ApiError::unauthorized("Invalid token"))
        }
        None => Err(ApiError::unauthorized("Missing bearer token")),
    }
}
