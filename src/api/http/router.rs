// src/api/http/router.rs
// HTTP router composition for the control API

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{get_events, get_state, health_handler, set_room, start_watch, stop_watch};
use crate::api::auth::require_token;
use crate::state::AppState;

/// Token-protected control endpoints, nested under /api
pub fn control_router(app_state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/state", get(get_state))
        .route("/events", get(get_events))
        .route("/watch/start", post(start_watch))
        .route("/watch/stop", post(stop_watch))
        .route("/watch/room", post(set_room))
        .route_layer(middleware::from_fn_with_state(app_state, require_token))
}

/// Full application router
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", control_router(app_state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
