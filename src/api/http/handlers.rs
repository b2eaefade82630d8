// src/api/http/handlers.rs
// Control API handlers: read watch state and events, start/stop/set room

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::error::{ApiResult, missing_param_error};
use crate::events::LogEntry;
use crate::state::AppState;
use crate::watch::{Phase, WatchState};

#[derive(Debug, Deserialize)]
pub struct RoomRequest {
    #[serde(default)]
    pub room: Option<String>,
}

impl RoomRequest {
    fn room(&self) -> ApiResult<String> {
        self.room
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .ok_or_else(|| missing_param_error("room"))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StateResponse {
    #[serde(flatten)]
    pub state: WatchState,
    pub watching: bool,
}

impl From<WatchState> for StateResponse {
    fn from(state: WatchState) -> Self {
        let watching = state.phase() == Phase::Watching;
        Self { state, watching }
    }
}

/// Liveness probe, no auth
pub async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn get_state(State(app_state): State<Arc<AppState>>) -> Json<StateResponse> {
    Json(app_state.controller.state().into())
}

/// Event log, newest first
pub async fn get_events(State(app_state): State<Arc<AppState>>) -> Json<Vec<LogEntry>> {
    Json(app_state.events().snapshot())
}

pub async fn start_watch(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<RoomRequest>,
) -> ApiResult<Json<StateResponse>> {
    let room = request.room()?;
    let state = app_state.controller.set_watch(true, Some(room)).await?;
    Ok(Json(state.into()))
}

pub async fn stop_watch(State(app_state): State<Arc<AppState>>) -> ApiResult<Json<StateResponse>> {
    let state = app_state.controller.set_watch(false, None).await?;
    Ok(Json(state.into()))
}

/// Switch rooms without changing whether monitoring is on
pub async fn set_room(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<RoomRequest>,
) -> ApiResult<Json<StateResponse>> {
    let room = request.room()?;
    let state = app_state.controller.set_room(&room).await?;
    Ok(Json(state.into()))
}
