// src/api/mod.rs
// Control API: the web-facing surface over the watch controller

pub mod auth;
pub mod error;
pub mod http;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

pub use error::{ApiError, ApiResult};
pub use http::create_router;

use crate::state::AppState;

/// Bind and serve the control API until the server fails
pub async fn serve(bind_address: &str, app_state: Arc<AppState>) -> Result<()> {
    if app_state.dash_token.is_none() {
        info!("Control API auth: DISABLED (set DASH_TOKEN to enable /api)");
    }

    let app = create_router(app_state);
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!("Control API listening on http://{}", bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
