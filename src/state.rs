// src/state.rs
// Shared state handed to HTTP handlers

use std::sync::Arc;

use crate::controller::WatchController;
use crate::events::EventLog;

#[derive(Clone)]
pub struct AppState {
    /// Same controller the monitor loop uses
    pub controller: Arc<WatchController>,
    /// Bearer token required on /api routes; None disables the control API
    pub dash_token: Option<String>,
}

impl AppState {
    pub fn new(controller: Arc<WatchController>, dash_token: Option<String>) -> Self {
        Self {
            controller,
            dash_token,
        }
    }

    pub fn events(&self) -> &Arc<EventLog> {
        self.controller.events()
    }
}
