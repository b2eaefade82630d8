// src/error.rs
// Error types for the watcher core

use thiserror::Error;

/// Main error type for tokwatch
#[derive(Error, Debug)]
pub enum WatchError {
    /// Network or HTTP-level failure talking to the page or the messaging API
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// State file could not be written (reads degrade to defaults instead)
    #[error("persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Result using WatchError
pub type Result<T> = std::result::Result<T, WatchError>;

impl WatchError {
    /// True for failures that a later tick may recover from on its own
    pub fn is_transient(&self) -> bool {
        matches!(self, WatchError::Transport(_) | WatchError::Http(_))
    }
}
