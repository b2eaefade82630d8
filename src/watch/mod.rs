// src/watch/mod.rs
// Watch state record and its durable store

mod store;

pub use store::StateStore;

use serde::{Deserialize, Serialize};

/// What is being watched and what was last seen.
///
/// Every field defaults so that partial or older state files still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchState {
    /// Whether polling and diffing are active
    pub enabled: bool,
    /// Label of the field being watched on the page
    pub room: Option<String>,
    /// Baseline value, already seen or notified
    pub last_value: Option<String>,
    /// Outcome of the most recent extraction
    pub current_value: Option<String>,
    /// Command cursor: updates with an id below this have been consumed
    pub update_offset: Option<i64>,
}

/// Derived loop phase for a given state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Watching,
}

impl WatchState {
    pub fn phase(&self) -> Phase {
        match (&self.room, self.enabled) {
            (Some(_), true) => Phase::Watching,
            _ => Phase::Idle,
        }
    }

    /// Room to poll, only when watching
    pub fn watched_room(&self) -> Option<&str> {
        match self.phase() {
            Phase::Watching => self.room.as_deref(),
            Phase::Idle => None,
        }
    }

    /// Move the command cursor forward; it never goes backwards
    pub fn advance_offset(&mut self, next: i64) {
        if self.update_offset.is_none_or(|current| next > current) {
            self.update_offset = Some(next);
        }
    }

    /// Point the watch at a new room. Returns false when it was already watching it,
    /// in which case the baseline is kept.
    pub fn replace_room(&mut self, room: &str) -> bool {
        if self.room.as_deref() == Some(room) {
            return false;
        }
        self.room = Some(room.to_string());
        self.last_value = None;
        self.current_value = None;
        true
    }

    /// Multi-line status report sent for `/status`
    pub fn status_report(&self) -> String {
        let status = if self.enabled { "ON \u{2705}" } else { "OFF \u{1f6d1}" };
        format!(
            "\u{1f4ca} Status: {}\nRoom: {}\nCurrent: {}\nLast alerted: {}",
            status,
            display_opt(&self.room),
            display_opt(&self.current_value),
            display_opt(&self.last_value),
        )
    }
}

fn display_opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("None")
}
