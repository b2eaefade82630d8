// src/events.rs
// Bounded in-memory log of operator-facing events, newest first

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

pub const EVENT_LOG_CAPACITY: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%Y-%m-%d %H:%M:%S"), self.message)
    }
}

/// Ring of recent events shared by the monitor loop and HTTP handlers.
/// Not persisted; a restart starts with an empty log.
pub struct EventLog {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    /// Record an event at the front, evicting the oldest past capacity
    pub fn append(&self, message: impl Into<String>) {
        let message = message.into();
        info!(target: "tokwatch::events", "{}", message);

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        // Stamped under the lock so timestamps stay ordered with positions
        entries.push_front(LogEntry {
            timestamp: Utc::now(),
            message,
        });
        entries.truncate(self.capacity);
    }

    /// Copy of the log, newest first
    pub fn snapshot(&self) -> Vec<LogEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
