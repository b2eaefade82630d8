// src/watch/store.rs
// Durable JSON store for WatchState (temp file + atomic rename)

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, warn};

use super::WatchState;
use crate::error::Result;

pub struct StateStore {
    path: PathBuf,
    /// Serializes writers so two saves never share the temp file
    write_guard: Mutex<()>,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_guard: Mutex::new(()),
        }
    }

    /// Read the stored state. Missing, unreadable or malformed files yield defaults.
    pub fn load(&self) -> WatchState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No state file at {}, starting fresh", self.path.display());
                return WatchState::default();
            }
            Err(e) => {
                warn!("Failed to read state file {}: {}", self.path.display(), e);
                return WatchState::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!("State file {} is malformed, using defaults: {}", self.path.display(), e);
                WatchState::default()
            }
        }
    }

    /// Write the full record. Readers see either the old or the new file, never a mix.
    pub fn save(&self, state: &WatchState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;

        let _guard = self.write_guard.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}
