// src/controller.rs
//! Single authority for changing the watch state.
//!
//! Chat commands, the HTTP API and the monitor loop all mutate state through
//! [`WatchController`]. Each mutation is a load, mutate, save transaction run
//! under one async lock, so a web request and a loop tick can no longer
//! overwrite each other's changes. Notifications go out after the lock is
//! released; nothing here holds the lock across network I/O. Before releasing
//! it a transaction takes its place in the announcement queue, so operators
//! hear about changes in the order they were committed.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::commands::{Action, CommandInterpreter};
use crate::error::{Result, WatchError};
use crate::events::EventLog;
use crate::telegram::{Delivery, Dispatcher, InboundCommand};
use crate::watch::{StateStore, WatchState};

/// What a page poll meant for the watched room
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The room changed while the page was being fetched; result discarded
    Stale,
    /// No value found on the page; the baseline is kept
    Miss,
    /// First value after a (re)configured room, recorded silently
    Baseline(String),
    Unchanged(String),
    Changed { from: String, to: String },
}

pub struct WatchController {
    store: Arc<StateStore>,
    dispatcher: Dispatcher,
    log: Arc<EventLog>,
    write_lock: Mutex<()>,
    announce_lock: Mutex<()>,
}

impl WatchController {
    pub fn new(store: StateStore, dispatcher: Dispatcher, log: Arc<EventLog>) -> Self {
        Self {
            store: Arc::new(store),
            dispatcher,
            log,
            write_lock: Mutex::new(()),
            announce_lock: Mutex::new(()),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn events(&self) -> &Arc<EventLog> {
        &self.log
    }

    /// Current stored state
    pub fn state(&self) -> WatchState {
        self.store.load()
    }

    /// Run `f` against the stored state and persist the result before returning.
    ///
    /// The returned guard is the announcement slot for this commit; hold it while
    /// logging and notifying about the change.
    async fn transact<R>(
        &self,
        f: impl FnOnce(&mut WatchState) -> R,
    ) -> Result<(WatchState, R, MutexGuard<'_, ()>)> {
        let _guard = self.write_lock.lock().await;
        let mut state = self.store.load();
        let outcome = f(&mut state);
        self.save(state.clone()).await?;
        let slot = self.announce_lock.lock().await;
        Ok((state, outcome, slot))
    }

    /// Write on the blocking pool; `sync_all` can stall a runtime worker
    async fn save(&self, state: WatchState) -> Result<()> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.save(&state))
            .await
            .map_err(|e| WatchError::Persistence(std::io::Error::other(e)))?
    }

    /// Enable or disable watching, optionally switching rooms.
    ///
    /// A room that differs from the stored one resets `last_value` and
    /// `current_value`; repeating the current room keeps the baseline.
    pub async fn set_watch(&self, enabled: bool, room: Option<String>) -> Result<WatchState> {
        let room = room
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let (state, changed_room, _slot) = self
            .transact(|state| {
                state.enabled = enabled;
                room.as_deref().is_some_and(|r| state.replace_room(r))
            })
            .await?;

        if changed_room {
            debug!(room = ?state.room, "Baseline reset for new room");
        }

        match (&state.room, enabled) {
            (Some(room), true) => {
                self.log.append(format!("Monitoring STARTED for {room}"));
                self.announce(&format!("\u{2705} Monitoring STARTED for {room}")).await;
            }
            (None, true) => {}
            (_, false) => {
                self.log.append("Monitoring STOPPED");
                self.announce("\u{1f6d1} Monitoring STOPPED").await;
            }
        }

        Ok(state)
    }

    /// Change the room without touching `enabled`
    pub async fn set_room(&self, room: &str) -> Result<WatchState> {
        let room = room.trim().to_string();
        let (state, _, _slot) = self.transact(|state| state.replace_room(&room)).await?;

        let mode = if state.enabled { "ON" } else { "OFF" };
        self.log.append(format!("Room set to {room} (monitoring unchanged)"));
        self.announce(&format!("\u{2139}\u{fe0f} Room set to {room} (monitoring {mode})"))
            .await;

        Ok(state)
    }

    /// Rewrite the current record as-is, surfacing storage failures
    pub async fn persist(&self) -> Result<WatchState> {
        let (state, _, _) = self.transact(|_| ()).await?;
        Ok(state)
    }

    /// Send the status summary to the operator. Read-only.
    pub async fn report_status(&self) -> WatchState {
        let state = self.store.load();
        self.announce(&state.status_report()).await;
        state
    }

    /// Interpret `command` and persist the advanced cursor before anything acts on it
    pub async fn consume_command(
        &self,
        interpreter: &CommandInterpreter,
        command: &InboundCommand,
    ) -> Result<Action> {
        let (_, action, _) = self
            .transact(|state| interpreter.interpret(command, state))
            .await?;
        Ok(action)
    }

    /// Apply one page poll for `room`, notifying on a real change
    pub async fn record_observation(&self, room: &str, value: Option<String>) -> Result<Observation> {
        let (_, observation, _slot) = self
            .transact(|state| {
                if state.watched_room() != Some(room) {
                    return Observation::Stale;
                }
                state.current_value = value.clone();

                let Some(current) = value else {
                    return Observation::Miss;
                };
                match state.last_value.replace(current.clone()) {
                    None => Observation::Baseline(current),
                    Some(last) if last != current => Observation::Changed {
                        from: last,
                        to: current,
                    },
                    Some(_) => Observation::Unchanged(current),
                }
            })
            .await?;

        match &observation {
            Observation::Baseline(value) => {
                self.log.append(format!("Initial value for {room}: {value}"));
            }
            Observation::Changed { from, to } => {
                self.announce(&format!(
                    "\u{1f514} Token status update\n{room} changed\nFrom: {from}\nTo:   {to}"
                ))
                .await;
                self.log.append(format!("{room} changed: {from} -> {to}"));
            }
            Observation::Stale => debug!(room, "Discarding observation for a room no longer watched"),
            Observation::Miss | Observation::Unchanged(_) => {}
        }

        Ok(observation)
    }

    async fn announce(&self, text: &str) {
        if let Delivery::Failed(reason) = self.dispatcher.send(text).await {
            debug!("Announcement not delivered: {}", reason);
        }
    }
}
