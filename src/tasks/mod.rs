// src/tasks/mod.rs

//! Background monitor loop.
//! Drains operator commands, polls the page, diffs and notifies, then sleeps.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::commands::{Action, CommandInterpreter};
use crate::controller::{Observation, WatchController};
use crate::error::Result;
use crate::extract::extract;
use crate::page::PageSource;
use crate::telegram::CommandSource;

pub const ONLINE_MESSAGE: &str = "\u{1f916} Token watcher online.\nUse /startwatch Room 09";

/// Summary of one tick, mostly for tests and debug logs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TickReport {
    pub commands: Vec<Action>,
    pub observation: Option<Observation>,
}

pub struct MonitorLoop {
    controller: Arc<WatchController>,
    interpreter: CommandInterpreter,
    commands: Arc<dyn CommandSource>,
    page: Arc<dyn PageSource>,
    interval: Duration,
}

impl MonitorLoop {
    pub fn new(
        controller: Arc<WatchController>,
        interpreter: CommandInterpreter,
        commands: Arc<dyn CommandSource>,
        page: Arc<dyn PageSource>,
        interval: Duration,
    ) -> Self {
        Self {
            controller,
            interpreter,
            commands,
            page,
            interval,
        }
    }

    /// Spawn the loop onto the runtime. It only stops when the runtime does.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    pub async fn run(self) {
        info!("Monitor loop started (interval: {:?})", self.interval);
        self.controller.events().append("Watcher started");
        let _ = self.controller.dispatcher().send(ONLINE_MESSAGE).await;

        loop {
            self.tick_or_log().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One tick with errors caught at the boundary
    pub async fn tick_or_log(&self) -> Option<TickReport> {
        match self.tick().await {
            Ok(report) => {
                debug!(?report, "Tick complete");
                Some(report)
            }
            Err(e) => {
                if e.is_transient() {
                    warn!("Watcher tick failed, retrying next tick: {}", e);
                } else {
                    error!("Watcher tick failed: {}", e);
                }
                self.controller.events().append(format!("Watcher error: {e}"));
                None
            }
        }
    }

    /// Drain commands, then poll the page if a room is being watched
    pub async fn tick(&self) -> Result<TickReport> {
        let mut report = TickReport::default();

        let offset = self.controller.state().update_offset;
        for command in self.commands.poll(offset).await? {
            if offset.is_some_and(|o| command.id < o) {
                debug!(update_id = command.id, "Skipping already consumed update");
                continue;
            }
            let action = self
                .controller
                .consume_command(&self.interpreter, &command)
                .await?;
            self.interpreter
                .execute(action.clone(), &self.controller)
                .await?;
            report.commands.push(action);
        }

        let state = self.controller.state();
        if let Some(room) = state.watched_room() {
            let page_text = self.page.fetch_text().await?;
            let value = extract(&page_text, room);
            let observation = self.controller.record_observation(room, value).await?;
            report.observation = Some(observation);
        }

        self.controller.persist().await?;
        Ok(report)
    }
}
