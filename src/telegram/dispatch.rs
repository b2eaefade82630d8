// src/telegram/dispatch.rs
// Best-effort notification delivery; failures land in the event log

use std::sync::Arc;

use tracing::warn;

use super::Notifier;
use crate::events::EventLog;

/// Result of a notification attempt. Failures are already logged by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "delivery outcome should be checked or explicitly discarded"]
pub enum Delivery {
    Sent,
    Failed(String),
}

#[derive(Clone)]
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    log: Arc<EventLog>,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, log: Arc<EventLog>) -> Self {
        Self { notifier, log }
    }

    /// Send `text` to the operator. Never fails the caller.
    pub async fn send(&self, text: &str) -> Delivery {
        match self.notifier.send_message(text).await {
            Ok(()) => Delivery::Sent,
            Err(e) => {
                warn!("Notification failed: {}", e);
                self.log.append(format!("Telegram send error: {e}"));
                Delivery::Failed(e.to_string())
            }
        }
    }
}
