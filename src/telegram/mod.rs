// src/telegram/mod.rs
//! Messaging seams: outbound notifications and inbound operator commands.
//!
//! The monitor loop only sees the [`Notifier`] and [`CommandSource`] traits;
//! [`TelegramClient`] implements both against the Bot API, and tests plug in
//! in-memory fakes.

mod client;
mod dispatch;

pub use client::TelegramClient;
pub use dispatch::{Delivery, Dispatcher};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One operator message pulled from the command source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundCommand {
    /// Source-assigned, monotonically increasing id
    pub id: i64,
    pub chat_id: String,
    pub text: String,
}

impl InboundCommand {
    pub fn new(id: i64, chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            chat_id: chat_id.into(),
            text: text.into(),
        }
    }
}

/// Outbound one-way channel to the operator
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<()>;
}

/// Inbound long-poll channel. Delivery tracking is the caller's job (via the offset).
#[async_trait]
pub trait CommandSource: Send + Sync {
    async fn poll(&self, since_offset: Option<i64>) -> Result<Vec<InboundCommand>>;
}
