// src/commands.rs
//! Operator chat commands.
//!
//! `interpret` turns an inbound message into an [`Action`] and moves the
//! command cursor past it; `execute` applies the action through the
//! [`WatchController`]. The cursor is committed before the action runs, so a
//! crash in between skips that command instead of replaying it.

use tracing::debug;

use crate::controller::WatchController;
use crate::error::Result;
use crate::telegram::InboundCommand;
use crate::watch::WatchState;

pub const USAGE_MESSAGE: &str = "\u{274c} Usage: /startwatch Room 09";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    StartWatch(String),
    StopWatch,
    ReportStatus,
    Ignore(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Sent from a chat other than the operator's
    Unauthorized,
    /// `/startwatch` without a room
    Usage,
    /// Not a command we know
    Unknown,
}

pub struct CommandInterpreter {
    operator_chat: String,
}

impl CommandInterpreter {
    pub fn new(operator_chat: impl Into<String>) -> Self {
        Self {
            operator_chat: operator_chat.into(),
        }
    }

    /// Decide what `command` asks for. Always advances `state.update_offset` past it.
    pub fn interpret(&self, command: &InboundCommand, state: &mut WatchState) -> Action {
        state.advance_offset(command.id.saturating_add(1));

        if command.chat_id != self.operator_chat {
            debug!(update_id = command.id, "Ignoring command from unknown chat");
            return Action::Ignore(IgnoreReason::Unauthorized);
        }

        let (verb, rest) = split_command(&command.text);
        match verb.as_str() {
            "/startwatch" if rest.is_empty() => Action::Ignore(IgnoreReason::Usage),
            "/startwatch" => Action::StartWatch(rest.to_string()),
            "/stopwatch" => Action::StopWatch,
            "/status" => Action::ReportStatus,
            _ => Action::Ignore(IgnoreReason::Unknown),
        }
    }

    /// Carry out an action. Usage errors are answered in chat; other ignores are silent.
    pub async fn execute(&self, action: Action, controller: &WatchController) -> Result<()> {
        match action {
            Action::StartWatch(room) => {
                controller.set_watch(true, Some(room)).await?;
            }
            Action::StopWatch => {
                controller.set_watch(false, None).await?;
            }
            Action::ReportStatus => {
                controller.report_status().await;
            }
            Action::Ignore(IgnoreReason::Usage) => {
                let _ = controller.dispatcher().send(USAGE_MESSAGE).await;
            }
            Action::Ignore(IgnoreReason::Unauthorized | IgnoreReason::Unknown) => {}
        }
        Ok(())
    }
}

/// Split into a lowercased verb (minus any `@botname` suffix) and the trimmed remainder
fn split_command(text: &str) -> (String, &str) {
    let text = text.trim();
    let (verb, rest) = match text.find(char::is_whitespace) {
        Some(idx) => (&text[..idx], text[idx..].trim()),
        None => (text, ""),
    };
    let verb = verb.split('@').next().unwrap_or(verb).to_lowercase();
    (verb, rest)
}
