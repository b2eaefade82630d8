// src/config/mod.rs
// Runtime configuration, loaded from the environment (and .env when present)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, WatchError};

pub const DEFAULT_PAGE_URL: &str = "https://www.caretrust.mv/Home/TokenStatus";
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct WatchConfig {
    // ── Watched page
    pub page_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,

    // ── Telegram
    pub bot_token: String,
    pub chat_id: String,
    pub telegram_api_base: String,
    pub long_poll_timeout: Duration,

    // ── Persistence
    pub state_path: PathBuf,

    // ── Control API
    pub host: String,
    pub port: u16,
    pub dash_token: Option<String>,

    // ── Logging
    pub log_level: String,
}

/// Parse `key` with `lookup`, falling back to `default` when it is missing or malformed.
/// Inline `# comments` and surrounding whitespace are stripped first.
fn env_var_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    // tracing is not initialized yet when config loads
                    eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        None => default,
    }
}

fn env_string<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl WatchConfig {
    /// Load from process environment, reading `.env` first if it exists
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            eprintln!("Note: .env file not found. Using environment variables and defaults.");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in production, a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            page_url: env_string(&lookup, "TOKWATCH_PAGE_URL")
                .unwrap_or_else(|| DEFAULT_PAGE_URL.to_string()),
            poll_interval: Duration::from_secs(env_var_or(&lookup, "POLL_SECONDS", 15)),
            request_timeout: Duration::from_secs(env_var_or(&lookup, "TIMEOUT", 20)),
            bot_token: env_string(&lookup, "BOT_TOKEN").unwrap_or_default(),
            chat_id: env_string(&lookup, "CHAT_ID").unwrap_or_default(),
            telegram_api_base: env_string(&lookup, "TELEGRAM_API_BASE")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API.to_string()),
            long_poll_timeout: Duration::from_secs(env_var_or(&lookup, "LONG_POLL_SECONDS", 10)),
            state_path: PathBuf::from(
                env_string(&lookup, "STATE_PATH")
                    .unwrap_or_else(|| "./data/tokwatch_state.json".to_string()),
            ),
            host: env_string(&lookup, "HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env_var_or(&lookup, "PORT", 8080),
            dash_token: env_string(&lookup, "DASH_TOKEN"),
            log_level: env_string(&lookup, "LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Check that the values the watcher cannot run without are present
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.is_empty() {
            return Err(WatchError::Config("BOT_TOKEN is not set".to_string()));
        }
        if self.chat_id.is_empty() {
            return Err(WatchError::Config("CHAT_ID is not set".to_string()));
        }
        if self.poll_interval.is_zero() {
            return Err(WatchError::Config("POLL_SECONDS must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Base URL for Bot API calls, e.g. `https://api.telegram.org/bot<token>`
    pub fn telegram_bot_url(&self) -> String {
        format!(
            "{}/bot{}",
            self.telegram_api_base.trim_end_matches('/'),
            self.bot_token
        )
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Client-side ceiling for a getUpdates call: the server-side wait plus slack
    pub fn long_poll_client_timeout(&self) -> Duration {
        self.long_poll_timeout + Duration::from_secs(20)
    }

    /// Parse the configured level, defaulting to INFO
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level
            .parse::<tracing::Level>()
            .unwrap_or(tracing::Level::INFO)
    }
}
