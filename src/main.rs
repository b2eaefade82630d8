// src/main.rs
// tokwatch - status page field watcher with Telegram notifications

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use tokwatch::commands::CommandInterpreter;
use tokwatch::config::WatchConfig;
use tokwatch::controller::WatchController;
use tokwatch::events::EventLog;
use tokwatch::extract::extract;
use tokwatch::page::{HttpPageSource, PageSource};
use tokwatch::state::AppState;
use tokwatch::tasks::MonitorLoop;
use tokwatch::telegram::{Dispatcher, TelegramClient};
use tokwatch::watch::StateStore;

#[derive(Parser)]
#[command(name = "tokwatch")]
#[command(about = "Watch a field on a status page and report changes over Telegram")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitor loop and the control API (default)
    Serve,

    /// Fetch the page once and print the value found for a room
    Check {
        /// Room label to look for
        #[arg(short, long)]
        room: String,
    },

    /// Print the stored watch state as JSON
    State,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = WatchConfig::from_env();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.tracing_level())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Check { room } => check(config, &room).await,
        Commands::State => {
            let state = StateStore::new(&config.state_path).load();
            println!("{}", serde_json::to_string_pretty(&state)?);
            Ok(())
        }
    }
}

async fn serve(config: WatchConfig) -> Result<()> {
    config.validate()?;

    info!("Starting tokwatch");
    info!("Page: {}", config.page_url);
    info!("State file: {}", config.state_path.display());

    let http = reqwest::Client::builder()
        .user_agent(concat!("tokwatch/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let log = Arc::new(EventLog::new());
    let telegram = Arc::new(TelegramClient::new(http.clone(), &config));
    let dispatcher = Dispatcher::new(telegram.clone(), log.clone());
    let controller = Arc::new(WatchController::new(
        StateStore::new(&config.state_path),
        dispatcher,
        log,
    ));

    let page = Arc::new(HttpPageSource::new(
        http,
        config.page_url.clone(),
        config.request_timeout,
    ));
    let monitor = MonitorLoop::new(
        controller.clone(),
        CommandInterpreter::new(config.chat_id.clone()),
        telegram,
        page,
        config.poll_interval,
    );
    let monitor_handle = monitor.spawn();

    let app_state = Arc::new(AppState::new(controller, config.dash_token.clone()));
    let bind_address = config.bind_address();

    tokio::select! {
        result = tokwatch::api::serve(&bind_address, app_state) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e);
            }
        }
        _ = monitor_handle => {
            error!("Monitor loop unexpectedly terminated");
        }
    }

    Ok(())
}

async fn check(config: WatchConfig, room: &str) -> Result<()> {
    let http = reqwest::Client::new();
    let page = HttpPageSource::new(http, config.page_url.clone(), config.request_timeout);
    let text = page.fetch_text().await?;

    match extract(&text, room) {
        Some(value) => println!("{room}: {value}"),
        None => println!("{room}: no value found on {}", page.url()),
    }
    Ok(())
}
