// tests/monitor_flow.rs


use test_helpers::{Harness, OPERATOR_CHAT, ScriptedCommands};
use tokwatch::commands::{Action, IgnoreReason, USAGE_MESSAGE};
use tokwatch::controller::Observation;
use tokwatch::watch::{StateStore, WatchState};

#[tokio::test]
async fn test_startwatch_command_starts_watching() {
    let harness = Harness::new();
    harness.commands.push(1, OPERATOR_CHAT, "/startwatch Room 09");

    let report = harness.monitor().tick().await.unwrap();

    assert_eq!(report.commands, vec![Action::StartWatch("Room 09".to_string())]);
    let state = harness.controller.state();
    assert!(state.enabled);
    assert_eq!(state.room.as_deref(), Some("Room 09"));
    assert_eq!(state.last_value, None);
    assert_eq!(state.update_offset, Some(2));

    let sent = harness.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("Monitoring STARTED for Room 09"));
}

#[tokio::test]
async fn test_startwatch_without_room_sends_usage() {
    let harness = Harness::new();
    harness.commands.push(5, OPERATOR_CHAT, "/startwatch");

    let report = harness.monitor().tick().await.unwrap();

    assert_eq!(report.commands, vec![Action::Ignore(IgnoreReason::Usage)]);
    let state = harness.controller.state();
    assert_eq!(
        state,
        WatchState {
            update_offset: Some(6),
            ..Default::default()
        }
    );
    assert_eq!(harness.notifier.sent(), vec![USAGE_MESSAGE.to_string()]);
}

#[tokio::test]
async fn test_foreign_chat_and_unknown_commands_are_silent() {
    let harness = Harness::new();
    harness.commands.push(1, "999", "/startwatch Room 09");
    harness.commands.push(2, OPERATOR_CHAT, "/help");

    let report = harness.monitor().tick().await.unwrap();

    assert_eq!(
        report.commands,
        vec![
            Action::Ignore(IgnoreReason::Unauthorized),
            Action::Ignore(IgnoreReason::Unknown)
        ]
    );
    assert!(harness.notifier.sent().is_empty());
    let state = harness.controller.state();
    assert!(!state.enabled);
    assert_eq!(state.update_offset, Some(3));
}

#[tokio::test]
async fn test_status_command_reports_state() {
    let harness = Harness::new();
    harness.commands.push(1, OPERATOR_CHAT, "/startwatch Room 09");
    harness.commands.push(2, OPERATOR_CHAT, "/status");
    harness.page.push_text("Room 09\nAvailable");

    harness.monitor().tick().await.unwrap();

    let sent = harness.notifier.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].contains("Status: ON"));
    assert!(sent[1].contains("Room: Room 09"));
}

#[tokio::test]
async fn test_first_value_is_silent_and_change_notifies_once() {
    let harness = Harness::new();
    harness.controller.set_watch(true, Some("Room 09".to_string())).await.unwrap();
    harness.notifier.clear();
    harness.page.push_text("Room 09\nAvailable\nRoom 10\nFull");
    harness.page.push_text("Room 09\nOccupied\nRoom 10\nFull");
    harness.page.push_text("Room 09\nOccupied\nRoom 10\nAvailable");

    let monitor = harness.monitor();

    let first = monitor.tick().await.unwrap();
    assert_eq!(first.observation, Some(Observation::Baseline("Available".to_string())));
    assert!(harness.notifier.sent().is_empty());
    assert!(
        harness
            .log
            .snapshot()
            .iter()
            .any(|e| e.message == "Initial value for Room 09: Available")
    );

    let second = monitor.tick().await.unwrap();
    assert!(matches!(second.observation, Some(Observation::Changed { .. })));

    let third = monitor.tick().await.unwrap();
    assert_eq!(third.observation, Some(Observation::Unchanged("Occupied".to_string())));

    let sent = harness.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("Room 09 changed"));
    assert!(sent[0].contains("From: Available"));

    let state = harness.controller.state();
    assert_eq!(state.last_value.as_deref(), Some("Occupied"));
    assert_eq!(state.current_value.as_deref(), Some("Occupied"));
}

#[tokio::test]
async fn test_missing_value_keeps_baseline() {
    let harness = Harness::new();
    harness.controller.set_watch(true, Some("Room 09".to_string())).await.unwrap();
    harness.notifier.clear();
    harness.page.push_text("Room 09: Available");
    harness.page.push_text("Maintenance in progress");
    harness.page.push_text("Room 09: Available");

    let monitor = harness.monitor();
    monitor.tick().await.unwrap();

    let miss = monitor.tick().await.unwrap();
    assert_eq!(miss.observation, Some(Observation::Miss));
    let state = harness.controller.state();
    assert_eq!(state.current_value, None);
    assert_eq!(state.last_value.as_deref(), Some("Available"));

    let back = monitor.tick().await.unwrap();
    assert_eq!(back.observation, Some(Observation::Unchanged("Available".to_string())));
    assert!(harness.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_room_change_resets_baseline() {
    let harness = Harness::new();
    harness.commands.push(1, OPERATOR_CHAT, "/startwatch Room 09");
    harness.page.push_text("Room 09: Available\nRoom 10: Full");

    let monitor = harness.monitor();
    monitor.tick().await.unwrap();
    harness.notifier.clear();

    harness.commands.push(2, OPERATOR_CHAT, "/startwatch Room 10");
    let report = monitor.tick().await.unwrap();

    // New room starts from its own silent baseline
    assert_eq!(report.observation, Some(Observation::Baseline("Full".to_string())));
    let sent = harness.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("STARTED for Room 10"));
}

#[tokio::test]
async fn test_idle_does_not_fetch_the_page() {
    let harness = Harness::new();
    let monitor = harness.monitor();

    monitor.tick().await.unwrap();
    harness.controller.set_watch(true, None).await.unwrap();
    monitor.tick().await.unwrap();

    assert_eq!(harness.page.fetches(), 0);
    // Every tick persists the record
    assert!(harness.state_path().exists());
}

#[tokio::test]
async fn test_stopwatch_stops_polling() {
    let harness = Harness::new();
    harness.controller.set_watch(true, Some("Room 09".to_string())).await.unwrap();
    harness.page.push_text("Room 09: Available");

    let monitor = harness.monitor();
    monitor.tick().await.unwrap();
    assert_eq!(harness.page.fetches(), 1);

    harness.commands.push(1, OPERATOR_CHAT, "/stopwatch");
    let report = monitor.tick().await.unwrap();
    assert_eq!(report.commands, vec![Action::StopWatch]);
    assert_eq!(report.observation, None);
    assert_eq!(harness.page.fetches(), 1);
    assert!(!harness.controller.state().enabled);
}

#[tokio::test]
async fn test_errors_are_logged_and_the_loop_recovers() {
    let harness = Harness::new();
    harness.controller.set_watch(true, Some("Room 09".to_string())).await.unwrap();
    harness.commands.fail_next(1);
    harness.page.push_error("HTTP 503");
    harness.page.push_text("Room 09: Available");

    let monitor = harness.monitor();

    assert!(monitor.tick_or_log().await.is_none());
    assert!(monitor.tick_or_log().await.is_none());
    let report = monitor.tick_or_log().await.unwrap();
    assert_eq!(report.observation, Some(Observation::Baseline("Available".to_string())));

    let errors: Vec<String> = harness
        .log
        .snapshot()
        .into_iter()
        .map(|e| e.message)
        .filter(|m| m.starts_with("Watcher error"))
        .collect();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().any(|m| m.contains("getUpdates timed out")));
    assert!(errors.iter().any(|m| m.contains("HTTP 503")));
}

#[tokio::test]
async fn test_consumed_commands_are_not_replayed_after_restart() {
    let mut harness = Harness::with_commands(ScriptedCommands::replaying());
    harness.commands.push(10, OPERATOR_CHAT, "/startwatch Room 09");
    harness.commands.push(11, OPERATOR_CHAT, "/stopwatch");

    harness.monitor().tick().await.unwrap();
    assert_eq!(harness.notifier.sent().len(), 2);
    harness.notifier.clear();

    // Same update list delivered again to a fresh process
    harness.restart();
    let report = harness.monitor().tick().await.unwrap();

    assert!(report.commands.is_empty());
    assert!(harness.notifier.sent().is_empty());
    let state = harness.controller.state();
    assert!(!state.enabled);
    assert_eq!(state.update_offset, Some(12));
}

#[tokio::test]
async fn test_state_survives_restart() {
    let mut harness = Harness::new();
    harness.commands.push(1, OPERATOR_CHAT, "/startwatch Room 09");
    harness.page.push_text("Room 09: Available");
    harness.monitor().tick().await.unwrap();

    harness.restart();
    let reloaded = StateStore::new(harness.state_path()).load();
    assert_eq!(reloaded, harness.controller.state());
    assert_eq!(reloaded.last_value.as_deref(), Some("Available"));

    harness.page.push_text("Room 09: Occupied");
    let report = harness.monitor().tick().await.unwrap();
    assert!(matches!(report.observation, Some(Observation::Changed { .. })));
}

#[tokio::test]
async fn test_run_announces_startup() {
    let harness = Harness::new();
    let handle = harness.monitor().spawn();

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    handle.abort();

    assert!(harness.notifier.sent()[0].contains("watcher online"));
    assert!(
        harness
            .log
            .snapshot()
            .iter()
            .any(|e| e.message == "Watcher started")
    );
}
