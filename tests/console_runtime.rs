//! Console event loop behavior over an in-process transport.

use std::sync::Arc;
use std::time::Duration;

use edgeops_api::console::{spawn_console, ClientStatusState, ConsoleHandle, ConsoleSettings, FrontendColor, Phase};

mod common;
use common::{ScriptedTransport, Step};

fn settings(interval_ms: u64, auto_refresh: bool) -> ConsoleSettings {
    ConsoleSettings {
        refresh_interval: Duration::from_millis(interval_ms),
        request_timeout: Duration::from_secs(2),
        auto_refresh,
    }
}

async fn wait_until<F>(console: &ConsoleHandle, predicate: F) -> ClientStatusState
where
    F: FnMut(&ClientStatusState) -> bool,
{
    let mut updates = console.subscribe();
    let state = tokio::time::timeout(Duration::from_secs(5), updates.wait_for(predicate))
        .await
        .expect("condition not reached in time")
        .expect("console stopped")
        .clone();
    state
}

fn version_of(state: &ClientStatusState) -> Option<&str> {
    state.version.as_ref().map(|v| v.version.as_str())
}

#[tokio::test]
async fn later_refresh_beats_slow_initial_load() {
    let transport = Arc::new(ScriptedTransport::new(vec![Step::ok("v-slow", 400), Step::ok("v-fast", 20)]));
    let console = spawn_console(transport.clone(), settings(60_000, true));

    tokio::time::sleep(Duration::from_millis(50)).await;
    console.refresh();

    let state = wait_until(&console, |s| s.phase == Phase::Ready).await;
    assert_eq!(version_of(&state), Some("v-fast"));

    // Let the slow initial cycle finish; it must not overwrite.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let state = console.snapshot();
    assert_eq!(version_of(&state), Some("v-fast"));
    assert_eq!(state.phase, Phase::Ready);
    assert_eq!(transport.cycles(), 2);

    console.shutdown().await;
}

#[tokio::test]
async fn failed_refresh_keeps_last_good_payloads() {
    let transport = Arc::new(ScriptedTransport::new(vec![Step::ok("v1", 0), Step::health_down(0)]));
    let console = spawn_console(transport, settings(60_000, true));

    wait_until(&console, |s| s.phase == Phase::Ready).await;
    console.refresh();

    let state = wait_until(&console, |s| s.phase == Phase::Failed).await;
    assert_eq!(state.error.as_deref(), Some("Health failed: 503"));
    assert_eq!(version_of(&state), Some("v1"));
    assert_eq!(state.health.as_ref().map(|h| h.identity.version.as_str()), Some("v1"));
    assert!(!state.health_ok());

    console.shutdown().await;
}

#[tokio::test]
async fn recovery_clears_error() {
    let transport = Arc::new(ScriptedTransport::new(vec![Step::health_down(0), Step::ok("v2", 0)]));
    let console = spawn_console(transport, settings(60_000, false));

    let state = wait_until(&console, |s| s.phase == Phase::Failed).await;
    assert!(state.health.is_none());
    assert!(state.version.is_none());

    console.refresh();
    let state = wait_until(&console, |s| s.phase == Phase::Ready).await;
    assert_eq!(state.error, None);
    assert_eq!(version_of(&state), Some("v2"));

    console.shutdown().await;
}

#[tokio::test]
async fn auto_refresh_polls_on_interval() {
    let transport = Arc::new(ScriptedTransport::new(vec![Step::ok("v1", 0)]));
    let console = spawn_console(transport.clone(), settings(100, true));

    tokio::time::sleep(Duration::from_millis(550)).await;
    let cycles = transport.cycles();
    assert!((4..=7).contains(&cycles), "unexpected cycle count {cycles}");

    console.shutdown().await;
}

#[tokio::test]
async fn disabled_auto_refresh_runs_initial_cycle_only() {
    let transport = Arc::new(ScriptedTransport::new(vec![Step::ok("v1", 0)]));
    let console = spawn_console(transport.clone(), settings(100, false));

    tokio::time::sleep(Duration::from_millis(450)).await;
    assert_eq!(transport.cycles(), 1);
    assert!(!console.snapshot().auto_refresh_enabled);

    console.refresh();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(transport.cycles(), 2);

    console.shutdown().await;
}

#[tokio::test]
async fn toggling_auto_refresh_resumes_and_stops_polling() {
    let transport = Arc::new(ScriptedTransport::new(vec![Step::ok("v1", 0)]));
    let console = spawn_console(transport.clone(), settings(100, false));

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(transport.cycles(), 1);

    console.toggle_auto_refresh();
    wait_until(&console, |s| s.auto_refresh_enabled).await;
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert!(transport.cycles() >= 3, "ticks did not resume");

    console.set_auto_refresh(false);
    wait_until(&console, |s| !s.auto_refresh_enabled).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    let stopped_at = transport.cycles();
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(transport.cycles(), stopped_at);

    console.shutdown().await;
}

#[tokio::test]
async fn shutdown_discards_in_flight_cycle() {
    let transport = Arc::new(ScriptedTransport::new(vec![Step::ok("v1", 300)]));
    let console = spawn_console(transport, settings(60_000, true));

    tokio::time::sleep(Duration::from_millis(20)).await;
    let final_state = console.shutdown().await;

    assert!(final_state.version.is_none());
    assert!(final_state.health.is_none());
    assert_eq!(final_state.phase, Phase::Loading);

    // The abandoned cycle completes into a closed channel.
    tokio::time::sleep(Duration::from_millis(400)).await;
}

#[tokio::test]
async fn marker_color_is_applied_once() {
    let transport = Arc::new(ScriptedTransport::with_marker(
        vec![Step::ok("v1", 0)],
        Ok(br#"{"color":"green"}"#.to_vec()),
    ));
    let console = spawn_console(transport, settings(60_000, true));

    let state = wait_until(&console, |s| s.frontend_color == FrontendColor::Green && s.phase == Phase::Ready).await;
    assert!(state.health_ok());

    console.shutdown().await;
}

#[tokio::test]
async fn missing_marker_leaves_color_unknown() {
    let transport = Arc::new(ScriptedTransport::new(vec![Step::ok("v1", 0)]));
    let console = spawn_console(transport, settings(60_000, true));

    wait_until(&console, |s| s.phase == Phase::Ready).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(console.snapshot().frontend_color, FrontendColor::Unknown);

    console.shutdown().await;
}

#[tokio::test]
async fn zero_refresh_interval_keeps_console_running() {
    let transport = Arc::new(ScriptedTransport::new(vec![Step::ok("v1", 0)]));
    let console = spawn_console(transport.clone(), settings(0, false));

    let state = wait_until(&console, |s| s.phase == Phase::Ready).await;
    assert_eq!(version_of(&state), Some("v1"));

    console.refresh();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(transport.cycles(), 2);

    let final_state = console.shutdown().await;
    assert_eq!(final_state.phase, Phase::Ready);
    assert_eq!(version_of(&final_state), Some("v1"));
}
