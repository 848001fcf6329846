//! Console event loop.
//!
//! # Responsibilities
//! - Own the `StatusAggregator` on a single task
//! - Start cycles on the initial load, manual refresh and timer ticks
//! - Fetch the frontend marker once at start
//! - Publish state snapshots over a watch channel
//!
//! # Design Decisions
//! - Cycles run as spawned tasks and report back through a channel, so
//!   state is only ever touched by the loop and needs no lock
//! - Overlapping cycles are allowed; the aggregator's ticket check decides
//!   which result is visible
//! - Teardown does not abort in-flight requests; their results land on a
//!   closed channel and are dropped

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::ConsoleConfig;
use crate::console::aggregator::{CommitOutcome, CycleTicket, StatusAggregator, Trigger};
use crate::console::cycle::{run_cycle, CycleReport};
use crate::console::marker::{fetch_marker, FrontendColor, MarkerError};
use crate::console::state::ClientStatusState;
use crate::console::transport::{MarkerSource, ProbeError, ProbeTransport};
use crate::observability::metrics;

/// Shortest auto-refresh period the ticker accepts.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

/// Timing knobs for one console session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSettings {
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
    pub auto_refresh: bool,
}

impl From<&ConsoleConfig> for ConsoleSettings {
    fn from(config: &ConsoleConfig) -> Self {
        Self {
            refresh_interval: config.refresh_interval(),
            request_timeout: config.request_timeout(),
            auto_refresh: config.auto_refresh,
        }
    }
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self::from(&ConsoleConfig::default())
    }
}

/// Operator actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Refresh,
    SetAutoRefresh(bool),
    ToggleAutoRefresh,
    Shutdown,
}

enum Event {
    CycleFinished {
        ticket: CycleTicket,
        result: Result<CycleReport, ProbeError>,
    },
    MarkerFetched(Result<FrontendColor, MarkerError>),
}

/// Handle to a running console session.
pub struct ConsoleHandle {
    commands: mpsc::UnboundedSender<ConsoleCommand>,
    state: watch::Receiver<ClientStatusState>,
    task: JoinHandle<ClientStatusState>,
}

impl ConsoleHandle {
    pub fn refresh(&self) {
        self.send(ConsoleCommand::Refresh);
    }

    pub fn set_auto_refresh(&self, enabled: bool) {
        self.send(ConsoleCommand::SetAutoRefresh(enabled));
    }

    pub fn toggle_auto_refresh(&self) {
        self.send(ConsoleCommand::ToggleAutoRefresh);
    }

    /// Watch state snapshots as they change.
    pub fn subscribe(&self) -> watch::Receiver<ClientStatusState> {
        self.state.clone()
    }

    /// Latest published state.
    pub fn snapshot(&self) -> ClientStatusState {
        self.state.borrow().clone()
    }

    /// End the session and return the final state.
    pub async fn shutdown(self) -> ClientStatusState {
        self.send(ConsoleCommand::Shutdown);
        match self.task.await {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(error = %e, "Console task ended abnormally");
                self.state.borrow().clone()
            }
        }
    }

    fn send(&self, command: ConsoleCommand) {
        if self.commands.send(command).is_err() {
            tracing::debug!(?command, "Console already stopped");
        }
    }
}

/// Start a console session on the current runtime.
pub fn spawn_console<T>(transport: Arc<T>, settings: ConsoleSettings) -> ConsoleHandle
where
    T: ProbeTransport + MarkerSource,
{
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(ClientStatusState::new(settings.auto_refresh));

    let task = tokio::spawn(run_event_loop(transport, settings, commands_rx, state_tx));

    ConsoleHandle {
        commands: commands_tx,
        state: state_rx,
        task,
    }
}

async fn run_event_loop<T>(
    transport: Arc<T>,
    settings: ConsoleSettings,
    mut commands: mpsc::UnboundedReceiver<ConsoleCommand>,
    state_tx: watch::Sender<ClientStatusState>,
) -> ClientStatusState
where
    T: ProbeTransport + MarkerSource,
{
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut aggregator = StatusAggregator::new(settings.auto_refresh);

    tracing::info!(
        refresh_interval = ?settings.refresh_interval,
        request_timeout = ?settings.request_timeout,
        auto_refresh = settings.auto_refresh,
        "Console session starting"
    );

    spawn_marker_fetch(transport.clone(), settings.request_timeout, events_tx.clone());
    start_cycle(&mut aggregator, Trigger::Initial, &transport, &settings, &events_tx);
    publish(&state_tx, &aggregator);

    if settings.refresh_interval < MIN_REFRESH_INTERVAL {
        tracing::warn!(
            refresh_interval = ?settings.refresh_interval,
            "Refresh interval below minimum; clamping"
        );
    }
    let period = settings.refresh_interval.max(MIN_REFRESH_INTERVAL);
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(ConsoleCommand::Refresh) => {
                    start_cycle(&mut aggregator, Trigger::Manual, &transport, &settings, &events_tx);
                }
                Some(ConsoleCommand::SetAutoRefresh(enabled)) => {
                    set_auto_refresh(&mut aggregator, &mut ticker, enabled);
                }
                Some(ConsoleCommand::ToggleAutoRefresh) => {
                    let enabled = !aggregator.state().auto_refresh_enabled;
                    set_auto_refresh(&mut aggregator, &mut ticker, enabled);
                }
                Some(ConsoleCommand::Shutdown) | None => break,
            },
            _ = ticker.tick(), if aggregator.state().auto_refresh_enabled => {
                start_cycle(&mut aggregator, Trigger::Timer, &transport, &settings, &events_tx);
            }
            Some(event) = events_rx.recv() => match event {
                Event::CycleFinished { ticket, result } => {
                    let outcome = aggregator.complete_cycle(ticket, result);
                    metrics::record_cycle(outcome.as_str());
                    if outcome == CommitOutcome::Failed {
                        tracing::warn!(
                            cycle = ticket.seq(),
                            trigger = ticket.trigger().as_str(),
                            error = aggregator.state().error.as_deref().unwrap_or_default(),
                            "Poll cycle failed"
                        );
                    }
                }
                Event::MarkerFetched(result) => {
                    aggregator.apply_marker(result);
                }
            },
        }
        publish(&state_tx, &aggregator);
    }

    aggregator.teardown();
    tracing::info!("Console session ended");
    aggregator.into_state()
}

fn start_cycle<T>(
    aggregator: &mut StatusAggregator,
    trigger: Trigger,
    transport: &Arc<T>,
    settings: &ConsoleSettings,
    events: &mpsc::UnboundedSender<Event>,
) where
    T: ProbeTransport,
{
    let ticket = aggregator.begin_cycle(trigger);
    tracing::debug!(cycle = ticket.seq(), trigger = trigger.as_str(), "Starting poll cycle");

    let transport = transport.clone();
    let timeout = settings.request_timeout;
    let events = events.clone();
    tokio::spawn(async move {
        let result = run_cycle(transport.as_ref(), timeout).await;
        // The loop may be gone; a dropped result is exactly what teardown wants.
        let _ = events.send(Event::CycleFinished { ticket, result });
    });
}

fn spawn_marker_fetch<T>(transport: Arc<T>, timeout: Duration, events: mpsc::UnboundedSender<Event>)
where
    T: MarkerSource,
{
    tokio::spawn(async move {
        let result = fetch_marker(transport.as_ref(), timeout).await;
        let _ = events.send(Event::MarkerFetched(result));
    });
}

fn set_auto_refresh(aggregator: &mut StatusAggregator, ticker: &mut time::Interval, enabled: bool) {
    if enabled && !aggregator.state().auto_refresh_enabled {
        // Restart the schedule so the first tick is a full interval away.
        ticker.reset();
    }
    aggregator.set_auto_refresh(enabled);
    tracing::info!(enabled, "Auto-refresh toggled");
}

fn publish(state_tx: &watch::Sender<ClientStatusState>, aggregator: &StatusAggregator) {
    let next = aggregator.state();
    state_tx.send_if_modified(|current| {
        if current != next {
            *current = next.clone();
            true
        } else {
            false
        }
    });
}
