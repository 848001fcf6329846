//! Status aggregation state machine.
//!
//! # States
//! ```text
//! Idle ──begin──▶ Loading ──complete(ok)──▶ Ready
//!                    ▲    ──complete(err)─▶ Failed
//!                    └──────── begin ◀────────┘ (from any state)
//! ```
//!
//! # Ordering
//! Every cycle takes a ticket from a monotonically increasing sequence
//! when it starts. A completion commits only if its ticket is the most
//! recently issued one; an older cycle finishing late is discarded, as is
//! anything arriving after teardown.

use crate::console::cycle::CycleReport;
use crate::console::marker::{FrontendColor, MarkerError};
use crate::console::state::{ClientStatusState, Phase};
use crate::console::transport::ProbeError;

/// What started a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Initial,
    Manual,
    Timer,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::Initial => "initial",
            Trigger::Manual => "manual",
            Trigger::Timer => "timer",
        }
    }
}

/// Identity of one started cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTicket {
    seq: u64,
    trigger: Trigger,
}

impl CycleTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }
}

/// Result of offering a completion to the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Payloads applied, error cleared.
    Ready,
    /// Error recorded, previous payloads kept.
    Failed,
    /// A newer cycle was started; result discarded.
    Stale,
    /// Session already ended; result discarded.
    TornDown,
}

impl CommitOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            CommitOutcome::Ready => "ready",
            CommitOutcome::Failed => "failed",
            CommitOutcome::Stale => "stale",
            CommitOutcome::TornDown => "torn_down",
        }
    }
}

/// Owner of `ClientStatusState`.
///
/// Not thread-safe by itself; the console event loop is its only user.
#[derive(Debug)]
pub struct StatusAggregator {
    state: ClientStatusState,
    latest_started: u64,
    torn_down: bool,
}

impl StatusAggregator {
    pub fn new(auto_refresh_enabled: bool) -> Self {
        Self {
            state: ClientStatusState::new(auto_refresh_enabled),
            latest_started: 0,
            torn_down: false,
        }
    }

    pub fn state(&self) -> &ClientStatusState {
        &self.state
    }

    pub fn into_state(self) -> ClientStatusState {
        self.state
    }

    /// Register a new cycle. It supersedes every cycle started before it.
    pub fn begin_cycle(&mut self, trigger: Trigger) -> CycleTicket {
        self.latest_started += 1;
        if !self.torn_down {
            self.state.phase = Phase::Loading;
        }
        CycleTicket {
            seq: self.latest_started,
            trigger,
        }
    }

    /// True if no cycle was started after `ticket`.
    pub fn is_latest(&self, ticket: &CycleTicket) -> bool {
        ticket.seq == self.latest_started
    }

    /// Offer a finished cycle's result.
    pub fn complete_cycle(
        &mut self,
        ticket: CycleTicket,
        result: Result<CycleReport, ProbeError>,
    ) -> CommitOutcome {
        if self.torn_down {
            return CommitOutcome::TornDown;
        }
        if !self.is_latest(&ticket) {
            tracing::debug!(
                cycle = ticket.seq,
                latest = self.latest_started,
                trigger = ticket.trigger.as_str(),
                "Discarding superseded cycle result"
            );
            return CommitOutcome::Stale;
        }

        match result {
            Ok(report) => {
                self.state.health = Some(report.health);
                self.state.version = Some(report.version);
                self.state.error = None;
                self.state.phase = Phase::Ready;
                CommitOutcome::Ready
            }
            Err(e) => {
                self.state.error = Some(e.to_string());
                self.state.phase = Phase::Failed;
                CommitOutcome::Failed
            }
        }
    }

    /// Apply a marker fetch result. Errors leave the color untouched.
    /// Returns true if the color was written.
    pub fn apply_marker(&mut self, result: Result<FrontendColor, MarkerError>) -> bool {
        if self.torn_down {
            return false;
        }
        match result {
            Ok(color) => {
                self.state.frontend_color = color;
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "Frontend marker unavailable; keeping last color");
                false
            }
        }
    }

    pub fn set_auto_refresh(&mut self, enabled: bool) {
        if !self.torn_down {
            self.state.auto_refresh_enabled = enabled;
        }
    }

    /// End the session. Later completions are suppressed.
    pub fn teardown(&mut self) {
        self.torn_down = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::transport::Probe;
    use crate::identity::{HealthPayload, IdentityPayload};

    fn report(version: &str, deployment: &str) -> CycleReport {
        let identity = IdentityPayload {
            service: "edgeops-api".into(),
            version: version.into(),
            deployment: deployment.into(),
            commit: "abc".into(),
            environment: "prod".into(),
            timestamp: "2026-01-01T00:00:00.000Z".into(),
            request_id: uuid::Uuid::new_v4().to_string(),
        };
        CycleReport {
            health: HealthPayload::ok(identity.clone()),
            version: identity,
        }
    }

    fn health_down() -> ProbeError {
        ProbeError::Status { probe: Probe::Health, status: 503 }
    }

    #[test]
    fn success_commits_both_payloads_and_clears_error() {
        let mut agg = StatusAggregator::new(true);
        let first = agg.begin_cycle(Trigger::Initial);
        assert_eq!(agg.state().phase, Phase::Loading);
        agg.complete_cycle(first, Err(health_down()));
        assert_eq!(agg.state().error.as_deref(), Some("Health failed: 503"));

        let second = agg.begin_cycle(Trigger::Manual);
        let outcome = agg.complete_cycle(second, Ok(report("v2", "canary")));

        assert_eq!(outcome, CommitOutcome::Ready);
        assert_eq!(agg.state().phase, Phase::Ready);
        assert_eq!(agg.state().error, None);
        assert_eq!(agg.state().version.as_ref().unwrap().version, "v2");
        assert_eq!(agg.state().health.as_ref().unwrap().identity.version, "v2");
    }

    #[test]
    fn failure_keeps_previous_payloads() {
        let mut agg = StatusAggregator::new(true);
        let first = agg.begin_cycle(Trigger::Initial);
        agg.complete_cycle(first, Ok(report("v1", "stable")));
        let before = agg.state().clone();

        let second = agg.begin_cycle(Trigger::Timer);
        let outcome = agg.complete_cycle(second, Err(health_down()));

        assert_eq!(outcome, CommitOutcome::Failed);
        assert_eq!(agg.state().phase, Phase::Failed);
        assert_eq!(agg.state().health, before.health);
        assert_eq!(agg.state().version, before.version);
        assert!(agg.state().error.is_some());
    }

    #[test]
    fn later_started_cycle_wins_regardless_of_completion_order() {
        let mut agg = StatusAggregator::new(true);
        let a = agg.begin_cycle(Trigger::Timer);
        let b = agg.begin_cycle(Trigger::Manual);

        assert_eq!(agg.complete_cycle(b, Ok(report("v-b", "canary"))), CommitOutcome::Ready);
        assert_eq!(agg.complete_cycle(a, Ok(report("v-a", "stable"))), CommitOutcome::Stale);

        assert_eq!(agg.state().version.as_ref().unwrap().version, "v-b");
        assert_eq!(agg.state().health.as_ref().unwrap().identity.deployment, "canary");
    }

    #[test]
    fn stale_failure_does_not_clobber_newer_success() {
        let mut agg = StatusAggregator::new(true);
        let a = agg.begin_cycle(Trigger::Timer);
        let b = agg.begin_cycle(Trigger::Manual);

        agg.complete_cycle(b, Ok(report("v-b", "stable")));
        agg.complete_cycle(a, Err(health_down()));

        assert_eq!(agg.state().error, None);
        assert_eq!(agg.state().phase, Phase::Ready);
    }

    #[test]
    fn early_stale_completion_leaves_loading_phase() {
        let mut agg = StatusAggregator::new(true);
        let a = agg.begin_cycle(Trigger::Initial);
        let _b = agg.begin_cycle(Trigger::Manual);

        assert_eq!(agg.complete_cycle(a, Ok(report("v-a", "stable"))), CommitOutcome::Stale);
        assert_eq!(agg.state().phase, Phase::Loading);
        assert!(agg.state().version.is_none());
    }

    #[test]
    fn nothing_commits_after_teardown() {
        let mut agg = StatusAggregator::new(true);
        let ticket = agg.begin_cycle(Trigger::Initial);
        agg.teardown();

        assert_eq!(agg.complete_cycle(ticket, Ok(report("v1", "stable"))), CommitOutcome::TornDown);
        assert!(!agg.apply_marker(Ok(FrontendColor::Green)));
        assert!(agg.state().version.is_none());
        assert_eq!(agg.state().frontend_color, FrontendColor::Unknown);
    }

    #[test]
    fn marker_errors_keep_last_color() {
        let mut agg = StatusAggregator::new(true);
        assert!(!agg.apply_marker(Err(MarkerError::Status(404))));
        assert_eq!(agg.state().frontend_color, FrontendColor::Unknown);

        assert!(agg.apply_marker(Ok(FrontendColor::Blue)));
        assert!(!agg.apply_marker(Err(MarkerError::MissingColor)));
        assert_eq!(agg.state().frontend_color, FrontendColor::Blue);
    }

    #[test]
    fn cycles_never_touch_frontend_color() {
        let mut agg = StatusAggregator::new(true);
        agg.apply_marker(Ok(FrontendColor::Green));

        let t = agg.begin_cycle(Trigger::Initial);
        agg.complete_cycle(t, Err(health_down()));
        let t = agg.begin_cycle(Trigger::Manual);
        agg.complete_cycle(t, Ok(report("v1", "stable")));

        assert_eq!(agg.state().frontend_color, FrontendColor::Green);
    }

    #[test]
    fn tickets_are_strictly_increasing() {
        let mut agg = StatusAggregator::new(false);
        let seqs: Vec<u64> = (0..5).map(|_| agg.begin_cycle(Trigger::Manual).seq()).collect();
        assert!(seqs.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(agg.begin_cycle(Trigger::Timer).trigger(), Trigger::Timer);
    }
}
