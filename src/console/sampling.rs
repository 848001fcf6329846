//! Traffic-split sampling.
//!
//! Fires N independent version probes and tallies which deployment
//! channel answered each one. With a weighted router in front of two
//! releases, the canary share converges on the configured weight.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use futures_util::{stream, StreamExt};
use serde::Serialize;

use crate::console::cycle::bounded;
use crate::console::transport::{Probe, ProbeTransport};

/// Outcome of a sampling run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentTally {
    /// Probes issued.
    pub total: usize,
    /// Successful responses per deployment label.
    pub by_deployment: BTreeMap<String, usize>,
    pub failures: usize,
    /// Responses whose request id was already seen in this run.
    pub duplicate_request_ids: usize,
}

impl DeploymentTally {
    pub fn successes(&self) -> usize {
        self.by_deployment.values().sum()
    }

    pub fn count(&self, deployment: &str) -> usize {
        self.by_deployment.get(deployment).copied().unwrap_or(0)
    }

    /// Share of successful responses that came from `deployment`.
    pub fn fraction(&self, deployment: &str) -> f64 {
        match self.successes() {
            0 => 0.0,
            n => self.count(deployment) as f64 / n as f64,
        }
    }
}

/// Issue `count` version probes, at most `concurrency` at a time.
pub async fn sample_deployments<T: ProbeTransport>(
    transport: &T,
    count: usize,
    concurrency: usize,
    timeout: Duration,
) -> DeploymentTally {
    let mut tally = DeploymentTally {
        total: count,
        ..DeploymentTally::default()
    };
    let mut seen = HashSet::with_capacity(count);

    let mut responses = stream::iter(0..count)
        .map(|_| bounded(Probe::Version, timeout, transport.fetch_version()))
        .buffer_unordered(concurrency.max(1));

    while let Some(result) = responses.next().await {
        match result {
            Ok(identity) => {
                if !seen.insert(identity.request_id) {
                    tally.duplicate_request_ids += 1;
                }
                *tally.by_deployment.entry(identity.deployment).or_insert(0) += 1;
            }
            Err(e) => {
                tracing::debug!(error = %e, "Sample probe failed");
                tally.failures += 1;
            }
        }
    }

    tracing::info!(
        total = tally.total,
        failures = tally.failures,
        duplicates = tally.duplicate_request_ids,
        "Sampling finished"
    );
    tally
}
