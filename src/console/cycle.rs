//! A single poll cycle: both probes, concurrently, all or nothing.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;

use crate::console::transport::{Probe, ProbeError, ProbeTransport};
use crate::identity::{HealthPayload, IdentityPayload};

/// Matching health and version payloads from one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub health: HealthPayload,
    pub version: IdentityPayload,
}

/// Run both probes concurrently.
///
/// The first failure fails the cycle; the other probe's result is dropped
/// so no partial report ever escapes.
pub async fn run_cycle<T: ProbeTransport>(transport: &T, timeout: Duration) -> Result<CycleReport, ProbeError> {
    let (health, version) = tokio::try_join!(
        bounded(Probe::Health, timeout, transport.fetch_health()),
        bounded(Probe::Version, timeout, transport.fetch_version()),
    )?;

    Ok(CycleReport { health, version })
}

/// Apply a deadline to one probe.
pub(crate) async fn bounded<T, F>(probe: Probe, timeout: Duration, fut: F) -> Result<T, ProbeError>
where
    F: Future<Output = Result<T, ProbeError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::Timeout { probe, after: timeout }),
    }
}
