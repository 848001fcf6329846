//! Wire types returned by the probe endpoints.

use serde::{Deserialize, Serialize};

/// Status value carried by every successful health response.
pub const HEALTH_STATUS_OK: &str = "ok";

/// Identity of the release that answered a probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPayload {
    pub service: String,
    pub version: String,
    /// Deployment channel label. Conventionally `stable` or `canary`.
    pub deployment: String,
    pub commit: String,
    pub environment: String,
    /// ISO-8601 UTC instant, millisecond precision.
    pub timestamp: String,
    /// Traceability token, unique per response. Never parsed.
    pub request_id: String,
}

/// Health probe body: a status discriminator plus the identity fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthPayload {
    pub status: String,
    #[serde(flatten)]
    pub identity: IdentityPayload,
}

impl HealthPayload {
    /// Wrap an identity in a successful health response.
    pub fn ok(identity: IdentityPayload) -> Self {
        Self {
            status: HEALTH_STATUS_OK.to_string(),
            identity,
        }
    }

    /// True for the status values the console treats as healthy.
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok") || self.status.eq_ignore_ascii_case("healthy")
    }
}
