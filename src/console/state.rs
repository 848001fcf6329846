//! Console state and the display facts derived from it.

use std::fmt;

use crate::console::marker::FrontendColor;
use crate::identity::{HealthPayload, IdentityPayload};

/// Environment shown when neither payload names one.
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Where the latest cycle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No cycle started yet.
    #[default]
    Idle,
    /// The most recently started cycle is outstanding.
    Loading,
    /// The most recent cycle committed payloads.
    Ready,
    /// The most recent cycle failed; payloads are from an earlier cycle.
    Failed,
}

/// Deployment channel label with the two recognized values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentChannel {
    Stable,
    Canary,
    Other(String),
}

impl DeploymentChannel {
    pub fn from_label(label: &str) -> Self {
        match label {
            "stable" => DeploymentChannel::Stable,
            "canary" => DeploymentChannel::Canary,
            other => DeploymentChannel::Other(other.to_string()),
        }
    }

    /// Upper-cased badge text.
    pub fn badge(&self) -> String {
        match self {
            DeploymentChannel::Stable => "STABLE".to_string(),
            DeploymentChannel::Canary => "CANARY".to_string(),
            DeploymentChannel::Other(label) => label.to_uppercase(),
        }
    }
}

impl fmt::Display for DeploymentChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentChannel::Stable => f.write_str("stable"),
            DeploymentChannel::Canary => f.write_str("canary"),
            DeploymentChannel::Other(label) => f.write_str(label),
        }
    }
}

/// Everything the console knows right now.
///
/// `health` and `version` are only ever replaced together, from the same
/// cycle. A failed cycle sets `error` and leaves them alone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientStatusState {
    pub health: Option<HealthPayload>,
    pub version: Option<IdentityPayload>,
    pub error: Option<String>,
    /// Written only by the marker fetch.
    pub frontend_color: FrontendColor,
    pub auto_refresh_enabled: bool,
    pub phase: Phase,
}

impl ClientStatusState {
    pub fn new(auto_refresh_enabled: bool) -> Self {
        Self {
            auto_refresh_enabled,
            ..Self::default()
        }
    }

    /// Health payload's environment, else version's, else `dev`.
    pub fn effective_environment(&self) -> &str {
        self.health
            .as_ref()
            .map(|h| h.identity.environment.as_str())
            .filter(|env| !env.is_empty())
            .or_else(|| {
                self.version
                    .as_ref()
                    .map(|v| v.environment.as_str())
                    .filter(|env| !env.is_empty())
            })
            .unwrap_or(DEFAULT_ENVIRONMENT)
    }

    /// Version payload's channel, else health's. `None` before any data.
    pub fn effective_deployment(&self) -> Option<DeploymentChannel> {
        self.version
            .as_ref()
            .map(|v| v.deployment.as_str())
            .filter(|d| !d.is_empty())
            .or_else(|| {
                self.health
                    .as_ref()
                    .map(|h| h.identity.deployment.as_str())
                    .filter(|d| !d.is_empty())
            })
            .map(DeploymentChannel::from_label)
    }

    /// No error and the health status reads `ok`/`healthy`.
    pub fn health_ok(&self) -> bool {
        self.error.is_none() && self.health.as_ref().is_some_and(HealthPayload::is_healthy)
    }
}
