//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the probe
//! service and the polling console. All types derive Serde traits for
//! deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration shared by the API server and the console.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct EdgeOpsConfig {
    /// Release identity stamped on every probe response.
    pub identity: IdentityConfig,

    /// Listener configuration (bind address, port).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Polling console settings.
    pub console: ConsoleConfig,
}

/// Identity of the running release.
///
/// Constant for the lifetime of one instance.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct IdentityConfig {
    /// Service name (`SERVICE_NAME`).
    pub service_name: String,

    /// Semantic version string (`VERSION`).
    pub version: String,

    /// Deployment channel label, conventionally `stable` or `canary` (`DEPLOYMENT`).
    pub deployment: String,

    /// Environment label, e.g. `dev` or `prod` (`ENVIRONMENT`).
    pub environment: String,

    /// Opaque revision identifier (`COMMIT`).
    pub commit: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            service_name: "edgeops-api".to_string(),
            version: "v0.1.0".to_string(),
            deployment: "stable".to_string(),
            environment: "dev".to_string(),
            commit: "local-dev".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub bind_host: String,

    /// Listen port (`PORT`). Zero asks the OS for an ephemeral port.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

/// Timeout configuration for the server side.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 5 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log directive when `RUST_LOG` is unset.
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Polling console configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Base URL of the probe API (`API_BASE`).
    pub api_base: String,

    /// Frontend marker document URL (`FRONTEND_MARKER_URL`).
    /// Defaults to `<api_base>/frontend.json`.
    pub marker_url: Option<String>,

    /// Auto-refresh interval in seconds (`REFRESH_INTERVAL_SECS`).
    pub refresh_interval_secs: u64,

    /// Per-probe timeout in seconds. Defaults to the refresh interval.
    pub request_timeout_secs: Option<u64>,

    /// Whether auto-refresh starts enabled.
    pub auto_refresh: bool,
}

impl ConsoleConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Probe timeout; falls back to the refresh interval so that
    /// overlapping cycles stay bounded.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(self.refresh_interval_secs))
    }

    /// Effective marker URL.
    pub fn marker_url(&self) -> String {
        match &self.marker_url {
            Some(url) => url.clone(),
            None => format!("{}/frontend.json", self.api_base.trim_end_matches('/')),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:3001".to_string(),
            marker_url: None,
            refresh_interval_secs: 8,
            request_timeout_secs: None,
            auto_refresh: true,
        }
    }
}
