//! Probe transport: how the console reaches the API and the frontend marker.
//!
//! # Responsibilities
//! - Define the seams the polling logic depends on (`ProbeTransport`,
//!   `MarkerSource`)
//! - Provide the reqwest-backed implementation used in production
//! - Classify failures: network, non-success status, malformed body

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::header::CACHE_CONTROL;
use serde::de::DeserializeOwned;

use crate::config::ConsoleConfig;
use crate::console::marker::MarkerError;
use crate::identity::{HealthPayload, IdentityPayload};

/// Which probe endpoint a request targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Probe {
    Health,
    Version,
}

impl Probe {
    pub fn path(self) -> &'static str {
        match self {
            Probe::Health => "/api/health",
            Probe::Version => "/api/version",
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Probe::Health => write!(f, "Health"),
            Probe::Version => write!(f, "Version"),
        }
    }
}

/// Transport-level failure of a single probe.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("{probe} failed: {status}")]
    Status { probe: Probe, status: u16 },

    #[error("{probe} request failed: {message}")]
    Network { probe: Probe, message: String },

    #[error("{probe} response malformed: {message}")]
    Malformed { probe: Probe, message: String },

    #[error("{probe} timed out after {after:?}")]
    Timeout { probe: Probe, after: Duration },
}

impl ProbeError {
    pub fn probe(&self) -> Probe {
        match self {
            ProbeError::Status { probe, .. }
            | ProbeError::Network { probe, .. }
            | ProbeError::Malformed { probe, .. }
            | ProbeError::Timeout { probe, .. } => *probe,
        }
    }
}

/// Access to the two probe endpoints.
pub trait ProbeTransport: Send + Sync + 'static {
    fn fetch_health(&self) -> impl Future<Output = Result<HealthPayload, ProbeError>> + Send;

    fn fetch_version(&self) -> impl Future<Output = Result<IdentityPayload, ProbeError>> + Send;
}

/// Access to the static frontend marker document.
pub trait MarkerSource: Send + Sync + 'static {
    /// Raw marker body; parsing happens in `marker.rs`.
    fn fetch_marker_document(&self) -> impl Future<Output = Result<Vec<u8>, MarkerError>> + Send;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    api_base: String,
    marker_url: String,
}

impl HttpTransport {
    /// Build a transport for `api_base` (e.g. `http://localhost:3001`).
    pub fn new(api_base: &str, marker_url: &str, connect_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            marker_url: marker_url.to_string(),
        })
    }

    pub fn from_config(config: &ConsoleConfig) -> Result<Self, reqwest::Error> {
        Self::new(&config.api_base, &config.marker_url(), config.request_timeout())
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, probe: Probe) -> String {
        format!("{}{}", self.api_base, probe.path())
    }

    async fn get_json<T: DeserializeOwned>(&self, probe: Probe) -> Result<T, ProbeError> {
        let response = self
            .client
            .get(self.url(probe))
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| ProbeError::Network { probe, message: e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status { probe, status: status.as_u16() });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProbeError::Network { probe, message: e.to_string() })?;

        serde_json::from_slice(&body)
            .map_err(|e| ProbeError::Malformed { probe, message: e.to_string() })
    }
}

impl ProbeTransport for HttpTransport {
    async fn fetch_health(&self) -> Result<HealthPayload, ProbeError> {
        self.get_json(Probe::Health).await
    }

    async fn fetch_version(&self) -> Result<IdentityPayload, ProbeError> {
        self.get_json(Probe::Version).await
    }
}

impl MarkerSource for HttpTransport {
    async fn fetch_marker_document(&self) -> Result<Vec<u8>, MarkerError> {
        let response = self
            .client
            .get(&self.marker_url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| MarkerError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarkerError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| MarkerError::Network(e.to_string()))?;
        Ok(body.to_vec())
    }
}
