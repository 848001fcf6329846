//! Frontend (blue/green) marker probe.
//!
//! The active static origin serves `/frontend.json` as
//! `{"color": "blue" | "green"}`. The fetch is best effort: callers drop
//! any `Err` and keep the color they already had.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::console::transport::MarkerSource;

/// Which static origin is serving the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontendColor {
    Blue,
    Green,
    #[default]
    Unknown,
}

impl FrontendColor {
    /// Normalize a marker label. Case-insensitive but otherwise exact;
    /// anything but blue or green is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "blue" => FrontendColor::Blue,
            "green" => FrontendColor::Green,
            _ => FrontendColor::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FrontendColor::Blue => "blue",
            FrontendColor::Green => "green",
            FrontendColor::Unknown => "unknown",
        }
    }

    pub fn is_known(self) -> bool {
        self != FrontendColor::Unknown
    }
}

impl fmt::Display for FrontendColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a marker fetch produced no color. Never shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkerError {
    #[error("marker request failed: {0}")]
    Network(String),

    #[error("marker returned status {0}")]
    Status(u16),

    #[error("marker body is not JSON: {0}")]
    Malformed(String),

    #[error("marker has no string color field")]
    MissingColor,

    #[error("marker timed out after {0:?}")]
    Timeout(Duration),
}

/// Parse a marker document body.
pub fn parse_marker(body: &[u8]) -> Result<FrontendColor, MarkerError> {
    let doc: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| MarkerError::Malformed(e.to_string()))?;

    match doc.get("color") {
        Some(serde_json::Value::String(label)) => Ok(FrontendColor::from_label(label)),
        _ => Err(MarkerError::MissingColor),
    }
}

/// Fetch and parse the marker, bounded by `timeout`.
pub async fn fetch_marker<M: MarkerSource>(source: &M, timeout: Duration) -> Result<FrontendColor, MarkerError> {
    let body = tokio::time::timeout(timeout, source.fetch_marker_document())
        .await
        .map_err(|_| MarkerError::Timeout(timeout))??;
    parse_marker(&body)
}
