//! Probe endpoint handlers.
//!
//! # Responsibilities
//! - `GET /api/health`: `{"status":"ok", ...identity}`
//! - `GET /api/version`: identity only
//! - Mirror the payload's request id into `x-request-id`
//!
//! # Design Decisions
//! - No dependency checks: answering at all is the health signal
//! - Handlers are read-only; the only per-call work is identity generation

use std::time::Instant;

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

use crate::http::server::AppState;
use crate::observability::metrics;

/// Response header carrying the payload's request id.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub async fn health(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    let payload = state.identity.health();

    tracing::debug!(
        request_id = %payload.identity.request_id,
        deployment = %payload.identity.deployment,
        "Health probe answered"
    );
    metrics::record_probe("health", started);

    let request_id = payload.identity.request_id.clone();
    with_request_id(&request_id, Json(payload))
}

pub async fn version(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    let payload = state.identity.version();

    tracing::debug!(
        request_id = %payload.request_id,
        deployment = %payload.deployment,
        "Version probe answered"
    );
    metrics::record_probe("version", started);

    let request_id = payload.request_id.clone();
    with_request_id(&request_id, Json(payload))
}

fn with_request_id(request_id: &str, body: impl IntoResponse) -> Response {
    match HeaderValue::from_str(request_id) {
        Ok(value) => ([(X_REQUEST_ID, value)], body).into_response(),
        Err(_) => body.into_response(),
    }
}
