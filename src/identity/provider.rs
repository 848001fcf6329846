//! Identity generation.
//!
//! # Responsibilities
//! - Combine the immutable identity configuration with a fresh request id
//!   and the current time
//! - Keep timestamps non-decreasing within one process

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::config::IdentityConfig;
use crate::identity::payload::{HealthPayload, IdentityPayload};

/// Materializes identity payloads for the probe endpoints.
///
/// Cheap to share behind an `Arc`; every call is independent apart from
/// the timestamp high-water mark, which is a single atomic.
#[derive(Debug)]
pub struct IdentityProvider {
    config: Arc<IdentityConfig>,
    /// Latest timestamp handed out, in Unix milliseconds.
    last_millis: AtomicI64,
}

impl IdentityProvider {
    pub fn new(config: Arc<IdentityConfig>) -> Self {
        Self {
            config,
            last_millis: AtomicI64::new(i64::MIN),
        }
    }

    /// Build a fresh identity payload.
    pub fn make_identity(&self) -> IdentityPayload {
        IdentityPayload {
            service: self.config.service_name.clone(),
            version: self.config.version.clone(),
            deployment: self.config.deployment.clone(),
            commit: self.config.commit.clone(),
            environment: self.config.environment.clone(),
            timestamp: self.next_timestamp(),
            request_id: Uuid::new_v4().to_string(),
        }
    }

    /// Body of `GET /api/health`.
    pub fn health(&self) -> HealthPayload {
        HealthPayload::ok(self.make_identity())
    }

    /// Body of `GET /api/version`.
    pub fn version(&self) -> IdentityPayload {
        self.make_identity()
    }

    fn next_timestamp(&self) -> String {
        let now = Utc::now();
        let now_millis = now.timestamp_millis();
        let previous = self.last_millis.fetch_max(now_millis, Ordering::AcqRel);

        // Wall clock stepped backwards: reuse the newest instant already issued.
        let at = if previous > now_millis {
            DateTime::from_timestamp_millis(previous).unwrap_or(now)
        } else {
            now
        };
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
