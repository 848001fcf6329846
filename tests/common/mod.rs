//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::{StatusCode, Uri};
use axum::Router;
use tokio::net::TcpListener;

use edgeops_api::config::EdgeOpsConfig;
use edgeops_api::console::{MarkerError, MarkerSource, Probe, ProbeError, ProbeTransport};
use edgeops_api::http::HttpServer;
use edgeops_api::lifecycle::Shutdown;
use edgeops_api::{HealthPayload, IdentityPayload};

/// Start the real probe API on an ephemeral port.
pub async fn start_api(config: EdgeOpsConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Start a programmable mock backend. `f` receives the request path and
/// returns status and body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    let app = Router::new().fallback(move |uri: Uri| {
        let f = f.clone();
        async move {
            let (status, body) = f(uri.path().to_string()).await;
            (StatusCode::from_u16(status).unwrap(), body)
        }
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

pub fn identity(version: &str, deployment: &str) -> IdentityPayload {
    IdentityPayload {
        service: "edgeops-api".into(),
        version: version.into(),
        deployment: deployment.into(),
        commit: "abc1234".into(),
        environment: "test".into(),
        timestamp: "2026-01-01T00:00:00.000Z".into(),
        request_id: uuid::Uuid::new_v4().to_string(),
    }
}

pub fn identity_json(version: &str, deployment: &str) -> String {
    serde_json::to_string(&identity(version, deployment)).unwrap()
}

pub fn health_json(version: &str, deployment: &str) -> String {
    serde_json::to_string(&HealthPayload::ok(identity(version, deployment))).unwrap()
}

/// What one poll cycle sees from a scripted transport.
#[derive(Clone)]
pub struct Step {
    pub delay: Duration,
    pub health: Result<HealthPayload, ProbeError>,
    pub version: Result<IdentityPayload, ProbeError>,
}

impl Step {
    pub fn ok(version: &str, delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            health: Ok(HealthPayload::ok(identity(version, "stable"))),
            version: Ok(identity(version, "stable")),
        }
    }

    pub fn health_down(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            health: Err(ProbeError::Status { probe: Probe::Health, status: 503 }),
            version: Ok(identity("ignored", "stable")),
        }
    }
}

/// In-process transport. The n-th health call and the n-th version call
/// both play step n; the last step repeats.
pub struct ScriptedTransport {
    steps: Vec<Step>,
    health_calls: AtomicUsize,
    version_calls: AtomicUsize,
    marker: Result<Vec<u8>, MarkerError>,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<Step>) -> Self {
        Self::with_marker(steps, Err(MarkerError::Status(404)))
    }

    pub fn with_marker(steps: Vec<Step>, marker: Result<Vec<u8>, MarkerError>) -> Self {
        assert!(!steps.is_empty());
        Self {
            steps,
            health_calls: AtomicUsize::new(0),
            version_calls: AtomicUsize::new(0),
            marker,
        }
    }

    /// Cycles started so far.
    pub fn cycles(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    fn step(&self, index: usize) -> Step {
        self.steps
            .get(index)
            .or_else(|| self.steps.last())
            .cloned()
            .unwrap()
    }
}

impl ProbeTransport for ScriptedTransport {
    fn fetch_health(&self) -> impl Future<Output = Result<HealthPayload, ProbeError>> + Send {
        let step = self.step(self.health_calls.fetch_add(1, Ordering::SeqCst));
        async move {
            tokio::time::sleep(step.delay).await;
            step.health
        }
    }

    fn fetch_version(&self) -> impl Future<Output = Result<IdentityPayload, ProbeError>> + Send {
        let step = self.step(self.version_calls.fetch_add(1, Ordering::SeqCst));
        async move {
            tokio::time::sleep(step.delay).await;
            step.version
        }
    }
}

impl MarkerSource for ScriptedTransport {
    fn fetch_marker_document(&self) -> impl Future<Output = Result<Vec<u8>, MarkerError>> + Send {
        let marker = self.marker.clone();
        async move { marker }
    }
}
