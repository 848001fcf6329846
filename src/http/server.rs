//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the probe handlers
//! - Wire up middleware (tracing, timeout, cache headers)
//! - Bind server to listener
//! - Stop gracefully on the shutdown broadcast

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::EdgeOpsConfig;
use crate::http::probes;
use crate::identity::IdentityProvider;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<IdentityProvider>,
}

/// HTTP server for the probe API.
pub struct HttpServer {
    router: Router,
    config: EdgeOpsConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: EdgeOpsConfig) -> Self {
        let identity = Arc::new(IdentityProvider::new(Arc::new(config.identity.clone())));
        let state = AppState { identity };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &EdgeOpsConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/health", get(probes::health))
            .route("/api/version", get(probes::version))
            .with_state(state)
            .layer(SetResponseHeaderLayer::overriding(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-store"),
            ))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal is broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let identity = &self.config.identity;
        tracing::info!(
            address = %addr,
            service = %identity.service_name,
            version = %identity.version,
            deployment = %identity.deployment,
            environment = %identity.environment,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
