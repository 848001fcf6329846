//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind the listener from validated configuration
//! - Start the optional metrics endpoint
//! - Run the HTTP server until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Configuration is validated before this point

use tokio::net::TcpListener;

use crate::config::EdgeOpsConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;

/// Bind the configured listen address.
pub async fn bind_listener(config: &EdgeOpsConfig) -> Result<TcpListener, std::io::Error> {
    let address = config.listener.bind_address();
    let listener = TcpListener::bind(&address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");
    Ok(listener)
}

/// Start ambient services and serve probes on `listener` until `shutdown` fires.
pub async fn serve(
    config: EdgeOpsConfig,
    listener: TcpListener,
    shutdown: &Shutdown,
) -> Result<(), std::io::Error> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await
}
