//! EdgeOps probe API.
//!
//! ```text
//!   operator / console / load balancer
//!            │  GET /api/health, /api/version
//!            ▼
//!   ┌──────────────────────────────────────────┐
//!   │ http::server  (trace, timeout, no-store) │
//!   │      │                                   │
//!   │      ▼                                   │
//!   │ http::probes ──▶ identity::provider      │
//!   │                    (config + uuid + now) │
//!   └──────────────────────────────────────────┘
//! ```
//!
//! Configuration comes from the environment (`SERVICE_NAME`, `VERSION`,
//! `DEPLOYMENT`, `ENVIRONMENT`, `COMMIT`, `PORT`), optionally layered over
//! a TOML file named by `EDGEOPS_CONFIG`.

use std::path::PathBuf;

use edgeops_api::config::{self, loader::CONFIG_PATH_VAR};
use edgeops_api::lifecycle::{signals, startup, Shutdown};
use edgeops_api::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from);
    let config = config::load_config(config_path.as_deref())?;

    logging::init_logging(&logging::default_directive(&config.observability.log_level));

    tracing::info!(
        service = %config.identity.service_name,
        version = %config.identity.version,
        deployment = %config.identity.deployment,
        environment = %config.identity.environment,
        commit = %config.identity.commit,
        "edgeops-api starting"
    );

    let listener = startup::bind_listener(&config).await?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    startup::serve(config, listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
