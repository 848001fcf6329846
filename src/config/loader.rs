//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::EdgeOpsConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming an optional TOML config file.
pub const CONFIG_PATH_VAR: &str = "EDGEOPS_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration using the real process environment.
pub fn load_config(path: Option<&Path>) -> Result<EdgeOpsConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Load and validate configuration: defaults, then the optional TOML file,
/// then environment overrides resolved through `lookup`.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<EdgeOpsConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => EdgeOpsConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// Empty values are treated as unset so the previous value (file or
/// default) stays in place.
pub fn apply_env_overrides<F>(config: &mut EdgeOpsConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("SERVICE_NAME") {
        config.identity.service_name = v;
    }
    if let Some(v) = get("VERSION") {
        config.identity.version = v;
    }
    if let Some(v) = get("DEPLOYMENT") {
        config.identity.deployment = v;
    }
    if let Some(v) = get("ENVIRONMENT") {
        config.identity.environment = v;
    }
    if let Some(v) = get("COMMIT") {
        config.identity.commit = v;
    }
    if let Some(v) = get("PORT") {
        config.listener.port = v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var: "PORT", value: v.clone() })?;
    }
    if let Some(v) = get("API_BASE") {
        config.console.api_base = v;
    }
    if let Some(v) = get("FRONTEND_MARKER_URL") {
        config.console.marker_url = Some(v);
    }
    if let Some(v) = get("REFRESH_INTERVAL_SECS") {
        config.console.refresh_interval_secs = v.trim().parse().map_err(|_| {
            ConfigError::InvalidValue { var: "REFRESH_INTERVAL_SECS", value: v.clone() }
        })?;
    }

    Ok(())
}
