//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, interval > 0)
//! - Check URLs and addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgeOpsConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::EdgeOpsConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} is not a valid http(s) URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a fully merged configuration.
pub fn validate_config(config: &EdgeOpsConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let identity = &config.identity;
    for (field, value) in [
        ("identity.service_name", &identity.service_name),
        ("identity.version", &identity.version),
        ("identity.deployment", &identity.deployment),
        ("identity.environment", &identity.environment),
        ("identity.commit", &identity.commit),
        ("listener.bind_host", &config.listener.bind_host),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::Empty { field });
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }
    if config.console.refresh_interval_secs == 0 {
        errors.push(ValidationError::Zero { field: "console.refresh_interval_secs" });
    }
    if config.console.request_timeout_secs == Some(0) {
        errors.push(ValidationError::Zero { field: "console.request_timeout_secs" });
    }

    check_http_url("console.api_base", &config.console.api_base, &mut errors);
    if let Some(marker) = &config.console.marker_url {
        check_http_url("console.marker_url", marker, &mut errors);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    let valid = Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}
