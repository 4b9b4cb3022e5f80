//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Zero API keys is not an error; the service starts and reports
//!   "no active credentials" per request

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{GeneratorConfig, ADMIN_KEY_PLACEHOLDER};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &GeneratorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new("listener.request_timeout_secs", "must be greater than 0"));
    }

    if config.credentials.cooldown_secs == 0 {
        errors.push(ValidationError::new("credentials.cooldown_secs", "must be greater than 0"));
    }
    if config.credentials.sweep_interval_secs == 0 {
        errors.push(ValidationError::new("credentials.sweep_interval_secs", "must be greater than 0"));
    }

    if let Err(e) = Url::parse(&config.provider.base_url) {
        errors.push(ValidationError::new(
            "provider.base_url",
            format!("'{}' is not a URL: {}", config.provider.base_url, e),
        ));
    }
    if config.provider.model.trim().is_empty() {
        errors.push(ValidationError::new("provider.model", "must not be empty"));
    }
    if config.provider.timeout_secs == 0 {
        errors.push(ValidationError::new("provider.timeout_secs", "must be greater than 0"));
    }

    if config.retries.max_tries_per_key == 0 {
        errors.push(ValidationError::new("retries.max_tries_per_key", "must be at least 1"));
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.admin.enabled
        && (config.admin.api_key.trim().is_empty() || config.admin.api_key == ADMIN_KEY_PLACEHOLDER)
    {
        errors.push(ValidationError::new("admin.api_key", "must be set when the admin API is enabled"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
