//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the generator.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::credentials::DEFAULT_COOLDOWN_SECS;
use crate::resilience::classifier::{DEFAULT_QUOTA_PATTERNS, DEFAULT_TRANSIENT_PATTERNS};

/// Placeholder admin key; validation rejects it when the admin API is enabled.
pub const ADMIN_KEY_PLACEHOLDER: &str = "CHANGE_ME_IN_PRODUCTION";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GeneratorConfig {
    /// HTTP API listener.
    pub listener: ListenerConfig,

    /// Provider credentials and their state file.
    pub credentials: CredentialConfig,

    /// Generative-text provider endpoint.
    pub provider: ProviderConfig,

    /// Retry and classification settings.
    pub retries: RetryConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Credential admin endpoints.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:9002").
    pub bind_address: String,

    /// Upper bound for a whole API request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:9002".to_string(),
            request_timeout_secs: 300,
        }
    }
}

/// Credential configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// API keys in rotation order. Replaced by `GEMINI_API_KEYS` when set.
    pub keys: Vec<String>,

    /// Expiry state file, relative to the working directory.
    pub state_file: PathBuf,

    /// Seconds before an expired key is eligible again.
    pub cooldown_secs: u64,

    /// Interval of the background cooldown sweep, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            state_file: PathBuf::from(".gemini_key_state.json"),
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            sweep_interval_secs: DEFAULT_COOLDOWN_SECS,
        }
    }
}

/// Provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API root (e.g., "https://generativelanguage.googleapis.com").
    pub base_url: String,

    /// Model identifier.
    pub model: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts on one key for transient failures.
    pub max_tries_per_key: u32,

    /// Base delay for linear backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum backoff delay in milliseconds.
    pub max_delay_ms: u64,

    /// Case-insensitive substrings that mark a quota / expired-key failure.
    pub quota_patterns: Vec<String>,

    /// Case-insensitive substrings that mark a transient network failure.
    pub transient_patterns: Vec<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_tries_per_key: 2,
            base_delay_ms: 200,
            max_delay_ms: 2000,
            quota_patterns: DEFAULT_QUOTA_PATTERNS.iter().map(|s| s.to_string()).collect(),
            transient_patterns: DEFAULT_TRANSIENT_PATTERNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Admin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the credential admin endpoints.
    pub enabled: bool,

    /// Bearer token for the admin endpoints.
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: ADMIN_KEY_PLACEHOLDER.to_string(),
        }
    }
}
