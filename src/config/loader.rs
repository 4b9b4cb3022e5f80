//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::GeneratorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Comma-separated key list.
pub const KEYS_ENV: &str = "GEMINI_API_KEYS";
/// Single-key fallback.
pub const KEY_ENV: &str = "GEMINI_API_KEY";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<GeneratorConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GeneratorConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Replace configured keys with the environment's, when it provides any.
pub fn apply_env_overrides<F>(config: &mut GeneratorConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let keys = keys_from_env(lookup);
    if !keys.is_empty() {
        tracing::debug!(count = keys.len(), "Using API keys from environment");
        config.credentials.keys = keys;
    }
}

/// `GEMINI_API_KEYS` if non-empty, otherwise `GEMINI_API_KEY`; split on
/// commas, trimmed, blanks dropped.
pub fn keys_from_env<F>(lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(KEYS_ENV)
        .filter(|v| !v.trim().is_empty())
        .or_else(|| lookup(KEY_ENV))
        .unwrap_or_default();

    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}
