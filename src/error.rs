//! Error types shared by the provider client, the retry layer and the API.

use thiserror::Error;

use crate::resilience::classifier::FailureClass;

/// Failure reported by a single call to the generative-text provider.
///
/// The display strings carry the provider detail; the default
/// [`PatternClassifier`](crate::resilience::classifier::PatternClassifier)
/// matches against them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Provider answered with a non-success HTTP status.
    #[error("provider returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Request did not complete within the configured deadline.
    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    /// Transport failure (DNS, connect, reset).
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be understood.
    #[error("failed to decode provider response: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// HTTP status, when the provider returned one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors surfaced by the generation operations.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Caller supplied input that fails validation. Never reaches the provider.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No credential was available at all.
    #[error("no active credentials available")]
    NoActiveCredentials,

    /// Every credential was tried and rotated out. `class` is how the
    /// classifier judged `last`.
    #[error("no active credentials available (last error: {last})")]
    CredentialsExhausted {
        last: ProviderError,
        class: FailureClass,
    },

    /// Unclassified provider failure, surfaced as-is.
    #[error(transparent)]
    Provider(ProviderError),

    /// Provider output did not match the expected shape.
    #[error("malformed output from {prompt}: {source}")]
    MalformedOutput {
        prompt: String,
        #[source]
        source: serde_json::Error,
    },

    /// Prompt template references a field the input does not provide.
    #[error("template for {prompt} references unknown field '{field}'")]
    Template { prompt: String, field: String },
}

/// Result type for generation operations.
pub type GenerationResult<T> = Result<T, GenerationError>;

const RATE_LIMIT_GUIDANCE: &str =
    "API rate limit exceeded. Add more API keys to GEMINI_API_KEYS or wait before retrying.";

impl GenerationError {
    /// True when the failure is caused by credential pressure (HTTP 429 style)
    /// rather than a bug or outage.
    ///
    /// Exhaustion follows the configured classifier, so any pattern it treats
    /// as quota (including custom ones) counts.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            GenerationError::NoActiveCredentials => true,
            GenerationError::CredentialsExhausted { class, .. } => *class == FailureClass::Quota,
            GenerationError::Provider(err) => err.status() == Some(429),
            _ => false,
        }
    }

    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        if self.is_rate_limited() {
            RATE_LIMIT_GUIDANCE.to_string()
        } else {
            format!("Generation failed: {}", self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhaustion_message_keeps_last_error() {
        let err = GenerationError::CredentialsExhausted {
            last: ProviderError::Status {
                status: 429,
                message: "Resource has been exhausted".into(),
            },
            class: FailureClass::Quota,
        };
        let text = err.to_string();
        assert!(text.starts_with("no active credentials available"));
        assert!(text.contains("429"));
        assert!(err.is_rate_limited());
        assert!(err.user_message().contains("GEMINI_API_KEYS"));
    }

    #[test]
    fn test_network_exhaustion_is_not_rate_limit() {
        let err = GenerationError::CredentialsExhausted {
            last: ProviderError::Network("connection refused".into()),
            class: FailureClass::Transient,
        };
        assert!(!err.is_rate_limited());
        assert!(err.user_message().contains("connection refused"));
    }

    #[test]
    fn test_expired_key_exhaustion_is_rate_limited() {
        let err = GenerationError::CredentialsExhausted {
            last: ProviderError::Status {
                status: 400,
                message: "API key expired. Please renew the API key.".into(),
            },
            class: FailureClass::Quota,
        };
        assert!(err.is_rate_limited());
        assert!(err.user_message().contains("GEMINI_API_KEYS"));
    }

    #[test]
    fn test_provider_error_is_transparent() {
        let err = GenerationError::Provider(ProviderError::Other("boom".into()));
        assert_eq!(err.to_string(), "boom");
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_no_credentials_is_rate_limited() {
        assert!(GenerationError::NoActiveCredentials.is_rate_limited());
    }
}
