//! Provider failure classification.
//!
//! String matching is a heuristic; swap in a structured classifier if the
//! provider starts returning stable error codes.

use crate::config::RetryConfig;
use crate::error::ProviderError;

/// How the orchestrator should react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Quota, rate limit or expired key. Rotate away from the credential.
    Quota,
    /// Recoverable network failure. Retry the same credential.
    Transient,
    /// Anything else. Surface immediately.
    Unknown,
}

impl FailureClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureClass::Quota => "quota",
            FailureClass::Transient => "transient",
            FailureClass::Unknown => "unknown",
        }
    }
}

pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, error: &ProviderError) -> FailureClass;
}

impl<F> ErrorClassifier for F
where
    F: Fn(&ProviderError) -> FailureClass + Send + Sync,
{
    fn classify(&self, error: &ProviderError) -> FailureClass {
        self(error)
    }
}

pub const DEFAULT_QUOTA_PATTERNS: &[&str] = &["429", "rate limit", "quota", "api key expired"];

pub const DEFAULT_TRANSIENT_PATTERNS: &[&str] = &[
    "fetch failed",
    "network",
    "econnrefused",
    "connection refused",
    "enotfound",
    "dns",
    "timeout",
    "timed out",
    "socket hang up",
    "connection reset",
];

/// Matches the lower-cased error text against pattern lists. Quota
/// patterns win over transient ones.
#[derive(Debug, Clone)]
pub struct PatternClassifier {
    quota: Vec<String>,
    transient: Vec<String>,
}

impl PatternClassifier {
    pub fn new<Q, T>(quota: Q, transient: T) -> Self
    where
        Q: IntoIterator,
        Q::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let lower = |s: &str| s.to_lowercase();
        Self {
            quota: quota.into_iter().map(|p| lower(p.as_ref())).collect(),
            transient: transient.into_iter().map(|p| lower(p.as_ref())).collect(),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(&config.quota_patterns, &config.transient_patterns)
    }
}

impl Default for PatternClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTA_PATTERNS, DEFAULT_TRANSIENT_PATTERNS)
    }
}

impl ErrorClassifier for PatternClassifier {
    fn classify(&self, error: &ProviderError) -> FailureClass {
        let msg = error.to_string().to_lowercase();
        if self.quota.iter().any(|p| msg.contains(p.as_str())) {
            FailureClass::Quota
        } else if self.transient.iter().any(|p| msg.contains(p.as_str())) {
            FailureClass::Transient
        } else {
            FailureClass::Unknown
        }
    }
}
