//! Credential failover and bounded retry.
//!
//! # Responsibilities
//! - Pick a credential per attempt from the key store
//! - Classify failures and decide: rotate, retry, or surface
//! - Bound total work per logical operation
//!
//! # Design Decisions
//! - Quota failures expire the credential immediately
//! - Transient failures retry the same credential with backoff; a
//!   credential that keeps failing is expired after the last attempt
//! - Unknown failures abort the whole operation with the original error

use std::future::Future;
use std::sync::Arc;

use crate::config::RetryConfig;
use crate::credentials::{ApiKey, KeyStore};
use crate::error::{GenerationError, ProviderError};
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::classifier::{ErrorClassifier, FailureClass, PatternClassifier};

/// Retry bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts on a single credential before giving up on it.
    pub max_tries_per_key: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_tries_per_key: 2,
            base_delay_ms: 200,
            max_delay_ms: 2000,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_tries_per_key: config.max_tries_per_key.max(1),
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }
}

/// Runs remote operations with credential failover.
pub struct RetryOrchestrator {
    store: Arc<KeyStore>,
    classifier: Arc<dyn ErrorClassifier>,
    policy: RetryPolicy,
}

impl RetryOrchestrator {
    pub fn new(store: Arc<KeyStore>, policy: RetryPolicy) -> Self {
        Self {
            store,
            classifier: Arc::new(PatternClassifier::default()),
            policy,
        }
    }

    pub fn from_config(store: Arc<KeyStore>, config: &RetryConfig) -> Self {
        Self::new(store, RetryPolicy::from(config))
            .with_classifier(Arc::new(PatternClassifier::from_config(config)))
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn store(&self) -> &Arc<KeyStore> {
        &self.store
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Execute `operation` with automatic credential failover.
    ///
    /// `label` names the operation in logs and metrics.
    pub async fn execute<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, GenerationError>
    where
        F: FnMut(ApiKey) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let total_keys = self.store.len().max(1);
        let max_tries = self.policy.max_tries_per_key.max(1);
        let mut tried: Vec<ApiKey> = Vec::with_capacity(total_keys);
        let mut last_error: Option<(ProviderError, FailureClass)> = None;

        for _ in 0..total_keys {
            let Some(key) = self.store.next() else {
                tracing::debug!(operation = label, "No usable credential left");
                break;
            };
            if tried.contains(&key) {
                break;
            }
            tried.push(key.clone());

            for attempt in 1..=max_tries {
                let err = match operation(key.clone()).await {
                    Ok(value) => {
                        metrics::record_provider_attempt(label, "success");
                        return Ok(value);
                    }
                    Err(err) => err,
                };

                let class = self.classifier.classify(&err);
                metrics::record_provider_attempt(label, class.as_str());
                tracing::warn!(
                    operation = label,
                    key = %key,
                    attempt,
                    class = class.as_str(),
                    error = %err,
                    "Provider call failed"
                );

                match class {
                    FailureClass::Quota => {
                        self.store.mark_expired(&key, "quota");
                        last_error = Some((err, class));
                        break;
                    }
                    FailureClass::Transient => {
                        last_error = Some((err, class));
                        if attempt < max_tries {
                            let delay = calculate_backoff(
                                attempt,
                                self.policy.base_delay_ms,
                                self.policy.max_delay_ms,
                            );
                            tracing::info!(operation = label, key = %key, attempt, delay = ?delay, "Retrying after transient failure");
                            tokio::time::sleep(delay).await;
                        } else {
                            self.store.mark_expired(&key, "transient");
                        }
                    }
                    FailureClass::Unknown => {
                        return Err(GenerationError::Provider(err));
                    }
                }
            }
        }

        Err(match last_error {
            Some((last, class)) => GenerationError::CredentialsExhausted { last, class },
            None => GenerationError::NoActiveCredentials,
        })
    }
}

impl std::fmt::Debug for RetryOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryOrchestrator")
            .field("credentials", &self.store.len())
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StoreOptions;
    use crate::resilience::classifier::DEFAULT_TRANSIENT_PATTERNS;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn orchestrator(keys: &[&str]) -> RetryOrchestrator {
        let store = Arc::new(KeyStore::new(keys.iter().copied(), StoreOptions::default()));
        RetryOrchestrator::new(
            store,
            RetryPolicy {
                base_delay_ms: 0,
                ..RetryPolicy::default()
            },
        )
    }

    fn quota() -> ProviderError {
        ProviderError::Status {
            status: 429,
            message: "Resource has been exhausted (e.g. check quota).".into(),
        }
    }

    #[tokio::test]
    async fn test_quota_tries_each_key_once() {
        let orch = orchestrator(&["k1", "k2", "k3"]);
        let calls = Mutex::new(Vec::new());

        let result: Result<(), _> = orch
            .execute("test", |key| {
                calls.lock().unwrap().push(key);
                async { Err(quota()) }
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, GenerationError::CredentialsExhausted { .. }));
        assert!(err.to_string().contains("no active credentials"));

        let calls = calls.into_inner().unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls.iter().collect::<HashSet<_>>().len(), 3);
        assert_eq!(orch.store().active_count(), 0);
    }

    #[tokio::test]
    async fn test_transient_then_success_on_second_key() {
        let orch = orchestrator(&["k1", "k2", "k3"]);
        let calls = Mutex::new(Vec::new());

        let result = orch
            .execute("test", |key| {
                let n = {
                    let mut calls = calls.lock().unwrap();
                    calls.push(key);
                    calls.len()
                };
                async move {
                    if n <= 2 {
                        Err(ProviderError::Network("connection refused".into()))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        let calls = calls.into_inner().unwrap();
        assert_eq!(calls, vec![ApiKey::from("k1"), ApiKey::from("k1"), ApiKey::from("k2")]);

        let expired: Vec<_> = orch.store().statuses().into_iter().filter(|s| s.expired).collect();
        assert_eq!(expired.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_error_aborts_immediately() {
        let orch = orchestrator(&["k1", "k2", "k3"]);
        let mut calls = 0;

        let result: Result<(), _> = orch
            .execute("test", |_key| {
                calls += 1;
                async { Err(ProviderError::Other("invalid argument: schema mismatch".into())) }
            })
            .await;

        match result.unwrap_err() {
            GenerationError::Provider(ProviderError::Other(msg)) => {
                assert_eq!(msg, "invalid argument: schema mismatch")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(calls, 1);
        assert_eq!(orch.store().active_count(), 3);
    }

    #[tokio::test]
    async fn test_single_key_quota_makes_one_attempt() {
        let orch = orchestrator(&["only-key-123456"]);
        let mut calls = 0;

        let result: Result<(), _> = orch
            .execute("test", |_key| {
                calls += 1;
                async { Err(ProviderError::Other("Error: 429 too many requests".into())) }
            })
            .await;

        assert!(matches!(result, Err(GenerationError::CredentialsExhausted { .. })));
        assert_eq!(calls, 1);
        assert_eq!(orch.store().active_count(), 0);
    }

    #[tokio::test]
    async fn test_no_credentials() {
        let orch = orchestrator(&[]);
        let mut calls = 0;

        let result: Result<(), _> = orch
            .execute("test", |_key| {
                calls += 1;
                async { Ok(()) }
            })
            .await;

        assert!(matches!(result, Err(GenerationError::NoActiveCredentials)));
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_invocations_bounded() {
        let orch = orchestrator(&["k1", "k2"]);
        let mut calls = 0;

        let result: Result<(), _> = orch
            .execute("test", |_key| {
                calls += 1;
                async { Err(ProviderError::Timeout(5)) }
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::CredentialsExhausted { class: FailureClass::Transient, .. }
        ));
        assert!(!err.is_rate_limited());
        assert_eq!(calls, 4);
    }

    #[tokio::test]
    async fn test_stops_when_no_usable_key_left() {
        // k2 is already expired; once k1 fails out there is nothing to rotate to
        let orch = orchestrator(&["k1", "k2"]);
        orch.store().mark_expired(&"k2".into(), "quota");
        let mut calls = 0;

        let result: Result<(), _> = orch
            .execute("test", |_key| {
                calls += 1;
                async { Err(ProviderError::Timeout(5)) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_success_short_circuits() {
        let orch = orchestrator(&["k1", "k2"]);
        let mut calls = 0;
        let result = orch
            .execute("test", |_key| {
                calls += 1;
                async { Ok::<_, ProviderError>(7) }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_custom_classifier() {
        let orch = orchestrator(&["k1", "k2"])
            .with_classifier(Arc::new(|_: &ProviderError| FailureClass::Quota));
        let mut calls = 0;
        let result: Result<(), _> = orch
            .execute("test", |_key| {
                calls += 1;
                async { Err(ProviderError::Other("anything".into())) }
            })
            .await;
        assert!(matches!(result, Err(GenerationError::CredentialsExhausted { .. })));
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_expired_keys_exhaust_as_rate_limited() {
        let orch = orchestrator(&["k1", "k2"]);
        let mut calls = 0;
        let result: Result<(), _> = orch
            .execute("test", |_key| {
                calls += 1;
                async {
                    Err(ProviderError::Status {
                        status: 400,
                        message: "API key expired. Please renew the API key.".into(),
                    })
                }
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::CredentialsExhausted { class: FailureClass::Quota, .. }
        ));
        assert!(err.is_rate_limited());
        assert_eq!(calls, 2);
        assert_eq!(orch.store().active_count(), 0);
    }

    #[tokio::test]
    async fn test_custom_quota_pattern_exhausts_as_rate_limited() {
        let orch = orchestrator(&["k1"]).with_classifier(Arc::new(PatternClassifier::new(
            ["billing disabled"],
            DEFAULT_TRANSIENT_PATTERNS,
        )));
        let result: Result<(), _> = orch
            .execute("test", |_key| async {
                Err(ProviderError::Status {
                    status: 403,
                    message: "Billing disabled for project".into(),
                })
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_rate_limited(), "got {err:?}");
    }
}
