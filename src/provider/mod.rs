//! Generative-text provider subsystem.
//!
//! # Data Flow
//! ```text
//! Flow::run(input)                     (flow.rs)
//!     → Prompt::call(input)            (prompt.rs: render template)
//!     → RetryOrchestrator::execute     (credential failover)
//!         → ModelBackend::generate     (gemini.rs: one HTTP call per attempt)
//!     → decode JSON output into the typed result
//! ```
//!
//! # Design Decisions
//! - Typed definitions in, typed callables out; no dynamic dispatch on
//!   method names
//! - Backends are trait objects so tests can script provider behaviour
//! - A flow issues its remote call through the orchestrator exactly once

pub mod flow;
pub mod gemini;
pub mod prompt;

use futures_util::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use crate::credentials::ApiKey;
use crate::error::{GenerationError, ProviderError};
use crate::resilience::RetryOrchestrator;

pub use flow::{Flow, FlowDefinition};
pub use gemini::GeminiBackend;
pub use prompt::{Prompt, PromptDefinition};

/// Content category for provider-side safety filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

impl SafetySetting {
    pub fn new(category: impl Into<String>, threshold: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            threshold: threshold.into(),
        }
    }
}

/// A fully rendered request for one provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    /// Prompt name, for logs.
    pub prompt: String,
    pub model: String,
    pub text: String,
    /// JSON schema the structured output must follow.
    pub response_schema: Value,
    pub safety_settings: Vec<SafetySetting>,
}

/// One call to a generative-text model, authorized by `api_key`.
///
/// Returns the model's structured JSON output.
pub trait ModelBackend: Send + Sync {
    fn generate<'a>(
        &'a self,
        api_key: ApiKey,
        request: &'a ModelRequest,
    ) -> BoxFuture<'a, Result<Value, ProviderError>>;
}

struct ClientInner {
    backend: Arc<dyn ModelBackend>,
    orchestrator: Arc<RetryOrchestrator>,
    model: String,
}

/// Handle for defining prompts and flows against one backend.
#[derive(Clone)]
pub struct ModelClient {
    inner: Arc<ClientInner>,
}

impl ModelClient {
    pub fn new(
        backend: Arc<dyn ModelBackend>,
        orchestrator: Arc<RetryOrchestrator>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                backend,
                orchestrator,
                model: model.into(),
            }),
        }
    }

    pub fn model(&self) -> &str {
        &self.inner.model
    }

    pub fn orchestrator(&self) -> &Arc<RetryOrchestrator> {
        &self.inner.orchestrator
    }

    /// Typed callable that renders `definition` and runs it through the
    /// orchestrator.
    pub fn define_prompt<I, O>(&self, definition: PromptDefinition) -> Prompt<I, O> {
        Prompt::new(self.clone(), definition)
    }

    /// Typed, named callable wrapping `handler`.
    pub fn define_flow<I, O, F, Fut>(&self, definition: FlowDefinition, handler: F) -> Flow<I, O>
    where
        I: 'static,
        O: 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, GenerationError>> + Send + 'static,
    {
        Flow::new(definition, handler)
    }

    pub(crate) async fn send(&self, request: &ModelRequest) -> Result<Value, GenerationError> {
        let backend: &dyn ModelBackend = self.inner.backend.as_ref();
        self.inner
            .orchestrator
            .execute(&request.prompt, move |key| backend.generate(key, request))
            .await
    }
}

impl std::fmt::Debug for ModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelClient")
            .field("model", &self.inner.model)
            .field("orchestrator", &self.inner.orchestrator)
            .finish()
    }
}
