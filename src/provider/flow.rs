//! Named, instrumented flows.

use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::error::GenerationError;
use crate::observability::metrics;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowDefinition {
    pub name: String,
}

impl FlowDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

type Handler<I, O> = dyn Fn(I) -> BoxFuture<'static, Result<O, GenerationError>> + Send + Sync;

/// Callable produced by [`ModelClient::define_flow`](crate::provider::ModelClient::define_flow).
pub struct Flow<I, O> {
    name: Arc<str>,
    handler: Arc<Handler<I, O>>,
}

impl<I, O> Clone for Flow<I, O> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            handler: self.handler.clone(),
        }
    }
}

impl<I: 'static, O: 'static> Flow<I, O> {
    pub(crate) fn new<F, Fut>(definition: FlowDefinition, handler: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, GenerationError>> + Send + 'static,
    {
        let handler = move |input: I| -> BoxFuture<'static, Result<O, GenerationError>> {
            Box::pin(handler(input))
        };
        Self {
            name: Arc::from(definition.name),
            handler: Arc::new(handler),
        }
    }
}

impl<I, O> Flow<I, O> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn run(&self, input: I) -> Result<O, GenerationError> {
        let start = Instant::now();
        let span = tracing::info_span!("flow", name = %self.name);
        let result = (self.handler)(input).instrument(span).await;

        metrics::record_flow(&self.name, result.is_ok(), start);
        match &result {
            Ok(_) => tracing::info!(flow = %self.name, elapsed_ms = start.elapsed().as_millis() as u64, "Flow completed"),
            Err(e) => tracing::warn!(flow = %self.name, error = %e, "Flow failed"),
        }
        result
    }
}

impl<I, O> std::fmt::Debug for Flow<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flow").field("name", &self.name).finish()
    }
}
