//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router for the generation API
//! - Mount the admin routes when enabled
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve until the shutdown broadcast fires

use axum::{
    error_handling::HandleErrorLayer,
    routing::{get, post},
    BoxError, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::trace::TraceLayer;

use crate::admin;
use crate::config::GeneratorConfig;
use crate::generation::PaperGenerator;
use crate::http::api;
use crate::http::error::ApiError;
use crate::http::request::{propagate_request_id, set_request_id};
use crate::lifecycle::Shutdown;

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub generator: PaperGenerator,
    pub config: Arc<GeneratorConfig>,
}

/// HTTP server for the generation API.
pub struct HttpServer {
    router: Router,
    config: Arc<GeneratorConfig>,
}

impl HttpServer {
    pub fn new(config: GeneratorConfig, generator: PaperGenerator) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            generator,
            config: config.clone(),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GeneratorConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/health", get(api::health))
            .route("/api/v1/dedication", post(api::dedication))
            .route("/api/v1/acknowledgement", post(api::acknowledgement))
            .route("/api/v1/chapters", post(api::chapters))
            .route("/api/v1/conclusion", post(api::conclusion))
            .route("/api/v1/references", post(api::references))
            .route("/api/v1/paper", post(api::paper));

        if config.admin.enabled {
            router = router.merge(admin::setup_admin_router(state.clone()));
        } else {
            tracing::debug!("Admin API disabled");
        }

        let timeout = Duration::from_secs(config.listener.request_timeout_secs);

        // Outermost first: the ID exists before tracing starts and survives timeouts
        router.with_state(state).layer(
            ServiceBuilder::new()
                .layer(set_request_id())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id())
                .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                    middleware_error(err, timeout)
                }))
                .layer(TimeoutLayer::new(timeout)),
        )
    }

    /// Router with all layers applied, for in-process serving.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on `listener` until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            admin = self.config.admin.enabled,
            "HTTP server starting"
        );

        let mut rx = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = rx.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

/// Turn a middleware failure into the JSON error body handlers use.
fn middleware_error(err: BoxError, timeout: Duration) -> ApiError {
    if err.is::<Elapsed>() {
        tracing::warn!(timeout_secs = timeout.as_secs(), "Request timed out");
        ApiError::timeout(timeout)
    } else {
        tracing::error!(error = %err, "Unhandled middleware error");
        ApiError::internal(format!("Unhandled internal error: {err}"))
    }
}
