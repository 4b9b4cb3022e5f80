//! Paper generation server.
//!
//! ```text
//!     Client Request
//!     ─────────────▶ http server ─▶ PaperGenerator ─▶ Flow ─▶ Prompt
//!                                                               │
//!                                                               ▼
//!                       KeyStore ◀──── RetryOrchestrator ──▶ GeminiBackend ──▶ Provider
//!                          ▲
//!                          └──── CooldownSweeper (background)
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use paper_generator::config::loader::{load_config, KEYS_ENV, KEY_ENV};
use paper_generator::credentials::{CooldownSweeper, KeyStore, StoreOptions};
use paper_generator::lifecycle::{signals::wait_for_signal, Shutdown};
use paper_generator::observability::{logging::init_logging, metrics::init_metrics};
use paper_generator::{GeminiBackend, HttpServer, ModelClient, PaperGenerator, RetryOrchestrator};

#[derive(Parser)]
#[command(name = "paper-generator")]
#[command(about = "Academic paper generation service", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        model = %config.provider.model,
        credentials = config.credentials.keys.len(),
        "paper-generator starting"
    );
    if config.credentials.keys.is_empty() {
        tracing::warn!(
            "No API keys configured; set {} or {}. Every generation will fail until keys are added.",
            KEYS_ENV,
            KEY_ENV
        );
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = Arc::new(KeyStore::new(
        config.credentials.keys.iter(),
        StoreOptions::from_config(&config.credentials),
    ));
    let sweeper = CooldownSweeper::new(
        store.clone(),
        Duration::from_secs(config.credentials.sweep_interval_secs),
    )
    .start();

    let orchestrator = Arc::new(RetryOrchestrator::from_config(store, &config.retries));
    let backend = Arc::new(GeminiBackend::from_config(&config.provider)?);
    let client = ModelClient::new(backend, orchestrator, config.provider.model.clone());
    let generator = PaperGenerator::new(client);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    let server = HttpServer::new(config, generator);
    server.run(listener, shutdown).await?;

    sweeper.stop().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
