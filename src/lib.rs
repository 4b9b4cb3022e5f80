//! Academic paper generation service library.

pub mod admin;
pub mod config;
pub mod credentials;
pub mod error;
pub mod generation;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod provider;
pub mod resilience;

pub use config::schema::GeneratorConfig;
pub use credentials::{ApiKey, KeyStore, StoreOptions};
pub use error::{GenerationError, ProviderError};
pub use generation::PaperGenerator;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use provider::{GeminiBackend, ModelClient};
pub use resilience::RetryOrchestrator;
