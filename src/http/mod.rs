//! HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (assign / propagate x-request-id)
//!     → api.rs (decode camelCase JSON, call PaperGenerator)
//!     → error.rs (GenerationError → 400 / 429 / 502)
//!     → Send to client
//! ```

pub mod api;
pub mod error;
pub mod request;
pub mod server;

pub use error::ApiError;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
