//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Remote call through the orchestrator:
//!     → store.next() (credential)
//!     → operation(credential)
//!     → On failure: classifier.rs (quota / transient / unknown)
//!         → quota: expire credential, rotate
//!         → transient: backoff.rs, retry same credential, then expire + rotate
//!         → unknown: surface immediately
//! ```
//!
//! # Design Decisions
//! - Bounded work: at most `credentials * max_tries_per_key` invocations
//! - Unknown failures are never masked by rotation
//! - Classification is pluggable

pub mod backoff;
pub mod classifier;
pub mod retry;

pub use classifier::{ErrorClassifier, FailureClass, PatternClassifier};
pub use retry::{RetryOrchestrator, RetryPolicy};
