//! Credential management subsystem.
//!
//! # Data Flow
//! ```text
//! GEMINI_API_KEYS / config file
//!     → credential.rs (ApiKey, Credential, masking)
//!     → store.rs (KeyStore: ordered set + cursor behind one mutex)
//!         → persistence.rs (JSON state file, best-effort)
//!         → rotator.rs (round-robin selection, skip expired)
//!     → sweeper.rs (periodic cooldown reset)
//! ```
//!
//! # Design Decisions
//! - One mutex guards selection, sweep and expiry so concurrent callers
//!   never receive a credential that another caller just exhausted
//! - Time comes from an injected `Clock`
//! - Persistence failures are logged and swallowed

pub mod clock;
pub mod credential;
pub mod persistence;
pub mod rotator;
pub mod store;
pub mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credential::{ApiKey, Credential, CredentialStatus};
pub use store::{KeyStore, StoreOptions};
pub use sweeper::{CooldownSweeper, SweeperHandle};

/// Default cooldown after which an expired credential is reusable.
pub const DEFAULT_COOLDOWN_SECS: u64 = 24 * 60 * 60;
