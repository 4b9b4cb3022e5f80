//! Key store.
//!
//! # Responsibilities
//! - Hold the ordered credential set and the rotation cursor
//! - Restore and persist expiry state
//! - Hand out the next usable credential
//! - Reset credentials whose cooldown has elapsed
//!
//! # Design Decisions
//! - Every mutation (expiry or cooldown reset) rewrites the state file
//!   before the lock is released, so the file never lags the ring and
//!   concurrent writers cannot interleave
//! - The write is a synchronous `std::fs` call on the caller's thread. The
//!   file holds one small entry per key and is only written on state
//!   changes, which are rare next to `next()` reads
//! - Write failures are logged and dropped; the in-memory state stays
//!   authoritative

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::config::CredentialConfig;
use crate::credentials::clock::{Clock, SystemClock};
use crate::credentials::credential::{ApiKey, Credential, CredentialStatus};
use crate::credentials::persistence::{PersistedCredential, PersistedState, StateFile};
use crate::credentials::rotator::{RoundRobin, Rotation};
use crate::credentials::DEFAULT_COOLDOWN_SECS;
use crate::observability::metrics;

/// Construction options for [`KeyStore`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// State file; `None` keeps state in memory only.
    pub state_file: Option<PathBuf>,
    pub cooldown: Duration,
    pub clock: Arc<dyn Clock>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            state_file: None,
            cooldown: Duration::from_secs(DEFAULT_COOLDOWN_SECS),
            clock: Arc::new(SystemClock),
        }
    }
}

impl StoreOptions {
    pub fn from_config(config: &CredentialConfig) -> Self {
        Self {
            state_file: Some(config.state_file.clone()),
            cooldown: Duration::from_secs(config.cooldown_secs),
            clock: Arc::new(SystemClock),
        }
    }
}

#[derive(Debug)]
struct KeyRing {
    credentials: Vec<Credential>,
    cursor: usize,
}

/// Shared credential set.
///
/// Every operation takes the same lock, so selecting a key and marking it
/// expired are atomic with respect to other callers.
#[derive(Debug)]
pub struct KeyStore {
    ring: Mutex<KeyRing>,
    state_file: Option<StateFile>,
    cooldown_ms: u64,
    clock: Arc<dyn Clock>,
    rotation: Box<dyn Rotation>,
}

impl KeyStore {
    /// Build a store from configured key values and restore prior state.
    ///
    /// Values are trimmed, blanks dropped and duplicates collapsed to their
    /// first occurrence.
    pub fn new<I, S>(keys: I, options: StoreOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let credentials = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty() && seen.insert(k.clone()))
            .map(|k| Credential::new(ApiKey::new(k)))
            .collect();

        let store = Self {
            ring: Mutex::new(KeyRing { credentials, cursor: 0 }),
            state_file: options.state_file.map(StateFile::new),
            cooldown_ms: options.cooldown.as_millis() as u64,
            clock: options.clock,
            rotation: Box::new(RoundRobin::new()),
        };
        store.load();
        store
    }

    /// Replace the rotation strategy.
    pub fn with_rotation(mut self, rotation: Box<dyn Rotation>) -> Self {
        self.rotation = rotation;
        self
    }

    fn lock(&self) -> MutexGuard<'_, KeyRing> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Restore expiry state from the state file, if any.
    pub fn load(&self) {
        let Some(file) = &self.state_file else {
            return;
        };
        let state = file.read();
        if state.is_empty() {
            return;
        }

        let now = self.clock.now_ms();
        let mut ring = self.lock();
        let mut restored = 0;
        for cred in ring.credentials.iter_mut() {
            if let Some(saved) = state.get(cred.key.expose()) {
                cred.expired = saved.expired;
                // An expired entry without a timestamp would never cool down
                cred.expired_at = match (saved.expired, saved.expired_at) {
                    (true, None) => Some(now),
                    (_, at) => at,
                };
                restored += 1;
            }
        }
        tracing::info!(restored, path = ?file.path(), "Restored credential state");
        metrics::record_active_credentials(active_in(&ring));
    }

    /// Persist the current state. Failures are logged and ignored.
    pub fn save(&self) {
        let ring = self.lock();
        self.persist(&ring);
    }

    fn persist(&self, ring: &KeyRing) {
        metrics::record_active_credentials(active_in(ring));
        let Some(file) = &self.state_file else {
            return;
        };
        let state: PersistedState = ring
            .credentials
            .iter()
            .map(|c| {
                (
                    c.key.expose().to_string(),
                    PersistedCredential {
                        expired: c.expired,
                        expired_at: c.expired_at,
                    },
                )
            })
            .collect();
        file.write(&state);
    }

    /// Mark `key` expired as of now. Returns false for unknown keys.
    pub fn mark_expired(&self, key: &ApiKey, reason: &'static str) -> bool {
        let now = self.clock.now_ms();
        let mut ring = self.lock();
        let Some(cred) = ring.credentials.iter_mut().find(|c| &c.key == key) else {
            return false;
        };
        cred.expire(now);
        tracing::warn!(key = %key, reason, "Credential marked expired");
        metrics::record_credential_expired(reason);
        self.persist(&ring);
        true
    }

    /// Reset every credential whose cooldown has elapsed at `now_ms`.
    /// Returns how many were reset.
    pub fn sweep_expired(&self, now_ms: u64) -> usize {
        let mut ring = self.lock();
        self.sweep_locked(&mut ring, now_ms)
    }

    fn sweep_locked(&self, ring: &mut KeyRing, now_ms: u64) -> usize {
        let mut reset = 0;
        for cred in ring.credentials.iter_mut() {
            if cred.try_reset(now_ms, self.cooldown_ms) {
                tracing::info!(key = %cred.key, "Credential cooldown elapsed, back in rotation");
                reset += 1;
            }
        }
        if reset > 0 {
            self.persist(ring);
        }
        reset
    }

    /// Next usable credential in rotation order, or `None` when every
    /// credential is expired or none are configured.
    pub fn next(&self) -> Option<ApiKey> {
        let now = self.clock.now_ms();
        let mut ring = self.lock();
        self.sweep_locked(&mut ring, now);

        let len = ring.credentials.len();
        let index = self.rotation.select(&ring.credentials, ring.cursor)?;
        ring.cursor = (index + 1) % len;
        Some(ring.credentials[index].key.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of credentials currently not expired.
    pub fn active_count(&self) -> usize {
        active_in(&self.lock())
    }

    /// Masked snapshot of every credential in configuration order.
    pub fn statuses(&self) -> Vec<CredentialStatus> {
        self.lock().credentials.iter().map(Credential::status).collect()
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

fn active_in(ring: &KeyRing) -> usize {
    ring.credentials.iter().filter(|c| c.is_usable()).count()
}
