//! Credential rotation strategies.

use std::fmt::Debug;
use crate::credentials::credential::Credential;

/// Chooses which credential to hand out next.
///
/// The cursor is owned by the [`KeyStore`](crate::credentials::KeyStore) and
/// advanced past whatever index the strategy returns.
pub trait Rotation: Send + Sync + Debug {
    fn select(&self, credentials: &[Credential], cursor: usize) -> Option<usize>;
}

/// Round-robin in configuration order, skipping expired credentials.
#[derive(Debug, Default)]
pub struct RoundRobin;

impl RoundRobin {
    pub fn new() -> Self {
        Self
    }
}

impl Rotation for RoundRobin {
    fn select(&self, credentials: &[Credential], cursor: usize) -> Option<usize> {
        let len = credentials.len();
        if len == 0 {
            return None;
        }

        // Scan at most `len` slots so an all-expired set terminates
        (0..len)
            .map(|i| (cursor + i) % len)
            .find(|&index| credentials[index].is_usable())
    }
}
