//! Credential abstraction.
//!
//! # Responsibilities
//! - Represent a single provider API key
//! - Track expiry state (expired flag + timestamp)
//! - Render a masked identifier for logs

use serde::Serialize;
use std::fmt;

/// An opaque provider secret.
///
/// `Debug` and `Display` both print the masked form; use [`ApiKey::expose`]
/// when the raw value has to go on the wire.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw secret.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First and last four characters for keys longer than eight, `****` otherwise.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() > 8 {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{}...{}", head, tail)
        } else {
            "****".to_string()
        }
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&self.masked()).finish()
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl From<&str> for ApiKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A configured credential and its expiry state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub key: ApiKey,
    pub expired: bool,
    /// Milliseconds since the epoch at which the key was marked expired.
    pub expired_at: Option<u64>,
}

impl Credential {
    pub fn new(key: ApiKey) -> Self {
        Self {
            key,
            expired: false,
            expired_at: None,
        }
    }

    pub fn is_usable(&self) -> bool {
        !self.expired
    }

    pub fn expire(&mut self, now_ms: u64) {
        self.expired = true;
        self.expired_at = Some(now_ms);
    }

    /// Reset the credential if its cooldown has elapsed. Returns true on reset.
    pub fn try_reset(&mut self, now_ms: u64, cooldown_ms: u64) -> bool {
        match (self.expired, self.expired_at) {
            (true, Some(at)) if now_ms.saturating_sub(at) >= cooldown_ms => {
                self.expired = false;
                self.expired_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn status(&self) -> CredentialStatus {
        CredentialStatus {
            key: self.key.masked(),
            expired: self.expired,
            expired_at: self.expired_at,
        }
    }
}

/// Read-only snapshot of a credential, safe to expose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    pub key: String,
    pub expired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masking() {
        assert_eq!(ApiKey::new("AIzaSyABCDEFGH1234").masked(), "AIza...1234");
        assert_eq!(ApiKey::new("short").masked(), "****");
        assert_eq!(ApiKey::new("12345678").masked(), "****");
        assert_eq!(format!("{:?}", ApiKey::new("AIzaSyABCDEFGH1234")), "ApiKey(\"AIza...1234\")");
        assert_eq!(ApiKey::new("AIzaSyABCDEFGH1234").to_string(), "AIza...1234");
    }

    #[test]
    fn test_reset_after_cooldown() {
        let mut cred = Credential::new(ApiKey::new("k1"));
        cred.expire(1_000);
        assert!(!cred.is_usable());

        assert!(!cred.try_reset(1_999, 1_000));
        assert!(cred.expired);

        assert!(cred.try_reset(2_000, 1_000));
        assert!(cred.is_usable());
        assert_eq!(cred.expired_at, None);

        // Second reset is a no-op
        assert!(!cred.try_reset(2_000, 1_000));
    }
}
