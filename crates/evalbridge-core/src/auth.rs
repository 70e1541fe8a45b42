//! Credential verification strategy.
//!
//! The HTTP layer extracts the presented credential and asks a
//! [`CredentialVerifier`] whether it is acceptable. Nothing here knows about
//! headers, so the strategy can be swapped without touching request handling.

use std::fmt;

use thiserror::Error;

/// Reasons a request is refused.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication is enabled and no credential was presented.
    #[error("missing API key")]
    MissingKey,

    /// The presented credential is not in the accepted set.
    #[error("API key not in authorized list")]
    InvalidKey,
}

/// Decides whether a presented credential grants access.
pub trait CredentialVerifier: Send + Sync + fmt::Debug {
    /// Whether any credential is required at all.
    fn is_enabled(&self) -> bool;

    /// Check a presented credential (`None` when the request carried none).
    fn verify(&self, presented: Option<&str>) -> Result<(), AuthError>;
}

/// Shared-secret verifier backed by a set of accepted API keys.
///
/// An empty set disables authentication entirely.
#[derive(Clone, Default)]
pub struct ApiKeySet {
    keys: Vec<Box<[u8]>>,
}

impl ApiKeySet {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(|k| k.as_ref().as_bytes().into())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Debug for ApiKeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeySet")
            .field("keys", &format_args!("<{} redacted>", self.keys.len()))
            .finish()
    }
}

impl CredentialVerifier for ApiKeySet {
    fn is_enabled(&self) -> bool {
        !self.keys.is_empty()
    }

    fn verify(&self, presented: Option<&str>) -> Result<(), AuthError> {
        if self.keys.is_empty() {
            return Ok(());
        }
        let presented = presented.ok_or(AuthError::MissingKey)?.as_bytes();

        // Every configured key is compared so timing does not reveal which
        // entry (if any) matched.
        let matched = self
            .keys
            .iter()
            .fold(false, |acc, key| acc | constant_time_eq(key, presented));

        if matched {
            Ok(())
        } else {
            Err(AuthError::InvalidKey)
        }
    }
}

/// Compare two byte strings without short-circuiting on the first mismatch.
///
/// Only the length comparison is data dependent.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_allows_everything() {
        let verifier = ApiKeySet::default();
        assert!(!verifier.is_enabled());
        assert_eq!(verifier.verify(None), Ok(()));
        assert_eq!(verifier.verify(Some("anything")), Ok(()));
    }

    #[test]
    fn missing_key_is_rejected_when_enabled() {
        let verifier = ApiKeySet::new(["alpha"]);
        assert!(verifier.is_enabled());
        assert_eq!(verifier.verify(None), Err(AuthError::MissingKey));
    }

    #[test]
    fn any_configured_key_is_accepted() {
        let verifier = ApiKeySet::new(["alpha", "beta"]);
        assert_eq!(verifier.verify(Some("alpha")), Ok(()));
        assert_eq!(verifier.verify(Some("beta")), Ok(()));
    }

    #[test]
    fn near_misses_are_rejected() {
        let verifier = ApiKeySet::new(["alpha"]);
        for attempt in ["", "alph", "alphaa", "ALPHA", "alpha "] {
            assert_eq!(
                verifier.verify(Some(attempt)),
                Err(AuthError::InvalidKey),
                "{attempt:?} should not match"
            );
        }
    }

    #[test]
    fn constant_time_eq_matches_slice_equality() {
        assert!(constant_time_eq(b"", b""));
        assert!(constant_time_eq(b"key", b"key"));
        assert!(!constant_time_eq(b"key", b"kez"));
        assert!(!constant_time_eq(b"key", b"keys"));
    }

    #[test]
    fn debug_does_not_leak_keys() {
        let rendered = format!("{:?}", ApiKeySet::new(["top-secret"]));
        assert!(!rendered.contains("top-secret"));
    }
}
