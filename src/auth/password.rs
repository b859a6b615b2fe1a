//! Password hashing and session token generation for eduboard.
//!
//! Uses Argon2id for password hashing. The PHC string produced by
//! [`Authenticator::hash`] embeds the salt and the cost parameters, so
//! verification needs nothing but the stored digest.

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand_core::{OsRng, RngCore};
use thiserror::Error;
use tracing::warn;

use crate::db::SessionToken;

/// Number of random bytes in a session token (256 bits).
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Default Argon2 memory cost in KiB (64 MB).
pub const DEFAULT_MEMORY_KIB: u32 = 65536;

/// Default Argon2 time cost (iterations).
pub const DEFAULT_ITERATIONS: u32 = 3;

/// Default Argon2 parallelism.
pub const DEFAULT_PARALLELISM: u32 = 4;

/// Password-related errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// Argon2 rejected the configured cost parameters.
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashingFailed(String),

    /// The digest was well formed but comparison could not be carried out.
    #[error("password comparison failed: {0}")]
    CompareFailed(String),
}

/// Password hasher and session token source.
///
/// Holds only the Argon2 parameters; cloning is cheap and every method is
/// safe to call concurrently.
#[derive(Debug, Clone)]
pub struct Authenticator {
    params: Params,
}

impl Authenticator {
    /// Create an authenticator with the default Argon2 parameters.
    pub fn new() -> Self {
        Self {
            params: Self::default_params(),
        }
    }

    /// Create an authenticator with explicit Argon2 parameters.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self { params })
    }

    fn default_params() -> Params {
        Params::new(DEFAULT_MEMORY_KIB, DEFAULT_ITERATIONS, DEFAULT_PARALLELISM, None)
            .unwrap_or_default()
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password using Argon2id with a fresh random salt.
    ///
    /// Returns a PHC-formatted string.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored digest.
    ///
    /// Returns `Ok(false)` on mismatch and on a malformed digest.
    pub fn verify(&self, digest: &str, plaintext: &str) -> Result<bool, PasswordError> {
        let parsed = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Stored password digest is malformed");
                return Ok(false);
            }
        };

        // Cost parameters come from the parsed digest, not from self.
        match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::CompareFailed(e.to_string())),
        }
    }

    /// Generate a new opaque session token.
    pub fn new_session_token(&self) -> SessionToken {
        let mut bytes = [0u8; SESSION_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        SessionToken::new(URL_SAFE_NO_PAD.encode(bytes))
    }
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn fast() -> Authenticator {
        Authenticator::with_params(1024, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_is_phc_and_not_plaintext() {
        let hash = fast().hash("longpassword").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("$v=19$"));
        assert_ne!(hash, "longpassword");
    }

    #[test]
    fn test_hash_is_salted() {
        let auth = fast();
        let a = auth.hash("same_password").unwrap();
        let b = auth.hash("same_password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_roundtrip() {
        let auth = fast();
        let hash = auth.hash("correct horse").unwrap();
        assert!(auth.verify(&hash, "correct horse").unwrap());
        assert!(!auth.verify(&hash, "wrong horse").unwrap());
    }

    #[test]
    fn test_verify_uses_digest_params() {
        let hash = fast().hash("password123").unwrap();
        let other = Authenticator::with_params(2048, 2, 1).unwrap();
        assert!(other.verify(&hash, "password123").unwrap());
    }

    #[test]
    fn test_verify_malformed_digest_is_false() {
        let auth = fast();
        assert!(!auth.verify("not-a-phc-string", "anything").unwrap());
        assert!(!auth.verify("", "anything").unwrap());
    }

    #[test]
    fn test_invalid_params() {
        let err = Authenticator::with_params(1, 0, 0).unwrap_err();
        assert!(matches!(err, PasswordError::InvalidParams(_)));
    }

    #[test]
    fn test_session_tokens_are_unique_and_long() {
        let auth = fast();
        let tokens: HashSet<String> = (0..64)
            .map(|_| auth.new_session_token().as_str().to_string())
            .collect();
        assert_eq!(tokens.len(), 64);
        for token in &tokens {
            // 32 bytes, base64 without padding
            assert_eq!(token.len(), 43);
            assert!(!token.contains('='));
        }
    }
}
