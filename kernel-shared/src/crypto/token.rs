//! # Opaque Token Generation and Hashing
//!
//! Session identifiers, OAuth2 client secrets, and bearer tokens (access /
//! refresh) are all opaque, unguessable values: 32 bytes from the OS CSPRNG,
//! URL-safe base64 encoded for the value handed to the caller, and a
//! SHA-256 hash of that value for the lookup key stored at rest (spec
//! §3 Session / OAuth2 Client, §4.6 secret handling).
//!
//! Storing only the hash means a leaked database dump doesn't hand out
//! working session tokens or client secrets - same rationale as the
//! refresh-token hashing pattern this is grounded on.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Generates `n` cryptographically random bytes, URL-safe base64 encoded
/// without padding.
pub fn generate_opaque_token(n: usize) -> String {
    let mut bytes = vec![0u8; n];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generates a 32-byte opaque token - the size used for session identifiers
/// and OAuth2 client secrets (spec §4.3, §4.6).
pub fn generate_session_token() -> String {
    generate_opaque_token(32)
}

/// SHA-256 hashes an opaque token/secret for storage, URL-safe base64
/// encoded without padding (spec §4.6).
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Constant-time comparison of two hash strings. Used when a caller
/// presents a candidate hash to compare against a stored one, to avoid
/// leaking a byte-by-byte timing oracle.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
    }

    #[test]
    fn token_hash_is_deterministic() {
        let token = "fixed-token-value";
        assert_eq!(hash_token(token), hash_token(token));
    }

    #[test]
    fn different_tokens_hash_differently() {
        assert_ne!(hash_token("token-a"), hash_token("token-b"));
    }

    #[test]
    fn constant_time_eq_matches_regular_equality() {
        let hash = hash_token("some-token");
        assert!(constant_time_eq(&hash, &hash));
        assert!(!constant_time_eq(&hash, &hash_token("other-token")));
    }
}
