//! # Email Hashing
//!
//! Identities are looked up globally by `email_hash`, never by plaintext
//! email. The hash is `HMAC-SHA256(key, normalize(email))`, lowercase-hex
//! encoded (64 characters). Without the process-wide key, an attacker who
//! obtains a database dump cannot recover which hash corresponds to which
//! email address without also brute-forcing the key - HMAC rather than a
//! bare SHA-256 digest is what buys that property (spec §4.1).
//!
//! ## Normalization
//!
//! `normalize(email) = trim(lowercase(email))`. This MUST be applied
//! identically on every provisioning and lookup path, or identities become
//! unreachable: `" User@Example.com "` and `"user@example.com"` must hash
//! identically.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Normalizes an email address for hashing and lookup: trims surrounding
/// whitespace and lowercases. Does not perform Unicode case-folding beyond
/// ASCII - matching the kernel's "minimal" email validation stance.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Computes the HMAC-SHA256 email hash under the given process-wide key.
///
/// Returns 64 lowercase hex characters. `email` is normalized internally,
/// so callers do not need to call [`normalize_email`] first.
pub fn email_hash(key: &[u8], email: &str) -> String {
    let normalized = normalize_email(email);
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(normalized.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Derives a nickname fallback from an email's local part (before `@`),
/// lowercased with non-alphanumeric characters stripped, for use when a
/// provisioned identity doesn't supply one (spec §4.2 `provision`).
pub fn nickname_from_email(email: &str) -> String {
    let normalized = normalize_email(email);
    let local_part = normalized.split('@').next().unwrap_or(&normalized);
    local_part.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Deterministic placeholder avatar URL derived from the email hash, used
/// when `provision` is not given a `picture` (spec §4.2). Avatar *rendering*
/// is explicitly out of scope (spec §1); this only produces a stable URL.
pub fn placeholder_picture_url(email_hash: &str) -> String {
    format!("https://api.example-avatars.test/avatar/{email_hash}")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test-key";

    #[test]
    fn normalization_is_order_independent_of_case_and_whitespace() {
        let h1 = email_hash(KEY, "User@Example.Com ");
        let h2 = email_hash(KEY, " user@example.com");
        assert_eq!(h1, h2);
    }

    #[test]
    fn hash_is_64_lowercase_hex_chars() {
        let h = email_hash(KEY, "user@example.com");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn different_keys_produce_different_hashes() {
        let h1 = email_hash(b"key-one", "user@example.com");
        let h2 = email_hash(b"key-two", "user@example.com");
        assert_ne!(h1, h2);
    }

    #[test]
    fn nickname_strips_punctuation_from_local_part() {
        assert_eq!(nickname_from_email("John.Doe+tag@example.com"), "johndoetag");
        assert_eq!(nickname_from_email("user@example.com"), "user");
    }

    #[test]
    fn placeholder_picture_is_deterministic() {
        let hash = email_hash(KEY, "user@example.com");
        let p1 = placeholder_picture_url(&hash);
        let p2 = placeholder_picture_url(&hash);
        assert_eq!(p1, p2);
        assert!(p1.contains(&hash));
    }
}
