//! # Password Hashing with Argon2id
//!
//! Secure password storage using the Argon2id algorithm, the variant that
//! combines Argon2i's side-channel resistance with Argon2d's GPU-attack
//! resistance - the combination recommended by OWASP for password storage.
//!
//! ## PHC String Format
//!
//! Hashes are stored in the self-describing [PHC string
//! format](https://github.com/P-H-C/phc-string-format):
//!
//! ```text
//! $argon2id$v=19$m=65536,t=3,p=4$<salt>$<hash>
//!   │         │    │      │   │   │       └── hash output (base64, no padding)
//!   │         │    │      │   │   └────────── salt (base64, no padding)
//!   │         │    │      │   └────────────── parallelism (lanes)
//!   │         │    │      └────────────────── time cost (iterations)
//!   │         │    └───────────────────────── memory cost (KiB)
//!   │         └────────────────────────────── version (0x13 = 19)
//!   └──────────────────────────────────────── algorithm identifier
//! ```
//!
//! Because the parameters travel with the hash, `verify` always re-hashes
//! using whatever parameters the stored hash was created with, even after
//! `PasswordHasher::new` is reconfigured with stronger defaults.

use crate::config::Argon2Config;
use crate::errors::KernelError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Secure password hashing service using Argon2id.
///
/// ## Thread Safety
///
/// `Clone`, `Send + Sync`. Each hash operation generates a fresh random
/// salt from the OS CSPRNG; verification runs in constant time.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Builds a hasher from the given parameters.
    ///
    /// # Panics
    ///
    /// Panics if `params` describes an invalid Argon2 configuration (e.g.
    /// parallelism of 0). Configuration is validated at startup, so this
    /// should never trigger from a config file that passed `from_env`.
    pub fn new(params: &Argon2Config) -> Self {
        let argon2_params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            Some(params.key_len),
        )
        .expect("invalid argon2 parameters");

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);
        Self { argon2 }
    }

    /// Hashes a password for storage, returning a PHC-formatted string.
    pub fn hash(&self, password: &str) -> Result<String, KernelError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| KernelError::invalid_input(format!("password hashing failed: {e}")))
    }

    /// Verifies a password against a stored PHC-formatted hash.
    ///
    /// Returns `Ok(false)` (not an error) when the password simply doesn't
    /// match; only a malformed hash string produces `Err`.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, KernelError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| KernelError::invalid_input(format!("invalid password hash format: {e}")))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(KernelError::invalid_input(format!("password verification failed: {e}"))),
        }
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

// =============================================================================
// Password strength validation
// =============================================================================

/// Minimum password length per spec §4.2 (`add_password`/`set_password`).
pub const MIN_PASSWORD_LEN: usize = 8;

/// Validates minimum password strength before hashing.
///
/// The kernel only enforces a length floor (spec §4.2: "enforce minimum
/// password length 8") - it does not impose character-class rules. Stronger
/// policy is a tenant/transport-plane concern, not the kernel's.
pub fn validate_password_strength(password: &str) -> Result<(), KernelError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(KernelError::invalid_input(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(&Argon2Config::default())
    }

    #[test]
    fn hash_and_verify_correct_password() {
        let hasher = hasher();
        let password = "correct horse battery staple";

        let hash = hasher.hash(password).unwrap();
        assert_ne!(hash, password);
        assert!(hasher.verify(password, &hash).unwrap());
    }

    #[test]
    fn verify_wrong_password_fails_without_error() {
        let hasher = hasher();
        let hash = hasher.hash("right-password").unwrap();
        assert!(!hasher.verify("wrong-password", &hash).unwrap());
    }

    #[test]
    fn each_hash_uses_a_fresh_salt() {
        let hasher = hasher();
        let password = "same-password-twice";
        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify(password, &hash1).unwrap());
        assert!(hasher.verify(password, &hash2).unwrap());
    }

    #[test]
    fn hash_is_phc_format_and_encodes_parameters() {
        let mut params = Argon2Config::default();
        params.memory_kib = 32 * 1024;
        params.iterations = 2;
        params.parallelism = 2;
        let hash = PasswordHasher::new(&params).hash("anything").unwrap();

        assert!(hash.starts_with("$argon2id$v=19$"));
        assert!(hash.contains("m=32768,t=2,p=2"));
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        let hasher = hasher();
        assert!(hasher.verify("password", "not-a-valid-hash").is_err());
    }

    #[test]
    fn strength_validator_rejects_short_passwords() {
        assert!(validate_password_strength("short1").is_err());
        assert!(validate_password_strength("longenough").is_ok());
    }
}
