//! # Cryptographic Primitives
//!
//! The kernel's L0 layer: email hashing, Argon2id password hashing, and
//! opaque token generation/hashing. Every other layer depends on this one;
//! it depends on nothing above it.
//!
//! | Module       | Purpose                                              |
//! |--------------|-------------------------------------------------------|
//! | [`email_hash`] | HMAC-SHA256 email hashing and normalization          |
//! | [`password`]   | Argon2id password hashing/verification               |
//! | [`token`]      | Opaque session/secret token generation and hashing   |

pub mod email_hash;
pub mod password;
pub mod token;

pub use email_hash::{email_hash, nickname_from_email, normalize_email, placeholder_picture_url};
pub use password::PasswordHasher;
pub use token::{constant_time_eq, generate_opaque_token, generate_session_token, hash_token};
