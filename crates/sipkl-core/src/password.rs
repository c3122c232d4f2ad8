//! Password digests and session tokens.
//!
//! Passwords are stored as a deterministic SHA-256 digest so that a login can
//! be checked by re-hashing the submitted value and comparing it with the
//! stored column. Session tokens are random UUIDs with nothing encoded in them.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Password given to accounts created by setup scripts and admin resets.
pub const DEFAULT_PASSWORD: &str = "123456";

/// Hash a password into a lower-case hex digest.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    hex::encode(digest)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    hash_password(password) == hash
}

/// True when `hash` is the digest of [`DEFAULT_PASSWORD`].
pub fn is_default_password(hash: &str) -> bool {
    verify_password(DEFAULT_PASSWORD, hash)
}

/// Generate a fresh opaque session token.
pub fn generate_token() -> String {
    Uuid::new_v4().to_string()
}
