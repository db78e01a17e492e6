//! Salted password hashing.
//!
//! Single round of SHA-256 over password + salt, hex-encoded. The salt is
//! stable per user: it only changes when the password itself changes.

use rand::Rng;
use rand::distributions::Alphanumeric;
use sha2::{Digest, Sha256};

/// Length of generated salts.
pub const SALT_LENGTH: usize = 8;

/// Generates a fresh random alphanumeric salt.
pub fn generate_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LENGTH)
        .map(char::from)
        .collect()
}

/// Hashes a password with the given salt.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Returns true if `password` hashes to `hash` under `salt`.
pub fn verify_password(password: &str, salt: &str, hash: &str) -> bool {
    hash_password(password, salt) == hash
}
