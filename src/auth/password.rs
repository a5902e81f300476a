//! Password hashing.
//!
//! bcrypt only reads the first 72 bytes of its input, so the password is first
//! reduced to a base64 SHA-256 digest (44 bytes). Passwords that differ anywhere
//! in their full length produce different hashes.

use anyhow::{Context, anyhow};
use base64::Engine;
use sha2::{Digest, Sha256};

use super::AuthError;

fn prehash(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(digest)
}

/// Hash a password with a fresh salt on the blocking pool.
///
/// # Errors
/// Returns [`AuthError::Internal`] if bcrypt rejects the cost or the task panics.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    let input = prehash(password);
    tokio::task::spawn_blocking(move || bcrypt::hash(input, cost))
        .await
        .map_err(|err| AuthError::Internal(anyhow!(err)))?
        .context("failed to hash password")
        .map_err(AuthError::Internal)
}

/// Compare a candidate password against a stored hash.
///
/// # Errors
/// Returns [`AuthError::Internal`] if the stored hash is malformed.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let input = prehash(password);
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(input, &hash))
        .await
        .map_err(|err| AuthError::Internal(anyhow!(err)))?
        .context("failed to verify password hash")
        .map_err(AuthError::Internal)
}
