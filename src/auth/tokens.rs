//! Single-use verification tokens.
//!
//! The raw token only travels inside the emailed link; stores keep its SHA-256.
//! Tokens are keyed by (user, purpose): issuing replaces the previous token for
//! that pair, so an older link stops working as soon as a new one is sent.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error};
use uuid::Uuid;

use crate::storage::StoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenPurpose {
    EmailVerification,
    PasswordReset,
}

impl TokenPurpose {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmailVerification => "email_verification",
            Self::PasswordReset => "password_reset",
        }
    }
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Create a fresh token for (user, purpose), replacing any existing one.
    async fn issue(&self, user_id: Uuid, purpose: TokenPurpose) -> Result<String, StoreError>;

    /// Atomically match and delete a live token. `false` covers a wrong token,
    /// an expired token, and a token that was already consumed.
    async fn consume(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        token: &str,
    ) -> Result<bool, StoreError>;

    /// Like [`TokenStore::consume`] without deleting.
    async fn is_live(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        token: &str,
    ) -> Result<bool, StoreError>;

    async fn revoke_all(&self, user_id: Uuid) -> Result<(), StoreError>;

    /// Drop every expired token, returning how many were removed.
    async fn purge_expired(&self) -> Result<u64, StoreError>;
}

/// 32 random bytes, URL-safe base64 without padding.
///
/// # Errors
/// Returns an error if the OS random source fails.
pub fn generate_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate verification token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

#[must_use]
pub fn hash_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Spawn a background task that periodically drops expired tokens.
pub fn spawn_token_sweeper(
    tokens: Arc<dyn TokenStore>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            sleep(interval).await;

            match tokens.purge_expired().await {
                Ok(0) => {}
                Ok(count) => debug!(count, "purged expired verification tokens"),
                Err(err) => error!("verification token sweep failed: {err}"),
            }
        }
    })
}
