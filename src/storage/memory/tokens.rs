use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use crate::auth::{TokenPurpose, TokenStore, generate_token, hash_token};
use crate::storage::StoreError;

#[derive(Debug)]
struct Entry {
    token_hash: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn accepts(&self, token: &str) -> bool {
        self.expires_at > Instant::now() && self.token_hash == hash_token(token)
    }
}

/// Token store on the tokio clock, so tests can advance time.
#[derive(Debug)]
pub struct MemoryTokenStore {
    ttl: Duration,
    entries: Mutex<HashMap<(Uuid, TokenPurpose), Entry>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored tokens, expired ones included until purged.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn issue(&self, user_id: Uuid, purpose: TokenPurpose) -> Result<String, StoreError> {
        let token = generate_token()?;
        let entry = Entry {
            token_hash: hash_token(&token),
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.lock().await.insert((user_id, purpose), entry);
        Ok(token)
    }

    async fn consume(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        token: &str,
    ) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().await;
        let key = (user_id, purpose);
        let matches = entries.get(&key).is_some_and(|entry| entry.accepts(token));
        if matches {
            entries.remove(&key);
        }
        Ok(matches)
    }

    async fn is_live(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        token: &str,
    ) -> Result<bool, StoreError> {
        Ok(self
            .entries
            .lock()
            .await
            .get(&(user_id, purpose))
            .is_some_and(|entry| entry.accepts(token)))
    }

    async fn revoke_all(&self, user_id: Uuid) -> Result<(), StoreError> {
        self.entries
            .lock()
            .await
            .retain(|(owner, _), _| *owner != user_id);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}
