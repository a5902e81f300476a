use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use super::db_span;
use crate::auth::{TokenPurpose, TokenStore, generate_token, hash_token};
use crate::storage::StoreError;

#[derive(Clone, Debug)]
pub struct PgTokenStore {
    pool: PgPool,
    ttl_seconds: i64,
}

impl PgTokenStore {
    #[must_use]
    pub fn new(pool: PgPool, ttl: Duration) -> Self {
        Self {
            pool,
            ttl_seconds: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn issue(&self, user_id: Uuid, purpose: TokenPurpose) -> Result<String, StoreError> {
        // Only the hash is stored; the raw token goes into the email link.
        let token = generate_token()?;
        let token_hash = hash_token(&token);

        let query = r"
            INSERT INTO verification_tokens
                (user_id, purpose, token_hash, created_at, expires_at)
            VALUES ($1, $2, $3, NOW(), NOW() + ($4 * INTERVAL '1 second'))
            ON CONFLICT (user_id, purpose) DO UPDATE
            SET token_hash = EXCLUDED.token_hash,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at
        ";
        sqlx::query(query)
            .bind(user_id)
            .bind(purpose.as_str())
            .bind(token_hash)
            .bind(self.ttl_seconds)
            .execute(&self.pool)
            .instrument(db_span("INSERT", query))
            .await?;
        Ok(token)
    }

    async fn consume(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        token: &str,
    ) -> Result<bool, StoreError> {
        let query = r"
            DELETE FROM verification_tokens
            WHERE user_id = $1
              AND purpose = $2
              AND token_hash = $3
              AND expires_at > NOW()
            RETURNING user_id
        ";
        let row = sqlx::query(query)
            .bind(user_id)
            .bind(purpose.as_str())
            .bind(hash_token(token))
            .fetch_optional(&self.pool)
            .instrument(db_span("DELETE", query))
            .await?;
        Ok(row.is_some())
    }

    async fn is_live(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        token: &str,
    ) -> Result<bool, StoreError> {
        let query = r"
            SELECT EXISTS (
                SELECT 1 FROM verification_tokens
                WHERE user_id = $1
                  AND purpose = $2
                  AND token_hash = $3
                  AND expires_at > NOW()
            )
        ";
        let live: bool = sqlx::query_scalar(query)
            .bind(user_id)
            .bind(purpose.as_str())
            .bind(hash_token(token))
            .fetch_one(&self.pool)
            .instrument(db_span("SELECT", query))
            .await?;
        Ok(live)
    }

    async fn revoke_all(&self, user_id: Uuid) -> Result<(), StoreError> {
        let query = "DELETE FROM verification_tokens WHERE user_id = $1";
        sqlx::query(query)
            .bind(user_id)
            .execute(&self.pool)
            .instrument(db_span("DELETE", query))
            .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let query = "DELETE FROM verification_tokens WHERE expires_at <= NOW()";
        let result = sqlx::query(query)
            .execute(&self.pool)
            .instrument(db_span("DELETE", query))
            .await?;
        Ok(result.rows_affected())
    }
}
