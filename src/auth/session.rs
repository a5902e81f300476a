//! Stateless session tokens (HS256 JWT).
//!
//! Claims are the only source of identity on protected routes; they are never
//! re-read from the credential store. Revocation happens through expiry only.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{AuthError, credentials::User};

/// Identity claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub sub: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub verified: bool,
    pub iat: u64,
    pub exp: u64,
}

/// Signing and verification keys derived from the configured secret.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionKeys {
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let secret = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Issue a token for `user`, valid for the configured lifetime.
    ///
    /// # Errors
    /// Returns [`AuthError::Internal`] if the clock is before the epoch or signing fails.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|err| AuthError::Internal(err.into()))?
            .as_secs();
        self.issue_at(user, now)
    }

    pub(crate) fn issue_at(&self, user: &User, issued_at: u64) -> Result<String, AuthError> {
        let claims = SessionClaims {
            sub: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            verified: user.verified,
            iat: issued_at,
            exp: issued_at.saturating_add(self.ttl.as_secs()),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| AuthError::Internal(err.into()))
    }

    /// Check signature and expiry, returning the embedded claims.
    ///
    /// # Errors
    /// Returns [`AuthError::Unauthorized`] for tampered, malformed or expired tokens.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                debug!("session token rejected: {err}");
                AuthError::Unauthorized("Not authorized to access this route")
            })
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("keys", &"***")
            .field("ttl", &self.ttl)
            .finish()
    }
}
