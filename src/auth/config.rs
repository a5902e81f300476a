//! Auth configuration injected into the service at startup.

use secrecy::SecretString;
use std::time::Duration;

const DEFAULT_TOKEN_TTL_SECONDS: u64 = 60 * 60;
const DEFAULT_SESSION_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;
const DEFAULT_TOKEN_SWEEP_SECONDS: u64 = 60;
pub const DEFAULT_BCRYPT_COST: u32 = 10;

#[derive(Clone)]
pub struct AuthConfig {
    public_base_url: String,
    frontend_base_url: String,
    session_secret: SecretString,
    session_ttl_seconds: u64,
    token_ttl_seconds: u64,
    token_sweep_seconds: u64,
    bcrypt_cost: u32,
}

impl AuthConfig {
    #[must_use]
    pub fn new(
        public_base_url: String,
        frontend_base_url: String,
        session_secret: SecretString,
    ) -> Self {
        Self {
            public_base_url,
            frontend_base_url,
            session_secret,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            token_sweep_seconds: DEFAULT_TOKEN_SWEEP_SECONDS,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: u64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_token_sweep_seconds(mut self, seconds: u64) -> Self {
        self.token_sweep_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    #[must_use]
    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn session_secret(&self) -> &SecretString {
        &self.session_secret
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds)
    }

    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_seconds)
    }

    #[must_use]
    pub fn token_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.token_sweep_seconds.max(1))
    }

    #[must_use]
    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }

    /// Link embedded in the verification email; it hits the API directly.
    #[must_use]
    pub fn verify_url(&self, user_id: &str, token: &str) -> String {
        let base = self.public_base_url.trim_end_matches('/');
        format!("{base}/api/users/verify/{user_id}/{token}")
    }

    /// Link embedded in the reset email; the frontend renders the new password form.
    #[must_use]
    pub fn reset_url(&self, user_id: &str, token: &str) -> String {
        let base = self.frontend_base_url.trim_end_matches('/');
        format!("{base}/reset-password/{user_id}/{token}")
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("public_base_url", &self.public_base_url)
            .field("frontend_base_url", &self.frontend_base_url)
            .field("session_secret", &"***")
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("token_sweep_seconds", &self.token_sweep_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}
