//! Accounts, verification tokens and sessions.
//!
//! [`AuthService`] owns the account lifecycle. It talks to storage only through
//! the [`CredentialStore`] and [`TokenStore`] traits and to mail through
//! [`crate::email::EmailSender`], so the HTTP layer and tests can swap any of
//! them.
//!
//! ## Verification Tokens
//!
//! - **Shape:** 32 random bytes, URL-safe base64; only the SHA-256 is stored.
//! - **Scope:** one live token per user and purpose (`email_verification`,
//!   `password_reset`). A verification token cannot reset a password.
//! - **Lifetime:** one hour by default. Consumption is a single atomic
//!   match-and-delete, so two concurrent redemptions cannot both succeed.
//!
//! ## Sessions
//!
//! HS256 JWTs carrying `sub`, `name`, `email`, `isAdmin` and `verified`.
//! Protected routes trust the claims until `exp`.

mod config;
mod credentials;
mod error;
mod password;
mod service;
mod session;
mod tokens;
mod types;

pub use config::{AuthConfig, DEFAULT_BCRYPT_COST};
pub use credentials::{CredentialStore, NewUser, PublicUser, User, UserProfile};
pub use error::AuthError;
pub use password::{hash_password, verify_password};
pub use service::AuthService;
pub use session::{SessionClaims, SessionKeys};
pub use tokens::{TokenPurpose, TokenStore, generate_token, hash_token, spawn_token_sweeper};
pub use types::{
    AuthenticatedUser, EmailRequest, LoginRequest, ResetPasswordRequest, SignupRequest,
    UpdatePasswordRequest, UpdateProfileRequest,
};
pub(crate) use types::first_error;
