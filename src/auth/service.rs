//! Account lifecycle: signup, verification, login, and password recovery.
//!
//! Flow Overview:
//! 1) Signup stores an unverified user and emails an `email_verification` token.
//! 2) Verify consumes that token and flips `verified`; login is refused until then.
//! 3) Forgot-password emails a `password_reset` token; reset consumes it.
//!
//! Mail sent as part of a request the user is waiting on (signup, resend,
//! forgot) is awaited and its failure is returned as [`AuthError::Delivery`]; the
//! records written before the failure stay, so the user can retry through
//! resend. Confirmation mail after a completed change is best-effort.

use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    AuthConfig, AuthError,
    credentials::{CredentialStore, NewUser, PublicUser, User, UserProfile},
    password::{hash_password, verify_password},
    session::{SessionClaims, SessionKeys},
    tokens::{TokenPurpose, TokenStore},
    types::{
        AuthenticatedUser, EmailRequest, LoginRequest, ResetPasswordRequest, SignupRequest,
        UpdatePasswordRequest, UpdateProfileRequest, normalize_email, validate,
    },
};
use crate::email::{EmailMessage, EmailSender, templates};

const DECOY_PASSWORD: &str = "mealhub-unknown-account";

pub struct AuthService {
    config: AuthConfig,
    sessions: SessionKeys,
    credentials: Arc<dyn CredentialStore>,
    tokens: Arc<dyn TokenStore>,
    mailer: Arc<dyn EmailSender>,
    /// Hash checked against when the email is unknown, so both login
    /// failures cost one bcrypt verification.
    decoy_hash: OnceCell<String>,
}

impl AuthService {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        credentials: Arc<dyn CredentialStore>,
        tokens: Arc<dyn TokenStore>,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        let sessions = SessionKeys::new(config.session_secret(), config.session_ttl());
        Self {
            config,
            sessions,
            credentials,
            tokens,
            mailer,
            decoy_hash: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionKeys {
        &self.sessions
    }

    #[must_use]
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Register an unverified account and email its verification link.
    ///
    /// # Errors
    /// `Validation`, `Conflict` for a taken email, `Delivery` if the email fails.
    #[instrument(skip_all)]
    pub async fn signup(&self, request: SignupRequest) -> Result<AuthenticatedUser, AuthError> {
        let request = request.trimmed();
        validate(&request)?;

        let password_hash = hash_password(&request.password, self.config.bcrypt_cost()).await?;
        let user = self
            .credentials
            .insert(NewUser {
                name: request.name,
                email: normalize_email(&request.email),
                password_hash,
            })
            .await
            .map_err(AuthError::from_insert)?;

        info!(user_id = %user.id, "user registered");

        self.send_verification(&user).await?;

        let token = self.sessions.issue(&user)?;
        Ok(AuthenticatedUser {
            user: PublicUser::from(&user),
            token,
        })
    }

    /// Exchange email + password for a session token.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`;
    /// an unverified account with the right password yields `NotVerified`.
    ///
    /// # Errors
    /// `Validation`, `InvalidCredentials`, `NotVerified`.
    #[instrument(skip_all)]
    pub async fn login(&self, request: LoginRequest) -> Result<AuthenticatedUser, AuthError> {
        validate(&request)?;

        let email = normalize_email(&request.email);
        let Some(user) = self.credentials.find_by_email(&email).await? else {
            let decoy = self.decoy_hash().await?;
            verify_password(&request.password, decoy).await?;
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(&request.password, &user.password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.verified {
            return Err(AuthError::NotVerified);
        }

        let token = self.sessions.issue(&user)?;
        Ok(AuthenticatedUser {
            user: PublicUser::from(&user),
            token,
        })
    }

    /// Redeem an email-verification token.
    ///
    /// # Errors
    /// `NotFound`, `AlreadyVerified`, `InvalidToken`.
    #[instrument(skip(self, token))]
    pub async fn verify_email(&self, user_id: Uuid, token: &str) -> Result<(), AuthError> {
        let user = self.require_user(user_id).await?;
        if user.verified {
            return Err(AuthError::AlreadyVerified);
        }

        if !self
            .tokens
            .consume(user.id, TokenPurpose::EmailVerification, token)
            .await?
        {
            return Err(AuthError::InvalidToken);
        }

        if !self.credentials.mark_verified(user.id).await? {
            return Err(AuthError::user_not_found());
        }

        info!(user_id = %user.id, "email verified");

        let (subject, html) = templates::email_verified(&user.name);
        self.notify(&user, subject, html).await;
        Ok(())
    }

    /// Replace the verification token and email it again.
    ///
    /// # Errors
    /// `Validation`, `NotFound`, `AlreadyVerified`, `Delivery`.
    #[instrument(skip_all)]
    pub async fn resend_verification(&self, request: EmailRequest) -> Result<(), AuthError> {
        validate(&request)?;
        let user = self.require_user_by_email(&request.email).await?;
        if user.verified {
            return Err(AuthError::AlreadyVerified);
        }
        self.send_verification(&user).await
    }

    /// Issue a password-reset token and email the reset link.
    ///
    /// # Errors
    /// `Validation`, `NotFound`, `Delivery`.
    #[instrument(skip_all)]
    pub async fn forgot_password(&self, request: EmailRequest) -> Result<(), AuthError> {
        validate(&request)?;
        let user = self.require_user_by_email(&request.email).await?;

        let token = self
            .tokens
            .issue(user.id, TokenPurpose::PasswordReset)
            .await?;
        let link = self.config.reset_url(&user.id.to_string(), &token);
        let (subject, html) = templates::password_reset(&user.name, &link);
        self.deliver(&user, subject, html).await
    }

    /// Check a reset link without consuming it.
    ///
    /// # Errors
    /// `NotFound`, `InvalidToken`.
    #[instrument(skip(self, token))]
    pub async fn check_reset_token(&self, user_id: Uuid, token: &str) -> Result<(), AuthError> {
        let user = self.require_user(user_id).await?;
        if self
            .tokens
            .is_live(user.id, TokenPurpose::PasswordReset, token)
            .await?
        {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }

    /// Set a new password using a reset token.
    ///
    /// # Errors
    /// `Validation`, `NotFound`, `InvalidToken`.
    #[instrument(skip(self, token, request))]
    pub async fn reset_password(
        &self,
        user_id: Uuid,
        token: &str,
        request: ResetPasswordRequest,
    ) -> Result<(), AuthError> {
        validate(&request)?;
        let user = self.require_user(user_id).await?;

        if !self
            .tokens
            .consume(user.id, TokenPurpose::PasswordReset, token)
            .await?
        {
            return Err(AuthError::InvalidToken);
        }

        let password_hash = hash_password(&request.password, self.config.bcrypt_cost()).await?;
        if !self
            .credentials
            .update_password(user.id, &password_hash)
            .await?
        {
            return Err(AuthError::user_not_found());
        }

        info!(user_id = %user.id, "password reset");

        let (subject, html) = templates::password_changed(&user.name);
        self.notify(&user, subject, html).await;
        Ok(())
    }

    /// Change the password of the signed-in user after checking the current one.
    ///
    /// # Errors
    /// `Validation`, `NotFound`, `InvalidCredentials`.
    #[instrument(skip_all, fields(user_id = %claims.sub))]
    pub async fn update_password(
        &self,
        claims: &SessionClaims,
        request: UpdatePasswordRequest,
    ) -> Result<(), AuthError> {
        validate(&request)?;
        let user = self.require_user(claims.sub).await?;

        if !verify_password(&request.current_password, &user.password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let password_hash =
            hash_password(&request.new_password, self.config.bcrypt_cost()).await?;
        if !self
            .credentials
            .update_password(user.id, &password_hash)
            .await?
        {
            return Err(AuthError::user_not_found());
        }

        let (subject, html) = templates::password_changed(&user.name);
        self.notify(&user, subject, html).await;
        Ok(())
    }

    /// Current profile, read from the store rather than the claims.
    ///
    /// # Errors
    /// `NotFound` if the account was deleted after the token was issued.
    pub async fn profile(&self, claims: &SessionClaims) -> Result<UserProfile, AuthError> {
        let user = self.require_user(claims.sub).await?;
        Ok(UserProfile::from(&user))
    }

    /// Rename the signed-in user and hand back a token with the new claims.
    ///
    /// # Errors
    /// `Validation`, `NotFound`.
    #[instrument(skip_all, fields(user_id = %claims.sub))]
    pub async fn update_profile(
        &self,
        claims: &SessionClaims,
        request: UpdateProfileRequest,
    ) -> Result<AuthenticatedUser, AuthError> {
        let request = request.trimmed();
        validate(&request)?;
        let user = self
            .credentials
            .update_name(claims.sub, &request.name)
            .await?
            .ok_or_else(AuthError::user_not_found)?;

        let token = self.sessions.issue(&user)?;
        Ok(AuthenticatedUser {
            user: PublicUser::from(&user),
            token,
        })
    }

    /// Delete the signed-in user and any outstanding tokens.
    ///
    /// # Errors
    /// `NotFound` if the account no longer exists.
    #[instrument(skip_all, fields(user_id = %claims.sub))]
    pub async fn delete_account(&self, claims: &SessionClaims) -> Result<(), AuthError> {
        self.tokens.revoke_all(claims.sub).await?;
        if self.credentials.delete(claims.sub).await? {
            info!("account deleted");
            Ok(())
        } else {
            Err(AuthError::user_not_found())
        }
    }

    async fn decoy_hash(&self) -> Result<&str, AuthError> {
        self.decoy_hash
            .get_or_try_init(|| hash_password(DECOY_PASSWORD, self.config.bcrypt_cost()))
            .await
            .map(String::as_str)
    }

    async fn require_user(&self, user_id: Uuid) -> Result<User, AuthError> {
        self.credentials
            .find_by_id(user_id)
            .await?
            .ok_or_else(AuthError::user_not_found)
    }

    async fn require_user_by_email(&self, email: &str) -> Result<User, AuthError> {
        self.credentials
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(AuthError::user_not_found)
    }

    async fn send_verification(&self, user: &User) -> Result<(), AuthError> {
        let token = self
            .tokens
            .issue(user.id, TokenPurpose::EmailVerification)
            .await?;
        let link = self.config.verify_url(&user.id.to_string(), &token);
        let (subject, html) = templates::verify_email(&user.name, &link);
        self.deliver(user, subject, html).await
    }

    async fn deliver(&self, user: &User, subject: String, html: String) -> Result<(), AuthError> {
        let message = EmailMessage {
            to: user.email.clone(),
            subject,
            html_body: html,
        };
        self.mailer
            .send(&message)
            .await
            .map_err(AuthError::Delivery)
    }

    async fn notify(&self, user: &User, subject: String, html: String) {
        if let Err(err) = self.deliver(user, subject, html).await {
            warn!(user_id = %user.id, "confirmation email not sent: {err}");
        }
    }
}
