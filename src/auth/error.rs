use thiserror::Error;

use crate::storage::StoreError;

/// Failures surfaced by [`super::AuthService`] operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("User already registered.")]
    Conflict,
    #[error("{0} not found.")]
    NotFound(&'static str),
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("User account is not verified.")]
    NotVerified,
    #[error("User already verified.")]
    AlreadyVerified,
    #[error("Invalid or expired token.")]
    InvalidToken,
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("email delivery failed: {0:#}")]
    Delivery(#[source] anyhow::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("internal error: {0:#}")]
    Internal(#[source] anyhow::Error),
}

impl AuthError {
    pub(crate) fn user_not_found() -> Self {
        Self::NotFound("User")
    }

    /// Map a store error, turning a uniqueness violation into [`AuthError::Conflict`].
    pub(crate) fn from_insert(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => Self::Conflict,
            other => Self::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_resource() {
        assert_eq!(AuthError::user_not_found().to_string(), "User not found.");
    }

    #[test]
    fn insert_conflict_becomes_auth_conflict() {
        assert!(matches!(
            AuthError::from_insert(StoreError::Conflict),
            AuthError::Conflict
        ));
    }
}
