//! Request/response types for account endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use super::{AuthError, credentials::PublicUser};

#[derive(ToSchema, Serialize, Deserialize, Debug, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 5, max = 30, message = "\"name\" must be 5-30 characters"))]
    pub name: String,
    #[validate(
        email(message = "\"email\" must be a valid email"),
        length(max = 255, message = "\"email\" must be at most 255 characters")
    )]
    pub email: String,
    #[validate(length(min = 5, max = 255, message = "\"password\" must be 5-255 characters"))]
    pub password: String,
}

impl SignupRequest {
    /// Strip surrounding whitespace so length rules see the stored value.
    #[must_use]
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            ..self
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Validate)]
pub struct LoginRequest {
    #[validate(
        email(message = "\"email\" must be a valid email"),
        length(max = 255, message = "\"email\" must be at most 255 characters")
    )]
    pub email: String,
    #[validate(length(min = 5, max = 255, message = "\"password\" must be 5-255 characters"))]
    pub password: String,
}

/// Body of resend-verification and forgot-password.
#[derive(ToSchema, Serialize, Deserialize, Debug, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "\"email\" must be a valid email"))]
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6, max = 255, message = "\"password\" must be 6-255 characters"))]
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    #[validate(length(
        min = 6,
        max = 255,
        message = "\"newPassword\" must be 6-255 characters"
    ))]
    pub new_password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 5, max = 30, message = "\"name\" must be 5-30 characters"))]
    pub name: String,
}

impl UpdateProfileRequest {
    #[must_use]
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
        }
    }
}

/// Returned by signup, login and profile update.
#[derive(ToSchema, Serialize, Debug)]
pub struct AuthenticatedUser {
    pub user: PublicUser,
    #[serde(skip)]
    pub token: String,
}

/// Run derive-based validation, reporting the first failing field.
///
/// Fields are visited in name order so the message is stable across runs.
pub(crate) fn validate(input: &impl Validate) -> Result<(), AuthError> {
    input
        .validate()
        .map_err(|errors| AuthError::Validation(first_error(&errors)))
}

pub(crate) fn first_error(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.keys().collect();
    fields.sort();
    fields
        .first()
        .and_then(|field| {
            field_errors.get(*field).and_then(|list| {
                list.first().map(|err| {
                    err.message
                        .as_ref()
                        .map_or_else(|| format!("\"{field}\" is invalid"), ToString::to_string)
                })
            })
        })
        .unwrap_or_else(|| "Invalid request".to_string())
}

/// Normalize an email for lookup/uniqueness checks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
