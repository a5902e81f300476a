//! Account endpoints under `/api/users`.
//!
//! Handlers only unpack the request and pick the success message; the flow
//! itself lives in [`AuthService`].

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{
    middleware::Authenticated,
    response::{ApiError, ApiResponse},
};
use crate::auth::{
    AuthError, AuthService, AuthenticatedUser, EmailRequest, LoginRequest, ResetPasswordRequest,
    SignupRequest, UpdatePasswordRequest, UpdateProfileRequest, UserProfile,
};

/// JSON body as extracted, rejection included.
pub(crate) type Payload<T> = Result<Json<T>, JsonRejection>;

/// Unwrap a JSON body. A request without a JSON body is "Missing payload";
/// malformed or mistyped JSON reports the extractor's own text.
pub(crate) fn require_payload<T>(payload: Payload<T>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(payload)) => Ok(payload),
        Err(JsonRejection::MissingJsonContentType(_)) => {
            Err(ApiError::bad_request("Missing payload"))
        }
        Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
    }
}

/// Unknown and malformed ids are both "User not found."
fn user_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::from(AuthError::user_not_found()))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created; verification email sent", body = AuthenticatedUser),
        (status = 400, description = "Invalid input or email already registered"),
        (status = 500, description = "Verification email could not be sent")
    ),
    tag = "users"
)]
pub async fn signup(
    auth: Extension<Arc<AuthService>>,
    payload: Payload<SignupRequest>,
) -> Result<ApiResponse<AuthenticatedUser>, ApiError> {
    let request = require_payload(payload)?;
    let session = auth.signup(request).await?;
    let token = session.token.clone();
    Ok(ApiResponse::created("User created successfully.")
        .data(session)
        .token(token))
}

#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; token in body and x-auth-token", body = AuthenticatedUser),
        (status = 400, description = "Invalid email or password")
    ),
    tag = "users"
)]
pub async fn login(
    auth: Extension<Arc<AuthService>>,
    payload: Payload<LoginRequest>,
) -> Result<ApiResponse<AuthenticatedUser>, ApiError> {
    let request = require_payload(payload)?;
    let session = auth.login(request).await?;
    let token = session.token.clone();
    Ok(ApiResponse::ok("User logged in successfully.")
        .data(session)
        .token(token))
}

#[utoipa::path(
    get,
    path = "/api/users/verify/{id}/{token}",
    params(
        ("id" = String, Path, description = "User id"),
        ("token" = String, Path, description = "Verification token from the email")
    ),
    responses(
        (status = 200, description = "Email verified"),
        (status = 400, description = "Already verified, or invalid/expired token"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn verify_email(
    auth: Extension<Arc<AuthService>>,
    Path((id, token)): Path<(String, String)>,
) -> Result<ApiResponse<()>, ApiError> {
    auth.verify_email(user_id(&id)?, &token).await?;
    Ok(ApiResponse::ok("User verified successfully."))
}

#[utoipa::path(
    post,
    path = "/api/users/resend-verification-email",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Verification email sent"),
        (status = 400, description = "Invalid email or already verified"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn resend_verification(
    auth: Extension<Arc<AuthService>>,
    payload: Payload<EmailRequest>,
) -> Result<ApiResponse<()>, ApiError> {
    auth.resend_verification(require_payload(payload)?).await?;
    Ok(ApiResponse::ok("Verification email sent successfully."))
}

#[utoipa::path(
    post,
    path = "/api/users/forgot-password",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Reset link sent"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn forgot_password(
    auth: Extension<Arc<AuthService>>,
    payload: Payload<EmailRequest>,
) -> Result<ApiResponse<()>, ApiError> {
    auth.forgot_password(require_payload(payload)?).await?;
    Ok(ApiResponse::ok("Password reset link sent to your email."))
}

#[utoipa::path(
    get,
    path = "/api/users/reset-password/{id}/{token}",
    params(
        ("id" = String, Path, description = "User id"),
        ("token" = String, Path, description = "Reset token from the email")
    ),
    responses(
        (status = 200, description = "Reset link is valid"),
        (status = 400, description = "Invalid or expired token"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn check_reset_link(
    auth: Extension<Arc<AuthService>>,
    Path((id, token)): Path<(String, String)>,
) -> Result<ApiResponse<()>, ApiError> {
    auth.check_reset_token(user_id(&id)?, &token).await?;
    Ok(ApiResponse::ok("Password reset link is valid."))
}

#[utoipa::path(
    post,
    path = "/api/users/reset-password/{id}/{token}",
    request_body = ResetPasswordRequest,
    params(
        ("id" = String, Path, description = "User id"),
        ("token" = String, Path, description = "Reset token from the email")
    ),
    responses(
        (status = 200, description = "Password reset"),
        (status = 400, description = "Invalid password, or invalid/expired token"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn reset_password(
    auth: Extension<Arc<AuthService>>,
    Path((id, token)): Path<(String, String)>,
    payload: Payload<ResetPasswordRequest>,
) -> Result<ApiResponse<()>, ApiError> {
    let request = require_payload(payload)?;
    auth.reset_password(user_id(&id)?, &token, request).await?;
    Ok(ApiResponse::ok("Password reset successfully."))
}

#[utoipa::path(
    put,
    path = "/api/users/update-password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Invalid input or wrong current password"),
        (status = 401, description = "Missing/invalid token or unverified account")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn update_password(
    auth: Extension<Arc<AuthService>>,
    Authenticated(claims): Authenticated,
    payload: Payload<UpdatePasswordRequest>,
) -> Result<ApiResponse<()>, ApiError> {
    auth.update_password(&claims, require_payload(payload)?)
        .await?;
    Ok(ApiResponse::ok("Password updated successfully."))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current profile", body = UserProfile),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Account no longer exists")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn me(
    auth: Extension<Arc<AuthService>>,
    Authenticated(claims): Authenticated,
) -> Result<ApiResponse<UserProfile>, ApiError> {
    let profile = auth.profile(&claims).await?;
    Ok(ApiResponse::ok("User profile fetched successfully.").data(profile))
}

#[utoipa::path(
    put,
    path = "/api/users/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated; fresh token issued", body = AuthenticatedUser),
        (status = 400, description = "Invalid name"),
        (status = 401, description = "Missing/invalid token or unverified account")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn update_profile(
    auth: Extension<Arc<AuthService>>,
    Authenticated(claims): Authenticated,
    payload: Payload<UpdateProfileRequest>,
) -> Result<ApiResponse<AuthenticatedUser>, ApiError> {
    let session = auth
        .update_profile(&claims, require_payload(payload)?)
        .await?;
    let token = session.token.clone();
    Ok(ApiResponse::ok("Profile updated successfully.")
        .data(session)
        .token(token))
}

#[utoipa::path(
    delete,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Account deleted"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Account no longer exists")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn delete_account(
    auth: Extension<Arc<AuthService>>,
    Authenticated(claims): Authenticated,
) -> Result<ApiResponse<()>, ApiError> {
    auth.delete_account(&claims).await?;
    Ok(ApiResponse::ok("User deleted successfully."))
}
