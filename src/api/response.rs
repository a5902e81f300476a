//! Uniform JSON envelope for every `/api` response.
//!
//! `{ "status": bool, "message": string, "data"?: any, "token"?: string }`.
//! When a token is present it is also sent in the `x-auth-token` header.

use axum::{
    Json,
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::{auth::AuthError, blog::BlogError, catalog::CatalogError, storage::StoreError};

pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Successful response: status code plus envelope.
#[derive(Debug)]
pub struct ApiResponse<T> {
    code: StatusCode,
    body: Envelope<T>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn ok(message: &str) -> Self {
        Self::with_status(StatusCode::OK, message)
    }

    #[must_use]
    pub fn created(message: &str) -> Self {
        Self::with_status(StatusCode::CREATED, message)
    }

    fn with_status(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            body: Envelope {
                status: true,
                message: message.to_string(),
                data: None,
                token: None,
            },
        }
    }

    #[must_use]
    pub fn data(mut self, data: T) -> Self {
        self.body.data = Some(data);
        self
    }

    #[must_use]
    pub fn token(mut self, token: String) -> Self {
        self.body.token = Some(token);
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let header = self
            .body
            .token
            .as_deref()
            .and_then(|token| HeaderValue::from_str(token).ok());
        let mut response = (self.code, Json(self.body)).into_response();
        if let Some(value) = header {
            response
                .headers_mut()
                .insert(HeaderName::from_static(AUTH_TOKEN_HEADER), value);
        }
        response
    }
}

/// Failed response. Infrastructure failures are logged and reported as 500
/// with the underlying message.
#[derive(Debug)]
pub struct ApiError {
    code: StatusCode,
    message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    fn internal(cause: &dyn std::fmt::Display) -> Self {
        let message = format!("{cause:#}");
        error!("request failed: {message}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    #[must_use]
    pub fn code(&self) -> StatusCode {
        self.code
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope::<()> {
            status: false,
            message: self.message,
            data: None,
            token: None,
        };
        (self.code, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(_)
            | AuthError::Conflict
            | AuthError::InvalidCredentials
            | AuthError::AlreadyVerified
            | AuthError::InvalidToken => Self::bad_request(err.to_string()),
            // Same answer as a wrong password.
            AuthError::NotVerified => Self::bad_request(AuthError::InvalidCredentials.to_string()),
            AuthError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            AuthError::Unauthorized(reason) => Self::unauthorized(reason),
            AuthError::Delivery(_) | AuthError::Store(_) | AuthError::Internal(_) => {
                Self::internal(&err)
            }
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(_) | CatalogError::Conflict(_) => {
                Self::bad_request(err.to_string())
            }
            CatalogError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            CatalogError::Upload(_) | CatalogError::Store(_) => Self::internal(&err),
        }
    }
}

impl From<BlogError> for ApiError {
    fn from(err: BlogError) -> Self {
        match err {
            BlogError::Validation(_) => Self::bad_request(err.to_string()),
            BlogError::NotFound => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            BlogError::Upload(_) | BlogError::Delivery(_) | BlogError::Store(_) => {
                Self::internal(&err)
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::internal(&err)
    }
}
