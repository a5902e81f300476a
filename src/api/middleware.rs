//! Authorization gates for protected routes.
//!
//! A route carries a [`GateChain`]: an ordered list of [`Gate`]s evaluated over
//! a [`RequestContext`]. The first gate that fails answers `401` and the handler
//! never runs. `Authenticate` must come first; the other gates read the claims
//! it decoded.
//!
//! Claims are trusted as issued. A user promoted to admin or newly verified
//! needs a fresh token before the gates see the change.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use super::response::ApiError;
use crate::auth::{AuthError, AuthService, SessionClaims, SessionKeys};

const NOT_AUTHORIZED: &str = "Not authorized to access this route";
const NOT_VERIFIED: &str = "Not authorized as a verified user";
const NOT_ADMIN: &str = "Not authorized as an admin";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    /// Requires a valid `Authorization: Bearer <token>`.
    Authenticate,
    RequireVerified,
    RequireAdmin,
}

/// What the gates know about the caller.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub bearer: Option<String>,
    pub claims: Option<SessionClaims>,
}

impl RequestContext {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            bearer: bearer_token(headers),
            claims: None,
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token.to_string())
    } else {
        None
    }
}

impl Gate {
    /// # Errors
    /// Returns [`AuthError::Unauthorized`] naming the failed requirement.
    pub fn check(self, context: &mut RequestContext, keys: &SessionKeys) -> Result<(), AuthError> {
        match self {
            Self::Authenticate => {
                let token = context
                    .bearer
                    .as_deref()
                    .ok_or(AuthError::Unauthorized(NOT_AUTHORIZED))?;
                context.claims = Some(keys.verify(token)?);
                Ok(())
            }
            Self::RequireVerified => match &context.claims {
                Some(claims) if claims.verified => Ok(()),
                Some(_) => Err(AuthError::Unauthorized(NOT_VERIFIED)),
                None => Err(AuthError::Unauthorized(NOT_AUTHORIZED)),
            },
            Self::RequireAdmin => match &context.claims {
                Some(claims) if claims.is_admin => Ok(()),
                Some(_) => Err(AuthError::Unauthorized(NOT_ADMIN)),
                None => Err(AuthError::Unauthorized(NOT_AUTHORIZED)),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GateChain {
    gates: Vec<Gate>,
}

impl GateChain {
    #[must_use]
    pub fn new(gates: Vec<Gate>) -> Self {
        Self { gates }
    }

    #[must_use]
    pub fn authenticated() -> Self {
        Self::new(vec![Gate::Authenticate])
    }

    #[must_use]
    pub fn verified() -> Self {
        Self::new(vec![Gate::Authenticate, Gate::RequireVerified])
    }

    #[must_use]
    pub fn admin() -> Self {
        Self::new(vec![
            Gate::Authenticate,
            Gate::RequireVerified,
            Gate::RequireAdmin,
        ])
    }

    #[must_use]
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Run every gate in order, stopping at the first failure.
    ///
    /// # Errors
    /// The error of the first failing gate.
    pub fn run(&self, context: &mut RequestContext, keys: &SessionKeys) -> Result<(), AuthError> {
        for gate in &self.gates {
            if let Err(err) = gate.check(context, keys) {
                debug!(?gate, "gate rejected request");
                return Err(err);
            }
        }
        Ok(())
    }
}

/// `route_layer` middleware: run the chain, then expose the claims to the handler.
pub async fn enforce(
    State(chain): State<GateChain>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = request
        .extensions()
        .get::<Arc<AuthService>>()
        .cloned()
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "auth service missing from request extensions",
            )
        })?;

    let mut context = RequestContext::from_headers(request.headers());
    chain.run(&mut context, auth.sessions())?;

    if let Some(claims) = context.claims {
        request.extensions_mut().insert(claims);
    }
    Ok(next.run(request).await)
}

/// Claims of the caller, available on routes behind a chain with `Authenticate`.
#[derive(Clone, Debug)]
pub struct Authenticated(pub SessionClaims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionClaims>()
            .cloned()
            .map(Self)
            .ok_or_else(|| ApiError::unauthorized(NOT_AUTHORIZED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::User;
    use anyhow::Result;
    use axum::http::HeaderValue;
    use secrecy::SecretString;
    use std::time::Duration;
    use uuid::Uuid;

    fn keys() -> SessionKeys {
        SessionKeys::new(
            &SecretString::from("gate-secret"),
            Duration::from_secs(3600),
        )
    }

    fn token_for(verified: bool, is_admin: bool) -> Result<String> {
        let user = User {
            id: Uuid::new_v4(),
            name: "Alice Smith".to_string(),
            email: "alice@x.com".to_string(),
            password_hash: String::new(),
            is_admin,
            verified,
        };
        Ok(keys().issue(&user)?)
    }

    fn context(token: Option<String>) -> RequestContext {
        RequestContext {
            bearer: token,
            claims: None,
        }
    }

    fn reason(result: Result<(), AuthError>) -> Option<&'static str> {
        match result {
            Err(AuthError::Unauthorized(reason)) => Some(reason),
            _ => None,
        }
    }

    #[test]
    fn bearer_is_parsed_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn missing_token_fails_authenticate() {
        let result = GateChain::admin().run(&mut context(None), &keys());
        assert_eq!(reason(result), Some(NOT_AUTHORIZED));
    }

    #[test]
    fn garbage_token_fails_authenticate() {
        let result =
            GateChain::authenticated().run(&mut context(Some("random_string".into())), &keys());
        assert_eq!(reason(result), Some(NOT_AUTHORIZED));
    }

    #[test]
    fn chain_stops_at_first_failure() -> Result<()> {
        // Neither verified nor admin: the verified gate answers first.
        let mut ctx = context(Some(token_for(false, false)?));
        assert_eq!(reason(GateChain::admin().run(&mut ctx, &keys())), Some(NOT_VERIFIED));
        Ok(())
    }

    #[test]
    fn verified_non_admin_fails_admin_gate() -> Result<()> {
        let mut ctx = context(Some(token_for(true, false)?));
        assert_eq!(reason(GateChain::admin().run(&mut ctx, &keys())), Some(NOT_ADMIN));
        Ok(())
    }

    #[test]
    fn full_chain_passes_and_records_claims() -> Result<()> {
        let mut ctx = context(Some(token_for(true, true)?));
        GateChain::admin().run(&mut ctx, &keys())?;
        assert!(ctx.claims.is_some_and(|claims| claims.is_admin && claims.verified));
        Ok(())
    }

    #[test]
    fn gates_without_claims_reject() {
        let mut ctx = context(None);
        assert_eq!(
            reason(Gate::RequireAdmin.check(&mut ctx, &keys())),
            Some(NOT_AUTHORIZED)
        );
    }
}
