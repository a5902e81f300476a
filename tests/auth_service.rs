mod common;

use anyhow::Result;
use common::{PASSWORD, TOKEN_TTL, TestApp};
use mealhub::auth::{AuthError, LoginRequest, SignupRequest};
use std::time::Duration;
use uuid::Uuid;

fn signup(name: &str, email: &str, password: &str) -> SignupRequest {
    SignupRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn concurrent_duplicate_signup_yields_one_conflict() -> Result<()> {
    let app = TestApp::new();

    let (first, second) = tokio::join!(
        app.auth.signup(signup("Alice Smith", "alice@x.com", PASSWORD)),
        app.auth.signup(signup("Alice Clone", "ALICE@x.com", PASSWORD)),
    );

    let results = [first, second];
    let created = results.iter().filter(|result| result.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|result| matches!(result, Err(AuthError::Conflict)))
        .count();
    assert_eq!(created, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(app.users.len().await, 1);
    Ok(())
}

#[tokio::test]
async fn login_before_verification_is_not_verified() -> Result<()> {
    let app = TestApp::new();
    app.auth
        .signup(signup("Alice Smith", "alice@x.com", PASSWORD))
        .await?;

    let result = app.auth.login(login("alice@x.com", PASSWORD)).await;
    assert!(matches!(result, Err(AuthError::NotVerified)));

    let result = app.auth.login(login("alice@x.com", "wrong-one")).await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn verification_token_expires_after_ttl() -> Result<()> {
    let app = TestApp::new();
    app.auth
        .signup(signup("Alice Smith", "alice@x.com", PASSWORD))
        .await?;
    let (id, token) = app.verification_link("alice@x.com").await?;
    let id = Uuid::parse_str(&id)?;

    tokio::time::advance(TOKEN_TTL + Duration::from_secs(1)).await;

    let result = app.auth.verify_email(id, &token).await;
    assert!(matches!(result, Err(AuthError::InvalidToken)));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn verification_token_is_live_just_before_ttl() -> Result<()> {
    let app = TestApp::new();
    app.auth
        .signup(signup("Alice Smith", "alice@x.com", PASSWORD))
        .await?;
    let (id, token) = app.verification_link("alice@x.com").await?;

    tokio::time::advance(TOKEN_TTL - Duration::from_secs(1)).await;

    app.auth.verify_email(Uuid::parse_str(&id)?, &token).await?;
    app.auth.login(login("alice@x.com", PASSWORD)).await?;
    Ok(())
}

#[tokio::test]
async fn passwords_beyond_72_bytes_are_fully_significant() -> Result<()> {
    let app = TestApp::new();
    let long = format!("{}{}", "p".repeat(72), "-tail-one");
    let same_prefix = format!("{}{}", "p".repeat(72), "-tail-two");

    app.auth
        .signup(signup("Long Password", "long@x.com", &long))
        .await?;
    let (id, token) = app.verification_link("long@x.com").await?;
    app.auth.verify_email(Uuid::parse_str(&id)?, &token).await?;

    assert!(app.auth.login(login("long@x.com", &long)).await.is_ok());
    assert!(matches!(
        app.auth.login(login("long@x.com", &same_prefix)).await,
        Err(AuthError::InvalidCredentials)
    ));
    Ok(())
}

#[tokio::test]
async fn session_claims_reflect_account_flags() -> Result<()> {
    let app = TestApp::new();
    let token = app.verified_user("Alice Smith", "alice@x.com").await?;

    let claims = app.auth.sessions().verify(&token)?;
    assert!(claims.verified);
    assert!(!claims.is_admin);
    assert_eq!(claims.sub, app.user_id("alice@x.com").await?);
    Ok(())
}

#[tokio::test]
async fn deleting_account_revokes_outstanding_tokens() -> Result<()> {
    let app = TestApp::new();
    let token = app.verified_user("Alice Smith", "alice@x.com").await?;
    app.auth
        .forgot_password(mealhub::auth::EmailRequest {
            email: "alice@x.com".to_string(),
        })
        .await?;
    assert_eq!(app.tokens.len().await, 1);

    let claims = app.auth.sessions().verify(&token)?;
    app.auth.delete_account(&claims).await?;
    assert!(app.tokens.is_empty().await);
    assert!(matches!(
        app.auth.delete_account(&claims).await,
        Err(AuthError::NotFound(_))
    ));
    Ok(())
}
