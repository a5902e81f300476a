mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use common::{FRONTEND_BASE_URL, PASSWORD, PUBLIC_BASE_URL, TestApp, session_token};
use mealhub::api::AUTH_TOKEN_HEADER;
use serde_json::json;

const ALICE: &str = "alice@x.com";

#[tokio::test]
async fn alice_signup_creates_unverified_user_and_sends_one_email() -> Result<()> {
    let app = TestApp::new();

    let response = app.signup("Alice Smith", ALICE).await?;
    assert_eq!(response.status, StatusCode::CREATED);
    assert!(response.ok());
    assert_eq!(response.message(), "User created successfully.");
    assert_eq!(response.body["data"]["user"]["email"], ALICE);
    assert!(response.body["data"]["user"].get("password").is_none());
    assert!(response.headers.contains_key(AUTH_TOKEN_HEADER));

    let sent = app.outbox.messages_to(ALICE).await;
    assert_eq!(sent.len(), 1);
    let (id, token) = app.verification_link(ALICE).await?;
    assert_eq!(id, response.body["data"]["user"]["id"].as_str().unwrap_or_default());
    assert!(!token.is_empty());
    assert!(sent[0]
        .html_body
        .contains(&format!("{PUBLIC_BASE_URL}/api/users/verify/{id}/{token}")));

    let me = app
        .get("/api/users/me", Some(&session_token(&response)?))
        .await?;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["verified"], false);
    assert_eq!(me.body["data"]["isAdmin"], false);
    Ok(())
}

#[tokio::test]
async fn signup_normalizes_email_and_rejects_duplicates() -> Result<()> {
    let app = TestApp::new();
    app.signup("Alice Smith", "Alice@X.com").await?;

    let again = app.signup("Alice Again", ALICE).await?;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.message(), "User already registered.");
    assert_eq!(app.users.len().await, 1);
    Ok(())
}

#[tokio::test]
async fn signup_validation_errors() -> Result<()> {
    let app = TestApp::new();

    let short_name = app
        .post(
            "/api/users",
            json!({ "name": "Al", "email": ALICE, "password": PASSWORD }),
        )
        .await?;
    assert_eq!(short_name.status, StatusCode::BAD_REQUEST);
    assert!(!short_name.ok());
    assert_eq!(short_name.message(), "\"name\" must be 5-30 characters");

    let bad_email = app
        .post(
            "/api/users",
            json!({ "name": "Alice Smith", "email": "not-an-email", "password": PASSWORD }),
        )
        .await?;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_email.message(), "\"email\" must be a valid email");

    let missing = app.call(Method::POST, "/api/users", None, None).await?;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.message(), "Missing payload");

    assert!(app.outbox.messages().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn padded_short_name_is_a_validation_error() -> Result<()> {
    let app = TestApp::new();

    let response = app.signup("   Al   ", ALICE).await?;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "\"name\" must be 5-30 characters");
    assert!(app.users.is_empty().await);

    let padded = app.signup("  Alice Smith  ", ALICE).await?;
    assert_eq!(padded.status, StatusCode::CREATED);
    assert_eq!(padded.body["data"]["user"]["name"], "Alice Smith");
    Ok(())
}

#[tokio::test]
async fn malformed_json_reports_the_rejection() -> Result<()> {
    let app = TestApp::new();

    let missing_field = app
        .post("/api/users", json!({ "name": "Alice Smith", "email": ALICE }))
        .await?;
    assert_eq!(missing_field.status, StatusCode::BAD_REQUEST);
    assert!(!missing_field.ok());
    assert!(
        missing_field.message().contains("missing field `password`"),
        "{}",
        missing_field.message()
    );

    let wrong_type = app
        .post("/api/users/login", json!({ "email": ALICE, "password": 12345 }))
        .await?;
    assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);
    assert!(
        wrong_type.message().contains("invalid type"),
        "{}",
        wrong_type.message()
    );
    assert_ne!(wrong_type.message(), "Missing payload");
    Ok(())
}

#[tokio::test]
async fn signup_email_failure_is_internal_error() -> Result<()> {
    let app = TestApp::new();
    app.outbox.set_failing(true).await;

    let response = app.signup("Alice Smith", ALICE).await?;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.message(),
        "email delivery failed: outbox configured to fail"
    );

    // The account exists; the user can ask for the email again.
    app.outbox.set_failing(false).await;
    let resend = app
        .post("/api/users/resend-verification-email", json!({ "email": ALICE }))
        .await?;
    assert_eq!(resend.status, StatusCode::OK);
    assert!(app.verification_link(ALICE).await.is_ok());
    Ok(())
}

#[tokio::test]
async fn login_is_refused_until_verified() -> Result<()> {
    let app = TestApp::new();
    app.signup("Alice Smith", ALICE).await?;

    let before = app.login(ALICE, PASSWORD).await?;
    assert_eq!(before.status, StatusCode::BAD_REQUEST);
    assert_eq!(before.message(), "Invalid email or password.");

    let wrong = app.login(ALICE, "wrong-password").await?;
    assert_eq!(wrong.message(), before.message());

    let unknown = app.login("nobody@x.com", PASSWORD).await?;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown.message(), before.message());

    let (id, token) = app.verification_link(ALICE).await?;
    let verify = app
        .get(&format!("/api/users/verify/{id}/{token}"), None)
        .await?;
    assert_eq!(verify.status, StatusCode::OK);
    assert_eq!(verify.message(), "User verified successfully.");

    let after = app.login(ALICE, PASSWORD).await?;
    assert_eq!(after.status, StatusCode::OK);
    assert_eq!(after.message(), "User logged in successfully.");
    let token = session_token(&after)?;
    assert_eq!(
        after.headers.get(AUTH_TOKEN_HEADER).and_then(|v| v.to_str().ok()),
        Some(token.as_str())
    );
    Ok(())
}

#[tokio::test]
async fn verify_with_wrong_token_leaves_user_unverified() -> Result<()> {
    let app = TestApp::new();
    app.signup("Alice Smith", ALICE).await?;
    let (id, token) = app.verification_link(ALICE).await?;

    let wrong = app
        .get(&format!("/api/users/verify/{id}/not-the-token"), None)
        .await?;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.message(), "Invalid or expired token.");
    assert_eq!(app.login(ALICE, PASSWORD).await?.status, StatusCode::BAD_REQUEST);

    // A wrong guess does not burn the real token.
    let right = app
        .get(&format!("/api/users/verify/{id}/{token}"), None)
        .await?;
    assert_eq!(right.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn verification_token_is_single_use() -> Result<()> {
    let app = TestApp::new();
    app.signup("Alice Smith", ALICE).await?;
    let (id, token) = app.verification_link(ALICE).await?;
    let uri = format!("/api/users/verify/{id}/{token}");

    assert_eq!(app.get(&uri, None).await?.status, StatusCode::OK);

    let again = app.get(&uri, None).await?;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.message(), "User already verified.");
    Ok(())
}

#[tokio::test]
async fn verify_unknown_or_malformed_user_is_not_found() -> Result<()> {
    let app = TestApp::new();

    let unknown = app
        .get(
            "/api/users/verify/00000000-0000-0000-0000-000000000000/token",
            None,
        )
        .await?;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.message(), "User not found.");

    let malformed = app.get("/api/users/verify/123/token", None).await?;
    assert_eq!(malformed.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn resend_replaces_the_verification_token() -> Result<()> {
    let app = TestApp::new();
    app.signup("Alice Smith", ALICE).await?;
    let (id, first) = app.verification_link(ALICE).await?;

    let resend = app
        .post("/api/users/resend-verification-email", json!({ "email": ALICE }))
        .await?;
    assert_eq!(resend.status, StatusCode::OK);
    assert_eq!(resend.message(), "Verification email sent successfully.");
    let (_, second) = app.verification_link(ALICE).await?;
    assert_ne!(first, second);

    let stale = app
        .get(&format!("/api/users/verify/{id}/{first}"), None)
        .await?;
    assert_eq!(stale.status, StatusCode::BAD_REQUEST);

    let fresh = app
        .get(&format!("/api/users/verify/{id}/{second}"), None)
        .await?;
    assert_eq!(fresh.status, StatusCode::OK);

    let verified = app
        .post("/api/users/resend-verification-email", json!({ "email": ALICE }))
        .await?;
    assert_eq!(verified.status, StatusCode::BAD_REQUEST);
    assert_eq!(verified.message(), "User already verified.");
    Ok(())
}

#[tokio::test]
async fn forgot_password_twice_invalidates_first_token() -> Result<()> {
    let app = TestApp::new();
    app.verified_user("Alice Smith", ALICE).await?;

    let first = app
        .post("/api/users/forgot-password", json!({ "email": ALICE }))
        .await?;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.message(), "Password reset link sent to your email.");
    let (id, t1) = app.reset_link(ALICE).await?;

    app.post("/api/users/forgot-password", json!({ "email": ALICE }))
        .await?;
    let (_, t2) = app.reset_link(ALICE).await?;
    assert_ne!(t1, t2);

    let stale = app
        .get(&format!("/api/users/reset-password/{id}/{t1}"), None)
        .await?;
    assert_eq!(stale.status, StatusCode::BAD_REQUEST);

    let live = app
        .get(&format!("/api/users/reset-password/{id}/{t2}"), None)
        .await?;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.message(), "Password reset link is valid.");
    Ok(())
}

#[tokio::test]
async fn reset_link_points_at_frontend() -> Result<()> {
    let app = TestApp::new();
    app.verified_user("Alice Smith", ALICE).await?;
    app.post("/api/users/forgot-password", json!({ "email": ALICE }))
        .await?;

    let (id, token) = app.reset_link(ALICE).await?;
    let mail = app.outbox.last_to(ALICE).await;
    assert!(mail.is_some_and(|mail| mail
        .html_body
        .contains(&format!("{FRONTEND_BASE_URL}/reset-password/{id}/{token}"))));
    Ok(())
}

#[tokio::test]
async fn forgot_password_unknown_email_is_not_found() -> Result<()> {
    let app = TestApp::new();
    let response = app
        .post("/api/users/forgot-password", json!({ "email": "ghost@x.com" }))
        .await?;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "User not found.");
    Ok(())
}

#[tokio::test]
async fn reset_password_flow() -> Result<()> {
    let app = TestApp::new();
    app.verified_user("Alice Smith", ALICE).await?;
    app.post("/api/users/forgot-password", json!({ "email": ALICE }))
        .await?;
    let (id, token) = app.reset_link(ALICE).await?;
    let uri = format!("/api/users/reset-password/{id}/{token}");

    // Checking the link does not consume it.
    assert_eq!(app.get(&uri, None).await?.status, StatusCode::OK);
    assert_eq!(app.get(&uri, None).await?.status, StatusCode::OK);

    let too_short = app.post(&uri, json!({ "password": "abc" })).await?;
    assert_eq!(too_short.status, StatusCode::BAD_REQUEST);
    assert_eq!(too_short.message(), "\"password\" must be 6-255 characters");

    let reset = app.post(&uri, json!({ "password": "brand-new-pw" })).await?;
    assert_eq!(reset.status, StatusCode::OK);
    assert_eq!(reset.message(), "Password reset successfully.");

    let replay = app.post(&uri, json!({ "password": "another-pw" })).await?;
    assert_eq!(replay.status, StatusCode::BAD_REQUEST);
    assert_eq!(replay.message(), "Invalid or expired token.");

    assert_eq!(app.login(ALICE, PASSWORD).await?.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        app.login(ALICE, "brand-new-pw").await?.status,
        StatusCode::OK
    );

    let confirmation = app.outbox.last_to(ALICE).await;
    assert!(confirmation.is_some_and(|mail| mail.subject == "Your password was changed"));
    Ok(())
}

#[tokio::test]
async fn update_password_requires_current_password() -> Result<()> {
    let app = TestApp::new();
    let token = app.verified_user("Alice Smith", ALICE).await?;

    let wrong = app
        .call(
            Method::PUT,
            "/api/users/update-password",
            Some(&token),
            Some(json!({ "currentPassword": "nope-nope", "newPassword": "changed-pw" })),
        )
        .await?;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.message(), "Invalid email or password.");

    let updated = app
        .call(
            Method::PUT,
            "/api/users/update-password",
            Some(&token),
            Some(json!({ "currentPassword": PASSWORD, "newPassword": "changed-pw" })),
        )
        .await?;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.message(), "Password updated successfully.");
    assert_eq!(app.login(ALICE, "changed-pw").await?.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn unverified_user_cannot_update_password() -> Result<()> {
    let app = TestApp::new();
    let signup = app.signup("Alice Smith", ALICE).await?;
    let token = session_token(&signup)?;

    let response = app
        .call(
            Method::PUT,
            "/api/users/update-password",
            Some(&token),
            Some(json!({ "currentPassword": PASSWORD, "newPassword": "changed-pw" })),
        )
        .await?;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Not authorized as a verified user");
    Ok(())
}

#[tokio::test]
async fn profile_update_returns_fresh_token() -> Result<()> {
    let app = TestApp::new();
    let token = app.verified_user("Alice Smith", ALICE).await?;

    let updated = app
        .call(
            Method::PUT,
            "/api/users/profile",
            Some(&token),
            Some(json!({ "name": "Alice Jones" })),
        )
        .await?;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.message(), "Profile updated successfully.");
    assert_eq!(updated.body["data"]["user"]["name"], "Alice Jones");

    let fresh = session_token(&updated)?;
    let me = app.get("/api/users/me", Some(&fresh)).await?;
    assert_eq!(me.body["data"]["name"], "Alice Jones");
    assert_eq!(me.body["data"]["verified"], true);
    Ok(())
}

#[tokio::test]
async fn blank_profile_name_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let token = app.verified_user("Alice Smith", ALICE).await?;

    let blank = app
        .call(
            Method::PUT,
            "/api/users/profile",
            Some(&token),
            Some(json!({ "name": "      " })),
        )
        .await?;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.message(), "\"name\" must be 5-30 characters");

    let me = app.get("/api/users/me", Some(&token)).await?;
    assert_eq!(me.body["data"]["name"], "Alice Smith");
    Ok(())
}

#[tokio::test]
async fn delete_account_removes_user() -> Result<()> {
    let app = TestApp::new();
    let token = app.verified_user("Alice Smith", ALICE).await?;

    let deleted = app
        .call(Method::DELETE, "/api/users/me", Some(&token), None)
        .await?;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.message(), "User deleted successfully.");
    assert!(app.users.is_empty().await);

    // The token still decodes, but the account is gone.
    let me = app.get("/api/users/me", Some(&token)).await?;
    assert_eq!(me.status, StatusCode::NOT_FOUND);
    assert_eq!(app.login(ALICE, PASSWORD).await?.status, StatusCode::BAD_REQUEST);
    Ok(())
}
