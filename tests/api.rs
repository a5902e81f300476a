mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::TestApp;
use mealhub::api::REQUEST_ID_HEADER;

#[tokio::test]
async fn health_reports_build_and_store() -> Result<()> {
    let app = TestApp::new();

    let response = app.get("/health", None).await?;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(response.body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(response.body["database"], "ok");
    assert!(response
        .headers
        .get("x-app")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(env!("CARGO_PKG_NAME"))));
    Ok(())
}

#[tokio::test]
async fn health_options_has_no_body() -> Result<()> {
    let app = TestApp::new();
    let response = app.call(Method::OPTIONS, "/health", None, None).await?;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_null());
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> Result<()> {
    let app = TestApp::new();

    let response = app.get("/api-docs/openapi.json", None).await?;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["info"]["title"], env!("CARGO_PKG_NAME"));
    assert!(response.body["paths"]["/api/users/login"].is_object());
    assert!(response.body["paths"]["/api/meals/{id}"]["put"].is_object());
    assert!(response.body["components"]["securitySchemes"]["bearer"].is_object());
    Ok(())
}

#[tokio::test]
async fn request_id_is_generated_and_propagated() -> Result<()> {
    let app = TestApp::new();

    let generated = app.get("/health", None).await?;
    assert!(generated.headers.contains_key(REQUEST_ID_HEADER));

    let request = Request::builder()
        .uri("/health")
        .header(REQUEST_ID_HEADER, "req-123")
        .body(Body::empty())?;
    let echoed = app.send(request).await?;
    assert_eq!(
        echoed
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok()),
        Some("req-123")
    );
    Ok(())
}

#[tokio::test]
async fn unknown_route_uses_envelope() -> Result<()> {
    let app = TestApp::new();
    let response = app.get("/api/orders", None).await?;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(!response.ok());
    assert_eq!(response.message(), "Route not found.");
    Ok(())
}

#[tokio::test]
async fn protected_routes_reject_missing_token() -> Result<()> {
    let app = TestApp::new();

    for (method, uri) in [
        (Method::GET, "/api/users/me"),
        (Method::DELETE, "/api/users/me"),
        (Method::PUT, "/api/users/profile"),
        (Method::PUT, "/api/users/update-password"),
    ] {
        let response = app.call(method, uri, None, None).await?;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(response.message(), "Not authorized to access this route");
    }

    let malformed = app.get("/api/users/me", Some("random_string")).await?;
    assert_eq!(malformed.status, StatusCode::UNAUTHORIZED);
    Ok(())
}
