use crate::{
    api::{
        handlers::{blogs, catalog, health, users},
        middleware::{GateChain, enforce},
    },
    auth::AuthService,
    blog::BlogService,
    catalog::CatalogService,
};
use anyhow::{Context, Result, anyhow};
use axum::{
    Extension, Json, Router,
    body::Body,
    extract::MatchedPath,
    http::{
        HeaderName, HeaderValue, Method, Request, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post, put},
};
use std::{path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    services::ServeDir,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;
use url::Url;

pub mod handlers;
pub mod middleware;
mod openapi;
pub mod response;

pub use openapi::openapi;
pub use response::{AUTH_TOKEN_HEADER, ApiError, ApiResponse};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the application router.
///
/// Protected methods carry their [`GateChain`] as a `route_layer`; the public
/// method on the same path is added after the layer and is not gated.
#[must_use]
pub fn router(
    auth: Arc<AuthService>,
    catalog: Arc<CatalogService>,
    blogs: Arc<BlogService>,
) -> Router {
    Router::new()
        .route("/health", get(health::health).options(health::health))
        .route("/api-docs/openapi.json", get(openapi_json))
        // Accounts
        .route("/api/users", post(users::signup))
        .route("/api/users/login", post(users::login))
        .route("/api/users/verify/:id/:token", get(users::verify_email))
        .route(
            "/api/users/resend-verification-email",
            post(users::resend_verification),
        )
        .route("/api/users/forgot-password", post(users::forgot_password))
        .route(
            "/api/users/reset-password/:id/:token",
            get(users::check_reset_link).post(users::reset_password),
        )
        .route(
            "/api/users/update-password",
            put(users::update_password)
                .route_layer(from_fn_with_state(GateChain::verified(), enforce)),
        )
        .route(
            "/api/users/me",
            get(users::me)
                .delete(users::delete_account)
                .route_layer(from_fn_with_state(GateChain::authenticated(), enforce)),
        )
        .route(
            "/api/users/profile",
            put(users::update_profile)
                .route_layer(from_fn_with_state(GateChain::verified(), enforce)),
        )
        // Catalogue
        .route(
            "/api/categories",
            post(catalog::create_category)
                .route_layer(from_fn_with_state(GateChain::admin(), enforce))
                .get(catalog::list_categories),
        )
        .route("/api/categories/:name", get(catalog::meals_by_category))
        .route(
            "/api/meals",
            post(catalog::create_meal)
                .route_layer(from_fn_with_state(GateChain::admin(), enforce))
                .get(catalog::list_meals),
        )
        .route(
            "/api/meals/:id",
            put(catalog::update_meal)
                .delete(catalog::delete_meal)
                .route_layer(from_fn_with_state(GateChain::admin(), enforce))
                .get(catalog::get_meal),
        )
        // Blog
        .route(
            "/api/blogs",
            post(blogs::create_blog)
                .route_layer(from_fn_with_state(GateChain::admin(), enforce))
                .get(blogs::list_blogs),
        )
        .route(
            "/api/blogs/:id",
            put(blogs::update_blog)
                .delete(blogs::delete_blog)
                .route_layer(from_fn_with_state(GateChain::admin(), enforce))
                .get(blogs::get_blog),
        )
        .route(
            "/api/blogs/send/:id",
            post(blogs::send_blog).route_layer(from_fn_with_state(GateChain::admin(), enforce)),
        )
        .route(
            "/api/blogs/send-all/:id",
            post(blogs::send_blog_to_all)
                .route_layer(from_fn_with_state(GateChain::admin(), enforce)),
        )
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID_HEADER),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID_HEADER,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(auth))
                .layer(Extension(catalog))
                .layer(Extension(blogs)),
        )
}

async fn openapi_json() -> impl IntoResponse {
    Json(openapi())
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Route not found.")
}

/// Start the server
///
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    auth: Arc<AuthService>,
    catalog: Arc<CatalogService>,
    blogs: Arc<BlogService>,
    upload_dir: Option<PathBuf>,
) -> Result<()> {
    let frontend_origin = frontend_origin(auth.config().frontend_base_url())?;

    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([HeaderName::from_static(AUTH_TOKEN_HEADER)])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(AllowOrigin::exact(frontend_origin))
        .allow_credentials(true);

    let mut app = router(auth, catalog, blogs);
    if let Some(dir) = upload_dir {
        info!("Serving uploads from {}", dir.display());
        app = app.nest_service("/uploads", ServeDir::new(dir));
    }
    let app = app.layer(cors);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn frontend_origin(frontend_base_url: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(frontend_base_url)
        .with_context(|| format!("Invalid frontend base URL: {frontend_base_url}"))?;
    let host = parsed.host_str().ok_or_else(|| {
        anyhow!("Frontend base URL must include a valid host: {frontend_base_url}")
    })?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build frontend origin header")
}
