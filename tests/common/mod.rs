//! In-process harness: the real router over in-memory stores.

#![allow(dead_code)]

use anyhow::{Context, Result, anyhow};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use mealhub::{
    api,
    auth::{AuthConfig, AuthService},
    blog::BlogService,
    catalog::{CatalogService, MemoryObjectStore},
    email::MemoryOutbox,
    storage::memory::{
        MemoryBlogStore, MemoryCatalogStore, MemoryCredentialStore, MemoryTokenStore,
    },
};
use secrecy::SecretString;
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;
use uuid::Uuid;

pub const PUBLIC_BASE_URL: &str = "http://api.mealhub.test";
pub const FRONTEND_BASE_URL: &str = "http://mealhub.test";
pub const PASSWORD: &str = "secret1";
pub const TOKEN_TTL: Duration = Duration::from_secs(3600);

const BOUNDARY: &str = "mealhub-test-boundary";

pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Response {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    pub fn ok(&self) -> bool {
        self.body["status"].as_bool().unwrap_or(false)
    }
}

pub struct TestApp {
    pub router: Router,
    pub auth: Arc<AuthService>,
    pub users: Arc<MemoryCredentialStore>,
    pub tokens: Arc<MemoryTokenStore>,
    pub outbox: Arc<MemoryOutbox>,
    pub objects: Arc<MemoryObjectStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let config = AuthConfig::new(
            PUBLIC_BASE_URL.to_string(),
            FRONTEND_BASE_URL.to_string(),
            SecretString::from("integration-secret"),
        )
        .with_bcrypt_cost(4);

        let users = Arc::new(MemoryCredentialStore::new());
        let tokens = Arc::new(MemoryTokenStore::new(TOKEN_TTL));
        let outbox = Arc::new(MemoryOutbox::new());
        let objects = Arc::new(MemoryObjectStore::new());

        let auth = Arc::new(AuthService::new(
            config,
            users.clone(),
            tokens.clone(),
            outbox.clone(),
        ));
        let catalog = Arc::new(CatalogService::new(
            Arc::new(MemoryCatalogStore::new()),
            objects.clone(),
        ));
        let blogs = Arc::new(BlogService::new(
            Arc::new(MemoryBlogStore::new()),
            objects.clone(),
            users.clone(),
            outbox.clone(),
        ));

        Self {
            router: api::router(auth.clone(), catalog, blogs),
            auth,
            users,
            tokens,
            outbox,
            objects,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Result<Response> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?
        };
        Ok(Response {
            status,
            headers,
            body,
        })
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<Response> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<Response> {
        self.call(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<Response> {
        self.call(Method::POST, uri, None, Some(body)).await
    }

    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        form: &Multipart,
    ) -> Result<Response> {
        let mut builder = Request::builder().method(method).uri(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(form.finish()))?).await
    }

    pub async fn signup(&self, name: &str, email: &str) -> Result<Response> {
        self.post(
            "/api/users",
            json!({ "name": name, "email": email, "password": PASSWORD }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Response> {
        self.post(
            "/api/users/login",
            json!({ "email": email, "password": password }),
        )
        .await
    }

    /// `(user id, token)` from the newest email to `to` whose link contains `marker`.
    pub async fn link_from_email(&self, to: &str, marker: &str) -> Result<(String, String)> {
        let messages = self.outbox.messages_to(to).await;
        messages
            .iter()
            .rev()
            .find_map(|message| extract_link(&message.html_body, marker))
            .ok_or_else(|| anyhow!("no email to {to} containing {marker}"))
    }

    pub async fn verification_link(&self, to: &str) -> Result<(String, String)> {
        self.link_from_email(to, "/api/users/verify/").await
    }

    pub async fn reset_link(&self, to: &str) -> Result<(String, String)> {
        self.link_from_email(to, "/reset-password/").await
    }

    /// Sign up, verify and log in; returns the session token.
    pub async fn verified_user(&self, name: &str, email: &str) -> Result<String> {
        let signup = self.signup(name, email).await?;
        anyhow::ensure!(signup.status == StatusCode::CREATED, "signup failed");
        let (id, token) = self.verification_link(email).await?;
        let verify = self
            .get(&format!("/api/users/verify/{id}/{token}"), None)
            .await?;
        anyhow::ensure!(verify.status == StatusCode::OK, "verify failed");
        session_token(&self.login(email, PASSWORD).await?)
    }

    /// A verified admin; the flag is set in the store, then a fresh login picks it up.
    pub async fn admin(&self) -> Result<String> {
        let email = "chef@mealhub.dev";
        self.verified_user("Head Chef", email).await?;
        let id = self.user_id(email).await?;
        anyhow::ensure!(self.users.set_admin(id, true).await, "admin not set");
        session_token(&self.login(email, PASSWORD).await?)
    }

    pub async fn user_id(&self, email: &str) -> Result<Uuid> {
        let (id, _) = self.verification_link(email).await?;
        Ok(Uuid::parse_str(&id)?)
    }
}

pub fn session_token(response: &Response) -> Result<String> {
    response.body["token"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("no token in {}", response.body))
}

fn extract_link(html: &str, marker: &str) -> Option<(String, String)> {
    let start = html.find(marker)? + marker.len();
    let rest = &html[start..];
    let end = rest.find('"')?;
    let (id, token) = rest[..end].split_once('/')?;
    Some((id.to_string(), token.to_string()))
}

/// Hand-built `multipart/form-data` body.
#[derive(Default)]
pub struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"upload\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(&self) -> Vec<u8> {
        let mut body = self.body.clone();
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }
}
