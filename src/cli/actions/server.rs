use crate::{
    api,
    auth::{AuthConfig, AuthService, CredentialStore, TokenStore, spawn_token_sweeper},
    blog::{BlogService, BlogStore},
    catalog::{CatalogService, CatalogStore, LocalObjectStore},
    cli::{commands::email::Transport, telemetry},
    email::{EmailSender, LogEmailSender, SendGridSender},
    storage::{
        memory::{MemoryBlogStore, MemoryCatalogStore, MemoryCredentialStore, MemoryTokenStore},
        postgres::{self, PgBlogStore, PgCatalogStore, PgCredentialStore, PgTokenStore},
    },
};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::{info, warn};
use url::Url;

#[derive(Debug)]
pub enum StoreKind {
    Postgres { dsn: String, init_schema: bool },
    Memory,
}

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub store: StoreKind,
    pub upload_dir: PathBuf,
    pub auth: AuthConfig,
    pub email: Transport,
}

struct Stores {
    credentials: Arc<dyn CredentialStore>,
    tokens: Arc<dyn TokenStore>,
    catalog: Arc<dyn CatalogStore>,
    blogs: Arc<dyn BlogStore>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable, the email transport cannot
/// be built, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let stores = open_stores(&args.store, args.auth.token_ttl()).await?;

    let mailer: Arc<dyn EmailSender> = match args.email {
        Transport::Log => Arc::new(LogEmailSender),
        Transport::SendGrid { api_key, from } => Arc::new(
            SendGridSender::new(api_key, from).context("Failed to build SendGrid client")?,
        ),
    };

    tokio::fs::create_dir_all(&args.upload_dir)
        .await
        .with_context(|| format!("Failed to create {}", args.upload_dir.display()))?;
    let objects = Arc::new(LocalObjectStore::new(
        args.upload_dir.clone(),
        args.auth.public_base_url(),
    ));

    let sweeper = spawn_token_sweeper(stores.tokens.clone(), args.auth.token_sweep_interval());

    let blogs = Arc::new(BlogService::new(
        stores.blogs,
        objects.clone(),
        stores.credentials.clone(),
        mailer.clone(),
    ));
    let auth = Arc::new(AuthService::new(
        args.auth,
        stores.credentials,
        stores.tokens,
        mailer,
    ));
    let catalog = Arc::new(CatalogService::new(stores.catalog, objects));

    let result = api::new(args.port, auth, catalog, blogs, Some(args.upload_dir)).await;

    sweeper.abort();
    telemetry::shutdown_tracer();

    result
}

async fn open_stores(kind: &StoreKind, token_ttl: Duration) -> Result<Stores> {
    match kind {
        StoreKind::Memory => {
            warn!("Using in-memory store: all data is lost on exit");
            Ok(Stores {
                credentials: Arc::new(MemoryCredentialStore::new()),
                tokens: Arc::new(MemoryTokenStore::new(token_ttl)),
                catalog: Arc::new(MemoryCatalogStore::new()),
                blogs: Arc::new(MemoryBlogStore::new()),
            })
        }
        StoreKind::Postgres { dsn, init_schema } => {
            let pool = PgPoolOptions::new()
                .min_connections(1)
                .max_connections(5)
                .max_lifetime(Duration::from_secs(60 * 2))
                .test_before_acquire(true)
                .connect(dsn)
                .await
                .context("Failed to connect to database")?;

            if *init_schema {
                postgres::apply_schema(&pool).await?;
            }

            Ok(Stores {
                credentials: Arc::new(PgCredentialStore::new(pool.clone())),
                tokens: Arc::new(PgTokenStore::new(pool.clone(), token_ttl)),
                catalog: Arc::new(PgCatalogStore::new(pool.clone())),
                blogs: Arc::new(PgBlogStore::new(pool)),
            })
        }
    }
}

fn log_startup_args(args: &Args) {
    let (store, dsn) = match &args.store {
        StoreKind::Postgres { dsn, init_schema } => (
            if *init_schema {
                "postgres (init schema)"
            } else {
                "postgres"
            },
            redact_dsn(dsn),
        ),
        StoreKind::Memory => ("memory", "n/a".to_string()),
    };
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("store", store.to_string()),
        ("dsn", dsn),
        ("public_base_url", args.auth.public_base_url().to_string()),
        (
            "frontend_base_url",
            args.auth.frontend_base_url().to_string(),
        ),
        ("email", args.email.name().to_string()),
        ("upload_dir", args.upload_dir.display().to_string()),
        (
            "token_ttl",
            format!("{}s", args.auth.token_ttl().as_secs()),
        ),
    ];

    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} - {}\n\nStartup configuration:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in &entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("REDACTED"));
            }
            parsed.to_string()
        }
        Err(_) => "invalid-dsn".to_string(),
    }
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
