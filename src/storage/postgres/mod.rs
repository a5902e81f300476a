//! Postgres-backed stores.
//!
//! Every statement runs inside a `db.query` span carrying the SQL text, so
//! traces show the query next to the request that issued it.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{Instrument, info};

mod blogs;
mod catalog;
mod tokens;
mod users;

pub use blogs::PgBlogStore;
pub use catalog::PgCatalogStore;
pub use tokens::PgTokenStore;
pub use users::PgCredentialStore;

use super::StoreError;

/// Idempotent DDL for every table the service uses.
pub const SCHEMA: &str = include_str!("../../../db/sql/01_mealhub.sql");

/// Apply [`SCHEMA`] to the connected database.
///
/// # Errors
/// Returns an error if any statement fails.
pub async fn apply_schema(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .instrument(db_span("DDL", "01_mealhub.sql"))
        .await
        .context("failed to apply database schema")?;
    info!("database schema applied");
    Ok(())
}

fn db_span(operation: &'static str, statement: &str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Map a write error, turning a uniqueness violation into [`StoreError::Conflict`].
pub(crate) fn map_write_error(err: sqlx::Error) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Conflict
    } else {
        StoreError::Backend(err)
    }
}
