//! Store implementations behind the auth and catalogue traits.
//!
//! - [`postgres`]: the production backend (sqlx, one pool shared by all stores).
//! - [`memory`]: process-local stores with the same semantics, used by tests and
//!   by `--store memory` for local development.

use thiserror::Error;

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("record already exists")]
    Conflict,
    #[error("database error: {0}")]
    Backend(#[from] sqlx::Error),
    #[error("storage error: {0:#}")]
    Other(#[from] anyhow::Error),
}
