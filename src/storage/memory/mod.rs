//! In-process stores.
//!
//! Same contracts as the Postgres stores, including email uniqueness and
//! atomic token consumption, so tests exercise the real service paths.

mod blogs;
mod catalog;
mod tokens;
mod users;

pub use blogs::MemoryBlogStore;
pub use catalog::MemoryCatalogStore;
pub use tokens::MemoryTokenStore;
pub use users::MemoryCredentialStore;
