//! # Mealhub (food ordering backend)
//!
//! `mealhub` serves the accounts and menu catalogue of a food ordering
//! platform over HTTP/JSON.
//!
//! ## Accounts
//!
//! Users sign up with a name, email and password. Passwords are stored as
//! salted bcrypt hashes only. A fresh account is unverified: a single-use
//! token is emailed to the user and must be redeemed before login succeeds.
//! The same token machinery, under a different purpose, drives the
//! forgot/reset password flow.
//!
//! - **Tokens:** at most one live token per user and purpose; tokens expire one
//!   hour after issue and are swept by the store.
//! - **Sessions:** stateless HS256 JWTs valid for 30 days. Claims are trusted
//!   until expiry, so a change to `verified` or `is_admin` only shows up once the
//!   holder signs in again.
//!
//! ## Authorization
//!
//! Protected routes carry an ordered gate chain (`Authenticate`,
//! `RequireVerified`, `RequireAdmin`). The first failing gate answers `401` and
//! the handler never runs.
//!
//! ## Catalogue
//!
//! Categories and meals are public to read; writes require a verified admin.
//! Images are uploaded to an object store and referenced by URL.
//!
//! ## Blog
//!
//! Admins publish posts with a cover image and can mail a post to a single
//! address or to every verified account.

pub mod api;
pub mod auth;
pub mod blog;
pub mod catalog;
pub mod cli;
pub mod email;
pub mod storage;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
