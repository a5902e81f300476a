//! Account and session settings.

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

use crate::auth::AuthConfig;

pub const ARG_PUBLIC_BASE_URL: &str = "public-base-url";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";
pub const ARG_SESSION_SECRET: &str = "session-secret";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_TOKEN_SWEEP_SECONDS: &str = "token-sweep-seconds";
pub const ARG_BCRYPT_COST: &str = "bcrypt-cost";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PUBLIC_BASE_URL)
                .long(ARG_PUBLIC_BASE_URL)
                .help("Public URL of this API, used for verification links and upload URLs")
                .env("MEALHUB_PUBLIC_BASE_URL")
                .default_value("http://localhost:8080"),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend base URL, used for password reset links and CORS")
                .env("MEALHUB_FRONTEND_BASE_URL")
                .default_value("http://localhost:3000"),
        )
        .arg(
            Arg::new(ARG_SESSION_SECRET)
                .long(ARG_SESSION_SECRET)
                .help("HMAC secret used to sign session tokens")
                .env("MEALHUB_SESSION_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session token lifetime in seconds")
                .env("MEALHUB_SESSION_TTL_SECONDS")
                .default_value("2592000")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Verification and reset token lifetime in seconds")
                .env("MEALHUB_TOKEN_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_TOKEN_SWEEP_SECONDS)
                .long(ARG_TOKEN_SWEEP_SECONDS)
                .help("Interval between expired token sweeps in seconds")
                .env("MEALHUB_TOKEN_SWEEP_SECONDS")
                .default_value("60")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_BCRYPT_COST)
                .long(ARG_BCRYPT_COST)
                .help("bcrypt work factor")
                .env("MEALHUB_BCRYPT_COST")
                .default_value("10")
                .value_parser(clap::value_parser!(u32).range(4..=31)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub public_base_url: String,
    pub frontend_base_url: String,
    pub session_secret: SecretString,
    pub session_ttl_seconds: u64,
    pub token_ttl_seconds: u64,
    pub token_sweep_seconds: u64,
    pub bcrypt_cost: u32,
}

impl Options {
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let string = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .with_context(|| format!("missing required argument: --{id}"))
        };
        let seconds = |id: &str| {
            matches
                .get_one::<u64>(id)
                .copied()
                .with_context(|| format!("missing required argument: --{id}"))
        };

        Ok(Self {
            public_base_url: string(ARG_PUBLIC_BASE_URL)?,
            frontend_base_url: string(ARG_FRONTEND_BASE_URL)?,
            session_secret: SecretString::from(string(ARG_SESSION_SECRET)?),
            session_ttl_seconds: seconds(ARG_SESSION_TTL_SECONDS)?,
            token_ttl_seconds: seconds(ARG_TOKEN_TTL_SECONDS)?,
            token_sweep_seconds: seconds(ARG_TOKEN_SWEEP_SECONDS)?,
            bcrypt_cost: matches
                .get_one::<u32>(ARG_BCRYPT_COST)
                .copied()
                .unwrap_or(crate::auth::DEFAULT_BCRYPT_COST),
        })
    }

    #[must_use]
    pub fn into_config(self) -> AuthConfig {
        AuthConfig::new(
            self.public_base_url,
            self.frontend_base_url,
            self.session_secret,
        )
        .with_session_ttl_seconds(self.session_ttl_seconds)
        .with_token_ttl_seconds(self.token_ttl_seconds)
        .with_token_sweep_seconds(self.token_sweep_seconds)
        .with_bcrypt_cost(self.bcrypt_cost)
    }
}
