//! Map validated CLI arguments to an [`Action`].

use crate::cli::actions::{
    Action,
    server::{Args, StoreKind},
};
use crate::cli::commands::{self, auth, email};
use anyhow::{Context, Result, bail};
use std::path::PathBuf;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches
        .get_one::<u16>(commands::ARG_PORT)
        .copied()
        .unwrap_or(8080);

    let store = match matches
        .get_one::<String>(commands::ARG_STORE)
        .map_or("postgres", String::as_str)
    {
        "memory" => StoreKind::Memory,
        "postgres" => StoreKind::Postgres {
            dsn: matches
                .get_one::<String>(commands::ARG_DSN)
                .cloned()
                .context("missing required argument: --dsn")?,
            init_schema: matches.get_flag(commands::ARG_INIT_SCHEMA),
        },
        other => bail!("unknown store: {other}"),
    };

    let upload_dir = matches
        .get_one::<String>(commands::ARG_UPLOAD_DIR)
        .map(PathBuf::from)
        .context("missing required argument: --upload-dir")?;

    Ok(Action::Server(Args {
        port,
        store,
        upload_dir,
        auth: auth::Options::parse(matches)?.into_config(),
        email: email::Transport::parse(matches)?,
    }))
}
