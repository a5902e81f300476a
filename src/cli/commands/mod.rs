pub mod auth;
pub mod email;
pub mod logging;

use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_PORT: &str = "port";
pub const ARG_STORE: &str = "store";
pub const ARG_DSN: &str = "dsn";
pub const ARG_INIT_SCHEMA: &str = "init-schema";
pub const ARG_UPLOAD_DIR: &str = "upload-dir";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("mealhub")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("MEALHUB_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_STORE)
                .long(ARG_STORE)
                .help("Storage backend; memory keeps everything in process and loses it on exit")
                .env("MEALHUB_STORE")
                .value_parser(["postgres", "memory"])
                .default_value("postgres"),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long(ARG_DSN)
                .help("Database connection string")
                .env("MEALHUB_DSN")
                .hide_env_values(true)
                .required_if_eq(ARG_STORE, "postgres"),
        )
        .arg(
            Arg::new(ARG_INIT_SCHEMA)
                .long(ARG_INIT_SCHEMA)
                .help("Create missing tables and indexes before serving")
                .env("MEALHUB_INIT_SCHEMA")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_UPLOAD_DIR)
                .long(ARG_UPLOAD_DIR)
                .help("Directory for uploaded catalogue images, served under /uploads")
                .env("MEALHUB_UPLOAD_DIR")
                .default_value("uploads"),
        );

    let command = auth::with_args(command);
    let command = email::with_args(command);
    logging::with_args(command)
}
