use anyhow::{Context, Result, bail};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_EMAIL_TRANSPORT: &str = "email-transport";
pub const ARG_SENDGRID_API_KEY: &str = "sendgrid-api-key";
pub const ARG_EMAIL_FROM: &str = "email-from";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_EMAIL_TRANSPORT)
                .long(ARG_EMAIL_TRANSPORT)
                .help("How outgoing email is delivered: log (print only) or sendgrid")
                .env("MEALHUB_EMAIL_TRANSPORT")
                .value_parser(["log", "sendgrid"])
                .default_value("log"),
        )
        .arg(
            Arg::new(ARG_SENDGRID_API_KEY)
                .long(ARG_SENDGRID_API_KEY)
                .help("SendGrid API key")
                .env("MEALHUB_SENDGRID_API_KEY")
                .hide_env_values(true)
                .required_if_eq(ARG_EMAIL_TRANSPORT, "sendgrid"),
        )
        .arg(
            Arg::new(ARG_EMAIL_FROM)
                .long(ARG_EMAIL_FROM)
                .help("Sender address of outgoing email")
                .env("MEALHUB_EMAIL_FROM")
                .default_value("no-reply@mealhub.dev"),
        )
}

#[derive(Debug)]
pub enum Transport {
    Log,
    SendGrid {
        api_key: SecretString,
        from: String,
    },
}

impl Transport {
    /// # Errors
    /// Returns an error if the transport is unknown or its settings are missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let transport = matches
            .get_one::<String>(ARG_EMAIL_TRANSPORT)
            .map_or("log", String::as_str);

        match transport {
            "log" => Ok(Self::Log),
            "sendgrid" => {
                let api_key = matches
                    .get_one::<String>(ARG_SENDGRID_API_KEY)
                    .cloned()
                    .context("missing required argument: --sendgrid-api-key")?;
                let from = matches
                    .get_one::<String>(ARG_EMAIL_FROM)
                    .cloned()
                    .context("missing required argument: --email-from")?;
                Ok(Self::SendGrid {
                    api_key: SecretString::from(api_key),
                    from,
                })
            }
            other => bail!("unknown email transport: {other}"),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::SendGrid { .. } => "sendgrid",
        }
    }
}
