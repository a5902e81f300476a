//! `-v` / `MEALHUB_LOG_LEVEL`: how much the service logs.
//!
//! Each `-v` raises the level one step up the ladder below, starting from
//! `error`. The environment variable takes either a level name or its
//! position on the ladder.

use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";

const LADDER: [(&str, Level); 5] = [
    ("error", Level::ERROR),
    ("warn", Level::WARN),
    ("info", Level::INFO),
    ("debug", Level::DEBUG),
    ("trace", Level::TRACE),
];

fn parse_verbosity(value: &str) -> Result<u8, String> {
    let value = value.trim();
    let step = match value.parse::<usize>() {
        Ok(step) => Some(step).filter(|step| *step < LADDER.len()),
        Err(_) => LADDER
            .iter()
            .position(|(name, _)| name.eq_ignore_ascii_case(value)),
    };
    step.and_then(|step| u8::try_from(step).ok()).ok_or_else(|| {
        let names: Vec<&str> = LADDER.iter().map(|(name, _)| *name).collect();
        format!(
            "unknown log level {value:?}; use one of {} or 0-{}",
            names.join(", "),
            LADDER.len() - 1
        )
    })
}

/// Level for a verbosity step; anything past the top of the ladder is `trace`.
#[must_use]
pub fn level(verbosity: u8) -> Level {
    LADDER
        .get(usize::from(verbosity))
        .map_or(Level::TRACE, |(_, level)| *level)
}

/// Verbosity picked on the command line or in the environment, `0` if neither.
#[must_use]
pub fn verbosity(matches: &ArgMatches) -> u8 {
    matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0)
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Log more: -v warn, -vv info, -vvv debug, -vvvv trace (default: error)")
            .env("MEALHUB_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(parse_verbosity),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_steps_parse() {
        assert_eq!(parse_verbosity("error"), Ok(0));
        assert_eq!(parse_verbosity("DEBUG"), Ok(3));
        assert_eq!(parse_verbosity(" 4 "), Ok(4));
    }

    #[test]
    fn unknown_levels_list_the_choices() {
        for value in ["5", "verbose", ""] {
            let err = parse_verbosity(value).err().unwrap_or_default();
            assert!(err.contains("error, warn, info, debug, trace"), "{err}");
            assert!(err.contains("0-4"), "{err}");
        }
    }

    #[test]
    fn steps_climb_the_ladder() {
        assert_eq!(level(0), Level::ERROR);
        assert_eq!(level(2), Level::INFO);
        assert_eq!(level(4), Level::TRACE);
        assert_eq!(level(9), Level::TRACE);
    }
}
