use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;

/// Parse arguments, set up logging and return the action for the binary to run.
///
/// # Errors
///
/// Returns an error if argument parsing, telemetry initialization, or action dispatch fails
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    let verbosity = commands::logging::verbosity(&matches);
    telemetry::init(commands::logging::level(verbosity))?;

    dispatch::handler(&matches)
}
