//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod replay;
pub mod scenarios;
pub mod validate;
pub mod version;

use crate::cli::args::{Cli, Commands, ScenariosSubcommand};
use crate::config::LoadWarning;
use crate::error::AlertTrustError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub fn dispatch(cli: Cli) -> Result<(), AlertTrustError> {
    match cli.command {
        Commands::Replay(args) => replay::run(&args),
        Commands::Validate(args) => validate::run(&args),
        Commands::Scenarios(cmd) => match cmd.subcommand {
            ScenariosSubcommand::List(args) => scenarios::list(&args),
            ScenariosSubcommand::Show(args) => scenarios::show(&args),
        },
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Logs loader and validator warnings.
fn log_warnings(warnings: &[LoadWarning]) {
    for warning in warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
}
