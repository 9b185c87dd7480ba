//! `alert-trust` - Alert trust scoring for power-grid alert agents

use clap::Parser;

use alert_trust::cli::args::Cli;
use alert_trust::cli::commands;
use alert_trust::error::ExitCode;
use alert_trust::observability::{LogFormat, init_logging};

fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(LogFormat::Human, cli.verbose, cli.color);
    }

    match commands::dispatch(cli) {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
