//! Replay command handler
//!
//! Implements `replay`: runs a trace file or built-in scenario through the
//! scorer and prints the per-step rewards and the episode summary.

use std::fmt::Write as _;

use crate::cli::args::{OutputFormat, ReplayArgs};
use crate::config::ConfigLoader;
use crate::error::AlertTrustError;
use crate::observability::{EventEmitter, init_metrics};
use crate::replay::{self, EpisodeReport, EpisodeTrace};
use crate::scenarios;

use super::log_warnings;

/// Replay one episode and check its expectation.
///
/// # Errors
///
/// Returns a configuration, trace or scoring error if the episode cannot be
/// replayed, or [`TraceError::ExpectationMismatch`] (after printing the
/// report) when the trace carries an expectation the replay does not meet.
///
/// [`TraceError::ExpectationMismatch`]: crate::error::TraceError::ExpectationMismatch
pub fn run(args: &ReplayArgs) -> Result<(), AlertTrustError> {
    let metrics = if args.metrics {
        Some(init_metrics()?)
    } else {
        None
    };

    let loader = ConfigLoader::with_defaults();
    let override_config = match args.config {
        Some(ref path) => {
            tracing::info!(config = %path.display(), "loading configuration");
            let result = loader.load(path)?;
            log_warnings(&result.warnings);
            Some(result.config)
        }
        None => None,
    };

    let trace = load_trace(args)?;
    let (mut scorer, warnings) = replay::scorer_for(&trace, override_config, &loader)?;
    log_warnings(&warnings);

    let emitter = match args.events_file {
        Some(ref path) if path.as_os_str() == "-" => EventEmitter::stderr(),
        Some(ref path) => EventEmitter::from_file(path)?,
        None => EventEmitter::noop(),
    };

    let report = replay::replay(&trace, &mut scorer, &emitter)?;

    match args.format {
        OutputFormat::Human => print!("{}", render_human(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(handle) = metrics {
        print!("{}", handle.render());
    }

    if let Some(ref expect) = trace.expect {
        report.check(expect)?;
        tracing::info!(trace = %trace.name, "expectation met");
    }
    Ok(())
}

fn load_trace(args: &ReplayArgs) -> Result<EpisodeTrace, AlertTrustError> {
    if let Some(ref path) = args.trace {
        tracing::info!(trace = %path.display(), "loading trace");
        return EpisodeTrace::load(path);
    }
    if let Some(ref name) = args.scenario {
        tracing::info!(scenario = %name, "loading built-in scenario");
        return Ok(scenarios::load_scenario(name)?);
    }
    Err(AlertTrustError::Usage(
        "either --trace or --scenario is required".to_string(),
    ))
}

/// Renders the step table and summary line.
fn render_human(report: &EpisodeReport) -> String {
    let mut out = format!("Episode: {}\n\n", report.name);
    let _ = writeln!(out, "  {:>5}  {:>8}  events", "step", "reward");

    for outcome in &report.steps {
        let mut notes = Vec::new();
        for line in &outcome.opened {
            notes.push(format!("+{line}"));
        }
        for resolved in &outcome.resolved {
            let alerted = if resolved.resolution.alerted() {
                "alerted"
            } else {
                "silent"
            };
            notes.push(format!(
                "-{} ({}, {alerted}: {})",
                resolved.event.line,
                resolved.resolution.mode(),
                resolved.contribution
            ));
        }
        if outcome.done {
            notes.push("[end]".to_string());
        }
        let _ = writeln!(
            out,
            "  {:>5}  {:>8}  {}",
            outcome.step,
            outcome.reward,
            notes.join(" ")
        );
    }

    let termination = report
        .termination
        .map_or("none", crate::engine::Termination::label);
    let _ = writeln!(
        out,
        "\nfinal_reward={} attacks={} termination={termination}",
        report.final_reward, report.total_nb_attacks
    );
    out
}
