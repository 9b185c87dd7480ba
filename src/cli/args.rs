//! CLI argument definitions
//!
//! All Clap derive structs for `alert-trust` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::scenarios::ScenarioCategory;

// ============================================================================
// Root CLI
// ============================================================================

/// Alert trust scoring for power-grid alert agents.
#[derive(Parser, Debug)]
#[command(name = "alert-trust", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "ALERT_TRUST_COLOR")]
    pub color: ColorChoice,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay an episode trace or built-in scenario through the scorer.
    Replay(ReplayArgs),

    /// Validate scorer configuration files.
    Validate(ValidateArgs),

    /// Browse the built-in scenarios.
    Scenarios(ScenariosCommand),

    /// Display version and build information.
    Version(VersionArgs),
}

// ============================================================================
// Replay / Validate
// ============================================================================

/// Arguments for `replay`.
#[derive(Args, Debug)]
#[command(group = clap::ArgGroup::new("source").required(true).multiple(false))]
pub struct ReplayArgs {
    /// Scorer configuration file; overrides the trace's own `config` block.
    #[arg(short, long, env = "ALERT_TRUST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Episode trace file (YAML or JSON).
    #[arg(short, long, group = "source")]
    pub trace: Option<PathBuf>,

    /// Built-in scenario name (see `scenarios list`).
    #[arg(short, long, group = "source")]
    pub scenario: Option<String>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Append the JSONL event stream to this file (`-` for stderr).
    #[arg(long, env = "ALERT_TRUST_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Print a Prometheus snapshot of the scoring metrics after the replay.
    #[arg(long)]
    pub metrics: bool,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Enable strict validation (warnings become errors).
    #[arg(long)]
    pub strict: bool,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Scenarios Command
// ============================================================================

/// Built-in scenario commands.
#[derive(Args, Debug)]
pub struct ScenariosCommand {
    /// Scenarios subcommand.
    #[command(subcommand)]
    pub subcommand: ScenariosSubcommand,
}

/// Scenarios subcommands.
#[derive(Subcommand, Debug)]
pub enum ScenariosSubcommand {
    /// List available built-in scenarios.
    List(ScenariosListArgs),

    /// Print the YAML trace of a built-in scenario.
    Show(ScenariosShowArgs),
}

/// Arguments for `scenarios list`.
#[derive(Args, Debug)]
pub struct ScenariosListArgs {
    /// Filter by how the episode ends.
    #[arg(long)]
    pub category: Option<ScenarioCategory>,

    /// Filter by tag.
    #[arg(long)]
    pub tag: Option<String>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `scenarios show`.
#[derive(Args, Debug)]
pub struct ScenariosShowArgs {
    /// Scenario name.
    pub name: String,
}

// ============================================================================
// Version
// ============================================================================

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

// ============================================================================
// Tests
// ============================================================================
