//! Error types for `alert-trust`
//!
//! A small hierarchy: configuration errors, per-step scoring contract
//! violations, trace errors, and a top-level error that maps each of
//! them to a process exit code.

use std::path::PathBuf;
use thiserror::Error;

use crate::engine::LineId;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `alert-trust` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Scoring contract violation raised by the engine
    pub const SCORE_ERROR: i32 = 5;

    /// Malformed episode trace
    pub const TRACE_ERROR: i32 = 6;

    /// Replay finished but did not match the trace's expectation
    pub const EXPECTATION_FAILED: i32 = 7;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `alert-trust` operations.
#[derive(Debug, Error)]
pub enum AlertTrustError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Scoring engine error
    #[error(transparent)]
    Score(#[from] ScoreError),

    /// Episode trace error
    #[error(transparent)]
    Trace(#[from] TraceError),

    /// Invalid command-line usage
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl AlertTrustError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Score(_) => ExitCode::SCORE_ERROR,
            Self::Trace(TraceError::ExpectationMismatch { .. }) => ExitCode::EXPECTATION_FAILED,
            Self::Trace(_) => ExitCode::TRACE_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML or JSON parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {}", summarize(.errors))]
    ValidationError {
        /// Path to the configuration file, or `<inline>`
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Configuration file is empty
    #[error("configuration file is empty: {path}")]
    Empty {
        /// Path to the empty file
        path: PathBuf,
    },

    /// Configuration file exceeds the size limit
    #[error("configuration file {path} is {size} bytes (limit: {limit})")]
    TooLarge {
        /// Path to the file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: usize,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Unsupported file extension
    #[error("unsupported configuration format for {path} (expected .yaml, .yml or .json)")]
    UnsupportedFormat {
        /// Path to the file
        path: PathBuf,
    },
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map_or_else(String::new, |s| format!(" (did you mean '{s}'?)"))
}

fn summarize(errors: &[ValidationIssue]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "`attackable_lines[2]`")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - validation failure that prevents configuration from being used
    Error,
    /// Warning - potential issue that does not prevent configuration loading
    Warning,
}

// ============================================================================
// Scoring Errors
// ============================================================================

/// Errors raised by the scoring engine.
///
/// Every per-step error is detected before any state is touched, so a
/// failed [`step`](crate::engine::AlertTrustScorer::step) leaves the
/// episode exactly as it was.
#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    /// The engine was constructed from an invalid configuration
    #[error("invalid scoring configuration: {}", summarize(.0))]
    Configuration(Vec<ValidationIssue>),

    /// An alert named a line outside the attackable set
    #[error("alert raised on line '{line}' which is not attackable (step {step})")]
    InvalidAlert {
        /// Offending line
        line: LineId,
        /// Step at which the alert was submitted
        step: u64,
    },

    /// An attack was reported on a line outside the attackable set
    #[error("attack reported on line '{line}' which is not attackable (step {step})")]
    UnknownAttackedLine {
        /// Offending line
        line: LineId,
        /// Step at which the attack was observed
        step: u64,
    },

    /// A new attack started on a line whose previous event is still open
    #[error(
        "new attack on line '{line}' at step {step} while the event opened at step {open_since} is unresolved"
    )]
    InconsistentState {
        /// Line with two overlapping events
        line: LineId,
        /// Step of the new attack
        step: u64,
        /// Activation step of the still-open event
        open_since: u64,
    },

    /// The episode already terminated; call `reset` first
    #[error("episode already terminated at step {step}; reset before stepping again")]
    EpisodeFinished {
        /// Step at which the episode terminated
        step: u64,
    },

    /// A batch step got a different number of inputs than scorers
    #[error("batch holds {expected} scorers but {actual} inputs were given")]
    BatchSizeMismatch {
        /// Number of scorers
        expected: usize,
        /// Number of inputs
        actual: usize,
    },
}

// ============================================================================
// Trace Errors
// ============================================================================

/// Errors in episode traces and their replay.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The trace file could not be parsed
    #[error("invalid trace {source_name}: {message}")]
    Parse {
        /// File path or scenario name
        source_name: String,
        /// Parser message
        message: String,
    },

    /// The trace has no configuration and none was supplied
    #[error("trace '{0}' has no config block and no --config was given")]
    MissingConfig(String),

    /// The trace never terminates the episode
    #[error("trace '{0}' never ends: add an `end` step or `max_episode_duration`")]
    Unterminated(String),

    /// Steps were listed after the episode ended
    #[error("trace '{name}' has steps after the episode ended at step {step}")]
    StepsAfterEnd {
        /// Trace name
        name: String,
        /// Step at which the episode ended
        step: u64,
    },

    /// More steps than `max_episode_duration` allows
    #[error("trace '{name}' lists {steps} steps but max_episode_duration is {max}")]
    TooManySteps {
        /// Trace name
        name: String,
        /// Number of listed steps
        steps: usize,
        /// Declared maximum duration
        max: u64,
    },

    /// `max_episode_duration` is zero or above the configured limit
    #[error("trace '{name}' declares max_episode_duration {max} (allowed: 1..={limit})")]
    InvalidDuration {
        /// Trace name
        name: String,
        /// Declared maximum duration
        max: u64,
        /// Configured limit
        limit: u64,
    },

    /// Named built-in scenario does not exist
    #[error("unknown scenario '{name}'{}", did_you_mean(.suggestion))]
    UnknownScenario {
        /// Requested name
        name: String,
        /// Closest known name
        suggestion: Option<String>,
    },

    /// Replay result differs from the trace's expectation
    #[error("trace '{name}' expectation failed: {details}")]
    ExpectationMismatch {
        /// Trace name
        name: String,
        /// Which fields differed
        details: String,
    },
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `alert-trust` operations.
pub type Result<T> = std::result::Result<T, AlertTrustError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::SUCCESS, 0);
        assert_eq!(ExitCode::ERROR, 1);
        assert_eq!(ExitCode::CONFIG_ERROR, 2);
        assert_eq!(ExitCode::IO_ERROR, 3);
        assert_eq!(ExitCode::SCORE_ERROR, 5);
        assert_eq!(ExitCode::TRACE_ERROR, 6);
        assert_eq!(ExitCode::EXPECTATION_FAILED, 7);
        assert_eq!(ExitCode::USAGE_ERROR, 64);
    }

    #[test]
    fn test_score_error_exit_code() {
        let err: AlertTrustError = ScoreError::EpisodeFinished { step: 3 }.into();
        assert_eq!(err.exit_code(), ExitCode::SCORE_ERROR);
    }

    #[test]
    fn test_expectation_mismatch_exit_code() {
        let err: AlertTrustError = TraceError::ExpectationMismatch {
            name: "t".to_string(),
            details: "final_reward".to_string(),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::EXPECTATION_FAILED);
    }

    #[test]
    fn test_trace_error_exit_code() {
        let err: AlertTrustError = TraceError::Unterminated("t".to_string()).into();
        assert_eq!(err.exit_code(), ExitCode::TRACE_ERROR);
    }

    #[test]
    fn test_config_error_exit_code() {
        let err: AlertTrustError = ConfigError::MissingFile {
            path: PathBuf::from("/test"),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn test_io_error_exit_code() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: AlertTrustError = io_err.into();
        assert_eq!(err.exit_code(), ExitCode::IO_ERROR);
    }

    #[test]
    fn test_validation_issue_display() {
        let issue = ValidationIssue {
            path: "attackable_lines".to_string(),
            message: "must not be empty".to_string(),
            severity: Severity::Error,
        };
        assert_eq!(issue.to_string(), "error: must not be empty at attackable_lines");
    }

    #[test]
    fn test_validation_issue_warning_display() {
        let issue = ValidationIssue {
            path: "risk_window".to_string(),
            message: "unusually long".to_string(),
            severity: Severity::Warning,
        };
        assert_eq!(issue.to_string(), "warning: unusually long at risk_window");
    }

    #[test]
    fn test_validation_error_lists_every_issue() {
        let err = ConfigError::ValidationError {
            path: "score.yaml".to_string(),
            errors: vec![
                ValidationIssue {
                    path: "attackable_lines".to_string(),
                    message: "must not be empty".to_string(),
                    severity: Severity::Error,
                },
                ValidationIssue {
                    path: "risk_window".to_string(),
                    message: "must be at least 1".to_string(),
                    severity: Severity::Error,
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("score.yaml"));
        assert!(msg.contains("attackable_lines"));
        assert!(msg.contains("risk_window"));
    }

    #[test]
    fn test_inconsistent_state_display() {
        let err = ScoreError::InconsistentState {
            line: LineId::new("48_50_136"),
            step: 5,
            open_since: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("48_50_136"));
        assert!(msg.contains("step 5"));
        assert!(msg.contains("step 3"));
    }

    #[test]
    fn test_unknown_scenario_suggestion() {
        let err = TraceError::UnknownScenario {
            name: "single-atack".to_string(),
            suggestion: Some("single-attack".to_string()),
        };
        assert!(err.to_string().contains("did you mean 'single-attack'"));

        let bare = TraceError::UnknownScenario {
            name: "zzz".to_string(),
            suggestion: None,
        };
        assert_eq!(bare.to_string(), "unknown scenario 'zzz'");
    }
}
