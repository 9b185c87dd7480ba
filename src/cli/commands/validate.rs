//! Validate command handler
//!
//! Implements `validate`: loads each configuration file through the full
//! loading pipeline without scoring anything.

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLoader, LoadWarning};
use crate::error::{AlertTrustError, ConfigError, Severity, ValidationIssue};

use super::log_warnings;

/// Per-file validation outcome, as printed with `--format json`.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Validate configuration files.
///
/// Every file is checked even after a failure; the first failure is
/// returned once all of them have been reported.
///
/// # Errors
///
/// Returns the first file's configuration error, or a validation error
/// built from its warnings under `--strict`.
pub fn run(args: &ValidateArgs) -> Result<(), AlertTrustError> {
    let loader = ConfigLoader::with_defaults();
    let mut reports = Vec::with_capacity(args.files.len());
    let mut first_error: Option<ConfigError> = None;

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating configuration");
        let source = path.display().to_string();

        let outcome = loader.load(path).and_then(|result| {
            log_warnings(&result.warnings);
            if args.strict && !result.warnings.is_empty() {
                return Err(strict_failure(&source, &result.warnings));
            }
            Ok(result.warnings)
        });

        let report = match outcome {
            Ok(warnings) => {
                tracing::info!(file = %source, "configuration valid");
                FileReport {
                    file: source,
                    valid: true,
                    warnings: warnings.iter().map(describe_warning).collect(),
                    error: None,
                }
            }
            Err(e) => {
                let report = FileReport {
                    file: source,
                    valid: false,
                    warnings: Vec::new(),
                    error: Some(e.to_string()),
                };
                first_error.get_or_insert(e);
                report
            }
        };
        reports.push(report);
    }

    match args.format {
        OutputFormat::Human => {
            for report in &reports {
                if report.valid {
                    println!("ok      {}", report.file);
                    for warning in &report.warnings {
                        println!("        warning: {warning}");
                    }
                } else {
                    println!("FAILED  {}", report.file);
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    first_error.map_or(Ok(()), |e| Err(e.into()))
}

/// Turns warnings into errors for `--strict`.
fn strict_failure(source: &str, warnings: &[LoadWarning]) -> ConfigError {
    ConfigError::ValidationError {
        path: source.to_string(),
        errors: warnings
            .iter()
            .map(|w| ValidationIssue {
                path: w.location.clone().unwrap_or_default(),
                message: w.message.clone(),
                severity: Severity::Error,
            })
            .collect(),
    }
}

fn describe_warning(warning: &LoadWarning) -> String {
    match warning.location {
        Some(ref location) => format!("{} at {location}", warning.message),
        None => warning.message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const VALID: &str = "attackable_lines: [a, b]\nend_of_episode_bonus: 42\n";
    const WIDE_WINDOW: &str = "attackable_lines: [a]\nrisk_window: 6\n";

    fn args(files: Vec<PathBuf>, strict: bool) -> ValidateArgs {
        ValidateArgs {
            files,
            strict,
            format: OutputFormat::Json,
        }
    }

    #[test]
    fn valid_files_pass() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.yaml");
        std::fs::write(&path, VALID).unwrap();
        assert!(run(&args(vec![path], false)).is_ok());
    }

    #[test]
    fn warnings_fail_only_when_strict() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.yaml");
        std::fs::write(&path, WIDE_WINDOW).unwrap();
        assert!(run(&args(vec![path.clone()], false)).is_ok());

        let err = run(&args(vec![path], true)).unwrap_err();
        assert!(matches!(
            err,
            AlertTrustError::Config(ConfigError::ValidationError { ref errors, .. })
                if errors.iter().all(|e| e.severity == Severity::Error)
        ));
    }

    #[test]
    fn first_failure_reported_after_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let ok = dir.path().join("ok.yaml");
        std::fs::write(&ok, VALID).unwrap();
        let missing = dir.path().join("missing.yaml");
        let err = run(&args(vec![missing, ok], false)).unwrap_err();
        assert!(matches!(
            err,
            AlertTrustError::Config(ConfigError::MissingFile { .. })
        ));
    }

    #[test]
    fn describe_warning_includes_location() {
        let warning = LoadWarning {
            message: "long window".to_string(),
            location: Some("risk_window".to_string()),
        };
        assert_eq!(describe_warning(&warning), "long window at risk_window");
    }
}
