//! Configuration validation
//!
//! Semantic checks on a deserialized [`ScoreConfig`]. Validation collects
//! every issue rather than stopping at the first one, so a user fixing a
//! config file sees the whole list at once.

use std::collections::HashSet;

use crate::config::loader::ConfigLimits;
use crate::config::schema::ScoreConfig;
use crate::error::{Severity, ValidationIssue};

/// Risk windows at or beyond this length fall outside the bounds observed
/// in reference episodes and only produce a warning.
const OBSERVED_RISK_WINDOW_UPPER_BOUND: u32 = 4;

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns every error and warning found.
    pub fn validate(&mut self, config: &ScoreConfig, limits: &ConfigLimits) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_lines(config, limits);
        self.validate_bonus(config);
        self.validate_risk_window(config);
        self.validate_rewards(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Field checks
    // ========================================================================

    fn validate_lines(&mut self, config: &ScoreConfig, limits: &ConfigLimits) {
        if config.attackable_lines.is_empty() {
            self.add_error(
                "attackable_lines",
                "at least one attackable line is required",
            );
            return;
        }

        if config.attackable_lines.len() > limits.max_lines {
            self.add_error(
                "attackable_lines",
                &format!(
                    "{} lines configured, limit is {}",
                    config.attackable_lines.len(),
                    limits.max_lines
                ),
            );
        }

        let mut seen = HashSet::new();
        for (i, line) in config.attackable_lines.iter().enumerate() {
            let path = format!("attackable_lines[{i}]");
            if line.as_str().trim().is_empty() {
                self.add_error(&path, "line identifier cannot be empty");
            } else if !seen.insert(line) {
                self.add_error(&path, &format!("duplicate line identifier '{line}'"));
            }
        }
    }

    fn validate_bonus(&mut self, config: &ScoreConfig) {
        let bonus = config.end_of_episode_bonus;
        if !bonus.is_finite() {
            self.add_error("end_of_episode_bonus", "bonus must be a finite number");
        } else if bonus < 0.0 {
            self.add_error("end_of_episode_bonus", "bonus cannot be negative");
        }
    }

    fn validate_risk_window(&mut self, config: &ScoreConfig) {
        if config.risk_window == 0 {
            self.add_error("risk_window", "risk window must be at least one step");
        } else if config.risk_window >= OBSERVED_RISK_WINDOW_UPPER_BOUND {
            self.add_warning(
                "risk_window",
                &format!(
                    "risk window of {} steps is longer than reference episodes support (< {OBSERVED_RISK_WINDOW_UPPER_BOUND})",
                    config.risk_window
                ),
            );
        }
    }

    fn validate_rewards(&mut self, config: &ScoreConfig) {
        let rewards = &config.rewards;
        let mut all_finite = true;
        for (name, value) in rewards.entries() {
            if !value.is_finite() {
                all_finite = false;
                self.add_error(&format!("rewards.{name}"), "reward must be a finite number");
            }
        }
        if !all_finite {
            return;
        }

        if rewards.blackout_missed > rewards.blackout_alerted {
            self.add_warning(
                "rewards",
                "a missed blackout scores higher than an anticipated one",
            );
        }
        if rewards.natural_alerted > rewards.natural_silent {
            self.add_warning(
                "rewards",
                "a false alarm scores higher than staying silent",
            );
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
