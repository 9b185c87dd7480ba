//! Episode trace files
//!
//! A trace is a recorded episode: the per-step attack, alert and
//! termination signals, optionally with the scorer configuration and the
//! expected outcome. Steps past the end of the list are quiet; when the
//! list does not end the episode itself, the step at
//! `max_episode_duration - 1` ends it naturally.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigLimits, ScoreConfig};
use crate::engine::{StepInput, Termination};
use crate::error::{AlertTrustError, TraceError};

/// Expected outcome of replaying a trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    /// Reward reported on the terminal step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_reward: Option<f64>,

    /// Distinct attack events created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_nb_attacks: Option<u64>,

    /// How the episode ends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination: Option<Termination>,
}

/// One recorded episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EpisodeTrace {
    /// Trace name, used in reports and errors.
    pub name: String,

    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Scorer configuration; a `--config` file takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ScoreConfig>,

    /// Number of steps after which the episode ends naturally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_episode_duration: Option<u64>,

    /// Recorded steps, starting at step 0.
    #[serde(default)]
    pub steps: Vec<StepInput>,

    /// Expected outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<Expectation>,
}

impl EpisodeTrace {
    /// Parses a trace from YAML (or JSON, which YAML accepts).
    ///
    /// `source_name` names the text in errors.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Parse`] if the text is empty or malformed.
    pub fn from_yaml(raw: &str, source_name: &str) -> Result<Self, TraceError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
        if raw.trim().is_empty() {
            return Err(TraceError::Parse {
                source_name: source_name.to_string(),
                message: "trace is empty".to_string(),
            });
        }
        serde_yaml::from_str(raw).map_err(|e| TraceError::Parse {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })
    }

    /// Reads and parses a trace file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a trace parse
    /// error.
    pub fn load(path: &Path) -> Result<Self, AlertTrustError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml(&raw, &path.display().to_string())?)
    }

    /// Checks the shape of the episode.
    ///
    /// # Errors
    ///
    /// - [`TraceError::InvalidDuration`] if `max_episode_duration` is zero
    ///   or above `limits.max_episode_steps`
    /// - [`TraceError::TooManySteps`] if more steps are listed than the
    ///   duration allows
    /// - [`TraceError::StepsAfterEnd`] if a step follows the terminal one
    /// - [`TraceError::Unterminated`] if nothing ends the episode
    pub fn validate(&self, limits: &ConfigLimits) -> Result<(), TraceError> {
        if let Some(max) = self.max_episode_duration {
            if max == 0 || max > limits.max_episode_steps {
                return Err(TraceError::InvalidDuration {
                    name: self.name.clone(),
                    max,
                    limit: limits.max_episode_steps,
                });
            }
            if self.steps.len() as u64 > max {
                return Err(TraceError::TooManySteps {
                    name: self.name.clone(),
                    steps: self.steps.len(),
                    max,
                });
            }
        } else if self.steps.len() as u64 > limits.max_episode_steps {
            return Err(TraceError::TooManySteps {
                name: self.name.clone(),
                steps: self.steps.len(),
                max: limits.max_episode_steps,
            });
        }

        match self.end_index() {
            Some(end) if end + 1 < self.steps.len() => Err(TraceError::StepsAfterEnd {
                name: self.name.clone(),
                step: end as u64,
            }),
            None if self.max_episode_duration.is_none() => {
                Err(TraceError::Unterminated(self.name.clone()))
            }
            _ => Ok(()),
        }
    }

    /// Index of the first listed step that ends the episode.
    #[must_use]
    pub fn end_index(&self) -> Option<usize> {
        self.steps.iter().position(StepInput::is_terminal)
    }

    /// Number of steps the episode runs for.
    #[must_use]
    pub fn duration(&self) -> u64 {
        self.end_index().map_or_else(
            || self.max_episode_duration.unwrap_or(0),
            |end| end as u64 + 1,
        )
    }

    /// Every step of the episode, quiet steps filled in and the natural
    /// end applied.
    pub fn episode_steps(&self) -> impl Iterator<Item = StepInput> + '_ {
        let duration = self.duration();
        (0..duration).map(move |index| {
            let mut step = usize::try_from(index)
                .ok()
                .and_then(|i| self.steps.get(i))
                .cloned()
                .unwrap_or_default();
            if index + 1 == duration && !step.is_terminal() {
                step.termination = Some(Termination::NaturalEnd);
            }
            step
        })
    }
}
