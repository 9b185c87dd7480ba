//! Per-step input and output of the scorer

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::event::LineId;
use super::resolver::ResolvedEvent;

/// How an episode ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Maximum episode duration reached without a blackout.
    #[serde(rename = "natural", alias = "natural_end")]
    NaturalEnd,
    /// Fatal grid failure (game over).
    Blackout,
    /// Any other terminal transition.
    Other,
}

impl Termination {
    /// Stable lowercase label, used in logs and metrics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NaturalEnd => "natural",
            Self::Blackout => "blackout",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Signals observed by the surrounding environment loop for one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepInput {
    /// Attackable lines currently under attack.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub attacked: BTreeSet<LineId>,

    /// Lines the acting entity raised an alert for this step.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub alerted: BTreeSet<LineId>,

    /// Set when the episode ends on this step.
    #[serde(default, rename = "end", skip_serializing_if = "Option::is_none")]
    pub termination: Option<Termination>,
}

impl StepInput {
    /// A step with no attack, no alert and no termination.
    #[must_use]
    pub fn quiet() -> Self {
        Self::default()
    }

    /// Marks `line` as under attack.
    #[must_use]
    pub fn attack(mut self, line: impl Into<LineId>) -> Self {
        self.attacked.insert(line.into());
        self
    }

    /// Raises an alert for `line`.
    #[must_use]
    pub fn alert(mut self, line: impl Into<LineId>) -> Self {
        self.alerted.insert(line.into());
        self
    }

    /// Ends the episode on this step.
    #[must_use]
    pub fn ending(mut self, termination: Termination) -> Self {
        self.termination = Some(termination);
        self
    }

    /// Ends the episode with a blackout on this step.
    #[must_use]
    pub fn blackout(self) -> Self {
        self.ending(Termination::Blackout)
    }

    /// Ends the episode naturally on this step.
    #[must_use]
    pub fn natural_end(self) -> Self {
        self.ending(Termination::NaturalEnd)
    }

    /// Whether this step ends the episode.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.termination.is_some()
    }
}

/// What one call to [`step`](super::AlertTrustScorer::step) produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    /// Zero-based step index.
    pub step: u64,
    /// Reward to hand back to the environment: `0` unless terminal.
    pub reward: f64,
    /// Whether the episode ended on this step.
    pub done: bool,
    /// Lines whose attack event opened on this step.
    pub opened: Vec<LineId>,
    /// Events resolved on this step.
    pub resolved: Vec<ResolvedEvent>,
    /// Mean contribution of `resolved`, if anything resolved.
    pub aggregate: Option<f64>,
}
