//! Configuration schema types
//!
//! The scoring engine is configured once, at construction: which lines can
//! be attacked, how long each attack stays at risk, the end-of-episode
//! bonus, and the four per-event contribution values.

use serde::{Deserialize, Serialize};

use crate::engine::LineId;

/// Default end-of-episode bonus.
pub const DEFAULT_END_OF_EPISODE_BONUS: f64 = 1.0;

/// Default risk window, in steps.
///
/// An event opened at step `s` is attributed a blackout at `s`, `s + 1` or
/// `s + 2`; without one it resolves naturally at `s + 2`.
pub const DEFAULT_RISK_WINDOW: u32 = 2;

// ============================================================================
// Top-Level Configuration
// ============================================================================

/// Root configuration for an alert trust scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreConfig {
    /// Lines the opponent may attack, in a stable order.
    pub attackable_lines: Vec<LineId>,

    /// Added to the running score when the episode ends without a blackout.
    #[serde(default = "default_bonus")]
    pub end_of_episode_bonus: f64,

    /// Steps an attack event stays open after activation.
    #[serde(default = "default_risk_window")]
    pub risk_window: u32,

    /// Per-event contribution values.
    #[serde(default)]
    pub rewards: RewardTable,
}

const fn default_bonus() -> f64 {
    DEFAULT_END_OF_EPISODE_BONUS
}

const fn default_risk_window() -> u32 {
    DEFAULT_RISK_WINDOW
}

impl ScoreConfig {
    /// Creates a configuration with default bonus, window and rewards.
    #[must_use]
    pub fn new<I, L>(attackable_lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<LineId>,
    {
        Self {
            attackable_lines: attackable_lines.into_iter().map(Into::into).collect(),
            end_of_episode_bonus: DEFAULT_END_OF_EPISODE_BONUS,
            risk_window: DEFAULT_RISK_WINDOW,
            rewards: RewardTable::default(),
        }
    }

    /// Sets the end-of-episode bonus.
    #[must_use]
    pub fn with_bonus(mut self, bonus: f64) -> Self {
        self.end_of_episode_bonus = bonus;
        self
    }

    /// Sets the risk window length.
    #[must_use]
    pub fn with_risk_window(mut self, risk_window: u32) -> Self {
        self.risk_window = risk_window;
        self
    }

    /// Replaces the contribution table.
    #[must_use]
    pub fn with_rewards(mut self, rewards: RewardTable) -> Self {
        self.rewards = rewards;
        self
    }
}

// ============================================================================
// Reward Table
// ============================================================================

/// Contribution of a single resolved attack event.
///
/// Blackout values apply when a blackout happens while the event is open;
/// natural values apply when the risk window elapses without one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewardTable {
    /// Blackout while open, alert was raised on time.
    #[serde(default = "RewardTable::default_blackout_alerted")]
    pub blackout_alerted: f64,

    /// Blackout while open, no alert.
    #[serde(default = "RewardTable::default_blackout_missed")]
    pub blackout_missed: f64,

    /// Window elapsed quietly, but an alert was raised (false alarm).
    #[serde(default = "RewardTable::default_natural_alerted")]
    pub natural_alerted: f64,

    /// Window elapsed quietly and no alert was raised.
    #[serde(default = "RewardTable::default_natural_silent")]
    pub natural_silent: f64,
}

impl RewardTable {
    const fn default_blackout_alerted() -> f64 {
        2.0
    }

    const fn default_blackout_missed() -> f64 {
        -10.0
    }

    const fn default_natural_alerted() -> f64 {
        -1.0
    }

    const fn default_natural_silent() -> f64 {
        1.0
    }

    /// Iterates over `(field name, value)` pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("blackout_alerted", self.blackout_alerted),
            ("blackout_missed", self.blackout_missed),
            ("natural_alerted", self.natural_alerted),
            ("natural_silent", self.natural_silent),
        ]
        .into_iter()
    }
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            blackout_alerted: Self::default_blackout_alerted(),
            blackout_missed: Self::default_blackout_missed(),
            natural_alerted: Self::default_natural_alerted(),
            natural_silent: Self::default_natural_silent(),
        }
    }
}
