//! Built-in scenarios
//!
//! Reference episodes embedded in the binary at compile time, each with its
//! expected outcome. `alert-trust replay --scenario <name>` runs one without
//! any file on disk.

use std::fmt;
use std::sync::LazyLock;

use crate::error::TraceError;
use crate::replay::EpisodeTrace;

// ============================================================================
// Types
// ============================================================================

/// A built-in scenario embedded in the binary.
pub struct BuiltinScenario {
    /// Unique identifier (kebab-case, e.g. "attack-alerted").
    pub name: &'static str,

    /// Short human-readable description.
    pub description: &'static str,

    /// How the episode ends.
    pub category: ScenarioCategory,

    /// Tags for filtering.
    pub tags: &'static [&'static str],

    /// Raw YAML trace (embedded at compile time).
    pub yaml: &'static str,
}

impl BuiltinScenario {
    /// Parses the embedded trace.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Parse`] if the embedded YAML is malformed.
    pub fn trace(&self) -> Result<EpisodeTrace, TraceError> {
        EpisodeTrace::from_yaml(self.yaml, self.name)
    }
}

/// Category for organizing built-in scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenarioCategory {
    /// The episode reaches its maximum duration.
    Natural,
    /// The episode ends with a blackout.
    Blackout,
}

impl ScenarioCategory {
    /// Returns the human-readable title-case label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Natural => "Natural end",
            Self::Blackout => "Blackout",
        }
    }

    /// Returns all category variants in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Natural, Self::Blackout]
    }
}

impl fmt::Display for ScenarioCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Natural => write!(f, "natural"),
            Self::Blackout => write!(f, "blackout"),
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Global registry of all built-in scenarios.
static BUILTIN_SCENARIOS: LazyLock<Vec<BuiltinScenario>> = LazyLock::new(|| {
    vec![
        // ── Natural end (order 1) ────────────────────────────
        BuiltinScenario {
            name: "quiet-episode",
            description: "No attack, no alert: only the bonus is reported",
            category: ScenarioCategory::Natural,
            tags: &["no-attack"],
            yaml: include_str!("../../scenarios/quiet-episode.yaml"),
        },
        BuiltinScenario {
            name: "alert-without-attack",
            description: "Alert with no attack behind it is ignored",
            category: ScenarioCategory::Natural,
            tags: &["no-attack", "alert-timing"],
            yaml: include_str!("../../scenarios/alert-without-attack.yaml"),
        },
        BuiltinScenario {
            name: "attack-not-alerted",
            description: "Unalerted attack resolves naturally for +1",
            category: ScenarioCategory::Natural,
            tags: &["single-attack"],
            yaml: include_str!("../../scenarios/attack-not-alerted.yaml"),
        },
        BuiltinScenario {
            name: "attack-alerted",
            description: "Alerted attack without blackout is a false alarm (-1)",
            category: ScenarioCategory::Natural,
            tags: &["single-attack"],
            yaml: include_str!("../../scenarios/attack-alerted.yaml"),
        },
        BuiltinScenario {
            name: "attack-alerted-too-late",
            description: "Alert one step after activation does not count",
            category: ScenarioCategory::Natural,
            tags: &["single-attack", "alert-timing"],
            yaml: include_str!("../../scenarios/attack-alerted-too-late.yaml"),
        },
        BuiltinScenario {
            name: "attack-alerted-too-early",
            description: "Alert one step before activation does not count",
            category: ScenarioCategory::Natural,
            tags: &["single-attack", "alert-timing"],
            yaml: include_str!("../../scenarios/attack-alerted-too-early.yaml"),
        },
        BuiltinScenario {
            name: "simultaneous-attacks-not-alerted",
            description: "Two same-step attacks, no alert, averaged",
            category: ScenarioCategory::Natural,
            tags: &["simultaneous"],
            yaml: include_str!("../../scenarios/simultaneous-attacks-not-alerted.yaml"),
        },
        BuiltinScenario {
            name: "simultaneous-attacks-one-alerted",
            description: "Two same-step attacks, one alerted, averaged to 0",
            category: ScenarioCategory::Natural,
            tags: &["simultaneous"],
            yaml: include_str!("../../scenarios/simultaneous-attacks-one-alerted.yaml"),
        },
        BuiltinScenario {
            name: "simultaneous-attacks-both-alerted",
            description: "Two same-step attacks, both alerted",
            category: ScenarioCategory::Natural,
            tags: &["simultaneous"],
            yaml: include_str!("../../scenarios/simultaneous-attacks-both-alerted.yaml"),
        },
        BuiltinScenario {
            name: "staggered-attacks-not-alerted",
            description: "Attacks one step apart are summed, not averaged",
            category: ScenarioCategory::Natural,
            tags: &["staggered"],
            yaml: include_str!("../../scenarios/staggered-attacks-not-alerted.yaml"),
        },
        BuiltinScenario {
            name: "staggered-attacks-both-alerted",
            description: "Attacks one step apart, both alerted",
            category: ScenarioCategory::Natural,
            tags: &["staggered"],
            yaml: include_str!("../../scenarios/staggered-attacks-both-alerted.yaml"),
        },
        BuiltinScenario {
            name: "staggered-attacks-first-alerted",
            description: "Attacks one step apart, first alerted",
            category: ScenarioCategory::Natural,
            tags: &["staggered"],
            yaml: include_str!("../../scenarios/staggered-attacks-first-alerted.yaml"),
        },
        BuiltinScenario {
            name: "staggered-attacks-second-alerted",
            description: "Attacks one step apart, second alerted",
            category: ScenarioCategory::Natural,
            tags: &["staggered"],
            yaml: include_str!("../../scenarios/staggered-attacks-second-alerted.yaml"),
        },
        // ── Blackout (order 2) ───────────────────────────────
        BuiltinScenario {
            name: "blackout-attack-not-alerted",
            description: "Blackout with an unalerted attack open (-10)",
            category: ScenarioCategory::Blackout,
            tags: &["single-attack"],
            yaml: include_str!("../../scenarios/blackout-attack-not-alerted.yaml"),
        },
        BuiltinScenario {
            name: "blackout-attack-alerted",
            description: "Blackout with an alerted attack open (+2)",
            category: ScenarioCategory::Blackout,
            tags: &["single-attack"],
            yaml: include_str!("../../scenarios/blackout-attack-alerted.yaml"),
        },
        BuiltinScenario {
            name: "blackout-attack-alerted-too-early",
            description: "Early alert does not avoid the blackout penalty",
            category: ScenarioCategory::Blackout,
            tags: &["single-attack", "alert-timing"],
            yaml: include_str!("../../scenarios/blackout-attack-alerted-too-early.yaml"),
        },
        BuiltinScenario {
            name: "blackout-simultaneous-both-alerted",
            description: "Blackout after two same-step alerted attacks",
            category: ScenarioCategory::Blackout,
            tags: &["simultaneous"],
            yaml: include_str!("../../scenarios/blackout-simultaneous-both-alerted.yaml"),
        },
        BuiltinScenario {
            name: "blackout-simultaneous-one-alerted",
            description: "Blackout after two same-step attacks, one alerted (-4)",
            category: ScenarioCategory::Blackout,
            tags: &["simultaneous"],
            yaml: include_str!("../../scenarios/blackout-simultaneous-one-alerted.yaml"),
        },
        BuiltinScenario {
            name: "blackout-staggered-both-alerted",
            description: "Staggered attacks both open at the blackout",
            category: ScenarioCategory::Blackout,
            tags: &["staggered"],
            yaml: include_str!("../../scenarios/blackout-staggered-both-alerted.yaml"),
        },
        BuiltinScenario {
            name: "blackout-staggered-first-alerted",
            description: "Blackout on the second attack's step, first alerted",
            category: ScenarioCategory::Blackout,
            tags: &["staggered"],
            yaml: include_str!("../../scenarios/blackout-staggered-first-alerted.yaml"),
        },
        BuiltinScenario {
            name: "blackout-staggered-second-alerted",
            description: "Blackout after the second attack, second alerted",
            category: ScenarioCategory::Blackout,
            tags: &["staggered"],
            yaml: include_str!("../../scenarios/blackout-staggered-second-alerted.yaml"),
        },
        BuiltinScenario {
            name: "blackout-after-window",
            description: "Expired attack scores naturally, open one in blackout mode",
            category: ScenarioCategory::Blackout,
            tags: &["staggered", "risk-window"],
            yaml: include_str!("../../scenarios/blackout-after-window.yaml"),
        },
        BuiltinScenario {
            name: "blackout-no-attack",
            description: "Blackout with no attack reports 0",
            category: ScenarioCategory::Blackout,
            tags: &["no-attack"],
            yaml: include_str!("../../scenarios/blackout-no-attack.yaml"),
        },
        BuiltinScenario {
            name: "blackout-alert-without-attack",
            description: "Blackout with an alert but no attack reports 0",
            category: ScenarioCategory::Blackout,
            tags: &["no-attack", "alert-timing"],
            yaml: include_str!("../../scenarios/blackout-alert-without-attack.yaml"),
        },
    ]
});

// ============================================================================
// Public API
// ============================================================================

/// Look up a scenario by exact name.
#[must_use]
pub fn find_scenario(name: &str) -> Option<&'static BuiltinScenario> {
    BUILTIN_SCENARIOS.iter().find(|s| s.name == name)
}

/// Look up a scenario and parse its trace.
///
/// # Errors
///
/// Returns [`TraceError::UnknownScenario`], with the closest name as a
/// suggestion, when `name` is not registered.
pub fn load_scenario(name: &str) -> Result<EpisodeTrace, TraceError> {
    find_scenario(name)
        .ok_or_else(|| TraceError::UnknownScenario {
            name: name.to_string(),
            suggestion: suggest_scenario(name),
        })?
        .trace()
}

/// List all scenarios, optionally filtered by category and/or tag.
#[must_use]
pub fn list_scenarios(
    category: Option<ScenarioCategory>,
    tag: Option<&str>,
) -> Vec<&'static BuiltinScenario> {
    BUILTIN_SCENARIOS
        .iter()
        .filter(|s| category.is_none_or(|c| s.category == c))
        .filter(|s| tag.is_none_or(|t| s.tags.contains(&t)))
        .collect()
}

/// Suggest a similar scenario name for typo correction.
///
/// Returns the closest match if its Damerau-Levenshtein distance is ≤ 3.
#[must_use]
pub fn suggest_scenario(input: &str) -> Option<String> {
    BUILTIN_SCENARIOS
        .iter()
        .map(|s| (s.name, strsim::damerau_levenshtein(input, s.name)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by_key(|(_, dist)| *dist)
        .map(|(name, _)| name.to_string())
}

/// Returns all scenario names in registry order.
#[must_use]
pub fn list_scenario_names() -> Vec<&'static str> {
    BUILTIN_SCENARIOS.iter().map(|s| s.name).collect()
}

// ============================================================================
// Tests
// ============================================================================
