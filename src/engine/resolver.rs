//! Risk-window resolution of open attack events
//!
//! Every step, each open event either stays open (its age advances) or
//! resolves into a [`Resolution`]. A blackout resolves every open event in
//! blackout mode; otherwise an event whose age has reached the risk window
//! resolves in natural mode. Events resolving on the same step are averaged
//! into one aggregate contribution.

use serde::Serialize;

use super::event::{AttackEvent, OpenEvents};
use crate::config::RewardTable;

/// How an attack event was scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Resolution {
    /// The risk window elapsed without a blackout.
    Natural {
        /// Whether the event was alerted on its activation step.
        alerted: bool,
    },
    /// A blackout happened while the event was open.
    Blackout {
        /// Whether the event was alerted on its activation step.
        alerted: bool,
    },
}

impl Resolution {
    /// Natural-mode resolution of `event`.
    #[must_use]
    pub const fn natural(event: &AttackEvent) -> Self {
        Self::Natural {
            alerted: event.alert_seen,
        }
    }

    /// Blackout-mode resolution of `event`.
    #[must_use]
    pub const fn blackout(event: &AttackEvent) -> Self {
        Self::Blackout {
            alerted: event.alert_seen,
        }
    }

    /// Whether the event had been alerted.
    #[must_use]
    pub const fn alerted(self) -> bool {
        match self {
            Self::Natural { alerted } | Self::Blackout { alerted } => alerted,
        }
    }

    /// Mode label used in logs and metrics.
    #[must_use]
    pub const fn mode(self) -> &'static str {
        match self {
            Self::Natural { .. } => "natural",
            Self::Blackout { .. } => "blackout",
        }
    }

    /// Contribution of this resolution under `rewards`.
    #[must_use]
    pub const fn contribution(self, rewards: &RewardTable) -> f64 {
        match self {
            Self::Blackout { alerted: true } => rewards.blackout_alerted,
            Self::Blackout { alerted: false } => rewards.blackout_missed,
            Self::Natural { alerted: true } => rewards.natural_alerted,
            Self::Natural { alerted: false } => rewards.natural_silent,
        }
    }
}

/// An event that left the open set, with its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEvent {
    /// The event as it was when it resolved.
    pub event: AttackEvent,
    /// How it resolved.
    pub resolution: Resolution,
    /// Its individual contribution before averaging.
    pub contribution: f64,
}

impl ResolvedEvent {
    fn new(event: AttackEvent, resolution: Resolution, rewards: &RewardTable) -> Self {
        Self {
            contribution: resolution.contribution(rewards),
            event,
            resolution,
        }
    }
}

/// Advances every open event by one step.
///
/// Returns the events that resolved, in slot order. Events still open have
/// their age incremented.
pub fn resolve_step(
    open: &mut OpenEvents,
    blackout: bool,
    risk_window: u32,
    rewards: &RewardTable,
) -> Vec<ResolvedEvent> {
    let mut closing = Vec::new();
    for (slot, event) in open.iter_mut() {
        if blackout {
            closing.push((slot, Resolution::blackout(event)));
        } else if event.age >= risk_window {
            closing.push((slot, Resolution::natural(event)));
        } else {
            event.age += 1;
        }
    }

    closing
        .into_iter()
        .filter_map(|(slot, resolution)| {
            open.close(slot)
                .map(|event| ResolvedEvent::new(event, resolution, rewards))
        })
        .collect()
}

/// Resolves every remaining open event in natural mode.
///
/// Used when the episode ends without a blackout while events are still
/// inside their risk window.
pub fn flush(open: &mut OpenEvents, rewards: &RewardTable) -> Vec<ResolvedEvent> {
    let slots: Vec<usize> = open.iter().map(|(slot, _)| slot).collect();
    slots
        .into_iter()
        .filter_map(|slot| open.close(slot))
        .map(|event| {
            let resolution = Resolution::natural(&event);
            ResolvedEvent::new(event, resolution, rewards)
        })
        .collect()
}

/// Arithmetic mean of the contributions resolved on one step.
///
/// Returns `None` when nothing resolved.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(resolved: &[ResolvedEvent]) -> Option<f64> {
    if resolved.is_empty() {
        return None;
    }
    let total: f64 = resolved.iter().map(|r| r.contribution).sum();
    Some(total / resolved.len() as f64)
}
