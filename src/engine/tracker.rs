//! Attack event tracker
//!
//! Turns the per-step "lines under attack" signal into discrete attack
//! events. An event opens on the rising edge of a line's attack signal. A
//! line going quiet again does not close its event; only the resolver does.

use indexmap::IndexSet;

use super::event::{AttackEvent, LineId, OpenEvents};
use super::step::StepInput;
use crate::error::ScoreError;

/// Tracks which lines were under attack on the previous step.
#[derive(Debug, Clone)]
pub struct AttackTracker {
    lines: IndexSet<LineId>,
    was_attacked: Vec<bool>,
}

/// Changes the tracker will apply for one step, computed before anything
/// is mutated.
#[derive(Debug, Default)]
pub struct TrackerPlan {
    attacked: Vec<usize>,
    opening: Vec<(usize, bool)>,
}

impl TrackerPlan {
    /// Number of events this plan opens.
    #[must_use]
    pub fn opening_count(&self) -> usize {
        self.opening.len()
    }
}

impl AttackTracker {
    /// Creates a tracker for the given attackable lines.
    ///
    /// Each line's position in `lines` is its slot in the open-event arena.
    #[must_use]
    pub fn new(lines: IndexSet<LineId>) -> Self {
        let was_attacked = vec![false; lines.len()];
        Self {
            lines,
            was_attacked,
        }
    }

    /// Number of attackable lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Arena slot of `line`, if attackable.
    #[must_use]
    pub fn slot_of(&self, line: &str) -> Option<usize> {
        self.lines.get_index_of(line)
    }

    /// Checks `input` against the open events and computes what to change.
    ///
    /// # Errors
    ///
    /// - [`ScoreError::InvalidAlert`] for an alert on a non-attackable line
    /// - [`ScoreError::UnknownAttackedLine`] for an attack on a
    ///   non-attackable line
    /// - [`ScoreError::InconsistentState`] when a line starts a new attack
    ///   while its previous event is still open
    pub fn plan(
        &self,
        input: &StepInput,
        step: u64,
        open: &OpenEvents,
    ) -> Result<TrackerPlan, ScoreError> {
        if let Some(line) = input.alerted.iter().find(|l| self.slot_of(l.as_str()).is_none()) {
            return Err(ScoreError::InvalidAlert {
                line: line.clone(),
                step,
            });
        }

        let mut plan = TrackerPlan::default();
        for line in &input.attacked {
            let slot = self
                .slot_of(line.as_str())
                .ok_or_else(|| ScoreError::UnknownAttackedLine {
                    line: line.clone(),
                    step,
                })?;
            plan.attacked.push(slot);

            if self.was_attacked[slot] {
                continue;
            }
            if let Some(previous) = open.get(slot) {
                return Err(ScoreError::InconsistentState {
                    line: line.clone(),
                    step,
                    open_since: previous.activation_step,
                });
            }
            plan.opening.push((slot, input.alerted.contains(line)));
        }
        Ok(plan)
    }

    /// Applies a plan produced by [`plan`](Self::plan) for the same step.
    ///
    /// Returns the lines whose events were opened.
    pub fn commit(&mut self, plan: TrackerPlan, step: u64, open: &mut OpenEvents) -> Vec<LineId> {
        self.was_attacked.iter_mut().for_each(|a| *a = false);
        for slot in plan.attacked {
            self.was_attacked[slot] = true;
        }

        let mut opened = Vec::with_capacity(plan.opening.len());
        for (slot, alert_seen) in plan.opening {
            let Some(line) = self.lines.get_index(slot) else {
                continue;
            };
            let event = AttackEvent::new(line.clone(), step, alert_seen);
            if open.open(slot, event).is_ok() {
                opened.push(line.clone());
            }
        }
        opened
    }

    /// Forgets the previous step's attack signal.
    pub fn reset(&mut self) {
        self.was_attacked.iter_mut().for_each(|a| *a = false);
    }
}
