//! Episode aggregation and terminal reporting

use serde::Serialize;

use super::step::Termination;

/// Running totals for one episode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeState {
    /// Index of the next step to process.
    pub step: u64,
    /// Sum of per-step aggregates, plus the bonus once ended naturally.
    pub cumulated_score: f64,
    /// Distinct attack events created so far.
    pub total_attack_count: u64,
    /// How and when the episode ended.
    pub ended: Option<(Termination, u64)>,
}

impl EpisodeState {
    /// Adds one step's aggregate contribution.
    pub fn accumulate(&mut self, aggregate: Option<f64>) {
        if let Some(value) = aggregate {
            self.cumulated_score += value;
        }
    }

    /// Marks the episode ended at the current step and returns the
    /// terminal reward.
    ///
    /// A natural end folds `bonus` into the running score; blackout and
    /// other ends report the score as is.
    pub fn finish(&mut self, termination: Termination, bonus: f64) -> f64 {
        if termination == Termination::NaturalEnd {
            self.cumulated_score += bonus;
        }
        self.ended = Some((termination, self.step));
        self.cumulated_score
    }

    /// Whether the episode has ended.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.ended.is_some()
    }

    /// Whether the episode ended with a blackout.
    #[must_use]
    pub fn terminated_by_blackout(&self) -> bool {
        matches!(self.ended, Some((Termination::Blackout, _)))
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn summary(&self) -> EpisodeSummary {
        EpisodeSummary {
            steps: self.step,
            total_nb_attacks: self.total_attack_count,
            cumulated_reward: self.cumulated_score,
            termination: self.ended.map(|(t, _)| t),
        }
    }
}

/// Read-only view of an episode's counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSummary {
    /// Steps processed.
    pub steps: u64,
    /// Distinct attack events created.
    pub total_nb_attacks: u64,
    /// Running score (final reward once ended).
    pub cumulated_reward: f64,
    /// How the episode ended, if it has.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination: Option<Termination>,
}

impl std::fmt::Display for EpisodeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "steps={} attacks={} cumulated_reward={}",
            self.steps, self.total_nb_attacks, self.cumulated_reward,
        )?;
        if let Some(termination) = self.termination {
            write!(f, " termination={termination}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_resolution_keeps_score() {
        let mut state = EpisodeState::default();
        state.accumulate(None);
        assert_eq!(state.cumulated_score, 0.0);
        state.accumulate(Some(-4.0));
        state.accumulate(Some(1.0));
        assert_eq!(state.cumulated_score, -3.0);
    }

    #[test]
    fn natural_end_adds_bonus() {
        let mut state = EpisodeState {
            step: 9,
            cumulated_score: 1.0,
            ..EpisodeState::default()
        };
        assert_eq!(state.finish(Termination::NaturalEnd, 42.0), 43.0);
        assert_eq!(state.cumulated_score, 43.0);
        assert_eq!(state.ended, Some((Termination::NaturalEnd, 9)));
        assert!(!state.terminated_by_blackout());
    }

    #[test]
    fn blackout_and_other_skip_bonus() {
        let mut state = EpisodeState {
            cumulated_score: -10.0,
            ..EpisodeState::default()
        };
        assert_eq!(state.finish(Termination::Blackout, 42.0), -10.0);
        assert!(state.terminated_by_blackout());

        let mut state = EpisodeState::default();
        assert_eq!(state.finish(Termination::Other, 42.0), 0.0);
        assert!(state.is_terminated());
    }

    #[test]
    fn summary_reflects_counters() {
        let state = EpisodeState {
            step: 5,
            cumulated_score: 2.0,
            total_attack_count: 3,
            ended: Some((Termination::Blackout, 4)),
        };
        let summary = state.summary();
        assert_eq!(summary.steps, 5);
        assert_eq!(summary.total_nb_attacks, 3);
        assert_eq!(summary.termination, Some(Termination::Blackout));
        assert_eq!(
            summary.to_string(),
            "steps=5 attacks=3 cumulated_reward=2 termination=blackout"
        );
    }
}
