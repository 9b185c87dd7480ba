//! Alert trust scorer orchestration
//!
//! The [`AlertTrustScorer`] owns one episode's worth of state and is driven
//! once per environment step: the tracker opens new events, the resolver
//! closes finished ones, and the episode aggregator turns their averaged
//! contributions into a terminal-only reward.

use std::sync::Arc;

use indexmap::IndexSet;
use tracing::{debug, info, warn};

use crate::config::{ConfigLimits, ScoreConfig, Validator};
use crate::error::ScoreError;
use crate::observability::metrics;

use super::episode::{EpisodeState, EpisodeSummary};
use super::event::{LineId, OpenEvents};
use super::resolver;
use super::step::{StepInput, StepOutcome, Termination};
use super::tracker::AttackTracker;

/// Scoring state machine for one episode at a time.
///
/// Coordinates:
/// - Rising-edge detection of attacks into attack events
/// - Per-step risk-window resolution (blackout or natural)
/// - Same-step averaging and cross-step summation of contributions
/// - Terminal-only reward reporting
///
/// Instances share nothing but their configuration, so any number of
/// episodes can be scored side by side.
#[derive(Debug)]
pub struct AlertTrustScorer {
    config: Arc<ScoreConfig>,
    tracker: AttackTracker,
    open: OpenEvents,
    episode: EpisodeState,
}

impl AlertTrustScorer {
    /// Creates a scorer, validating `config` first.
    ///
    /// Validation warnings are logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError::Configuration`] listing every validation error.
    pub fn new(config: impl Into<Arc<ScoreConfig>>) -> Result<Self, ScoreError> {
        let config = config.into();
        let result = Validator::new().validate(&config, &ConfigLimits::default());
        if result.has_errors() {
            return Err(ScoreError::Configuration(result.errors));
        }
        for issue in &result.warnings {
            warn!(path = %issue.path, "{}", issue.message);
        }

        let lines: IndexSet<LineId> = config.attackable_lines.iter().cloned().collect();
        let open = OpenEvents::with_slots(lines.len());
        debug!(
            lines = lines.len(),
            risk_window = config.risk_window,
            bonus = config.end_of_episode_bonus,
            "alert trust scorer created"
        );

        Ok(Self {
            tracker: AttackTracker::new(lines),
            open,
            episode: EpisodeState::default(),
            config,
        })
    }

    /// Starts a new episode, discarding all per-episode state.
    pub fn reset(&mut self) {
        metrics::open_events_removed(self.open.len());
        self.tracker.reset();
        self.open.clear();
        self.episode = EpisodeState::default();
        debug!("episode reset");
    }

    /// Processes one environment step.
    ///
    /// The input is checked in full before any state changes, so an error
    /// leaves the scorer exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`ScoreError::EpisodeFinished`] if the episode already ended
    /// - [`ScoreError::InvalidAlert`], [`ScoreError::UnknownAttackedLine`]
    ///   or [`ScoreError::InconsistentState`] for inputs that break the
    ///   tracker's contract
    pub fn step(&mut self, input: &StepInput) -> Result<StepOutcome, ScoreError> {
        if let Some((_, ended_at)) = self.episode.ended {
            return Err(ScoreError::EpisodeFinished { step: ended_at });
        }
        let step = self.episode.step;
        let plan = self.tracker.plan(input, step, &self.open)?;

        let opened = self.tracker.commit(plan, step, &mut self.open);
        self.episode.total_attack_count += opened.len() as u64;
        metrics::open_events_added(opened.len());
        for line in &opened {
            debug!(line = %line, step, alerted = input.alerted.contains(line), "attack event opened");
            metrics::record_attack_opened();
        }

        let blackout = input.termination == Some(Termination::Blackout);
        let mut resolved = resolver::resolve_step(
            &mut self.open,
            blackout,
            self.config.risk_window,
            &self.config.rewards,
        );
        if input.is_terminal() && !blackout {
            resolved.extend(resolver::flush(&mut self.open, &self.config.rewards));
        }
        for r in &resolved {
            debug!(
                line = %r.event.line,
                activated = r.event.activation_step,
                step,
                mode = r.resolution.mode(),
                contribution = r.contribution,
                "attack event resolved"
            );
            metrics::record_resolution(r.resolution);
        }
        metrics::open_events_removed(resolved.len());

        let aggregate = resolver::aggregate(&resolved);
        self.episode.accumulate(aggregate);

        let reward = match input.termination {
            Some(termination) => {
                let reward = self
                    .episode
                    .finish(termination, self.config.end_of_episode_bonus);
                info!(
                    step,
                    termination = %termination,
                    reward,
                    total_nb_attacks = self.episode.total_attack_count,
                    "episode ended"
                );
                metrics::record_episode_end(termination, reward);
                reward
            }
            None => 0.0,
        };
        self.episode.step += 1;

        Ok(StepOutcome {
            step,
            reward,
            done: input.is_terminal(),
            opened,
            resolved,
            aggregate,
        })
    }

    /// Running score, including the bonus once the episode ended naturally.
    #[must_use]
    pub const fn cumulated_reward(&self) -> f64 {
        self.episode.cumulated_score
    }

    /// Distinct attack events created this episode.
    #[must_use]
    pub const fn total_nb_attacks(&self) -> u64 {
        self.episode.total_attack_count
    }

    /// Index of the next step to process.
    #[must_use]
    pub const fn current_step(&self) -> u64 {
        self.episode.step
    }

    /// Whether the episode has ended.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.episode.is_terminated()
    }

    /// Whether the episode ended with a blackout.
    #[must_use]
    pub fn terminated_by_blackout(&self) -> bool {
        self.episode.terminated_by_blackout()
    }

    /// How the episode ended, if it has.
    #[must_use]
    pub fn termination(&self) -> Option<Termination> {
        self.episode.ended.map(|(t, _)| t)
    }

    /// Currently open attack events.
    #[must_use]
    pub const fn open_events(&self) -> &OpenEvents {
        &self.open
    }

    /// Snapshot of the episode counters.
    #[must_use]
    pub fn summary(&self) -> EpisodeSummary {
        self.episode.summary()
    }

    /// Configuration this scorer was built with.
    #[must_use]
    pub const fn config(&self) -> &Arc<ScoreConfig> {
        &self.config
    }
}

impl Clone for AlertTrustScorer {
    fn clone(&self) -> Self {
        metrics::open_events_added(self.open.len());
        Self {
            config: Arc::clone(&self.config),
            tracker: self.tracker.clone(),
            open: self.open.clone(),
            episode: self.episode.clone(),
        }
    }
}

impl Drop for AlertTrustScorer {
    fn drop(&mut self) {
        metrics::open_events_removed(self.open.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> AlertTrustScorer {
        AlertTrustScorer::new(ScoreConfig::new(["a", "b", "c"]).with_bonus(42.0)).unwrap()
    }

    fn run(scorer: &mut AlertTrustScorer, steps: &[StepInput]) -> Vec<f64> {
        steps
            .iter()
            .map(|s| scorer.step(s).unwrap().reward)
            .collect()
    }

    fn quiet(n: usize) -> Vec<StepInput> {
        vec![StepInput::quiet(); n]
    }

    #[test]
    fn invalid_config_rejected() {
        let err = AlertTrustScorer::new(ScoreConfig::new(Vec::<String>::new())).unwrap_err();
        assert!(matches!(err, ScoreError::Configuration(ref issues) if !issues.is_empty()));
    }

    #[test]
    fn no_attack_natural_end_reports_bonus() {
        let mut scorer = scorer();
        let mut steps = quiet(9);
        steps.push(StepInput::quiet().natural_end());
        let rewards = run(&mut scorer, &steps);
        assert!(rewards[..9].iter().all(|r| *r == 0.0));
        assert_eq!(rewards[9], 42.0);
        assert_eq!(scorer.total_nb_attacks(), 0);
    }

    #[test]
    fn attack_resolves_naturally_after_window() {
        let mut scorer = scorer();
        scorer.step(&StepInput::quiet().attack("a").alert("a")).unwrap();
        assert!(scorer.step(&StepInput::quiet()).unwrap().resolved.is_empty());
        let outcome = scorer.step(&StepInput::quiet()).unwrap();
        assert_eq!(outcome.aggregate, Some(-1.0));
        assert_eq!(outcome.reward, 0.0);
        assert_eq!(scorer.cumulated_reward(), -1.0);
        assert!(scorer.open_events().is_empty());
    }

    #[test]
    fn blackout_on_activation_step_resolves_in_blackout_mode() {
        let mut scorer = scorer();
        let outcome = scorer
            .step(&StepInput::quiet().attack("a").attack("b").alert("a").blackout())
            .unwrap();
        assert_eq!(outcome.opened.len(), 2);
        assert_eq!(outcome.resolved.len(), 2);
        assert_eq!(outcome.reward, -4.0);
        assert!(outcome.done);
        assert!(scorer.terminated_by_blackout());
    }

    #[test]
    fn natural_end_flushes_open_events() {
        let mut scorer = scorer();
        scorer.step(&StepInput::quiet().attack("a")).unwrap();
        let outcome = scorer.step(&StepInput::quiet().natural_end()).unwrap();
        assert_eq!(outcome.aggregate, Some(1.0));
        assert_eq!(outcome.reward, 43.0);
        assert_eq!(scorer.cumulated_reward(), 43.0);
    }

    #[test]
    fn flushed_and_expiring_events_share_one_average() {
        let mut scorer = scorer();
        scorer.step(&StepInput::quiet().attack("a")).unwrap();
        scorer.step(&StepInput::quiet().attack("b")).unwrap();
        let outcome = scorer.step(&StepInput::quiet().natural_end()).unwrap();
        assert_eq!(outcome.resolved.len(), 2);
        assert_eq!(outcome.aggregate, Some(1.0));
        assert_eq!(outcome.reward, 43.0);
    }

    #[test]
    fn other_termination_has_no_bonus() {
        let mut scorer = scorer();
        scorer.step(&StepInput::quiet().attack("a")).unwrap();
        let outcome = scorer
            .step(&StepInput::quiet().ending(Termination::Other))
            .unwrap();
        assert_eq!(outcome.reward, 1.0);
        assert!(!scorer.terminated_by_blackout());
    }

    #[test]
    fn step_after_end_is_rejected() {
        let mut scorer = scorer();
        scorer.step(&StepInput::quiet().blackout()).unwrap();
        let err = scorer.step(&StepInput::quiet()).unwrap_err();
        assert_eq!(err, ScoreError::EpisodeFinished { step: 0 });
    }

    #[test]
    fn failed_step_leaves_state_untouched() {
        let mut scorer = scorer();
        scorer.step(&StepInput::quiet().attack("a")).unwrap();
        let before = scorer.clone();
        let err = scorer
            .step(&StepInput::quiet().attack("b").alert("nope"))
            .unwrap_err();
        assert!(matches!(err, ScoreError::InvalidAlert { .. }));
        assert_eq!(scorer.current_step(), before.current_step());
        assert_eq!(scorer.total_nb_attacks(), 1);
        assert_eq!(scorer.open_events().get(0), before.open_events().get(0));
        assert!(scorer.open_events().get(1).is_none());
    }

    #[test]
    fn reset_clears_episode() {
        let mut scorer = scorer();
        scorer.step(&StepInput::quiet().attack("a").blackout()).unwrap();
        scorer.reset();
        assert!(!scorer.is_terminated());
        assert_eq!(scorer.cumulated_reward(), 0.0);
        assert_eq!(scorer.total_nb_attacks(), 0);
        assert_eq!(scorer.current_step(), 0);
        assert!(scorer.open_events().is_empty());
        scorer.step(&StepInput::quiet().attack("a")).unwrap();
        assert_eq!(scorer.total_nb_attacks(), 1);
    }
}
