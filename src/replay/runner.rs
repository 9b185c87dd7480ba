//! Trace replay driver
//!
//! Feeds a trace through an [`AlertTrustScorer`], mirrors what happens onto
//! the event stream, and collects an [`EpisodeReport`].

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{ConfigLimits, ConfigLoader, LoadWarning, ScoreConfig};
use crate::engine::{AlertTrustScorer, LineId, StepOutcome, Termination};
use crate::error::{AlertTrustError, TraceError};
use crate::observability::{Event, EventEmitter};

use super::trace::{EpisodeTrace, Expectation};

/// Tolerance when comparing rewards against an expectation.
const REWARD_TOLERANCE: f64 = 1e-9;

/// Outcome of replaying one trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeReport {
    /// Trace name.
    pub name: String,
    /// Reward reported on every step.
    pub rewards: Vec<f64>,
    /// Reward reported on the terminal step.
    pub final_reward: f64,
    /// Running score at the end of the episode.
    pub cumulated_reward: f64,
    /// Distinct attack events created.
    pub total_nb_attacks: u64,
    /// How the episode ended.
    pub termination: Option<Termination>,
    /// Per-step details.
    pub steps: Vec<StepOutcome>,
}

impl EpisodeReport {
    /// Compares the report with `expect`.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::ExpectationMismatch`] naming every field that
    /// differs.
    pub fn check(&self, expect: &Expectation) -> Result<(), TraceError> {
        let mut details = String::new();
        if let Some(expected) = expect.final_reward {
            if (self.final_reward - expected).abs() > REWARD_TOLERANCE {
                let _ = write!(
                    details,
                    "final_reward: expected {expected}, got {}; ",
                    self.final_reward
                );
            }
        }
        if let Some(expected) = expect.total_nb_attacks {
            if self.total_nb_attacks != expected {
                let _ = write!(
                    details,
                    "total_nb_attacks: expected {expected}, got {}; ",
                    self.total_nb_attacks
                );
            }
        }
        if let Some(expected) = expect.termination {
            if self.termination != Some(expected) {
                let got = self.termination.map_or("none", Termination::label);
                let _ = write!(details, "termination: expected {expected}, got {got}; ");
            }
        }

        if details.is_empty() {
            Ok(())
        } else {
            Err(TraceError::ExpectationMismatch {
                name: self.name.clone(),
                details: details.trim_end_matches("; ").to_string(),
            })
        }
    }
}

/// Picks the configuration for a trace and builds a scorer from it.
///
/// `override_config` (typically from `--config`) wins over the trace's own
/// block. The trace's block goes through the same validation as a file.
///
/// # Errors
///
/// Returns [`TraceError::MissingConfig`] when neither is available, or a
/// configuration error if the trace's block is invalid.
pub fn scorer_for(
    trace: &EpisodeTrace,
    override_config: Option<Arc<ScoreConfig>>,
    loader: &ConfigLoader,
) -> Result<(AlertTrustScorer, Vec<LoadWarning>), AlertTrustError> {
    let mut warnings = Vec::new();
    let config = match (override_config, &trace.config) {
        (Some(config), _) => config,
        (None, Some(embedded)) => {
            loader.validate(embedded.clone(), &trace.name, &mut warnings)?
        }
        (None, None) => return Err(TraceError::MissingConfig(trace.name.clone()).into()),
    };
    Ok((AlertTrustScorer::new(config)?, warnings))
}

/// Replays `trace` through `scorer` from a fresh episode.
///
/// Does not check the trace's expectation; see [`EpisodeReport::check`].
///
/// # Errors
///
/// Returns a trace error if the trace is malformed, or the scorer's error
/// for the first step it rejects.
pub fn replay(
    trace: &EpisodeTrace,
    scorer: &mut AlertTrustScorer,
    emitter: &EventEmitter,
) -> Result<EpisodeReport, AlertTrustError> {
    trace.validate(&ConfigLimits::default())?;
    scorer.reset();

    let config = Arc::clone(scorer.config());
    emitter.emit(Event::EpisodeStarted {
        timestamp: Utc::now(),
        episode: trace.name.clone(),
        attackable_lines: config.attackable_lines.len(),
        risk_window: config.risk_window,
        end_of_episode_bonus: config.end_of_episode_bonus,
    });

    let mut steps = Vec::new();
    for input in trace.episode_steps() {
        let outcome = scorer.step(&input).inspect_err(|e| {
            warn!(trace = %trace.name, error = %e, "replay stopped");
        })?;
        emit_outcome(emitter, &input.alerted, &outcome, scorer);
        steps.push(outcome);
    }
    emitter.flush();

    let summary = scorer.summary();
    let report = EpisodeReport {
        name: trace.name.clone(),
        rewards: steps.iter().map(|s| s.reward).collect(),
        final_reward: steps.last().map_or(0.0, |s| s.reward),
        cumulated_reward: summary.cumulated_reward,
        total_nb_attacks: summary.total_nb_attacks,
        termination: summary.termination,
        steps,
    };
    info!(
        trace = %report.name,
        final_reward = report.final_reward,
        total_nb_attacks = report.total_nb_attacks,
        "replay finished"
    );
    Ok(report)
}

fn emit_outcome(
    emitter: &EventEmitter,
    alerted: &BTreeSet<LineId>,
    outcome: &StepOutcome,
    scorer: &AlertTrustScorer,
) {
    for line in &outcome.opened {
        emitter.emit(Event::AttackOpened {
            timestamp: Utc::now(),
            step: outcome.step,
            line: line.clone(),
            alerted: alerted.contains(line),
        });
    }
    if let Some(aggregate) = outcome.aggregate {
        emitter.emit(Event::EventsResolved {
            timestamp: Utc::now(),
            step: outcome.step,
            resolved: outcome.resolved.clone(),
            aggregate,
        });
    }
    if let (true, Some(termination)) = (outcome.done, scorer.termination()) {
        emitter.emit(Event::EpisodeEnded {
            timestamp: Utc::now(),
            step: outcome.step,
            termination,
            reward: outcome.reward,
            summary: scorer.summary(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::ScoreError;

    #[derive(Clone, Default)]
    struct TestWriter(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn trace(raw: &str) -> EpisodeTrace {
        EpisodeTrace::from_yaml(raw, "test").unwrap()
    }

    fn run(raw: &str) -> Result<EpisodeReport, AlertTrustError> {
        let trace = trace(raw);
        let (mut scorer, _) = scorer_for(&trace, None, &ConfigLoader::with_defaults())?;
        replay(&trace, &mut scorer, &EventEmitter::noop())
    }

    const ALERTED_THEN_NATURAL: &str = r"
name: alerted
config:
  attackable_lines: [a, b]
  end_of_episode_bonus: 42
max_episode_duration: 6
steps:
  - {}
  - { attacked: [a], alerted: [a] }
expect:
  final_reward: 41
  total_nb_attacks: 1
";

    #[test]
    fn replays_with_embedded_config() {
        let report = run(ALERTED_THEN_NATURAL).unwrap();
        assert_eq!(report.rewards, [0.0, 0.0, 0.0, 0.0, 0.0, 41.0]);
        assert_eq!(report.final_reward, 41.0);
        assert_eq!(report.cumulated_reward, 41.0);
        assert_eq!(report.total_nb_attacks, 1);
        assert_eq!(report.termination, Some(Termination::NaturalEnd));
        let trace = trace(ALERTED_THEN_NATURAL);
        assert!(report.check(trace.expect.as_ref().unwrap()).is_ok());
    }

    #[test]
    fn override_config_wins() {
        let trace = trace(ALERTED_THEN_NATURAL);
        let config = Arc::new(ScoreConfig::new(["a"]).with_bonus(0.0));
        let (mut scorer, _) =
            scorer_for(&trace, Some(config), &ConfigLoader::with_defaults()).unwrap();
        let report = replay(&trace, &mut scorer, &EventEmitter::noop()).unwrap();
        assert_eq!(report.final_reward, -1.0);
    }

    #[test]
    fn missing_config_reported() {
        let trace = trace("name: bare\nsteps:\n  - { end: natural }\n");
        let err = scorer_for(&trace, None, &ConfigLoader::with_defaults()).unwrap_err();
        assert!(matches!(err, AlertTrustError::Trace(TraceError::MissingConfig(_))));
    }

    #[test]
    fn mismatch_lists_every_field() {
        let report = run(ALERTED_THEN_NATURAL).unwrap();
        let expect = Expectation {
            final_reward: Some(40.0),
            total_nb_attacks: Some(2),
            termination: Some(Termination::Blackout),
        };
        let err = report.check(&expect).unwrap_err();
        let TraceError::ExpectationMismatch { details, .. } = err else {
            panic!("expected mismatch");
        };
        assert!(details.contains("final_reward: expected 40, got 41"));
        assert!(details.contains("total_nb_attacks"));
        assert!(details.contains("termination: expected blackout, got natural"));
    }

    #[test]
    fn scorer_errors_propagate() {
        let err = run(
            "name: bad\nconfig:\n  attackable_lines: [a]\nsteps:\n  - { alerted: [zz], end: natural }\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AlertTrustError::Score(ScoreError::InvalidAlert { step: 0, .. })
        ));
    }

    #[test]
    fn replay_twice_is_identical() {
        let trace = trace(ALERTED_THEN_NATURAL);
        let (mut scorer, _) = scorer_for(&trace, None, &ConfigLoader::with_defaults()).unwrap();
        let first = replay(&trace, &mut scorer, &EventEmitter::noop()).unwrap();
        let second = replay(&trace, &mut scorer, &EventEmitter::noop()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn events_follow_the_episode() {
        let writer = TestWriter::default();
        let emitter = EventEmitter::new(Box::new(writer.clone()));
        let trace = trace(ALERTED_THEN_NATURAL);
        let (mut scorer, _) = scorer_for(&trace, None, &ConfigLoader::with_defaults()).unwrap();
        replay(&trace, &mut scorer, &emitter).unwrap();

        let raw = String::from_utf8(writer.0.lock().unwrap().clone()).unwrap();
        let types: Vec<String> = raw
            .lines()
            .map(|l| {
                let v: serde_json::Value = serde_json::from_str(l).unwrap();
                v["type"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(
            types,
            ["EpisodeStarted", "AttackOpened", "EventsResolved", "EpisodeEnded"]
        );
    }
}
