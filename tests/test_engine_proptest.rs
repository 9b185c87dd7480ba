//! Property tests over random episodes on a three-line grid.

use std::collections::BTreeSet;

use alert_trust::config::ScoreConfig;
use alert_trust::engine::{AlertTrustScorer, LineId, StepInput, Termination};
use proptest::prelude::*;

const LINES: [&str; 3] = ["a", "b", "c"];

fn lines_from_mask(mask: u8) -> BTreeSet<LineId> {
    LINES
        .iter()
        .enumerate()
        .filter(|(i, _)| mask & (1 << i) != 0)
        .map(|(_, l)| LineId::from(*l))
        .collect()
}

fn termination() -> impl Strategy<Value = Termination> {
    prop_oneof![
        Just(Termination::NaturalEnd),
        Just(Termination::Blackout),
        Just(Termination::Other),
    ]
}

/// Random attack/alert masks ending with a random termination. Alerts are
/// always on attackable lines; attacks may re-rise while an event is open.
fn episode() -> impl Strategy<Value = Vec<StepInput>> {
    (
        prop::collection::vec((0u8..8, 0u8..8), 1..40),
        termination(),
    )
        .prop_map(|(masks, end)| {
            let mut steps: Vec<StepInput> = masks
                .into_iter()
                .map(|(attacked, alerted)| StepInput {
                    attacked: lines_from_mask(attacked),
                    alerted: lines_from_mask(alerted),
                    termination: None,
                })
                .collect();
            if let Some(last) = steps.last_mut() {
                last.termination = Some(end);
            }
            steps
        })
}

fn scorer(window: u32) -> AlertTrustScorer {
    AlertTrustScorer::new(
        ScoreConfig::new(LINES)
            .with_bonus(42.0)
            .with_risk_window(window),
    )
    .unwrap()
}

/// Per-step result: the reward, or `None` for a rejected step.
fn run(scorer: &mut AlertTrustScorer, steps: &[StepInput]) -> Vec<Option<f64>> {
    steps
        .iter()
        .map(|s| scorer.step(s).ok().map(|o| o.reward))
        .collect()
}

proptest! {
    #[test]
    fn replay_after_reset_is_deterministic(steps in episode(), window in 1u32..4) {
        let mut scorer = scorer(window);
        let first = run(&mut scorer, &steps);
        let first_summary = scorer.summary();
        scorer.reset();
        let second = run(&mut scorer, &steps);
        prop_assert_eq!(first, second);
        prop_assert_eq!(scorer.summary(), first_summary);
    }

    #[test]
    fn reward_is_zero_until_the_terminal_step(steps in episode(), window in 1u32..4) {
        let mut scorer = scorer(window);
        for input in &steps {
            let Ok(outcome) = scorer.step(input) else { continue };
            if outcome.done {
                prop_assert_eq!(outcome.reward, scorer.cumulated_reward());
            } else {
                prop_assert_eq!(outcome.reward, 0.0);
            }
        }
    }

    #[test]
    fn attack_counter_is_monotonic_and_counts_rising_edges(
        steps in episode(),
        window in 1u32..4,
    ) {
        let mut scorer = scorer(window);
        let mut previous: BTreeSet<LineId> = BTreeSet::new();
        let mut rising_edges = 0u64;
        let mut last_count = 0u64;

        for input in &steps {
            let before = scorer.summary();
            match scorer.step(input) {
                Ok(_) => {
                    rising_edges += input.attacked.difference(&previous).count() as u64;
                    previous.clone_from(&input.attacked);
                }
                // A rejected step changes nothing.
                Err(_) => prop_assert_eq!(scorer.summary(), before),
            }
            prop_assert!(scorer.total_nb_attacks() >= last_count);
            last_count = scorer.total_nb_attacks();
        }
        prop_assert_eq!(scorer.total_nb_attacks(), rising_edges);
    }

    #[test]
    fn no_attack_natural_end_reports_bonus(alerts in prop::collection::vec(0u8..8, 1..20)) {
        let mut scorer = scorer(2);
        let mut steps: Vec<StepInput> = alerts
            .into_iter()
            .map(|mask| StepInput { alerted: lines_from_mask(mask), ..StepInput::default() })
            .collect();
        if let Some(last) = steps.last_mut() {
            last.termination = Some(Termination::NaturalEnd);
        }
        let rewards = run(&mut scorer, &steps);
        prop_assert_eq!(rewards.last().copied().flatten(), Some(42.0));
    }
}
