#![no_main]

use alert_trust::config::ScoreConfig;
use alert_trust::engine::{AlertTrustScorer, StepInput, Termination};
use libfuzzer_sys::fuzz_target;

const LINES: [&str; 4] = ["a", "b", "c", "d"];

fn lines(mask: u8) -> impl Iterator<Item = &'static str> {
    LINES
        .iter()
        .enumerate()
        .filter(move |(i, _)| mask & (1 << i) != 0)
        .map(|(_, l)| *l)
}

// Each input byte is one step: low nibble attacked lines, high nibble
// alerted lines. The first byte picks the risk window.
fuzz_target!(|data: &[u8]| {
    let Some((&window, steps)) = data.split_first() else {
        return;
    };
    let config = ScoreConfig::new(LINES).with_risk_window(u32::from(window % 4) + 1);
    let Ok(mut scorer) = AlertTrustScorer::new(config) else {
        return;
    };

    let last = steps.len().saturating_sub(1);
    for (i, &byte) in steps.iter().enumerate() {
        let mut input = StepInput::quiet();
        for line in lines(byte & 0x0f) {
            input = input.attack(line);
        }
        for line in lines(byte >> 4) {
            input = input.alert(line);
        }
        if i == last {
            input = input.ending(if byte % 2 == 0 {
                Termination::Blackout
            } else {
                Termination::NaturalEnd
            });
        }

        let before = scorer.summary();
        match scorer.step(&input) {
            Ok(outcome) => {
                assert!(outcome.reward.is_finite());
                assert!(outcome.done || outcome.reward == 0.0);
            }
            Err(_) => assert_eq!(scorer.summary(), before),
        }
    }
});
