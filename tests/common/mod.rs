//! Shared integration-test harness: runs the `alert-trust` binary and
//! builds scorers for the section-level behaviour tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

use alert_trust::config::ScoreConfig;
use alert_trust::engine::{AlertTrustScorer, StepInput};

/// The ten attackable lines used by the reference episodes.
pub const REFERENCE_LINES: [&str; 10] = [
    "62_58_180",
    "62_63_160",
    "48_50_136",
    "48_53_141",
    "41_48_131",
    "39_41_121",
    "43_44_125",
    "44_45_126",
    "34_35_110",
    "54_58_154",
];

/// Handle for running the compiled binary.
pub struct AlertTrustProcess;

impl AlertTrustProcess {
    /// Runs `alert-trust` with `args` and waits for it to exit.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command(args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_alert-trust"))
            .args(args)
            .env_remove("ALERT_TRUST_LOG_LEVEL")
            .env_remove("ALERT_TRUST_CONFIG")
            .env_remove("ALERT_TRUST_EVENTS_FILE")
            .output()
            .expect("failed to spawn alert-trust")
    }

    /// Absolute path of a file under `tests/fixtures`.
    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }
}

/// Reference configuration: ten lines, bonus 42, default window.
pub fn reference_config() -> ScoreConfig {
    ScoreConfig::new(REFERENCE_LINES).with_bonus(42.0)
}

/// A fresh scorer over [`reference_config`].
#[allow(clippy::missing_panics_doc)]
pub fn reference_scorer() -> AlertTrustScorer {
    AlertTrustScorer::new(reference_config()).expect("reference config is valid")
}

/// Feeds `steps` and returns every reward.
#[allow(clippy::missing_panics_doc)]
pub fn run_rewards(scorer: &mut AlertTrustScorer, steps: &[StepInput]) -> Vec<f64> {
    steps
        .iter()
        .map(|s| scorer.step(s).expect("step accepted").reward)
        .collect()
}

/// `n` quiet steps.
pub fn quiet(n: usize) -> Vec<StepInput> {
    vec![StepInput::quiet(); n]
}
