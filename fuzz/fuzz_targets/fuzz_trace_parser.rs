#![no_main]

use alert_trust::config::ConfigLimits;
use alert_trust::replay::EpisodeTrace;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        // Parsing and shape checks must never panic.
        if let Ok(trace) = EpisodeTrace::from_yaml(raw, "fuzz") {
            let limits = ConfigLimits {
                max_episode_steps: 10_000,
                ..ConfigLimits::default()
            };
            if trace.validate(&limits).is_ok() {
                let _ = trace.episode_steps().count();
            }
        }
    }
});
