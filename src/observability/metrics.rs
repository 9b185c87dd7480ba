//! Metrics collection.
//!
//! Prometheus-compatible counters, gauges and histograms for the scoring
//! engine. Every label value comes from a closed set (resolution mode,
//! alerted flag, termination kind), so cardinality is bounded.

use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::engine::{Resolution, Termination};
use crate::error::AlertTrustError;

/// Handle to the installed recorder; set at most once per process.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the global Prometheus recorder.
///
/// No HTTP listener is started; the returned handle renders the current
/// values on demand. Calling this again returns the existing handle.
///
/// # Errors
///
/// Returns `AlertTrustError::Io` if the recorder cannot be installed, e.g.
/// because another recorder already owns the global slot.
pub fn init_metrics() -> Result<PrometheusHandle, AlertTrustError> {
    if let Some(handle) = METRICS_HANDLE.get() {
        tracing::debug!("metrics already initialized, reusing recorder");
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| AlertTrustError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(METRICS_HANDLE.get_or_init(|| handle).clone())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!(
        "alert_trust_attacks_total",
        "Total number of attack events opened"
    );
    describe_counter!(
        "alert_trust_resolutions_total",
        "Total number of attack events resolved, by mode and alert"
    );
    describe_counter!(
        "alert_trust_episodes_total",
        "Total number of episodes ended, by termination"
    );
    describe_histogram!(
        "alert_trust_final_reward",
        "Terminal reward reported per episode"
    );
    describe_gauge!(
        "alert_trust_open_events",
        "Attack events currently inside their risk window, across all scorers"
    );
}

/// Records a newly opened attack event.
pub fn record_attack_opened() {
    counter!("alert_trust_attacks_total").increment(1);
}

/// Records one resolved attack event.
pub fn record_resolution(resolution: Resolution) {
    let alerted = if resolution.alerted() { "true" } else { "false" };
    counter!(
        "alert_trust_resolutions_total",
        "mode" => resolution.mode(),
        "alerted" => alerted,
    )
    .increment(1);
}

/// Records the end of an episode and its terminal reward.
pub fn record_episode_end(termination: Termination, reward: f64) {
    counter!("alert_trust_episodes_total", "termination" => termination.label()).increment(1);
    histogram!("alert_trust_final_reward", "termination" => termination.label()).record(reward);
}

/// Adds `count` events to the open-events gauge.
///
/// The gauge is shared by every scorer in the process, so scorers only ever
/// move it by their own deltas.
#[allow(clippy::cast_precision_loss)]
pub fn open_events_added(count: usize) {
    if count > 0 {
        gauge!("alert_trust_open_events").increment(count as f64);
    }
}

/// Removes `count` events from the open-events gauge.
#[allow(clippy::cast_precision_loss)]
pub fn open_events_removed(count: usize) {
    if count > 0 {
        gauge!("alert_trust_open_events").decrement(count as f64);
    }
}
