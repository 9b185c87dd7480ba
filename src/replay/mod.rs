//! Episode traces and their replay
//!
//! Recorded episodes are replayed offline through a fresh scorer, which is
//! how reference behaviours are checked and how scoring changes are
//! compared across versions.

pub mod runner;
pub mod trace;

pub use runner::{EpisodeReport, replay, scorer_for};
pub use trace::{EpisodeTrace, Expectation};
