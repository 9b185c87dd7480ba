//! `alert-trust` - Alert trust scoring for power-grid alert agents
//!
//! This library scores how well an agent anticipates attacks on power
//! lines: it tracks attack events through a short risk window, scores each
//! one by whether it was alerted and whether a blackout followed, and
//! reports the accumulated score only when the episode ends.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod observability;
pub mod replay;
pub mod scenarios;
