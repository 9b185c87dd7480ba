//! Alert trust scoring engine
//!
//! A windowed, multi-event temporal scoring state machine. Each step the
//! engine receives the lines under attack, the lines alerted, and whether
//! (and how) the episode ends. It reports `0` on every non-terminal step and
//! the accumulated score on the terminal one.
//!
//! Data flows one way per step:
//!
//! ```text
//! StepInput -> AttackTracker -> resolver -> EpisodeState -> reward
//! ```
//!
//! - [`tracker`]: rising-edge detection into [`AttackEvent`]s
//! - [`resolver`]: blackout or natural [`Resolution`] of open events, and
//!   same-step averaging
//! - [`episode`]: running score and terminal reporting
//! - [`scorer`]: the [`AlertTrustScorer`] tying them together
//! - [`batch`]: lockstep scoring of several episodes

pub mod batch;
pub mod episode;
pub mod event;
pub mod resolver;
pub mod scorer;
pub mod step;
pub mod tracker;

pub use batch::ScorerBatch;
pub use episode::{EpisodeState, EpisodeSummary};
pub use event::{AttackEvent, LineId, OpenEvents};
pub use resolver::{Resolution, ResolvedEvent};
pub use scorer::AlertTrustScorer;
pub use step::{StepInput, StepOutcome, Termination};
pub use tracker::AttackTracker;
