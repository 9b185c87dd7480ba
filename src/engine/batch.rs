//! Lockstep scoring of several independent episodes
//!
//! Vectorized evaluation runs N environments side by side. Each gets its
//! own [`AlertTrustScorer`]; only the configuration is shared.

use std::sync::Arc;

use crate::config::ScoreConfig;
use crate::error::ScoreError;

use super::scorer::AlertTrustScorer;
use super::step::{StepInput, StepOutcome};

/// A fixed-size set of scorers sharing one configuration.
#[derive(Debug, Clone)]
pub struct ScorerBatch {
    scorers: Vec<AlertTrustScorer>,
}

impl ScorerBatch {
    /// Creates `n` scorers for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError::Configuration`] if `config` is invalid.
    pub fn new(config: impl Into<Arc<ScoreConfig>>, n: usize) -> Result<Self, ScoreError> {
        let first = AlertTrustScorer::new(config)?;
        Ok(Self {
            scorers: vec![first; n],
        })
    }

    /// Number of scorers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scorers.len()
    }

    /// Whether the batch holds no scorers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scorers.is_empty()
    }

    /// Scorer at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&AlertTrustScorer> {
        self.scorers.get(index)
    }

    /// Resets every scorer.
    pub fn reset_all(&mut self) {
        self.scorers.iter_mut().for_each(AlertTrustScorer::reset);
    }

    /// Resets one scorer, e.g. when its environment auto-resets.
    ///
    /// Returns `false` if `index` is out of range.
    pub fn reset(&mut self, index: usize) -> bool {
        self.scorers.get_mut(index).map(AlertTrustScorer::reset).is_some()
    }

    /// Steps every scorer with its own input.
    ///
    /// `inputs[i]` goes to scorer `i`. Each entry of the result is that
    /// scorer's own outcome; one scorer failing does not stop the others.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError::BatchSizeMismatch`] when `inputs` does not have
    /// one entry per scorer.
    pub fn step_all(
        &mut self,
        inputs: &[StepInput],
    ) -> Result<Vec<Result<StepOutcome, ScoreError>>, ScoreError> {
        if inputs.len() != self.scorers.len() {
            return Err(ScoreError::BatchSizeMismatch {
                expected: self.scorers.len(),
                actual: inputs.len(),
            });
        }
        Ok(self
            .scorers
            .iter_mut()
            .zip(inputs)
            .map(|(scorer, input)| scorer.step(input))
            .collect())
    }

    /// Current running score of every scorer.
    #[must_use]
    pub fn cumulated_rewards(&self) -> Vec<f64> {
        self.scorers.iter().map(AlertTrustScorer::cumulated_reward).collect()
    }
}
