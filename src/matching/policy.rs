//! Threshold decision between answering and offering to learn

use anyhow::Result;

use crate::types::{Decision, ScoredCandidate};

/// Default minimum similarity for a direct answer
pub const DEFAULT_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionPolicy {
    threshold: f64,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl DecisionPolicy {
    /// Create a policy; the threshold must lie in `[0, 1]`
    pub fn new(threshold: f64) -> Result<Self> {
        validate_threshold(threshold)?;
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether `best` is close enough to answer directly
    pub fn accepts(&self, best: Option<&ScoredCandidate>) -> bool {
        best.is_some_and(|c| c.similarity >= self.threshold)
    }

    /// Decide on a ranked candidate list (best first).
    ///
    /// The full list travels with `Unmatched` so the front end can offer
    /// "did you mean" suggestions.
    pub fn decide(&self, mut ranked: Vec<ScoredCandidate>) -> Decision {
        if !self.accepts(ranked.first()) {
            return Decision::Unmatched { suggestions: ranked };
        }
        // Non-empty: accepts() saw a first candidate
        let best = ranked.swap_remove(0);
        Decision::Answered {
            entry: best.entry,
            similarity: best.similarity,
        }
    }
}

/// Reject thresholds outside `[0, 1]` (NaN included)
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        anyhow::bail!("Similarity threshold must be between 0 and 1, got {}", threshold);
    }
    Ok(())
}
