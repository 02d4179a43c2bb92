//! Shared types used across modules
//!
//! Kept in one place so the matching engine, the stores and the front end
//! can exchange entries without depending on each other.

use serde::{Deserialize, Serialize};

/// A stored question/answer pair.
///
/// The question is the matching key and is kept verbatim; the answer is an
/// opaque payload. Fields are private so an entry cannot change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaEntry {
    #[serde(default, alias = "pregunta")]
    question: String,
    #[serde(default, alias = "respuesta")]
    answer: String,
}

impl QaEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }
}

/// An entry scored against a query. Produced fresh per query, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// Position of the entry in the knowledge base
    pub index: usize,
    pub entry: QaEntry,
    /// Similarity in `[0, 1]`
    pub similarity: f64,
}

impl ScoredCandidate {
    /// Similarity as a whole percentage, for display
    pub fn percent(&self) -> u32 {
        to_percent(self.similarity)
    }
}

/// Outcome of matching one query against the knowledge base
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// The best candidate cleared the threshold
    Answered { entry: QaEntry, similarity: f64 },
    /// Nothing cleared the threshold; carries the ranked suggestions
    Unmatched { suggestions: Vec<ScoredCandidate> },
}

impl Decision {
    pub fn is_answered(&self) -> bool {
        matches!(self, Decision::Answered { .. })
    }

    /// The answer text, if one was found
    pub fn answer(&self) -> Option<&str> {
        match self {
            Decision::Answered { entry, .. } => Some(entry.answer()),
            Decision::Unmatched { .. } => None,
        }
    }

    /// Similarity of the best candidate, `0.0` when there was none
    pub fn best_similarity(&self) -> f64 {
        match self {
            Decision::Answered { similarity, .. } => *similarity,
            Decision::Unmatched { suggestions } => {
                suggestions.first().map(|c| c.similarity).unwrap_or(0.0)
            }
        }
    }
}

/// Truncating percentage, the same way the chat window shows it
pub fn to_percent(similarity: f64) -> u32 {
    (similarity.clamp(0.0, 1.0) * 100.0) as u32
}
