//! Candidate ranking
//!
//! Scores a query against every entry of the knowledge base and keeps the
//! best `top_n`. Linear in the size of the base; no index is kept, so an
//! approximate-match structure could replace the scan without changing
//! `rank`'s contract.

use tracing::debug;

use super::normalizer::Normalizer;
use super::similarity::ratio;
use crate::knowledge::KnowledgeBase;
use crate::types::ScoredCandidate;

/// Default number of candidates returned
pub const DEFAULT_TOP_N: usize = 3;

#[derive(Debug, Default)]
pub struct Ranker {
    normalizer: Normalizer,
}

impl Ranker {
    pub fn new(normalizer: Normalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Normalized matching key for a stored question
    pub fn key(&self, question: &str) -> String {
        self.normalizer.normalize(question)
    }

    /// Rank every entry of `base` against `query`.
    ///
    /// Sorted by descending similarity; entries with equal similarity keep
    /// their insertion order. An empty base yields an empty result.
    pub fn rank(&self, query: &str, base: &KnowledgeBase, top_n: usize) -> Vec<ScoredCandidate> {
        let keys: Vec<String> = base.iter().map(|entry| self.key(entry.question())).collect();
        self.rank_prepared(query, base, &keys, top_n)
    }

    /// Same as [`rank`](Self::rank), reusing normalized keys computed earlier.
    ///
    /// `keys[i]` must be the key of the `i`-th entry; entries past the end of
    /// `keys` are normalized on the fly.
    pub fn rank_prepared(
        &self,
        query: &str,
        base: &KnowledgeBase,
        keys: &[String],
        top_n: usize,
    ) -> Vec<ScoredCandidate> {
        if base.is_empty() || top_n == 0 {
            return Vec::new();
        }

        let query_key = self.normalizer.normalize(query);

        let mut scored: Vec<ScoredCandidate> = base
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let similarity = match keys.get(index) {
                    Some(key) => ratio(&query_key, key),
                    None => ratio(&query_key, &self.key(entry.question())),
                };
                ScoredCandidate {
                    index,
                    entry: entry.clone(),
                    similarity,
                }
            })
            .collect();

        // `sort_by` is stable: ties stay in insertion order
        scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        scored.truncate(top_n);

        if let Some(best) = scored.first() {
            debug!(
                "Best match for {:?}: #{} ({:.3})",
                query, best.index, best.similarity
            );
        }

        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::normalizer::{Language, Profile};
    use crate::types::QaEntry;

    fn base(questions: &[&str]) -> KnowledgeBase {
        questions
            .iter()
            .enumerate()
            .map(|(i, q)| QaEntry::new(*q, format!("answer {}", i)))
            .collect()
    }

    #[test]
    fn test_empty_base_returns_nothing() {
        let ranker = Ranker::default();
        assert!(ranker.rank("anything", &KnowledgeBase::new(), 3).is_empty());
        assert!(ranker.rank("", &KnowledgeBase::new(), 3).is_empty());
    }

    #[test]
    fn test_sorted_descending_and_truncated() {
        let ranker = Ranker::default();
        let kb = base(&["zzzz", "gran premio", "gran premio de monaco", "pole"]);
        let ranked = ranker.rank("gran premio", &kb, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].index, 1);
        assert_eq!(ranked[0].similarity, 1.0);
        assert_eq!(ranked[1].index, 2);
        assert!(ranked[0].similarity >= ranked[1].similarity);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let ranker = Ranker::default();
        // Duplicates score identically against any query
        let kb = base(&["same question", "other", "same question", "same question"]);
        let ranked = ranker.rank("same question", &kb, 3);
        let indices: Vec<usize> = ranked.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
        assert_eq!(ranked[0].entry.answer(), "answer 0");
        assert_eq!(ranked[2].entry.answer(), "answer 3");
    }

    #[test]
    fn test_zero_top_n() {
        let ranker = Ranker::default();
        assert!(ranker.rank("pole", &base(&["pole"]), 0).is_empty());
    }

    #[test]
    fn test_prepared_keys_match_fresh_ranking() {
        let ranker = Ranker::new(Normalizer::new(Profile::Full, Language::English));
        let kb = base(&["What is DRS?", "What is a safety car?", "Who won in 2021?"]);
        // Only part of the keys are cached
        let keys: Vec<String> = kb.iter().take(2).map(|e| ranker.key(e.question())).collect();
        assert_eq!(
            ranker.rank_prepared("what's the safety car", &kb, &keys, 3),
            ranker.rank("what's the safety car", &kb, 3)
        );
    }

    #[test]
    fn test_light_profile_skips_punctuation_and_stemming() {
        let kb = base(&["gran premio", "grandes premios"]);

        let light = Ranker::new(Normalizer::new(Profile::Light, Language::Spanish));
        let ranked = light.rank("gran premio?", &kb, 2);
        assert_eq!(ranked[0].index, 0);
        assert!(ranked[0].similarity < 1.0);
        assert!(light.rank("grandes premios", &kb, 1)[0].similarity == 1.0);

        let full = Ranker::new(Normalizer::new(Profile::Full, Language::Spanish));
        assert_eq!(full.rank("gran premio?", &kb, 1)[0].similarity, 1.0);
    }

    #[test]
    fn test_similarity_bounded() {
        let ranker = Ranker::default();
        let kb = base(&["", "a", "¿¡!!", "Fórmula 1"]);
        for candidate in ranker.rank("formula uno", &kb, 10) {
            assert!((0.0..=1.0).contains(&candidate.similarity));
        }
    }
}
