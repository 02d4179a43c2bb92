//! Question-answering session
//!
//! Owns the knowledge base together with its cached matching keys, the store
//! it was loaded from and an optional audit sink. One `ask` or `learn` call
//! is one cycle; nothing here blocks on user input.

use tracing::{info, warn};

use crate::audit::{AuditEvent, AuditSink, ADDED_BY_USER, NO_ANSWER};
use crate::config::MatchingConfig;
use crate::knowledge::KnowledgeBase;
use crate::matching::{DecisionPolicy, Normalizer, Ranker};
use crate::store::{KnowledgeStore, StoreError};
use crate::types::{Decision, QaEntry, ScoredCandidate};

/// Result of teaching the session a new pair
#[derive(Debug)]
pub enum LearnOutcome {
    /// The answer was empty; nothing changed
    Rejected,
    /// The entry is in the knowledge base. `persisted` reports the store write.
    Learned {
        entry: QaEntry,
        persisted: Result<(), StoreError>,
    },
}

impl LearnOutcome {
    pub fn is_learned(&self) -> bool {
        matches!(self, LearnOutcome::Learned { .. })
    }
}

pub struct Session {
    base: KnowledgeBase,
    /// Normalized question of every entry, same order as `base`
    keys: Vec<String>,
    ranker: Ranker,
    exact: Normalizer,
    policy: DecisionPolicy,
    top_n: usize,
    store: Box<dyn KnowledgeStore>,
    audit: Option<Box<dyn AuditSink>>,
}

impl Session {
    /// Load the knowledge base from `store` and prepare matching per `config`
    pub fn open(config: &MatchingConfig, store: Box<dyn KnowledgeStore>) -> anyhow::Result<Self> {
        let entries = store.load()?;
        info!(
            "Loaded {} entries from {} ({})",
            entries.len(),
            store.path().display(),
            store.format()
        );

        let policy = DecisionPolicy::new(config.threshold)?;
        let ranker = Ranker::new(Normalizer::new(config.profile, config.language));
        Ok(Self::from_parts(
            KnowledgeBase::from(entries),
            ranker,
            policy,
            config.top_n,
            store,
        ))
    }

    /// Assemble a session around an already loaded base
    pub fn from_parts(
        base: KnowledgeBase,
        ranker: Ranker,
        policy: DecisionPolicy,
        top_n: usize,
        store: Box<dyn KnowledgeStore>,
    ) -> Self {
        let keys = base.iter().map(|entry| ranker.key(entry.question())).collect();
        Self {
            base,
            keys,
            ranker,
            exact: Normalizer::light(),
            policy,
            top_n,
            store,
            audit: None,
        }
    }

    /// Record every decision in `sink`
    pub fn with_audit(mut self, sink: Box<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    pub fn base(&self) -> &KnowledgeBase {
        &self.base
    }

    pub fn store(&self) -> &dyn KnowledgeStore {
        self.store.as_ref()
    }

    pub fn threshold(&self) -> f64 {
        self.policy.threshold()
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn normalizer(&self) -> &Normalizer {
        self.ranker.normalizer()
    }

    /// Ranked candidates for `query`, best first
    pub fn suggestions(&self, query: &str) -> Vec<ScoredCandidate> {
        self.ranker
            .rank_prepared(query, &self.base, &self.keys, self.top_n)
    }

    /// Match `query` and decide whether the best candidate answers it
    pub fn ask(&self, query: &str) -> Decision {
        let decision = self.policy.decide(self.suggestions(query));
        match &decision {
            Decision::Answered { entry, similarity } => {
                self.audit(query, entry.answer(), *similarity)
            }
            Decision::Unmatched { .. } => self.audit(query, NO_ANSWER, 0.0),
        }
        decision
    }

    /// First entry whose question equals `query` up to case and accents
    pub fn lookup_exact(&self, query: &str) -> Option<&QaEntry> {
        let wanted = self.exact.normalize(query);
        self.base
            .iter()
            .find(|entry| self.exact.normalize(entry.question()) == wanted)
    }

    /// Teach the pair `query` -> `answer`.
    ///
    /// A blank answer is rejected without touching the base or the store.
    /// Otherwise the entry is appended in memory and handed to the store once;
    /// a failed write is reported in the outcome and the entry stays.
    pub fn learn(&mut self, query: &str, answer: &str) -> LearnOutcome {
        let answer = answer.trim();
        if answer.is_empty() {
            return LearnOutcome::Rejected;
        }

        let entry = QaEntry::new(query, answer);
        self.keys.push(self.ranker.key(entry.question()));
        self.base.push(entry.clone());

        let persisted = self.store.persist(&entry, self.base.entries());
        match &persisted {
            Ok(()) => info!("Learned {:?} ({} entries)", entry.question(), self.base.len()),
            Err(e) => warn!("Learned {:?} but could not save it: {}", entry.question(), e),
        }
        self.audit(query, ADDED_BY_USER, 0.0);

        LearnOutcome::Learned { entry, persisted }
    }

    fn audit(&self, query: &str, answer: &str, similarity: f64) {
        if let Some(sink) = &self.audit {
            if let Err(e) = sink.record(&AuditEvent::now(query, answer, similarity)) {
                warn!("Failed to write audit log: {:#}", e);
            }
        }
    }
}
