//! Integration tests for the ask/learn cycle:
//! - Answered and unmatched decisions on a small English base
//! - The learning protocol against a counting store
//! - Round trips through the real file stores

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use qabot::audit::FileAuditLog;
use qabot::config::MatchingConfig;
use qabot::store::{self, KnowledgeStore, StoreError, StoreFormat};
use qabot::{Decision, DecisionPolicy, KnowledgeBase, LearnOutcome, QaEntry, Ranker, Session};

/// In-memory store that counts persist calls
struct CountingStore {
    path: PathBuf,
    persisted: Rc<Cell<usize>>,
}

impl KnowledgeStore for CountingStore {
    fn format(&self) -> StoreFormat {
        StoreFormat::Csv
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<QaEntry>, StoreError> {
        Ok(grand_prix_base())
    }

    fn append(&self, _entry: &QaEntry) -> Result<(), StoreError> {
        Ok(())
    }

    fn rewrite(&self, _entries: &[QaEntry]) -> Result<(), StoreError> {
        Ok(())
    }

    fn persist(&self, _entry: &QaEntry, _all: &[QaEntry]) -> Result<(), StoreError> {
        self.persisted.set(self.persisted.get() + 1);
        Ok(())
    }
}

fn grand_prix_base() -> Vec<QaEntry> {
    vec![
        QaEntry::new("What is a Grand Prix?", "A race."),
        QaEntry::new("What is pole position?", "Grid's first spot."),
    ]
}

fn counting_session() -> (Session, Rc<Cell<usize>>) {
    let persisted = Rc::new(Cell::new(0));
    let store = CountingStore {
        path: PathBuf::from("memory.csv"),
        persisted: persisted.clone(),
    };
    let config = MatchingConfig {
        threshold: 0.6,
        ..MatchingConfig::default()
    };
    (Session::open(&config, Box::new(store)).unwrap(), persisted)
}

const LIFE: &str = "What is the meaning of life?";

// =====================================================================
// DECISIONS
// =====================================================================

#[test]
fn test_close_question_is_answered() {
    let (session, _) = counting_session();
    match session.ask("What is a grand prix") {
        Decision::Answered { entry, similarity } => {
            assert_eq!(entry.answer(), "A race.");
            assert!(similarity >= 0.6);
        }
        other => panic!("expected an answer, got {:?}", other),
    }
}

#[test]
fn test_unrelated_question_gets_suggestions() {
    let (session, _) = counting_session();
    match session.ask(LIFE) {
        Decision::Unmatched { suggestions } => {
            assert_eq!(suggestions.len(), 2);
            assert!(suggestions[0].similarity < 0.6);
            assert!(suggestions[0].similarity >= suggestions[1].similarity);
        }
        other => panic!("expected no answer, got {:?}", other),
    }
}

// =====================================================================
// LEARNING
// =====================================================================

#[test]
fn test_empty_answer_changes_nothing() {
    let (mut session, persisted) = counting_session();
    assert!(matches!(session.learn(LIFE, ""), LearnOutcome::Rejected));
    assert_eq!(session.base().len(), 2);
    assert_eq!(persisted.get(), 0);
}

#[test]
fn test_learning_appends_verbatim_question_once() {
    let (mut session, persisted) = counting_session();
    assert!(!session.ask(LIFE).is_answered());

    let outcome = session.learn(LIFE, "42");
    assert!(outcome.is_learned());
    assert_eq!(session.base().len(), 3);
    assert_eq!(persisted.get(), 1);

    let last = session.base().get(2).unwrap();
    assert_eq!(last.question(), LIFE);
    assert_eq!(last.answer(), "42");

    assert_eq!(session.ask(LIFE).answer(), Some("42"));
}

#[test]
fn test_session_from_parts_matches_open() {
    let (opened, _) = counting_session();
    let built = Session::from_parts(
        KnowledgeBase::from(grand_prix_base()),
        Ranker::default(),
        DecisionPolicy::new(0.6).unwrap(),
        3,
        Box::new(CountingStore {
            path: PathBuf::from("memory.csv"),
            persisted: Rc::new(Cell::new(0)),
        }),
    );
    for query in ["What is a grand prix", LIFE, "pole"] {
        assert_eq!(opened.ask(query), built.ask(query));
    }
}

// =====================================================================
// FILE STORES
// =====================================================================

#[test]
fn test_learned_entries_survive_reload_in_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let config = MatchingConfig::default();

    for format in StoreFormat::PREFERENCE {
        let path = store::store_path(dir.path(), format);
        store::open(format, &path).rewrite(&grand_prix_base()).unwrap();

        let mut session = Session::open(&config, store::open(format, &path)).unwrap();
        match session.learn("¿Quién ganó en Mónaco?", "  Leclerc ") {
            LearnOutcome::Learned { persisted, .. } => assert!(persisted.is_ok(), "{}", format),
            LearnOutcome::Rejected => panic!("answer was not empty"),
        }

        let reloaded = Session::open(&config, store::open(format, &path)).unwrap();
        assert_eq!(reloaded.base().len(), 3, "{}", format);
        assert_eq!(reloaded.base().get(2), Some(&QaEntry::new("¿Quién ganó en Mónaco?", "Leclerc")));
    }
}

#[test]
fn test_padded_question_reloads_trimmed() {
    let dir = tempfile::tempdir().unwrap();
    let config = MatchingConfig::default();
    let padded = "  ¿Quién ganó en Mónaco?  ";

    for format in StoreFormat::PREFERENCE {
        let path = store::store_path(dir.path(), format);
        let mut session = Session::open(&config, store::open(format, &path)).unwrap();
        assert!(session.learn(padded, "Leclerc").is_learned());
        assert_eq!(session.base().get(0).unwrap().question(), padded);

        // Stores trim on read; matching is unaffected because keys are normalized
        let reloaded = Session::open(&config, store::open(format, &path)).unwrap();
        assert_eq!(reloaded.base().get(0).unwrap().question(), padded.trim(), "{}", format);
        assert_eq!(reloaded.ask(padded).answer(), Some("Leclerc"), "{}", format);
    }
}

#[test]
fn test_text_store_refusal_keeps_session_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = store::store_path(dir.path(), StoreFormat::Text);
    let mut session = Session::open(&MatchingConfig::default(), store::open(StoreFormat::Text, &path)).unwrap();

    match session.learn("Start time: local?", "15:00") {
        LearnOutcome::Learned { persisted: Err(StoreError::Unrepresentable { .. }), .. } => {}
        other => panic!("expected an unrepresentable entry, got {:?}", other),
    }
    assert_eq!(session.base().len(), 1);
    assert!(session.lookup_exact("start time: LOCAL?").is_some());
}

#[test]
fn test_corrupt_store_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = store::store_path(dir.path(), StoreFormat::Json);
    std::fs::write(&path, "{ not json").unwrap();

    assert!(Session::open(&MatchingConfig::default(), store::open(StoreFormat::Json, &path)).is_err());
    // The file is left for the user to fix
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
}

#[test]
fn test_audit_log_records_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("log.txt");
    let (session, _) = counting_session();
    let mut session = session.with_audit(Box::new(FileAuditLog::with_path(log_path.clone()).unwrap()));

    session.ask("What is a grand prix");
    session.ask(LIFE);
    session.learn(LIFE, "42");

    let log = FileAuditLog::with_path(log_path).unwrap();
    let lines = log.tail(10).unwrap();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("answer: \"A race.\""));
    assert!(lines[1].ends_with("answer: \"NO ANSWER\"\tsimilarity: 0.00"));
    assert!(lines[2].contains("answer: \"(added by user)\""));
}
