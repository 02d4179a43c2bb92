//! Conversation front end
//!
//! One chat turn: ask the session, show the outcome, and when nothing
//! matched let the user pick a suggestion or teach an answer. Rendering and
//! input go through [`Presenter`] so the turn logic runs without a terminal.

pub mod terminal;

use anyhow::Result;

use crate::session::{LearnOutcome, Session};
use crate::types::{Decision, QaEntry, ScoredCandidate};

pub use terminal::{run_chat, TerminalPresenter};

/// Words that end an interactive chat
pub const QUIT_WORDS: &[&str] = &["exit", "quit", "salir"];

pub fn is_quit_word(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    QUIT_WORDS.contains(&input.as_str())
}

/// What the user wants after an unmatched query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// Move on without learning anything
    Skip,
    /// Ask again with the question of suggestion `i`
    Suggestion(usize),
    /// Store this answer for the original query
    Teach(String),
}

/// Renders decisions and collects the user's choice
pub trait Presenter {
    fn answered(&mut self, entry: &QaEntry, similarity: f64);
    fn unmatched(&mut self, query: &str, suggestions: &[ScoredCandidate]);
    fn choose(&mut self, query: &str, suggestions: &[ScoredCandidate]) -> Result<Choice>;
    fn learned(&mut self, outcome: &LearnOutcome);
}

/// How a turn ended
#[derive(Debug)]
pub enum Turn {
    Answered { entry: QaEntry, similarity: f64 },
    Skipped,
    Taught(LearnOutcome),
}

/// Run one turn for `query`
pub fn handle_query(
    session: &mut Session,
    presenter: &mut dyn Presenter,
    query: &str,
) -> Result<Turn> {
    let mut current = query.to_string();
    loop {
        let suggestions = match session.ask(&current) {
            Decision::Answered { entry, similarity } => {
                presenter.answered(&entry, similarity);
                return Ok(Turn::Answered { entry, similarity });
            }
            Decision::Unmatched { suggestions } => suggestions,
        };

        presenter.unmatched(&current, &suggestions);
        match presenter.choose(&current, &suggestions)? {
            Choice::Skip => return Ok(Turn::Skipped),
            Choice::Suggestion(i) => match suggestions.get(i) {
                Some(picked) => current = picked.entry.question().to_string(),
                None => anyhow::bail!("No suggestion number {}", i + 1),
            },
            Choice::Teach(answer) => {
                let outcome = session.learn(&current, &answer);
                presenter.learned(&outcome);
                return Ok(Turn::Taught(outcome));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{default_entries, KnowledgeBase};
    use crate::matching::{DecisionPolicy, Ranker};
    use crate::store::MockKnowledgeStore;
    use std::collections::VecDeque;

    /// Replays scripted choices and records what was shown
    #[derive(Default)]
    struct Scripted {
        choices: VecDeque<Choice>,
        answered: Vec<String>,
        unmatched: Vec<(String, usize)>,
        learned: usize,
    }

    impl Presenter for Scripted {
        fn answered(&mut self, entry: &QaEntry, _similarity: f64) {
            self.answered.push(entry.answer().to_string());
        }

        fn unmatched(&mut self, query: &str, suggestions: &[ScoredCandidate]) {
            self.unmatched.push((query.to_string(), suggestions.len()));
        }

        fn choose(&mut self, _query: &str, _suggestions: &[ScoredCandidate]) -> Result<Choice> {
            Ok(self.choices.pop_front().unwrap_or(Choice::Skip))
        }

        fn learned(&mut self, _outcome: &LearnOutcome) {
            self.learned += 1;
        }
    }

    fn session(store: MockKnowledgeStore) -> Session {
        Session::from_parts(
            KnowledgeBase::from(default_entries()),
            Ranker::default(),
            DecisionPolicy::default(),
            3,
            Box::new(store),
        )
    }

    #[test]
    fn test_quit_words() {
        assert!(is_quit_word("salir"));
        assert!(is_quit_word("  EXIT "));
        assert!(!is_quit_word("exit now"));
    }

    #[test]
    fn test_answered_turn() {
        let mut session = session(MockKnowledgeStore::new());
        let mut presenter = Scripted::default();

        let turn = handle_query(&mut session, &mut presenter, "¿Qué significa pole position?").unwrap();
        assert!(matches!(turn, Turn::Answered { similarity, .. } if similarity == 1.0));
        assert_eq!(presenter.answered.len(), 1);
        assert!(presenter.unmatched.is_empty());
    }

    #[test]
    fn test_picking_a_suggestion_asks_again() {
        let mut session = session(MockKnowledgeStore::new());
        let mut presenter = Scripted {
            choices: VecDeque::from([Choice::Suggestion(0)]),
            ..Default::default()
        };

        let turn = handle_query(&mut session, &mut presenter, "zzz").unwrap();
        assert!(matches!(turn, Turn::Answered { .. }));
        assert_eq!(presenter.unmatched, vec![("zzz".to_string(), 3)]);
        assert_eq!(presenter.answered.len(), 1);
    }

    #[test]
    fn test_out_of_range_suggestion_is_an_error() {
        let mut session = session(MockKnowledgeStore::new());
        let mut presenter = Scripted {
            choices: VecDeque::from([Choice::Suggestion(7)]),
            ..Default::default()
        };
        assert!(handle_query(&mut session, &mut presenter, "zzz").is_err());
    }

    #[test]
    fn test_teaching_learns_original_query() {
        let mut store = MockKnowledgeStore::new();
        store
            .expect_persist()
            .withf(|entry, _| entry.question() == "¿Quién es el campeón?")
            .times(1)
            .returning(|_, _| Ok(()));
        let mut session = session(store);
        let mut presenter = Scripted {
            choices: VecDeque::from([Choice::Teach("Verstappen".to_string())]),
            ..Default::default()
        };

        let turn = handle_query(&mut session, &mut presenter, "¿Quién es el campeón?").unwrap();
        assert!(matches!(turn, Turn::Taught(LearnOutcome::Learned { .. })));
        assert_eq!(presenter.learned, 1);
        assert_eq!(session.base().len(), 4);
    }

    #[test]
    fn test_skip_changes_nothing() {
        let mut store = MockKnowledgeStore::new();
        store.expect_persist().times(0);
        let mut session = session(store);
        let mut presenter = Scripted::default();

        let turn = handle_query(&mut session, &mut presenter, "zzz").unwrap();
        assert!(matches!(turn, Turn::Skipped));
        assert_eq!(session.base().len(), 3);
    }
}
