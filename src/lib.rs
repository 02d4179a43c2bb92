//! qabot - Question-Answering Assistant Library
//!
//! A small retrieval assistant with:
//! - Text normalization (case, accents, punctuation, Snowball stemming)
//! - Character-level similarity scoring and top-N ranking
//! - Threshold decisions with suggestions for unmatched questions
//! - A learning protocol that persists new pairs to CSV, JSON or text files
//! - A timestamped audit log of every decision
//!
//! # Example
//!
//! ```ignore
//! use qabot::{config::Config, cli::open_session};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let session = open_session(&config, None, None)?;
//!     if let Some(answer) = session.ask("¿Qué es la pole position?").answer() {
//!         println!("{}", answer);
//!     }
//!     Ok(())
//! }
//! ```

// Core modules
pub mod types;
pub mod matching;
pub mod knowledge;
pub mod store;
pub mod audit;
pub mod session;
pub mod config;

// Front end
pub mod chat;
pub mod cli;

// Re-export commonly used types for convenience
pub use types::{Decision, QaEntry, ScoredCandidate};

pub use matching::{
    DecisionPolicy,
    Language,
    Normalizer,
    Profile,
    Ranker,
};

pub use knowledge::KnowledgeBase;
pub use store::{KnowledgeStore, StoreError, StoreFormat};
pub use audit::{AuditEvent, AuditSink, FileAuditLog};
pub use session::{LearnOutcome, Session};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
