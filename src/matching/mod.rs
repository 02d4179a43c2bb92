//! Matching engine
//!
//! Normalizer → similarity scorer → ranker → decision policy. Everything here
//! is pure and synchronous; the session in [`crate::session`] wires it to a
//! knowledge base and its store.

pub mod normalizer;
pub mod similarity;
pub mod ranker;
pub mod policy;

pub use normalizer::{Language, Normalizer, Profile};
pub use similarity::{matching_blocks, ratio, score, MatchBlock};
pub use ranker::{Ranker, DEFAULT_TOP_N};
pub use policy::{validate_threshold, DecisionPolicy, DEFAULT_THRESHOLD};
