//! Search layer - bounded fuzzy lookup over the trie.
//!
//! # Components
//! - [`SearchContext`] - Per-call state: query, budgets, memo, results
//! - [`engine`] - The traversal itself, plus wildcard enumeration
//! - [`distance`] - Byte-wise Levenshtein distance
//! - [`MatchObserver`] - Veto hook called before each match is recorded
//! - [`SearchResult`] - One matched key and its values

mod context;
pub mod distance;
pub mod engine;
mod observer;
mod result;

pub use context::SearchContext;
pub use observer::{from_fn, AcceptAll, Candidate, MatchObserver, TraversalState, Verdict};
pub use result::SearchResult;
