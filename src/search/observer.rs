//! Match observers - a veto hook called before a candidate is recorded.
//!
//! Any `FnMut(&TraversalState, &Candidate) -> Verdict` closure is an
//! observer. Closures passed straight to a generic parameter sometimes fail
//! to infer a signature general enough over lifetimes; wrapping them in
//! [`from_fn`] pins it.

/// Progress of the running search, as seen by an observer.
#[derive(Debug, Clone, Copy)]
pub struct TraversalState<'a> {
    /// The query, ASCII-lowercased.
    pub query: &'a [u8],
    pub max_typos: usize,
    pub max_results: usize,
    /// Results recorded so far.
    pub found: usize,
}

/// A terminal node that passed the distance (or wildcard prefix) check.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Full key in its stored case.
    pub key: &'a [u8],
    pub values: &'a [Vec<u8>],
}

/// Observer decision for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

/// Called once per candidate, before it is added to the results.
///
/// A rejected candidate is dropped for the rest of the search. Rejection is
/// a filter, not an error.
pub trait MatchObserver {
    fn on_match(&mut self, state: &TraversalState<'_>, candidate: &Candidate<'_>) -> Verdict;
}

impl<F> MatchObserver for F
where
    F: FnMut(&TraversalState<'_>, &Candidate<'_>) -> Verdict,
{
    fn on_match(&mut self, state: &TraversalState<'_>, candidate: &Candidate<'_>) -> Verdict {
        self(state, candidate)
    }
}

/// Observer that records every candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl MatchObserver for AcceptAll {
    fn on_match(&mut self, _state: &TraversalState<'_>, _candidate: &Candidate<'_>) -> Verdict {
        Verdict::Accept
    }
}

/// Turn a closure into an observer with the right higher-ranked signature.
///
/// # Example
/// ```
/// use fuzzytrie::search::{from_fn, Verdict};
///
/// let only_short = from_fn(|_, candidate| {
///     if candidate.key.len() <= 3 { Verdict::Accept } else { Verdict::Reject }
/// });
/// # let _ = only_short;
/// ```
pub fn from_fn<F>(f: F) -> F
where
    F: FnMut(&TraversalState<'_>, &Candidate<'_>) -> Verdict,
{
    f
}
