//! Per-search traversal state.

use std::collections::{HashMap, HashSet};

use crate::common::config::WILDCARD;
use crate::common::NodeId;
use crate::search::observer::{Candidate, MatchObserver, TraversalState, Verdict};
use crate::search::SearchResult;

/// Everything one search call tracks while it walks the tree.
///
/// Lives for a single call and is dropped with it.
pub struct SearchContext<'o> {
    /// ASCII-lowercased query.
    pub query: Vec<u8>,
    /// Position of the first wildcard byte, if any.
    pub wildcard: Option<usize>,
    pub max_typos: usize,
    pub max_results: usize,
    pub found: Vec<SearchResult>,

    /// Nodes already offered to the observer, accepted or not.
    offered: HashSet<NodeId>,
    /// Terminal nodes whose key was checked and is too far from the query.
    too_far: HashSet<NodeId>,
    /// Wildcard enumeration roots already walked.
    pub enumerated: HashSet<NodeId>,
    /// Best remaining typo budget seen per `(node, query position)`.
    visited: HashMap<(NodeId, usize), isize>,

    observer: &'o mut dyn MatchObserver,
}

impl<'o> SearchContext<'o> {
    pub fn new(
        query: &[u8],
        max_typos: usize,
        max_results: usize,
        observer: &'o mut dyn MatchObserver,
    ) -> Self {
        let query = query.to_ascii_lowercase();
        let wildcard = query.iter().position(|&b| b == WILDCARD);

        Self {
            query,
            wildcard,
            max_typos,
            max_results,
            found: Vec::new(),
            offered: HashSet::new(),
            too_far: HashSet::new(),
            enumerated: HashSet::new(),
            visited: HashMap::new(),
            observer,
        }
    }

    /// Literal part of the query, before any wildcard.
    #[inline]
    pub fn literal(&self) -> &[u8] {
        &self.query[..self.wildcard.unwrap_or(self.query.len())]
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.found.len() >= self.max_results
    }

    /// Record that `(node, pos)` is being explored with `typos` left.
    ///
    /// Returns false if the same node and position were already explored
    /// with at least as many typos left.
    pub fn enter(&mut self, node: NodeId, pos: usize, typos: isize) -> bool {
        match self.visited.get(&(node, pos)) {
            Some(&best) if best >= typos => false,
            _ => {
                self.visited.insert((node, pos), typos);
                true
            }
        }
    }

    /// True if `node` needs no further candidate check.
    #[inline]
    pub fn is_settled(&self, node: NodeId) -> bool {
        self.offered.contains(&node) || self.too_far.contains(&node)
    }

    #[inline]
    pub fn mark_too_far(&mut self, node: NodeId) {
        self.too_far.insert(node);
    }

    /// Offer a candidate to the observer and record it unless vetoed.
    ///
    /// Each node is offered at most once per search.
    pub fn offer(&mut self, node: NodeId, key: Vec<u8>, values: &[Vec<u8>]) {
        if self.is_full() || !self.offered.insert(node) {
            return;
        }

        let state = TraversalState {
            query: &self.query,
            max_typos: self.max_typos,
            max_results: self.max_results,
            found: self.found.len(),
        };
        let candidate = Candidate { key: &key, values };

        if self.observer.on_match(&state, &candidate) == Verdict::Accept {
            self.found.push(SearchResult::new(key, values.to_vec()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::observer::{from_fn, AcceptAll};

    #[test]
    fn test_query_lowercased_and_wildcard_found() {
        let mut observer = AcceptAll;
        let ctx = SearchContext::new(b"CaT*s", 1, 5, &mut observer);

        assert_eq!(ctx.query, b"cat*s");
        assert_eq!(ctx.wildcard, Some(3));
        assert_eq!(ctx.literal(), b"cat");
    }

    #[test]
    fn test_enter_keeps_best_budget() {
        let mut observer = AcceptAll;
        let mut ctx = SearchContext::new(b"cat", 2, 5, &mut observer);
        let node = NodeId::new(4);

        assert!(ctx.enter(node, 1, 1));
        assert!(!ctx.enter(node, 1, 1));
        assert!(!ctx.enter(node, 1, 0));
        assert!(ctx.enter(node, 1, 2));
        assert!(ctx.enter(node, 2, 0));
    }

    #[test]
    fn test_offer_dedups_and_respects_budget() {
        let mut observer = AcceptAll;
        let mut ctx = SearchContext::new(b"cat", 1, 2, &mut observer);
        let values = vec![b"v".to_vec()];

        ctx.offer(NodeId::new(1), b"cat".to_vec(), &values);
        ctx.offer(NodeId::new(1), b"cat".to_vec(), &values);
        assert_eq!(ctx.found.len(), 1);

        ctx.offer(NodeId::new(2), b"car".to_vec(), &values);
        ctx.offer(NodeId::new(3), b"bat".to_vec(), &values);
        assert_eq!(ctx.found.len(), 2);
        assert!(ctx.is_full());
    }

    #[test]
    fn test_offer_veto() {
        let mut observer = from_fn(|_, candidate| {
            if candidate.key == b"car" {
                Verdict::Reject
            } else {
                Verdict::Accept
            }
        });
        let mut ctx = SearchContext::new(b"cat", 1, 5, &mut observer);

        ctx.offer(NodeId::new(1), b"car".to_vec(), &[]);
        ctx.offer(NodeId::new(2), b"cat".to_vec(), &[]);

        assert_eq!(ctx.found.len(), 1);
        assert_eq!(ctx.found[0].key, b"cat");
        assert!(ctx.is_settled(NodeId::new(1)));
    }
}
