//! Node arena - slot storage for trie nodes.
//!
//! Nodes live in a `Vec` of slots addressed by [`NodeId`]. Freed slots go on
//! a LIFO free list and are reused by the next allocation.

use crate::common::{Error, NodeId, PagingId, Result};
use crate::index::node::{Children, Node};

/// Slot storage for every resident node of one trie.
///
/// # Layout
/// ```text
/// ┌─────────────────────────────────────────────────────┐
/// │ slots: Vec<Option<Node>>                            │
/// │  [root] [node] [None] [node] [node] [None] ...      │
/// └─────────────────────────────────────────────────────┘
/// ┌──────────────────────┐
/// │ free_list: Vec<NodeId>│  (vacant slots, LIFO)
/// └──────────────────────┘
/// ```
///
/// Slot 0 always holds the synthetic root.
pub struct NodeArena {
    slots: Vec<Option<Node>>,
    free_list: Vec<NodeId>,
    /// Number of occupied slots, root included.
    len: usize,
    /// Upper bound on `slots.len()`.
    limit: usize,
}

impl NodeArena {
    /// Most slots an arena can address with a `u32` [`NodeId`].
    pub const MAX_SLOTS: usize = u32::MAX as usize;

    /// Create an arena holding only the root.
    pub fn new() -> Self {
        Self::with_limit(Self::MAX_SLOTS)
    }

    pub(crate) fn with_limit(limit: usize) -> Self {
        Self {
            slots: vec![Some(Node::default())],
            free_list: Vec::new(),
            len: 1,
            limit: limit.min(Self::MAX_SLOTS),
        }
    }

    /// Store a node and return its id.
    ///
    /// # Errors
    /// Returns `Error::ArenaFull` once every addressable slot is taken.
    pub fn alloc(&mut self, node: Node) -> Result<NodeId> {
        if let Some(id) = self.free_list.pop() {
            self.slots[id.index()] = Some(node);
            self.len += 1;
            return Ok(id);
        }

        if self.slots.len() >= self.limit {
            return Err(Error::ArenaFull(self.limit));
        }
        let index = u32::try_from(self.slots.len()).map_err(|_| Error::ArenaFull(self.limit))?;
        self.slots.push(Some(node));
        self.len += 1;
        Ok(NodeId::new(index))
    }

    /// Check that `count` more nodes can be allocated.
    ///
    /// # Errors
    /// Returns `Error::ArenaFull` if they cannot.
    pub fn ensure_room(&self, count: usize) -> Result<()> {
        let room = self.free_list.len() + self.limit.saturating_sub(self.slots.len());
        if count > room {
            return Err(Error::ArenaFull(self.limit));
        }
        Ok(())
    }

    /// Remove a node from its slot.
    ///
    /// # Panics
    /// Panics on the root or a vacant slot.
    pub fn free(&mut self, id: NodeId) -> Node {
        assert!(!id.is_root(), "cannot free the root node");
        let node = self.slots[id.index()].take().expect("double free of node slot");

        self.len -= 1;
        self.free_list.push(id);
        node
    }

    /// Free a node and every resident node below it.
    ///
    /// Returns the paging ids found along the way so the caller can decide
    /// what happens to their blobs.
    pub fn free_subtree(&mut self, id: NodeId) -> Vec<PagingId> {
        let mut paged = Vec::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            match self.free(current).children {
                Children::Resident(children) => stack.extend(children),
                Children::Paged(paging_id) => paged.push(paging_id),
            }
        }
        paged
    }

    /// Get a node.
    ///
    /// # Panics
    /// Panics if the slot is vacant.
    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        self.slots[id.index()].as_ref().expect("vacant node slot")
    }

    /// Get a node mutably.
    ///
    /// # Panics
    /// Panics if the slot is vacant.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        self.slots[id.index()].as_mut().expect("vacant node slot")
    }

    /// Add `delta` to the descendant count of `from` and all its ancestors.
    pub fn adjust_counts(&mut self, from: NodeId, delta: isize) {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = self.get_mut(id);
            let next = node.live_descendants as isize + delta;
            debug_assert!(next >= 0, "descendant count underflow at {}", id);
            node.live_descendants = next.max(0) as usize;
            current = node.parent;
        }
    }

    /// Number of occupied slots, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Drop trailing vacant slots and release spare capacity.
    ///
    /// Returns the number of slots reclaimed.
    pub fn trim(&mut self) -> usize {
        let before = self.slots.len();
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }

        let end = self.slots.len();
        self.free_list.retain(|id| id.index() < end);
        self.slots.shrink_to_fit();
        self.free_list.shrink_to_fit();

        before - self.slots.len()
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_new_has_root() {
        let arena = NodeArena::new();
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(NodeId::ROOT).live_descendants, 0);
    }

    #[test]
    fn test_alloc_and_free_reuses_slot() {
        let mut arena = NodeArena::new();

        let a = arena.alloc(Node::new(b'a', b"")).unwrap();
        let b = arena.alloc(Node::new(b'b', b"")).unwrap();
        assert_eq!(arena.len(), 3);
        assert_ne!(a, b);

        let freed = arena.free(a);
        assert_eq!(freed.element, b'a');
        assert_eq!(arena.len(), 2);

        // LIFO: the freed slot comes back first
        let c = arena.alloc(Node::new(b'c', b"")).unwrap();
        assert_eq!(c, a);
        assert_eq!(arena.get(c).element, b'c');
    }

    #[test]
    #[should_panic(expected = "cannot free the root node")]
    fn test_free_root_panics() {
        let mut arena = NodeArena::new();
        arena.free(NodeId::ROOT);
    }

    #[test]
    #[should_panic(expected = "double free")]
    fn test_double_free_panics() {
        let mut arena = NodeArena::new();
        let a = arena.alloc(Node::new(b'a', b"")).unwrap();
        arena.free(a);
        arena.free(a);
    }

    #[test]
    fn test_adjust_counts_walks_ancestors() {
        let mut arena = NodeArena::new();

        let mut a = Node::new(b'a', b"");
        a.parent = Some(NodeId::ROOT);
        let a = arena.alloc(a).unwrap();

        let mut b = Node::new(b'b', b"");
        b.parent = Some(a);
        let b = arena.alloc(b).unwrap();

        arena.adjust_counts(b, 2);
        assert_eq!(arena.get(b).live_descendants, 2);
        assert_eq!(arena.get(a).live_descendants, 2);
        assert_eq!(arena.get(NodeId::ROOT).live_descendants, 2);

        arena.adjust_counts(a, -1);
        assert_eq!(arena.get(b).live_descendants, 2);
        assert_eq!(arena.get(a).live_descendants, 1);
        assert_eq!(arena.get(NodeId::ROOT).live_descendants, 1);
    }

    #[test]
    fn test_free_subtree_collects_paged_ids() {
        let mut arena = NodeArena::new();

        let leaf = arena.alloc(Node::new(b'z', b"end")).unwrap();
        let mut paged = Node::new(b'p', b"");
        paged.children = Children::Paged(PagingId::new(7));
        let paged = arena.alloc(paged).unwrap();

        let mut top = Node::new(b'a', b"");
        top.children = Children::Resident(vec![leaf, paged]);
        let top = arena.alloc(top).unwrap();

        let ids = arena.free_subtree(top);
        assert_eq!(ids, vec![PagingId::new(7)]);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_trim_drops_trailing_vacancies() {
        let mut arena = NodeArena::new();
        let a = arena.alloc(Node::new(b'a', b"")).unwrap();
        let b = arena.alloc(Node::new(b'b', b"")).unwrap();
        let c = arena.alloc(Node::new(b'c', b"")).unwrap();

        arena.free(b);
        arena.free(c);
        assert_eq!(arena.trim(), 2);

        // Slot of `a` survives, next alloc appends right after it
        assert_eq!(arena.get(a).element, b'a');
        let d = arena.alloc(Node::new(b'd', b"")).unwrap();
        assert_eq!(d.index(), 2);
    }

    #[test]
    fn test_alloc_past_limit_fails() {
        let mut arena = NodeArena::with_limit(3);
        let a = arena.alloc(Node::new(b'a', b"")).unwrap();
        arena.alloc(Node::new(b'b', b"")).unwrap();

        assert!(matches!(arena.alloc(Node::new(b'c', b"")), Err(Error::ArenaFull(3))));
        assert_eq!(arena.len(), 3);

        // A freed slot is still handed out
        arena.free(a);
        assert!(arena.ensure_room(1).is_ok());
        assert!(arena.ensure_room(2).is_err());
        assert_eq!(arena.alloc(Node::new(b'c', b"")).unwrap(), a);
    }

    #[test]
    fn test_limit_capped_at_addressable_slots() {
        let arena = NodeArena::with_limit(usize::MAX);
        assert_eq!(arena.limit, NodeArena::MAX_SLOTS);
        assert!(arena.ensure_room(NodeArena::MAX_SLOTS - 1).is_ok());
        assert!(arena.ensure_room(NodeArena::MAX_SLOTS).is_err());
    }
}
