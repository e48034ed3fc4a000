//! Node tree - the compressed trie over the node arena.
//!
//! [`NodeTree`] owns the arena, the root index and the serializer. Every
//! operation that reads or changes a node's children goes through
//! [`NodeTree::ensure_resident`] first, so a paged subtree is restored
//! before anyone can observe it.
//!
//! Insertion lives in `insert.rs` and removal in `delete.rs`; both extend
//! `NodeTree` with further `impl` blocks.

use std::collections::HashMap;

use crate::common::{NodeId, Result};
use crate::index::arena::NodeArena;
use crate::index::node::{Children, Node};
use crate::paging::Serializer;

/// True if two key bytes are equal ignoring ASCII case.
///
/// Bytes 32 apart compare equal, which also pairs a few non-letters
/// (`@` and `` ` ``, for instance).
#[inline]
pub fn bytes_match(a: u8, b: u8) -> bool {
    a == b || a.abs_diff(b) == 32
}

/// The trie's node graph.
///
/// # Architecture
/// ```text
/// ┌───────────────────────────────────────────────────────────┐
/// │                        NodeTree                           │
/// │  ┌──────────────┐   ┌──────────────────────────────────┐  │
/// │  │ root_index   │   │ arena: NodeArena                 │  │
/// │  │ u8 → NodeId  │──▶│ [root] [a] [b] [c] ...           │  │
/// │  └──────────────┘   └──────────────────────────────────┘  │
/// │  ┌──────────────┐   ┌──────────────┐                      │
/// │  │ size         │   │ serializer   │──▶ BlobStore         │
/// │  └──────────────┘   └──────────────┘                      │
/// └───────────────────────────────────────────────────────────┘
/// ```
///
/// Top-level nodes are children of the synthetic root and are also listed
/// in `root_index` under their first byte.
pub struct NodeTree {
    pub(crate) arena: NodeArena,
    pub(crate) root_index: HashMap<u8, NodeId>,
    /// Number of terminal keys.
    pub(crate) size: usize,
    pub(crate) serializer: Serializer,
}

impl NodeTree {
    /// Create an empty tree paging through `serializer`.
    pub fn new(serializer: Serializer) -> Self {
        Self {
            arena: NodeArena::new(),
            root_index: HashMap::with_capacity(64),
            size: 0,
            serializer,
        }
    }

    // ========================================================================
    // Node access
    // ========================================================================

    /// Borrow a node. Its children may still be paged out.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        self.arena.get(id)
    }

    /// Number of terminal keys.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of trie nodes in memory, the synthetic root excluded.
    #[inline]
    pub fn resident_nodes(&self) -> usize {
        self.arena.get(NodeId::ROOT).live_descendants
    }

    /// Resident node count of the subtree rooted at `id`, `id` included.
    #[inline]
    pub fn subtree_size(&self, id: NodeId) -> usize {
        1 + self.arena.get(id).live_descendants
    }

    // ========================================================================
    // Paging
    // ========================================================================

    /// Bring a node's children back into memory if they were paged out.
    pub fn ensure_resident(&mut self, id: NodeId) -> Result<()> {
        if self.arena.get(id).is_paged() {
            self.serializer.restore(&mut self.arena, id)?;
        }
        Ok(())
    }

    /// Page out the children of `id`.
    ///
    /// Returns the number of nodes that left memory, or `None` if the node
    /// was already paged, is a leaf, or is the root.
    pub fn evict(&mut self, id: NodeId) -> Result<Option<usize>> {
        self.serializer.evict(&mut self.arena, id)
    }

    /// Drop trailing free arena slots after a sweep.
    pub fn compact(&mut self) -> usize {
        self.arena.trim()
    }

    // ========================================================================
    // Children
    // ========================================================================

    /// Children of `id`, restoring them first if needed.
    pub fn children(&mut self, id: NodeId) -> Result<&[NodeId]> {
        self.ensure_resident(id)?;
        Ok(self.arena.get(id).resident_children().unwrap_or(&[]))
    }

    /// Owned copy of the children of `id`, for callers that change the tree
    /// while walking it.
    pub fn child_ids(&mut self, id: NodeId) -> Result<Vec<NodeId>> {
        Ok(self.children(id)?.to_vec())
    }

    /// Child of `id` labelled exactly `byte`.
    pub fn find_child(&mut self, id: NodeId, byte: u8) -> Result<Option<NodeId>> {
        self.ensure_resident(id)?;
        let arena = &self.arena;
        Ok(arena
            .get(id)
            .resident_children()
            .and_then(|children| children.iter().copied().find(|&c| arena.get(c).element == byte)))
    }

    /// First child of `id` whose label matches `byte` ignoring ASCII case.
    pub fn child_case_insensitive(&mut self, id: NodeId, byte: u8) -> Result<Option<NodeId>> {
        self.ensure_resident(id)?;
        let arena = &self.arena;
        Ok(arena.get(id).resident_children().and_then(|children| {
            children
                .iter()
                .copied()
                .find(|&c| bytes_match(arena.get(c).element, byte))
        }))
    }

    /// Attach a new leaf under `parent` and return its id.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId> {
        self.ensure_resident(parent)?;
        debug_assert!(
            self.arena.get(parent).sequence.is_empty(),
            "compressed node {} cannot have children",
            parent
        );

        node.parent = Some(parent);
        node.children = Children::default();
        node.live_descendants = 0;
        let id = self.arena.alloc(node)?;

        if let Children::Resident(children) = &mut self.arena.get_mut(parent).children {
            children.push(id);
        }
        self.arena.adjust_counts(parent, 1);
        Ok(id)
    }

    /// Attach one single-byte node per byte of `bytes`, each the only child
    /// of the one before, and return the last (or `parent` if `bytes` is
    /// empty).
    pub fn add_chain(&mut self, parent: NodeId, bytes: &[u8]) -> Result<NodeId> {
        self.ensure_resident(parent)?;
        self.arena.ensure_room(bytes.len())?;

        let mut tail = parent;
        for (i, &byte) in bytes.iter().enumerate() {
            let mut node = Node::new(byte, b"");
            node.parent = Some(tail);
            node.live_descendants = bytes.len() - i - 1;
            let id = self.arena.alloc(node)?;

            if let Children::Resident(children) = &mut self.arena.get_mut(tail).children {
                children.push(id);
            }
            tail = id;
        }
        self.arena.adjust_counts(parent, bytes.len() as isize);
        Ok(tail)
    }

    /// Detach `child` from `parent` and free its whole subtree.
    ///
    /// Blobs of paged nodes inside the subtree are discarded as well.
    /// Sibling order is not preserved (swap-remove).
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.ensure_resident(parent)?;

        if let Children::Resident(children) = &mut self.arena.get_mut(parent).children {
            if let Some(pos) = children.iter().position(|&c| c == child) {
                children.swap_remove(pos);
            }
        }

        let removed = self.subtree_size(child);
        self.arena.adjust_counts(parent, -(removed as isize));

        for paging_id in self.arena.free_subtree(child) {
            self.serializer.discard(paging_id);
        }
        Ok(())
    }

    // ========================================================================
    // Keys
    // ========================================================================

    /// Rebuild the full key ending at `id`: ancestor labels from the root
    /// down, then the node's own compressed sequence.
    pub fn key_of(&self, id: NodeId) -> Vec<u8> {
        let mut key = Vec::new();
        let mut current = id;
        while !current.is_root() {
            let node = self.arena.get(current);
            key.push(node.element);
            current = node.parent.unwrap_or(NodeId::ROOT);
        }
        key.reverse();
        key.extend_from_slice(&self.arena.get(id).sequence);
        key
    }

    /// Resident nodes exactly `depth` edges below `from`.
    ///
    /// Paged subtrees are not restored; nodes below them are skipped.
    pub fn resident_at_depth(&self, from: NodeId, depth: usize) -> Vec<NodeId> {
        let mut level = vec![from];
        for _ in 0..depth {
            level = level
                .iter()
                .flat_map(|&id| self.arena.get(id).resident_children().unwrap_or(&[]))
                .copied()
                .collect();
            if level.is_empty() {
                break;
            }
        }
        level
    }
}
