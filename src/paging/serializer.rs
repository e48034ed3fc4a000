//! Serializer - moves subtrees between the arena and the blob store.
//!
//! Eviction writes the children of a node to one blob and frees their arena
//! slots, leaving a [`Children::Paged`] marker on the node. Restoration
//! reads the blob back, deletes it, and splices fresh nodes into the arena.
//!
//! ```text
//!   evict(n)                                restore(n)
//!   ┌───┐                                   ┌───┐
//!   │ n │──▶ Resident[a, b]                 │ n │──▶ Paged(7)
//!   └───┘      │                            └───┘      │
//!          persist + encode                        read + verify
//!              ▼                                       ▼
//!        <dir>/…07.blob  ◀── write        delete ──▶ splice into arena
//! ```
//!
//! A subtree that is already paged when an ancestor gets evicted keeps its
//! own blob. Only its marker goes into the ancestor's blob.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::common::{NodeId, PagingId, Result};
use crate::index::arena::NodeArena;
use crate::index::node::{Children, Node};
use crate::paging::PagingStats;
use crate::storage::blob::{decode_subtree, encode_subtree, PersistedChildren, PersistedNode};
use crate::storage::BlobStore;

/// Pages subtrees of one trie in and out of its [`BlobStore`].
pub struct Serializer {
    store: BlobStore,
    stats: Arc<PagingStats>,
}

impl Serializer {
    pub fn new(store: BlobStore, stats: Arc<PagingStats>) -> Self {
        Self { store, stats }
    }

    #[inline]
    pub fn store(&self) -> &BlobStore {
        &self.store
    }

    #[inline]
    pub fn stats(&self) -> &Arc<PagingStats> {
        &self.stats
    }

    // ========================================================================
    // Eviction
    // ========================================================================

    /// Write the children of `id` to a new blob and free them.
    ///
    /// Returns the number of nodes that left memory, or `None` if there was
    /// nothing to evict (root, leaf, or already paged).
    ///
    /// # Errors
    /// Encoding or I/O failure. The arena is untouched in that case.
    pub fn evict(&mut self, arena: &mut NodeArena, id: NodeId) -> Result<Option<usize>> {
        if id.is_root() {
            return Ok(None);
        }
        let children = match &arena.get(id).children {
            Children::Resident(children) if !children.is_empty() => children.clone(),
            _ => return Ok(None),
        };

        let persisted = persist(arena, &children);
        let blob = encode_subtree(&persisted)?;

        let paging_id = self.store.allocate_id();
        self.store.write_blob(paging_id, &blob)?;

        // Nested paged markers now live in the new blob; their files stay.
        let removed = arena.get(id).live_descendants;
        debug_assert_eq!(removed, persisted.len(), "descendant count drift at {}", id);
        for child in children {
            arena.free_subtree(child);
        }
        arena.get_mut(id).children = Children::Paged(paging_id);
        arena.adjust_counts(id, -(removed as isize));

        self.stats.record_eviction(removed, blob.len());
        debug!(node = %id, paging_id = %paging_id, nodes = removed, bytes = blob.len(), "evicted subtree");

        Ok(Some(removed))
    }

    // ========================================================================
    // Restoration
    // ========================================================================

    /// Bring the children of `id` back from their blob.
    ///
    /// The blob is verified, the arena checked for room, and the blob
    /// deleted before anything is spliced in, so a failure leaves the node
    /// paged and the arena unchanged.
    ///
    /// # Errors
    /// - `Error::BlobNotFound` if the blob vanished
    /// - `Error::CorruptBlob` / `Error::Codec` if it fails verification
    /// - `Error::ArenaFull` if the nodes would not fit
    pub fn restore(&mut self, arena: &mut NodeArena, id: NodeId) -> Result<()> {
        let paging_id = match arena.get(id).paging_id() {
            Some(paging_id) => paging_id,
            None => return Ok(()),
        };

        let blob = self.store.read_blob(paging_id)?;
        let persisted = decode_subtree(paging_id, &blob)?;
        arena.ensure_room(persisted.len())?;
        self.store.remove_blob(paging_id)?;

        let restored = persisted.len();
        let children = splice(arena, id, persisted)?;
        arena.get_mut(id).children = Children::Resident(children);
        arena.adjust_counts(id, restored as isize);

        self.stats.record_restore(restored, blob.len());
        debug!(node = %id, paging_id = %paging_id, nodes = restored, bytes = blob.len(), "restored subtree");

        Ok(())
    }

    // ========================================================================
    // Discard
    // ========================================================================

    /// Delete a blob whose subtree was removed from the trie, along with any
    /// blobs nested inside it.
    ///
    /// Failures are logged and skipped: the subtree is already gone from
    /// the trie, a leftover file only costs scratch space.
    pub fn discard(&mut self, paging_id: PagingId) {
        let mut pending = vec![paging_id];

        while let Some(current) = pending.pop() {
            let nested = match self
                .store
                .read_blob(current)
                .and_then(|blob| decode_subtree(current, &blob))
            {
                Ok(persisted) => nested_paging_ids(&persisted),
                Err(e) => {
                    warn!(paging_id = %current, error = %e, "could not read discarded blob");
                    Vec::new()
                }
            };

            match self.store.remove_blob(current) {
                Ok(()) => {
                    self.stats.blobs_discarded.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => warn!(paging_id = %current, error = %e, "could not remove discarded blob"),
            }
            pending.extend(nested);
        }
    }
}

/// Copy the resident subtrees under `roots` into pre-order records.
fn persist(arena: &NodeArena, roots: &[NodeId]) -> Vec<PersistedNode> {
    let mut records = Vec::new();
    let mut stack: Vec<NodeId> = roots.iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        let node = arena.get(id);
        let children = match &node.children {
            Children::Resident(children) => {
                stack.extend(children.iter().rev());
                PersistedChildren::Resident(children.len())
            }
            Children::Paged(paging_id) => PersistedChildren::Paged(*paging_id),
        };

        records.push(PersistedNode {
            element: node.element,
            sequence: node.sequence.clone(),
            terminal: node.terminal,
            values: node.values.clone(),
            children,
        });
    }
    records
}

/// Allocate pre-order records under `parent`.
///
/// Returns the ids of the top-level records. Descendant counts of the new
/// nodes are filled in; `parent` and its ancestors are left to the caller.
fn splice(arena: &mut NodeArena, parent: NodeId, records: Vec<PersistedNode>) -> Result<Vec<NodeId>> {
    let mut top = Vec::new();
    let mut allocated = Vec::with_capacity(records.len());
    // Nodes still waiting for children, with how many are left
    let mut open: Vec<(NodeId, usize)> = Vec::new();

    for record in records {
        let (children, expected) = match record.children {
            PersistedChildren::Resident(count) => (Children::Resident(Vec::with_capacity(count)), count),
            PersistedChildren::Paged(paging_id) => (Children::Paged(paging_id), 0),
        };
        let owner = open.last().map_or(parent, |&(owner, _)| owner);

        let id = arena.alloc(Node {
            element: record.element,
            sequence: record.sequence,
            terminal: record.terminal,
            values: record.values,
            parent: Some(owner),
            children,
            live_descendants: 0,
        })?;
        allocated.push(id);

        match open.last_mut() {
            Some((owner, left)) => {
                if let Children::Resident(siblings) = &mut arena.get_mut(*owner).children {
                    siblings.push(id);
                }
                *left -= 1;
            }
            None => top.push(id),
        }

        if expected > 0 {
            open.push((id, expected));
        } else {
            while matches!(open.last(), Some(&(_, 0))) {
                open.pop();
            }
        }
    }

    // Children follow their parent, so walking backwards finishes every
    // subtree before it is added to its parent.
    for &id in allocated.iter().rev() {
        let node = arena.get(id);
        let size = 1 + node.live_descendants;
        if let Some(owner) = node.parent.filter(|&owner| owner != parent) {
            arena.get_mut(owner).live_descendants += size;
        }
    }
    Ok(top)
}

fn nested_paging_ids(nodes: &[PersistedNode]) -> Vec<PagingId> {
    nodes
        .iter()
        .filter_map(|node| match node.children {
            PersistedChildren::Paged(paging_id) => Some(paging_id),
            PersistedChildren::Resident(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use tempfile::TempDir;

    fn create_serializer() -> (Serializer, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::create(dir.path()).unwrap();
        (Serializer::new(store, Arc::new(PagingStats::new())), dir)
    }

    fn attach(arena: &mut NodeArena, parent: NodeId, mut node: Node) -> NodeId {
        node.parent = Some(parent);
        let id = arena.alloc(node).unwrap();
        if let Children::Resident(children) = &mut arena.get_mut(parent).children {
            children.push(id);
        }
        arena.adjust_counts(parent, 1);
        id
    }

    /// root → a → {b → c("xy"), d}
    fn sample_arena() -> (NodeArena, NodeId) {
        fill_sample(NodeArena::new())
    }

    fn fill_sample(mut arena: NodeArena) -> (NodeArena, NodeId) {
        let a = attach(&mut arena, NodeId::ROOT, Node::new(b'a', b""));
        let b = attach(&mut arena, a, Node::new(b'b', b""));
        attach(&mut arena, b, Node::continuing(b'c', b"xy", true, vec![b"v".to_vec()]));
        attach(&mut arena, a, Node::continuing(b'd', b"", true, vec![]));
        (arena, a)
    }

    #[test]
    fn test_evict_frees_children() {
        let (mut serializer, _dir) = create_serializer();
        let (mut arena, a) = sample_arena();

        let removed = serializer.evict(&mut arena, a).unwrap();

        assert_eq!(removed, Some(3));
        assert!(arena.get(a).is_paged());
        assert_eq!(arena.get(a).live_descendants, 0);
        assert_eq!(arena.get(NodeId::ROOT).live_descendants, 1);
        assert_eq!(arena.len(), 2);
        assert_eq!(serializer.store().blob_count(), 1);
        assert_eq!(serializer.stats().snapshot().nodes_paged_out, 3);
    }

    #[test]
    fn test_evict_noops() {
        let (mut serializer, _dir) = create_serializer();
        let (mut arena, a) = sample_arena();

        assert_eq!(serializer.evict(&mut arena, NodeId::ROOT).unwrap(), None);

        let leaf = arena.get(a).resident_children().unwrap()[1];
        assert_eq!(serializer.evict(&mut arena, leaf).unwrap(), None);

        serializer.evict(&mut arena, a).unwrap();
        assert_eq!(serializer.evict(&mut arena, a).unwrap(), None);
        assert_eq!(serializer.store().blob_count(), 1);
    }

    #[test]
    fn test_restore_round_trip() {
        let (mut serializer, _dir) = create_serializer();
        let (mut arena, a) = sample_arena();

        serializer.evict(&mut arena, a).unwrap();
        serializer.restore(&mut arena, a).unwrap();

        assert!(!arena.get(a).is_paged());
        assert_eq!(arena.get(a).live_descendants, 3);
        assert_eq!(arena.get(NodeId::ROOT).live_descendants, 4);
        assert_eq!(serializer.store().blob_count(), 0);

        let children = arena.get(a).resident_children().unwrap().to_vec();
        let b = children.iter().copied().find(|&c| arena.get(c).element == b'b').unwrap();
        assert_eq!(arena.get(b).parent, Some(a));
        assert_eq!(arena.get(b).live_descendants, 1);

        let c = arena.get(b).resident_children().unwrap()[0];
        let leaf = arena.get(c);
        assert_eq!(leaf.sequence, b"xy");
        assert!(leaf.terminal);
        assert_eq!(leaf.values, vec![b"v".to_vec()]);
        assert_eq!(leaf.parent, Some(b));
    }

    #[test]
    fn test_nested_eviction_keeps_inner_blob() {
        let (mut serializer, _dir) = create_serializer();
        let (mut arena, a) = sample_arena();

        let b = arena.get(a).resident_children().unwrap()[0];
        serializer.evict(&mut arena, b).unwrap();
        assert_eq!(serializer.evict(&mut arena, a).unwrap(), Some(2));
        assert_eq!(serializer.store().blob_count(), 2);

        serializer.restore(&mut arena, a).unwrap();
        let b = arena.get(a).resident_children().unwrap()[0];
        assert!(arena.get(b).is_paged());
        assert_eq!(arena.get(a).live_descendants, 2);

        serializer.restore(&mut arena, b).unwrap();
        assert_eq!(arena.get(a).live_descendants, 3);
        assert_eq!(serializer.store().blob_count(), 0);
    }

    #[test]
    fn test_restore_missing_blob_leaves_state() {
        let (mut serializer, dir) = create_serializer();
        let (mut arena, a) = sample_arena();

        serializer.evict(&mut arena, a).unwrap();
        let paging_id = arena.get(a).paging_id().unwrap();
        std::fs::remove_file(dir.path().join(paging_id.file_name())).unwrap();

        let result = serializer.restore(&mut arena, a);
        assert!(matches!(result, Err(Error::BlobNotFound(_))));
        assert!(arena.get(a).is_paged());
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_restore_corrupt_blob_keeps_file() {
        let (mut serializer, dir) = create_serializer();
        let (mut arena, a) = sample_arena();

        serializer.evict(&mut arena, a).unwrap();
        let paging_id = arena.get(a).paging_id().unwrap();
        let path = dir.path().join(paging_id.file_name());

        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(
            serializer.restore(&mut arena, a),
            Err(Error::CorruptBlob { .. })
        ));
        assert!(path.exists());
        assert!(arena.get(a).is_paged());
    }

    /// root → p → p → ... → p, `depth` nodes below the root.
    fn chain_arena(depth: usize) -> (NodeArena, NodeId) {
        let mut arena = NodeArena::new();
        let mut ids = vec![NodeId::ROOT];
        for level in 0..depth {
            let mut node = Node::new(b'p', b"");
            node.parent = Some(ids[level]);
            let id = arena.alloc(node).unwrap();
            arena.get_mut(ids[level]).children = Children::Resident(vec![id]);
            ids.push(id);
        }
        for (level, &id) in ids.iter().enumerate() {
            arena.get_mut(id).live_descendants = depth - level;
        }
        (arena, ids[1])
    }

    #[test]
    fn test_deep_chain_evict_and_restore() {
        let depth = 30_000;
        let (mut serializer, _dir) = create_serializer();
        let (mut arena, top) = chain_arena(depth);

        assert_eq!(serializer.evict(&mut arena, top).unwrap(), Some(depth - 1));
        assert_eq!(arena.len(), 2);

        serializer.restore(&mut arena, top).unwrap();
        assert_eq!(arena.len(), depth + 1);
        assert_eq!(arena.get(NodeId::ROOT).live_descendants, depth);

        let mut current = top;
        for below in (0..depth).rev() {
            assert_eq!(arena.get(current).live_descendants, below);
            match arena.get(current).resident_children() {
                Some([child]) => {
                    assert_eq!(arena.get(*child).parent, Some(current));
                    current = *child;
                }
                _ => assert_eq!(below, 0),
            }
        }
    }

    #[test]
    fn test_restore_keeps_sibling_order() {
        let (mut serializer, _dir) = create_serializer();
        let (mut arena, a) = sample_arena();
        let before: Vec<u8> = arena
            .get(a)
            .resident_children()
            .unwrap()
            .iter()
            .map(|&c| arena.get(c).element)
            .collect();

        serializer.evict(&mut arena, a).unwrap();
        serializer.restore(&mut arena, a).unwrap();

        let after: Vec<u8> = arena
            .get(a)
            .resident_children()
            .unwrap()
            .iter()
            .map(|&c| arena.get(c).element)
            .collect();
        assert_eq!(after, before);
    }

    #[test]
    fn test_restore_without_room_keeps_blob() {
        let (mut serializer, _dir) = create_serializer();
        let (mut arena, a) = fill_sample(NodeArena::with_limit(5));

        serializer.evict(&mut arena, a).unwrap();
        let filler = arena.alloc(Node::new(b'z', b"")).unwrap();

        assert!(matches!(
            serializer.restore(&mut arena, a),
            Err(Error::ArenaFull(5))
        ));
        assert!(arena.get(a).is_paged());
        assert_eq!(serializer.store().blob_count(), 1);

        arena.free(filler);
        serializer.restore(&mut arena, a).unwrap();
        assert_eq!(arena.get(a).live_descendants, 3);
    }

    #[test]
    fn test_discard_removes_nested_blobs() {
        let (mut serializer, _dir) = create_serializer();
        let (mut arena, a) = sample_arena();

        let b = arena.get(a).resident_children().unwrap()[0];
        serializer.evict(&mut arena, b).unwrap();
        serializer.evict(&mut arena, a).unwrap();

        let outer = arena.get(a).paging_id().unwrap();
        serializer.discard(outer);

        assert_eq!(serializer.store().blob_count(), 0);
        assert_eq!(serializer.stats().snapshot().blobs_discarded, 2);
    }
}
