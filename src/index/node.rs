//! Node - a single trie vertex.
//!
//! A [`Node`] holds one edge of the compressed trie:
//! - `element`: the byte labelling the edge from its parent
//! - `sequence`: the compressed remainder of the edge (leaves only)
//! - terminal flag and attached values
//! - parent back-reference and children (resident or paged out)

use crate::common::{NodeId, PagingId};

/// Where a node's children currently live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Children {
    /// Children are in the arena.
    Resident(Vec<NodeId>),
    /// Children were paged out to the blob with this id.
    Paged(PagingId),
}

impl Default for Children {
    fn default() -> Self {
        Children::Resident(Vec::new())
    }
}

/// A trie vertex.
///
/// # Invariants
/// - A node with a non-empty `sequence` has no children.
/// - `element` values are unique among siblings.
/// - `live_descendants` equals the number of resident nodes strictly below
///   this one; paged subtrees contribute nothing.
#[derive(Debug, Default)]
pub struct Node {
    pub element: u8,
    pub sequence: Vec<u8>,
    pub terminal: bool,
    pub values: Vec<Vec<u8>>,
    pub parent: Option<NodeId>,
    pub children: Children,
    pub live_descendants: usize,
}

impl Node {
    /// A non-terminal node for a fresh edge.
    pub fn new(element: u8, sequence: &[u8]) -> Self {
        Self {
            element,
            sequence: sequence.to_vec(),
            ..Self::default()
        }
    }

    /// A node that takes over the terminal state of a node being split.
    pub fn continuing(element: u8, sequence: &[u8], terminal: bool, values: Vec<Vec<u8>>) -> Self {
        Self {
            element,
            sequence: sequence.to_vec(),
            terminal,
            values,
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_paged(&self) -> bool {
        matches!(self.children, Children::Paged(_))
    }

    #[inline]
    pub fn paging_id(&self) -> Option<PagingId> {
        match self.children {
            Children::Paged(id) => Some(id),
            Children::Resident(_) => None,
        }
    }

    /// Resident children, or `None` while paged out.
    #[inline]
    pub fn resident_children(&self) -> Option<&[NodeId]> {
        match &self.children {
            Children::Resident(children) => Some(children),
            Children::Paged(_) => None,
        }
    }

    /// True if the node is a leaf with nothing paged below it.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(&self.children, Children::Resident(c) if c.is_empty())
    }
}
