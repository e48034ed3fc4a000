//! Node identifier type.

use std::fmt;

/// Identifies a node slot in the trie's node arena.
///
/// Parents own their children through `Vec<NodeId>`; children point back
/// at their parent with a plain `NodeId`. No reference counting is involved,
/// so the parent/child cycle never keeps anything alive.
///
/// # Example
/// ```
/// use fuzzytrie::NodeId;
///
/// let node_id = NodeId::new(5);
/// assert_eq!(node_id.index(), 5);
/// assert!(NodeId::ROOT.is_root());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The synthetic root always lives in slot 0.
    pub const ROOT: NodeId = NodeId(0);

    /// Create a new NodeId.
    #[inline]
    pub fn new(id: u32) -> Self {
        NodeId(id)
    }

    /// Slot index into the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "Node(ROOT)")
        } else {
            write!(f, "Node({})", self.0)
        }
    }
}
