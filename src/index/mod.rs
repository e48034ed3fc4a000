//! Index layer - the compressed trie.
//!
//! # Components
//! - [`Node`] / [`Children`] - One trie vertex and where its children live
//! - [`NodeArena`] - Slot storage for resident nodes
//! - [`NodeTree`] - The trie itself: root index, insertion, removal and
//!   transparent restoration of paged subtrees

pub mod arena;
mod delete;
mod insert;
pub mod node;
mod tree;

pub use arena::NodeArena;
pub use node::{Children, Node};
pub use tree::{bytes_match, NodeTree};
