//! fuzzytrie - An in-memory fuzzy-search trie that pages cold subtrees out to disk.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           FuzzyTrie                             │
//! │        add / search / delete / get   (one exclusive lock)       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Search Layer (search/)                    │   │
//! │  │   SearchContext + bounded traversal + wildcard suffix    │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Index Layer (index/)                     │   │
//! │  │   NodeTree: compressed trie over a NodeArena             │   │
//! │  │   insert with edge splitting, delete with pruning        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Paging Layer (paging/)                   │   │
//! │  │   Serializer (evict / restore) + EvictionScheduler       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Storage Layer (storage/)                  │   │
//! │  │        BlobStore + BlobHeader + persisted subtrees       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (NodeId, PagingId, Error, config)
//! - [`storage`] - Scratch blob files and their format
//! - [`index`] - The compressed trie
//! - [`paging`] - Eviction, restoration and the background sweeper
//! - [`search`] - Fuzzy traversal, edit distance, observers
//!
//! # Quick Start
//! ```
//! use fuzzytrie::{AcceptAll, FuzzyTrie};
//!
//! let trie = FuzzyTrie::new()?;
//! trie.add("Catalog", "page-1")?;
//! trie.add("Category", "page-2")?;
//!
//! // One typo away
//! let results = trie.search("catalig", 1, 10, AcceptAll)?;
//! assert_eq!(results[0].key_lossy(), "Catalog");
//!
//! // Prefix query
//! let results = trie.search("cat*", 0, 10, AcceptAll)?;
//! assert_eq!(results.len(), 2);
//! # Ok::<(), fuzzytrie::Error>(())
//! ```

pub mod common;
pub mod index;
pub mod paging;
pub mod search;
pub mod storage;
mod trie;

// Re-export commonly used items at crate root for convenience
pub use common::config::{PagingConfig, SearchDefaults, TrieConfig, WILDCARD};
pub use common::{Error, NodeId, PagingId, Result};

pub use paging::{PagingSnapshot, PagingStats, SweepReport};
pub use search::{from_fn, AcceptAll, Candidate, MatchObserver, SearchResult, TraversalState, Verdict};
pub use trie::FuzzyTrie;
