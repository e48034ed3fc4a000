//! Common types and utilities shared across fuzzytrie.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`TrieConfig`](config::TrieConfig)
//! - Error types
//! - Identifiers (NodeId, PagingId)

pub mod config;
pub mod error;
mod node_id;
mod paging_id;

pub use error::{Error, Result};
pub use node_id::NodeId;
pub use paging_id::PagingId;
