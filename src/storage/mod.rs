//! Storage layer - scratch files for paged subtrees.
//!
//! This module handles everything that touches disk:
//! - [`BlobStore`] - Low-level blob file I/O
//! - [`blob`] - Blob framing and persisted node records

pub mod blob;
mod blob_store;

pub use blob_store::BlobStore;
