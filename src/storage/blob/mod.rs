//! Blob format for paged-out subtrees.
//!
//! This module contains:
//! - [`BlobHeader`] - Version, length and checksum framing
//! - [`PersistedNode`] - The pre-order node records inside a blob

mod blob_header;
mod subtree;

pub use blob_header::{BlobHeader, FORMAT_VERSION};
pub use subtree::{decode_subtree, encode_subtree, PersistedChildren, PersistedNode};
