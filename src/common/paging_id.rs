//! Paging identifier type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one paged-out subtree blob in the scratch directory.
///
/// Identifiers are handed out by [`BlobStore::allocate_id`] and are unique
/// for the lifetime of the store. They are persisted inside parent blobs
/// when a paged subtree is nested in another paged subtree.
///
/// # Example
/// ```
/// use fuzzytrie::PagingId;
///
/// let paging_id = PagingId::new(42);
/// assert_eq!(paging_id.file_name(), "000000000000002a.blob");
/// ```
///
/// [`BlobStore::allocate_id`]: crate::storage::BlobStore::allocate_id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PagingId(pub u64);

impl PagingId {
    /// Create a new PagingId.
    #[inline]
    pub fn new(id: u64) -> Self {
        PagingId(id)
    }

    /// Name of the blob file holding this subtree.
    pub fn file_name(&self) -> String {
        format!("{:016x}.blob", self.0)
    }
}

impl fmt::Display for PagingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Paging({})", self.0)
    }
}
