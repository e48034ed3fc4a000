//! Persisted form of a paged-out subtree.
//!
//! A blob holds the child list of one trie node as a flat pre-order list of
//! records, without parent links or arena slots. Each record carries its
//! child count, so the shape is rebuilt top-down on restore:
//!
//! ```text
//!   a ─┬─ t            [a:2] [t:0] [r:1] [g:0] [o:paged]
//!      └─ r ── g
//!   o (paged)
//! ```

use serde::{Deserialize, Serialize};

use crate::common::{Error, PagingId, Result};
use crate::storage::blob::{BlobHeader, FORMAT_VERSION};

/// One node of a persisted subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedNode {
    pub element: u8,
    pub sequence: Vec<u8>,
    pub terminal: bool,
    pub values: Vec<Vec<u8>>,
    pub children: PersistedChildren,
}

/// Children of a persisted node.
///
/// A subtree that was already paged when its ancestor got evicted keeps its
/// own blob; only the marker is carried here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistedChildren {
    /// The next this many subtrees in the record list.
    Resident(usize),
    Paged(PagingId),
}

/// Encode a record list into a framed blob: header followed by payload.
///
/// # Errors
/// - `Error::Codec` if postcard fails
/// - `Error::BlobTooLarge` if the payload does not fit the header
pub fn encode_subtree(nodes: &[PersistedNode]) -> Result<Vec<u8>> {
    let payload = postcard::to_allocvec(nodes)?;
    let header = BlobHeader::for_payload(&payload)?;

    let mut blob = vec![0u8; BlobHeader::SIZE];
    header.write_to(&mut blob);
    blob.extend_from_slice(&payload);
    Ok(blob)
}

/// Validate and decode a framed blob.
///
/// # Errors
/// - `Error::CorruptBlob` on a short buffer, unknown version, length or
///   checksum mismatch, or records that do not form whole subtrees
/// - `Error::Codec` if the payload does not decode
pub fn decode_subtree(id: PagingId, blob: &[u8]) -> Result<Vec<PersistedNode>> {
    let corrupt = |reason: String| Error::CorruptBlob { id, reason };

    if blob.len() < BlobHeader::SIZE {
        return Err(corrupt(format!("{} bytes is shorter than the header", blob.len())));
    }

    let header = BlobHeader::from_bytes(blob);
    if header.version != FORMAT_VERSION {
        return Err(corrupt(format!("unknown format version {}", header.version)));
    }

    let payload = &blob[BlobHeader::SIZE..];
    if payload.len() != header.payload_len as usize {
        return Err(corrupt(format!(
            "payload is {} bytes, header says {}",
            payload.len(),
            header.payload_len
        )));
    }
    if !header.verify_checksum(payload) {
        return Err(corrupt("checksum mismatch".into()));
    }

    let nodes: Vec<PersistedNode> = postcard::from_bytes(payload)?;
    let missing = open_children(&nodes);
    if missing > 0 {
        return Err(corrupt(format!("records end with {} children missing", missing)));
    }
    Ok(nodes)
}

/// Number of children announced by the records but not present in them.
///
/// Zero for a well-formed list.
fn open_children(nodes: &[PersistedNode]) -> usize {
    // Children still expected by each open ancestor, innermost last
    let mut pending: Vec<usize> = Vec::new();

    for node in nodes {
        if let Some(slots) = pending.last_mut() {
            *slots -= 1;
        }
        match node.children {
            PersistedChildren::Resident(count) if count > 0 => pending.push(count),
            _ => {
                while pending.last() == Some(&0) {
                    pending.pop();
                }
            }
        }
    }
    pending.iter().sum()
}
