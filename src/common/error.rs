//! Error types for fuzzytrie.

use thiserror::Error;

use crate::common::PagingId;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in fuzzytrie.
///
/// Lookup misses are not errors: `delete` and `get` report them as `None`.
/// Everything here is a storage or configuration failure.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from scratch-directory operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A paged subtree has no blob on disk.
    ///
    /// The subtree behind this marker is unreachable until the blob reappears.
    #[error("Blob {0} not found")]
    BlobNotFound(PagingId),

    /// A blob failed header, length or checksum validation.
    #[error("Blob {id} is corrupt: {reason}")]
    CorruptBlob { id: PagingId, reason: String },

    /// A subtree encodes to more bytes than a blob header can describe.
    ///
    /// Nothing is written and the subtree stays in memory.
    #[error("Blob payload of {0} bytes exceeds the 4 GiB limit")]
    BlobTooLarge(usize),

    /// The node arena has no slot left to hand out.
    #[error("Node arena is full ({0} slots)")]
    ArenaFull(usize),

    /// A subtree could not be encoded or decoded.
    #[error("Codec error: {0}")]
    Codec(#[from] postcard::Error),

    /// The configuration file is not valid TOML for [`TrieConfig`].
    ///
    /// [`TrieConfig`]: crate::common::config::TrieConfig
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// A configuration value is out of range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
