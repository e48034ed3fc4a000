//! Blob Store - scratch-directory file I/O for paged subtrees.
//!
//! The [`BlobStore`] handles all direct file operations:
//! - Allocating unique paging identifiers
//! - Writing, reading and removing blobs
//! - Owning (and cleaning up) a private scratch directory

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::common::{Error, PagingId, Result};

/// Manages the blob files of one trie.
///
/// # Directory Layout
/// One file per paged subtree, named after its [`PagingId`]:
/// ```text
/// <dir>/
///   0000000000000000.blob
///   0000000000000001.blob
///   ...
/// ```
///
/// # Thread Safety
/// `BlobStore` is **single-threaded**. The trie lock serializes access.
///
/// # Durability
/// None. Blobs are scratch space: writes are not fsynced and nothing is
/// ever reopened by a later process.
pub struct BlobStore {
    dir: PathBuf,
    /// Next identifier to try in `allocate_id`.
    next_id: u64,
    /// Number of blobs currently on disk that this store wrote.
    blob_count: usize,
    /// Private scratch directory, removed on drop.
    owned: Option<TempDir>,
}

impl BlobStore {
    /// Use `dir` as the scratch directory, creating it if needed.
    ///
    /// The directory is left in place on drop.
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            next_id: 0,
            blob_count: 0,
            owned: None,
        })
    }

    /// Create a private scratch directory under the system temp dir.
    ///
    /// The name gets a random suffix, so a directory left by an earlier
    /// process is never reused. The directory and every blob left in it are
    /// removed on drop.
    pub fn temporary() -> Result<Self> {
        let owned = tempfile::Builder::new().prefix("fuzzytrie-").tempdir()?;

        let mut store = Self::create(owned.path())?;
        store.owned = Some(owned);
        Ok(store)
    }

    /// Hand out an identifier that no blob in the directory uses yet.
    ///
    /// Skips over files left behind by an earlier process sharing the
    /// directory.
    pub fn allocate_id(&mut self) -> PagingId {
        loop {
            let id = PagingId::new(self.next_id);
            self.next_id += 1;
            if !self.path_of(id).exists() {
                return id;
            }
        }
    }

    /// Write a new blob.
    ///
    /// # Errors
    /// Fails if a blob with this id already exists or the write fails.
    pub fn write_blob(&mut self, id: PagingId, data: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.path_of(id))?;
        file.write_all(data)?;

        self.blob_count += 1;
        Ok(())
    }

    /// Read a blob.
    ///
    /// # Errors
    /// Returns `Error::BlobNotFound` if the blob doesn't exist.
    pub fn read_blob(&self, id: PagingId) -> Result<Vec<u8>> {
        fs::read(self.path_of(id)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::BlobNotFound(id),
            _ => Error::Io(e),
        })
    }

    /// Delete a blob.
    ///
    /// # Errors
    /// Returns `Error::BlobNotFound` if the blob doesn't exist.
    pub fn remove_blob(&mut self, id: PagingId) -> Result<()> {
        fs::remove_file(self.path_of(id)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::BlobNotFound(id),
            _ => Error::Io(e),
        })?;

        self.blob_count = self.blob_count.saturating_sub(1);
        Ok(())
    }

    /// Check whether a blob exists on disk.
    #[inline]
    pub fn contains(&self, id: PagingId) -> bool {
        self.path_of(id).exists()
    }

    /// Number of blobs written by this store and not yet removed.
    #[inline]
    pub fn blob_count(&self) -> usize {
        self.blob_count
    }

    /// The scratch directory.
    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_of(&self, id: PagingId) -> PathBuf {
        self.dir.join(id.file_name())
    }
}

impl Drop for BlobStore {
    fn drop(&mut self) {
        if let Some(owned) = self.owned.take() {
            if let Err(e) = owned.close() {
                tracing::warn!(dir = %self.dir.display(), error = %e, "failed to remove scratch directory");
            }
        }
    }
}
