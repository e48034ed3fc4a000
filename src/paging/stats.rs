//! Paging statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the serializer and the eviction scheduler.
///
/// All fields are atomic so the stats can be read without taking the trie
/// lock. `Ordering::Relaxed` is enough: counters are independent and only
/// need to be atomic, not ordered against each other.
///
/// # Example
/// ```
/// use fuzzytrie::PagingStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = PagingStats::new();
/// stats.subtrees_evicted.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().subtrees_evicted, 1);
/// ```
#[derive(Debug)]
pub struct PagingStats {
    /// Subtrees written to a blob.
    pub subtrees_evicted: AtomicU64,

    /// Subtrees read back from a blob.
    pub subtrees_restored: AtomicU64,

    /// Nodes that left memory through eviction.
    pub nodes_paged_out: AtomicU64,

    /// Nodes that came back through restoration.
    pub nodes_paged_in: AtomicU64,

    /// Blob bytes written.
    pub bytes_written: AtomicU64,

    /// Blob bytes read.
    pub bytes_read: AtomicU64,

    /// Blobs deleted without being restored (their subtree was removed).
    pub blobs_discarded: AtomicU64,

    /// Completed sweeps.
    pub sweeps: AtomicU64,
}

impl PagingStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self {
            subtrees_evicted: AtomicU64::new(0),
            subtrees_restored: AtomicU64::new(0),
            nodes_paged_out: AtomicU64::new(0),
            nodes_paged_in: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            bytes_read: AtomicU64::new(0),
            blobs_discarded: AtomicU64::new(0),
            sweeps: AtomicU64::new(0),
        }
    }

    pub(crate) fn record_eviction(&self, nodes: usize, bytes: usize) {
        self.subtrees_evicted.fetch_add(1, Ordering::Relaxed);
        self.nodes_paged_out.fetch_add(nodes as u64, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_restore(&self, nodes: usize, bytes: usize) {
        self.subtrees_restored.fetch_add(1, Ordering::Relaxed);
        self.nodes_paged_in.fetch_add(nodes as u64, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> PagingSnapshot {
        PagingSnapshot {
            subtrees_evicted: self.subtrees_evicted.load(Ordering::Relaxed),
            subtrees_restored: self.subtrees_restored.load(Ordering::Relaxed),
            nodes_paged_out: self.nodes_paged_out.load(Ordering::Relaxed),
            nodes_paged_in: self.nodes_paged_in.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            blobs_discarded: self.blobs_discarded.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.subtrees_evicted.store(0, Ordering::Relaxed);
        self.subtrees_restored.store(0, Ordering::Relaxed);
        self.nodes_paged_out.store(0, Ordering::Relaxed);
        self.nodes_paged_in.store(0, Ordering::Relaxed);
        self.bytes_written.store(0, Ordering::Relaxed);
        self.bytes_read.store(0, Ordering::Relaxed);
        self.blobs_discarded.store(0, Ordering::Relaxed);
        self.sweeps.store(0, Ordering::Relaxed);
    }
}

impl Default for PagingStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time copy of [`PagingStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PagingSnapshot {
    pub subtrees_evicted: u64,
    pub subtrees_restored: u64,
    pub nodes_paged_out: u64,
    pub nodes_paged_in: u64,
    pub bytes_written: u64,
    pub bytes_read: u64,
    pub blobs_discarded: u64,
    pub sweeps: u64,
}

impl PagingSnapshot {
    /// Subtrees still on disk, counting only those written and later
    /// restored or discarded by this trie.
    pub fn outstanding(&self) -> u64 {
        self.subtrees_evicted
            .saturating_sub(self.subtrees_restored + self.blobs_discarded)
    }
}

impl fmt::Display for PagingSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Paging {{ evicted: {}, restored: {}, discarded: {}, nodes out: {}, nodes in: {}, sweeps: {} }}",
            self.subtrees_evicted,
            self.subtrees_restored,
            self.blobs_discarded,
            self.nodes_paged_out,
            self.nodes_paged_in,
            self.sweeps
        )
    }
}
