//! FuzzyTrie - the public façade.
//!
//! Every operation takes the same exclusive lock for its full duration,
//! including the background eviction sweep. No caller can observe a
//! half-evicted or half-restored subtree; disk I/O done while paging is
//! paid by whoever holds the lock.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::common::config::TrieConfig;
use crate::common::Result;
use crate::index::NodeTree;
use crate::paging::{
    sweep, EvictionScheduler, PagingSnapshot, PagingStats, Serializer, SweepPolicy, SweepReport,
};
use crate::search::{engine, AcceptAll, MatchObserver, SearchContext, SearchResult};
use crate::storage::BlobStore;

/// A case-insensitive fuzzy index from byte-string keys to lists of values.
///
/// # Architecture
/// ```text
/// ┌────────────────────────────────────────────────────────────┐
/// │                        FuzzyTrie                           │
/// │  ┌──────────────────────────────────┐  ┌────────────────┐  │
/// │  │ tree: Arc<Mutex<NodeTree>>       │◀─│ scheduler      │  │
/// │  │  arena + root index + serializer │  │ (sweep thread) │  │
/// │  └──────────────────────────────────┘  └────────────────┘  │
/// │  ┌──────────────┐  ┌──────────────┐                        │
/// │  │ stats        │  │ config       │                        │
/// │  │ (atomics)    │  │ TrieConfig   │                        │
/// │  └──────────────┘  └──────────────┘                        │
/// └────────────────────────────────────────────────────────────┘
/// ```
///
/// # Usage
/// ```
/// use fuzzytrie::{AcceptAll, FuzzyTrie};
///
/// let trie = FuzzyTrie::new()?;
/// trie.add("Cat", "v1")?;
/// trie.add("Car", "v2")?;
///
/// let results = trie.search("cat", 1, 10, AcceptAll)?;
/// assert_eq!(results.len(), 2);
/// # Ok::<(), fuzzytrie::Error>(())
/// ```
pub struct FuzzyTrie {
    /// Declared first so the sweeper is joined before the tree drops.
    scheduler: Option<EvictionScheduler>,
    tree: Arc<Mutex<NodeTree>>,
    stats: Arc<PagingStats>,
    config: TrieConfig,
}

impl FuzzyTrie {
    /// Create an empty trie with default settings.
    ///
    /// Blobs go to a private temp directory and the eviction scheduler runs
    /// every 20 minutes.
    ///
    /// # Errors
    /// Fails if the scratch directory or the sweeper thread cannot be
    /// created.
    pub fn new() -> Result<Self> {
        Self::with_config(TrieConfig::default())
    }

    /// Create an empty trie with explicit settings.
    ///
    /// # Errors
    /// - `Error::InvalidConfig` if `config` does not validate
    /// - `Error::Io` if the scratch directory or the sweeper thread cannot
    ///   be created
    pub fn with_config(config: TrieConfig) -> Result<Self> {
        config.validate()?;

        let store = match &config.paging.scratch_dir {
            Some(dir) => BlobStore::create(dir)?,
            None => BlobStore::temporary()?,
        };
        debug!(dir = %store.dir().display(), "fuzzy trie scratch directory ready");

        let stats = Arc::new(PagingStats::new());
        let serializer = Serializer::new(store, Arc::clone(&stats));
        let tree = Arc::new(Mutex::new(NodeTree::new(serializer)));

        let scheduler = if config.paging.enabled {
            Some(EvictionScheduler::start(
                Arc::clone(&tree),
                config.paging.interval(),
                SweepPolicy::from(&config.paging),
            )?)
        } else {
            None
        };

        Ok(Self {
            scheduler,
            tree,
            stats,
            config,
        })
    }

    // ========================================================================
    // Core operations
    // ========================================================================

    /// Attach `value` to `key`.
    ///
    /// Adding the same key again appends another value. An empty key is
    /// silently ignored.
    ///
    /// # Errors
    /// Fails if a paged subtree on the key's path cannot be restored.
    pub fn add(&self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<()> {
        self.tree.lock().insert(key.as_ref(), value.as_ref())
    }

    /// Find keys within `max_typos` edits of `query`, ignoring ASCII case.
    ///
    /// A `*` in the query ends its literal part: the search then returns
    /// keys starting with that prefix, whatever `max_typos` is. At most
    /// `max_results` results are returned, in discovery order. `observer`
    /// sees each candidate once and can reject it.
    ///
    /// # Errors
    /// Fails if a paged subtree touched by the traversal cannot be
    /// restored.
    pub fn search<O: MatchObserver>(
        &self,
        query: impl AsRef<[u8]>,
        max_typos: usize,
        max_results: usize,
        mut observer: O,
    ) -> Result<Vec<SearchResult>> {
        let mut ctx = SearchContext::new(query.as_ref(), max_typos, max_results, &mut observer);
        let mut tree = self.tree.lock();
        engine::run(&mut tree, &mut ctx)?;
        Ok(ctx.found)
    }

    /// [`search`](Self::search) with the configured default budgets,
    /// accepting every candidate.
    pub fn search_default(&self, query: impl AsRef<[u8]>) -> Result<Vec<SearchResult>> {
        let defaults = self.config.search;
        self.search(query, defaults.max_typos, defaults.max_results, AcceptAll)
    }

    /// Remove `key` and return the values it held, or `None` if it was not
    /// present. Matching is exact and case-sensitive.
    pub fn delete(&self, key: impl AsRef<[u8]>) -> Result<Option<Vec<Vec<u8>>>> {
        self.tree.lock().remove(key.as_ref())
    }

    /// Values attached to exactly `key`.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Result<Option<Vec<Vec<u8>>>> {
        let mut tree = self.tree.lock();
        Ok(tree.get(key.as_ref())?.map(<[Vec<u8>]>::to_vec))
    }

    /// Number of keys.
    pub fn size(&self) -> usize {
        self.tree.lock().size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    // ========================================================================
    // Paging
    // ========================================================================

    /// Run one eviction sweep now, with the configured policy.
    pub fn sweep_now(&self) -> Result<SweepReport> {
        let policy = SweepPolicy::from(&self.config.paging);
        let mut tree = self.tree.lock();
        sweep(&mut tree, &policy)
    }

    /// Paging counters since creation.
    pub fn paging_stats(&self) -> PagingSnapshot {
        self.stats.snapshot()
    }

    /// Trie nodes currently held in memory.
    pub fn resident_nodes(&self) -> usize {
        self.tree.lock().resident_nodes()
    }

    /// Where paged subtrees are written.
    pub fn scratch_dir(&self) -> PathBuf {
        self.tree.lock().serializer.store().dir().to_path_buf()
    }

    #[inline]
    pub fn config(&self) -> &TrieConfig {
        &self.config
    }

    /// True while the background sweeper thread is alive.
    #[inline]
    pub fn scheduler_running(&self) -> bool {
        self.scheduler.as_ref().is_some_and(EvictionScheduler::is_running)
    }
}
