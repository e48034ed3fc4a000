//! Configuration for fuzzytrie.
//!
//! Constants live at the top; the runtime [`TrieConfig`] can be built in code
//! or loaded from a TOML file:
//!
//! ```toml
//! [search]
//! max_typos = 2
//! max_results = 10
//!
//! [paging]
//! enabled = true
//! interval_secs = 1200
//! sweep_depth = 3
//! sweep_iterations = 3
//! node_threshold = 1000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::common::{Error, Result};

/// Query byte that turns the rest of a query into "any continuation".
pub const WILDCARD: u8 = b'*';

/// Default edit-distance budget for [`FuzzyTrie::search_default`].
///
/// [`FuzzyTrie::search_default`]: crate::FuzzyTrie::search_default
pub const DEFAULT_MAX_TYPOS: usize = 2;

/// Default result budget for [`FuzzyTrie::search_default`].
///
/// [`FuzzyTrie::search_default`]: crate::FuzzyTrie::search_default
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Delay between two scheduled eviction sweeps (20 minutes).
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 20 * 60;

/// Depth below the sweep origin at which eviction candidates are collected.
pub const DEFAULT_SWEEP_DEPTH: usize = 3;

/// How many levels the sweep may descend before giving up.
///
/// Also the multiplier of [`DEFAULT_NODE_THRESHOLD`] at the top level.
pub const DEFAULT_SWEEP_ITERATIONS: usize = 3;

/// Resident node count above which a subtree is worth paging out,
/// per remaining sweep iteration.
pub const DEFAULT_NODE_THRESHOLD: usize = 1000;

/// Full runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TrieConfig {
    pub search: SearchDefaults,
    pub paging: PagingConfig,
}

/// Budgets used when the caller does not pass their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchDefaults {
    pub max_typos: usize,
    pub max_results: usize,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            max_typos: DEFAULT_MAX_TYPOS,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// Eviction scheduler and scratch storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Start the background scheduler. Manual sweeps work either way.
    pub enabled: bool,
    pub interval_secs: u64,
    pub sweep_depth: usize,
    pub sweep_iterations: usize,
    pub node_threshold: usize,
    /// Where blobs go. `None` means a private directory under the system
    /// temp dir, removed when the trie is dropped.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            sweep_depth: DEFAULT_SWEEP_DEPTH,
            sweep_iterations: DEFAULT_SWEEP_ITERATIONS,
            node_threshold: DEFAULT_NODE_THRESHOLD,
            scratch_dir: None,
        }
    }
}

impl PagingConfig {
    #[inline]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl TrieConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: TrieConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject values the scheduler cannot work with.
    pub fn validate(&self) -> Result<()> {
        let paging = &self.paging;
        if paging.interval_secs == 0 {
            return Err(Error::InvalidConfig(
                "paging.interval_secs must be > 0".into(),
            ));
        }
        if paging.sweep_depth == 0 {
            return Err(Error::InvalidConfig("paging.sweep_depth must be > 0".into()));
        }
        if paging.node_threshold == 0 {
            return Err(Error::InvalidConfig(
                "paging.node_threshold must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrieConfig::default();
        assert_eq!(config.search.max_typos, 2);
        assert_eq!(config.search.max_results, 10);
        assert!(config.paging.enabled);
        assert_eq!(config.paging.interval(), Duration::from_secs(1200));
        assert_eq!(config.paging.scratch_dir, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TrieConfig::from_toml_str(
            r#"
            [search]
            max_typos = 1

            [paging]
            enabled = false
            scratch_dir = "/tmp/ft"
            "#,
        )
        .unwrap();

        assert_eq!(config.search.max_typos, 1);
        assert_eq!(config.search.max_results, DEFAULT_MAX_RESULTS);
        assert!(!config.paging.enabled);
        assert_eq!(config.paging.sweep_depth, DEFAULT_SWEEP_DEPTH);
        assert_eq!(config.paging.scratch_dir, Some(PathBuf::from("/tmp/ft")));
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(TrieConfig::from_toml_str("").unwrap(), TrieConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = TrieConfig::from_toml_str("[paging]\nsweep_depth = 0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = TrieConfig::from_toml_str("[paging]\ninterval_secs = 0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = TrieConfig::from_toml_str("[search\nmax_typos = 1").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[search]\nmax_results = 3\n").unwrap();

        let config = TrieConfig::from_file(&path).unwrap();
        assert_eq!(config.search.max_results, 3);

        assert!(TrieConfig::from_file(dir.path().join("missing.toml")).is_err());
    }
}
