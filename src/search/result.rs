//! Search results.

use std::borrow::Cow;
use std::fmt;

/// One matched key with every value attached to it.
///
/// `key` keeps the case it was inserted with, even though matching ignores
/// ASCII case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub key: Vec<u8>,
    pub values: Vec<Vec<u8>>,
}

impl SearchResult {
    pub fn new(key: Vec<u8>, values: Vec<Vec<u8>>) -> Self {
        Self { key, values }
    }

    /// The key as UTF-8, with invalid sequences replaced.
    pub fn key_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.key)
    }

    /// The values as UTF-8, with invalid sequences replaced.
    pub fn values_lossy(&self) -> Vec<Cow<'_, str>> {
        self.values.iter().map(|v| String::from_utf8_lossy(v)).collect()
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => [{}]", self.key_lossy(), self.values_lossy().join(", "))
    }
}
