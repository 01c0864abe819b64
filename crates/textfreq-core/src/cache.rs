//! Bounded search-result cache.
//!
//! ## Design
//!
//! The cache is a key → result map plus a parallel list of keys in
//! insertion order. The list drives FIFO eviction: when an insert pushes
//! the cache past [`CACHE_CAPACITY`] entries, the single oldest key is
//! dropped. Keys encode the compiled pattern together with every mode
//! flag, so the same literal word searched under different modes never
//! aliases.
//!
//! Invalidation after a replace/remove is deliberately conservative: any
//! entry whose cached result text still matches the replaced pattern is
//! purged, whether or not the mutation actually touched the rows it came
//! from. A stale positive can never survive a mutation that could have
//! altered it.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hard cap on stored entries.
pub const CACHE_CAPACITY: usize = 500;

/// A cached search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Matched rows, original case, prefixed with 1-based row numbers.
    pub rendered: String,
    /// Byte spans of every match inside the match-case view, for
    /// highlighting. Present only for detailed searches.
    pub spans: Option<Vec<(usize, usize)>>,
    /// Formatted count-by-row table. Present only for detailed searches.
    pub report: Option<String>,
}

/// Bounded key → [`SearchHit`] store with FIFO eviction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCache {
    entries: HashMap<String, SearchHit>,
    keys: Vec<String>,
}

impl SearchCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cache from persisted parts.
    #[must_use]
    pub fn from_parts(entries: HashMap<String, SearchHit>, keys: Vec<String>) -> Self {
        Self { entries, keys }
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Look up a cached result.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SearchHit> {
        self.entries.get(key)
    }

    /// The entry map, for persistence.
    #[must_use]
    pub fn entries(&self) -> &HashMap<String, SearchHit> {
        &self.entries
    }

    /// Insert a result, evicting the oldest entry once the cap is passed.
    ///
    /// The cache holds the new entry plus at most [`CACHE_CAPACITY`] - 1
    /// older ones when this returns; the 501st insert drops the very
    /// first key.
    pub fn insert(&mut self, key: String, hit: SearchHit) {
        self.keys.push(key.clone());
        self.entries.insert(key, hit);
        while self.entries.len() > CACHE_CAPACITY {
            let oldest = self.keys.remove(0);
            self.entries.remove(&oldest);
            debug!(key = %oldest, "evicted oldest cache entry");
        }
    }

    /// Purge every entry whose cached result text still matches the
    /// just-replaced pattern.
    ///
    /// Matching runs against the lowercased result text unless the
    /// replaced search was case-sensitive, mirroring how the entries were
    /// produced.
    pub fn invalidate(&mut self, pattern: &Regex, case_sensitive: bool) {
        let stale: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, hit)| {
                if case_sensitive {
                    pattern.is_match(&hit.rendered)
                } else {
                    pattern.is_match(&hit.rendered.to_lowercase())
                }
            })
            .map(|(key, _)| key.clone())
            .collect();
        for key in stale {
            self.entries.remove(&key);
            self.keys.retain(|k| k != &key);
            debug!(key = %key, "invalidated cache entry");
        }
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(text: &str) -> SearchHit {
        SearchHit {
            rendered: text.to_string(),
            spans: None,
            report: None,
        }
    }

    #[test]
    fn insert_and_lookup() {
        let mut cache = SearchCache::new();
        cache.insert("k1".to_string(), hit("№1: cat\n\n"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k1").unwrap().rendered, "№1: cat\n\n");
        assert!(cache.get("k2").is_none());
    }

    #[test]
    fn keys_track_insertion_order() {
        let mut cache = SearchCache::new();
        cache.insert("a".to_string(), hit("1"));
        cache.insert("b".to_string(), hit("2"));
        cache.insert("c".to_string(), hit("3"));
        assert_eq!(cache.keys(), ["a", "b", "c"]);
    }

    #[test]
    fn capacity_evicts_oldest_key() {
        let mut cache = SearchCache::new();
        for i in 0..=CACHE_CAPACITY {
            cache.insert(format!("key-{i}"), hit("row"));
        }
        // 501 inserts leave exactly 500 entries; the first key is gone.
        assert_eq!(cache.len(), CACHE_CAPACITY);
        assert_eq!(cache.keys().len(), CACHE_CAPACITY);
        assert!(cache.get("key-0").is_none());
        assert!(cache.get("key-1").is_some());
        assert!(cache.get(&format!("key-{CACHE_CAPACITY}")).is_some());
    }

    #[test]
    fn invalidate_purges_matching_results_case_insensitive() {
        let mut cache = SearchCache::new();
        cache.insert("cats".to_string(), hit("№1: The Cat sat\n\n"));
        cache.insert("dogs".to_string(), hit("№2: the dog ran\n\n"));
        let pattern = Regex::new(r"\bcat\b").unwrap();
        cache.invalidate(&pattern, false);
        assert!(cache.get("cats").is_none());
        assert!(cache.get("dogs").is_some());
        assert_eq!(cache.keys(), ["dogs"]);
    }

    #[test]
    fn invalidate_respects_case_sensitivity() {
        let mut cache = SearchCache::new();
        cache.insert("upper".to_string(), hit("№1: The Cat sat\n\n"));
        let pattern = Regex::new(r"\bcat\b").unwrap();
        // Case-sensitive matching does not see "Cat".
        cache.invalidate(&pattern, true);
        assert!(cache.get("upper").is_some());
        cache.invalidate(&pattern, false);
        assert!(cache.get("upper").is_none());
    }

    #[test]
    fn clear_empties_both_structures() {
        let mut cache = SearchCache::new();
        cache.insert("a".to_string(), hit("1"));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.keys().is_empty());
    }

    #[test]
    fn parts_roundtrip() {
        let mut cache = SearchCache::new();
        cache.insert("a".to_string(), hit("1"));
        cache.insert("b".to_string(), hit("2"));
        let rebuilt = SearchCache::from_parts(cache.entries().clone(), cache.keys().to_vec());
        assert_eq!(rebuilt, cache);
    }
}

#[cfg(kani)]
mod proofs {
    use super::*;

    /// The stored entry count never exceeds the capacity.
    #[kani::proof]
    #[kani::unwind(8)]
    fn insert_respects_capacity() {
        let mut cache = SearchCache::new();
        let rounds: usize = kani::any();
        kani::assume(rounds <= 6);
        for i in 0..rounds {
            cache.insert(
                format!("{i}"),
                SearchHit {
                    rendered: String::new(),
                    spans: None,
                    report: None,
                },
            );
        }
        kani::assert(cache.len() <= CACHE_CAPACITY, "cache exceeds capacity");
        kani::assert(cache.len() == cache.keys().len(), "key list out of sync");
    }
}
