//! Time-bucketed index of accepted entries.
//!
//! Maps a claimed timestamp to the set of entries recorded under it. A bucket is
//! a set, so distinct entries can share one timestamp while identical ones
//! collapse. Eviction removes whole buckets.

use std::collections::{HashMap, HashSet};

use crate::payload::SecureData;

#[derive(Debug, Default)]
pub(crate) struct BucketIndex {
    buckets: HashMap<i64, HashSet<SecureData>>,
}

impl BucketIndex {
    pub fn contains(&self, timestamp: i64, entry: &SecureData) -> bool {
        self.buckets
            .get(&timestamp)
            .map_or(false, |bucket| bucket.contains(entry))
    }

    /// Records `entry` under `timestamp`. Returns `false` if it was already present.
    pub fn insert(&mut self, timestamp: i64, entry: SecureData) -> bool {
        self.buckets.entry(timestamp).or_default().insert(entry)
    }

    /// Drops every bucket whose key satisfies `is_stale`. Returns the number of
    /// buckets removed.
    pub fn evict<F>(&mut self, mut is_stale: F) -> usize
    where
        F: FnMut(i64) -> bool,
    {
        let before = self.buckets.len();
        self.buckets.retain(|timestamp, _| !is_stale(*timestamp));
        before - self.buckets.len()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn bucket_len(&self, timestamp: i64) -> usize {
        self.buckets.get(&timestamp).map_or(0, HashSet::len)
    }

    pub fn entry_count(&self) -> usize {
        self.buckets.values().map(HashSet::len).sum()
    }
}
