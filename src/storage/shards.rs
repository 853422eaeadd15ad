//! Sharded in-memory store.
//!
//! The unit of mutual exclusion is the shard: `put`, `get`, and `del` take a
//! single shard mutex, while the bulk exports acquire and release each shard
//! mutex in turn. An export is therefore not a cross-shard snapshot; each
//! shard is individually consistent at the moment it is read, which is the
//! only guarantee migration needs (the write-then-delete ordering on the
//! router covers stragglers).

use std::collections::HashMap;
use std::sync::Mutex;

use crate::ring::hash::{hash_key, in_range};

/// Number of independent shards per node. Fixed for the node's lifetime;
/// changing it invalidates nothing on the wire, but shard placement of keys
/// is derived from the shared hash, so it must stay identical across
/// restarts of the same process image.
pub const SHARD_COUNT: usize = 16;

/// Fixed array of mutex-guarded maps holding this node's slice of the key
/// space.
pub struct ShardedStore {
    shards: [Mutex<HashMap<String, String>>; SHARD_COUNT],
}

impl Default for ShardedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ShardedStore {
    pub fn new() -> Self {
        Self {
            shards: std::array::from_fn(|_| Mutex::new(HashMap::new())),
        }
    }

    /// Shard index for a key: the shared 64-bit hash modulo `SHARD_COUNT`.
    /// Stable across processes for a fixed hash function.
    pub fn shard_id(key: &str) -> usize {
        (hash_key(key) % SHARD_COUNT as u64) as usize
    }

    /// Insert or replace a key. Takes only the target shard's lock.
    pub fn put(&self, key: &str, val: &str) {
        let mut shard = self.shards[Self::shard_id(key)]
            .lock()
            .expect("shard mutex poisoned");
        shard.insert(key.to_string(), val.to_string());
    }

    /// Look up a key. Takes only the target shard's lock.
    pub fn get(&self, key: &str) -> Option<String> {
        let shard = self.shards[Self::shard_id(key)]
            .lock()
            .expect("shard mutex poisoned");
        shard.get(key).cloned()
    }

    /// Remove a key, returning whether it was present.
    pub fn del(&self, key: &str) -> bool {
        let mut shard = self.shards[Self::shard_id(key)]
            .lock()
            .expect("shard mutex poisoned");
        shard.remove(key).is_some()
    }

    /// Export every pair whose key hash lies on the arc `(start, end]`.
    ///
    /// Shard locks are taken one at a time; writes racing the export may or
    /// may not appear depending on which shard they land in.
    pub fn export_range(&self, start: u64, end: u64) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for shard in &self.shards {
            let shard = shard.lock().expect("shard mutex poisoned");
            for (k, v) in shard.iter() {
                if in_range(hash_key(k), start, end) {
                    pairs.push((k.clone(), v.clone()));
                }
            }
        }
        pairs
    }

    /// Export every pair on this node, shard by shard.
    pub fn export_all(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for shard in &self.shards {
            let shard = shard.lock().expect("shard mutex poisoned");
            for (k, v) in shard.iter() {
                pairs.push((k.clone(), v.clone()));
            }
        }
        pairs
    }

    /// Entry count per shard, for the stats endpoint.
    pub fn shard_entry_counts(&self) -> [usize; SHARD_COUNT] {
        std::array::from_fn(|i| {
            self.shards[i]
                .lock()
                .expect("shard mutex poisoned")
                .len()
        })
    }

    /// Total number of entries across all shards.
    pub fn entry_count(&self) -> usize {
        self.shard_entry_counts().iter().sum()
    }
}
