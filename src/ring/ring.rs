//! Hash ring membership and the range migration planner.

use std::collections::BTreeMap;

use super::hash::hash_key;

/// Default number of virtual nodes per physical node.
pub const DEFAULT_VIRTUAL_NODES: u32 = 100;

/// One range of keys that must move onto a newly added node.
///
/// Every key whose hash lies on the arc `(start, end]` and that currently
/// lives on `source` belongs to the new node after the topology change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationTask {
    /// The node that holds the keys today (the victim of the rebalance).
    pub source: String,
    /// Exclusive lower bound of the arc.
    pub start: u64,
    /// Inclusive upper bound of the arc.
    pub end: u64,
}

/// Consistent hash ring mapping 64-bit positions to node addresses.
///
/// Each member contributes `virtual_nodes` positions, derived by hashing
/// `"{address}#{index}"`. Multiple positions map to the same address; a hash
/// collision between two virtual nodes is resolved last-writer-wins and is
/// tolerated by every consumer of the ring.
///
/// The ring is process-local state of whoever owns it (in practice the
/// router); there is no cross-process coordination of membership views.
#[derive(Debug, Clone)]
pub struct HashRing {
    ring: BTreeMap<u64, String>,
    virtual_nodes: u32,
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new(DEFAULT_VIRTUAL_NODES)
    }
}

impl HashRing {
    /// Create an empty ring with `virtual_nodes` positions per member.
    pub fn new(virtual_nodes: u32) -> Self {
        Self {
            ring: BTreeMap::new(),
            virtual_nodes: virtual_nodes.max(1),
        }
    }

    /// Insert all virtual nodes of `addr` into the ring.
    ///
    /// Idempotent: re-adding an existing member recomputes the same
    /// positions and overwrites them with the same value.
    pub fn add_node(&mut self, addr: &str) {
        for i in 0..self.virtual_nodes {
            let position = hash_key(&format!("{}#{}", addr, i));
            self.ring.insert(position, addr.to_string());
        }
    }

    /// Remove every ring entry owned by `addr`. Idempotent.
    ///
    /// Filters by value instead of recomputing virtual node hashes, so a
    /// member inserted under a different hash function in the past is still
    /// fully removable.
    pub fn remove_node(&mut self, addr: &str) {
        self.ring.retain(|_, owner| owner != addr);
    }

    /// Resolve the owner of `key`, or `None` if the ring is empty.
    ///
    /// The owner is the node at the smallest position at or after
    /// `hash(key)`, wrapping to the smallest position on the ring.
    pub fn get_node(&self, key: &str) -> Option<&str> {
        if self.ring.is_empty() {
            return None;
        }
        let h = hash_key(key);
        self.ring
            .range(h..)
            .next()
            .or_else(|| self.ring.iter().next())
            .map(|(_, addr)| addr.as_str())
    }

    /// Whether `addr` currently owns at least one ring position.
    pub fn contains_node(&self, addr: &str) -> bool {
        self.ring.values().any(|owner| owner == addr)
    }

    /// Number of distinct member nodes.
    pub fn node_count(&self) -> usize {
        let mut owners: Vec<&str> = self.ring.values().map(String::as_str).collect();
        owners.sort_unstable();
        owners.dedup();
        owners.len()
    }

    /// Total number of occupied ring positions.
    pub fn position_count(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// All ring positions in ascending order, with their owners.
    ///
    /// Exposed for topology inspection; the arcs `(predecessor(p), p]` over
    /// these positions partition the full 64-bit circle.
    pub fn positions(&self) -> impl Iterator<Item = (u64, &str)> {
        self.ring.iter().map(|(pos, addr)| (*pos, addr.as_str()))
    }

    /// Plan the minimal set of range moves after `new_node` joined.
    ///
    /// Must be called with `new_node` already inserted: each of its ring
    /// positions `p` claims the arc `(predecessor(p), p]`, and the keys on
    /// that arc have to be pulled from the member that owned it before.
    ///
    /// The previous owner is found by walking clockwise from `p` to the
    /// first position held by a foreign node. The immediate successor is
    /// often another virtual node of `new_node` itself, so the walk may skip
    /// several positions; if it comes back around to `p`, the new node is
    /// the only member and there is nothing to move.
    ///
    /// Zero-length arcs (a collision between `p` and its predecessor) are
    /// skipped: `in_range` on equal bounds matches the whole circle, which
    /// would turn one degenerate entry into a full cluster drain.
    pub fn rebalancing_tasks(&self, new_node: &str) -> Vec<MigrationTask> {
        if self.ring.is_empty() {
            return Vec::new();
        }

        let entries: Vec<(u64, &str)> = self.positions().collect();
        let n = entries.len();
        let mut tasks = Vec::new();

        for (idx, &(pos, owner)) in entries.iter().enumerate() {
            if owner != new_node {
                continue;
            }

            let end = pos;
            let start = if idx == 0 {
                entries[n - 1].0
            } else {
                entries[idx - 1].0
            };
            if start == end {
                continue;
            }

            let mut victim = None;
            let mut j = (idx + 1) % n;
            while j != idx {
                if entries[j].1 != new_node {
                    victim = Some(entries[j].1);
                    break;
                }
                j = (j + 1) % n;
            }

            if let Some(source) = victim {
                tasks.push(MigrationTask {
                    source: source.to_string(),
                    start,
                    end,
                });
            }
        }

        tasks
    }
}
