//! Cluster view and migration driver.
//!
//! `ClusterRouter` owns this process's view of the ring and executes every
//! operation against it: user reads and writes, and the two migration flows
//! that run on membership changes.
//!
//! ## Ordering guarantees
//! Migration tasks run strictly one after another, and within a task each
//! pair is written to the destination before it is deleted from the source.
//! At every instant a key is present on at least one node: a reader on the
//! old topology still finds it on the source, a reader on the new topology
//! finds it on the destination as soon as the write lands. A failed delete
//! leaves a duplicate behind, which is logged and tolerated; the ring
//! resolves reads to the destination, so the stale copy is unreachable.

use anyhow::{Result, bail};

use crate::ring::ring::HashRing;

use super::addr::canonicalize;
use super::client::{ClientPool, NodeClient};

/// Counters for one migration run. Failures are counted, not retried; the
/// operator decides whether to reissue the command.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    /// Pairs written to the destination and deleted from the source.
    pub moved: usize,
    /// Pairs written to the destination whose source delete failed; the key
    /// now exists on both nodes.
    pub duplicated: usize,
    /// Pairs that could not be written to the destination and were left on
    /// the source untouched.
    pub skipped: usize,
    /// Range or full exports that failed outright.
    pub failed_exports: usize,
}

/// The router: a process-local ring plus the client connections to drive it.
pub struct ClusterRouter {
    ring: HashRing,
    clients: ClientPool,
}

impl Default for ClusterRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterRouter {
    pub fn new() -> Self {
        Self {
            ring: HashRing::default(),
            clients: ClientPool::new(),
        }
    }

    pub fn ring(&self) -> &HashRing {
        &self.ring
    }

    /// Add a node to the ring and pull the ranges it now owns from their
    /// previous owners.
    ///
    /// The ring is updated first; the planner then derives the minimal task
    /// set from the new topology. Re-adding a member is harmless: its arcs
    /// export nothing from the other nodes and the flow degenerates to a
    /// no-op.
    pub async fn add_node(&mut self, addr: &str) -> Result<MigrationReport> {
        let addr = canonicalize(addr)?;

        self.ring.add_node(&addr);
        let tasks = self.ring.rebalancing_tasks(&addr);
        tracing::info!("Added {} to ring, planned {} migration tasks", addr, tasks.len());

        let destination = NodeClient::new(&addr)?;
        let mut sources = ClientPool::new();
        let mut report = MigrationReport::default();

        for task in &tasks {
            let source = sources.client(&task.source)?;
            let pairs = match source.export_range(task.start, task.end).await {
                Ok(pairs) => pairs,
                Err(e) => {
                    tracing::warn!(
                        "Range export ({}, {}] from {} failed: {}",
                        task.start,
                        task.end,
                        task.source,
                        e
                    );
                    report.failed_exports += 1;
                    continue;
                }
            };

            for (key, val) in pairs {
                // Write to the destination first. If that fails the key
                // stays on the source, still reachable under the old view.
                if let Err(e) = destination.put(&key, &val).await {
                    tracing::warn!("Move of key {} to {} failed: {}", key, addr, e);
                    report.skipped += 1;
                    continue;
                }
                match source.del(&key).await {
                    Ok(()) => report.moved += 1,
                    Err(e) => {
                        tracing::warn!(
                            "Delete of key {} on {} failed, key is now duplicated: {}",
                            key,
                            task.source,
                            e
                        );
                        report.duplicated += 1;
                    }
                }
            }
        }

        tracing::info!(
            "Migration to {} done: {} moved, {} duplicated, {} skipped, {} failed exports",
            addr,
            report.moved,
            report.duplicated,
            report.skipped,
            report.failed_exports
        );
        Ok(report)
    }

    /// Drain a node and remove it from the ring.
    ///
    /// The victim's full contents are exported before the ring changes, so
    /// the export is a single bulk call rather than one range per arc (after
    /// removal every key must move and the successors vary per key). An
    /// unreachable victim is removed anyway: the operator has declared the
    /// node gone, and whatever it held is lost.
    pub async fn remove_node(&mut self, addr: &str) -> Result<MigrationReport> {
        let addr = canonicalize(addr)?;

        let victim = NodeClient::new(&addr)?;
        let pairs = match victim.export_all().await {
            Ok(pairs) => pairs,
            Err(e) => {
                tracing::warn!(
                    "Victim {} is unreachable, removing it without draining: {}",
                    addr,
                    e
                );
                Vec::new()
            }
        };

        // Remove before re-routing so get_node resolves to the surviving
        // owners.
        self.ring.remove_node(&addr);
        tracing::info!("Removed {} from ring, draining {} pairs", addr, pairs.len());

        let mut targets = ClientPool::new();
        let mut report = MigrationReport::default();

        for (key, val) in pairs {
            let Some(owner) = self.ring.get_node(&key) else {
                tracing::warn!("No surviving owner for key {}, dropping it", key);
                report.skipped += 1;
                continue;
            };
            let owner = owner.to_string();

            let target = targets.client(&owner)?;
            if let Err(e) = target.put(&key, &val).await {
                tracing::warn!("Move of key {} to {} failed: {}", key, owner, e);
                report.skipped += 1;
                continue;
            }
            match victim.del(&key).await {
                Ok(()) => report.moved += 1,
                Err(e) => {
                    tracing::warn!(
                        "Delete of key {} on drained node {} failed: {}",
                        key,
                        addr,
                        e
                    );
                    report.duplicated += 1;
                }
            }
        }

        tracing::info!(
            "Drain of {} done: {} moved, {} duplicated, {} skipped",
            addr,
            report.moved,
            report.duplicated,
            report.skipped
        );
        Ok(report)
    }

    /// Write a key to its owning node.
    pub async fn set(&mut self, key: &str, val: &str) -> Result<()> {
        let Some(owner) = self.ring.get_node(key) else {
            bail!("no servers in the ring");
        };
        let owner = owner.to_string();
        self.clients.client(&owner)?.put(key, val).await
    }

    /// Read a key from its owning node. `Ok(None)` means the owner answered
    /// that the key does not exist.
    pub async fn get(&mut self, key: &str) -> Result<Option<String>> {
        let Some(owner) = self.ring.get_node(key) else {
            bail!("no servers in the ring");
        };
        let owner = owner.to_string();
        self.clients.client(&owner)?.get(key).await
    }

    /// Delete a key on its owning node.
    pub async fn del(&mut self, key: &str) -> Result<()> {
        let Some(owner) = self.ring.get_node(key) else {
            bail!("no servers in the ring");
        };
        let owner = owner.to_string();
        self.clients.client(&owner)?.del(key).await
    }
}
