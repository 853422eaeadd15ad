//! Storage Node Module
//!
//! Implements the node-local half of the system: a sharded in-memory
//! key-value store and the HTTP surface that exposes it to the router.
//!
//! ## Core Concepts
//! - **Sharding**: The local key space is split across a fixed array of 16
//!   independent maps, each guarded by its own mutex. A request touches at
//!   most one shard lock at a time, so no deadlock is possible.
//! - **Range export**: `/range` streams every local pair whose key hash lies
//!   on a requested arc of the hash circle. This is what feeds migration; the
//!   node answering is handing over keys it no longer owns.
//! - **Write log**: An optional append-only log replays the node's writes
//!   (including deletions) on restart.

pub mod handlers;
pub mod protocol;
pub mod shards;
pub mod wal;

#[cfg(test)]
mod tests;
