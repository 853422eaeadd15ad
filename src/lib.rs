//! Distributed In-Memory Key-Value Store Library
//!
//! This library crate defines the core modules of a horizontally-scalable
//! key-value store partitioned across independent storage nodes with
//! consistent hashing. It serves as the foundation for the two binaries:
//! the storage node server (`main.rs`) and the router REPL (`bin/router.rs`).
//!
//! ## Architecture Modules
//! The system is composed of three loosely coupled subsystems:
//!
//! - **`ring`**: The placement layer. Maps keys and virtual nodes onto a
//!   64-bit hash circle, resolves key ownership, and plans the minimal set of
//!   range migrations when the cluster topology changes.
//! - **`storage`**: The node-local state layer. A sharded in-memory map with
//!   per-shard locking, the HTTP endpoints that expose it, and an optional
//!   append-only write log for crash recovery.
//! - **`router`**: The client-side orchestration layer. Canonicalizes node
//!   addresses, resolves keys to owners, drives user reads and writes, and
//!   executes the live migration protocol on membership changes.

pub mod ring;
pub mod router;
pub mod storage;
