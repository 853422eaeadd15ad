//! Consistent Hashing Module
//!
//! Implements the placement layer shared by the router and the storage nodes.
//!
//! ## Core Concepts
//! - **Hash circle**: Every key and every virtual node is mapped to a 64-bit
//!   position. Ownership is resolved by ceiling search with wrap-around.
//! - **Virtual nodes**: Each physical node contributes `V` synthetic ring
//!   positions (default 100) to smooth load across the cluster.
//! - **Rebalancing**: When a node joins, the planner computes the minimal set
//!   of `(source, start, end]` ranges that must move onto it, leaving every
//!   other key in place.
//!
//! The hash function is part of the wire contract: the router and every node
//! must agree on it bit-for-bit, or range exports return the wrong key sets.

pub mod hash;
pub mod ring;

pub use hash::{hash_key, in_range};
pub use ring::{HashRing, MigrationTask};
