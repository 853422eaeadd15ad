//! Router Module
//!
//! Implements the client-side orchestration layer: the component that knows
//! the cluster topology and drives every operation against it.
//!
//! ## Core Concepts
//! - **Resolution**: Every user key is resolved through the process-local
//!   hash ring to the canonical address of its owning node.
//! - **Migration driving**: On `ADD`, ranges are pulled from the previous
//!   owners into the new node; on `REMOVE`, the victim is drained and its
//!   keys re-routed. Both flows write to the destination before deleting
//!   from the source, so a key is never absent from every node.
//! - **Connection reuse**: Outbound clients are pooled per target address
//!   for the lifetime of a migration and released when it completes.

pub mod addr;
pub mod client;
pub mod cluster;
pub mod repl;
