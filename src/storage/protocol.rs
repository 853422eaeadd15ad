//! Storage Wire Protocol
//!
//! Defines the HTTP endpoints a node exposes and the parameter shapes used
//! on both sides of the wire: the node deserializes them out of form bodies
//! and query strings, the router serializes them back in.
//!
//! All responses are `text/plain` except `/stats`, which returns JSON. The
//! bulk endpoints use a line-delimited pair encoding; keys and values must
//! not contain newlines, which the node enforces at write time.

use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Write or overwrite a single key (form body).
pub const ENDPOINT_PUT: &str = "/put";
/// Delete a single key (form body).
pub const ENDPOINT_DEL: &str = "/del";
/// Read a single key (query string).
pub const ENDPOINT_GET: &str = "/get";
/// Export every pair on a hash arc (query string). Feeds migration.
pub const ENDPOINT_RANGE: &str = "/range";
/// Export every pair on the node. Feeds cluster drain on node removal.
pub const ENDPOINT_ALL: &str = "/all";
/// Node statistics snapshot (JSON).
pub const ENDPOINT_STATS: &str = "/stats";

// --- Parameters ---

/// Form body of `POST /put`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PutForm {
    pub key: String,
    pub val: String,
}

/// Form body of `POST /del`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DelForm {
    pub key: String,
}

/// Query string of `GET /get`.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetParams {
    pub key: String,
}

/// Query string of `GET /range`: the half-open arc `(start, end]` as
/// unsigned 64-bit decimals. A missing or unparseable bound is a 400.
#[derive(Debug, Serialize, Deserialize)]
pub struct RangeParams {
    pub start: u64,
    pub end: u64,
}

/// Body of `GET /stats`.
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeStats {
    pub entries: usize,
    pub shard_entries: Vec<usize>,
    pub mem_used_mb: u64,
    pub mem_total_mb: u64,
}

// --- Pair encoding ---

/// Encode pairs for `/range` and `/all`: key line, value line, repeated.
///
/// The encoding has no escaping; it is only sound because writes containing
/// newlines are rejected before they reach a store.
pub fn encode_pairs(pairs: &[(String, String)]) -> String {
    let mut body = String::new();
    for (k, v) in pairs {
        body.push_str(k);
        body.push('\n');
        body.push_str(v);
        body.push('\n');
    }
    body
}

/// Decode a line-delimited pair body. The inverse of [`encode_pairs`] on
/// newline-free data; an unpaired trailing line is ignored.
pub fn decode_pairs(body: &str) -> Vec<(String, String)> {
    let lines: Vec<&str> = body.lines().collect();
    lines
        .chunks_exact(2)
        .map(|pair| (pair[0].to_string(), pair[1].to_string()))
        .collect()
}
