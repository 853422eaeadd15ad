//! Node address canonicalization.
//!
//! Every address is normalized once, before it enters the ring or is dialed,
//! and the same canonical string is used for both. Without this, `localhost`
//! and `127.0.0.1` would place the same node at two distinct sets of ring
//! positions, and `localhost` may resolve to an IPv6 loopback while the node
//! listens on IPv4 only.

use anyhow::{Context, Result, bail};

/// Canonical form of a `host:port` address.
///
/// The host is lowercased and `localhost` is rewritten to `127.0.0.1`; the
/// port must parse as an unsigned 16-bit integer. The result is a fixed
/// point: canonicalizing it again returns it unchanged.
pub fn canonicalize(addr: &str) -> Result<String> {
    let addr = addr.trim();
    let Some((host, port)) = addr.rsplit_once(':') else {
        bail!("address must be host:port, got {:?}", addr);
    };
    if host.is_empty() {
        bail!("address has an empty host: {:?}", addr);
    }

    let port: u16 = port
        .parse()
        .with_context(|| format!("invalid port in {:?}", addr))?;

    let host = host.to_ascii_lowercase();
    let host = if host == "localhost" {
        "127.0.0.1".to_string()
    } else {
        host
    };

    Ok(format!("{}:{}", host, port))
}
