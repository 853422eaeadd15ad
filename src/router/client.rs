//! Outbound HTTP client for one storage node, and the per-migration pool.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Result, anyhow};

use crate::storage::protocol::{
    DelForm, GetParams, PutForm, RangeParams, decode_pairs, ENDPOINT_ALL, ENDPOINT_DEL,
    ENDPOINT_GET, ENDPOINT_PUT, ENDPOINT_RANGE,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Thin wrapper around a reqwest client bound to one canonical node address.
///
/// Connections to the node are kept alive and reused across requests for as
/// long as the client lives. Every request carries a connect and a read
/// timeout; a node that does not answer promptly is treated as unreachable.
pub struct NodeClient {
    http: reqwest::Client,
    addr: String,
    base: String,
}

impl NodeClient {
    pub fn new(addr: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(REQUEST_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            addr: addr.to_string(),
            base: format!("http://{}", addr),
        })
    }

    /// The canonical address this client dials.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub async fn put(&self, key: &str, val: &str) -> Result<()> {
        let response = self
            .http
            .post(format!("{}{}", self.base, ENDPOINT_PUT))
            .form(&PutForm {
                key: key.to_string(),
                val: val.to_string(),
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(anyhow!("put to {} failed: {}", self.addr, response.status()));
        }
        Ok(())
    }

    pub async fn del(&self, key: &str) -> Result<()> {
        let response = self
            .http
            .post(format!("{}{}", self.base, ENDPOINT_DEL))
            .form(&DelForm {
                key: key.to_string(),
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(anyhow!("del on {} failed: {}", self.addr, response.status()));
        }
        Ok(())
    }

    /// Read a key. `Ok(None)` means the node answered 404.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let response = self
            .http
            .get(format!("{}{}", self.base, ENDPOINT_GET))
            .query(&GetParams {
                key: key.to_string(),
            })
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(anyhow!("get on {} failed: {}", self.addr, response.status()));
        }
        Ok(Some(response.text().await?))
    }

    /// Export every pair on the node whose key hash lies on `(start, end]`.
    pub async fn export_range(&self, start: u64, end: u64) -> Result<Vec<(String, String)>> {
        let response = self
            .http
            .get(format!("{}{}", self.base, ENDPOINT_RANGE))
            .query(&RangeParams { start, end })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "range export from {} failed: {}",
                self.addr,
                response.status()
            ));
        }
        Ok(decode_pairs(&response.text().await?))
    }

    /// Export every pair on the node.
    pub async fn export_all(&self) -> Result<Vec<(String, String)>> {
        let response = self
            .http
            .get(format!("{}{}", self.base, ENDPOINT_ALL))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "full export from {} failed: {}",
                self.addr,
                response.status()
            ));
        }
        Ok(decode_pairs(&response.text().await?))
    }
}

/// Owned cache of node clients keyed by canonical address.
///
/// A migration builds one pool, reuses clients across tasks that hit the
/// same node, and drops the whole pool (closing the pooled connections)
/// when it completes, on every exit path.
#[derive(Default)]
pub struct ClientPool {
    clients: HashMap<String, NodeClient>,
}

impl ClientPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the client for `addr`, creating it on first use.
    pub fn client(&mut self, addr: &str) -> Result<&NodeClient> {
        if !self.clients.contains_key(addr) {
            self.clients.insert(addr.to_string(), NodeClient::new(addr)?);
        }
        Ok(&self.clients[addr])
    }
}
