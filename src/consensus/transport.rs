use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::blockchain::Block;
use crate::error::FetchError;

/// Chain payload served by `GET /api/v1/chain/` and decoded from peers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteChain {
    pub chain: Vec<Block>,
    pub length: usize,
}

impl From<Vec<Block>> for RemoteChain {
    fn from(chain: Vec<Block>) -> Self {
        Self {
            length: chain.len(),
            chain,
        }
    }
}

/// Read-only access to a peer's chain.
pub trait ChainFetcher: Send + Sync {
    fn fetch_chain(
        &self,
        authority: &str,
    ) -> impl Future<Output = Result<RemoteChain, FetchError>> + Send;
}

/// Fetches peer chains over HTTP.
#[derive(Debug, Clone)]
pub struct HttpChainFetcher {
    client: reqwest::Client,
}

impl HttpChainFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl ChainFetcher for HttpChainFetcher {
    async fn fetch_chain(&self, authority: &str) -> Result<RemoteChain, FetchError> {
        let url = format!("http://{authority}/api/v1/chain/");
        debug!("FETCH - GET {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                peer: authority.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                peer: authority.to_string(),
                status: response.status().as_u16(),
            });
        }

        let remote: RemoteChain = response.json().await.map_err(|e| FetchError::Malformed {
            peer: authority.to_string(),
            reason: e.to_string(),
        })?;

        if remote.length != remote.chain.len() {
            return Err(FetchError::Malformed {
                peer: authority.to_string(),
                reason: format!(
                    "reported length {} but sent {} blocks",
                    remote.length,
                    remote.chain.len()
                ),
            });
        }

        Ok(remote)
    }
}
