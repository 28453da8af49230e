//! Outbound Peer Client
//!
//! One thin HTTP client shared by the membership protocol and the storage
//! forwarding path. Every call is a blocking round trip with a fixed
//! timeout; the timeout is what turns a silent peer into a detected
//! failure.

use std::time::Duration;

use axum::http::StatusCode;
use bytes::Bytes;
use thiserror::Error;

use super::protocol::{
    LinkSlot, NodeInfo, ENDPOINT_ASSERT_NETWORK, ENDPOINT_LINK, ENDPOINT_NODE_INFO,
    ENDPOINT_STORAGE,
};
use crate::error::NodeError;

/// How long an outbound call may take before the peer counts as dead.
const PEER_TIMEOUT: Duration = Duration::from_secs(2);

/// The ring walk nests one round trip per remaining hop, so handing it off
/// gets a budget proportional to a whole ring, not a single peer.
const WALK_TIMEOUT: Duration = Duration::from_secs(30);

/// One failed round trip to a peer.
///
/// The protocol treats both variants as peer death: a node that answers
/// with an error status (it may be simulating a crash) and a node that
/// does not answer at all start the same recovery path.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("peer {addr} answered {status}")]
    Status {
        addr: String,
        status: StatusCode,
        body: String,
    },

    #[error("peer {addr} unreachable: {source}")]
    Transport {
        addr: String,
        #[source]
        source: reqwest::Error,
    },
}

impl From<PeerError> for NodeError {
    fn from(err: PeerError) -> Self {
        match err {
            PeerError::Status { status, body, .. } => NodeError::Upstream { status, body },
            PeerError::Transport { .. } => NodeError::Unreachable,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PeerClient {
    http: reqwest::Client,
}

impl PeerClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Fetches a peer's identity and neighborhood.
    pub async fn node_info(&self, addr: &str) -> Result<NodeInfo, PeerError> {
        let url = format!("http://{}{}", addr, ENDPOINT_NODE_INFO);
        let response = self
            .http
            .get(url)
            .timeout(PEER_TIMEOUT)
            .send()
            .await
            .map_err(|source| PeerError::Transport {
                addr: addr.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PeerError::Status {
                addr: addr.to_string(),
                status,
                body,
            });
        }

        response.json::<NodeInfo>().await.map_err(|source| PeerError::Transport {
            addr: addr.to_string(),
            source,
        })
    }

    /// Asks a peer to update one of its neighbor pointers.
    pub async fn link(&self, addr: &str, slot: LinkSlot, target: &str) -> Result<(), PeerError> {
        let url = format!("http://{}{}/{}/{}", addr, ENDPOINT_LINK, slot, target);
        let response = self
            .http
            .post(url)
            .timeout(PEER_TIMEOUT)
            .send()
            .await
            .map_err(|source| PeerError::Transport {
                addr: addr.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PeerError::Status {
                addr: addr.to_string(),
                status,
                body,
            });
        }
        Ok(())
    }

    /// Hands the ring walk to the next node and returns its verdict as-is.
    pub async fn assert_network(
        &self,
        addr: &str,
        origin: &str,
    ) -> Result<(StatusCode, String), PeerError> {
        let url = format!("http://{}{}/{}", addr, ENDPOINT_ASSERT_NETWORK, origin);
        let response = self
            .http
            .post(url)
            .timeout(WALK_TIMEOUT)
            .send()
            .await
            .map_err(|source| PeerError::Transport {
                addr: addr.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Ok((status, body))
    }

    /// Forwards a PUT one hop; status and body are relayed untouched.
    pub async fn forward_put(
        &self,
        addr: &str,
        key: &str,
        value: Bytes,
    ) -> Result<(StatusCode, Bytes), PeerError> {
        let url = format!("http://{}{}/{}", addr, ENDPOINT_STORAGE, key);
        let response = self
            .http
            .put(url)
            .timeout(PEER_TIMEOUT)
            .body(value)
            .send()
            .await
            .map_err(|source| PeerError::Transport {
                addr: addr.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.bytes().await.unwrap_or_default();
        Ok((status, body))
    }

    /// Forwards a GET one hop; status and body are relayed untouched.
    pub async fn forward_get(&self, addr: &str, key: &str) -> Result<(StatusCode, Bytes), PeerError> {
        let url = format!("http://{}{}/{}", addr, ENDPOINT_STORAGE, key);
        let response = self
            .http
            .get(url)
            .timeout(PEER_TIMEOUT)
            .send()
            .await
            .map_err(|source| PeerError::Transport {
                addr: addr.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.bytes().await.unwrap_or_default();
        Ok((status, body))
    }
}
