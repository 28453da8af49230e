use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::error::NodeError;
use crate::membership::peer::{PeerClient, PeerError};
use crate::membership::service::RingService;

/// The node's share of the distributed key/value mapping, plus the routing
/// logic that serves or forwards each request.
///
/// Only entries whose hashed key falls in the node's ownership interval
/// are authoritative; routing never mutates ring state (recovery does,
/// through the membership service).
pub struct ObjectStore {
    data: DashMap<String, Bytes>,
    ring: Arc<RingService>,
    peers: PeerClient,
}

/// Outcome of a storage operation, relayed to the requester as-is.
#[derive(Debug)]
pub enum StoreReply {
    /// The value was stored on this node.
    Stored(String),
    /// A locally served read.
    Value(Bytes),
    /// The verdict of the node the request was forwarded to.
    Forwarded { status: StatusCode, body: Bytes },
}

impl IntoResponse for StoreReply {
    fn into_response(self) -> Response {
        match self {
            StoreReply::Stored(key) => {
                (StatusCode::OK, format!("Value stored for {}", key)).into_response()
            }
            StoreReply::Value(value) => (StatusCode::OK, value).into_response(),
            StoreReply::Forwarded { status, body } => (status, body).into_response(),
        }
    }
}

impl ObjectStore {
    pub fn new(ring: Arc<RingService>, peers: PeerClient) -> Self {
        Self {
            data: DashMap::new(),
            ring,
            peers,
        }
    }

    /// Stores `value` under `key`: locally when this node owns the key's
    /// id, otherwise one hop clockwise.
    pub async fn put(&self, key: &str, value: Bytes) -> Result<StoreReply, NodeError> {
        if self.ring.owns_key(key).await {
            self.data.insert(key.to_string(), value);
            debug!("stored {} locally", key);
            return Ok(StoreReply::Stored(key.to_string()));
        }
        self.forward(key, Some(value)).await
    }

    /// Looks up `key`: locally when owned, otherwise one hop clockwise.
    /// An owned key with no entry is a definitive 404; the owner is the
    /// one place the key could have been.
    pub async fn get(&self, key: &str) -> Result<StoreReply, NodeError> {
        if self.ring.owns_key(key).await {
            return match self.data.get(key) {
                Some(value) => Ok(StoreReply::Value(value.value().clone())),
                None => Err(NodeError::NotFound {
                    key: key.to_string(),
                }),
            };
        }
        self.forward(key, None).await
    }

    /// Forwards a request to the successor. A forward that comes back 500
    /// (the successor is simulating a crash) or does not come back at all
    /// triggers one ring repair and exactly one retry; anything the retry
    /// answers is final. Bounding the retry keeps a broken ring from
    /// turning into a recovery storm.
    async fn forward(&self, key: &str, value: Option<Bytes>) -> Result<StoreReply, NodeError> {
        let successor = self.ring.successor().await;
        let first = self.forward_once(&successor, key, value.clone()).await;

        let (status, body) = match first {
            Ok((status, body)) if status != StatusCode::INTERNAL_SERVER_ERROR => (status, body),
            outcome => {
                match &outcome {
                    Ok((status, _)) => warn!(
                        "forward of {} to {} answered {}, repairing ring",
                        key, successor, status
                    ),
                    Err(err) => warn!(
                        "forward of {} to {} failed ({}), repairing ring",
                        key, successor, err
                    ),
                }
                let promoted = self.ring.recover_successor().await?;
                self.forward_once(&promoted, key, value).await?
            }
        };

        Ok(StoreReply::Forwarded { status, body })
    }

    async fn forward_once(
        &self,
        target: &str,
        key: &str,
        value: Option<Bytes>,
    ) -> Result<(StatusCode, Bytes), PeerError> {
        match value {
            Some(value) => self.peers.forward_put(target, key, value).await,
            None => self.peers.forward_get(target, key).await,
        }
    }

    pub fn insert_local(&self, key: String, value: Bytes) {
        self.data.insert(key, value);
    }

    pub fn get_local(&self, key: &str) -> Option<Bytes> {
        self.data.get(key).map(|entry| entry.value().clone())
    }

    /// Snapshot of every stored pair, used for the leave-time handoff.
    pub fn entries(&self) -> Vec<(String, Bytes)> {
        self.data
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
