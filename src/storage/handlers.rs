use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::response::Response;
use axum::response::IntoResponse;
use bytes::Bytes;

use super::store::ObjectStore;
use crate::error::NodeError;
use crate::membership::service::RingService;

pub async fn handle_put(
    Extension(ring): Extension<Arc<RingService>>,
    Extension(store): Extension<Arc<ObjectStore>>,
    Path(key): Path<String>,
    value: Bytes,
) -> Result<Response, NodeError> {
    if ring.is_crashed() {
        return Err(NodeError::Crashed);
    }
    let reply = store.put(&key, value).await?;
    Ok(reply.into_response())
}

pub async fn handle_get(
    Extension(ring): Extension<Arc<RingService>>,
    Extension(store): Extension<Arc<ObjectStore>>,
    Path(key): Path<String>,
) -> Result<Response, NodeError> {
    if ring.is_crashed() {
        return Err(NodeError::Crashed);
    }
    let reply = store.get(&key).await?;
    Ok(reply.into_response())
}
