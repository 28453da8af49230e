use std::sync::Arc;

use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::Json;

use super::protocol::{JoinParams, LinkSlot, NodeInfo};
use super::service::{JoinOutcome, LeaveOutcome, RingService};
use crate::error::NodeError;
use crate::storage::store::ObjectStore;

fn reject_if_crashed(ring: &RingService) -> Result<(), NodeError> {
    if ring.is_crashed() {
        Err(NodeError::Crashed)
    } else {
        Ok(())
    }
}

pub async fn handle_node_info(
    Extension(ring): Extension<Arc<RingService>>,
) -> Result<Json<NodeInfo>, NodeError> {
    reject_if_crashed(&ring)?;
    Ok(Json(ring.node_info().await))
}

pub async fn handle_neighbors(
    Extension(ring): Extension<Arc<RingService>>,
) -> Result<Json<Vec<String>>, NodeError> {
    reject_if_crashed(&ring)?;
    Ok(Json(ring.neighbor_list().await))
}

pub async fn handle_join(
    Extension(ring): Extension<Arc<RingService>>,
    Query(params): Query<JoinParams>,
) -> Result<(StatusCode, String), NodeError> {
    reject_if_crashed(&ring)?;
    let outcome = ring.join(&params.nprime).await?;
    Ok((StatusCode::OK, join_message(&ring, outcome)))
}

fn join_message(ring: &RingService, outcome: JoinOutcome) -> String {
    match outcome {
        JoinOutcome::AlreadyLinked => "Ok, already in the network.".to_string(),
        JoinOutcome::StayedSingleton => {
            format!("Ok, {} already in single network", ring.addr())
        }
        JoinOutcome::Linked {
            predecessor,
            successor,
        } => format!(
            "Ok {} linked up with {} {}",
            ring.addr(),
            successor,
            predecessor
        ),
    }
}

pub async fn handle_leave(
    Extension(ring): Extension<Arc<RingService>>,
    Extension(store): Extension<Arc<ObjectStore>>,
) -> Result<(StatusCode, String), NodeError> {
    reject_if_crashed(&ring)?;
    let message = match ring.leave(&store).await? {
        LeaveOutcome::AlreadySingleton => {
            format!("Ok, {} already in single-node network", ring.addr())
        }
        LeaveOutcome::Left => "Ok".to_string(),
    };
    Ok((StatusCode::OK, message))
}

pub async fn handle_link(
    Extension(ring): Extension<Arc<RingService>>,
    Path((slot, addr)): Path<(String, String)>,
) -> Result<(StatusCode, String), NodeError> {
    reject_if_crashed(&ring)?;
    let slot: LinkSlot = slot.parse().map_err(|_| NodeError::UnknownRoute {
        path: format!("/link/{}/{}", slot, addr),
    })?;
    ring.apply_link(slot, addr).await;
    Ok((StatusCode::OK, "Ok".to_string()))
}

pub async fn handle_assert_network(
    Extension(ring): Extension<Arc<RingService>>,
    Path(origin): Path<String>,
) -> Result<(StatusCode, String), NodeError> {
    reject_if_crashed(&ring)?;
    let verdict = ring.assert_network(&origin).await?;
    Ok((StatusCode::OK, verdict))
}

pub async fn handle_sim_crash(
    Extension(ring): Extension<Arc<RingService>>,
) -> (StatusCode, String) {
    ring.sim_crash().await;
    (StatusCode::OK, String::new())
}

pub async fn handle_sim_recover(
    Extension(ring): Extension<Arc<RingService>>,
) -> Result<(StatusCode, String), NodeError> {
    let outcome = ring.sim_recover().await?;
    Ok((StatusCode::OK, join_message(&ring, outcome)))
}
