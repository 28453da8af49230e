//! HTTP Surface & Process Lifecycle
//!
//! The explicit route table mapping every endpoint to its handler, and the
//! serve loop with the watchdog that bounds the process lifetime.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::Extension;
use axum::http::Uri;
use axum::routing::{get, post, put};
use axum::Router;
use tokio::net::TcpListener;

use crate::error::NodeError;
use crate::membership::handlers as membership;
use crate::membership::service::RingService;
use crate::storage::handlers as storage;
use crate::storage::store::ObjectStore;

pub fn router(ring: Arc<RingService>, store: Arc<ObjectStore>) -> Router {
    Router::new()
        .route("/storage/:key", put(storage::handle_put).get(storage::handle_get))
        .route("/node-info", get(membership::handle_node_info))
        .route("/neighbors", get(membership::handle_neighbors))
        .route("/join", post(membership::handle_join))
        .route("/leave", post(membership::handle_leave))
        .route("/link/:slot/:addr", post(membership::handle_link))
        .route(
            "/assert-network/:origin",
            post(membership::handle_assert_network),
        )
        .route("/sim-crash", post(membership::handle_sim_crash))
        .route("/sim-recover", post(membership::handle_sim_recover))
        .fallback(handle_unknown)
        .layer(Extension(ring))
        .layer(Extension(store))
}

async fn handle_unknown(Extension(ring): Extension<Arc<RingService>>, uri: Uri) -> NodeError {
    if ring.is_crashed() {
        return NodeError::Crashed;
    }
    NodeError::UnknownRoute {
        path: uri.path().to_string(),
    }
}

/// Serves until ctrl-c or, when configured, until the watchdog lifetime
/// elapses. The watchdog guards against forgotten nodes piling up on
/// shared test machines.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    die_after: Option<Duration>,
) -> anyhow::Result<()> {
    let shutdown = async move {
        match die_after {
            Some(limit) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("shutdown signal received");
                    }
                    _ = tokio::time::sleep(limit) => {
                        tracing::info!("reached {:?} lifetime limit, shutting down", limit);
                    }
                }
            }
            None => {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("shutdown signal received");
            }
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
