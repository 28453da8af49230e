//! Protocol Error Kinds
//!
//! Every failure a node can surface over its HTTP API, with a fixed
//! status/body rendering. Peers rely on the status codes for failure
//! detection: a 500 from a successor is what triggers ring recovery, and a
//! 501 tells the caller the ring cannot be repaired any further.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    /// The node is simulating a crash; only the crash-control endpoints
    /// keep working.
    #[error("I have sim-crashed")]
    Crashed,

    /// The key falls in this node's range but nothing is stored under it.
    #[error("No object with key {key} on this node")]
    NotFound { key: String },

    /// Both the successor and the second successor are gone. Without a
    /// finger table there is no third pointer to repair the ring with.
    #[error("Handling of successive nodes crashing not implemented.")]
    DoubleFailureUnsupported,

    /// No route matched the request path.
    #[error("Unknown path: {path}")]
    UnknownRoute { path: String },

    /// A peer could not be reached at all.
    #[error("Unable to connect to network.")]
    Unreachable,

    /// A forwarded request was answered by another node; its verdict is
    /// relayed to the client verbatim.
    #[error("upstream answered {status}")]
    Upstream { status: StatusCode, body: String },
}

impl NodeError {
    pub fn status(&self) -> StatusCode {
        match self {
            NodeError::Crashed | NodeError::Unreachable => StatusCode::INTERNAL_SERVER_ERROR,
            NodeError::NotFound { .. } | NodeError::UnknownRoute { .. } => StatusCode::NOT_FOUND,
            NodeError::DoubleFailureUnsupported => StatusCode::NOT_IMPLEMENTED,
            NodeError::Upstream { status, .. } => *status,
        }
    }
}

impl IntoResponse for NodeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            NodeError::Upstream { body, .. } => body,
            other => other.to_string(),
        };
        (status, body).into_response()
    }
}
