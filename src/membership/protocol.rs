//! Ring Wire Protocol
//!
//! Endpoints and Data Transfer Objects for inter-node coordination. All
//! membership traffic is plain HTTP: node state is fetched as JSON from
//! `/node-info`, pointer updates and the ring walk are path-encoded POSTs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Identity and neighborhood snapshot of a node.
pub const ENDPOINT_NODE_INFO: &str = "/node-info";
/// Public key/value surface; also used node-to-node for forwarding.
pub const ENDPOINT_STORAGE: &str = "/storage";
/// Neighbor pointer updates: `/link/{prev|next|nextnext}/{addr}`.
pub const ENDPOINT_LINK: &str = "/link";
/// Ring-walk integrity check: `/assert-network/{origin}`.
pub const ENDPOINT_ASSERT_NETWORK: &str = "/assert-network";

// --- Data Transfer Objects ---

/// Snapshot served by `/node-info` and consumed by the join walk and by
/// crash recovery.
///
/// The shape is fixed by the wire protocol: the direct successor is a
/// top-level field, while the predecessor and the second successor travel
/// in the `others` list, in that order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    /// The node's id in the identifier space.
    pub node_hash: u64,
    /// Address of the clockwise neighbor.
    pub successor: String,
    /// `[predecessor, successor2]`.
    pub others: Vec<String>,
}

impl NodeInfo {
    pub fn predecessor(&self) -> Option<&str> {
        self.others.first().map(String::as_str)
    }

    pub fn second_successor(&self) -> Option<&str> {
        self.others.get(1).map(String::as_str)
    }
}

/// Query parameters of `POST /join?nprime={addr}`.
#[derive(Debug, Deserialize)]
pub struct JoinParams {
    /// Seed node presumed to be in the ring. The node's own address means
    /// "stay a singleton".
    pub nprime: String,
}

/// Which neighbor pointer a `/link/{slot}/{addr}` request updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSlot {
    Prev,
    Next,
    NextNext,
}

impl FromStr for LinkSlot {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "prev" => Ok(LinkSlot::Prev),
            "next" => Ok(LinkSlot::Next),
            "nextnext" => Ok(LinkSlot::NextNext),
            _ => Err(()),
        }
    }
}

impl fmt::Display for LinkSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkSlot::Prev => "prev",
            LinkSlot::Next => "next",
            LinkSlot::NextNext => "nextnext",
        };
        f.write_str(name)
    }
}
