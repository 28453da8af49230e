use std::sync::atomic::{AtomicBool, Ordering};

use axum::http::StatusCode;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::peer::PeerClient;
use super::protocol::{LinkSlot, NodeInfo};
use crate::config::NeighborTriple;
use crate::error::NodeError;
use crate::ring::{Keyspace, RingState};
use crate::storage::store::ObjectStore;

/// One node's identity, ring pointers and crash flag, plus the protocol
/// operations that mutate them.
///
/// Ring pointers live behind a single lock. Protocol steps that talk to
/// peers snapshot what they need, drop the guard for the round trip, and
/// re-validate after reacquiring it; no lock is ever held across the
/// network.
pub struct RingService {
    addr: String,
    id: u64,
    keyspace: Keyspace,
    ring: RwLock<RingState>,
    crashed: AtomicBool,
    peers: PeerClient,
}

/// What a join request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The node was already part of a ring; nothing changed.
    AlreadyLinked,
    /// The seed was the node itself; it stays a single-node ring.
    StayedSingleton,
    /// The walk located the position; pointers are set and both new
    /// neighbors have been told.
    Linked {
        predecessor: String,
        successor: String,
    },
}

/// What a leave request resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The node was not in a multi-node ring to begin with.
    AlreadySingleton,
    /// Neighbors are re-linked around the node and its keys handed off.
    Left,
}

impl RingService {
    pub fn new(
        addr: String,
        keyspace: Keyspace,
        neighbors: Option<NeighborTriple>,
        peers: PeerClient,
    ) -> Self {
        let id = keyspace.id_of(&addr);
        let state = match neighbors {
            Some(triple) => RingState::from_neighbors(
                &addr,
                &triple.predecessor,
                &triple.successor,
                &triple.successor2,
            ),
            None => RingState::singleton(&addr),
        };
        Self {
            addr,
            id,
            keyspace,
            ring: RwLock::new(state),
            crashed: AtomicBool::new(false),
            peers,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn keyspace(&self) -> Keyspace {
        self.keyspace
    }

    pub fn is_crashed(&self) -> bool {
        self.crashed.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> RingState {
        self.ring.read().await.clone()
    }

    pub async fn successor(&self) -> String {
        self.ring.read().await.successor.clone()
    }

    pub async fn node_info(&self) -> NodeInfo {
        let ring = self.ring.read().await;
        NodeInfo {
            node_hash: self.id,
            successor: ring.successor.clone(),
            others: vec![ring.predecessor.clone(), ring.successor2.clone()],
        }
    }

    pub async fn neighbor_list(&self) -> Vec<String> {
        self.ring.read().await.neighbor_list()
    }

    /// True iff this node currently holds ring responsibility for `key`:
    /// the key's id lies in `(predecessor.id, self.id]`.
    pub async fn owns_key(&self, key: &str) -> bool {
        let predecessor = self.ring.read().await.predecessor.clone();
        let predecessor_id = self.keyspace.id_of(&predecessor);
        self.keyspace
            .in_range(predecessor_id, self.id, self.keyspace.id_of(key))
    }

    /// Locates this node's position on the ring by walking clockwise from
    /// `seed`, then splices itself in and notifies both new neighbors.
    ///
    /// The walk adopts a candidate when the candidate is a singleton or
    /// when our id falls in `(candidate.predecessor.id, candidate.id]`;
    /// otherwise it moves on to the candidate's successor. The walk makes
    /// monotonic clockwise progress, so it terminates on a finite ring.
    ///
    /// A failed link update is reported to the caller but the local
    /// pointers stand; the next ring walk reconciles the neighborhood.
    pub async fn join(&self, seed: &str) -> Result<JoinOutcome, NodeError> {
        if self.ring.read().await.linked {
            return Ok(JoinOutcome::AlreadyLinked);
        }
        if seed == self.addr {
            return Ok(JoinOutcome::StayedSingleton);
        }

        let mut candidate = seed.to_string();
        let (predecessor, successor, successor2) = loop {
            let info = match self.peers.node_info(&candidate).await {
                Ok(info) => info,
                Err(err) => {
                    warn!("join: cannot reach {}: {}", candidate, err);
                    return Err(NodeError::Unreachable);
                }
            };
            let Some(pre) = info.predecessor().map(str::to_string) else {
                warn!("join: {} served a node-info without a predecessor", candidate);
                return Err(NodeError::Unreachable);
            };

            let pre_hash = self.keyspace.id_of(&pre);
            if pre_hash == info.node_hash
                || self.keyspace.in_range(pre_hash, info.node_hash, self.id)
            {
                break (pre, candidate, info.successor);
            }

            debug!(
                "join: {} does not cover id {}, walking on to {}",
                candidate, self.id, info.successor
            );
            candidate = info.successor;
        };

        {
            let mut ring = self.ring.write().await;
            ring.predecessor = predecessor.clone();
            ring.successor = successor.clone();
            ring.successor2 = successor2;
            ring.linked = true;
        }
        info!(
            "joined the ring between {} and {}",
            predecessor, successor
        );

        // Splice in: successor gains us as predecessor, predecessor gains
        // us as successor and our successor as its second successor. All
        // three are attempted even if one fails; the first failure is
        // surfaced once the others ran.
        let mut first_failure = None;
        for (target, slot, pointee) in [
            (&successor, LinkSlot::Prev, &self.addr),
            (&predecessor, LinkSlot::Next, &self.addr),
            (&predecessor, LinkSlot::NextNext, &successor),
        ] {
            if let Err(err) = self.peers.link(target, slot, pointee).await {
                warn!("join: link update on {} failed: {}", target, err);
                first_failure.get_or_insert(err);
            }
        }
        if let Some(err) = first_failure {
            return Err(err.into());
        }

        Ok(JoinOutcome::Linked {
            predecessor,
            successor,
        })
    }

    /// Removes this node from the ring: re-links both neighbors around it,
    /// hands every stored key to the (old) successor, then resets to a
    /// single-node ring.
    ///
    /// The steps run in order and the first failure aborts the rest. A
    /// failure during the key handoff can leave keys duplicated between
    /// this node and its successor; there is no two-phase commit over the
    /// transfer.
    pub async fn leave(&self, store: &ObjectStore) -> Result<LeaveOutcome, NodeError> {
        let snapshot = self.ring.read().await.clone();
        if !snapshot.linked
            || snapshot.successor == self.addr
            || snapshot.predecessor == self.addr
        {
            return Ok(LeaveOutcome::AlreadySingleton);
        }
        let RingState {
            predecessor,
            successor,
            successor2,
            ..
        } = snapshot;

        self.peers
            .link(&successor, LinkSlot::Prev, &predecessor)
            .await?;
        self.peers
            .link(&predecessor, LinkSlot::Next, &successor)
            .await?;
        self.peers
            .link(&predecessor, LinkSlot::NextNext, &successor2)
            .await?;

        for (key, value) in store.entries() {
            let (status, body) = self.peers.forward_put(&successor, &key, value).await?;
            if status != StatusCode::OK {
                warn!("leave: transferring {} to {} answered {}", key, successor, status);
                return Err(NodeError::Upstream {
                    status,
                    body: String::from_utf8_lossy(&body).into_owned(),
                });
            }
        }

        self.ring.write().await.reset_to_singleton(&self.addr);
        info!("left the ring, back to single-node operation");
        Ok(LeaveOutcome::Left)
    }

    /// Applies one `/link/{slot}/{addr}` pointer update and recomputes the
    /// linked flag.
    pub async fn apply_link(&self, slot: LinkSlot, target: String) {
        let mut ring = self.ring.write().await;
        match slot {
            LinkSlot::Prev => ring.predecessor = target,
            LinkSlot::Next => ring.successor = target,
            LinkSlot::NextNext => ring.successor2 = target,
        }
        ring.relink(&self.addr);
        debug!(
            "link update: pred={} succ={} succ2={} linked={}",
            ring.predecessor, ring.successor, ring.successor2, ring.linked
        );
    }

    /// Replaces a dead successor using the two-hop pointer.
    ///
    /// Fetches the second successor's view, promotes it to successor and
    /// asks it to link back to us. The node's own predecessor is not
    /// notified; the next ring walk restores its second-successor pointer.
    /// If the second successor is also gone the ring cannot be repaired
    /// and no state is touched.
    ///
    /// Returns the address of the new successor.
    pub async fn recover_successor(&self) -> Result<String, NodeError> {
        let (dead, fallback) = {
            let ring = self.ring.read().await;
            (ring.successor.clone(), ring.successor2.clone())
        };

        let info = match self.peers.node_info(&fallback).await {
            Ok(info) => info,
            Err(err) => {
                warn!(
                    "recovery: second successor {} is also down: {}",
                    fallback, err
                );
                return Err(NodeError::DoubleFailureUnsupported);
            }
        };

        // In a two-node remainder the fallback's successor is this node
        // itself; the chain then folds back onto us.
        let successor2 = if info.successor == self.addr {
            self.addr.clone()
        } else {
            info.successor.clone()
        };

        {
            let mut ring = self.ring.write().await;
            if ring.successor != dead {
                // A concurrent handler already repaired the ring while we
                // were probing; keep its result.
                return Ok(ring.successor.clone());
            }
            ring.successor = fallback.clone();
            ring.successor2 = successor2;
            ring.relink(&self.addr);
        }
        info!(
            "recovered from dead successor {}: promoted {}",
            dead, fallback
        );

        if let Err(err) = self.peers.link(&fallback, LinkSlot::Prev, &self.addr).await {
            warn!(
                "recovery: new successor {} did not take the link update: {}",
                fallback, err
            );
        }
        Ok(fallback)
    }

    /// One step of the ring-walk integrity check.
    ///
    /// The walk closes when this node's successor is the origin. Otherwise
    /// the successor is probed (repairing a single dead hop via
    /// [`Self::recover_successor`]) and the walk handed to it; the
    /// downstream verdict is returned as the response body. A downstream
    /// 500, or a failed repair, means two consecutive nodes are gone and
    /// the walk reports that as unsupported.
    pub async fn assert_network(&self, origin: &str) -> Result<String, NodeError> {
        let successor = self.successor().await;
        if successor == origin {
            return Ok("Network successfully asserted.".to_string());
        }

        let successor = match self.peers.node_info(&successor).await {
            Ok(_) => successor,
            Err(err) => {
                warn!(
                    "ring walk: successor {} is down ({}), recovering",
                    successor, err
                );
                let promoted = self.recover_successor().await?;
                if self.peers.node_info(&promoted).await.is_err() {
                    return Err(NodeError::DoubleFailureUnsupported);
                }
                promoted
            }
        };

        let (status, body) = self
            .peers
            .assert_network(&successor, origin)
            .await
            .map_err(NodeError::from)?;
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // The hop after the next one was dead too and could not be
            // repaired downstream.
            return Err(NodeError::DoubleFailureUnsupported);
        }
        if !status.is_success() {
            return Err(NodeError::Upstream { status, body });
        }
        Ok(body)
    }

    /// Starts simulating a crash: every request except the crash controls
    /// now fails, and the node no longer counts itself as linked.
    pub async fn sim_crash(&self) {
        self.crashed.store(true, Ordering::SeqCst);
        self.ring.write().await.linked = false;
        info!("simulating crash");
    }

    /// Stops simulating a crash and rejoins the ring through the
    /// last-known successor, as if freshly joining.
    pub async fn sim_recover(&self) -> Result<JoinOutcome, NodeError> {
        self.crashed.store(false, Ordering::SeqCst);
        let seed = self.successor().await;
        info!("recovering from simulated crash, rejoining via {}", seed);
        self.join(&seed).await
    }
}
