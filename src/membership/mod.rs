//! Ring Membership & Recovery Module
//!
//! Implements the membership protocol that keeps the ring of nodes closed:
//! joining at the correct position, leaving with a key handoff, neighbor
//! pointer updates, crash simulation, and repair of a broken successor
//! link.
//!
//! ## Core Mechanisms
//! - **Join walk**: a joining node walks the ring clockwise from a seed
//!   until it finds the node owning its id, then splices itself in front of
//!   it and notifies both new neighbors.
//! - **Recovery**: when a successor stops answering, the second-successor
//!   pointer is promoted and the ring re-linked. Two consecutive dead nodes
//!   cannot be repaired and are reported as such.
//! - **Ring walk**: `assert-network` travels the whole ring once, repairing
//!   dead hops along the way, and succeeds when the walk returns to its
//!   origin.

pub mod handlers;
pub mod peer;
pub mod protocol;
pub mod service;

#[cfg(test)]
mod tests;
