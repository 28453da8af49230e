//! Identifier Space & Ring State
//!
//! The foundation of the DHT: every node and every key is hashed into a
//! modular identifier space of size `2^m`, and each node is responsible for
//! the half-open interval between its predecessor's id and its own.
//!
//! ## Core Concepts
//! - **Keyspace**: SHA-1 based mapping of addresses and keys into `0..2^m`,
//!   plus the modular interval containment test that decides ownership.
//! - **RingState**: one node's view of its neighborhood (predecessor,
//!   successor, second successor) and whether it is linked into a
//!   multi-node ring at all.

pub mod keyspace;
pub mod state;

#[cfg(test)]
mod tests;

pub use keyspace::Keyspace;
pub use state::RingState;
