//! Process Configuration
//!
//! A node reads its entire runtime configuration from the environment:
//! listen port, advertised host, identifier-space width, the watchdog
//! lifetime, and an optional initial neighbor triple for nodes launched
//! straight into an existing ring.

use std::time::Duration;

use anyhow::{bail, Context, Result};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_ID_BITS: u32 = 6;
pub const DEFAULT_DIE_AFTER_SECONDS: u64 = 600;

/// Neighbor triple for a node that starts already linked into a ring:
/// `predecessor,successor,successor2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborTriple {
    pub predecessor: String,
    pub successor: String,
    pub successor2: String,
}

impl NeighborTriple {
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        if parts.len() != 3 || parts.iter().any(|part| part.is_empty()) {
            bail!(
                "expected three comma-separated addresses (pred,succ,succ2), got {:?}",
                raw
            );
        }
        Ok(Self {
            predecessor: parts[0].to_string(),
            successor: parts[1].to_string(),
            successor2: parts[2].to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Host part of the advertised address. Peers reach this node at
    /// `host:port`, so it must resolve from the other ring members.
    pub host: String,
    pub port: u16,
    /// Identifier-space width `m`: node and key ids live in `0..2^m`.
    pub id_bits: u32,
    /// Watchdog: the process shuts itself down after this long. `None`
    /// disables the watchdog.
    pub die_after: Option<Duration>,
    /// `None` starts a single-node ring.
    pub neighbors: Option<NeighborTriple>,
}

impl Config {
    /// Reads `NODE_HOST`, `NODE_PORT`, `NODE_ID_BITS`,
    /// `NODE_DIE_AFTER_SECONDS` and `NODE_NEIGHBORS`, with defaults for
    /// everything except the neighbor triple.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("NODE_HOST").unwrap_or_else(|_| "localhost".to_string());
        let port = parse_env("NODE_PORT", DEFAULT_PORT)?;
        let id_bits: u32 = parse_env("NODE_ID_BITS", DEFAULT_ID_BITS)?;
        if id_bits == 0 || id_bits > 64 {
            bail!("NODE_ID_BITS must be between 1 and 64, got {}", id_bits);
        }

        let die_after_seconds: u64 = parse_env("NODE_DIE_AFTER_SECONDS", DEFAULT_DIE_AFTER_SECONDS)?;
        let die_after = (die_after_seconds > 0).then(|| Duration::from_secs(die_after_seconds));

        let neighbors = match std::env::var("NODE_NEIGHBORS") {
            Ok(raw) if !raw.trim().is_empty() => Some(NeighborTriple::parse(&raw)?),
            _ => None,
        };

        Ok(Self {
            host,
            port,
            id_bits,
            die_after,
            neighbors,
        })
    }

    /// The `host:port` identity peers know this node by. Hashing this
    /// string yields the node's ring id.
    pub fn advertised_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}
