use std::sync::Arc;

use chord_kv::config::Config;
use chord_kv::membership::peer::PeerClient;
use chord_kv::membership::service::RingService;
use chord_kv::ring::Keyspace;
use chord_kv::server;
use chord_kv::storage::store::ObjectStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = Config::from_env()?;
    let addr = config.advertised_addr();
    let keyspace = Keyspace::new(config.id_bits);

    let peers = PeerClient::new();
    let ring = Arc::new(RingService::new(
        addr.clone(),
        keyspace,
        config.neighbors.clone(),
        peers.clone(),
    ));
    let store = Arc::new(ObjectStore::new(ring.clone(), peers));

    tracing::info!(
        "Starting node {} (id {} in a {}-bit identifier space)",
        addr,
        ring.id(),
        config.id_bits
    );
    match &config.neighbors {
        Some(triple) => tracing::info!(
            "Configured neighbors: pred={} succ={} succ2={}",
            triple.predecessor,
            triple.successor,
            triple.successor2
        ),
        None => tracing::info!("No neighbors configured, starting as a single-node ring"),
    }
    if let Some(limit) = config.die_after {
        tracing::info!("Watchdog armed: shutting down after {:?}", limit);
    }

    let app = server::router(ring, store);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("HTTP server listening on {}", listener.local_addr()?);

    server::serve(listener, app, config.die_after).await
}
