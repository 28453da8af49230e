//! Membership Module Tests
//!
//! Validates the wire DTOs and the local (no-network) transitions of the
//! ring service.
//!
//! ## Test Scopes
//! - **Protocol**: `NodeInfo` wire shape and accessors, link-slot parsing.
//! - **Service Logic**: initial state, pointer updates, crash flag, the
//!   join fast paths that never touch the network.
//!
//! *Network-dependent operations (the join walk, leave handoff, recovery,
//! ring walk) are covered by the cluster integration tests.*

#[cfg(test)]
mod tests {
    use crate::config::NeighborTriple;
    use crate::membership::peer::PeerClient;
    use crate::membership::protocol::{LinkSlot, NodeInfo};
    use crate::membership::service::{JoinOutcome, RingService};
    use crate::ring::Keyspace;

    fn singleton_service(addr: &str) -> RingService {
        RingService::new(addr.to_string(), Keyspace::new(16), None, PeerClient::new())
    }

    // ============================================================
    // PROTOCOL TESTS
    // ============================================================

    #[test]
    fn test_node_info_wire_shape() {
        let info = NodeInfo {
            node_hash: 42,
            successor: "b:1".to_string(),
            others: vec!["a:1".to_string(), "c:1".to_string()],
        };

        let json = serde_json::to_value(&info).expect("serialization failed");
        assert_eq!(json["node_hash"], 42);
        assert_eq!(json["successor"], "b:1");
        assert_eq!(json["others"][0], "a:1");
        assert_eq!(json["others"][1], "c:1");
    }

    #[test]
    fn test_node_info_accessors() {
        let info = NodeInfo {
            node_hash: 7,
            successor: "b:1".to_string(),
            others: vec!["a:1".to_string(), "c:1".to_string()],
        };
        assert_eq!(info.predecessor(), Some("a:1"));
        assert_eq!(info.second_successor(), Some("c:1"));

        let empty = NodeInfo {
            node_hash: 7,
            successor: "b:1".to_string(),
            others: vec![],
        };
        assert_eq!(empty.predecessor(), None);
        assert_eq!(empty.second_successor(), None);
    }

    #[test]
    fn test_link_slot_parsing() {
        assert_eq!("prev".parse::<LinkSlot>(), Ok(LinkSlot::Prev));
        assert_eq!("next".parse::<LinkSlot>(), Ok(LinkSlot::Next));
        assert_eq!("nextnext".parse::<LinkSlot>(), Ok(LinkSlot::NextNext));
        assert!("sideways".parse::<LinkSlot>().is_err());
    }

    #[test]
    fn test_link_slot_display_roundtrip() {
        for slot in [LinkSlot::Prev, LinkSlot::Next, LinkSlot::NextNext] {
            assert_eq!(slot.to_string().parse::<LinkSlot>(), Ok(slot));
        }
    }

    // ============================================================
    // RING SERVICE TESTS (local transitions only)
    // ============================================================

    #[tokio::test]
    async fn test_new_singleton_service() {
        let service = singleton_service("a:8000");
        let state = service.snapshot().await;

        assert_eq!(state.predecessor, "a:8000");
        assert_eq!(state.successor, "a:8000");
        assert_eq!(state.successor2, "a:8000");
        assert!(!state.linked);
        assert!(!service.is_crashed());
    }

    #[tokio::test]
    async fn test_new_prelinked_service() {
        let triple = NeighborTriple {
            predecessor: "a:1".to_string(),
            successor: "c:1".to_string(),
            successor2: "d:1".to_string(),
        };
        let service = RingService::new(
            "b:1".to_string(),
            Keyspace::new(16),
            Some(triple),
            PeerClient::new(),
        );

        let state = service.snapshot().await;
        assert_eq!(state.successor, "c:1");
        assert!(state.linked);
    }

    #[tokio::test]
    async fn test_node_info_reflects_state() {
        let service = singleton_service("a:8000");
        let info = service.node_info().await;

        assert_eq!(info.node_hash, service.id());
        assert_eq!(info.successor, "a:8000");
        assert_eq!(info.others, vec!["a:8000".to_string(), "a:8000".to_string()]);
    }

    #[tokio::test]
    async fn test_singleton_owns_every_key() {
        let service = singleton_service("a:8000");
        for i in 0..50 {
            assert!(service.owns_key(&format!("key_{}", i)).await);
        }
    }

    #[tokio::test]
    async fn test_apply_link_updates_pointers() {
        let service = singleton_service("a:1");

        service.apply_link(LinkSlot::Next, "b:1".to_string()).await;
        service.apply_link(LinkSlot::Prev, "c:1".to_string()).await;
        service
            .apply_link(LinkSlot::NextNext, "c:1".to_string())
            .await;

        let state = service.snapshot().await;
        assert_eq!(state.successor, "b:1");
        assert_eq!(state.predecessor, "c:1");
        assert_eq!(state.successor2, "c:1");
        assert!(state.linked);
    }

    #[tokio::test]
    async fn test_apply_link_back_to_self_unlinks() {
        let service = singleton_service("a:1");
        service.apply_link(LinkSlot::Next, "b:1".to_string()).await;
        service.apply_link(LinkSlot::Prev, "b:1".to_string()).await;
        assert!(service.snapshot().await.linked);

        service.apply_link(LinkSlot::Next, "a:1".to_string()).await;
        assert!(!service.snapshot().await.linked);
    }

    #[tokio::test]
    async fn test_sim_crash_sets_flag_and_unlinks() {
        let service = singleton_service("a:1");
        service.apply_link(LinkSlot::Next, "b:1".to_string()).await;
        service.apply_link(LinkSlot::Prev, "b:1".to_string()).await;

        service.sim_crash().await;
        assert!(service.is_crashed());
        assert!(!service.snapshot().await.linked);
    }

    #[tokio::test]
    async fn test_join_self_seed_stays_singleton() {
        let service = singleton_service("a:1");
        let outcome = service.join("a:1").await.unwrap();
        assert_eq!(outcome, JoinOutcome::StayedSingleton);
        assert!(!service.snapshot().await.linked);
    }

    #[tokio::test]
    async fn test_join_when_linked_is_a_noop() {
        let triple = NeighborTriple {
            predecessor: "a:1".to_string(),
            successor: "c:1".to_string(),
            successor2: "d:1".to_string(),
        };
        let service = RingService::new(
            "b:1".to_string(),
            Keyspace::new(16),
            Some(triple),
            PeerClient::new(),
        );

        // Must not touch the network: the linked check short-circuits.
        let outcome = service.join("somewhere:9").await.unwrap();
        assert_eq!(outcome, JoinOutcome::AlreadyLinked);
    }
}
