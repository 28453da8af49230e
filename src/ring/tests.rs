//! Ring Module Tests
//!
//! Validates the identifier space math and the ring-state bookkeeping.
//!
//! ## Test Scopes
//! - **Keyspace**: hash determinism and range, interval containment
//!   including wraparound and the singleton rule, ownership partitioning.
//! - **RingState**: singleton invariant, neighbor-triple fix-ups, linked
//!   flag transitions.

#[cfg(test)]
mod tests {
    use crate::ring::keyspace::Keyspace;
    use crate::ring::state::RingState;

    // ============================================================
    // KEYSPACE TESTS
    // ============================================================

    #[test]
    fn test_hash_is_deterministic() {
        let keyspace = Keyspace::new(6);
        assert_eq!(keyspace.id_of("node-1:8000"), keyspace.id_of("node-1:8000"));
    }

    #[test]
    fn test_hash_stays_in_space() {
        let keyspace = Keyspace::new(6);
        for i in 0..1000 {
            let id = keyspace.id_of(&format!("key_{}", i));
            assert!(id < 64, "id {} should be < 2^6", id);
        }
    }

    #[test]
    fn test_hash_distribution_is_not_degenerate() {
        let keyspace = Keyspace::new(16);
        let mut seen = std::collections::HashSet::new();
        for i in 0..1000 {
            seen.insert(keyspace.id_of(&format!("key_{}", i)));
        }
        // 1000 keys into 65536 slots; expect most to be distinct.
        assert!(
            seen.len() > 900,
            "expected mostly distinct ids, got {}",
            seen.len()
        );
    }

    #[test]
    fn test_full_width_space() {
        let keyspace = Keyspace::new(64);
        // Just has to not panic and stay within u64.
        let _ = keyspace.id_of("anything");
    }

    #[test]
    fn test_in_range_simple_interval() {
        let keyspace = Keyspace::new(6);
        assert!(keyspace.in_range(10, 20, 15));
        assert!(!keyspace.in_range(10, 20, 5));
        assert!(!keyspace.in_range(10, 20, 25));
    }

    #[test]
    fn test_in_range_bounds() {
        let keyspace = Keyspace::new(6);
        // Upper bound inclusive: the node owns its own id.
        assert!(keyspace.in_range(10, 20, 20));
        // Lower bound exclusive: the predecessor owns its id.
        assert!(!keyspace.in_range(10, 20, 10));
    }

    #[test]
    fn test_in_range_wraparound() {
        let keyspace = Keyspace::new(6);
        // Interval (60, 5] wraps through zero.
        assert!(keyspace.in_range(60, 5, 63));
        assert!(keyspace.in_range(60, 5, 0));
        assert!(keyspace.in_range(60, 5, 5));
        assert!(!keyspace.in_range(60, 5, 60));
        assert!(!keyspace.in_range(60, 5, 30));
    }

    #[test]
    fn test_in_range_singleton_owns_everything() {
        let keyspace = Keyspace::new(6);
        for candidate in 0..64 {
            assert!(
                keyspace.in_range(42, 42, candidate),
                "singleton interval should contain {}",
                candidate
            );
        }
    }

    #[test]
    fn test_ownership_partitions_the_space() {
        // For any set of node ids, every key id must be owned by exactly
        // one node, where node i owns (id[i-1], id[i]].
        let keyspace = Keyspace::new(8);
        let node_ids: Vec<u64> = vec![3, 17, 99, 148, 200, 255];

        for key_id in 0..256u64 {
            let owners = node_ids
                .iter()
                .enumerate()
                .filter(|(i, id)| {
                    let pred = node_ids[(i + node_ids.len() - 1) % node_ids.len()];
                    keyspace.in_range(pred, **id, key_id)
                })
                .count();
            assert_eq!(owners, 1, "key id {} should have exactly one owner", key_id);
        }
    }

    // ============================================================
    // RING STATE TESTS
    // ============================================================

    #[test]
    fn test_singleton_points_at_itself() {
        let state = RingState::singleton("a:8000");
        assert_eq!(state.predecessor, "a:8000");
        assert_eq!(state.successor, "a:8000");
        assert_eq!(state.successor2, "a:8000");
        assert!(!state.linked);
    }

    #[test]
    fn test_from_neighbors_full_triple() {
        let state = RingState::from_neighbors("b:1", "a:1", "c:1", "d:1");
        assert_eq!(state.predecessor, "a:1");
        assert_eq!(state.successor, "c:1");
        assert_eq!(state.successor2, "d:1");
        assert!(state.linked);
    }

    #[test]
    fn test_from_neighbors_two_node_fixup() {
        // In a two-node ring the configured successor2 is the node itself;
        // the usable fallback is the predecessor.
        let state = RingState::from_neighbors("b:1", "a:1", "a:1", "b:1");
        assert_eq!(state.successor2, "a:1");
        assert!(state.linked);
    }

    #[test]
    fn test_from_neighbors_three_node_fixup() {
        // successor2 aliasing the successor also falls back to the
        // predecessor.
        let state = RingState::from_neighbors("b:1", "a:1", "c:1", "c:1");
        assert_eq!(state.successor2, "a:1");
    }

    #[test]
    fn test_relink_tracks_pointers() {
        let mut state = RingState::singleton("a:1");
        state.successor = "b:1".to_string();
        state.predecessor = "b:1".to_string();
        state.relink("a:1");
        assert!(state.linked);

        state.successor = "a:1".to_string();
        state.relink("a:1");
        assert!(!state.linked);
    }

    #[test]
    fn test_neighbor_list_order() {
        let state = RingState::from_neighbors("b:1", "a:1", "c:1", "d:1");
        assert_eq!(
            state.neighbor_list(),
            vec!["a:1".to_string(), "c:1".to_string(), "d:1".to_string()]
        );
    }

    #[test]
    fn test_reset_to_singleton() {
        let mut state = RingState::from_neighbors("b:1", "a:1", "c:1", "d:1");
        state.reset_to_singleton("b:1");
        assert_eq!(state, RingState::singleton("b:1"));
    }
}
