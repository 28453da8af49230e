/// One node's current view of its ring neighborhood.
///
/// `successor2` is the successor's successor. It is not a routing
/// optimization: it exists only so the node can re-link the ring when its
/// direct successor dies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingState {
    pub predecessor: String,
    pub successor: String,
    pub successor2: String,
    /// True iff this node believes it is part of a ring with more than one
    /// member. A single-node ring points every field at the node itself.
    pub linked: bool,
}

impl RingState {
    /// Single-node ring: every pointer refers back to the node itself.
    pub fn singleton(addr: &str) -> Self {
        Self {
            predecessor: addr.to_string(),
            successor: addr.to_string(),
            successor2: addr.to_string(),
            linked: false,
        }
    }

    /// Pre-linked state from a configured neighbor triple.
    ///
    /// In 2- and 3-node bootstraps the supplied second successor aliases
    /// the node itself or its successor; it then falls back to the
    /// predecessor, which is the actual two-hops-clockwise neighbor.
    pub fn from_neighbors(addr: &str, predecessor: &str, successor: &str, successor2: &str) -> Self {
        let successor2 = if successor2 == addr || successor2 == successor {
            predecessor.to_string()
        } else {
            successor2.to_string()
        };
        Self {
            predecessor: predecessor.to_string(),
            successor: successor.to_string(),
            successor2,
            linked: successor != addr,
        }
    }

    /// `[predecessor, successor, successor2]`, the order `/neighbors`
    /// reports them in.
    pub fn neighbor_list(&self) -> Vec<String> {
        vec![
            self.predecessor.clone(),
            self.successor.clone(),
            self.successor2.clone(),
        ]
    }

    /// Recomputes the linked flag after a pointer update: a node whose
    /// successor or predecessor is itself is not in a multi-node ring.
    pub fn relink(&mut self, self_addr: &str) {
        self.linked = self.successor != self_addr && self.predecessor != self_addr;
    }

    pub fn reset_to_singleton(&mut self, addr: &str) {
        *self = Self::singleton(addr);
    }
}
