use cdt_types::{EdgeId, VertexId};

/// Canonical unordered endpoint pair of an edge.
///
/// Two edges with equal fingerprints are the same undirected edge; the
/// [`EdgeList`](crate::topology::list::EdgeList) keys on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub VertexId, pub VertexId);

impl Fingerprint {
    pub fn new(a: VertexId, b: VertexId) -> Self {
        if a <= b {
            Fingerprint(a, b)
        } else {
            Fingerprint(b, a)
        }
    }

    pub fn as_pair(&self) -> (VertexId, VertexId) {
        (self.0, self.1)
    }
}

/// A directed edge between two distinct vertices.
///
/// `squared_length` is a signed cache: negative timelike, positive spacelike,
/// zero null. It is seeded at creation and is authoritative until both
/// endpoints carry embedding coordinates.
#[derive(Debug, Clone)]
pub struct Edge {
    id: EdgeId,
    source: VertexId,
    target: VertexId,
    squared_length: Option<f64>,
}

impl Edge {
    pub fn new(id: EdgeId, source: VertexId, target: VertexId) -> Self {
        Self {
            id,
            source,
            target,
            squared_length: None,
        }
    }

    pub fn with_squared_length(
        id: EdgeId,
        source: VertexId,
        target: VertexId,
        squared_length: f64,
    ) -> Self {
        Self {
            id,
            source,
            target,
            squared_length: Some(squared_length),
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn source(&self) -> VertexId {
        self.source
    }

    pub fn target(&self) -> VertexId {
        self.target
    }

    pub fn squared_length(&self) -> Option<f64> {
        self.squared_length
    }

    pub fn set_squared_length(&mut self, value: Option<f64>) {
        self.squared_length = value;
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(self.source, self.target)
    }

    /// True when the cached squared length marks the edge timelike.
    pub fn is_timelike(&self) -> bool {
        matches!(self.squared_length, Some(l) if l < 0.0)
    }

    /// Does this edge touch `vertex` on either end?
    pub fn is_incident_to(&self, vertex: VertexId) -> bool {
        self.source == vertex || self.target == vertex
    }

    /// Mutate the endpoints in place. This invalidates the holder's
    /// fingerprint index; the holder must re-index afterwards
    /// (see [`EdgeList::reindex`](crate::topology::list::EdgeList::reindex)).
    pub fn redirect(&mut self, new_source: VertexId, new_target: VertexId) {
        self.source = new_source;
        self.target = new_target;
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.source, self.target)
    }
}
