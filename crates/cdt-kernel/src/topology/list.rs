//! Owning stores for vertices and edges.
//!
//! Both lists iterate in stable insertion order. The edge list is keyed by
//! fingerprint and refuses a second distinct edge over the same unordered
//! endpoint pair; the vertex list is keyed by id.

use std::collections::HashMap;

use cdt_types::{EdgeId, VertexId};

use crate::error::SpacetimeError;
use crate::topology::edge::{Edge, Fingerprint};
use crate::topology::vertex::Vertex;

/// Id-keyed vertex store.
#[derive(Debug, Clone, Default)]
pub struct VertexList {
    entries: HashMap<VertexId, Vertex>,
    order: Vec<VertexId>,
}

impl VertexList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a vertex. An occupied id is refused: ids are never reused and
    /// never overwritten.
    pub fn add(&mut self, vertex: Vertex) -> Result<(), SpacetimeError> {
        let id = vertex.id();
        if self.entries.contains_key(&id) {
            return Err(SpacetimeError::IdInUse { id });
        }
        self.entries.insert(id, vertex);
        self.order.push(id);
        Ok(())
    }

    pub fn remove(&mut self, id: VertexId) -> Option<Vertex> {
        let removed = self.entries.remove(&id);
        if removed.is_some() {
            self.order.retain(|&v| v != id);
        }
        removed
    }

    pub fn get(&self, id: VertexId) -> Option<&Vertex> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.entries.get_mut(&id)
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vertices in insertion order.
    pub fn to_vector(&self) -> Vec<&Vertex> {
        self.order.iter().map(|id| &self.entries[id]).collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.order.iter().copied()
    }
}

/// Fingerprint-keyed edge store with a stable id-keyed backing map.
///
/// The fingerprint index enforces that the complex is a simple graph: at most
/// one edge per unordered endpoint pair.
#[derive(Debug, Clone, Default)]
pub struct EdgeList {
    edges: HashMap<EdgeId, Edge>,
    by_fingerprint: HashMap<Fingerprint, EdgeId>,
    order: Vec<EdgeId>,
}

impl EdgeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an edge, deduplicating by fingerprint.
    ///
    /// Returns the id of the edge that ends up owning the fingerprint:
    /// - the same edge (by id) again → no-op;
    /// - a distinct edge with the same fingerprint and the *same* direction →
    ///   no-op, the incumbent wins;
    /// - a distinct edge with the *reversed* direction → `FingerprintCollision`;
    /// - an edge whose id is already stored → endpoints are updated and the
    ///   entry re-indexed (the post-`redirect` path).
    pub fn add(&mut self, edge: Edge) -> Result<EdgeId, SpacetimeError> {
        let id = edge.id();
        if let Some(stored) = self.edges.get_mut(&id) {
            stored.redirect(edge.source(), edge.target());
            self.reindex(id)?;
            return Ok(id);
        }

        let fingerprint = edge.fingerprint();
        if let Some(&incumbent_id) = self.by_fingerprint.get(&fingerprint) {
            let incumbent = &self.edges[&incumbent_id];
            if incumbent.source() == edge.source() {
                // Same undirected edge, same direction: collapse silently.
                return Ok(incumbent_id);
            }
            return Err(SpacetimeError::FingerprintCollision {
                fingerprint: fingerprint.as_pair(),
            });
        }

        self.by_fingerprint.insert(fingerprint, id);
        self.edges.insert(id, edge);
        self.order.push(id);
        Ok(id)
    }

    /// Re-key an edge after its endpoints changed via
    /// [`Edge::redirect`]. Fails if the new fingerprint already belongs to a
    /// different edge.
    pub fn reindex(&mut self, id: EdgeId) -> Result<(), SpacetimeError> {
        let fingerprint = self
            .edges
            .get(&id)
            .ok_or(SpacetimeError::UnknownEdge { id })?
            .fingerprint();
        if let Some(&other) = self.by_fingerprint.get(&fingerprint) {
            if other != id {
                return Err(SpacetimeError::FingerprintCollision {
                    fingerprint: fingerprint.as_pair(),
                });
            }
            return Ok(());
        }
        self.by_fingerprint.retain(|_, v| *v != id);
        self.by_fingerprint.insert(fingerprint, id);
        Ok(())
    }

    pub fn remove(&mut self, id: EdgeId) -> Option<Edge> {
        let removed = self.edges.remove(&id)?;
        self.by_fingerprint.retain(|_, v| *v != id);
        self.order.retain(|&e| e != id);
        Some(removed)
    }

    pub fn get(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn get_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(&id)
    }

    pub fn get_by_fingerprint(&self, fingerprint: Fingerprint) -> Option<&Edge> {
        self.by_fingerprint
            .get(&fingerprint)
            .and_then(|id| self.edges.get(id))
    }

    pub fn contains(&self, id: EdgeId) -> bool {
        self.edges.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges in insertion order.
    pub fn to_vector(&self) -> Vec<&Edge> {
        self.order.iter().map(|id| &self.edges[id]).collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.order.iter().copied()
    }
}
