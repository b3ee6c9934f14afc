//! Invariant audit over a whole complex.
//!
//! Used as the fault floor in tests: after any sequence of mutations the
//! audit must come back clean. `validate` reports the first violation as a
//! fatal `InvariantViolation`.
//!
//! Checks, in order:
//! - every edge endpoint resolves in the vertex list;
//! - vertex in/out adjacency agrees with the edge endpoint relation, both
//!   directions;
//! - facet vertex sets are subsets of their coface's, with back-pointers
//!   (coface membership is judged by vertex tuple, since a gluing leaves two
//!   interchangeable records describing the shared face);
//! - each simplex's edge set matches exactly the edges among its vertex
//!   pairs present in the edge list;
//! - no two edges share a fingerprint;
//! - each simplex's position lookup is coherent with its vertex tuple.

use std::collections::{BTreeSet, HashMap};

use tracing::{info, instrument};

use cdt_types::{EdgeId, SimplexId, VertexId};

use crate::error::SpacetimeError;
use crate::spacetime::Spacetime;
use crate::topology::edge::Fingerprint;

/// A single invariant violation found by the audit.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InvariantError {
    #[error("edge {edge} endpoint {vertex} does not resolve")]
    UnresolvedEndpoint { edge: EdgeId, vertex: VertexId },

    #[error("vertex {vertex} adjacency disagrees with edge {edge}: {detail}")]
    AdjacencyMismatch {
        vertex: VertexId,
        edge: EdgeId,
        detail: String,
    },

    #[error("facet {facet} is not a vertex subset of its coface {coface}")]
    FacetNotSubset { facet: SimplexId, coface: SimplexId },

    #[error("facet {facet} does not name {coface} among its cofaces")]
    MissingCofaceBackpointer { facet: SimplexId, coface: SimplexId },

    #[error("coface {coface} of face {face} has no facet with the same vertex set")]
    MissingFacetBackpointer { face: SimplexId, coface: SimplexId },

    #[error("simplex {simplex} edge set disagrees with the edge list")]
    EdgeSetMismatch { simplex: SimplexId },

    #[error("two edges share fingerprint {fingerprint:?}")]
    DuplicateFingerprint { fingerprint: (VertexId, VertexId) },

    #[error("simplex {simplex} vertex lookup is incoherent")]
    IncoherentLookup { simplex: SimplexId },
}

/// Audit outcome: entity counts plus every violation found.
#[derive(Debug, Clone)]
pub struct ComplexAudit {
    pub vertices: usize,
    pub edges: usize,
    pub simplices: usize,
    pub errors: Vec<InvariantError>,
}

impl ComplexAudit {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

impl std::fmt::Display for ComplexAudit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "audit: {} vertices, {} edges, {} simplices, {} violation(s)",
            self.vertices,
            self.edges,
            self.simplices,
            self.errors.len()
        )?;
        for error in &self.errors {
            writeln!(f, "  - {error}")?;
        }
        Ok(())
    }
}

/// Walk the whole complex and collect every invariant violation.
#[instrument(skip(spacetime))]
pub fn audit_complex(spacetime: &Spacetime) -> ComplexAudit {
    let mut errors = Vec::new();

    check_edge_endpoints(spacetime, &mut errors);
    check_adjacency(spacetime, &mut errors);
    check_fingerprints(spacetime, &mut errors);
    for simplex in spacetime.all_simplices() {
        check_lookup(spacetime, simplex.id(), &mut errors);
        check_edge_sets(spacetime, simplex.id(), &mut errors);
        check_facet_links(spacetime, simplex.id(), &mut errors);
    }

    let audit = ComplexAudit {
        vertices: spacetime.vertex_count(),
        edges: spacetime.edge_count(),
        simplices: spacetime.all_simplices().count(),
        errors,
    };
    info!(
        valid = audit.is_valid(),
        vertices = audit.vertices,
        edges = audit.edges,
        error_count = audit.errors.len(),
        "audit complete"
    );
    audit
}

/// First violation as a fatal error, or `Ok` when the complex is sound.
pub fn validate(spacetime: &Spacetime) -> Result<(), SpacetimeError> {
    let audit = audit_complex(spacetime);
    match audit.errors.into_iter().next() {
        None => Ok(()),
        Some(error) => Err(SpacetimeError::InvariantViolation {
            detail: error.to_string(),
        }),
    }
}

/// The per-record slice of the audit: lookup coherence, induced edge set and
/// facet/coface links of one simplex.
pub fn audit_simplex(spacetime: &Spacetime, id: SimplexId) -> Vec<InvariantError> {
    let mut errors = Vec::new();
    check_lookup(spacetime, id, &mut errors);
    check_edge_sets(spacetime, id, &mut errors);
    check_facet_links(spacetime, id, &mut errors);
    errors
}

fn check_edge_endpoints(spacetime: &Spacetime, errors: &mut Vec<InvariantError>) {
    for edge in spacetime.edge_list().to_vector() {
        for vertex in [edge.source(), edge.target()] {
            if !spacetime.vertex_list().contains(vertex) {
                errors.push(InvariantError::UnresolvedEndpoint {
                    edge: edge.id(),
                    vertex,
                });
            }
        }
    }
}

fn check_adjacency(spacetime: &Spacetime, errors: &mut Vec<InvariantError>) {
    // Vertex -> edge direction.
    for vertex in spacetime.vertex_list().to_vector() {
        for &edge_id in vertex.out_edges() {
            match spacetime.edge_list().get(edge_id) {
                Some(edge) if edge.source() == vertex.id() => {}
                Some(_) => errors.push(InvariantError::AdjacencyMismatch {
                    vertex: vertex.id(),
                    edge: edge_id,
                    detail: "listed as outgoing but source differs".into(),
                }),
                None => errors.push(InvariantError::AdjacencyMismatch {
                    vertex: vertex.id(),
                    edge: edge_id,
                    detail: "outgoing edge does not exist".into(),
                }),
            }
        }
        for &edge_id in vertex.in_edges() {
            match spacetime.edge_list().get(edge_id) {
                Some(edge) if edge.target() == vertex.id() => {}
                Some(_) => errors.push(InvariantError::AdjacencyMismatch {
                    vertex: vertex.id(),
                    edge: edge_id,
                    detail: "listed as incoming but target differs".into(),
                }),
                None => errors.push(InvariantError::AdjacencyMismatch {
                    vertex: vertex.id(),
                    edge: edge_id,
                    detail: "incoming edge does not exist".into(),
                }),
            }
        }
    }

    // Edge -> vertex direction.
    for edge in spacetime.edge_list().to_vector() {
        if let Some(source) = spacetime.vertex_list().get(edge.source()) {
            if !source.out_edges().contains(&edge.id()) {
                errors.push(InvariantError::AdjacencyMismatch {
                    vertex: source.id(),
                    edge: edge.id(),
                    detail: "source vertex does not list the edge as outgoing".into(),
                });
            }
        }
        if let Some(target) = spacetime.vertex_list().get(edge.target()) {
            if !target.in_edges().contains(&edge.id()) {
                errors.push(InvariantError::AdjacencyMismatch {
                    vertex: target.id(),
                    edge: edge.id(),
                    detail: "target vertex does not list the edge as incoming".into(),
                });
            }
        }
    }
}

fn check_fingerprints(spacetime: &Spacetime, errors: &mut Vec<InvariantError>) {
    let mut seen: HashMap<Fingerprint, EdgeId> = HashMap::new();
    for edge in spacetime.edge_list().to_vector() {
        if seen.insert(edge.fingerprint(), edge.id()).is_some() {
            errors.push(InvariantError::DuplicateFingerprint {
                fingerprint: edge.fingerprint().as_pair(),
            });
        }
    }
}

fn check_lookup(spacetime: &Spacetime, id: SimplexId, errors: &mut Vec<InvariantError>) {
    let Some(simplex) = spacetime.simplex(id) else {
        return;
    };
    let coherent = simplex
        .vertices()
        .iter()
        .enumerate()
        .all(|(position, &vertex)| simplex.position_of(vertex) == Some(position));
    // The tuple must also agree with the spacetime's membership index.
    let indexed = simplex.vertices().iter().all(|&vertex| {
        spacetime
            .simplices_containing(vertex)
            .map(|members| members.contains(&id))
            .unwrap_or(false)
    });
    if !coherent || !indexed || simplex.vertices().len() != simplex.vertex_set().len() {
        errors.push(InvariantError::IncoherentLookup { simplex: id });
    }
}

fn check_edge_sets(spacetime: &Spacetime, id: SimplexId, errors: &mut Vec<InvariantError>) {
    let Some(simplex) = spacetime.simplex(id) else {
        return;
    };
    let vertices = simplex.vertices();
    let mut expected = BTreeSet::new();
    for i in 0..vertices.len() {
        for j in (i + 1)..vertices.len() {
            let fingerprint = Fingerprint::new(vertices[i], vertices[j]);
            if let Some(edge) = spacetime.edge_list().get_by_fingerprint(fingerprint) {
                expected.insert(edge.id());
            }
        }
    }
    if &expected != simplex.edges() {
        errors.push(InvariantError::EdgeSetMismatch { simplex: id });
    }
}

fn check_facet_links(spacetime: &Spacetime, id: SimplexId, errors: &mut Vec<InvariantError>) {
    let Some(simplex) = spacetime.simplex(id) else {
        return;
    };
    let vertex_set = simplex.vertex_set();

    for &facet_id in simplex.facets() {
        let Some(facet) = spacetime.simplex(facet_id) else {
            continue;
        };
        if !facet.vertex_set().is_subset(&vertex_set) {
            errors.push(InvariantError::FacetNotSubset {
                facet: facet_id,
                coface: id,
            });
        }
        if !facet.cofaces().contains(&id) {
            errors.push(InvariantError::MissingCofaceBackpointer {
                facet: facet_id,
                coface: id,
            });
        }
    }

    // A face's cofaces must each carry a facet describing the same vertex
    // set. After a gluing two records describe the shared face, so identity
    // is by tuple content rather than record id.
    for &coface_id in simplex.cofaces() {
        let Some(coface) = spacetime.simplex(coface_id) else {
            continue;
        };
        let matched = coface.facets().iter().any(|&candidate| {
            spacetime
                .simplex(candidate)
                .map(|record| record.vertex_set() == vertex_set)
                .unwrap_or(false)
        });
        if !matched {
            errors.push(InvariantError::MissingFacetBackpointer {
                face: id,
                coface: coface_id,
            });
        }
    }
}
