//! Combinatorial simplicial complex engine for causal dynamical
//! triangulations.
//!
//! The [`Spacetime`] owns every vertex, edge and simplex record and is the
//! only writer. All cross-references between entities are stable ids resolved
//! through the owning stores, so topological surgery (causal gluing) can
//! rewire incidence without dangling references.

pub mod error;
pub mod metric;
pub mod spacetime;
pub mod topology;
pub mod validation;

pub use error::SpacetimeError;
pub use metric::Metric;
pub use spacetime::{GrowthReport, Spacetime};
pub use topology::edge::{Edge, Fingerprint};
pub use topology::list::{EdgeList, VertexList};
pub use topology::simplex::Simplex;
pub use topology::vertex::Vertex;
pub use validation::{audit_complex, audit_simplex, validate, ComplexAudit, InvariantError};
