use cdt_types::{EdgeId, Orientation, SimplexId, VertexId};

/// Errors from spacetime operations.
///
/// Precondition and selection errors are local: the driver retries with
/// another simplex or face pair. `InvariantViolation` indicates a defect in
/// the engine and is fatal.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SpacetimeError {
    #[error("vertex id {id} is already in use")]
    IdInUse { id: VertexId },

    #[error("edge endpoints must be distinct (got {vertex} twice)")]
    SelfLoop { vertex: VertexId },

    #[error("orientation {orientation} does not describe a simplex")]
    InvalidOrientation { orientation: Orientation },

    #[error("fingerprint collision: another edge already spans {fingerprint:?}")]
    FingerprintCollision { fingerprint: (VertexId, VertexId) },

    #[error("unknown vertex: {id}")]
    UnknownVertex { id: VertexId },

    #[error("unknown edge: {id}")]
    UnknownEdge { id: EdgeId },

    #[error("unknown simplex: {id}")]
    UnknownSimplex { id: SimplexId },

    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("no gluable face pair for simplex {simplex}")]
    NoGluableFacePair { simplex: SimplexId },

    #[error("no orientation-preserving vertex pairing between faces {left} and {right}")]
    NoOrientationPreservingMatch { left: SimplexId, right: SimplexId },

    #[error("attach would duplicate edge {fingerprint:?}")]
    AttachWouldDuplicateEdge { fingerprint: (VertexId, VertexId) },

    #[error("inconsistent pairing: {detail}")]
    InconsistentPairing { detail: String },

    #[error("metric is coordinate-free: cannot compute squared length from coordinates")]
    NoCoordinatesForMetric,

    #[error("invariant violation: {detail}")]
    InvariantViolation { detail: String },
}
