//! Shared vocabulary for the CDT engine: entity identifiers, simplex
//! orientations, metric signatures and the serde-backed engine configuration.
//!
//! This crate has no dependency on the kernel so hosts and tooling can use
//! these types without pulling in the full engine.

pub mod config;
pub mod ids;
pub mod orientation;
pub mod signature;

pub use config::{EngineConfig, MetricConfig};
pub use ids::{EdgeId, IdAllocator, SimplexId, VertexId};
pub use orientation::Orientation;
pub use signature::{Signature, SignatureKind};
