use serde::{Deserialize, Serialize};

/// Metric signature family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureKind {
    /// One timelike axis (index 0) and `dimension - 1` spacelike axes.
    Lorentzian,
    /// All axes spacelike.
    Euclidean,
}

/// A diagonal metric signature of a fixed dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub kind: SignatureKind,
    pub dimension: usize,
}

impl Signature {
    pub fn new(dimension: usize, kind: SignatureKind) -> Self {
        Self { kind, dimension }
    }

    /// The diagonal entries. Lorentzian puts the `-1` on axis 0, the time
    /// axis by convention.
    pub fn diagonal(&self) -> Vec<f64> {
        let mut diag = vec![1.0; self.dimension];
        if self.kind == SignatureKind::Lorentzian && self.dimension > 0 {
            diag[0] = -1.0;
        }
        diag
    }
}

impl Default for Signature {
    fn default() -> Self {
        Signature::new(4, SignatureKind::Lorentzian)
    }
}
