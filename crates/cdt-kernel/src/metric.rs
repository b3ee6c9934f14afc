use cdt_types::{MetricConfig, Signature, SignatureKind};

use crate::error::SpacetimeError;

/// Computes signed squared lengths from coordinates under a diagonal
/// signature.
///
/// A coordinate-free metric refuses length computation outright; the complex
/// then relies on the signed squared lengths cached on its edges.
#[derive(Debug, Clone, Copy)]
pub struct Metric {
    coordinate_free: bool,
    signature: Signature,
}

impl Metric {
    pub fn new(coordinate_free: bool, signature: Signature) -> Self {
        Self {
            coordinate_free,
            signature,
        }
    }

    pub fn from_config(config: &MetricConfig) -> Self {
        Self::new(config.coordinate_free, config.signature)
    }

    pub fn is_coordinate_free(&self) -> bool {
        self.coordinate_free
    }

    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// Signed squared length between two coordinate vectors:
    /// `sum_k sig[k] * (a[k] - b[k])^2`.
    pub fn squared_length(&self, a: &[f64], b: &[f64]) -> Result<f64, SpacetimeError> {
        if self.coordinate_free {
            return Err(SpacetimeError::NoCoordinatesForMetric);
        }
        if a.len() != b.len() || a.len() != self.signature.dimension {
            return Err(SpacetimeError::DimensionMismatch {
                left: a.len(),
                right: b.len().max(self.signature.dimension),
            });
        }
        let diagonal = self.signature.diagonal();
        Ok(a.iter()
            .zip(b.iter())
            .zip(diagonal.iter())
            .map(|((&x, &y), &sign)| sign * (x - y) * (x - y))
            .sum())
    }
}

impl Default for Metric {
    fn default() -> Self {
        Self::new(true, Signature::new(4, SignatureKind::Lorentzian))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_coordinate_free_metric_refuses() {
        let metric = Metric::new(true, Signature::new(4, SignatureKind::Lorentzian));
        let err = metric
            .squared_length(&[0.0, 0.0, 0.0, 0.0], &[0.0, 0.0, 0.0, 1.0])
            .unwrap_err();
        assert!(matches!(err, SpacetimeError::NoCoordinatesForMetric));
    }

    #[test]
    fn test_lorentzian_squared_length() {
        let metric = Metric::new(false, Signature::new(4, SignatureKind::Lorentzian));
        // Purely spatial separation on the last axis.
        let length = metric
            .squared_length(&[0.0, 0.0, 0.0, 0.0], &[0.0, 0.0, 0.0, 1.0])
            .unwrap();
        assert_relative_eq!(length, 1.0);

        // Purely temporal separation is negative.
        let length = metric
            .squared_length(&[0.0, 0.0, 0.0, 0.0], &[2.0, 0.0, 0.0, 0.0])
            .unwrap();
        assert_relative_eq!(length, -4.0);
    }

    #[test]
    fn test_euclidean_squared_length() {
        let metric = Metric::new(false, Signature::new(3, SignatureKind::Euclidean));
        let length = metric
            .squared_length(&[0.0, 0.0, 0.0], &[1.0, 2.0, 2.0])
            .unwrap();
        assert_relative_eq!(length, 9.0);
    }

    #[test]
    fn test_dimension_mismatch_is_reported() {
        let metric = Metric::new(false, Signature::new(3, SignatureKind::Euclidean));
        let err = metric.squared_length(&[0.0, 0.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, SpacetimeError::DimensionMismatch { .. }));
    }
}
