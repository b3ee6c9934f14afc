use serde::{Deserialize, Serialize};

use crate::signature::Signature;

/// Metric configuration.
///
/// A coordinate-free metric refuses to compute lengths from coordinates;
/// edges then carry their cached signed squared lengths instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    #[serde(default = "default_coordinate_free")]
    pub coordinate_free: bool,
    #[serde(default)]
    pub signature: Signature,
}

fn default_coordinate_free() -> bool {
    true
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            coordinate_free: true,
            signature: Signature::default(),
        }
    }
}

/// Top-level engine configuration, deserializable from a host-supplied
/// JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub metric: MetricConfig,
}
