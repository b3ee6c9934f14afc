//! Euclidean embedding of a finished triangulation.
//!
//! A distinct pass over the kernel's read-only topology views: vertices get
//! positions in a `dimensions`-dimensional space by gradient descent on the
//! edge-length residuals, with axis 0 anchored to the discrete time slicing.
//! Coordinates are written back through `Spacetime::set_coordinates` with
//! coordinate 0 pinned to each vertex's time label.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use cdt_kernel::{Spacetime, SpacetimeError};

/// Configuration for the embedding optimizer.
#[derive(Debug, Clone)]
pub struct EmbedConfig {
    /// Target space dimension; axis 0 is the time axis.
    pub dimensions: usize,
    pub learning_rate: f64,
    /// Convergence threshold on the loss delta between iterations.
    pub epsilon: f64,
    pub max_iterations: usize,
    /// Seed for the random initial placement, so runs are reproducible.
    pub seed: u64,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            dimensions: 4,
            learning_rate: 1e-2,
            epsilon: 1e-10,
            max_iterations: 10_000,
            seed: 0,
        }
    }
}

/// Outcome of an embedding run.
#[derive(Debug, Clone)]
pub struct EmbedReport {
    pub converged: bool,
    pub iterations: usize,
    pub final_loss: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("nothing to embed: the complex has no vertices or no edges")]
    EmptyComplex,

    #[error("embedding needs at least 2 dimensions (one time, one space), got {dimensions}")]
    BadDimension { dimensions: usize },

    #[error(transparent)]
    Kernel(#[from] SpacetimeError),
}

// Adam moment decay rates.
const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const ADAM_EPS: f64 = 1e-8;

/// Embed the complex by minimizing, over all edges,
/// `(||x_s - x_t||^2 - |L| + dims * dt^2)^2`
/// where `|L|` is the magnitude of the edge's signed squared length and `dt`
/// is the gap between the observed mean time coordinate and the discrete
/// mean vertex time. Adam-style updates; converges when the loss delta
/// drops below `epsilon`.
pub fn embed_euclidean(
    spacetime: &mut Spacetime,
    config: &EmbedConfig,
) -> Result<EmbedReport, EmbedError> {
    if config.dimensions < 2 {
        return Err(EmbedError::BadDimension {
            dimensions: config.dimensions,
        });
    }

    let vertex_records = spacetime.vertex_list().to_vector();
    let edge_records = spacetime.edge_list().to_vector();
    if vertex_records.is_empty() || edge_records.is_empty() {
        return Err(EmbedError::EmptyComplex);
    }

    let n = vertex_records.len();
    let e = edge_records.len();
    let dims = config.dimensions;

    let mut vertex_ids = Vec::with_capacity(n);
    let mut vertex_times = Vec::with_capacity(n);
    let mut index_of = std::collections::HashMap::with_capacity(n);
    for (index, vertex) in vertex_records.iter().enumerate() {
        vertex_ids.push(vertex.id());
        vertex_times.push(vertex.time() as f64);
        index_of.insert(vertex.id(), index);
    }

    let mut edge_source = Vec::with_capacity(e);
    let mut edge_target = Vec::with_capacity(e);
    let mut edge_length = Vec::with_capacity(e);
    for edge in &edge_records {
        let source = index_of[&edge.source()];
        let target = index_of[&edge.target()];
        edge_source.push(source);
        edge_target.push(target);
        // Magnitude-only target; zero targets destabilize the descent.
        let length = spacetime.edge_squared_length(edge.id())?.unwrap_or(0.0);
        edge_length.push(if length.abs() > 0.0 {
            length.abs()
        } else {
            config.epsilon
        });
    }

    info!(
        vertices = n,
        edges = e,
        dims,
        "embedding a Euclidean space"
    );

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut positions: Vec<f64> = (0..n * dims).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let mut first_moment = vec![0.0; n * dims];
    let mut second_moment = vec![0.0; n * dims];

    let mut previous_loss = f64::INFINITY;
    let mut loss = 0.0;
    let mut iterations = 0;
    let mut converged = false;

    for iteration in 1..=config.max_iterations {
        iterations = iteration;
        let mut gradient = vec![0.0; n * dims];
        loss = 0.0;

        for k in 0..e {
            let s = edge_source[k] * dims;
            let t = edge_target[k] * dims;

            let mut sqdist = 0.0;
            for d in 0..dims {
                let delta = positions[s + d] - positions[t + d];
                sqdist += delta * delta;
            }

            let expected_time =
                (vertex_times[edge_source[k]] + vertex_times[edge_target[k]]) / 2.0;
            let observed_time = (positions[s] + positions[t]) / 2.0;
            let time_gap = observed_time - expected_time;

            let residual = sqdist - edge_length[k] + dims as f64 * time_gap * time_gap;
            loss += residual * residual;

            // d(loss)/d(residual) carries the 1/E of the mean.
            let scale = 2.0 * residual / e as f64;
            for d in 0..dims {
                let delta = positions[s + d] - positions[t + d];
                gradient[s + d] += scale * 2.0 * delta;
                gradient[t + d] -= scale * 2.0 * delta;
            }
            // The time-anchor term touches axis 0 of both endpoints.
            let anchor = scale * dims as f64 * time_gap;
            gradient[s] += anchor;
            gradient[t] += anchor;
        }
        loss /= e as f64;

        if (loss - previous_loss).abs() <= config.epsilon {
            converged = true;
            break;
        }
        previous_loss = loss;

        // Adam update with bias correction.
        let correction1 = 1.0 - BETA1.powi(iteration as i32);
        let correction2 = 1.0 - BETA2.powi(iteration as i32);
        for i in 0..positions.len() {
            first_moment[i] = BETA1 * first_moment[i] + (1.0 - BETA1) * gradient[i];
            second_moment[i] =
                BETA2 * second_moment[i] + (1.0 - BETA2) * gradient[i] * gradient[i];
            let m_hat = first_moment[i] / correction1;
            let v_hat = second_moment[i] / correction2;
            positions[i] -= config.learning_rate * m_hat / (v_hat.sqrt() + ADAM_EPS);
        }

        if iteration % 100 == 0 {
            debug!(iteration, loss, "embedding step");
        }
    }

    // Write back: axis 0 is the discrete time, the rest comes from the
    // optimizer.
    for (index, &vertex_id) in vertex_ids.iter().enumerate() {
        let mut coords = vec![0.0; dims];
        coords[0] = vertex_times[index];
        coords[1..dims].copy_from_slice(&positions[index * dims + 1..index * dims + dims]);
        spacetime.set_coordinates(vertex_id, coords)?;
    }

    info!(iterations, loss, converged, "embedding finished");
    Ok(EmbedReport {
        converged,
        iterations,
        final_loss: loss,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdt_types::Orientation;

    fn glued_pair() -> Spacetime {
        let mut st = Spacetime::new();
        let a = st.create_simplex(Orientation::new(1, 2)).unwrap();
        let b = st.create_simplex(Orientation::new(2, 1)).unwrap();
        let left = st
            .simplex(a)
            .unwrap()
            .facets()
            .iter()
            .copied()
            .find(|&f| st.simplex(f).unwrap().is_timelike())
            .unwrap();
        let right = st
            .simplex(b)
            .unwrap()
            .facets()
            .iter()
            .copied()
            .find(|&f| st.simplex(f).unwrap().is_timelike())
            .unwrap();
        st.causally_attach_faces(left, right).unwrap().unwrap();
        st
    }

    #[test]
    fn test_embed_rejects_degenerate_dimension() {
        let mut st = glued_pair();
        let config = EmbedConfig {
            dimensions: 1,
            ..EmbedConfig::default()
        };
        let err = embed_euclidean(&mut st, &config).unwrap_err();
        assert!(matches!(err, EmbedError::BadDimension { dimensions: 1 }));
    }

    #[test]
    fn test_embed_rejects_empty_complex() {
        let mut st = Spacetime::new();
        let err = embed_euclidean(&mut st, &EmbedConfig::default()).unwrap_err();
        assert!(matches!(err, EmbedError::EmptyComplex));
    }

    #[test]
    fn test_embed_anchors_time_axis() {
        let mut st = glued_pair();
        let config = EmbedConfig {
            dimensions: 3,
            max_iterations: 500,
            ..EmbedConfig::default()
        };
        let report = embed_euclidean(&mut st, &config).unwrap();
        assert!(report.iterations >= 1);
        assert!(report.final_loss.is_finite());

        for vertex in st.vertex_list().to_vector() {
            let coords = vertex.coordinates();
            assert_eq!(coords.len(), 3);
            approx::assert_relative_eq!(coords[0], vertex.time() as f64);
        }
    }

    #[test]
    fn test_embed_is_deterministic() {
        let config = EmbedConfig {
            dimensions: 3,
            max_iterations: 200,
            seed: 7,
            ..EmbedConfig::default()
        };

        let mut first = glued_pair();
        embed_euclidean(&mut first, &config).unwrap();
        let mut second = glued_pair();
        embed_euclidean(&mut second, &config).unwrap();

        for (a, b) in first
            .vertex_list()
            .to_vector()
            .iter()
            .zip(second.vertex_list().to_vector())
        {
            assert_eq!(a.id(), b.id());
            assert_eq!(a.coordinates(), b.coordinates());
        }
    }

    #[test]
    fn test_embed_improves_on_random_placement() {
        let mut st = glued_pair();
        let short = EmbedConfig {
            dimensions: 3,
            max_iterations: 1,
            ..EmbedConfig::default()
        };
        let initial = embed_euclidean(&mut st, &short).unwrap();

        let mut st = glued_pair();
        let long = EmbedConfig {
            dimensions: 3,
            max_iterations: 2000,
            ..EmbedConfig::default()
        };
        let optimized = embed_euclidean(&mut st, &long).unwrap();

        assert!(
            optimized.final_loss <= initial.final_loss,
            "descent should not worsen the loss: {} vs {}",
            optimized.final_loss,
            initial.final_loss
        );
    }
}
