//! Builders for canonical complexes used across the scenario suites.

use std::collections::VecDeque;

use cdt_kernel::{Spacetime, SpacetimeError};
use cdt_types::{Orientation, SimplexId};

/// Errors surfaced by the harness itself.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error(transparent)]
    Engine(#[from] SpacetimeError),
}

/// First timelike facet of a top simplex, in facet index order.
pub fn first_timelike_facet(
    spacetime: &Spacetime,
    top: SimplexId,
) -> Result<SimplexId, HarnessError> {
    let record = spacetime
        .simplex(top)
        .ok_or(SpacetimeError::UnknownSimplex { id: top })?;
    record
        .facets()
        .iter()
        .copied()
        .find(|&facet| {
            spacetime
                .simplex(facet)
                .map(|f| f.is_timelike())
                .unwrap_or(false)
        })
        .ok_or_else(|| HarnessError::AssertionFailed {
            detail: format!("simplex {top} has no timelike facet"),
        })
}

/// Two simplices glued along their first timelike facets. Returns the
/// spacetime, the surviving face and the two top simplices.
pub fn build_glued_pair(
    left_orientation: Orientation,
    right_orientation: Orientation,
) -> Result<(Spacetime, SimplexId, (SimplexId, SimplexId)), HarnessError> {
    let mut spacetime = Spacetime::new();
    let left_top = spacetime.create_simplex(left_orientation)?;
    let right_top = spacetime.create_simplex(right_orientation)?;

    let left = first_timelike_facet(&spacetime, left_top)?;
    let right = first_timelike_facet(&spacetime, right_top)?;

    let face = spacetime
        .causally_attach_faces(left, right)?
        .ok_or_else(|| HarnessError::AssertionFailed {
            detail: "pair gluing rolled back".into(),
        })?;
    Ok((spacetime, face, (left_top, right_top)))
}

/// Grow a chain of `count` simplices with alternating orientations
/// `(1, d)` / `(2, d - 1)`, gluing each fresh simplex onto the complex the
/// way the host driver does: choose a face pair, attach, and queue the
/// simplex for later retries when the merge rolls back.
pub fn build_chain(count: usize, d: u32) -> Result<(Spacetime, Vec<SimplexId>), HarnessError> {
    let mut spacetime = Spacetime::new();
    let orientations = [Orientation::new(1, d), Orientation::new(2, d - 1)];
    let mut tops = Vec::with_capacity(count);
    let mut unglued: VecDeque<(SimplexId, usize)> = VecDeque::new();

    for step in 0..count {
        let fresh = spacetime.create_simplex(orientations[step % 2])?;
        tops.push(fresh);
        if step == 0 {
            continue;
        }

        match spacetime.choose_simplex_faces_to_glue(fresh) {
            Ok((on_fresh, on_existing)) => {
                if spacetime
                    .causally_attach_faces(on_fresh, on_existing)?
                    .is_none()
                {
                    unglued.push_back((fresh, 0));
                }
            }
            Err(SpacetimeError::NoGluableFacePair { .. }) => {
                unglued.push_back((fresh, 0));
            }
            Err(other) => return Err(other.into()),
        }

        // Retry anything still unglued, giving up after three attempts.
        for _ in 0..unglued.len() {
            let (pending, retries) = match unglued.pop_front() {
                Some(entry) => entry,
                None => break,
            };
            if retries > 3 {
                continue;
            }
            let pair = match spacetime.choose_simplex_faces_to_glue(pending) {
                Ok(pair) => pair,
                Err(SpacetimeError::NoGluableFacePair { .. }) => {
                    unglued.push_back((pending, retries + 1));
                    continue;
                }
                Err(other) => return Err(other.into()),
            };
            if spacetime.causally_attach_faces(pair.0, pair.1)?.is_none() {
                unglued.push_back((pending, retries + 1));
            }
        }
    }

    Ok((spacetime, tops))
}
