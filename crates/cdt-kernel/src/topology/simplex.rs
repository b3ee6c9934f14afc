//! Simplex and face records.
//!
//! Faces and top-dimensional simplices share one record type; what
//! distinguishes them is the incidence around them. A top simplex carries
//! `facets` (one per omitted vertex); a face carries `cofaces` naming every
//! top simplex it bounds. All references are arena ids owned by the
//! spacetime.

use std::collections::{BTreeSet, HashMap};

use cdt_types::{EdgeId, Orientation, SimplexId, VertexId};

use crate::error::SpacetimeError;

/// A simplex: an ordered tuple of distinct vertices with the time label of
/// each, the induced edge set, and facet/coface links.
#[derive(Debug, Clone)]
pub struct Simplex {
    id: SimplexId,
    vertices: Vec<VertexId>,
    times: Vec<i64>,
    positions: HashMap<VertexId, usize>,
    edges: BTreeSet<EdgeId>,
    facets: Vec<SimplexId>,
    cofaces: BTreeSet<SimplexId>,
    orientation: Orientation,
}

impl Simplex {
    /// Build a simplex record from an ordered vertex tuple and the matching
    /// time labels. Orientation is derived by counting vertices per slice.
    pub fn new(id: SimplexId, vertices: Vec<VertexId>, times: Vec<i64>) -> Self {
        debug_assert_eq!(vertices.len(), times.len());
        let positions = vertices
            .iter()
            .enumerate()
            .map(|(index, &vertex)| (vertex, index))
            .collect();
        let orientation = orientation_from_times(&times);
        Self {
            id,
            vertices,
            times,
            positions,
            edges: BTreeSet::new(),
            facets: Vec::new(),
            cofaces: BTreeSet::new(),
            orientation,
        }
    }

    pub fn id(&self) -> SimplexId {
        self.id
    }

    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    pub fn times(&self) -> &[i64] {
        &self.times
    }

    pub fn vertex_set(&self) -> BTreeSet<VertexId> {
        self.vertices.iter().copied().collect()
    }

    pub fn dimension(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Timelike iff the vertices span both time slices.
    pub fn is_timelike(&self) -> bool {
        self.orientation.is_timelike()
    }

    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.positions.contains_key(&vertex)
    }

    pub fn position_of(&self, vertex: VertexId) -> Option<usize> {
        self.positions.get(&vertex).copied()
    }

    pub fn edges(&self) -> &BTreeSet<EdgeId> {
        &self.edges
    }

    pub fn edges_mut(&mut self) -> &mut BTreeSet<EdgeId> {
        &mut self.edges
    }

    pub fn facets(&self) -> &[SimplexId] {
        &self.facets
    }

    pub fn set_facets(&mut self, facets: Vec<SimplexId>) {
        self.facets = facets;
    }

    pub fn cofaces(&self) -> &BTreeSet<SimplexId> {
        &self.cofaces
    }

    pub fn add_coface(&mut self, coface: SimplexId) {
        self.cofaces.insert(coface);
    }

    /// A record with cofaces is a facet of something; a record with facets is
    /// a top simplex. Fresh standalone records are neither.
    pub fn is_facet(&self) -> bool {
        !self.cofaces.is_empty()
    }

    /// The vertex tuples obtained by omitting each vertex in turn, with the
    /// matching time labels and the omitted position.
    pub fn facet_tuples(&self) -> Vec<(usize, Vec<VertexId>, Vec<i64>)> {
        (0..self.vertices.len())
            .map(|omit| {
                let mut vertices = self.vertices.clone();
                let mut times = self.times.clone();
                vertices.remove(omit);
                times.remove(omit);
                (omit, vertices, times)
            })
            .collect()
    }

    /// Replace `old` by `new` in the vertex tuple and lookup. The caller is
    /// responsible for propagating the substitution to edges, facets and
    /// cofaces (see `Spacetime::attach`).
    pub fn replace_vertex(&mut self, old: VertexId, new: VertexId, new_time: i64) {
        if let Some(position) = self.positions.remove(&old) {
            self.vertices[position] = new;
            self.times[position] = new_time;
            self.positions.insert(new, position);
            self.orientation = orientation_from_times(&self.times);
        }
    }

    /// Parity of the positional permutation mapping this face onto `other`.
    ///
    /// Returns `0` when the vertex-id sets disagree, `+1` when the
    /// permutation is even, `-1` when it is odd.
    pub fn check_parity(&self, other: &Simplex) -> i8 {
        if self.vertices.len() != other.vertices.len() {
            return 0;
        }
        let mut permutation = Vec::with_capacity(self.vertices.len());
        for &vertex in &self.vertices {
            match other.position_of(vertex) {
                Some(position) => permutation.push(position),
                None => return 0,
            }
        }
        permutation_sign(&permutation)
    }

    /// An orientation-preserving vertex pairing between this face and a
    /// vertex-disjoint face of the same dimension and orientation.
    ///
    /// Vertices are paired slice by slice in tuple order; if the induced
    /// permutation is odd, two same-slice partners are swapped to restore
    /// even parity. When no slice holds two vertices the parity cannot be
    /// repaired and there is no orientation-preserving identification.
    pub fn pairing_with(
        &self,
        other: &Simplex,
    ) -> Result<Vec<(VertexId, VertexId)>, SpacetimeError> {
        if self.vertices.len() != other.vertices.len() {
            return Err(SpacetimeError::DimensionMismatch {
                left: self.dimension(),
                right: other.dimension(),
            });
        }
        let no_match = || SpacetimeError::NoOrientationPreservingMatch {
            left: self.id,
            right: other.id,
        };
        if self.orientation != other.orientation {
            return Err(no_match());
        }
        if self.vertices.iter().any(|v| other.contains_vertex(*v)) {
            return Err(no_match());
        }

        // Positions per time slice, in tuple order, on both sides.
        let mut self_slots: HashMap<i64, Vec<usize>> = HashMap::new();
        for (position, &time) in self.times.iter().enumerate() {
            self_slots.entry(time).or_default().push(position);
        }
        let mut other_slots: HashMap<i64, Vec<usize>> = HashMap::new();
        for (position, &time) in other.times.iter().enumerate() {
            other_slots.entry(time).or_default().push(position);
        }
        if self_slots.len() != other_slots.len() {
            return Err(no_match());
        }

        // sigma[k] = position in `other` paired with position k in `self`.
        let mut sigma = vec![usize::MAX; self.vertices.len()];
        let mut repair_slots: Option<(usize, usize)> = None;
        let mut slices: Vec<i64> = self_slots.keys().copied().collect();
        slices.sort_unstable();
        for time in slices {
            let mine = &self_slots[&time];
            let theirs = match other_slots.get(&time) {
                Some(theirs) if theirs.len() == mine.len() => theirs,
                _ => return Err(no_match()),
            };
            for (&a, &b) in mine.iter().zip(theirs.iter()) {
                sigma[a] = b;
            }
            if mine.len() >= 2 && repair_slots.is_none() {
                repair_slots = Some((mine[0], mine[1]));
            }
        }

        if permutation_sign(&sigma) < 0 {
            match repair_slots {
                Some((a, b)) => sigma.swap(a, b),
                None => return Err(no_match()),
            }
        }

        Ok(self
            .vertices
            .iter()
            .enumerate()
            .map(|(position, &vertex)| (vertex, other.vertices[sigma[position]]))
            .collect())
    }
}

impl std::fmt::Display for Simplex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (index, vertex) in self.vertices.iter().enumerate() {
            if index > 0 {
                write!(f, ",")?;
            }
            write!(f, "{vertex}")?;
        }
        write!(f, "}}{}", self.orientation)
    }
}

/// Count vertices per slice: slice 0 is initial, everything later is final.
fn orientation_from_times(times: &[i64]) -> Orientation {
    let n_initial = times.iter().filter(|&&t| t == 0).count() as u32;
    let n_final = times.len() as u32 - n_initial;
    Orientation::new(n_initial, n_final)
}

/// Sign of a permutation given as an image array, via inversion count.
/// Quadratic, which is fine for the tuple sizes a CDT simplex has.
fn permutation_sign(permutation: &[usize]) -> i8 {
    let mut inversions = 0usize;
    for i in 0..permutation.len() {
        for j in (i + 1)..permutation.len() {
            if permutation[i] > permutation[j] {
                inversions += 1;
            }
        }
    }
    if inversions % 2 == 0 {
        1
    } else {
        -1
    }
}
