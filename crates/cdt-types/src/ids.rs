use serde::{Deserialize, Serialize};

/// Stable identifier of a vertex.
///
/// Dense, monotonic, never reused. Allocation goes through an [`IdAllocator`]
/// owned by the spacetime; a driver may also supply an explicit id at vertex
/// creation, in which case the allocator is bumped past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub u64);

/// Stable identifier of an edge. Survives redirection; the edge's
/// fingerprint does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub u64);

/// Stable identifier of a simplex or face record in the spacetime's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimplexId(pub u64);

macro_rules! id_impls {
    ($name:ident) => {
        impl $name {
            pub fn raw(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                $name(raw)
            }
        }

        // Serialize as a bare integer so ids read naturally in JSON.
        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                self.0.serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                u64::deserialize(deserializer).map($name)
            }
        }
    };
}

id_impls!(VertexId);
id_impls!(EdgeId);
id_impls!(SimplexId);

/// Monotonic id source. One per entity kind; deletion never recycles.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next id.
    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Make sure `id` can never be handed out again. Used when a driver
    /// supplies an explicit id.
    pub fn reserve(&mut self, id: u64) {
        if id >= self.next {
            self.next = id + 1;
        }
    }
}
