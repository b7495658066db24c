//! Coordinate index: exact point location for mesh vertices.
//!
//! Refinement relies on this index to detect that an edge midpoint already
//! exists (created earlier by the refinement of the element on the other
//! side of the edge). Midpoints are always computed by the same symmetric
//! formula, so an exact bitwise lookup is sufficient; no tolerance is used.

use crate::mesh_error::MeshAdaptError;
use hashbrown::HashMap;

/// Hashable key for a 2D point. `-0.0` and `0.0` map to the same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct PointKey(u64, u64);

impl PointKey {
    fn new(coords: [f64; 2]) -> Self {
        // adding 0.0 turns -0.0 into +0.0
        PointKey((coords[0] + 0.0).to_bits(), (coords[1] + 0.0).to_bits())
    }
}

/// Maps vertex coordinates to vertex ids.
#[derive(Clone, Debug, Default)]
pub struct CoordinateIndex {
    points: HashMap<PointKey, usize>,
}

impl CoordinateIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true` when no point is indexed.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Insert vertex `id` at `coords`.
    ///
    /// Fails if another vertex already occupies exactly the same position.
    pub fn insert(&mut self, id: usize, coords: [f64; 2]) -> Result<(), MeshAdaptError> {
        if !coords[0].is_finite() || !coords[1].is_finite() {
            return Err(MeshAdaptError::InvalidGeometry(format!(
                "vertex {id} has non-finite coordinates {coords:?}"
            )));
        }
        match self.points.insert(PointKey::new(coords), id) {
            Some(existing) if existing != id => {
                self.points.insert(PointKey::new(coords), existing);
                Err(MeshAdaptError::InvalidGeometry(format!(
                    "vertices {existing} and {id} share coordinates {coords:?}"
                )))
            }
            _ => Ok(()),
        }
    }

    /// Look up the vertex located exactly at `coords`.
    pub fn search(&self, coords: [f64; 2]) -> Option<usize> {
        self.points.get(&PointKey::new(coords)).copied()
    }

    /// Remove the point at `coords`, returning the id that was stored there.
    pub fn delete(&mut self, coords: [f64; 2]) -> Option<usize> {
        self.points.remove(&PointKey::new(coords))
    }

    /// Re-point the entry at `coords` to `new_id` (used after renumbering).
    pub fn relabel(&mut self, coords: [f64; 2], new_id: usize) -> Result<(), MeshAdaptError> {
        match self.points.get_mut(&PointKey::new(coords)) {
            Some(id) => {
                *id = new_id;
                Ok(())
            }
            None => Err(MeshAdaptError::VertexNotFound(new_id)),
        }
    }
}
