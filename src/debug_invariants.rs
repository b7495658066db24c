use crate::mesh_error::MeshAdaptError;
use crate::topology::cell_type::CellType;
use crate::topology::mesh::Mesh;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Assert invariants in debug builds or when invariant checking is enabled.
    fn debug_assert_invariants(&self);
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), MeshAdaptError>;
}

/// Helper macro to run a fallible check and panic on error when invariant
/// checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}

impl DebugInvariants for Mesh {
    fn debug_assert_invariants(&self) {
        debug_invariants!(self.validate_invariants(), "mesh");
    }

    /// Checks, in order: element shapes and type counters, element-at-vertex
    /// lists, the coordinate index, boundary membership, orientation, and
    /// that both adjacency arrays are symmetric and equal to what the
    /// topology implies.
    fn validate_invariants(&self) -> Result<(), MeshAdaptError> {
        let (nvt, nel) = (self.nvt(), self.nel());
        let mut counts = [0usize; 2];
        for e in 1..=nel {
            let shape = CellType::from_slots(&self.element(e))
                .ok_or(MeshAdaptError::InvalidElement(e))?;
            counts[shape.index()] += 1;
            for &v in self.vertices(e) {
                if v > nvt {
                    return Err(MeshAdaptError::InvalidElement(e));
                }
                if !self.elements_at_vertex(v).contains(&e) {
                    return Err(MeshAdaptError::ElementNotInVertexList { vertex: v, element: e });
                }
            }
            if self.signed_area(e) <= 0.0 {
                return Err(MeshAdaptError::InvalidGeometry(format!(
                    "element {e} lost its counter-clockwise orientation"
                )));
            }
        }
        if counts[0] != self.inel_of_type(CellType::Triangle)
            || counts[1] != self.inel_of_type(CellType::Quadrilateral)
            || counts[0] + counts[1] != nel
        {
            return Err(MeshAdaptError::InvalidGeometry(format!(
                "type counters {:?} do not match {nel} elements",
                [
                    self.inel_of_type(CellType::Triangle),
                    self.inel_of_type(CellType::Quadrilateral)
                ]
            )));
        }

        for v in 1..=nvt {
            for &e in self.elements_at_vertex(v) {
                if e == 0 || e > nel || !self.vertices(e).contains(&v) {
                    return Err(MeshAdaptError::ElementNotInVertexList { vertex: v, element: e });
                }
            }
            if self.coordinate_index().search(self.coords(v)) != Some(v) {
                return Err(MeshAdaptError::VertexNotFound(v));
            }
            let c = self.nodal_property(v);
            if c != 0 && self.boundary().node(c, v).is_none() {
                return Err(MeshAdaptError::VertexNotOnBoundary { vertex: v, component: c });
            }
        }
        if self.coordinate_index().len() != nvt {
            return Err(MeshAdaptError::InvalidGeometry(format!(
                "coordinate index holds {} points for {nvt} vertices",
                self.coordinate_index().len()
            )));
        }

        for e in 1..=nel {
            let (nb, mid) = (self.neighbours(e), self.mid_neighbours(e));
            for i in 0..self.shape(e).num_vertices() {
                let (a, b) = self.edge(e, i);
                if self.find_edge_neighbours(e, a, b) != (nb[i], mid[i]) {
                    return Err(MeshAdaptError::InconsistentAdjacency {
                        element: e,
                        neighbour: nb[i],
                    });
                }
                for f in [nb[i], mid[i]] {
                    if f == 0 {
                        continue;
                    }
                    let back = self
                        .neighbours(f)
                        .iter()
                        .chain(self.mid_neighbours(f).iter())
                        .any(|&g| g == e);
                    if f > nel || !back {
                        return Err(MeshAdaptError::InconsistentAdjacency {
                            element: e,
                            neighbour: f,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_mesh_is_valid() {
        let mesh = Mesh::new(
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [2.0, 0.0]],
            &[[1, 2, 3, 4], [2, 5, 3, 0]],
        )
        .unwrap();
        mesh.validate_invariants().unwrap();
        mesh.debug_assert_invariants();
    }
}
