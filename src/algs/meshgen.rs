//! Structured box meshes for tests, benches and quick experiments.

use crate::mesh_error::MeshAdaptError;
use crate::topology::mesh::Mesh;

/// Cell-type choices for structured meshes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StructuredCellType {
    Triangle,
    Quadrilateral,
    /// Quadrilaterals in the left half of the columns, triangles in the rest.
    Mixed,
}

fn invalid_geometry(message: impl Into<String>) -> MeshAdaptError {
    MeshAdaptError::InvalidGeometry(message.into())
}

/// Generate a structured 2D box mesh over `[min, max]` with `nx`×`ny` cells.
///
/// Vertices are numbered row by row from `min`; every element is
/// counter-clockwise. Triangle cells split each box along its rising
/// diagonal.
pub fn structured_box_2d(
    nx: usize,
    ny: usize,
    min: [f64; 2],
    max: [f64; 2],
    cell_type: StructuredCellType,
) -> Result<Mesh, MeshAdaptError> {
    if nx == 0 || ny == 0 {
        return Err(invalid_geometry("nx and ny must be positive"));
    }
    if !(max[0] > min[0] && max[1] > min[1]) {
        return Err(invalid_geometry(format!(
            "box [{min:?}, {max:?}] has no area"
        )));
    }
    let dx = (max[0] - min[0]) / nx as f64;
    let dy = (max[1] - min[1]) / ny as f64;
    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        let y = min[1] + dy * j as f64;
        for i in 0..=nx {
            vertices.push([min[0] + dx * i as f64, y]);
        }
    }

    let mut cells = Vec::new();
    let row_stride = nx + 1;
    for j in 0..ny {
        for i in 0..nx {
            // 1-based ids
            let v0 = j * row_stride + i + 1;
            let v1 = v0 + 1;
            let v3 = v0 + row_stride;
            let v2 = v3 + 1;
            let quad = match cell_type {
                StructuredCellType::Triangle => false,
                StructuredCellType::Quadrilateral => true,
                StructuredCellType::Mixed => 2 * i < nx,
            };
            if quad {
                cells.push([v0, v1, v2, v3]);
            } else {
                cells.push([v0, v1, v2, 0]);
                cells.push([v0, v2, v3, 0]);
            }
        }
    }
    log::trace!(
        "structured box {nx}x{ny} ({cell_type:?}): {} vertices, {} elements",
        vertices.len(),
        cells.len()
    );
    Mesh::new(vertices, &cells)
}

/// The unit square `[0, 1]²` with `n`×`n` cells.
pub fn unit_square(n: usize, cell_type: StructuredCellType) -> Result<Mesh, MeshAdaptError> {
    structured_box_2d(n, n, [0.0, 0.0], [1.0, 1.0], cell_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug_invariants::DebugInvariants;
    use crate::topology::cell_type::CellType;

    #[test]
    fn structured_box_2d_triangles() {
        let mesh = structured_box_2d(2, 1, [0.0, 0.0], [2.0, 1.0], StructuredCellType::Triangle)
            .unwrap();
        assert_eq!(mesh.nvt(), 6);
        assert_eq!(mesh.nel(), 4);
        assert_eq!(mesh.inel_of_type(CellType::Triangle), 4);
        mesh.validate_invariants().unwrap();
    }

    #[test]
    fn mixed_box_has_both_shapes() {
        let mesh = unit_square(4, StructuredCellType::Mixed).unwrap();
        assert_eq!(mesh.inel_of_type(CellType::Quadrilateral), 8);
        assert_eq!(mesh.inel_of_type(CellType::Triangle), 16);
        mesh.validate_invariants().unwrap();
    }

    #[test]
    fn structured_box_rejects_empty() {
        assert!(matches!(
            structured_box_2d(0, 1, [0.0, 0.0], [1.0, 1.0], StructuredCellType::Quadrilateral),
            Err(MeshAdaptError::InvalidGeometry(_))
        ));
        assert!(unit_square(1, StructuredCellType::Quadrilateral).is_ok());
    }
}
