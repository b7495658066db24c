//! Refinement operators and their execution.
//!
//! Every operator rotates the element so that the edges to bisect sit where
//! the template expects them, creates (or reuses) the refinement vertices,
//! writes the first child into the element's own slot, appends the others
//! and relinks the neighbourhood before reporting once to the observer.

use crate::adapt::install::install;
use crate::adapt::mark_refine::RefineMarking;
use crate::adapt::marker::{QuadRefinement, RefineMarker, TriaRefinement};
use crate::adapt::observer::{Notifier, OperationKind};
use crate::mesh_error::MeshAdaptError;
use crate::topology::cell_type::CellType;
use crate::topology::mesh::Mesh;
use crate::topology::state::rotate_slice;
use crate::topology::template::{self, Diagonal, Slots};

/// Summary of one refinement pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RefineOutcome {
    pub elements_refined: usize,
    pub vertices_created: usize,
    pub elements_created: usize,
    /// For every current element, the element of the marked mesh it
    /// descends from.
    pub element_origin: Vec<usize>,
}

fn tria_corners(mesh: &Mesh, e: usize, marker: RefineMarker) -> Result<[usize; 3], MeshAdaptError> {
    mesh.check_element(e)?;
    match mesh.shape(e) {
        CellType::Triangle => {
            let s = mesh.element(e);
            Ok([s[0], s[1], s[2]])
        }
        CellType::Quadrilateral => Err(MeshAdaptError::InvalidMarker {
            element: e,
            marker: marker.to_string(),
        }),
    }
}

fn quad_corners(mesh: &Mesh, e: usize, marker: RefineMarker) -> Result<[usize; 4], MeshAdaptError> {
    mesh.check_element(e)?;
    match mesh.shape(e) {
        CellType::Quadrilateral => Ok(mesh.element(e)),
        CellType::Triangle => Err(MeshAdaptError::InvalidMarker {
            element: e,
            marker: marker.to_string(),
        }),
    }
}

fn check_edge(e: usize, edge: usize, n: usize, marker: RefineMarker) -> Result<(), MeshAdaptError> {
    if edge < n {
        Ok(())
    } else {
        Err(MeshAdaptError::InvalidMarker {
            element: e,
            marker: marker.to_string(),
        })
    }
}

/// Install `children` over `e`, relink and notify.
fn finish(
    mesh: &mut Mesh,
    e: usize,
    children: &[Slots],
    kind: OperationKind,
    vertices: &[usize],
    notifier: &mut Notifier<'_>,
) -> Result<Vec<usize>, MeshAdaptError> {
    let done = install(mesh, &[e], children)?;
    mesh.relink(&done.elements)?;
    log::trace!("{kind} on element {e} -> {:?}", done.elements);
    notifier.emit(kind, vertices, &done.elements);
    Ok(done.elements)
}

/// Bisect local edge `edge` of triangle `e`.
pub fn refine_tria2tria(
    mesh: &mut Mesh,
    e: usize,
    edge: usize,
    notifier: &mut Notifier<'_>,
) -> Result<Vec<usize>, MeshAdaptError> {
    let marker = RefineMarker::Triangle(TriaRefinement::Tria2Tria { edge });
    check_edge(e, edge, 3, marker)?;
    let v = rotate_slice(tria_corners(mesh, e, marker)?, edge);
    let m = mesh.add_vertex(v[0], v[1], notifier)?;
    let children = template::tria2tria(v, m);
    finish(
        mesh,
        e,
        &children,
        OperationKind::RefineTria2Tria,
        &[m, v[0], v[1], v[2]],
        notifier,
    )
}

/// Bisect the two edges of triangle `e` that meet at local vertex `vertex`.
///
/// The remaining quadrilateral is split along the diagonal from the
/// midpoint of the longer bisected edge; on a tie the midpoint of the edge
/// leaving `vertex` wins.
pub fn refine_tria3tria(
    mesh: &mut Mesh,
    e: usize,
    vertex: usize,
    notifier: &mut Notifier<'_>,
) -> Result<Vec<usize>, MeshAdaptError> {
    let marker = RefineMarker::Triangle(TriaRefinement::Tria3Tria { vertex });
    check_edge(e, vertex, 3, marker)?;
    let v = rotate_slice(tria_corners(mesh, e, marker)?, vertex);
    let m1 = mesh.add_vertex(v[0], v[1], notifier)?;
    let m3 = mesh.add_vertex(v[2], v[0], notifier)?;
    let diagonal = if mesh.edge_length(v[2], v[0]) > mesh.edge_length(v[0], v[1]) {
        Diagonal::B
    } else {
        Diagonal::A
    };
    let children = template::tria3tria(v, m1, m3, diagonal);
    finish(
        mesh,
        e,
        &children,
        OperationKind::RefineTria3Tria,
        &[m1, m3, v[0], v[1], v[2]],
        notifier,
    )
}

/// Regular subdivision of triangle `e`; the inner child keeps the slot.
pub fn refine_tria4tria(
    mesh: &mut Mesh,
    e: usize,
    notifier: &mut Notifier<'_>,
) -> Result<Vec<usize>, MeshAdaptError> {
    let v = tria_corners(mesh, e, RefineMarker::Triangle(TriaRefinement::Tria4Tria))?;
    let m = [
        mesh.add_vertex(v[0], v[1], notifier)?,
        mesh.add_vertex(v[1], v[2], notifier)?,
        mesh.add_vertex(v[2], v[0], notifier)?,
    ];
    let children = template::tria4tria(v, m);
    finish(
        mesh,
        e,
        &children,
        OperationKind::RefineTria4Tria,
        &[m[0], m[1], m[2], v[0], v[1], v[2]],
        notifier,
    )
}

/// Bisect the opposite edges `edge` and `edge + 2` of quadrilateral `e`.
pub fn refine_quad2quad(
    mesh: &mut Mesh,
    e: usize,
    edge: usize,
    notifier: &mut Notifier<'_>,
) -> Result<Vec<usize>, MeshAdaptError> {
    let marker = RefineMarker::Quad(QuadRefinement::Quad2Quad { edge });
    check_edge(e, edge, 2, marker)?;
    let v = rotate_slice(quad_corners(mesh, e, marker)?, edge);
    let m1 = mesh.add_vertex(v[0], v[1], notifier)?;
    let m3 = mesh.add_vertex(v[2], v[3], notifier)?;
    let children = template::quad2quad(v, m1, m3);
    finish(
        mesh,
        e,
        &children,
        OperationKind::RefineQuad2Quad,
        &[m1, m3, v[0], v[1], v[2], v[3]],
        notifier,
    )
}

/// Bisect edge `edge` of quadrilateral `e` and fan out three triangles.
pub fn refine_quad3tria(
    mesh: &mut Mesh,
    e: usize,
    edge: usize,
    notifier: &mut Notifier<'_>,
) -> Result<Vec<usize>, MeshAdaptError> {
    let marker = RefineMarker::Quad(QuadRefinement::Quad3Tria { edge });
    check_edge(e, edge, 4, marker)?;
    let v = rotate_slice(quad_corners(mesh, e, marker)?, edge);
    let m1 = mesh.add_vertex(v[0], v[1], notifier)?;
    let children = template::quad3tria(v, m1);
    finish(
        mesh,
        e,
        &children,
        OperationKind::RefineQuad3Tria,
        &[m1, v[0], v[1], v[2], v[3]],
        notifier,
    )
}

/// Bisect the adjacent edges `edge` and `edge + 1` of quadrilateral `e`.
pub fn refine_quad4tria(
    mesh: &mut Mesh,
    e: usize,
    edge: usize,
    notifier: &mut Notifier<'_>,
) -> Result<Vec<usize>, MeshAdaptError> {
    let marker = RefineMarker::Quad(QuadRefinement::Quad4Tria { edge });
    check_edge(e, edge, 4, marker)?;
    let v = rotate_slice(quad_corners(mesh, e, marker)?, edge);
    let m1 = mesh.add_vertex(v[0], v[1], notifier)?;
    let m2 = mesh.add_vertex(v[1], v[2], notifier)?;
    let children = template::quad4tria(v, m1, m2);
    finish(
        mesh,
        e,
        &children,
        OperationKind::RefineQuad4Tria,
        &[m1, m2, v[0], v[1], v[2], v[3]],
        notifier,
    )
}

/// Regular subdivision of quadrilateral `e` around its centroid.
pub fn refine_quad4quad(
    mesh: &mut Mesh,
    e: usize,
    notifier: &mut Notifier<'_>,
) -> Result<Vec<usize>, MeshAdaptError> {
    let v = quad_corners(mesh, e, RefineMarker::Quad(QuadRefinement::Quad4Quad))?;
    let m = [
        mesh.add_vertex(v[0], v[1], notifier)?,
        mesh.add_vertex(v[1], v[2], notifier)?,
        mesh.add_vertex(v[2], v[3], notifier)?,
        mesh.add_vertex(v[3], v[0], notifier)?,
    ];
    let c = mesh.add_centroid(v, notifier)?;
    let children = template::quad4quad(v, m, c);
    finish(
        mesh,
        e,
        &children,
        OperationKind::RefineQuad4Quad,
        &[m[0], m[1], m[2], m[3], c, v[0], v[1], v[2], v[3]],
        notifier,
    )
}

/// Apply the operator selected by `marker` to element `e`.
pub fn apply_refine_marker(
    mesh: &mut Mesh,
    e: usize,
    marker: RefineMarker,
    notifier: &mut Notifier<'_>,
) -> Result<Vec<usize>, MeshAdaptError> {
    match marker {
        RefineMarker::AsIs => Ok(vec![e]),
        RefineMarker::Triangle(TriaRefinement::Tria2Tria { edge }) => {
            refine_tria2tria(mesh, e, edge, notifier)
        }
        RefineMarker::Triangle(TriaRefinement::Tria3Tria { vertex }) => {
            refine_tria3tria(mesh, e, vertex, notifier)
        }
        RefineMarker::Triangle(TriaRefinement::Tria4Tria) => refine_tria4tria(mesh, e, notifier),
        RefineMarker::Quad(QuadRefinement::Quad2Quad { edge }) => {
            refine_quad2quad(mesh, e, edge, notifier)
        }
        RefineMarker::Quad(QuadRefinement::Quad3Tria { edge }) => {
            refine_quad3tria(mesh, e, edge, notifier)
        }
        RefineMarker::Quad(QuadRefinement::Quad4Tria { edge }) => {
            refine_quad4tria(mesh, e, edge, notifier)
        }
        RefineMarker::Quad(QuadRefinement::Quad4Quad) => refine_quad4quad(mesh, e, notifier),
    }
}

/// Number of elements a marker appends.
fn extra_elements(marker: RefineMarker) -> usize {
    match marker {
        RefineMarker::AsIs => 0,
        RefineMarker::Triangle(TriaRefinement::Tria2Tria { .. })
        | RefineMarker::Quad(QuadRefinement::Quad2Quad { .. }) => 1,
        RefineMarker::Triangle(TriaRefinement::Tria3Tria { .. })
        | RefineMarker::Quad(QuadRefinement::Quad3Tria { .. }) => 2,
        _ => 3,
    }
}

/// Execute the refinement markers of `marking`.
///
/// Every vertex of a refined element's children is locked so that the
/// coarsening half of the cycle leaves the new elements alone. The number of
/// created vertices must match the marking pass' prediction.
pub fn refine(
    mesh: &mut Mesh,
    marking: &RefineMarking,
    notifier: &mut Notifier<'_>,
) -> Result<RefineOutcome, MeshAdaptError> {
    let nvt0 = mesh.nvt();
    let nel0 = mesh.nel();
    if marking.markers.len() != nel0 + 1 || marking.nvt != nvt0 {
        return Err(MeshAdaptError::VertexCountMismatch {
            expected: marking.nvt,
            found: nvt0,
        });
    }
    let extra: usize = marking.markers.iter().map(|&m| extra_elements(m)).sum();
    mesh.try_reserve(marking.increase_nvt, extra, notifier)?;

    let mut outcome = RefineOutcome {
        element_origin: marking.element_origin.clone(),
        ..RefineOutcome::default()
    };
    for e in 1..=nel0 {
        let marker = marking.markers[e];
        if marker.is_as_is() {
            continue;
        }
        let children = apply_refine_marker(mesh, e, marker, notifier)?;
        outcome.elements_refined += 1;
        for &c in &children {
            mesh.lock_element(c);
            if c >= outcome.element_origin.len() {
                let origin = outcome.element_origin[e];
                outcome.element_origin.push(origin);
            }
        }
    }
    outcome.vertices_created = mesh.nvt() - nvt0;
    outcome.elements_created = mesh.nel() - nel0;
    if outcome.vertices_created != marking.increase_nvt {
        return Err(MeshAdaptError::VertexCountMismatch {
            expected: nvt0 + marking.increase_nvt,
            found: mesh.nvt(),
        });
    }
    log::debug!(
        "refined {} elements: {} new vertices, {} new elements",
        outcome.elements_refined,
        outcome.vertices_created,
        outcome.elements_created
    );
    Ok(outcome)
}
