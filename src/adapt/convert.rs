//! Green-to-red conversion.
//!
//! A green patch cannot take another partial refinement without producing
//! a blue element. Instead its macro element is rebuilt and regularly
//! subdivided in one step: the missing midpoints (and the centroid of a
//! quadrilateral) are added and the red children replace the green ones.

use crate::adapt::install::install;
use crate::adapt::observer::{Notifier, OperationKind};
use crate::mesh_error::MeshAdaptError;
use crate::topology::mesh::Mesh;
use crate::topology::patch::{Patch, PatchKind, find_patch};
use crate::topology::template::{self, Slots};

fn patch_of(mesh: &Mesh, e: usize, expected: fn(PatchKind) -> bool) -> Result<Patch, MeshAdaptError> {
    mesh.check_element(e)?;
    let patch = find_patch(mesh, e).ok_or(MeshAdaptError::IncompletePatch(e))?;
    if expected(patch.kind) {
        Ok(patch)
    } else {
        Err(MeshAdaptError::InvalidState {
            element: e,
            state: format!("{:?} patch", patch.kind),
        })
    }
}

fn finish(
    mesh: &mut Mesh,
    patch: &Patch,
    children: &[Slots],
    kind: OperationKind,
    new_vertices: &[usize],
    notifier: &mut Notifier<'_>,
) -> Result<Vec<usize>, MeshAdaptError> {
    let done = install(mesh, &patch.elements, children)?;
    mesh.relink(&done.elements)?;
    let vertices: Vec<usize> = new_vertices
        .iter()
        .chain(patch.refinement_vertices.iter())
        .chain(patch.corners.iter())
        .copied()
        .collect();
    log::trace!("{kind} on {:?} -> {:?}", patch.elements, done.elements);
    notifier.emit(kind, &vertices, &done.elements);
    Ok(done.elements)
}

/// Two `Tria2Tria` children → four red triangles.
pub fn convert_tria2tria(
    mesh: &mut Mesh,
    e: usize,
    notifier: &mut Notifier<'_>,
) -> Result<Vec<usize>, MeshAdaptError> {
    let patch = patch_of(mesh, e, |k| k == PatchKind::GreenTria2)?;
    let v = patch.tria_corners().ok_or(MeshAdaptError::IncompletePatch(e))?;
    let m1 = patch.refinement_vertices[0];
    let m2 = mesh.add_vertex(v[1], v[2], notifier)?;
    let m3 = mesh.add_vertex(v[2], v[0], notifier)?;
    let children = template::tria4tria(v, [m1, m2, m3]);
    finish(mesh, &patch, &children, OperationKind::ConvertTria2Tria, &[m2, m3], notifier)
}

/// Three `Tria3Tria` children → four red triangles.
pub fn convert_tria3tria(
    mesh: &mut Mesh,
    e: usize,
    notifier: &mut Notifier<'_>,
) -> Result<Vec<usize>, MeshAdaptError> {
    let patch = patch_of(mesh, e, |k| matches!(k, PatchKind::GreenTria3(_)))?;
    let v = patch.tria_corners().ok_or(MeshAdaptError::IncompletePatch(e))?;
    let (m1, m3) = (patch.refinement_vertices[0], patch.refinement_vertices[1]);
    let m2 = mesh.add_vertex(v[1], v[2], notifier)?;
    let children = template::tria4tria(v, [m1, m2, m3]);
    finish(mesh, &patch, &children, OperationKind::ConvertTria3Tria, &[m2], notifier)
}

/// Two `Quad2Quad` halves → four red quadrilaterals.
pub fn convert_quad2quad(
    mesh: &mut Mesh,
    e: usize,
    notifier: &mut Notifier<'_>,
) -> Result<Vec<usize>, MeshAdaptError> {
    let patch = patch_of(mesh, e, |k| k == PatchKind::GreenQuad2)?;
    let v = patch.quad_corners().ok_or(MeshAdaptError::IncompletePatch(e))?;
    let (m1, m3) = (patch.refinement_vertices[0], patch.refinement_vertices[1]);
    let m2 = mesh.add_vertex(v[1], v[2], notifier)?;
    let m4 = mesh.add_vertex(v[3], v[0], notifier)?;
    let c = mesh.add_centroid(v, notifier)?;
    let children = template::quad4quad(v, [m1, m2, m3, m4], c);
    finish(
        mesh,
        &patch,
        &children,
        OperationKind::ConvertQuad2Quad,
        &[m2, m4, c],
        notifier,
    )
}

/// Three `Quad3Tria` triangles → four red quadrilaterals.
pub fn convert_quad3tria(
    mesh: &mut Mesh,
    e: usize,
    notifier: &mut Notifier<'_>,
) -> Result<Vec<usize>, MeshAdaptError> {
    let patch = patch_of(mesh, e, |k| k == PatchKind::GreenQuad3Tria)?;
    let v = patch.quad_corners().ok_or(MeshAdaptError::IncompletePatch(e))?;
    let m1 = patch.refinement_vertices[0];
    let m2 = mesh.add_vertex(v[1], v[2], notifier)?;
    let m3 = mesh.add_vertex(v[2], v[3], notifier)?;
    let m4 = mesh.add_vertex(v[3], v[0], notifier)?;
    let c = mesh.add_centroid(v, notifier)?;
    let children = template::quad4quad(v, [m1, m2, m3, m4], c);
    finish(
        mesh,
        &patch,
        &children,
        OperationKind::ConvertQuad3Tria,
        &[m2, m3, m4, c],
        notifier,
    )
}

/// Four `Quad4Tria` triangles → four red quadrilaterals.
pub fn convert_quad4tria(
    mesh: &mut Mesh,
    e: usize,
    notifier: &mut Notifier<'_>,
) -> Result<Vec<usize>, MeshAdaptError> {
    let patch = patch_of(mesh, e, |k| k == PatchKind::GreenQuad4Tria)?;
    let v = patch.quad_corners().ok_or(MeshAdaptError::IncompletePatch(e))?;
    let (m1, m2) = (patch.refinement_vertices[0], patch.refinement_vertices[1]);
    let m3 = mesh.add_vertex(v[2], v[3], notifier)?;
    let m4 = mesh.add_vertex(v[3], v[0], notifier)?;
    let c = mesh.add_centroid(v, notifier)?;
    let children = template::quad4quad(v, [m1, m2, m3, m4], c);
    finish(
        mesh,
        &patch,
        &children,
        OperationKind::ConvertQuad4Tria,
        &[m3, m4, c],
        notifier,
    )
}

/// Convert the green patch `patch` with the matching operator.
pub fn convert_patch(
    mesh: &mut Mesh,
    patch: &Patch,
    notifier: &mut Notifier<'_>,
) -> Result<Vec<usize>, MeshAdaptError> {
    let e = patch.holder();
    match patch.kind {
        PatchKind::GreenTria2 => convert_tria2tria(mesh, e, notifier),
        PatchKind::GreenTria3(_) => convert_tria3tria(mesh, e, notifier),
        PatchKind::GreenQuad2 => convert_quad2quad(mesh, e, notifier),
        PatchKind::GreenQuad3Tria => convert_quad3tria(mesh, e, notifier),
        PatchKind::GreenQuad4Tria => convert_quad4tria(mesh, e, notifier),
        PatchKind::RedTria | PatchKind::RedQuad => Err(MeshAdaptError::InvalidState {
            element: e,
            state: format!("{:?} patch cannot be converted", patch.kind),
        }),
    }
}

/// Local macro edges a conversion of `kind` bisects for the first time.
pub fn newly_bisected_edges(kind: PatchKind) -> &'static [usize] {
    match kind {
        PatchKind::GreenTria2 => &[1, 2],
        PatchKind::GreenTria3(_) => &[1],
        PatchKind::GreenQuad2 => &[1, 3],
        PatchKind::GreenQuad3Tria => &[1, 2, 3],
        PatchKind::GreenQuad4Tria => &[2, 3],
        PatchKind::RedTria | PatchKind::RedQuad => &[],
    }
}
