//! Coarsening operators and their execution.
//!
//! Each operator is called with the holder of a patch (its smallest child
//! id). The patch is recognised again, the replacement elements are written
//! over the patch slots and the refinement vertices that lost their last
//! element are removed. A removed vertex is only dropped once nothing
//! references it, so a midpoint shared by two coarsened patches goes away
//! with the second one.

use crate::adapt::install::{Installed, install};
use crate::adapt::marker::{CoarsenMarker, Side};
use crate::adapt::observer::Notifier;
use crate::mesh_error::MeshAdaptError;
use crate::topology::mesh::Mesh;
use crate::topology::patch::{Patch, PatchKind, find_patch};
use crate::topology::state::{oldest_first_rotation, rotate_slice};
use crate::topology::template::{self, Slots};

/// What one coarsening operator did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Coarsened {
    pub installed: Installed,
    pub vertices_removed: usize,
}

/// Summary of one coarsening pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoarsenOutcome {
    pub patches_coarsened: usize,
    pub vertices_removed: usize,
    pub elements_removed: usize,
}

fn patch_for(mesh: &Mesh, e: usize, marker: CoarsenMarker) -> Result<Patch, MeshAdaptError> {
    mesh.check_element(e)?;
    let patch = find_patch(mesh, e).ok_or(MeshAdaptError::IncompletePatch(e))?;
    let expected = match marker {
        CoarsenMarker::AsIs => None,
        CoarsenMarker::Coarsen2Tria1Tria => Some(PatchKind::GreenTria2),
        CoarsenMarker::Coarsen3Tria1Tria => match patch.kind {
            PatchKind::GreenTria3(d) => Some(PatchKind::GreenTria3(d)),
            _ => None,
        },
        CoarsenMarker::Coarsen4Tria1Tria | CoarsenMarker::Coarsen4Tria2Tria { .. } => {
            Some(PatchKind::RedTria)
        }
        CoarsenMarker::Coarsen4Quad1Quad
        | CoarsenMarker::Coarsen4Quad2Quad { .. }
        | CoarsenMarker::Coarsen4Quad3Tria { .. }
        | CoarsenMarker::Coarsen4Quad4Tria { .. } => Some(PatchKind::RedQuad),
        CoarsenMarker::Coarsen2Quad1Quad | CoarsenMarker::Coarsen2Quad3Tria { .. } => {
            Some(PatchKind::GreenQuad2)
        }
        CoarsenMarker::Coarsen3Tria1Quad => Some(PatchKind::GreenQuad3Tria),
        CoarsenMarker::Coarsen4Tria1Quad | CoarsenMarker::Coarsen4Tria3Tria(_) => {
            Some(PatchKind::GreenQuad4Tria)
        }
    };
    if expected == Some(patch.kind) && patch.holder() == e {
        Ok(patch)
    } else {
        Err(MeshAdaptError::InvalidMarker {
            element: e,
            marker: format!("{marker} on {:?} patch", patch.kind),
        })
    }
}

/// The macro element, oldest corner first when that corner is unique.
fn macro_element(mesh: &Mesh, corners: &[usize]) -> Slots {
    let ages: Vec<u32> = corners.iter().map(|&v| mesh.age(v)).collect();
    let k = oldest_first_rotation(&ages).unwrap_or(0);
    let mut slots = [0; 4];
    for (i, slot) in slots.iter_mut().take(corners.len()).enumerate() {
        *slot = corners[(i + k) % corners.len()];
    }
    slots
}

fn midpoint_of(patch: &Patch, edge: usize) -> Result<usize, MeshAdaptError> {
    patch
        .bisected_edges()
        .iter()
        .position(|&i| i == edge)
        .map(|p| patch.refinement_vertices[p])
        .ok_or(MeshAdaptError::IncompletePatch(patch.holder()))
}

fn check_keep(e: usize, keep: usize, allowed: &[usize], marker: CoarsenMarker) -> Result<(), MeshAdaptError> {
    if allowed.contains(&keep) {
        Ok(())
    } else {
        Err(MeshAdaptError::InvalidMarker {
            element: e,
            marker: marker.to_string(),
        })
    }
}

/// Replacement elements for `patch` under `marker`, plus the refinement
/// vertices they keep.
fn replacement(
    mesh: &Mesh,
    e: usize,
    patch: &Patch,
    marker: CoarsenMarker,
) -> Result<(Vec<Slots>, Vec<usize>), MeshAdaptError> {
    let incomplete = || MeshAdaptError::IncompletePatch(e);
    Ok(match marker {
        CoarsenMarker::AsIs => (Vec::new(), patch.refinement_vertices.clone()),
        CoarsenMarker::Coarsen2Tria1Tria
        | CoarsenMarker::Coarsen3Tria1Tria
        | CoarsenMarker::Coarsen4Tria1Tria
        | CoarsenMarker::Coarsen4Quad1Quad
        | CoarsenMarker::Coarsen2Quad1Quad
        | CoarsenMarker::Coarsen3Tria1Quad
        | CoarsenMarker::Coarsen4Tria1Quad => (vec![macro_element(mesh, &patch.corners)], Vec::new()),
        CoarsenMarker::Coarsen4Tria2Tria { keep } => {
            check_keep(e, keep, &[0, 1, 2], marker)?;
            let v = rotate_slice(patch.tria_corners().ok_or_else(incomplete)?, keep);
            let m = midpoint_of(patch, keep)?;
            (template::tria2tria(v, m).to_vec(), vec![m])
        }
        CoarsenMarker::Coarsen4Quad3Tria { keep } => {
            check_keep(e, keep, &[0, 1, 2, 3], marker)?;
            let v = rotate_slice(patch.quad_corners().ok_or_else(incomplete)?, keep);
            let m = midpoint_of(patch, keep)?;
            (template::quad3tria(v, m).to_vec(), vec![m])
        }
        CoarsenMarker::Coarsen4Quad2Quad { keep } => {
            check_keep(e, keep, &[0, 1], marker)?;
            let v = rotate_slice(patch.quad_corners().ok_or_else(incomplete)?, keep);
            let (m1, m3) = (midpoint_of(patch, keep)?, midpoint_of(patch, keep + 2)?);
            (template::quad2quad(v, m1, m3).to_vec(), vec![m1, m3])
        }
        CoarsenMarker::Coarsen4Quad4Tria { keep } => {
            check_keep(e, keep, &[0, 1, 2, 3], marker)?;
            let v = rotate_slice(patch.quad_corners().ok_or_else(incomplete)?, keep);
            let (m1, m2) = (midpoint_of(patch, keep)?, midpoint_of(patch, (keep + 1) % 4)?);
            (template::quad4tria(v, m1, m2).to_vec(), vec![m1, m2])
        }
        CoarsenMarker::Coarsen2Quad3Tria { keep } => {
            check_keep(e, keep, &[0, 2], marker)?;
            let v = rotate_slice(patch.quad_corners().ok_or_else(incomplete)?, keep);
            let m = midpoint_of(patch, keep)?;
            (template::quad3tria(v, m).to_vec(), vec![m])
        }
        CoarsenMarker::Coarsen4Tria3Tria(side) => {
            let corners = patch.quad_corners().ok_or_else(incomplete)?;
            let edge = match side {
                Side::Left => 0,
                Side::Right => 1,
            };
            let m = midpoint_of(patch, edge)?;
            (template::quad3tria(rotate_slice(corners, edge), m).to_vec(), vec![m])
        }
    })
}

/// Apply `marker` to the patch held by `e`.
pub fn apply_coarsen_marker(
    mesh: &mut Mesh,
    e: usize,
    marker: CoarsenMarker,
    notifier: &mut Notifier<'_>,
) -> Result<Coarsened, MeshAdaptError> {
    let Some(kind) = marker.operation() else {
        return Ok(Coarsened::default());
    };
    let patch = patch_for(mesh, e, marker)?;
    let (children, kept) = replacement(mesh, e, &patch, marker)?;
    let installed = install(mesh, &patch.elements, &children)?;
    mesh.relink(&installed.elements)?;
    log::trace!("{kind} on {:?} -> {:?}", patch.elements, installed.elements);
    notifier.emit(kind, &patch.corners, &installed.elements);

    let mut freed: Vec<usize> = patch
        .refinement_vertices
        .iter()
        .copied()
        .filter(|v| !kept.contains(v))
        .collect();
    freed.sort_unstable_by(|a, b| b.cmp(a));
    let mut vertices_removed = 0;
    for v in freed {
        if mesh.elements_at_vertex(v).is_empty() {
            mesh.remove_vertex(v, notifier)?;
            vertices_removed += 1;
        } else {
            log::trace!("vertex {v} is still referenced; removal deferred");
        }
    }
    Ok(Coarsened {
        installed,
        vertices_removed,
    })
}

macro_rules! coarsen_op {
    ($(#[$doc:meta])* $name:ident, $marker:expr) => {
        $(#[$doc])*
        pub fn $name(
            mesh: &mut Mesh,
            e: usize,
            notifier: &mut Notifier<'_>,
        ) -> Result<Coarsened, MeshAdaptError> {
            apply_coarsen_marker(mesh, e, $marker, notifier)
        }
    };
    ($(#[$doc:meta])* $name:ident, $arg:ident: $ty:ty, $marker:expr) => {
        $(#[$doc])*
        pub fn $name(
            mesh: &mut Mesh,
            e: usize,
            $arg: $ty,
            notifier: &mut Notifier<'_>,
        ) -> Result<Coarsened, MeshAdaptError> {
            apply_coarsen_marker(mesh, e, $marker, notifier)
        }
    };
}

coarsen_op!(
    /// Two `Tria2Tria` children → their macro triangle.
    coarsen_2tria1tria,
    CoarsenMarker::Coarsen2Tria1Tria
);
coarsen_op!(
    /// Three `Tria3Tria` children → their macro triangle.
    coarsen_3tria1tria,
    CoarsenMarker::Coarsen3Tria1Tria
);
coarsen_op!(
    /// Four red triangles → their macro triangle.
    coarsen_4tria1tria,
    CoarsenMarker::Coarsen4Tria1Tria
);
coarsen_op!(
    /// Four red triangles → `Tria2Tria` keeping the midpoint of `keep`.
    coarsen_4tria2tria,
    keep: usize,
    CoarsenMarker::Coarsen4Tria2Tria { keep }
);
coarsen_op!(
    /// Four red quadrilaterals → their macro quadrilateral.
    coarsen_4quad1quad,
    CoarsenMarker::Coarsen4Quad1Quad
);
coarsen_op!(
    /// Four red quadrilaterals → `Quad2Quad` along `keep` and `keep + 2`.
    coarsen_4quad2quad,
    keep: usize,
    CoarsenMarker::Coarsen4Quad2Quad { keep }
);
coarsen_op!(
    /// Four red quadrilaterals → `Quad3Tria` keeping the midpoint of `keep`.
    coarsen_4quad3tria,
    keep: usize,
    CoarsenMarker::Coarsen4Quad3Tria { keep }
);
coarsen_op!(
    /// Four red quadrilaterals → `Quad4Tria` on `keep` and `keep + 1`.
    coarsen_4quad4tria,
    keep: usize,
    CoarsenMarker::Coarsen4Quad4Tria { keep }
);
coarsen_op!(
    /// Two `Quad2Quad` halves → their macro quadrilateral.
    coarsen_2quad1quad,
    CoarsenMarker::Coarsen2Quad1Quad
);
coarsen_op!(
    /// Two `Quad2Quad` halves → `Quad3Tria` keeping macro edge `keep` (0 or 2).
    coarsen_2quad3tria,
    keep: usize,
    CoarsenMarker::Coarsen2Quad3Tria { keep }
);
coarsen_op!(
    /// Three `Quad3Tria` triangles → their macro quadrilateral.
    coarsen_3tria1quad,
    CoarsenMarker::Coarsen3Tria1Quad
);
coarsen_op!(
    /// Four `Quad4Tria` triangles → their macro quadrilateral.
    coarsen_4tria1quad,
    CoarsenMarker::Coarsen4Tria1Quad
);
coarsen_op!(
    /// Four `Quad4Tria` triangles → `Quad3Tria` keeping one midpoint.
    coarsen_4tria3tria,
    side: Side,
    CoarsenMarker::Coarsen4Tria3Tria(side)
);

/// Execute `markers` (one per element, index 0 unused) from the last
/// element down, so holders below the current one keep their ids.
pub fn coarsen(
    mesh: &mut Mesh,
    markers: &[CoarsenMarker],
    notifier: &mut Notifier<'_>,
) -> Result<CoarsenOutcome, MeshAdaptError> {
    let (nvt0, nel0) = (mesh.nvt(), mesh.nel());
    if markers.len() != nel0 + 1 {
        return Err(MeshAdaptError::InvalidMarker {
            element: 0,
            marker: format!("{} markers for {nel0} elements", markers.len().saturating_sub(1)),
        });
    }
    let mut markers = markers.to_vec();
    let mut outcome = CoarsenOutcome::default();
    for e in (1..=nel0).rev() {
        let marker = markers.get(e).copied().unwrap_or_default();
        if marker.is_as_is() {
            continue;
        }
        markers[e] = CoarsenMarker::AsIs;
        let done = apply_coarsen_marker(mesh, e, marker, notifier)?;
        markers.extend(std::iter::repeat_n(CoarsenMarker::AsIs, done.installed.appended));
        for &slot in &done.installed.removed {
            markers.swap_remove(slot);
        }
        outcome.patches_coarsened += 1;
    }
    outcome.vertices_removed = nvt0 - mesh.nvt();
    outcome.elements_removed = nel0.saturating_sub(mesh.nel());
    log::debug!(
        "coarsened {} patches: {} vertices and {} elements removed",
        outcome.patches_coarsened,
        outcome.vertices_removed,
        outcome.elements_removed
    );
    Ok(outcome)
}
