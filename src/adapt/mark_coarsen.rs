//! Marking for coarsening.
//!
//! A refinement vertex may disappear only when it is free (not locked).
//! Locks come from three sources: vertices of elements refined in this
//! cycle, vertices of elements whose indicator asks to keep them, and the
//! closure rules below. Once the locks are stable, every patch whose
//! pattern of free refinement vertices matches a coarsening template gets
//! that template's marker on its holder.

use crate::adapt::AdaptOptions;
use crate::adapt::marker::{CoarsenMarker, Side};
use crate::mesh_error::MeshAdaptError;
use crate::topology::mesh::Mesh;
use crate::topology::patch::{Patch, PatchKind, find_patch};

/// Result of [`mark_coarsening`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoarsenMarking {
    /// One marker per element, index 0 unused. Only patch holders carry a
    /// marker other than `AsIs`.
    pub markers: Vec<CoarsenMarker>,
    /// Number of sweeps the lock closure needed.
    pub sweeps: usize,
}

impl CoarsenMarking {
    pub fn num_marked(&self) -> usize {
        self.markers.iter().filter(|m| !m.is_as_is()).count()
    }
}

/// Coarsening template for `patch` given the current locks.
///
/// `Some(AsIs)` when every refinement vertex is locked, `None` when the
/// free vertices match no template.
pub fn select_coarsening(mesh: &Mesh, patch: &Patch) -> Option<CoarsenMarker> {
    let free: Vec<bool> = patch
        .refinement_vertices
        .iter()
        .map(|&v| !mesh.is_locked(v))
        .collect();
    let num_free = free.iter().filter(|&&f| f).count();
    if num_free == 0 {
        return Some(CoarsenMarker::AsIs);
    }
    let all_free = num_free == free.len();
    match patch.kind {
        PatchKind::RedTria => match num_free {
            3 => Some(CoarsenMarker::Coarsen4Tria1Tria),
            2 => free
                .iter()
                .position(|&f| !f)
                .map(|keep| CoarsenMarker::Coarsen4Tria2Tria { keep }),
            _ => None,
        },
        PatchKind::GreenTria2 => Some(CoarsenMarker::Coarsen2Tria1Tria),
        PatchKind::GreenTria3(_) => all_free.then_some(CoarsenMarker::Coarsen3Tria1Tria),
        PatchKind::RedQuad => {
            let centroid_free = free[4];
            let locked: Vec<usize> = (0..4).filter(|&i| !free[i]).collect();
            match (centroid_free, locked.as_slice()) {
                (false, _) => None,
                (true, []) => Some(CoarsenMarker::Coarsen4Quad1Quad),
                (true, [k]) => Some(CoarsenMarker::Coarsen4Quad3Tria { keep: *k }),
                (true, [a, b]) if b - a == 2 => Some(CoarsenMarker::Coarsen4Quad2Quad { keep: *a }),
                (true, [0, 3]) => Some(CoarsenMarker::Coarsen4Quad4Tria { keep: 3 }),
                (true, [a, b]) if b - a == 1 => Some(CoarsenMarker::Coarsen4Quad4Tria { keep: *a }),
                _ => None,
            }
        }
        PatchKind::GreenQuad2 => match (free[0], free[1]) {
            (true, true) => Some(CoarsenMarker::Coarsen2Quad1Quad),
            (false, true) => Some(CoarsenMarker::Coarsen2Quad3Tria { keep: 0 }),
            (true, false) => Some(CoarsenMarker::Coarsen2Quad3Tria { keep: 2 }),
            (false, false) => Some(CoarsenMarker::AsIs),
        },
        PatchKind::GreenQuad3Tria => Some(CoarsenMarker::Coarsen3Tria1Quad),
        PatchKind::GreenQuad4Tria => match (free[0], free[1]) {
            (true, true) => Some(CoarsenMarker::Coarsen4Tria1Quad),
            (false, true) => Some(CoarsenMarker::Coarsen4Tria3Tria(Side::Left)),
            (true, false) => Some(CoarsenMarker::Coarsen4Tria3Tria(Side::Right)),
            (false, false) => Some(CoarsenMarker::AsIs),
        },
    }
}

/// Lock the vertices that must survive, independent of patches.
fn lock_from_indicator(mesh: &mut Mesh, indicator: &[f64], options: &AdaptOptions) {
    for e in 1..=mesh.nel() {
        let n = mesh.shape(e).num_vertices();
        let (nb, mid) = (mesh.neighbours(e), mesh.mid_neighbours(e));
        for i in 0..n {
            if nb[i] != mid[i] {
                let (a, b) = mesh.edge(e, i);
                // hanging node on a coarse edge
                if let Some(m) = mesh.find_midpoint(a, b) {
                    mesh.lock_vertex(m);
                }
            }
        }
        let value = indicator[e - 1];
        if value.is_nan() {
            log::warn!("indicator of element {e} is NaN; keeping it");
            mesh.lock_element(e);
        } else if value >= options.coarsen_tolerance {
            mesh.lock_element(e);
        } else {
            // only the vertices the element's own refinement introduced may go
            let removable = find_patch(mesh, e)
                .map(|p| p.refinement_vertices)
                .unwrap_or_default();
            let slots = mesh.element(e);
            for &v in slots[..n].iter().filter(|v| !removable.contains(v)) {
                mesh.lock_vertex(v);
            }
        }
    }
}

/// Select coarsening markers from one indicator value per element.
///
/// Vertices locked before the call (for example by refinement in the same
/// cycle) stay locked.
pub fn mark_coarsening(
    mesh: &mut Mesh,
    indicator: &[f64],
    options: &AdaptOptions,
) -> Result<CoarsenMarking, MeshAdaptError> {
    let nel = mesh.nel();
    if indicator.len() != nel {
        return Err(MeshAdaptError::IndicatorLengthMismatch {
            expected: nel,
            found: indicator.len(),
        });
    }
    lock_from_indicator(mesh, indicator, options);

    let mut sweeps = 0;
    loop {
        sweeps += 1;
        let mut changed = false;
        for e in 1..=nel {
            match find_patch(mesh, e) {
                None => changed |= mesh.lock_element(e),
                Some(patch) => {
                    if select_coarsening(mesh, &patch).is_none() {
                        for &v in &patch.refinement_vertices {
                            changed |= mesh.lock_vertex(v);
                        }
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }

    let mut markers = vec![CoarsenMarker::AsIs; nel + 1];
    for e in 1..=nel {
        let Some(patch) = find_patch(mesh, e) else {
            continue;
        };
        if patch.holder() != e {
            continue;
        }
        let marker = select_coarsening(mesh, &patch).ok_or_else(|| MeshAdaptError::InvalidState {
            element: e,
            state: format!("{:?} patch with unresolved locks", patch.kind),
        })?;
        markers[e] = marker;
    }
    let marking = CoarsenMarking { markers, sweeps };
    log::debug!(
        "marked {} patches for coarsening after {} sweeps ({} locked vertices)",
        marking.num_marked(),
        marking.sweeps,
        mesh.num_locked()
    );
    Ok(marking)
}
