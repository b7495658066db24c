//! Recognition of refinement patches.
//!
//! A patch is the set of sibling elements produced by one template applied
//! to one macro element. The classifier in [`state`](super::state) tells
//! which role an element may play; this module consults the neighbours to
//! guess the macro corners and then confirms the guess by rebuilding the
//! template: every refinement vertex must sit exactly at its macro edge
//! midpoint (or the centroid) and be one generation younger than the
//! vertices it splits, and every child must exist with exactly the
//! template's vertex order.

use crate::mesh_error::MeshAdaptError;
use crate::topology::cell_type::CellType;
use crate::topology::mesh::Mesh;
use crate::topology::state::{
    QuadState, TriaClass, TriaState, classify_quad_state, classify_triangle_state,
};
use crate::topology::template::{self, Diagonal, Slots};

/// Template that produced a patch.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PatchKind {
    /// `Tria4Tria`: inner, corner 1, corner 2, corner 3.
    RedTria,
    /// `Tria2Tria` on macro edge 1: left, right.
    GreenTria2,
    /// `Tria3Tria` on macro edges 1 and 3: corner, inner, outer.
    GreenTria3(Diagonal),
    /// `Quad4Quad`: child `i` at corner `i`.
    RedQuad,
    /// `Quad2Quad` on macro edges 1 and 3.
    GreenQuad2,
    /// `Quad3Tria` on macro edge 1: left, right, inner.
    GreenQuad3Tria,
    /// `Quad4Tria` on macro edges 1 and 2: left, corner, right, centre.
    GreenQuad4Tria,
}

impl PatchKind {
    pub fn is_red(self) -> bool {
        matches!(self, PatchKind::RedTria | PatchKind::RedQuad)
    }

    /// Shape of the macro element.
    pub fn macro_shape(self) -> CellType {
        match self {
            PatchKind::RedTria | PatchKind::GreenTria2 | PatchKind::GreenTria3(_) => {
                CellType::Triangle
            }
            _ => CellType::Quadrilateral,
        }
    }
}

/// A recognised patch in its template frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patch {
    pub kind: PatchKind,
    /// Children in template order.
    pub elements: Vec<usize>,
    /// Macro corners in template order.
    pub corners: Vec<usize>,
    /// Midpoints of the bisected macro edges in edge order, then the
    /// centroid of a red quadrilateral.
    pub refinement_vertices: Vec<usize>,
}

impl Patch {
    /// The child with the smallest id; it survives coarsening.
    pub fn holder(&self) -> usize {
        self.elements.iter().copied().min().unwrap_or(0)
    }

    pub fn tria_corners(&self) -> Option<[usize; 3]> {
        self.corners.as_slice().try_into().ok()
    }

    pub fn quad_corners(&self) -> Option<[usize; 4]> {
        self.corners.as_slice().try_into().ok()
    }

    /// Local macro edges that carry the refinement vertices.
    pub fn bisected_edges(&self) -> &'static [usize] {
        match self.kind {
            PatchKind::RedTria => &[0, 1, 2],
            PatchKind::GreenTria2 | PatchKind::GreenQuad3Tria => &[0],
            PatchKind::GreenTria3(_) => &[0, 2],
            PatchKind::RedQuad => &[0, 1, 2, 3],
            PatchKind::GreenQuad2 => &[0, 2],
            PatchKind::GreenQuad4Tria => &[0, 1],
        }
    }
}

/// Whether an element may be refined by a template (red) or is a green
/// child that has to be converted or coarsened as a whole.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Role {
    Red,
    Green(Patch),
}

/// Whether `v` is one level younger than the youngest of `parents`.
fn is_child_vertex(mesh: &Mesh, v: usize, parents: &[usize]) -> bool {
    let youngest_parent = parents.iter().map(|&p| mesh.age(p)).max().unwrap_or(0);
    mesh.age(v) == youngest_parent + 1
}

/// Midpoints of the given macro edges. A vertex that merely sits at the
/// midpoint but was not created by bisecting that edge does not count.
fn midpoints<const N: usize>(mesh: &Mesh, v: &[usize; N], edges: &[usize]) -> Option<Vec<usize>> {
    edges
        .iter()
        .map(|&i| {
            let (a, b) = (v[i], v[(i + 1) % N]);
            mesh.find_midpoint(a, b)
                .filter(|&m| is_child_vertex(mesh, m, &[a, b]))
        })
        .collect()
}

/// Rebuild the template `kind` on `corners` and look up its children.
pub fn rebuild(mesh: &Mesh, kind: PatchKind, corners: &[usize]) -> Option<Patch> {
    if corners.iter().any(|&v| v == 0 || v > mesh.nvt()) {
        return None;
    }
    let (children, refinement_vertices): (Vec<Slots>, Vec<usize>) = match kind {
        PatchKind::RedTria | PatchKind::GreenTria2 | PatchKind::GreenTria3(_) => {
            let v: [usize; 3] = corners.try_into().ok()?;
            match kind {
                PatchKind::RedTria => {
                    let m = midpoints(mesh, &v, &[0, 1, 2])?;
                    (template::tria4tria(v, [m[0], m[1], m[2]]).to_vec(), m)
                }
                PatchKind::GreenTria2 => {
                    let m = midpoints(mesh, &v, &[0])?;
                    (template::tria2tria(v, m[0]).to_vec(), m)
                }
                PatchKind::GreenTria3(diagonal) => {
                    let m = midpoints(mesh, &v, &[0, 2])?;
                    (template::tria3tria(v, m[0], m[1], diagonal).to_vec(), m)
                }
                _ => return None,
            }
        }
        _ => {
            let v: [usize; 4] = corners.try_into().ok()?;
            match kind {
                PatchKind::RedQuad => {
                    let mut m = midpoints(mesh, &v, &[0, 1, 2, 3])?;
                    let c = mesh
                        .find_centroid(&v)
                        .filter(|&c| is_child_vertex(mesh, c, &v))?;
                    let children = template::quad4quad(v, [m[0], m[1], m[2], m[3]], c).to_vec();
                    m.push(c);
                    (children, m)
                }
                PatchKind::GreenQuad2 => {
                    let m = midpoints(mesh, &v, &[0, 2])?;
                    (template::quad2quad(v, m[0], m[1]).to_vec(), m)
                }
                PatchKind::GreenQuad3Tria => {
                    let m = midpoints(mesh, &v, &[0])?;
                    (template::quad3tria(v, m[0]).to_vec(), m)
                }
                PatchKind::GreenQuad4Tria => {
                    let m = midpoints(mesh, &v, &[0, 1])?;
                    (template::quad4tria(v, m[0], m[1]).to_vec(), m)
                }
                _ => return None,
            }
        }
    };
    let elements = children
        .iter()
        .map(|child| mesh.find_element(child))
        .collect::<Option<Vec<_>>>()?;
    Some(Patch {
        kind,
        elements,
        corners: corners.to_vec(),
        refinement_vertices,
    })
}

fn slots(mesh: &Mesh, e: usize) -> Option<Slots> {
    (e != 0 && e <= mesh.nel()).then(|| mesh.element(e))
}

fn nb(mesh: &Mesh, e: usize, i: usize) -> usize {
    if e == 0 || e > mesh.nel() { 0 } else { mesh.neighbour(e, i) }
}

/// Corners of a `Tria4Tria` patch seen from its inner child.
fn red_tria_from_inner(mesh: &Mesh, inner: usize) -> Option<Patch> {
    let v1 = slots(mesh, nb(mesh, inner, 2))?[0];
    let v2 = slots(mesh, nb(mesh, inner, 0))?[0];
    let v3 = slots(mesh, nb(mesh, inner, 1))?[0];
    rebuild(mesh, PatchKind::RedTria, &[v1, v2, v3])
}

fn green_tria2_from_left(mesh: &Mesh, left: usize) -> Option<Patch> {
    let l = slots(mesh, left)?;
    let r = slots(mesh, nb(mesh, left, 1))?;
    rebuild(mesh, PatchKind::GreenTria2, &[l[0], r[1], l[2]])
}

fn green_tria3_from_corner(mesh: &Mesh, corner: usize) -> Option<Patch> {
    let k = slots(mesh, corner)?;
    let inner = nb(mesh, corner, 1);
    let x = slots(mesh, inner)?;
    let diag_a = slots(mesh, nb(mesh, inner, 1)).and_then(|r| {
        rebuild(mesh, PatchKind::GreenTria3(Diagonal::A), &[k[0], r[1], x[2]])
    });
    diag_a.or_else(|| {
        let l = slots(mesh, nb(mesh, inner, 2))?;
        rebuild(mesh, PatchKind::GreenTria3(Diagonal::B), &[k[0], x[2], l[0]])
    })
}

fn green_quad3_from_inner(mesh: &Mesh, inner: usize) -> Option<Patch> {
    let i = slots(mesh, inner)?;
    let l = slots(mesh, nb(mesh, inner, 1))?;
    let r = slots(mesh, nb(mesh, inner, 2))?;
    rebuild(mesh, PatchKind::GreenQuad3Tria, &[l[0], r[1], i[0], i[1]])
}

fn green_quad4_from_centre(mesh: &Mesh, centre: usize) -> Option<Patch> {
    let c = slots(mesh, centre)?;
    let corner = slots(mesh, nb(mesh, centre, 0))?;
    let right = slots(mesh, nb(mesh, centre, 1))?;
    let left = slots(mesh, nb(mesh, centre, 2))?;
    rebuild(
        mesh,
        PatchKind::GreenQuad4Tria,
        &[left[0], corner[1], right[1], c[2]],
    )
}

fn red_quad_from_child(mesh: &Mesh, child: usize) -> Option<Patch> {
    let mut corners = Vec::with_capacity(4);
    let mut q = child;
    for _ in 0..4 {
        corners.push(slots(mesh, q)?[0]);
        q = nb(mesh, q, 1);
    }
    rebuild(mesh, PatchKind::RedQuad, &corners)
}

fn green_quad2_from(mesh: &Mesh, e: usize) -> Option<Patch> {
    let s = slots(mesh, e)?;
    let as_first = slots(mesh, nb(mesh, e, 1))
        .and_then(|b| rebuild(mesh, PatchKind::GreenQuad2, &[s[0], b[1], b[2], s[3]]));
    as_first.or_else(|| {
        let a = slots(mesh, nb(mesh, e, 3))?;
        rebuild(mesh, PatchKind::GreenQuad2, &[a[0], s[1], s[2], a[3]])
    })
}

/// Recognise the patch `e` belongs to as a child.
///
/// Returns `None` for level-0 elements and for children whose siblings no
/// longer exist in the template form (a sibling was refined further).
pub fn find_patch(mesh: &Mesh, e: usize) -> Option<Patch> {
    if e == 0 || e > mesh.nel() {
        return None;
    }
    let found = match mesh.shape(e) {
        CellType::Triangle => find_tria_patch(mesh, e),
        CellType::Quadrilateral => match classify_quad_state(mesh.quad_ages(e))? {
            QuadState::Root => None,
            QuadState::Half1 | QuadState::Half2 => green_quad2_from(mesh, e),
            red => {
                if red.oldest_corner() == Some(0) {
                    red_quad_from_child(mesh, e)
                } else {
                    None
                }
            }
        },
    };
    found.filter(|p| p.elements.contains(&e))
}

fn find_tria_patch(mesh: &Mesh, e: usize) -> Option<Patch> {
    let class = classify_triangle_state(mesh.tria_ages(e));
    match class {
        TriaClass::Determined(TriaState::Root) => None,
        TriaClass::Determined(TriaState::RedInner) => red_tria_from_inner(mesh, e),
        TriaClass::Determined(TriaState::OuterInner) => {
            red_tria_from_inner(mesh, nb(mesh, e, 1)).or_else(|| green_tria3_from_corner(mesh, e))
        }
        TriaClass::Determined(TriaState::OuterInner1) => {
            green_quad4_from_centre(mesh, nb(mesh, e, 2))
        }
        TriaClass::Determined(TriaState::OuterInner2) => {
            green_tria3_from_corner(mesh, nb(mesh, e, 0))
                .or_else(|| green_quad4_from_centre(mesh, e))
        }
        _ => match class.single_youngest()? {
            0 => {
                let sibling = nb(mesh, e, 2);
                green_tria2_from_left(mesh, sibling)
                    .or_else(|| green_tria3_from_corner(mesh, nb(mesh, sibling, 0)))
                    .or_else(|| green_quad3_from_inner(mesh, sibling))
                    .or_else(|| green_quad4_from_centre(mesh, sibling))
            }
            1 => {
                let sibling = nb(mesh, e, 1);
                green_tria2_from_left(mesh, e)
                    .or_else(|| green_tria3_from_corner(mesh, nb(mesh, sibling, 0)))
                    .or_else(|| green_quad3_from_inner(mesh, sibling))
                    .or_else(|| green_quad4_from_centre(mesh, sibling))
            }
            _ => green_quad3_from_inner(mesh, e),
        },
    }
}

/// Decide whether `e` is refined directly or belongs to a green patch.
pub fn element_role(mesh: &Mesh, e: usize) -> Result<Role, MeshAdaptError> {
    mesh.check_element(e)?;
    match mesh.shape(e) {
        CellType::Triangle => match classify_triangle_state(mesh.tria_ages(e)) {
            TriaClass::Determined(TriaState::Root | TriaState::RedInner) => Ok(Role::Red),
            TriaClass::Determined(TriaState::OuterInner) => match find_patch(mesh, e) {
                Some(p) if !p.kind.is_red() => Ok(Role::Green(p)),
                _ => Ok(Role::Red),
            },
            _ => match find_patch(mesh, e) {
                Some(p) if !p.kind.is_red() => Ok(Role::Green(p)),
                _ => Err(MeshAdaptError::IncompletePatch(e)),
            },
        },
        CellType::Quadrilateral => match classify_quad_state(mesh.quad_ages(e)) {
            Some(QuadState::Half1 | QuadState::Half2) => match find_patch(mesh, e) {
                Some(p) => Ok(Role::Green(p)),
                None => Err(MeshAdaptError::IncompletePatch(e)),
            },
            Some(_) => Ok(Role::Red),
            None => Err(MeshAdaptError::InvalidState {
                element: e,
                state: format!("quadrilateral ages {:?}", mesh.quad_ages(e)),
            }),
        },
    }
}
