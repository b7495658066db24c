#![allow(dead_code)]
use mesh_hadapt::prelude::*;
use mesh_hadapt::topology::patch::{Patch, find_patch};

/// Unit square split along its rising diagonal: `[1, 2, 3]` and `[1, 3, 4]`.
pub fn two_triangles() -> Mesh {
    Mesh::new(
        vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        &[[1, 2, 3, 0], [1, 3, 4, 0]],
    )
    .unwrap()
}

pub fn single_triangle() -> Mesh {
    Mesh::new(vec![[0.0, 0.0], [2.0, 0.0], [0.0, 1.0]], &[[1, 2, 3, 0]]).unwrap()
}

pub fn unit_quad() -> Mesh {
    Mesh::new(
        vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        &[[1, 2, 3, 4]],
    )
    .unwrap()
}

/// Two unit quads side by side: `[1, 2, 5, 4]` and `[2, 3, 6, 5]`.
pub fn two_quads() -> Mesh {
    structured_box_2d(2, 1, [0.0, 0.0], [2.0, 1.0], StructuredCellType::Quadrilateral).unwrap()
}

pub fn total_area(mesh: &Mesh) -> f64 {
    (1..=mesh.nel()).map(|e| mesh.signed_area(e)).sum()
}

/// Full invariant check plus the type-count identity.
pub fn assert_valid(mesh: &Mesh) {
    mesh.validate_invariants().unwrap();
    assert_eq!(
        mesh.inel_of_type(CellType::Triangle) + mesh.inel_of_type(CellType::Quadrilateral),
        mesh.nel()
    );
}

/// No element edge carries a hanging node.
pub fn assert_conforming(mesh: &Mesh) {
    for e in 1..=mesh.nel() {
        let (nb, mid) = (mesh.neighbours(e), mesh.mid_neighbours(e));
        for i in 0..mesh.shape(e).num_vertices() {
            assert_eq!(
                nb[i], mid[i],
                "element {e} {:?} has a hanging node on local edge {i}",
                mesh.element(e)
            );
        }
    }
}

/// Every non-root element has a role, and every patch found is a real one:
/// it contains the element and its refinement vertices are younger than
/// its macro corners.
pub fn assert_patches_recognised(mesh: &Mesh) {
    for e in 1..=mesh.nel() {
        if mesh.level(e) > 0 {
            let role = mesh_hadapt::topology::patch::element_role(mesh, e);
            assert!(role.is_ok(), "element {e} {:?}: {role:?}", mesh.element(e));
        }
        if let Some(patch) = find_patch(mesh, e) {
            assert_true_patch(mesh, e, &patch);
        }
    }
}

pub fn assert_true_patch(mesh: &Mesh, e: usize, patch: &Patch) {
    assert!(patch.elements.contains(&e), "{patch:?} misses element {e}");
    let c = &patch.corners;
    let youngest = |vs: &[usize]| vs.iter().map(|&v| mesh.age(v)).max().unwrap();
    let mut expected: Vec<u32> = patch
        .bisected_edges()
        .iter()
        .map(|&i| 1 + youngest(&[c[i], c[(i + 1) % c.len()]]))
        .collect();
    if patch.refinement_vertices.len() > expected.len() {
        expected.push(1 + youngest(c));
    }
    let ages: Vec<u32> = patch.refinement_vertices.iter().map(|&m| mesh.age(m)).collect();
    assert_eq!(ages, expected, "{patch:?} of element {e} is not a refinement patch");
}

pub fn sorted(mut v: Vec<usize>) -> Vec<usize> {
    v.sort_unstable();
    v
}

/// Whether `a` is a cyclic rotation of `b`.
pub fn same_cycle(a: &[usize], b: &[usize]) -> bool {
    a.len() == b.len() && (0..b.len()).any(|k| (0..a.len()).all(|i| a[i] == b[(i + k) % b.len()]))
}

pub fn cycle(mesh: &mut Mesh, indicator: &[f64]) -> AdaptReport {
    adapt_mesh(mesh, indicator, &AdaptOptions::default(), None).unwrap()
}
