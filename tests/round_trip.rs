mod util;

use mesh_hadapt::adapt::coarsen::{
    Coarsened, coarsen_2quad1quad, coarsen_2tria1tria, coarsen_3tria1quad, coarsen_3tria1tria,
    coarsen_4quad1quad, coarsen_4tria1quad, coarsen_4tria1tria,
};
use mesh_hadapt::adapt::observer::Notifier;
use mesh_hadapt::adapt::refine::{
    refine_quad2quad, refine_quad3tria, refine_quad4quad, refine_quad4tria, refine_tria2tria,
    refine_tria3tria, refine_tria4tria,
};
use mesh_hadapt::prelude::*;
use mesh_hadapt::topology::state::{classify_quad_state, classify_triangle_state};
use util::*;

type RefineOp = fn(&mut Mesh, usize, &mut Notifier<'_>) -> Result<Vec<usize>, MeshAdaptError>;
type CoarsenOp = fn(&mut Mesh, usize, &mut Notifier<'_>) -> Result<Coarsened, MeshAdaptError>;

/// Refine element 1, coarsen its patch again and compare with the start.
fn round_trip(mut mesh: Mesh, refine: RefineOp, coarsen: CoarsenOp, children: usize) {
    let (nvt, nel) = (mesh.nvt(), mesh.nel());
    let before = mesh.element(1);
    let neighbours = sorted(mesh.neighbours(1).to_vec());
    let area = total_area(&mesh);

    let mut n = Notifier::silent();
    let created = refine(&mut mesh, 1, &mut n).unwrap();
    assert_eq!(created.len(), children);
    assert_eq!(mesh.nel(), nel + children - 1);
    assert_valid(&mesh);
    assert!((total_area(&mesh) - area).abs() < 1e-12);

    coarsen(&mut mesh, 1, &mut n).unwrap();
    assert_eq!((mesh.nvt(), mesh.nel()), (nvt, nel));
    let after = mesh.element(1);
    let k = mesh.shape(1).num_vertices();
    assert!(same_cycle(&after[..k], &before[..k]), "{after:?} vs {before:?}");
    assert_eq!(sorted(mesh.neighbours(1).to_vec()), neighbours);
    match mesh.shape(1) {
        CellType::Triangle => assert_eq!(
            classify_triangle_state(mesh.tria_ages(1)),
            classify_triangle_state([0, 0, 0])
        ),
        CellType::Quadrilateral => assert_eq!(
            classify_quad_state(mesh.quad_ages(1)),
            classify_quad_state([0, 0, 0, 0])
        ),
    }
    assert_valid(&mesh);
    assert_conforming(&mesh);
}

#[test]
fn tria2tria_round_trip() {
    round_trip(
        single_triangle(),
        |m, e, n| refine_tria2tria(m, e, 1, n),
        coarsen_2tria1tria,
        2,
    );
}

#[test]
fn tria3tria_round_trip() {
    round_trip(
        single_triangle(),
        |m, e, n| refine_tria3tria(m, e, 2, n),
        coarsen_3tria1tria,
        3,
    );
}

#[test]
fn tria4tria_round_trip() {
    round_trip(single_triangle(), refine_tria4tria, coarsen_4tria1tria, 4);
}

#[test]
fn quad2quad_round_trip() {
    round_trip(
        unit_quad(),
        |m, e, n| refine_quad2quad(m, e, 1, n),
        coarsen_2quad1quad,
        2,
    );
}

#[test]
fn quad3tria_round_trip() {
    round_trip(
        unit_quad(),
        |m, e, n| refine_quad3tria(m, e, 3, n),
        coarsen_3tria1quad,
        3,
    );
}

#[test]
fn quad4tria_round_trip() {
    round_trip(
        unit_quad(),
        |m, e, n| refine_quad4tria(m, e, 2, n),
        coarsen_4tria1quad,
        4,
    );
}

#[test]
fn quad4quad_round_trip() {
    round_trip(unit_quad(), refine_quad4quad, coarsen_4quad1quad, 4);
}

#[test]
fn round_trip_next_to_a_neighbour() {
    // the boundary edge 0 of the left quad is bisected; the right quad
    // is untouched and must be linked back to the restored element
    round_trip(
        two_quads(),
        |m, e, n| refine_quad3tria(m, e, 0, n),
        coarsen_3tria1quad,
        3,
    );
}

#[test]
fn refine_then_zero_indicator_restores_counts() {
    let mut mesh = unit_square(2, StructuredCellType::Mixed).unwrap();
    let (nvt, nel) = (mesh.nvt(), mesh.nel());
    let area = total_area(&mesh);
    let mut indicator = vec![0.05; nel];
    indicator[0] = 1.0;
    indicator[nel - 1] = 1.0;

    let refined = cycle(&mut mesh, &indicator);
    assert!(refined.vertices_created > 0);
    assert_eq!(refined.vertices_removed, 0);
    assert_valid(&mesh);
    assert_conforming(&mesh);

    let zero = vec![0.0; mesh.nel()];
    let coarsened = cycle(&mut mesh, &zero);
    assert_eq!(coarsened.elements_marked, 0);
    assert_eq!(coarsened.vertices_removed, refined.vertices_created);
    assert_eq!((mesh.nvt(), mesh.nel()), (nvt, nel));
    assert!((total_area(&mesh) - area).abs() < 1e-12);
    assert!((1..=mesh.nel()).all(|e| mesh.level(e) == 0));
    assert_valid(&mesh);
}
