mod util;

use mesh_hadapt::adapt::coarsen::coarsen;
use mesh_hadapt::adapt::mark_coarsen::mark_coarsening;
use mesh_hadapt::adapt::observer::Notifier;
use mesh_hadapt::adapt::refine::{refine_quad4quad, refine_tria2tria, refine_tria4tria};
use mesh_hadapt::prelude::*;
use mesh_hadapt::topology::patch::{PatchKind, find_patch};
use util::*;

#[test]
fn single_triangle_is_refined_regularly() {
    let mut mesh = single_triangle();
    let mut log = EventLog::new();
    let report = adapt_mesh(&mut mesh, &[1.0], &AdaptOptions::default(), Some(&mut log)).unwrap();
    assert_eq!(report.elements_marked, 1);
    assert_eq!(report.vertices_created, 3);
    assert_eq!(report.elements_created, 3);
    assert_eq!(mesh.nvt(), 6);
    assert_eq!(mesh.nel(), 4);
    assert_eq!(log.count(OperationKind::RefineTria4Tria), 1);
    assert_eq!(log.count(OperationKind::InsertVertexEdge), 3);
    // the new vertices sit on the edge midpoints
    assert_eq!(mesh.find_midpoint(1, 2).map(|m| mesh.coords(m)), Some([1.0, 0.0]));
    assert_eq!(mesh.find_midpoint(2, 3).map(|m| mesh.coords(m)), Some([1.0, 0.5]));
    assert_eq!(mesh.find_midpoint(3, 1).map(|m| mesh.coords(m)), Some([0.0, 0.5]));
    assert_valid(&mesh);
    assert_conforming(&mesh);
}

#[test]
fn marked_neighbour_converts_green_pair_first() {
    let mut mesh = two_triangles();
    refine_tria2tria(&mut mesh, 1, 0, &mut Notifier::silent()).unwrap();
    assert_eq!(mesh.nel(), 3);
    assert_eq!(find_patch(&mesh, 1).unwrap().kind, PatchKind::GreenTria2);

    let mut log = EventLog::new();
    let report = adapt_mesh(
        &mut mesh,
        &[0.0, 1.0, 0.0],
        &AdaptOptions::default(),
        Some(&mut log),
    )
    .unwrap();
    assert_eq!(report.conversions, 1);
    assert_eq!(log.count(OperationKind::ConvertTria2Tria), 1);
    assert_eq!(log.count(OperationKind::RefineTria4Tria), 1);
    let convert_at = log.kinds().iter().position(|&k| k == OperationKind::ConvertTria2Tria);
    let refine_at = log.kinds().iter().position(|&k| k == OperationKind::RefineTria4Tria);
    assert!(convert_at < refine_at);

    // two red patches of four triangles each
    assert_eq!(mesh.nel(), 8);
    assert_eq!(mesh.nvt(), 9);
    let mut red = 0;
    for e in 1..=mesh.nel() {
        let patch = find_patch(&mesh, e).unwrap();
        assert_eq!(patch.kind, PatchKind::RedTria);
        red += usize::from(patch.holder() == e);
    }
    assert_eq!(red, 2);
    assert_valid(&mesh);
    assert_conforming(&mesh);
}

#[test]
fn inner_triangle_with_two_locked_vertices_stays() {
    let mut mesh = single_triangle();
    refine_tria4tria(&mut mesh, 1, &mut Notifier::silent()).unwrap();
    let m1 = mesh.find_midpoint(1, 2).unwrap();
    let m2 = mesh.find_midpoint(2, 3).unwrap();
    let m3 = mesh.find_midpoint(3, 1).unwrap();
    mesh.lock_vertex(m1);
    mesh.lock_vertex(m2);

    let marking = mark_coarsening(&mut mesh, &[0.0; 4], &AdaptOptions::default()).unwrap();
    assert!(mesh.is_locked(m3));
    assert_eq!(marking.num_marked(), 0);
    assert!(marking.markers.iter().all(|m| m.is_as_is()));
}

#[test]
fn one_locked_midpoint_turns_four_quads_into_three_triangles() {
    let mut mesh = unit_quad();
    refine_quad4quad(&mut mesh, 1, &mut Notifier::silent()).unwrap();
    assert_eq!(mesh.inel_of_type(CellType::Quadrilateral), 4);
    let m2 = mesh.find_midpoint(2, 3).unwrap();
    mesh.lock_vertex(m2);

    let marking = mark_coarsening(&mut mesh, &[0.0; 4], &AdaptOptions::default()).unwrap();
    let holder = find_patch(&mesh, 1).unwrap().holder();
    assert_eq!(holder, 1);
    assert_eq!(
        marking.markers[holder],
        CoarsenMarker::Coarsen4Quad3Tria { keep: 1 }
    );

    let mut log = EventLog::new();
    coarsen(&mut mesh, &marking.markers, &mut Notifier::new(Some(&mut log))).unwrap();
    assert_eq!(mesh.inel_of_type(CellType::Quadrilateral), 0);
    assert_eq!(mesh.inel_of_type(CellType::Triangle), 3);
    assert_eq!(mesh.nvt(), 5);
    assert_eq!(log.count(OperationKind::Coarsen4Quad3Tria), 1);
    assert_eq!(log.count(OperationKind::RemoveVertex), 4);
    assert_eq!(
        find_patch(&mesh, 1).unwrap().kind,
        PatchKind::GreenQuad3Tria
    );
    assert_valid(&mesh);
    assert_conforming(&mesh);
}

#[test]
fn three_locked_midpoints_keep_the_red_quads() {
    let mut mesh = unit_quad();
    refine_quad4quad(&mut mesh, 1, &mut Notifier::silent()).unwrap();
    for (a, b) in [(1, 2), (2, 3), (3, 4)] {
        let m = mesh.find_midpoint(a, b).unwrap();
        mesh.lock_vertex(m);
    }
    let marking = mark_coarsening(&mut mesh, &[0.0; 4], &AdaptOptions::default()).unwrap();
    assert_eq!(marking.num_marked(), 0);
    let c = mesh.find_centroid(&[1, 2, 3, 4]).unwrap();
    assert!(mesh.is_locked(c));
}
