mod util;

use mesh_hadapt::adapt::mark_refine::mark_refinement;
use mesh_hadapt::adapt::marker::TriaRefinement;
use mesh_hadapt::adapt::observer::Notifier;
use mesh_hadapt::adapt::refine::refine;
use mesh_hadapt::prelude::*;
use util::*;

#[test]
fn options_round_trip_through_json() {
    let options = AdaptOptions {
        refine_tolerance: 0.8,
        max_subdivision: 5,
        escalate_tria3tria: false,
        ..AdaptOptions::default()
    };
    let json = serde_json::to_string(&options).unwrap();
    let back: AdaptOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, options);

    // missing fields fall back to the defaults
    let partial: AdaptOptions = serde_json::from_str(r#"{"coarsen": false}"#).unwrap();
    assert_eq!(
        partial,
        AdaptOptions {
            coarsen: false,
            ..AdaptOptions::default()
        }
    );
}

#[test]
fn invalid_options_are_rejected() {
    let mut mesh = single_triangle();
    for options in [
        AdaptOptions {
            refine_tolerance: f64::NAN,
            ..AdaptOptions::default()
        },
        AdaptOptions {
            coarsen_tolerance: -1.0,
            ..AdaptOptions::default()
        },
        AdaptOptions {
            refine_tolerance: 0.1,
            coarsen_tolerance: 0.2,
            ..AdaptOptions::default()
        },
    ] {
        assert!(matches!(
            adapt_mesh(&mut mesh, &[1.0], &options, None),
            Err(MeshAdaptError::InvalidOptions(_))
        ));
    }
    assert_eq!(mesh.nel(), 1);
}

#[test]
fn indicator_must_cover_every_element() {
    let mut mesh = two_triangles();
    let err = adapt_mesh(&mut mesh, &[1.0], &AdaptOptions::default(), None).unwrap_err();
    assert_eq!(
        err,
        MeshAdaptError::IndicatorLengthMismatch {
            expected: 2,
            found: 1
        }
    );
}

#[test]
fn refinement_creates_exactly_the_predicted_vertices() {
    let mut mesh = unit_square(3, StructuredCellType::Mixed).unwrap();
    let indicator: Vec<f64> = (0..mesh.nel()).map(|e| if e % 4 == 0 { 1.0 } else { 0.0 }).collect();
    let mut n = Notifier::silent();
    let marking = mark_refinement(&mut mesh, &indicator, &AdaptOptions::default(), &mut n).unwrap();
    let nvt = mesh.nvt();
    let outcome = refine(&mut mesh, &marking, &mut n).unwrap();
    assert_eq!(mesh.nvt(), nvt + marking.increase_nvt);
    assert_eq!(outcome.vertices_created, marking.increase_nvt);
    assert_eq!(outcome.element_origin.len(), mesh.nel() + 1);
    assert_valid(&mesh);
    assert_conforming(&mesh);
}

#[test]
fn as_is_markers_are_stable() {
    let mut mesh = unit_square(2, StructuredCellType::Triangle).unwrap();
    let indicator = vec![0.3; mesh.nel()];
    let mut n = Notifier::silent();
    let first = mark_refinement(&mut mesh, &indicator, &AdaptOptions::default(), &mut n).unwrap();
    let second = mark_refinement(&mut mesh, &indicator, &AdaptOptions::default(), &mut n).unwrap();
    assert_eq!(first.num_marked(), 0);
    assert_eq!(first.markers, second.markers);
}

#[test]
fn two_marked_edges_use_tria3tria_without_escalation() {
    // three triangles fanned around vertex 1; the outer two are refined,
    // so the middle one sees two marked edges meeting at vertex 1
    let mut mesh = Mesh::new(
        vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [-2.0, 0.0]],
        &[[1, 2, 3, 0], [1, 3, 4, 0], [1, 4, 5, 0]],
    )
    .unwrap();
    let options = AdaptOptions {
        escalate_tria3tria: false,
        coarsen: false,
        ..AdaptOptions::default()
    };
    let mut n = Notifier::silent();
    let marking = mark_refinement(&mut mesh, &[1.0, 0.0, 1.0], &options, &mut n).unwrap();
    assert_eq!(
        marking.markers[2],
        RefineMarker::Triangle(TriaRefinement::Tria3Tria { vertex: 0 })
    );
    refine(&mut mesh, &marking, &mut n).unwrap();
    assert_valid(&mesh);
    assert_conforming(&mesh);

    let mut mesh = Mesh::new(
        vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [-2.0, 0.0]],
        &[[1, 2, 3, 0], [1, 3, 4, 0], [1, 4, 5, 0]],
    )
    .unwrap();
    let report = adapt_mesh(&mut mesh, &[1.0, 0.0, 1.0], &AdaptOptions::default(), None).unwrap();
    assert_eq!(report.elements_marked, 3);
    assert_eq!(mesh.nel(), 12);
    assert_valid(&mesh);
    assert_conforming(&mesh);
}

#[test]
fn subdivision_depth_is_capped() {
    let mut mesh = single_triangle();
    let options = AdaptOptions {
        max_subdivision: 1,
        coarsen: false,
        ..AdaptOptions::default()
    };
    adapt_mesh(&mut mesh, &[1.0], &options, None).unwrap();
    assert_eq!(mesh.nel(), 4);
    let report = adapt_mesh(&mut mesh, &[1.0; 4], &options, None).unwrap();
    assert_eq!(report.elements_marked, 0);
    assert_eq!(mesh.nel(), 4);

    // a high indicator still protects the capped elements from coarsening
    let options = AdaptOptions {
        coarsen: true,
        ..options
    };
    let report = adapt_mesh(&mut mesh, &[1.0; 4], &options, None).unwrap();
    assert_eq!(report.patches_coarsened, 0);
    assert_eq!(mesh.nel(), 4);
}

#[test]
fn observer_sees_every_structural_change() {
    let mut mesh = unit_quad();
    let mut log = EventLog::new();
    adapt_mesh(&mut mesh, &[1.0], &AdaptOptions::default(), Some(&mut log)).unwrap();
    assert_eq!(log.count(OperationKind::AdjustVertexDimension), 1);
    assert_eq!(log.count(OperationKind::InsertVertexEdge), 4);
    assert_eq!(log.count(OperationKind::InsertVertexCentroid), 1);
    assert_eq!(log.count(OperationKind::RefineQuad4Quad), 1);
    let refine_event = log
        .events
        .iter()
        .find(|e| e.kind == OperationKind::RefineQuad4Quad)
        .unwrap();
    assert_eq!(sorted(refine_event.elements.clone()), vec![1, 2, 3, 4]);

    let mut log = EventLog::new();
    adapt_mesh(&mut mesh, &[0.0; 4], &AdaptOptions::default(), Some(&mut log)).unwrap();
    assert_eq!(log.count(OperationKind::Coarsen4Quad1Quad), 1);
    assert_eq!(log.count(OperationKind::RemoveVertex), 5);
    assert_eq!(mesh.nel(), 1);
}

#[test]
fn closure_function_can_observe() {
    let mut mesh = single_triangle();
    let mut inserted = Vec::new();
    let mut observer = |event: &MeshEvent<'_>| {
        if event.kind == OperationKind::InsertVertexEdge {
            inserted.push(event.vertices[0]);
        }
    };
    adapt_mesh(&mut mesh, &[1.0], &AdaptOptions::default(), Some(&mut observer)).unwrap();
    assert_eq!(sorted(inserted), vec![4, 5, 6]);
}

#[test]
fn repeated_cycles_keep_the_mesh_consistent() {
    let mut mesh = unit_square(3, StructuredCellType::Mixed).unwrap();
    let area = total_area(&mesh);
    for step in 0..4 {
        // a refinement front moving along the diagonal
        let indicator: Vec<f64> = (1..=mesh.nel())
            .map(|e| {
                let [a, b, ..] = mesh.element(e);
                let [x, y] = mesh.coords(a);
                let [p, q] = mesh.coords(b);
                let d = ((x + p) / 2.0 - (y + q) / 2.0).abs();
                let front = 0.25 * step as f64;
                if (d - front).abs() < 0.2 { 1.0 } else { 0.0 }
            })
            .collect();
        cycle(&mut mesh, &indicator);
        assert_valid(&mesh);
        assert_conforming(&mesh);
        assert_patches_recognised(&mesh);
        assert!((total_area(&mesh) - area).abs() < 1e-9);
    }
}
