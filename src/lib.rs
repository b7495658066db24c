#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-hadapt
//!
//! mesh-hadapt performs hierarchical red-green adaptation of 2D meshes made
//! of triangles and quadrilaterals. Elements are refined by a closed set of
//! subdivision templates, kept conforming by green closure elements, and
//! coarsened again by the inverse templates. The subdivision history of an
//! element is never stored: it is read back from the ages of its vertices.
//!
//! ## Features
//! - Red refinement (`Tria4Tria`, `Quad4Quad`) and green closure templates
//!   (`Tria2Tria`, `Tria3Tria`, `Quad2Quad`, `Quad3Tria`, `Quad4Tria`)
//! - Conformity propagation that never produces blue elements and keeps at
//!   most one hanging level
//! - Green-to-red conversion and the full set of coarsening operators
//! - Optional observer receiving every structural change
//!
//! ## Usage
//! ```no_run
//! use mesh_hadapt::prelude::*;
//!
//! let mut mesh = unit_square(4, StructuredCellType::Quadrilateral)?;
//! let indicator = vec![1.0; mesh.nel()];
//! let report = adapt_mesh(&mut mesh, &indicator, &AdaptOptions::default(), None)?;
//! assert!(report.vertices_created > 0);
//! # Ok::<(), MeshAdaptError>(())
//! ```
//!
//! ## Invariants
//! With debug assertions, or with the `strict-invariants` feature, every
//! pass of [`adapt::adapt_mesh`] ends with
//! [`DebugInvariants::validate_invariants`] on the mesh.

pub mod adapt;
pub mod algs;
pub mod data;
pub mod debug_invariants;
pub mod mesh_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::adapt::marker::{CoarsenMarker, RefineMarker};
    pub use crate::adapt::observer::{EventLog, MeshEvent, MeshObserver, OperationKind};
    pub use crate::adapt::{AdaptOptions, AdaptReport, adapt_mesh};
    pub use crate::algs::meshgen::{StructuredCellType, structured_box_2d, unit_square};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::mesh_error::MeshAdaptError;
    pub use crate::topology::cell_type::CellType;
    pub use crate::topology::mesh::Mesh;
}
