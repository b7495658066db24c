//! The adaptation data model.
//!
//! This module provides the mesh itself together with the pieces that read
//! subdivision history out of it:
//! - [`Mesh`]: coordinates, ages, connectivity and both adjacency arrays
//! - element-state classification from vertex ages
//! - the child vertex orders of every subdivision template
//! - patch recognition (which elements came from one macro element)

pub mod cell_type;
pub mod mesh;
pub mod patch;
pub mod state;
pub mod template;

pub use cell_type::CellType;
pub use mesh::{Mesh, edge_key};
pub use patch::{Patch, PatchKind, Role};
pub use state::{QuadState, TriaClass, TriaState};
