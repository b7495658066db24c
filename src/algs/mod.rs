//! Algorithms built on top of the mesh: structured mesh generation.

pub mod meshgen;

pub use meshgen::{StructuredCellType, structured_box_2d, unit_square};
