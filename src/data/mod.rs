//! Storage collaborators of the adaptation engine: the coordinate index,
//! the boundary loops, and the element-at-vertex association list.

pub mod arraylist;
pub mod boundary;
pub mod quadtree;

pub use arraylist::ElementsAtVertex;
pub use boundary::{BoundaryNode, BoundarySequence};
pub use quadtree::CoordinateIndex;
