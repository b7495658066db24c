//! Per-element markers chosen by the marking passes.

use crate::adapt::observer::OperationKind;
use std::fmt;

/// Refinement template for a triangle. Edges are local edge indices.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TriaRefinement {
    /// Bisect one edge.
    Tria2Tria { edge: usize },
    /// Bisect the two edges meeting at `vertex`.
    Tria3Tria { vertex: usize },
    /// Bisect all edges.
    Tria4Tria,
}

/// Refinement template for a quadrilateral.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum QuadRefinement {
    /// Bisect edges `edge` and `edge + 2`; `edge` is 0 or 1.
    Quad2Quad { edge: usize },
    /// Bisect one edge and connect its midpoint to the opposite corners.
    Quad3Tria { edge: usize },
    /// Bisect the adjacent edges `edge` and `edge + 1`.
    Quad4Tria { edge: usize },
    /// Bisect all edges and add the centroid.
    Quad4Quad,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum RefineMarker {
    #[default]
    AsIs,
    Triangle(TriaRefinement),
    Quad(QuadRefinement),
}

impl RefineMarker {
    /// Marker for a triangle with the given bitmask of marked edges.
    pub fn for_triangle(mask: u8) -> Option<Self> {
        let refinement = match mask & 0b111 {
            0 => return Some(RefineMarker::AsIs),
            0b001 => TriaRefinement::Tria2Tria { edge: 0 },
            0b010 => TriaRefinement::Tria2Tria { edge: 1 },
            0b100 => TriaRefinement::Tria2Tria { edge: 2 },
            0b101 => TriaRefinement::Tria3Tria { vertex: 0 },
            0b011 => TriaRefinement::Tria3Tria { vertex: 1 },
            0b110 => TriaRefinement::Tria3Tria { vertex: 2 },
            _ => TriaRefinement::Tria4Tria,
        };
        Some(RefineMarker::Triangle(refinement))
    }

    /// Marker for a quadrilateral with the given bitmask of marked edges;
    /// `None` for the blue pattern of three marked edges.
    pub fn for_quad(mask: u8) -> Option<Self> {
        let refinement = match mask & 0b1111 {
            0 => return Some(RefineMarker::AsIs),
            0b0001 => QuadRefinement::Quad3Tria { edge: 0 },
            0b0010 => QuadRefinement::Quad3Tria { edge: 1 },
            0b0100 => QuadRefinement::Quad3Tria { edge: 2 },
            0b1000 => QuadRefinement::Quad3Tria { edge: 3 },
            0b0101 => QuadRefinement::Quad2Quad { edge: 0 },
            0b1010 => QuadRefinement::Quad2Quad { edge: 1 },
            0b0011 => QuadRefinement::Quad4Tria { edge: 0 },
            0b0110 => QuadRefinement::Quad4Tria { edge: 1 },
            0b1100 => QuadRefinement::Quad4Tria { edge: 2 },
            0b1001 => QuadRefinement::Quad4Tria { edge: 3 },
            0b1111 => QuadRefinement::Quad4Quad,
            _ => return None,
        };
        Some(RefineMarker::Quad(refinement))
    }

    pub fn is_as_is(self) -> bool {
        self == RefineMarker::AsIs
    }

    /// Observer kind of the operator this marker selects.
    pub fn operation(self) -> Option<OperationKind> {
        Some(match self {
            RefineMarker::AsIs => return None,
            RefineMarker::Triangle(TriaRefinement::Tria2Tria { .. }) => {
                OperationKind::RefineTria2Tria
            }
            RefineMarker::Triangle(TriaRefinement::Tria3Tria { .. }) => {
                OperationKind::RefineTria3Tria
            }
            RefineMarker::Triangle(TriaRefinement::Tria4Tria) => OperationKind::RefineTria4Tria,
            RefineMarker::Quad(QuadRefinement::Quad2Quad { .. }) => OperationKind::RefineQuad2Quad,
            RefineMarker::Quad(QuadRefinement::Quad3Tria { .. }) => OperationKind::RefineQuad3Tria,
            RefineMarker::Quad(QuadRefinement::Quad4Tria { .. }) => OperationKind::RefineQuad4Tria,
            RefineMarker::Quad(QuadRefinement::Quad4Quad) => OperationKind::RefineQuad4Quad,
        })
    }
}

/// Which side of a `Quad4Tria` patch keeps its midpoint in `4Tria3Tria`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Side {
    /// Keep the midpoint of local macro edge 0.
    Left,
    /// Keep the midpoint of local macro edge 1.
    Right,
}

/// Coarsening operator for the patch held by an element. Indices refer to
/// the patch's template frame (see [`Patch`](crate::topology::patch::Patch)).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum CoarsenMarker {
    #[default]
    AsIs,
    Coarsen2Tria1Tria,
    Coarsen3Tria1Tria,
    Coarsen4Tria1Tria,
    /// Keep the midpoint of macro edge `keep`.
    Coarsen4Tria2Tria { keep: usize },
    Coarsen4Quad1Quad,
    /// Keep the midpoints of macro edges `keep` and `keep + 2`.
    Coarsen4Quad2Quad { keep: usize },
    /// Keep the midpoint of macro edge `keep`.
    Coarsen4Quad3Tria { keep: usize },
    /// Keep the midpoints of macro edges `keep` and `keep + 1`.
    Coarsen4Quad4Tria { keep: usize },
    Coarsen2Quad1Quad,
    /// Keep the midpoint of macro edge `keep` (0 or 2).
    Coarsen2Quad3Tria { keep: usize },
    Coarsen3Tria1Quad,
    Coarsen4Tria1Quad,
    Coarsen4Tria3Tria(Side),
}

impl CoarsenMarker {
    pub fn is_as_is(self) -> bool {
        self == CoarsenMarker::AsIs
    }

    pub fn operation(self) -> Option<OperationKind> {
        Some(match self {
            CoarsenMarker::AsIs => return None,
            CoarsenMarker::Coarsen2Tria1Tria => OperationKind::Coarsen2Tria1Tria,
            CoarsenMarker::Coarsen3Tria1Tria => OperationKind::Coarsen3Tria1Tria,
            CoarsenMarker::Coarsen4Tria1Tria => OperationKind::Coarsen4Tria1Tria,
            CoarsenMarker::Coarsen4Tria2Tria { .. } => OperationKind::Coarsen4Tria2Tria,
            CoarsenMarker::Coarsen4Quad1Quad => OperationKind::Coarsen4Quad1Quad,
            CoarsenMarker::Coarsen4Quad2Quad { .. } => OperationKind::Coarsen4Quad2Quad,
            CoarsenMarker::Coarsen4Quad3Tria { .. } => OperationKind::Coarsen4Quad3Tria,
            CoarsenMarker::Coarsen4Quad4Tria { .. } => OperationKind::Coarsen4Quad4Tria,
            CoarsenMarker::Coarsen2Quad1Quad => OperationKind::Coarsen2Quad1Quad,
            CoarsenMarker::Coarsen2Quad3Tria { .. } => OperationKind::Coarsen2Quad3Tria,
            CoarsenMarker::Coarsen3Tria1Quad => OperationKind::Coarsen3Tria1Quad,
            CoarsenMarker::Coarsen4Tria1Quad => OperationKind::Coarsen4Tria1Quad,
            CoarsenMarker::Coarsen4Tria3Tria(_) => OperationKind::Coarsen4Tria3Tria,
        })
    }
}

impl fmt::Display for RefineMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for CoarsenMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_masks() {
        assert_eq!(RefineMarker::for_triangle(0), Some(RefineMarker::AsIs));
        assert_eq!(
            RefineMarker::for_triangle(0b011),
            Some(RefineMarker::Triangle(TriaRefinement::Tria3Tria { vertex: 1 }))
        );
        assert_eq!(
            RefineMarker::for_triangle(0b111),
            Some(RefineMarker::Triangle(TriaRefinement::Tria4Tria))
        );
    }

    #[test]
    fn quad_masks_reject_blue_patterns() {
        assert_eq!(RefineMarker::for_quad(0b0111), None);
        assert_eq!(
            RefineMarker::for_quad(0b1001),
            Some(RefineMarker::Quad(QuadRefinement::Quad4Tria { edge: 3 }))
        );
        assert_eq!(
            RefineMarker::for_quad(0b1010).and_then(RefineMarker::operation),
            Some(OperationKind::RefineQuad2Quad)
        );
    }
}
