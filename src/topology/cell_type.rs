//! Element shape metadata.

use serde::{Deserialize, Serialize};

/// The two element shapes handled by the adaptation engine.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum CellType {
    /// 2D simplex (triangle).
    Triangle,
    /// 2D tensor-product cell (quad).
    Quadrilateral,
}

impl CellType {
    /// Number of corner vertices (and edges).
    pub fn num_vertices(self) -> usize {
        match self {
            CellType::Triangle => 3,
            CellType::Quadrilateral => 4,
        }
    }

    /// Slot in `InelOfType`.
    pub fn index(self) -> usize {
        match self {
            CellType::Triangle => 0,
            CellType::Quadrilateral => 1,
        }
    }

    /// Shape of an element given its four vertex slots (unused slot is 0).
    pub fn from_slots(slots: &[usize; 4]) -> Option<Self> {
        match slots {
            [a, b, c, 0] if *a != 0 && *b != 0 && *c != 0 => Some(CellType::Triangle),
            [a, b, c, d] if *a != 0 && *b != 0 && *c != 0 && *d != 0 => {
                Some(CellType::Quadrilateral)
            }
            _ => None,
        }
    }
}
