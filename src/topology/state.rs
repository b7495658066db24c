//! Element-state classification from vertex ages.
//!
//! The ages of an element's corners, read in local connectivity order,
//! encode where the element sits in the refinement hierarchy. Adjacent
//! corners of equal age share a generation; the youngest corners are the
//! vertices introduced by the refinement that produced the element.
//!
//! Triangle states:
//!
//! | ages (local order)            | state               |
//! |-------------------------------|---------------------|
//! | all equal, all zero           | `Root`              |
//! | all equal, non-zero           | `RedInner`          |
//! | one older corner at 1/2/3     | `OuterInner`/`1`/`2`|
//! | one younger corner at 1/2/3   | `GreenOuterRight`/`GreenOuterLeft`/`GreenInner` |
//! | three distinct ages           | ambiguous           |
//!
//! Quadrilateral states are `Root`, `Red1..Red4` (three equal youngest
//! corners, the odd corner is the oldest) and `Half1`/`Half2` (two adjacent
//! youngest corners on local edge 1/3 resp. 2/4).

use std::fmt;

/// Canonical state of a triangle.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TriaState {
    /// Element of the original mesh.
    Root,
    /// Inner triangle of a red patch.
    RedInner,
    /// Two youngest corners, oldest corner at local position 1.
    OuterInner,
    /// Two youngest corners, oldest corner at local position 2.
    OuterInner1,
    /// Two youngest corners, oldest corner at local position 3.
    OuterInner2,
    /// Single youngest corner at local position 3.
    GreenInner,
    /// Single youngest corner at local position 2.
    GreenOuterLeft,
    /// Single youngest corner at local position 1.
    GreenOuterRight,
}

/// Result of classifying a triangle from its own corners.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TriaClass {
    /// The corner ages determine the state.
    Determined(TriaState),
    /// Three distinct ages: only the position (0-based) of the youngest
    /// corner is known, the caller has to consult the neighbours.
    Ambiguous { youngest: usize },
}

/// Canonical state of a quadrilateral.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum QuadState {
    Root,
    Red1,
    Red2,
    Red3,
    Red4,
    Half1,
    Half2,
}

impl fmt::Display for TriaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for QuadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Bitmask with bit `i` set if the corners of local edge `i` have equal age.
pub fn edge_equality_mask<const N: usize>(ages: &[u32; N]) -> u8 {
    (0..N).fold(0u8, |mask, i| {
        if ages[i] == ages[(i + 1) % N] {
            mask | (1 << i)
        } else {
            mask
        }
    })
}

/// Classify a triangle from its corner ages in local order.
pub fn classify_triangle_state(ages: [u32; 3]) -> TriaClass {
    let mask = edge_equality_mask(&ages);
    if mask == 0b111 {
        return TriaClass::Determined(if ages.iter().all(|&a| a == 0) {
            TriaState::Root
        } else {
            TriaState::RedInner
        });
    }
    if mask == 0 {
        let youngest = (0..3).max_by_key(|&i| ages[i]).unwrap_or(0);
        return TriaClass::Ambiguous { youngest };
    }
    // exactly one equal edge; the corner opposite to it is the odd one
    let edge = mask.trailing_zeros() as usize;
    let odd = (edge + 2) % 3;
    let pair = ages[edge];
    TriaClass::Determined(if ages[odd] < pair {
        TriaState::outer_inner(odd)
    } else {
        TriaState::green(odd)
    })
}

/// Classify a quadrilateral from its corner ages in local order.
///
/// Returns `None` for age patterns no template can produce.
pub fn classify_quad_state(ages: [u32; 4]) -> Option<QuadState> {
    let youngest = ages.iter().copied().max().unwrap_or(0);
    if youngest == 0 {
        return Some(QuadState::Root);
    }
    let young: Vec<usize> = (0..4).filter(|&i| ages[i] == youngest).collect();
    match young.as_slice() {
        [_, _, _] => {
            let odd = (0..4).find(|i| !young.contains(i))?;
            Some(QuadState::red(odd))
        }
        [a, b] if (a + 1) % 4 == *b || (b + 1) % 4 == *a => {
            let first = if (a + 1) % 4 == *b { *a } else { *b };
            Some(if first % 2 == 0 {
                QuadState::Half1
            } else {
                QuadState::Half2
            })
        }
        _ => None,
    }
}

impl TriaState {
    /// Outer-inner state with the oldest corner at `odd` (0-based).
    pub fn outer_inner(odd: usize) -> Self {
        match odd % 3 {
            0 => TriaState::OuterInner,
            1 => TriaState::OuterInner1,
            _ => TriaState::OuterInner2,
        }
    }

    /// Green state with the youngest corner at `young` (0-based).
    pub fn green(young: usize) -> Self {
        match young % 3 {
            0 => TriaState::GreenOuterRight,
            1 => TriaState::GreenOuterLeft,
            _ => TriaState::GreenInner,
        }
    }

    /// Local position of the corner whose age differs from the other two.
    pub fn odd_corner(self) -> Option<usize> {
        match self {
            TriaState::OuterInner | TriaState::GreenOuterRight => Some(0),
            TriaState::OuterInner1 | TriaState::GreenOuterLeft => Some(1),
            TriaState::OuterInner2 | TriaState::GreenInner => Some(2),
            TriaState::Root | TriaState::RedInner => None,
        }
    }

    /// Bitmask of local edges whose corners have equal age.
    pub fn edge_mask(self) -> u8 {
        match self.odd_corner() {
            // the edge opposite to corner k is edge k + 1
            Some(odd) => 1 << ((odd + 1) % 3),
            None => 0b111,
        }
    }

    /// State of the same triangle after rotating its vertex list so that
    /// old position `k` becomes position 0.
    pub fn rotate(self, k: usize) -> Self {
        match self.odd_corner() {
            None => self,
            Some(odd) => {
                let odd = (odd + 3 - k % 3) % 3;
                if self.is_outer_inner() {
                    TriaState::outer_inner(odd)
                } else {
                    TriaState::green(odd)
                }
            }
        }
    }

    /// Two youngest corners and an older one.
    pub fn is_outer_inner(self) -> bool {
        matches!(
            self,
            TriaState::OuterInner | TriaState::OuterInner1 | TriaState::OuterInner2
        )
    }

    /// Single youngest corner.
    pub fn is_green(self) -> bool {
        matches!(
            self,
            TriaState::GreenInner | TriaState::GreenOuterLeft | TriaState::GreenOuterRight
        )
    }
}

impl TriaClass {
    /// Local position of the single youngest corner, if there is one.
    pub fn single_youngest(self) -> Option<usize> {
        match self {
            TriaClass::Ambiguous { youngest } => Some(youngest),
            TriaClass::Determined(state) if state.is_green() => state.odd_corner(),
            TriaClass::Determined(_) => None,
        }
    }

    /// Class after rotating the vertex list so old position `k` becomes 0.
    pub fn rotate(self, k: usize) -> Self {
        match self {
            TriaClass::Determined(state) => TriaClass::Determined(state.rotate(k)),
            TriaClass::Ambiguous { youngest } => TriaClass::Ambiguous {
                youngest: (youngest + 3 - k % 3) % 3,
            },
        }
    }
}

impl QuadState {
    /// Red state with the oldest corner at `odd` (0-based).
    pub fn red(odd: usize) -> Self {
        match odd % 4 {
            0 => QuadState::Red1,
            1 => QuadState::Red2,
            2 => QuadState::Red3,
            _ => QuadState::Red4,
        }
    }

    /// Local position of the oldest corner of a red quad.
    pub fn oldest_corner(self) -> Option<usize> {
        match self {
            QuadState::Red1 => Some(0),
            QuadState::Red2 => Some(1),
            QuadState::Red3 => Some(2),
            QuadState::Red4 => Some(3),
            _ => None,
        }
    }

    /// `true` for the two halves of a `Quad2Quad` refinement.
    pub fn is_half(self) -> bool {
        matches!(self, QuadState::Half1 | QuadState::Half2)
    }

    /// State after rotating the vertex list so old position `k` becomes 0.
    pub fn rotate(self, k: usize) -> Self {
        match self {
            QuadState::Root => QuadState::Root,
            QuadState::Half1 | QuadState::Half2 if k % 2 == 0 => self,
            QuadState::Half1 => QuadState::Half2,
            QuadState::Half2 => QuadState::Half1,
            red => match red.oldest_corner() {
                Some(odd) => QuadState::red((odd + 4 - k % 4) % 4),
                None => red,
            },
        }
    }
}

/// Rotate a vertex list so that position `k` becomes position 0.
pub fn rotate_slice<const N: usize>(items: [usize; N], k: usize) -> [usize; N] {
    std::array::from_fn(|i| items[(i + k) % N])
}

/// Rotation that moves the unique oldest corner to position 0, if unique.
pub fn oldest_first_rotation(ages: &[u32]) -> Option<usize> {
    let min = ages.iter().copied().min()?;
    let mut oldest = ages.iter().enumerate().filter(|(_, a)| **a == min);
    let (pos, _) = oldest.next()?;
    if oldest.next().is_some() {
        None
    } else {
        Some(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_and_red_inner() {
        assert_eq!(
            classify_triangle_state([0, 0, 0]),
            TriaClass::Determined(TriaState::Root)
        );
        assert_eq!(
            classify_triangle_state([2, 2, 2]),
            TriaClass::Determined(TriaState::RedInner)
        );
    }

    #[test]
    fn outer_inner_positions() {
        assert_eq!(
            classify_triangle_state([0, 1, 1]),
            TriaClass::Determined(TriaState::OuterInner)
        );
        assert_eq!(
            classify_triangle_state([1, 0, 1]),
            TriaClass::Determined(TriaState::OuterInner1)
        );
        assert_eq!(
            classify_triangle_state([2, 2, 1]),
            TriaClass::Determined(TriaState::OuterInner2)
        );
    }

    #[test]
    fn green_positions_and_ambiguity() {
        assert_eq!(
            classify_triangle_state([1, 0, 0]),
            TriaClass::Determined(TriaState::GreenOuterRight)
        );
        assert_eq!(
            classify_triangle_state([0, 1, 0]),
            TriaClass::Determined(TriaState::GreenOuterLeft)
        );
        assert_eq!(
            classify_triangle_state([0, 0, 1]),
            TriaClass::Determined(TriaState::GreenInner)
        );
        assert_eq!(
            classify_triangle_state([0, 2, 1]),
            TriaClass::Ambiguous { youngest: 1 }
        );
    }

    #[test]
    fn edge_masks_match_states() {
        assert_eq!(edge_equality_mask(&[0u32, 1, 1]), 0b010);
        assert_eq!(TriaState::OuterInner.edge_mask(), 0b010);
        assert_eq!(TriaState::OuterInner2.edge_mask(), 0b001);
        assert_eq!(TriaState::GreenOuterLeft.edge_mask(), 0b100);
        assert_eq!(edge_equality_mask(&[0u32, 1, 1, 1]), 0b0110);
    }

    #[test]
    fn quad_states() {
        assert_eq!(classify_quad_state([0, 0, 0, 0]), Some(QuadState::Root));
        assert_eq!(classify_quad_state([0, 1, 1, 1]), Some(QuadState::Red1));
        assert_eq!(classify_quad_state([1, 1, 0, 1]), Some(QuadState::Red3));
        assert_eq!(classify_quad_state([0, 1, 1, 0]), Some(QuadState::Half2));
        assert_eq!(classify_quad_state([2, 0, 1, 2]), Some(QuadState::Half2));
        assert_eq!(classify_quad_state([1, 1, 0, 0]), Some(QuadState::Half1));
        assert_eq!(classify_quad_state([1, 0, 1, 0]), None);
        assert_eq!(classify_quad_state([3, 1, 1, 1]), None);
    }

    #[test]
    fn rotation_agrees_with_reclassification() {
        let ages = [3u32, 1, 2];
        for k in 0..3 {
            let rotated: [u32; 3] = std::array::from_fn(|i| ages[(i + k) % 3]);
            assert_eq!(
                classify_triangle_state(ages).rotate(k),
                classify_triangle_state(rotated)
            );
        }
        let quad = [1u32, 1, 0, 1];
        for k in 0..4 {
            let rotated: [u32; 4] = std::array::from_fn(|i| quad[(i + k) % 4]);
            assert_eq!(
                classify_quad_state(quad).map(|s| s.rotate(k)),
                classify_quad_state(rotated)
            );
        }
    }

    #[test]
    fn oldest_first() {
        assert_eq!(oldest_first_rotation(&[2, 1, 2]), Some(1));
        assert_eq!(oldest_first_rotation(&[1, 1, 2]), None);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn triangle_rotation_commutes(ages in prop::array::uniform3(0u32..4), k in 0usize..3) {
                let rotated = rotate_slice(ages.map(|a| a as usize), k).map(|a| a as u32);
                prop_assert_eq!(
                    classify_triangle_state(ages).rotate(k),
                    classify_triangle_state(rotated)
                );
            }

            #[test]
            fn quad_rotation_commutes(ages in prop::array::uniform4(0u32..3), k in 0usize..4) {
                let rotated = rotate_slice(ages.map(|a| a as usize), k).map(|a| a as u32);
                prop_assert_eq!(
                    classify_quad_state(ages).map(|s| s.rotate(k)),
                    classify_quad_state(rotated)
                );
            }
        }
    }
}
