//! Reference subdivision templates.
//!
//! Every template takes the macro corners `v1..vn` in counter-clockwise
//! order and the refinement vertices (`mk` is the midpoint of the edge from
//! `vk` to `vk+1`, `c` the centroid) and returns the children as element
//! slot arrays. The first child always reuses the macro element's slot.
//!
//! The vertex order inside each child is fixed: it is what lets the state
//! classifier read a child's role from the position of its youngest
//! corners.

/// Which diagonal splits the quadrilateral left over by a `Tria3Tria`
/// refinement.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Diagonal {
    /// From `m1` to `v3`.
    A,
    /// From `m3` to `v2`.
    B,
}

pub type Slots = [usize; 4];

/// Regular 1→4 triangle subdivision: inner, then the corners 1, 2, 3.
pub fn tria4tria(v: [usize; 3], m: [usize; 3]) -> [Slots; 4] {
    let [v1, v2, v3] = v;
    let [m1, m2, m3] = m;
    [
        [m1, m2, m3, 0],
        [v1, m1, m3, 0],
        [v2, m2, m1, 0],
        [v3, m3, m2, 0],
    ]
}

/// Bisection of edge 1: left child, right child.
pub fn tria2tria(v: [usize; 3], m1: usize) -> [Slots; 2] {
    let [v1, v2, v3] = v;
    [[v1, m1, v3, 0], [m1, v2, v3, 0]]
}

/// Bisection of edges 1 and 3: corner child at `v1`, inner child, outer
/// child.
pub fn tria3tria(v: [usize; 3], m1: usize, m3: usize, diagonal: Diagonal) -> [Slots; 3] {
    let [v1, v2, v3] = v;
    match diagonal {
        Diagonal::A => [[v1, m1, m3, 0], [m3, m1, v3, 0], [m1, v2, v3, 0]],
        Diagonal::B => [[v1, m1, m3, 0], [m3, m1, v2, 0], [v3, m3, v2, 0]],
    }
}

/// Regular 1→4 quadrilateral subdivision; child `i` keeps corner `i`.
pub fn quad4quad(v: [usize; 4], m: [usize; 4], c: usize) -> [Slots; 4] {
    std::array::from_fn(|i| [v[i], m[i], c, m[(i + 3) % 4]])
}

/// Bisection of the opposite edges 1 and 3.
pub fn quad2quad(v: [usize; 4], m1: usize, m3: usize) -> [Slots; 2] {
    let [v1, v2, v3, v4] = v;
    [[v1, m1, m3, v4], [m1, v2, v3, m3]]
}

/// Bisection of edge 1 joined to the opposite corners: left, right, inner.
pub fn quad3tria(v: [usize; 4], m1: usize) -> [Slots; 3] {
    let [v1, v2, v3, v4] = v;
    [[v1, m1, v4, 0], [m1, v2, v3, 0], [v3, v4, m1, 0]]
}

/// Bisection of the adjacent edges 1 and 2: left, corner, right, centre.
pub fn quad4tria(v: [usize; 4], m1: usize, m2: usize) -> [Slots; 4] {
    let [v1, v2, v3, v4] = v;
    [
        [v1, m1, v4, 0],
        [m1, v2, m2, 0],
        [m2, v3, v4, 0],
        [m1, m2, v4, 0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_children_keep_their_corner_first() {
        let children = quad4quad([1, 2, 3, 4], [5, 6, 7, 8], 9);
        assert_eq!(children[0], [1, 5, 9, 8]);
        assert_eq!(children[2], [3, 7, 9, 6]);
        let trias = tria4tria([1, 2, 3], [4, 5, 6]);
        assert_eq!(trias[0], [4, 5, 6, 0]);
        assert_eq!(trias[3], [3, 6, 5, 0]);
    }

    #[test]
    fn green_children_share_internal_edges() {
        let [left, right] = tria2tria([1, 2, 3], 4);
        assert!(left.contains(&4) && right.contains(&4));
        let [k, x, r] = tria3tria([1, 2, 3], 4, 5, Diagonal::A);
        assert_eq!(k, [1, 4, 5, 0]);
        assert_eq!(x, [5, 4, 3, 0]);
        assert_eq!(r, [4, 2, 3, 0]);
        let [_, _, inner] = quad3tria([1, 2, 3, 4], 5);
        assert_eq!(inner, [3, 4, 5, 0]);
    }
}
