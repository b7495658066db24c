//! Boundary sequences: one closed, ordered vertex loop per boundary component.
//!
//! Every boundary vertex stores its predecessor, its successor and a real
//! parameter value. Original boundary vertices of a component with `n`
//! vertices carry the parameters `0, 1, ..., n - 1`; the component is
//! periodic with period `n`.

use crate::mesh_error::MeshAdaptError;
use hashbrown::HashMap;

/// One entry of a boundary loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryNode {
    /// Previous vertex along the loop.
    pub prev: usize,
    /// Next vertex along the loop.
    pub next: usize,
    /// Parameter value in `[0, period)`.
    pub param: f64,
}

#[derive(Clone, Debug, Default)]
struct BoundaryLoop {
    nodes: HashMap<usize, BoundaryNode>,
    period: f64,
}

/// All boundary loops of a mesh. Components are numbered from 1.
#[derive(Clone, Debug, Default)]
pub struct BoundarySequence {
    loops: Vec<BoundaryLoop>,
}

impl BoundarySequence {
    /// Create an empty sequence without components.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a closed loop through `vertices` (in order) and return its
    /// component id. Parameters are the loop positions.
    pub fn add_component(&mut self, vertices: &[usize]) -> Result<usize, MeshAdaptError> {
        if vertices.len() < 2 {
            return Err(MeshAdaptError::InvalidGeometry(format!(
                "boundary loop needs at least two vertices, got {}",
                vertices.len()
            )));
        }
        let n = vertices.len();
        let mut nodes = HashMap::with_capacity(n);
        for (i, &v) in vertices.iter().enumerate() {
            let node = BoundaryNode {
                prev: vertices[(i + n - 1) % n],
                next: vertices[(i + 1) % n],
                param: i as f64,
            };
            if nodes.insert(v, node).is_some() {
                return Err(MeshAdaptError::InvalidGeometry(format!(
                    "vertex {v} occurs twice in one boundary loop"
                )));
            }
        }
        self.loops.push(BoundaryLoop {
            nodes,
            period: n as f64,
        });
        Ok(self.loops.len())
    }

    /// Number of boundary components.
    pub fn num_components(&self) -> usize {
        self.loops.len()
    }

    /// Number of vertices currently on `component`.
    pub fn len(&self, component: usize) -> usize {
        self.get_loop(component).map_or(0, |l| l.nodes.len())
    }

    /// `true` if there are no components.
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    fn get_loop(&self, component: usize) -> Option<&BoundaryLoop> {
        component.checked_sub(1).and_then(|c| self.loops.get(c))
    }

    fn loop_mut(&mut self, component: usize) -> Result<&mut BoundaryLoop, MeshAdaptError> {
        component
            .checked_sub(1)
            .and_then(|c| self.loops.get_mut(c))
            .ok_or_else(|| {
                MeshAdaptError::InvalidGeometry(format!("no boundary component {component}"))
            })
    }

    /// Entry of `vertex` on `component`.
    pub fn node(&self, component: usize, vertex: usize) -> Option<BoundaryNode> {
        self.get_loop(component)
            .and_then(|l| l.nodes.get(&vertex))
            .copied()
    }

    /// `(prev, next)` of `vertex` on `component`.
    pub fn find_neighbours(&self, component: usize, vertex: usize) -> Option<(usize, usize)> {
        self.node(component, vertex).map(|n| (n.prev, n.next))
    }

    /// Period of the parametrization of `component`.
    pub fn period(&self, component: usize) -> Option<f64> {
        self.get_loop(component).map(|l| l.period)
    }

    /// `true` if `a` and `b` are consecutive on `component` (in either order).
    pub fn is_segment(&self, component: usize, a: usize, b: usize) -> bool {
        match self.node(component, a) {
            Some(node) => node.next == b || node.prev == b,
            None => false,
        }
    }

    /// Parameter for a new vertex halfway between `prev` and `next`.
    ///
    /// If the parameter of `next` does not exceed the one of `prev` the
    /// segment crosses the seam of the parametrization and `next` is shifted
    /// by one period before averaging.
    pub fn midpoint_param(
        &self,
        component: usize,
        prev: usize,
        next: usize,
    ) -> Result<f64, MeshAdaptError> {
        let first = self
            .node(component, prev)
            .ok_or(MeshAdaptError::VertexNotOnBoundary {
                vertex: prev,
                component,
            })?;
        let second = self
            .node(component, next)
            .ok_or(MeshAdaptError::VertexNotOnBoundary {
                vertex: next,
                component,
            })?;
        let period = self.period(component).unwrap_or(0.0);
        let mut p2 = second.param;
        if p2 <= first.param {
            p2 += period;
        }
        let param = 0.5 * (first.param + p2);
        Ok(if param >= period { param - period } else { param })
    }

    /// Insert `vertex` between the consecutive vertices `prev` and `next`.
    pub fn insert(
        &mut self,
        component: usize,
        vertex: usize,
        prev: usize,
        next: usize,
        param: f64,
    ) -> Result<(), MeshAdaptError> {
        let lp = self.loop_mut(component)?;
        match lp.nodes.get(&prev) {
            Some(node) if node.next == next => {}
            _ => {
                return Err(MeshAdaptError::VertexNotOnBoundary {
                    vertex: prev,
                    component,
                })
            }
        }
        lp.nodes.insert(vertex, BoundaryNode { prev, next, param });
        if let Some(node) = lp.nodes.get_mut(&prev) {
            node.next = vertex;
        }
        if let Some(node) = lp.nodes.get_mut(&next) {
            node.prev = vertex;
        }
        Ok(())
    }

    /// Remove `vertex`, reconnecting its predecessor and successor.
    pub fn delete(&mut self, component: usize, vertex: usize) -> Result<(), MeshAdaptError> {
        let lp = self.loop_mut(component)?;
        let node = lp
            .nodes
            .remove(&vertex)
            .ok_or(MeshAdaptError::VertexNotOnBoundary { vertex, component })?;
        if let Some(p) = lp.nodes.get_mut(&node.prev) {
            p.next = node.next;
        }
        if let Some(n) = lp.nodes.get_mut(&node.next) {
            n.prev = node.prev;
        }
        Ok(())
    }

    /// Rename vertex `old` to `new` (vertex renumbering).
    pub fn relabel(&mut self, component: usize, old: usize, new: usize) -> Result<(), MeshAdaptError> {
        let lp = self.loop_mut(component)?;
        let node = lp.nodes.remove(&old).ok_or(MeshAdaptError::VertexNotOnBoundary {
            vertex: old,
            component,
        })?;
        if let Some(p) = lp.nodes.get_mut(&node.prev) {
            p.next = new;
        }
        if let Some(n) = lp.nodes.get_mut(&node.next) {
            n.prev = new;
        }
        // a two-vertex loop points at itself through prev and next
        let node = BoundaryNode {
            prev: if node.prev == old { new } else { node.prev },
            next: if node.next == old { new } else { node.next },
            param: node.param,
        };
        lp.nodes.insert(new, node);
        Ok(())
    }

    /// Vertices of `component` in loop order, starting at the smallest
    /// parameter.
    pub fn ordered(&self, component: usize) -> Vec<usize> {
        let Some(lp) = self.get_loop(component) else {
            return Vec::new();
        };
        let Some((&start, _)) = lp
            .nodes
            .iter()
            .min_by(|a, b| a.1.param.total_cmp(&b.1.param))
        else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(lp.nodes.len());
        let mut v = start;
        loop {
            out.push(v);
            v = lp.nodes[&v].next;
            if v == start || out.len() > lp.nodes.len() {
                break;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_delete_splice_the_loop() {
        let mut bnd = BoundarySequence::new();
        let c = bnd.add_component(&[1, 2, 3, 4]).unwrap();
        let p = bnd.midpoint_param(c, 2, 3).unwrap();
        assert_eq!(p, 1.5);
        bnd.insert(c, 9, 2, 3, p).unwrap();
        assert_eq!(bnd.ordered(c), vec![1, 2, 9, 3, 4]);
        bnd.delete(c, 9).unwrap();
        assert_eq!(bnd.find_neighbours(c, 2), Some((1, 3)));
    }

    #[test]
    fn seam_midpoint_wraps_around() {
        let mut bnd = BoundarySequence::new();
        let c = bnd.add_component(&[1, 2, 3, 4]).unwrap();
        // segment 4 -> 1 goes from 3.0 to 0.0 == 4.0
        assert_eq!(bnd.midpoint_param(c, 4, 1).unwrap(), 3.5);
        bnd.insert(c, 5, 4, 1, 3.5).unwrap();
        assert_eq!(bnd.midpoint_param(c, 5, 1).unwrap(), 3.75);
    }

    #[test]
    fn seam_shift_is_one_period() {
        let mut bnd = BoundarySequence::new();
        let c = bnd.add_component(&[1, 2, 3]).unwrap();
        // rounding 2.0 up would give 2.0 again; shifting 0.0 by 3 gives 2.5
        assert_eq!(bnd.midpoint_param(c, 3, 1).unwrap(), 2.5);
        bnd.insert(c, 4, 3, 1, 2.5).unwrap();
        let p = bnd.midpoint_param(c, 4, 1).unwrap();
        bnd.insert(c, 5, 4, 1, p).unwrap();
        assert_eq!(bnd.node(c, 5).map(|n| n.param), Some(2.75));
        assert_eq!(bnd.ordered(c), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn insert_requires_consecutive_vertices() {
        let mut bnd = BoundarySequence::new();
        let c = bnd.add_component(&[1, 2, 3]).unwrap();
        assert!(bnd.insert(c, 7, 1, 3, 0.5).is_err());
        assert!(bnd.is_segment(c, 3, 1));
    }

    #[test]
    fn relabel_keeps_links() {
        let mut bnd = BoundarySequence::new();
        let c = bnd.add_component(&[1, 2, 3]).unwrap();
        bnd.relabel(c, 3, 8).unwrap();
        assert_eq!(bnd.find_neighbours(c, 1), Some((8, 2)));
        assert_eq!(bnd.ordered(c), vec![1, 2, 8]);
    }
}
