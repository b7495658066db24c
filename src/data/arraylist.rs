//! Element-at-vertex association list.
//!
//! A multi-map from a vertex id to the ordered list of incident element ids.
//! Vertex ids are 1-based; slot 0 is kept empty so ids index directly.

/// Vertex → incident elements.
#[derive(Clone, Debug)]
pub struct ElementsAtVertex {
    lists: Vec<Vec<usize>>,
}

impl Default for ElementsAtVertex {
    fn default() -> Self {
        Self {
            lists: vec![Vec::new()],
        }
    }
}

impl ElementsAtVertex {
    /// Create a list for `nvt` vertices without any incidence.
    pub fn with_vertices(nvt: usize) -> Self {
        Self {
            lists: vec![Vec::new(); nvt + 1],
        }
    }

    /// Number of vertices tracked.
    pub fn num_vertices(&self) -> usize {
        self.lists.len() - 1
    }

    /// Track one more vertex (it becomes the last id).
    pub fn push_vertex(&mut self) {
        self.lists.push(Vec::new());
    }

    /// Reserve room for `additional` vertices.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), std::collections::TryReserveError> {
        self.lists.try_reserve(additional)
    }

    /// Append `element` to the list of `vertex`.
    pub fn append(&mut self, vertex: usize, element: usize) {
        self.lists[vertex].push(element);
    }

    /// Delete `element` from the list of `vertex`; `false` if it was absent.
    pub fn delete(&mut self, vertex: usize, element: usize) -> bool {
        let list = &mut self.lists[vertex];
        match list.iter().position(|&e| e == element) {
            Some(pos) => {
                list.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Replace `old` by `new` in the list of `vertex`; `false` if `old` was absent.
    pub fn replace(&mut self, vertex: usize, old: usize, new: usize) -> bool {
        match self.lists[vertex].iter_mut().find(|e| **e == old) {
            Some(slot) => {
                *slot = new;
                true
            }
            None => false,
        }
    }

    /// Elements incident to `vertex`.
    pub fn iter(&self, vertex: usize) -> &[usize] {
        &self.lists[vertex]
    }

    /// Drop `vertex` by moving the list of the last vertex into its slot.
    pub fn swap_remove_vertex(&mut self, vertex: usize) {
        self.lists.swap_remove(vertex);
    }
}
