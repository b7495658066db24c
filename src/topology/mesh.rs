//! The mutable adaptation state of a 2D triangle/quadrilateral mesh.
//!
//! Vertices and elements are dense, 1-based ids; slot 0 of every table is a
//! dummy so ids index directly and `0` can mean "none" or "boundary".
//! Elements store up to four vertex ids in counter-clockwise order; the
//! fourth slot of a triangle is 0.
//!
//! Across local edge `i` (from vertex `i` to vertex `i + 1`) an element
//! records two neighbours: `neighbours[i]` touches vertex `i`,
//! `mid_neighbours[i]` touches vertex `i + 1`. They are equal unless the
//! edge is bisected by a hanging vertex on the other side.
//!
//! Adjacency is always derived from the vertex lists, the element-at-vertex
//! lists and the coordinate index, see [`Mesh::update_element_neighbours`].

use crate::adapt::observer::{Notifier, OperationKind};
use crate::data::{BoundarySequence, CoordinateIndex, ElementsAtVertex};
use crate::mesh_error::MeshAdaptError;
use crate::topology::cell_type::CellType;
use hashbrown::{HashMap, HashSet};
use itertools::Itertools;

/// Undirected edge key `(min, max)`.
pub fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

/// Adaptation state. See the module docs for the numbering conventions.
#[derive(Clone, Debug)]
pub struct Mesh {
    coords: Vec<[f64; 2]>,
    vertex_age: Vec<u32>,
    locked: Vec<bool>,
    nodal_property: Vec<usize>,
    vertices_at_element: Vec<[usize; 4]>,
    neighbours_at_element: Vec<[usize; 4]>,
    mid_neighbours_at_element: Vec<[usize; 4]>,
    inel_of_type: [usize; 2],
    elements_at_vertex: ElementsAtVertex,
    boundary: BoundarySequence,
    coordinate_index: CoordinateIndex,
}

impl Mesh {
    /// Build a level-0 mesh from coordinates and 1-based connectivity.
    ///
    /// Elements must be counter-clockwise; triangles leave the fourth slot
    /// 0. Adjacency is built from shared edges and the boundary components
    /// are inferred from the edges that only one element uses. Every vertex
    /// gets age 0.
    pub fn new(coords: Vec<[f64; 2]>, elements: &[[usize; 4]]) -> Result<Self, MeshAdaptError> {
        let nvt = coords.len();
        let mut mesh = Mesh {
            coords: std::iter::once([0.0, 0.0]).chain(coords).collect(),
            vertex_age: vec![0; nvt + 1],
            locked: vec![false; nvt + 1],
            nodal_property: vec![0; nvt + 1],
            vertices_at_element: vec![[0; 4]],
            neighbours_at_element: vec![[0; 4]],
            mid_neighbours_at_element: vec![[0; 4]],
            inel_of_type: [0, 0],
            elements_at_vertex: ElementsAtVertex::with_vertices(nvt),
            boundary: BoundarySequence::new(),
            coordinate_index: CoordinateIndex::new(),
        };
        for v in 1..=nvt {
            mesh.coordinate_index.insert(v, mesh.coords[v])?;
        }
        for slots in elements {
            let e = mesh.add_element(*slots)?;
            if mesh.signed_area(e) <= 0.0 {
                return Err(MeshAdaptError::InvalidGeometry(format!(
                    "element {e} is degenerate or not counter-clockwise"
                )));
            }
        }
        if let Some(v) = (1..=nvt).find(|&v| mesh.elements_at_vertex.iter(v).is_empty()) {
            return Err(MeshAdaptError::InvalidGeometry(format!(
                "vertex {v} is not used by any element"
            )));
        }

        let mut sides: HashMap<(usize, usize), Vec<(usize, usize)>> = HashMap::new();
        for e in 1..=mesh.nel() {
            for i in 0..mesh.shape(e).num_vertices() {
                let (a, b) = mesh.edge(e, i);
                sides.entry(edge_key(a, b)).or_default().push((e, i));
            }
        }
        let mut successor: HashMap<usize, usize> = HashMap::new();
        for (key, users) in &sides {
            match users.as_slice() {
                [(e, i)] => {
                    let (a, b) = mesh.edge(*e, *i);
                    if successor.insert(a, b).is_some() {
                        return Err(MeshAdaptError::InvalidGeometry(format!(
                            "boundary vertex {a} starts two boundary edges"
                        )));
                    }
                }
                [(e, i), (f, j)] => {
                    if mesh.edge(*e, *i) == mesh.edge(*f, *j) {
                        return Err(MeshAdaptError::InvalidGeometry(format!(
                            "elements {e} and {f} have opposite orientation"
                        )));
                    }
                    mesh.neighbours_at_element[*e][*i] = *f;
                    mesh.mid_neighbours_at_element[*e][*i] = *f;
                    mesh.neighbours_at_element[*f][*j] = *e;
                    mesh.mid_neighbours_at_element[*f][*j] = *e;
                }
                _ => {
                    return Err(MeshAdaptError::InvalidGeometry(format!(
                        "edge {key:?} is shared by more than two elements"
                    )));
                }
            }
        }

        let starts: Vec<usize> = successor.keys().copied().sorted_unstable().collect();
        let mut visited = HashSet::new();
        for start in starts {
            if visited.contains(&start) {
                continue;
            }
            let mut component = Vec::new();
            let mut v = start;
            loop {
                if !visited.insert(v) {
                    return Err(MeshAdaptError::InvalidGeometry(format!(
                        "boundary loop through vertex {v} does not close"
                    )));
                }
                component.push(v);
                v = *successor.get(&v).ok_or_else(|| {
                    MeshAdaptError::InvalidGeometry(format!("boundary ends at vertex {v}"))
                })?;
                if v == start {
                    break;
                }
            }
            let c = mesh.boundary.add_component(&component)?;
            for &v in &component {
                mesh.nodal_property[v] = c;
            }
        }
        log::debug!(
            "mesh with {} vertices, {} triangles, {} quadrilaterals, {} boundary components",
            mesh.nvt(),
            mesh.inel_of_type[0],
            mesh.inel_of_type[1],
            mesh.boundary.num_components()
        );
        Ok(mesh)
    }

    // ------------------------------------------------------------------
    // accessors

    pub fn nvt(&self) -> usize {
        self.coords.len() - 1
    }

    pub fn nel(&self) -> usize {
        self.vertices_at_element.len() - 1
    }

    pub fn coords(&self, v: usize) -> [f64; 2] {
        self.coords[v]
    }

    pub fn age(&self, v: usize) -> u32 {
        self.vertex_age[v]
    }

    /// Boundary component of `v`, 0 for interior vertices.
    pub fn nodal_property(&self, v: usize) -> usize {
        self.nodal_property[v]
    }

    /// Raw vertex slots of `e`.
    pub fn element(&self, e: usize) -> [usize; 4] {
        self.vertices_at_element[e]
    }

    /// The 3 or 4 vertices of `e`.
    pub fn vertices(&self, e: usize) -> &[usize] {
        let slots = &self.vertices_at_element[e];
        &slots[..self.shape(e).num_vertices()]
    }

    pub fn shape(&self, e: usize) -> CellType {
        if self.vertices_at_element[e][3] == 0 {
            CellType::Triangle
        } else {
            CellType::Quadrilateral
        }
    }

    pub fn neighbours(&self, e: usize) -> [usize; 4] {
        self.neighbours_at_element[e]
    }

    pub fn mid_neighbours(&self, e: usize) -> [usize; 4] {
        self.mid_neighbours_at_element[e]
    }

    /// Neighbour across local edge `i` touching vertex `i`.
    pub fn neighbour(&self, e: usize, i: usize) -> usize {
        self.neighbours_at_element[e][i]
    }

    pub fn inel_of_type(&self, shape: CellType) -> usize {
        self.inel_of_type[shape.index()]
    }

    pub fn elements_at_vertex(&self, v: usize) -> &[usize] {
        self.elements_at_vertex.iter(v)
    }

    pub fn boundary(&self) -> &BoundarySequence {
        &self.boundary
    }

    pub fn coordinate_index(&self) -> &CoordinateIndex {
        &self.coordinate_index
    }

    /// Corner ages of a triangle in local order.
    pub fn tria_ages(&self, e: usize) -> [u32; 3] {
        let s = self.vertices_at_element[e];
        [self.age(s[0]), self.age(s[1]), self.age(s[2])]
    }

    /// Corner ages of a quadrilateral in local order.
    pub fn quad_ages(&self, e: usize) -> [u32; 4] {
        let s = self.vertices_at_element[e];
        [self.age(s[0]), self.age(s[1]), self.age(s[2]), self.age(s[3])]
    }

    /// Refinement level of `e`: the age of its youngest corner.
    pub fn level(&self, e: usize) -> u32 {
        self.vertices(e)
            .iter()
            .map(|&v| self.age(v))
            .max()
            .unwrap_or(0)
    }

    /// Local edge `i` of `e` as `(start, end)`.
    pub fn edge(&self, e: usize, i: usize) -> (usize, usize) {
        let n = self.shape(e).num_vertices();
        let s = self.vertices_at_element[e];
        (s[i % n], s[(i + 1) % n])
    }

    /// Local index of the edge `{a, b}` of `e`, either direction.
    pub fn local_edge(&self, e: usize, a: usize, b: usize) -> Option<usize> {
        let n = self.shape(e).num_vertices();
        (0..n).find(|&i| {
            let (p, q) = self.edge(e, i);
            (p == a && q == b) || (p == b && q == a)
        })
    }

    pub fn signed_area(&self, e: usize) -> f64 {
        let verts = self.vertices(e);
        let n = verts.len();
        0.5 * (0..n)
            .map(|i| {
                let p = self.coords[verts[i]];
                let q = self.coords[verts[(i + 1) % n]];
                p[0] * q[1] - q[0] * p[1]
            })
            .sum::<f64>()
    }

    pub fn edge_length(&self, a: usize, b: usize) -> f64 {
        let p = self.coords[a];
        let q = self.coords[b];
        (q[0] - p[0]).hypot(q[1] - p[1])
    }

    /// Position of the midpoint of `{a, b}`; symmetric in `a` and `b`.
    pub fn midpoint_coords(&self, a: usize, b: usize) -> [f64; 2] {
        let p = self.coords[a];
        let q = self.coords[b];
        [0.5 * (p[0] + q[0]), 0.5 * (p[1] + q[1])]
    }

    /// Position of the centroid of four corners, independent of their order.
    pub fn centroid_coords(&self, corners: &[usize; 4]) -> [f64; 2] {
        let mut pts = corners.map(|v| self.coords[v]);
        pts.sort_by(|p, q| p[0].total_cmp(&q[0]).then(p[1].total_cmp(&q[1])));
        let sum = pts
            .iter()
            .fold([0.0, 0.0], |acc, p| [acc[0] + p[0], acc[1] + p[1]]);
        [0.25 * sum[0], 0.25 * sum[1]]
    }

    /// Existing vertex at the midpoint of `{a, b}`.
    pub fn find_midpoint(&self, a: usize, b: usize) -> Option<usize> {
        self.coordinate_index.search(self.midpoint_coords(a, b))
    }

    /// Existing vertex at the centroid of `corners`.
    pub fn find_centroid(&self, corners: &[usize; 4]) -> Option<usize> {
        self.coordinate_index.search(self.centroid_coords(corners))
    }

    /// Element whose vertex slots are exactly `slots`.
    pub fn find_element(&self, slots: &[usize; 4]) -> Option<usize> {
        if slots[0] == 0 || slots[0] > self.nvt() {
            return None;
        }
        self.elements_at_vertex
            .iter(slots[0])
            .iter()
            .copied()
            .find(|&e| self.vertices_at_element[e] == *slots)
    }

    /// An element other than `exclude` having `{a, b}` as a full edge.
    pub fn element_with_edge(&self, a: usize, b: usize, exclude: usize) -> Option<usize> {
        self.elements_at_vertex
            .iter(a)
            .iter()
            .copied()
            .find(|&f| f != exclude && self.local_edge(f, a, b).is_some())
    }

    /// All elements having `{a, b}` as a full edge.
    pub fn elements_with_edge(&self, a: usize, b: usize) -> Vec<usize> {
        self.elements_at_vertex
            .iter(a)
            .iter()
            .copied()
            .filter(|&f| self.local_edge(f, a, b).is_some())
            .collect()
    }

    /// The edge of `f` that `{a, b}` is one half of.
    pub fn parent_edge(&self, f: usize, a: usize, b: usize) -> Option<(usize, usize)> {
        let n = self.shape(f).num_vertices();
        (0..n).map(|i| self.edge(f, i)).find(|&(p, q)| {
            let mid = self.midpoint_coords(p, q);
            ((p == a || q == a) && mid == self.coords[b])
                || ((p == b || q == b) && mid == self.coords[a])
        })
    }

    /// `true` if `{a, b}` is a segment of a boundary component.
    pub fn is_boundary_edge(&self, a: usize, b: usize) -> bool {
        self.boundary_component_of_edge(a, b).is_some()
    }

    fn boundary_component_of_edge(&self, a: usize, b: usize) -> Option<usize> {
        let c = self.nodal_property[a];
        (c != 0 && c == self.nodal_property[b] && self.boundary.is_segment(c, a, b)).then_some(c)
    }

    // ------------------------------------------------------------------
    // locks

    /// Original vertices are always locked.
    pub fn is_locked(&self, v: usize) -> bool {
        self.vertex_age[v] == 0 || self.locked[v]
    }

    pub fn lock_vertex(&mut self, v: usize) -> bool {
        let was = self.is_locked(v);
        self.locked[v] = true;
        !was
    }

    /// Lock every vertex of `e`; returns `true` if any lock changed.
    pub fn lock_element(&mut self, e: usize) -> bool {
        let slots = self.vertices_at_element[e];
        let n = self.shape(e).num_vertices();
        slots[..n]
            .iter()
            .fold(false, |changed, &v| self.lock_vertex(v) || changed)
    }

    pub fn unlock_all(&mut self) {
        self.locked.iter_mut().for_each(|l| *l = false);
    }

    pub fn num_locked(&self) -> usize {
        (1..=self.nvt()).filter(|&v| self.is_locked(v)).count()
    }

    // ------------------------------------------------------------------
    // vertices

    pub fn check_vertex(&self, v: usize) -> Result<(), MeshAdaptError> {
        if v == 0 || v > self.nvt() {
            Err(MeshAdaptError::InvalidVertex(v))
        } else {
            Ok(())
        }
    }

    pub fn check_element(&self, e: usize) -> Result<(), MeshAdaptError> {
        if e == 0 || e > self.nel() {
            Err(MeshAdaptError::InvalidElement(e))
        } else {
            Ok(())
        }
    }

    fn push_vertex(
        &mut self,
        coords: [f64; 2],
        age: u32,
        component: usize,
    ) -> Result<usize, MeshAdaptError> {
        let v = self.coords.len();
        self.coordinate_index.insert(v, coords)?;
        self.coords.push(coords);
        self.vertex_age.push(age);
        self.locked.push(false);
        self.nodal_property.push(component);
        self.elements_at_vertex.push_vertex();
        Ok(v)
    }

    /// Vertex at the midpoint of `{a, b}`, created if it does not exist yet.
    ///
    /// A new vertex is one generation younger than the younger of `a` and
    /// `b`. It joins the boundary sequence between them when `{a, b}` is a
    /// boundary segment.
    pub fn add_vertex(
        &mut self,
        a: usize,
        b: usize,
        notifier: &mut Notifier<'_>,
    ) -> Result<usize, MeshAdaptError> {
        self.check_vertex(a)?;
        self.check_vertex(b)?;
        let coords = self.midpoint_coords(a, b);
        if let Some(v) = self.coordinate_index.search(coords) {
            return Ok(v);
        }
        let age = 1 + self.age(a).max(self.age(b));
        let component = self.boundary_component_of_edge(a, b);
        let v = self.push_vertex(coords, age, component.unwrap_or(0))?;
        if let Some(c) = component {
            let (prev, next) = match self.boundary.node(c, a) {
                Some(node) if node.next == b => (a, b),
                _ => (b, a),
            };
            let param = self.boundary.midpoint_param(c, prev, next)?;
            self.boundary.insert(c, v, prev, next, param)?;
        }
        log::trace!("vertex {v} (age {age}) at midpoint of {a}-{b}");
        notifier.emit(OperationKind::InsertVertexEdge, &[v, a, b], &[]);
        Ok(v)
    }

    /// Vertex at the centroid of a quadrilateral, created if missing.
    pub fn add_centroid(
        &mut self,
        corners: [usize; 4],
        notifier: &mut Notifier<'_>,
    ) -> Result<usize, MeshAdaptError> {
        for &v in &corners {
            self.check_vertex(v)?;
        }
        let coords = self.centroid_coords(&corners);
        if let Some(v) = self.coordinate_index.search(coords) {
            return Ok(v);
        }
        let age = 1 + corners.iter().map(|&v| self.age(v)).max().unwrap_or(0);
        let v = self.push_vertex(coords, age, 0)?;
        log::trace!("vertex {v} (age {age}) at centroid of {corners:?}");
        let [a, b, c, d] = corners;
        notifier.emit(OperationKind::InsertVertexCentroid, &[v, a, b, c, d], &[]);
        Ok(v)
    }

    /// Remove an unused vertex; the last vertex takes over its id.
    pub fn remove_vertex(
        &mut self,
        v: usize,
        notifier: &mut Notifier<'_>,
    ) -> Result<(), MeshAdaptError> {
        self.check_vertex(v)?;
        if let Some(&e) = self.elements_at_vertex.iter(v).first() {
            return Err(MeshAdaptError::InvalidState {
                element: e,
                state: format!("still uses vertex {v} scheduled for removal"),
            });
        }
        match self.coordinate_index.delete(self.coords[v]) {
            Some(id) if id == v => {}
            _ => return Err(MeshAdaptError::VertexNotFound(v)),
        }
        let c = self.nodal_property[v];
        if c != 0 {
            self.boundary.delete(c, v)?;
        }

        let last = self.nvt();
        self.coords.swap_remove(v);
        self.vertex_age.swap_remove(v);
        self.locked.swap_remove(v);
        self.nodal_property.swap_remove(v);
        self.elements_at_vertex.swap_remove_vertex(v);
        if v != last {
            self.coordinate_index.relabel(self.coords[v], v)?;
            let c = self.nodal_property[v];
            if c != 0 {
                self.boundary.relabel(c, last, v)?;
            }
            for &e in self.elements_at_vertex.iter(v) {
                for slot in self.vertices_at_element[e].iter_mut() {
                    if *slot == last {
                        *slot = v;
                    }
                }
            }
        }
        log::trace!("removed vertex {v} (renumbered {last})");
        notifier.emit(OperationKind::RemoveVertex, &[v, last], &[]);
        Ok(())
    }

    // ------------------------------------------------------------------
    // elements

    fn check_slots(&self, slots: &[usize; 4], e: usize) -> Result<CellType, MeshAdaptError> {
        let shape = CellType::from_slots(slots).ok_or(MeshAdaptError::InvalidElement(e))?;
        let verts = &slots[..shape.num_vertices()];
        if verts.iter().any(|&v| v > self.nvt()) || !verts.iter().all_unique() {
            return Err(MeshAdaptError::InvalidElement(e));
        }
        Ok(shape)
    }

    /// Append an element; its adjacency stays empty until it is relinked.
    pub fn add_element(&mut self, slots: [usize; 4]) -> Result<usize, MeshAdaptError> {
        let e = self.vertices_at_element.len();
        let shape = self.check_slots(&slots, e)?;
        self.vertices_at_element.push(slots);
        self.neighbours_at_element.push([0; 4]);
        self.mid_neighbours_at_element.push([0; 4]);
        self.inel_of_type[shape.index()] += 1;
        for &v in &slots[..shape.num_vertices()] {
            self.elements_at_vertex.append(v, e);
        }
        Ok(e)
    }

    /// Overwrite the vertex list of `e`; its adjacency is cleared.
    pub fn replace_element(&mut self, e: usize, slots: [usize; 4]) -> Result<(), MeshAdaptError> {
        self.check_element(e)?;
        let shape = self.check_slots(&slots, e)?;
        let old_shape = self.shape(e);
        let old = self.vertices_at_element[e];
        for &v in &old[..old_shape.num_vertices()] {
            if !self.elements_at_vertex.delete(v, e) {
                return Err(MeshAdaptError::ElementNotInVertexList { vertex: v, element: e });
            }
        }
        self.inel_of_type[old_shape.index()] -= 1;
        self.inel_of_type[shape.index()] += 1;
        self.vertices_at_element[e] = slots;
        self.neighbours_at_element[e] = [0; 4];
        self.mid_neighbours_at_element[e] = [0; 4];
        for &v in &slots[..shape.num_vertices()] {
            self.elements_at_vertex.append(v, e);
        }
        Ok(())
    }

    /// Remove `e`; the last element takes over its id. Returns the old id of
    /// the moved element, if any.
    pub fn remove_element(&mut self, e: usize) -> Result<Option<usize>, MeshAdaptError> {
        self.check_element(e)?;
        let shape = self.shape(e);
        let slots = self.vertices_at_element[e];
        for &v in &slots[..shape.num_vertices()] {
            if !self.elements_at_vertex.delete(v, e) {
                return Err(MeshAdaptError::ElementNotInVertexList { vertex: v, element: e });
            }
        }
        self.inel_of_type[shape.index()] -= 1;
        self.replace_neighbour_references(e, e, 0);

        let last = self.nel();
        self.vertices_at_element.swap_remove(e);
        self.neighbours_at_element.swap_remove(e);
        self.mid_neighbours_at_element.swap_remove(e);
        if e == last {
            return Ok(None);
        }
        let moved = self.vertices_at_element[e];
        for &v in &moved[..self.shape(e).num_vertices()] {
            if !self.elements_at_vertex.replace(v, last, e) {
                return Err(MeshAdaptError::ElementNotInVertexList {
                    vertex: v,
                    element: last,
                });
            }
        }
        self.update_all_element_neighbours(last, e);
        log::trace!("removed element {e} (renumbered {last})");
        Ok(Some(last))
    }

    /// After element `old` was renumbered to `new`, rewrite every adjacency
    /// entry that still refers to `old`.
    pub fn update_all_element_neighbours(&mut self, old: usize, new: usize) {
        self.replace_neighbour_references(new, old, new);
    }

    /// In every neighbour of `around`, replace references to `from` by `to`.
    fn replace_neighbour_references(&mut self, around: usize, from: usize, to: usize) {
        let referrers: Vec<usize> = self.neighbours_at_element[around]
            .iter()
            .chain(self.mid_neighbours_at_element[around].iter())
            .copied()
            .filter(|&f| f != 0 && f != around)
            .unique()
            .collect();
        for f in referrers {
            for slot in self.neighbours_at_element[f]
                .iter_mut()
                .chain(self.mid_neighbours_at_element[f].iter_mut())
            {
                if *slot == from {
                    *slot = to;
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // adjacency

    /// Recompute both neighbour arrays of `e` from the current topology.
    ///
    /// For every edge `{a, b}` of `e`, in this order:
    /// 1. another element sharing the full edge;
    /// 2. the two elements on the halves `{a, m}` and `{m, b}` when the
    ///    midpoint `m` exists (a hanging vertex on the other side);
    /// 3. a coarser element having `{a, b}` as one half of its own edge;
    /// 4. otherwise the boundary, `0`.
    pub fn update_element_neighbours(&mut self, e: usize) -> Result<(), MeshAdaptError> {
        self.check_element(e)?;
        let n = self.shape(e).num_vertices();
        let mut nb = [0; 4];
        let mut mid = [0; 4];
        for i in 0..n {
            let (a, b) = self.edge(e, i);
            (nb[i], mid[i]) = self.find_edge_neighbours(e, a, b);
        }
        self.neighbours_at_element[e] = nb;
        self.mid_neighbours_at_element[e] = mid;
        Ok(())
    }

    pub(crate) fn find_edge_neighbours(&self, e: usize, a: usize, b: usize) -> (usize, usize) {
        if let Some(f) = self.element_with_edge(a, b, e) {
            return (f, f);
        }
        if let Some(m) = self.find_midpoint(a, b) {
            if let (Some(f1), Some(f2)) = (
                self.element_with_edge(a, m, e),
                self.element_with_edge(m, b, e),
            ) {
                return (f1, f2);
            }
        }
        self.coarse_neighbour(e, a, b).map_or((0, 0), |f| (f, f))
    }

    fn coarse_neighbour(&self, e: usize, a: usize, b: usize) -> Option<usize> {
        [(a, b), (b, a)].into_iter().find_map(|(p, q)| {
            self.elements_at_vertex
                .iter(p)
                .iter()
                .copied()
                .filter(|&f| f != e)
                .find(|&f| {
                    let verts = self.vertices(f);
                    let n = verts.len();
                    verts.iter().position(|&v| v == p).is_some_and(|j| {
                        [verts[(j + 1) % n], verts[(j + n - 1) % n]]
                            .into_iter()
                            .any(|c| self.midpoint_coords(p, c) == self.coords[q])
                    })
                })
        })
    }

    /// Recompute adjacency of `elements` and of every element sharing a
    /// vertex with them.
    pub fn relink(&mut self, elements: &[usize]) -> Result<(), MeshAdaptError> {
        let mut around = Vec::new();
        for &e in elements {
            self.check_element(e)?;
            around.push(e);
            for &v in self.vertices(e) {
                around.extend_from_slice(self.elements_at_vertex.iter(v));
            }
        }
        around.sort_unstable();
        around.dedup();
        for e in around {
            self.update_element_neighbours(e)?;
        }
        Ok(())
    }

    /// Recompute the adjacency of every element.
    pub fn relink_all(&mut self) -> Result<(), MeshAdaptError> {
        for e in 1..=self.nel() {
            self.update_element_neighbours(e)?;
        }
        Ok(())
    }

    /// Grow the backing tables ahead of a pass.
    pub fn try_reserve(
        &mut self,
        vertices: usize,
        elements: usize,
        notifier: &mut Notifier<'_>,
    ) -> Result<(), MeshAdaptError> {
        self.coords.try_reserve(vertices)?;
        self.vertex_age.try_reserve(vertices)?;
        self.locked.try_reserve(vertices)?;
        self.nodal_property.try_reserve(vertices)?;
        self.elements_at_vertex.try_reserve(vertices)?;
        self.vertices_at_element.try_reserve(elements)?;
        self.neighbours_at_element.try_reserve(elements)?;
        self.mid_neighbours_at_element.try_reserve(elements)?;
        if vertices > 0 {
            notifier.emit(
                OperationKind::AdjustVertexDimension,
                &[self.nvt(), self.coords.capacity() - 1],
                &[],
            );
        }
        Ok(())
    }
}
