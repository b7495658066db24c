//! Marking for refinement.
//!
//! Edges are marked rather than elements: an element above the refinement
//! tolerance marks all of its edges, and every element sharing a marked edge
//! sees the mark. Propagation runs to a fixed point over a double-buffered
//! set of modified elements:
//!
//! * a green element with a marked edge is converted to red children, which
//!   bisects further macro edges,
//! * a red triangle with two marked edges is optionally escalated to three,
//! * a red quadrilateral with three marked edges gets the fourth,
//! * a marked half edge of a coarser neighbour marks the neighbour's full
//!   edge.
//!
//! Afterwards every element's marked edges map to exactly one template.

use crate::adapt::AdaptOptions;
use crate::adapt::convert::{convert_patch, newly_bisected_edges};
use crate::adapt::marker::{QuadRefinement, RefineMarker};
use crate::adapt::observer::Notifier;
use crate::mesh_error::MeshAdaptError;
use crate::topology::cell_type::CellType;
use crate::topology::mesh::{Mesh, edge_key};
use crate::topology::patch::{Patch, Role, element_role};
use hashbrown::HashSet;

/// Result of [`mark_refinement`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RefineMarking {
    /// One marker per element, index 0 unused.
    pub markers: Vec<RefineMarker>,
    /// Number of vertices the markers will create.
    pub increase_nvt: usize,
    /// Vertex count the markers were computed for.
    pub nvt: usize,
    /// For every element, the element of the input mesh it descends from.
    /// Conversions during marking can append elements.
    pub element_origin: Vec<usize>,
    /// Number of green patches converted while marking.
    pub conversions: usize,
}

impl RefineMarking {
    pub fn num_marked(&self) -> usize {
        self.markers.iter().filter(|m| !m.is_as_is()).count()
    }
}

struct EdgeMarks {
    edges: HashSet<(usize, usize)>,
    /// Elements touched since the last sweep.
    modified: Vec<bool>,
}

impl EdgeMarks {
    fn new(nel: usize) -> Self {
        EdgeMarks {
            edges: HashSet::new(),
            modified: vec![false; nel + 1],
        }
    }

    fn flag(&mut self, e: usize) {
        if e >= self.modified.len() {
            self.modified.resize(e + 1, false);
        }
        self.modified[e] = true;
    }

    /// Mark edge `{a, b}` and flag the elements that own it.
    fn mark(&mut self, mesh: &Mesh, a: usize, b: usize) -> bool {
        if !self.edges.insert(edge_key(a, b)) {
            return false;
        }
        for f in mesh.elements_with_edge(a, b) {
            self.flag(f);
        }
        true
    }

    fn is_marked(&self, a: usize, b: usize) -> bool {
        self.edges.contains(&edge_key(a, b))
    }

    /// Bitmask of the marked local edges of `e`.
    fn mask(&self, mesh: &Mesh, e: usize) -> u8 {
        let mut mask = 0u8;
        for i in 0..mesh.shape(e).num_vertices() {
            let (a, b) = mesh.edge(e, i);
            if self.is_marked(a, b) {
                mask |= 1 << i;
            }
        }
        mask
    }

    fn take_modified(&mut self, nel: usize) -> Vec<bool> {
        std::mem::replace(&mut self.modified, vec![false; nel + 1])
    }
}

/// Convert `patch` and mark the macro edges the conversion bisects.
fn convert_marked(
    mesh: &mut Mesh,
    patch: &Patch,
    marks: &mut EdgeMarks,
    origin: &mut Vec<usize>,
    notifier: &mut Notifier<'_>,
) -> Result<(), MeshAdaptError> {
    let corners = patch.corners.clone();
    let n = corners.len();
    let inherited = origin[patch.holder()];
    let children = convert_patch(mesh, patch, notifier)?;
    for &c in &children {
        mesh.lock_element(c);
        if c >= origin.len() {
            origin.push(inherited);
        }
        marks.flag(c);
    }
    for &i in newly_bisected_edges(patch.kind) {
        marks.mark(mesh, corners[i], corners[(i + 1) % n]);
    }
    Ok(())
}

/// Select refinement markers for `mesh` from one indicator value per
/// element.
///
/// Green patches are converted in place while marking, so the element table
/// on return may be larger than the indicator. Vertices of marked elements
/// are locked.
pub fn mark_refinement(
    mesh: &mut Mesh,
    indicator: &[f64],
    options: &AdaptOptions,
    notifier: &mut Notifier<'_>,
) -> Result<RefineMarking, MeshAdaptError> {
    let nel0 = mesh.nel();
    if indicator.len() != nel0 {
        return Err(MeshAdaptError::IndicatorLengthMismatch {
            expected: nel0,
            found: indicator.len(),
        });
    }
    let mut origin: Vec<usize> = (0..=nel0).collect();
    let mut marks = EdgeMarks::new(nel0);
    let mut green_seeds = Vec::new();
    let mut conversions = 0;

    for e in 1..=nel0 {
        let value = indicator[e - 1];
        if value.is_nan() {
            log::warn!("indicator of element {e} is NaN; keeping it as is");
            continue;
        }
        if value <= options.refine_tolerance {
            continue;
        }
        mesh.lock_element(e);
        match element_role(mesh, e)? {
            Role::Red if mesh.level(e) < options.max_subdivision => {
                for i in 0..mesh.shape(e).num_vertices() {
                    let (a, b) = mesh.edge(e, i);
                    marks.mark(mesh, a, b);
                }
            }
            Role::Red => log::trace!("element {e} is at the maximum subdivision level"),
            Role::Green(_) => green_seeds.push(e),
        }
    }
    for e in green_seeds {
        // an earlier conversion may already have covered this patch
        if e > mesh.nel() {
            continue;
        }
        if let Role::Green(patch) = element_role(mesh, e)? {
            convert_marked(mesh, &patch, &mut marks, &mut origin, notifier)?;
            conversions += 1;
        }
    }

    loop {
        let current = marks.take_modified(mesh.nel());
        if !current.iter().any(|&f| f) {
            break;
        }
        for e in (1..current.len()).filter(|&e| current[e]) {
            if e > mesh.nel() {
                continue;
            }
            let mask = marks.mask(mesh, e);
            if mask == 0 {
                continue;
            }
            match element_role(mesh, e)? {
                Role::Green(patch) => {
                    convert_marked(mesh, &patch, &mut marks, &mut origin, notifier)?;
                    conversions += 1;
                }
                Role::Red => propagate_red(mesh, e, mask, options, &mut marks),
            }
        }
    }

    let nel = mesh.nel();
    let mut markers = vec![RefineMarker::AsIs; nel + 1];
    let mut new_edges: HashSet<(usize, usize)> = HashSet::new();
    let mut new_centroids = 0;
    for e in 1..=nel {
        let mask = marks.mask(mesh, e);
        if mask == 0 {
            continue;
        }
        if let Role::Green(patch) = element_role(mesh, e)? {
            return Err(MeshAdaptError::InvalidState {
                element: e,
                state: format!("{:?} child with marked edges", patch.kind),
            });
        }
        let shape = mesh.shape(e);
        let marker = match shape {
            CellType::Triangle => RefineMarker::for_triangle(mask),
            CellType::Quadrilateral => RefineMarker::for_quad(mask),
        }
        .ok_or_else(|| MeshAdaptError::InvalidMarker {
            element: e,
            marker: format!("edge mask {mask:#06b}"),
        })?;
        for i in (0..shape.num_vertices()).filter(|i| mask & (1 << i) != 0) {
            let (a, b) = mesh.edge(e, i);
            if mesh.find_midpoint(a, b).is_none() {
                new_edges.insert(edge_key(a, b));
            }
        }
        if marker == RefineMarker::Quad(QuadRefinement::Quad4Quad)
            && mesh.find_centroid(&mesh.element(e)).is_none()
        {
            new_centroids += 1;
        }
        mesh.lock_element(e);
        markers[e] = marker;
    }

    let marking = RefineMarking {
        markers,
        increase_nvt: new_edges.len() + new_centroids,
        nvt: mesh.nvt(),
        element_origin: origin,
        conversions,
    };
    log::debug!(
        "marked {} of {nel} elements for refinement ({} conversions, {} new vertices)",
        marking.num_marked(),
        marking.conversions,
        marking.increase_nvt
    );
    Ok(marking)
}

/// Closure rules for a red element with marked edges.
fn propagate_red(mesh: &Mesh, e: usize, mask: u8, options: &AdaptOptions, marks: &mut EdgeMarks) {
    let n = mesh.shape(e).num_vertices();
    let escalate = match mesh.shape(e) {
        CellType::Triangle => options.escalate_tria3tria && mask.count_ones() == 2,
        CellType::Quadrilateral => mask.count_ones() == 3,
    };
    if escalate {
        for i in 0..n {
            let (a, b) = mesh.edge(e, i);
            marks.mark(mesh, a, b);
        }
    }
    let mask = marks.mask(mesh, e);
    let (nb, mid) = (mesh.neighbours(e), mesh.mid_neighbours(e));
    for i in (0..n).filter(|i| mask & (1 << i) != 0) {
        let (a, b) = mesh.edge(e, i);
        let f = nb[i];
        // our edge is half of a longer edge of f
        if f != 0 && f == mid[i] && mesh.local_edge(f, a, b).is_none() {
            if let Some((p, q)) = mesh.parent_edge(f, a, b) {
                marks.mark(mesh, p, q);
            }
        }
    }
}
