//! Structural-change notification.
//!
//! Every atomic edit of a [`Mesh`](crate::topology::mesh::Mesh) (vertex
//! insertion or removal) and every completed operator invocation is reported
//! to an optional [`MeshObserver`]. Operators report once, after all their
//! mutations are done.

use std::fmt;

/// Kind of a structural change.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum OperationKind {
    /// New vertex at the midpoint of an edge: `[new, a, b]`.
    InsertVertexEdge,
    /// New vertex at the centroid of a quadrilateral: `[new, v1, v2, v3, v4]`.
    InsertVertexCentroid,
    /// Vertex removed; `[removed, moved_from]` (equal if nothing moved).
    RemoveVertex,
    /// Backing arrays grown: `[nvt, capacity]`.
    AdjustVertexDimension,
    RefineTria2Tria,
    RefineTria3Tria,
    RefineTria4Tria,
    RefineQuad2Quad,
    RefineQuad3Tria,
    RefineQuad4Tria,
    RefineQuad4Quad,
    ConvertTria2Tria,
    ConvertTria3Tria,
    ConvertQuad2Quad,
    ConvertQuad3Tria,
    ConvertQuad4Tria,
    Coarsen2Tria1Tria,
    Coarsen3Tria1Tria,
    Coarsen4Tria1Tria,
    Coarsen4Tria2Tria,
    Coarsen4Quad1Quad,
    Coarsen4Quad2Quad,
    Coarsen4Quad3Tria,
    Coarsen4Quad4Tria,
    Coarsen2Quad1Quad,
    Coarsen2Quad3Tria,
    Coarsen3Tria1Quad,
    Coarsen4Tria1Quad,
    Coarsen4Tria3Tria,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Payload handed to a [`MeshObserver`].
#[derive(Clone, Copy, Debug)]
pub struct MeshEvent<'a> {
    pub kind: OperationKind,
    /// Vertices involved, new ones first.
    pub vertices: &'a [usize],
    /// Elements written or created by the operation (after renumbering).
    pub elements: &'a [usize],
}

/// Receiver of structural changes. Must not re-enter the adaptation engine.
pub trait MeshObserver {
    fn notify(&mut self, event: &MeshEvent<'_>);
}

impl<F> MeshObserver for F
where
    F: FnMut(&MeshEvent<'_>),
{
    fn notify(&mut self, event: &MeshEvent<'_>) {
        self(event)
    }
}

/// Optional observer threaded through every mutating call.
pub struct Notifier<'a> {
    observer: Option<&'a mut dyn MeshObserver>,
}

impl<'a> Notifier<'a> {
    pub fn new(observer: Option<&'a mut dyn MeshObserver>) -> Self {
        Self { observer }
    }

    /// A notifier that drops every event.
    pub fn silent() -> Self {
        Self { observer: None }
    }

    pub fn is_active(&self) -> bool {
        self.observer.is_some()
    }

    pub fn emit(&mut self, kind: OperationKind, vertices: &[usize], elements: &[usize]) {
        if let Some(observer) = self.observer.as_deref_mut() {
            observer.notify(&MeshEvent {
                kind,
                vertices,
                elements,
            });
        }
    }
}

impl fmt::Debug for Notifier<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Owned copy of a [`MeshEvent`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedEvent {
    pub kind: OperationKind,
    pub vertices: Vec<usize>,
    pub elements: Vec<usize>,
}

/// Observer that records every event, mostly useful in tests.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    pub events: Vec<RecordedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded events of `kind`.
    pub fn count(&self, kind: OperationKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    /// Kinds in recording order.
    pub fn kinds(&self) -> Vec<OperationKind> {
        self.events.iter().map(|e| e.kind).collect()
    }
}

impl MeshObserver for EventLog {
    fn notify(&mut self, event: &MeshEvent<'_>) {
        self.events.push(RecordedEvent {
            kind: event.kind,
            vertices: event.vertices.to_vec(),
            elements: event.elements.to_vec(),
        });
    }
}
