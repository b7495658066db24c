//! MeshAdaptError: Unified error type for mesh-hadapt public APIs
//!
//! Every condition reported here is fatal for the adaptation call that
//! produced it. Operators mutate shared adjacency arrays in place and there
//! is no rollback, so a mesh that produced an error must be discarded.

use std::collections::TryReserveError;
use thiserror::Error;

/// Unified error type for mesh adaptation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshAdaptError {
    /// An element was expected in the element-at-vertex list of a vertex.
    #[error("unable to find element {element} in the element list of vertex {vertex}")]
    ElementNotInVertexList { vertex: usize, element: usize },
    /// Two elements disagree about being neighbours.
    #[error("inconsistent adjacency lists: element {element}, neighbour {neighbour}")]
    InconsistentAdjacency { element: usize, neighbour: usize },
    /// A boundary vertex is missing from its boundary component.
    #[error("unable to find vertex {vertex} in boundary component {component}")]
    VertexNotOnBoundary { vertex: usize, component: usize },
    /// A vertex could not be located in the coordinate index.
    #[error("unable to find vertex {0} in the coordinate index")]
    VertexNotFound(usize),
    /// Element id out of range or element with a malformed vertex list.
    #[error("invalid element {0}")]
    InvalidElement(usize),
    /// Vertex id out of range.
    #[error("invalid vertex {0}")]
    InvalidVertex(usize),
    /// A marker that does not fit the element it was attached to.
    #[error("invalid marker for element {element}: {marker}")]
    InvalidMarker { element: usize, marker: String },
    /// An element state that no template can produce.
    #[error("invalid state for element {element}: {state}")]
    InvalidState { element: usize, state: String },
    /// The siblings of a refinement patch could not be recovered.
    #[error("incomplete refinement patch at element {0}")]
    IncompletePatch(usize),
    /// The indicator does not provide one value per element.
    #[error("indicator has {found} entries, mesh has {expected} elements")]
    IndicatorLengthMismatch { expected: usize, found: usize },
    /// Refinement created a different number of vertices than predicted.
    #[error("refinement created {found} vertices, marking predicted {expected}")]
    VertexCountMismatch { expected: usize, found: usize },
    /// Malformed coordinates or connectivity handed to a constructor.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// Rejected adaptation options.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    /// Growing a backing array failed.
    #[error("allocation failed: {0}")]
    AllocationFailed(String),
}

impl From<TryReserveError> for MeshAdaptError {
    fn from(err: TryReserveError) -> Self {
        MeshAdaptError::AllocationFailed(err.to_string())
    }
}
