use thiserror::Error;

use crate::edge::{EdgeId, VertexId};
use crate::point::Point;

/// Failures of network construction, loop tracing and outer wire extraction.
///
/// `InvalidTopology`, `GeometryMismatch` and `AmbiguousTopology` describe the input. The
/// remaining variants are safety valves: they separate "this input cannot be resolved" from a
/// runaway search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    #[error("invalid topology: {reason} (edges {edges:?}, vertices {vertices:?})")]
    InvalidTopology {
        reason: String,
        edges: Vec<EdgeId>,
        vertices: Vec<VertexId>,
    },

    #[error("edge {edge} has no endpoint at {position:?} (closest endpoint is {distance} away)")]
    GeometryMismatch {
        edge: EdgeId,
        position: Point,
        distance: f64,
    },

    #[error(
        "ambiguous topology at {vertex:?}: candidates {candidates:?} tie through derivative order {max_order}"
    )]
    AmbiguousTopology {
        vertex: Point,
        candidates: Vec<EdgeId>,
        max_order: usize,
    },

    #[error("no closed loop found (start {start:?}, {} edges considered)", .edges.len())]
    NoLoopFound {
        start: Option<EdgeId>,
        edges: Vec<EdgeId>,
    },

    #[error("loop tracing exceeded its step limit of {limit} after {steps} steps")]
    StepLimitExceeded {
        limit: usize,
        steps: usize,
        sequence: Vec<EdgeId>,
    },

    #[error("outer wire extraction exceeded its iteration limit of {limit} ({iterations} iterations)")]
    IterationLimitExceeded { limit: usize, iterations: usize },
}

impl TopologyError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidTopology {
            reason: reason.into(),
            edges: Vec::new(),
            vertices: Vec::new(),
        }
    }

    /// Attach offending edges to an `InvalidTopology` error. Other variants pass through.
    #[must_use]
    pub fn with_edges(mut self, offending: Vec<EdgeId>) -> Self {
        if let Self::InvalidTopology { edges, .. } = &mut self {
            *edges = offending;
        }
        self
    }

    /// Attach offending vertices to an `InvalidTopology` error. Other variants pass through.
    #[must_use]
    pub fn with_vertices(mut self, offending: Vec<VertexId>) -> Self {
        if let Self::InvalidTopology { vertices, .. } = &mut self {
            *vertices = offending;
        }
        self
    }

    /// Whether a fresh randomized attempt could plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NoLoopFound { .. })
    }
}
