use std::fmt;

use crate::curve::CurveOps;
use crate::error::TopologyError;
use crate::point::Point;

/// Identity of a shared endpoint. Equal positions must map to equal ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// Identity of an edge. Survives reversal and any other geometric transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// An oriented curve between two identified vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<C> {
    pub id: EdgeId,
    pub start: VertexId,
    pub end: VertexId,
    pub curve: C,
}

impl<C: CurveOps> Edge<C> {
    #[must_use]
    pub fn new(id: EdgeId, start: VertexId, end: VertexId, curve: C) -> Self {
        Self {
            id,
            start,
            end,
            curve,
        }
    }

    #[must_use]
    pub fn vertices(&self) -> [VertexId; 2] {
        [self.start, self.end]
    }

    /// Whether the edge starts and ends at the same vertex.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.start == self.end
    }

    #[must_use]
    pub fn touches(&self, vertex: VertexId) -> bool {
        self.start == vertex || self.end == vertex
    }

    /// The endpoint opposite `vertex`, or `None` when `vertex` is not an endpoint or the edge
    /// is closed.
    #[must_use]
    pub fn other_vertex(&self, vertex: VertexId) -> Option<VertexId> {
        if self.is_closed() {
            None
        } else if self.start == vertex {
            Some(self.end)
        } else if self.end == vertex {
            Some(self.start)
        } else {
            None
        }
    }

    /// Number of endpoint vertices shared with `other` (0, 1 or 2).
    #[must_use]
    pub fn shared_vertex_count(&self, other: &Edge<C>) -> usize {
        let mut shared = 0;
        if other.touches(self.start) {
            shared += 1;
        }
        if !self.is_closed() && other.touches(self.end) {
            shared += 1;
        }
        shared
    }

    /// Same edge id, traversed the other way.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            id: self.id,
            start: self.end,
            end: self.start,
            curve: self.curve.reversed(),
        }
    }

    /// This edge oriented so it leaves `vertex`.
    #[must_use]
    pub fn leaving(&self, vertex: VertexId) -> Option<Self> {
        if self.start == vertex {
            Some(self.clone())
        } else if self.end == vertex {
            Some(self.reversed())
        } else {
            None
        }
    }

    #[must_use]
    pub fn start_point(&self) -> Point {
        self.curve.start()
    }

    #[must_use]
    pub fn end_point(&self) -> Point {
        self.curve.end()
    }
}

/// Orient a walk-ordered edge sequence head-to-tail.
///
/// Consecutive edges must share a vertex. The first edge keeps its direction when its end
/// vertex touches the second edge, otherwise it is reversed; every following edge is flipped as
/// needed so that it starts where the previous one ends.
pub fn orient_chain<C: CurveOps>(edges: Vec<Edge<C>>) -> Result<Vec<Edge<C>>, TopologyError> {
    if edges.len() < 2 {
        return Ok(edges);
    }

    let mut iter = edges.into_iter();
    let mut chained: Vec<Edge<C>> = Vec::new();
    let first = iter.next().ok_or_else(|| TopologyError::invalid("empty chain"))?;
    let second = iter.next().ok_or_else(|| TopologyError::invalid("empty chain"))?;

    let first = if second.touches(first.end) {
        first
    } else if second.touches(first.start) {
        first.reversed()
    } else {
        return Err(TopologyError::invalid("edges do not chain")
            .with_edges(vec![first.id, second.id]));
    };
    chained.push(first);

    for next in std::iter::once(second).chain(iter) {
        let tail = chained[chained.len() - 1].end;
        let oriented = next.leaving(tail).ok_or_else(|| {
            TopologyError::invalid("edges do not chain")
                .with_edges(vec![chained[chained.len() - 1].id, next.id])
                .with_vertices(vec![tail])
        })?;
        chained.push(oriented);
    }

    Ok(chained)
}
