use indexmap::{IndexMap, IndexSet};
use perimeter_core::point::{distance, points_equal_within};
use perimeter_core::{CurveOps, Edge, EdgeId, Point, TopologyError, VertexId};
use tracing::trace;

use crate::classify::OuterEdgeClassifier;

/// Result of building a network from a raw edge collection.
#[derive(Debug, Clone)]
pub enum Topology<C> {
    /// A lone edge is already its own loop; no adjacency is computed for it.
    SingleEdge(Edge<C>),
    Network(EdgeNetwork<C>),
}

/// Two distinct edges sharing exactly one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinglyConnectedEdge {
    pub edge: EdgeId,
    pub neighbor: EdgeId,
    pub shared: VertexId,
}

/// Immutable adjacency snapshot over a set of edges.
///
/// All maps iterate in insertion order, so a walk driven by a seeded generator is reproducible
/// for a given input order. The map contents (as sets) do not depend on that order.
#[derive(Debug, Clone)]
pub struct EdgeNetwork<C> {
    edges: IndexMap<EdgeId, Edge<C>>,
    vertex_positions: IndexMap<VertexId, Point>,
    vertex_edges: IndexMap<VertexId, IndexSet<EdgeId>>,
    edge_adjacency: IndexMap<EdgeId, IndexSet<EdgeId>>,
    definite_outer: IndexSet<EdgeId>,
    precision: f64,
}

impl<C: CurveOps> EdgeNetwork<C> {
    /// Validate `edges` and derive the adjacency maps, then ask `classifier` which edges are
    /// definitely on the outer boundary.
    pub fn build<D>(
        edges: Vec<Edge<C>>,
        classifier: &D,
        precision: f64,
    ) -> Result<Topology<C>, TopologyError>
    where
        D: OuterEdgeClassifier<C> + ?Sized,
    {
        if edges.is_empty() {
            return Err(TopologyError::invalid("network needs at least one edge"));
        }

        let mut by_id: IndexMap<EdgeId, Edge<C>> = IndexMap::with_capacity(edges.len());
        for edge in edges {
            if edge.curve.is_degenerate(precision) {
                return Err(TopologyError::invalid("degenerate edge")
                    .with_edges(vec![edge.id])
                    .with_vertices(edge.vertices().to_vec()));
            }
            if by_id.contains_key(&edge.id) {
                return Err(TopologyError::invalid("duplicate edge id").with_edges(vec![edge.id]));
            }
            by_id.insert(edge.id, edge);
        }

        if by_id.len() == 1 {
            if let Some((_, edge)) = by_id.pop() {
                return Ok(Topology::SingleEdge(edge));
            }
        }

        // Closed edges are cycles on their own; the extractor keeps them out of snapshots.
        if let Some(closed) = by_id.values().find(|e| e.is_closed()) {
            return Err(TopologyError::invalid("self-closed edge inside a multi-edge network")
                .with_edges(vec![closed.id])
                .with_vertices(vec![closed.start]));
        }

        let mut vertex_positions: IndexMap<VertexId, Point> = IndexMap::new();
        let mut vertex_edges: IndexMap<VertexId, IndexSet<EdgeId>> = IndexMap::new();
        for edge in by_id.values() {
            for (vertex, at) in [(edge.start, edge.start_point()), (edge.end, edge.end_point())] {
                let known = *vertex_positions.entry(vertex).or_insert(at);
                let gap = distance(known, at);
                if gap > precision {
                    return Err(TopologyError::GeometryMismatch {
                        edge: edge.id,
                        position: known,
                        distance: gap,
                    });
                }
                vertex_edges.entry(vertex).or_default().insert(edge.id);
            }
        }

        let positions: Vec<(VertexId, Point)> =
            vertex_positions.iter().map(|(v, p)| (*v, *p)).collect();
        for (i, (a, pa)) in positions.iter().enumerate() {
            for (b, pb) in &positions[i + 1..] {
                if points_equal_within(*pa, *pb, precision) {
                    return Err(TopologyError::invalid(
                        "distinct vertex identities at the same coordinate",
                    )
                    .with_vertices(vec![*a, *b]));
                }
            }
        }

        let mut edge_adjacency: IndexMap<EdgeId, IndexSet<EdgeId>> = IndexMap::new();
        for edge in by_id.values() {
            let neighbors = edge_adjacency.entry(edge.id).or_default();
            for vertex in edge.vertices() {
                for other in vertex_edges.get(&vertex).into_iter().flatten() {
                    if *other != edge.id {
                        neighbors.insert(*other);
                    }
                }
            }
        }

        let orphans: Vec<EdgeId> = edge_adjacency
            .iter()
            .filter(|(_, adjacent)| adjacent.is_empty())
            .map(|(id, _)| *id)
            .collect();
        if !orphans.is_empty() {
            return Err(TopologyError::invalid("edge shares no vertex with any other edge")
                .with_edges(orphans));
        }

        let mut network = Self {
            edges: by_id,
            vertex_positions,
            vertex_edges,
            edge_adjacency,
            definite_outer: IndexSet::new(),
            precision,
        };
        network.definite_outer = classifier.definite_outer_edges(&network);

        trace!(
            edges = network.edge_count(),
            vertices = network.vertex_count(),
            definite_outer = network.definite_outer.len(),
            "built edge network"
        );
        Ok(Topology::Network(network))
    }

    pub fn edges_of(&self, vertex: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.vertex_edges.get(&vertex).into_iter().flatten().copied()
    }

    /// Edges sharing at least one vertex with `edge`.
    pub fn adjacent_edges(&self, edge: EdgeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.edge_adjacency.get(&edge).into_iter().flatten().copied()
    }

    #[must_use]
    pub fn is_definite_outer(&self, edge: EdgeId) -> bool {
        self.definite_outer.contains(&edge)
    }

    /// Whether `edge` touches `vertex` at exactly one of its ends.
    #[must_use]
    pub fn singly_connected(&self, edge: EdgeId, vertex: VertexId) -> bool {
        self.edges
            .get(&edge)
            .is_some_and(|e| e.other_vertex(vertex).is_some())
    }

    /// The far end of `edge` seen from `vertex`.
    pub fn complementary_vertex(
        &self,
        edge: EdgeId,
        vertex: VertexId,
    ) -> Result<VertexId, TopologyError> {
        self.edges
            .get(&edge)
            .and_then(|e| e.other_vertex(vertex))
            .ok_or_else(|| {
                TopologyError::invalid("edge is not singly connected to vertex")
                    .with_edges(vec![edge])
                    .with_vertices(vec![vertex])
            })
    }

    /// Adjacent edges that share exactly one vertex with `edge`.
    #[must_use]
    pub fn singly_connected_neighbors(&self, edge: EdgeId) -> Vec<SinglyConnectedEdge> {
        let Some(this) = self.edges.get(&edge) else {
            return Vec::new();
        };
        self.adjacent_edges(edge)
            .filter_map(|neighbor| {
                let other = self.edges.get(&neighbor)?;
                if this.shared_vertex_count(other) != 1 {
                    return None;
                }
                let shared = if other.touches(this.start) {
                    this.start
                } else {
                    this.end
                };
                Some(SinglyConnectedEdge {
                    edge,
                    neighbor,
                    shared,
                })
            })
            .collect()
    }

    #[must_use]
    pub fn degree(&self, vertex: VertexId) -> usize {
        self.vertex_edges.get(&vertex).map_or(0, IndexSet::len)
    }

    /// Vertices with more than two incident edges.
    pub fn junctions(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex_edges
            .iter()
            .filter(|(_, edges)| edges.len() > 2)
            .map(|(v, _)| *v)
    }

    #[must_use]
    pub fn has_junction(&self) -> bool {
        self.junctions().next().is_some()
    }

    #[must_use]
    pub fn vertex_position(&self, vertex: VertexId) -> Option<Point> {
        self.vertex_positions.get(&vertex).copied()
    }

    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge<C>> {
        self.edges.get(&id)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge<C>> + '_ {
        self.edges.values()
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, Point)> + '_ {
        self.vertex_positions.iter().map(|(v, p)| (*v, *p))
    }

    pub fn definite_outer_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.definite_outer.iter().copied()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_positions.len()
    }

    #[must_use]
    pub fn precision(&self) -> f64 {
        self.precision
    }

    #[must_use]
    pub fn into_edges(self) -> Vec<Edge<C>> {
        self.edges.into_values().collect()
    }
}
