//! Definite-outer edge predicates.
//!
//! The tracer only uses these as a bias, so a classifier may be conservative. Any
//! `Fn(&Edge<C>, &EdgeNetwork<C>) -> bool` closure is a classifier too.

use indexmap::IndexSet;
use perimeter_core::point::{distance, dot, norm, Vector};
use perimeter_core::{CurveOps, Edge, EdgeId, Point};

use crate::network::EdgeNetwork;

pub trait OuterEdgeClassifier<C: CurveOps> {
    fn is_definite_outer(&self, edge: &Edge<C>, network: &EdgeNetwork<C>) -> bool;

    /// Every definite-outer edge of `network`, in network order. Called once per build;
    /// override it when the per-edge test depends on network-wide aggregates.
    fn definite_outer_edges(&self, network: &EdgeNetwork<C>) -> IndexSet<EdgeId> {
        network
            .edges()
            .filter(|e| self.is_definite_outer(e, network))
            .map(|e| e.id)
            .collect()
    }
}

impl<C, F> OuterEdgeClassifier<C> for F
where
    C: CurveOps,
    F: Fn(&Edge<C>, &EdgeNetwork<C>) -> bool,
{
    fn is_definite_outer(&self, edge: &Edge<C>, network: &EdgeNetwork<C>) -> bool {
        self(edge, network)
    }
}

/// Classifies nothing as outer; the tracer then falls back to pure shuffling.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NoOuterHint;

impl<C: CurveOps> OuterEdgeClassifier<C> for NoOuterHint {
    fn is_definite_outer(&self, _edge: &Edge<C>, _network: &EdgeNetwork<C>) -> bool {
        false
    }
}

/// Edges whose midpoint is (within `tolerance`) as far from the vertex centroid as any edge
/// midpoint in the network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FarthestFromCentroid {
    pub tolerance: f64,
}

impl Default for FarthestFromCentroid {
    fn default() -> Self {
        Self { tolerance: 1e-6 }
    }
}

fn vertex_centroid<C: CurveOps>(network: &EdgeNetwork<C>) -> Option<Point> {
    let count = network.vertex_count();
    if count == 0 {
        return None;
    }
    let [sx, sy] = network
        .vertices()
        .fold([0.0, 0.0], |[x, y], (_, p)| [x + p[0], y + p[1]]);
    Some([sx / count as f64, sy / count as f64])
}

impl FarthestFromCentroid {
    /// The vertex centroid and the largest edge-midpoint distance from it.
    fn reach<C: CurveOps>(network: &EdgeNetwork<C>) -> Option<(Point, f64)> {
        let centroid = vertex_centroid(network)?;
        let farthest = network
            .edges()
            .map(|e| distance(e.curve.midpoint(), centroid))
            .fold(0.0_f64, f64::max);
        Some((centroid, farthest))
    }

    fn within<C: CurveOps>(&self, edge: &Edge<C>, (centroid, farthest): (Point, f64)) -> bool {
        distance(edge.curve.midpoint(), centroid) >= farthest - self.tolerance
    }
}

impl<C: CurveOps> OuterEdgeClassifier<C> for FarthestFromCentroid {
    fn is_definite_outer(&self, edge: &Edge<C>, network: &EdgeNetwork<C>) -> bool {
        Self::reach(network).is_some_and(|reach| self.within(edge, reach))
    }

    fn definite_outer_edges(&self, network: &EdgeNetwork<C>) -> IndexSet<EdgeId> {
        let Some(reach) = Self::reach(network) else {
            return IndexSet::new();
        };
        network
            .edges()
            .filter(|e| self.within(e, reach))
            .map(|e| e.id)
            .collect()
    }
}

/// Edges whose midpoint is extreme along `direction`, i.e. touched first by a line swept in
/// from infinity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtremeInDirection {
    pub direction: Vector,
    pub tolerance: f64,
}

impl ExtremeInDirection {
    fn reach<C: CurveOps>(&self, edge: &Edge<C>) -> f64 {
        dot(edge.curve.midpoint(), self.direction)
    }

    fn extreme<C: CurveOps>(&self, network: &EdgeNetwork<C>) -> Option<f64> {
        if norm(self.direction) == 0.0 {
            return None;
        }
        Some(
            network
                .edges()
                .map(|e| self.reach(e))
                .fold(f64::NEG_INFINITY, f64::max),
        )
    }
}

impl<C: CurveOps> OuterEdgeClassifier<C> for ExtremeInDirection {
    fn is_definite_outer(&self, edge: &Edge<C>, network: &EdgeNetwork<C>) -> bool {
        self.extreme(network)
            .is_some_and(|extreme| self.reach(edge) >= extreme - self.tolerance)
    }

    fn definite_outer_edges(&self, network: &EdgeNetwork<C>) -> IndexSet<EdgeId> {
        let Some(extreme) = self.extreme(network) else {
            return IndexSet::new();
        };
        network
            .edges()
            .filter(|e| self.reach(e) >= extreme - self.tolerance)
            .map(|e| e.id)
            .collect()
    }
}
