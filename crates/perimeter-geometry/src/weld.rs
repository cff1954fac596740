use perimeter_core::point::{points_equal_within, Point};
use perimeter_core::{CurveOps, Edge, EdgeId, VertexId, DEFAULT_PRECISION};

/// Identity service for raw curves: welds endpoints that fall within `precision` of each other
/// into one [`VertexId`] and hands out sequential [`EdgeId`]s.
#[derive(Debug, Clone)]
pub struct VertexPool {
    precision: f64,
    positions: Vec<Point>,
    next_edge: usize,
}

impl Default for VertexPool {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

impl VertexPool {
    #[must_use]
    pub fn new(precision: f64) -> Self {
        Self {
            precision,
            positions: Vec::new(),
            next_edge: 0,
        }
    }

    /// The vertex at `p`, created on first sight.
    pub fn vertex(&mut self, p: Point) -> VertexId {
        // Linear scan; edge sets handled here are small.
        if let Some(idx) = self
            .positions
            .iter()
            .position(|q| points_equal_within(*q, p, self.precision))
        {
            return VertexId(idx);
        }
        self.positions.push(p);
        VertexId(self.positions.len() - 1)
    }

    #[must_use]
    pub fn position(&self, id: VertexId) -> Option<Point> {
        self.positions.get(id.0).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn edge<C: CurveOps>(&mut self, curve: C) -> Edge<C> {
        let start = self.vertex(curve.start());
        let end = self.vertex(curve.end());
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        Edge::new(id, start, end, curve)
    }

    pub fn edges<C: CurveOps>(&mut self, curves: impl IntoIterator<Item = C>) -> Vec<Edge<C>> {
        curves.into_iter().map(|c| self.edge(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Curve;

    #[test]
    fn welds_nearby_endpoints() {
        let mut pool = VertexPool::new(1e-6);
        let edges = pool.edges([
            Curve::line([0.0, 0.0], [1.0, 0.0]),
            Curve::line([1.0, 1e-9], [1.0, 1.0]),
            Curve::line([1.0, 1.0], [0.0, 0.0]),
        ]);
        assert_eq!(pool.len(), 3);
        assert_eq!(edges[0].end, edges[1].start);
        assert_eq!(edges[2].end, edges[0].start);
        assert_eq!(
            edges.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![EdgeId(0), EdgeId(1), EdgeId(2)]
        );
    }

    #[test]
    fn distinct_points_stay_distinct() {
        let mut pool = VertexPool::new(1e-6);
        let a = pool.vertex([0.0, 0.0]);
        let b = pool.vertex([0.0, 1e-3]);
        assert_ne!(a, b);
        assert_eq!(pool.position(b), Some([0.0, 1e-3]));
        assert_eq!(pool.position(VertexId(9)), None);
    }
}
