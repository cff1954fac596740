use cavalier_contours::polyline::{PlineSource, PlineVertex, Polyline};
use perimeter_core::{
    Containment, CurveOps, Edge, Point, RegionOps, TopologyError, DEFAULT_PRECISION,
};
use tracing::trace;

use crate::curve::Curve;
use crate::region::Region;

/// Planar region kernel over [`Curve`] edges, backed by CavalierContours polylines.
///
/// Lines and arcs map exactly onto bulge vertices; Béziers are flattened into
/// `flatten_segments` chords, always an even count so the parametric midpoint is a vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarKernel {
    pub precision: f64,
    pub flatten_segments: usize,
}

impl Default for PlanarKernel {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            flatten_segments: 16,
        }
    }
}

impl PlanarKernel {
    #[must_use]
    pub fn new(precision: f64) -> Self {
        Self {
            precision,
            ..Self::default()
        }
    }

    /// Closed polyline through a head-to-tail oriented loop.
    #[must_use]
    pub fn loop_polyline(&self, edges: &[Edge<Curve>]) -> Polyline<f64> {
        let segments = self.flatten_segments.max(2).next_multiple_of(2);
        let mut pl = Polyline::new_closed();
        for edge in edges {
            match &edge.curve {
                Curve::Line { a, .. } => pl.vertex_data.push(PlineVertex::new(a[0], a[1], 0.0)),
                arc @ Curve::Arc { .. } => {
                    for piece in arc.half_turns() {
                        let s = piece.start();
                        let bulge = piece.bulge().unwrap_or(0.0);
                        pl.vertex_data.push(PlineVertex::new(s[0], s[1], bulge));
                    }
                }
                bezier @ Curve::Bezier { .. } => {
                    let pts = bezier.flatten(segments);
                    for p in &pts[..pts.len() - 1] {
                        pl.vertex_data.push(PlineVertex::new(p[0], p[1], 0.0));
                    }
                }
            }
        }
        pl
    }
}

/// Closed straight-sided polyline, mostly for fixtures.
pub fn polygon_pline(vertices: &[Point]) -> Polyline<f64> {
    let mut pl = Polyline::new_closed();
    for &[x, y] in vertices {
        pl.vertex_data.push(PlineVertex::new(x, y, 0.0));
    }
    pl
}

impl RegionOps<Curve> for PlanarKernel {
    type Region = Region;

    fn empty_region(&self) -> Region {
        Region::empty()
    }

    fn face_from_loop(&self, edges: &[Edge<Curve>]) -> Result<Region, TopologyError> {
        let ids = || edges.iter().map(|e| e.id).collect::<Vec<_>>();
        let (Some(first), Some(last)) = (edges.first(), edges.last()) else {
            return Err(TopologyError::invalid("empty loop"));
        };
        if first.start != last.end {
            return Err(TopologyError::invalid("loop is not closed")
                .with_edges(ids())
                .with_vertices(vec![first.start, last.end]));
        }

        let pl = self.loop_polyline(edges);
        if pl.area().abs() <= self.precision {
            return Err(TopologyError::invalid("loop encloses no area").with_edges(ids()));
        }
        trace!(edges = edges.len(), area = pl.area(), "face from loop");
        Ok(Region::from_pos(vec![pl]))
    }

    fn union(&self, a: &Region, b: &Region) -> Region {
        a.union(b)
    }

    fn outer_boundary(&self, region: &Region) -> Region {
        region.filled()
    }

    fn area(&self, region: &Region) -> f64 {
        region.area()
    }

    fn classify_edge(&self, region: &Region, edge: &Edge<Curve>) -> Containment {
        let probe = edge.curve.midpoint();
        match region.boundary_distance(probe) {
            None => Containment::Outside,
            Some(d) if d <= self.precision => Containment::Boundary,
            Some(_) if region.contains(probe) => Containment::Inside,
            Some(_) => Containment::Outside,
        }
    }
}
