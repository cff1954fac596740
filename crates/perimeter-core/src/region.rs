use std::fmt;

use crate::curve::CurveOps;
use crate::edge::Edge;
use crate::error::TopologyError;

/// Where an edge lies relative to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Inside,
    Boundary,
    Outside,
}

/// Planar region booleans, treated as opaque operations by the extractor.
pub trait RegionOps<C: CurveOps> {
    type Region: Clone + fmt::Debug;

    fn empty_region(&self) -> Self::Region;

    /// The face enclosed by a closed, head-to-tail oriented loop.
    fn face_from_loop(&self, edges: &[Edge<C>]) -> Result<Self::Region, TopologyError>;

    fn union(&self, a: &Self::Region, b: &Self::Region) -> Self::Region;

    /// The region with every hole filled in.
    fn outer_boundary(&self, region: &Self::Region) -> Self::Region;

    fn area(&self, region: &Self::Region) -> f64;

    fn classify_edge(&self, region: &Self::Region, edge: &Edge<C>) -> Containment;
}
