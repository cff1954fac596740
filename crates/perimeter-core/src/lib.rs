//! Shared vocabulary for planar edge topology.
//!
//! Everything the graph algorithms need from a geometry kernel is expressed here as two narrow
//! capability traits:
//! - [`CurveOps`]: endpoint, derivative and reversal queries on a single curve.
//! - [`RegionOps`]: opaque planar region booleans used to claim traced loops.
//!
//! Points are `[f64; 2]` in the XY plane. Rotation axes for angle comparison are `[f64; 3]`.

pub mod curve;
pub mod edge;
pub mod error;
pub mod point;
pub mod region;

pub use curve::CurveOps;
pub use edge::{orient_chain, Edge, EdgeId, VertexId};
pub use error::TopologyError;
pub use point::{Point, Vector, Vector3, DEFAULT_PRECISION};
pub use region::{Containment, RegionOps};
