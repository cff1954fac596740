//! Planar geometry kernel for outer wire extraction.
//!
//! Provides the concrete curve type, endpoint welding and region booleans that satisfy the
//! `perimeter-core` capability traits.

pub mod curve;
pub mod kernel;
pub mod primitives;
pub mod region;
pub mod weld;

pub use cavalier_contours::polyline::{PlineVertex, Polyline};
pub use curve::{Curve, GeometryError};
pub use kernel::PlanarKernel;
pub use region::Region;
pub use weld::VertexPool;
