//! Outer boundary extraction over planar edge networks.
//!
//! [`EdgeNetwork`] validates an edge collection and answers adjacency queries,
//! [`PerimeterComparator`] ranks candidate edges at a vertex by sweep angle, [`LoopTracer`]
//! walks a single closed loop, and [`OuterWireExtractor`] repeats the walk against shrinking
//! networks until only the outer wire remains.
//!
//! Randomness is always injected by the caller, so a seeded generator reproduces a run.

pub mod classify;
pub mod comparator;
pub mod config;
pub mod extractor;
pub mod network;
pub mod tracer;

pub use classify::{ExtremeInDirection, FarthestFromCentroid, NoOuterHint, OuterEdgeClassifier};
pub use comparator::{
    angle_between, PerimeterComparator, DEFAULT_ANGULAR_TOLERANCE, DEFAULT_MAX_ORDER,
};
pub use config::{ExtractionLimits, LimitsError, PolicyKind};
pub use extractor::{ExtractionProgress, OuterWireExtractor, Wire};
pub use network::{EdgeNetwork, SinglyConnectedEdge, Topology};
pub use tracer::{LoopSequence, LoopTracer, NextEdgePolicy, TraceState, TracedLoop};
