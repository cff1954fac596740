//! Perimeter angle comparison between edges meeting at a vertex.
//!
//! Angles are measured in degrees, as the rotation about an axis that carries the tangent of
//! the incoming edge onto the tangent of a candidate, both taken *leaving* the shared vertex.
//! Results live in `(0, 360]`: a rotation of exactly zero reports a full turn, so a candidate
//! that cannot yet be told apart from the incoming edge never wins by accident.
//!
//! When two candidates leave in the same direction, the comparison is repeated on higher
//! parametric derivatives until one of them is strictly smallest.

use perimeter_core::point::{cross3, distance, dot3, lift, norm3};
use perimeter_core::{CurveOps, Edge, Point, TopologyError, Vector, Vector3, DEFAULT_PRECISION};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Highest derivative order consulted before a tie is reported as ambiguous.
pub const DEFAULT_MAX_ORDER: usize = 6;

/// Angles closer than this many degrees count as a tie.
pub const DEFAULT_ANGULAR_TOLERANCE: f64 = 1e-9;

const FULL_TURN: f64 = 360.0;

/// `edge`'s curve oriented to start at `shared`.
fn leaving<C: CurveOps>(
    edge: &Edge<C>,
    shared: Point,
    precision: f64,
) -> Result<C, TopologyError> {
    let from_start = distance(edge.curve.start(), shared);
    let from_end = distance(edge.curve.end(), shared);
    if from_start <= precision {
        Ok(edge.curve.clone())
    } else if from_end <= precision {
        Ok(edge.curve.reversed())
    } else {
        Err(TopologyError::GeometryMismatch {
            edge: edge.id,
            position: shared,
            distance: from_start.min(from_end),
        })
    }
}

fn derivative_clamped<C: CurveOps>(curve: &C, order: usize) -> Vector {
    curve.derivative_at_start(order.min(curve.max_derivative_order()).max(1))
}

/// Rotation from `from` to `to` about `axis`, folded into `(0, 360]`.
fn sweep_angle(from: Vector, to: Vector, axis: Vector3) -> f64 {
    let (a, b) = (lift(from), lift(to));
    let unit = norm3(axis);
    let sin = dot3(cross3(a, b), axis) / unit;
    let cos = dot3(a, b);
    let raw = sin.atan2(cos).to_degrees();
    if raw == 0.0 {
        FULL_TURN
    } else if raw < 0.0 {
        raw + FULL_TURN
    } else {
        raw
    }
}

fn rotation_axis(from: Vector, reference: Vector3, reference_in_plane: bool) -> Vector3 {
    if reference_in_plane {
        cross3(reference, lift(from))
    } else {
        reference
    }
}

/// Signed rotation, in degrees within `(0, 360]`, from `from`'s tangent to `to`'s tangent at
/// `shared`.
///
/// `reference` is the rotation axis, or with `reference_in_plane` a direction lying in the
/// curves' plane that is crossed with `from`'s tangent to obtain the axis.
pub fn angle_between<C: CurveOps>(
    from: &Edge<C>,
    to: &Edge<C>,
    shared: Point,
    reference: Vector3,
    reference_in_plane: bool,
    precision: f64,
) -> Result<f64, TopologyError> {
    if from.id == to.id {
        return Err(TopologyError::invalid("an edge cannot be compared with itself")
            .with_edges(vec![from.id]));
    }
    let from_tangent = leaving(from, shared, precision)?.derivative_at_start(1);
    let to_tangent = leaving(to, shared, precision)?.derivative_at_start(1);

    let axis = rotation_axis(from_tangent, reference, reference_in_plane);
    if norm3(axis) <= f64::EPSILON {
        return Err(TopologyError::invalid("rotation axis has no length")
            .with_edges(vec![from.id, to.id]));
    }
    Ok(sweep_angle(from_tangent, to_tangent, axis))
}

/// Picks the candidate with the smallest sweep from the incoming edge.
///
/// With the default `+z` normal this is the sharpest clockwise turn relative to the reversed
/// incoming direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerimeterComparator {
    pub normal: Vector3,
    /// Positional tolerance for locating the shared vertex on each edge.
    pub precision: f64,
    /// Tie tolerance between candidate angles, in degrees.
    pub angular_tolerance: f64,
    pub max_order: usize,
}

impl Default for PerimeterComparator {
    fn default() -> Self {
        Self {
            normal: [0.0, 0.0, 1.0],
            precision: DEFAULT_PRECISION,
            angular_tolerance: DEFAULT_ANGULAR_TOLERANCE,
            max_order: DEFAULT_MAX_ORDER,
        }
    }
}

impl PerimeterComparator {
    pub fn select<'a, C: CurveOps>(
        &self,
        from: &Edge<C>,
        candidates: &[&'a Edge<C>],
        point: Point,
    ) -> Result<&'a Edge<C>, TopologyError> {
        match candidates {
            [] => {
                return Err(TopologyError::NoLoopFound {
                    start: Some(from.id),
                    edges: vec![from.id],
                })
            }
            [only] => return Ok(*only),
            _ => {}
        }
        if let Some(same) = candidates.iter().find(|c| c.id == from.id) {
            return Err(TopologyError::invalid("an edge cannot be compared with itself")
                .with_edges(vec![same.id]));
        }
        if norm3(self.normal) <= f64::EPSILON {
            return Err(TopologyError::invalid("comparison normal has no length")
                .with_edges(candidates.iter().map(|c| c.id).collect()));
        }

        let incoming = leaving(from, point, self.precision)?;
        let outgoing = candidates
            .iter()
            .map(|c| leaving(c, point, self.precision))
            .collect::<Result<Vec<_>, _>>()?;

        let max_order = self.max_order.max(1);
        let mut contenders: Vec<usize> = (0..candidates.len()).collect();
        for order in 1..=max_order {
            let reference = derivative_clamped(&incoming, order);
            let angles: Vec<f64> = contenders
                .iter()
                .map(|&i| {
                    let candidate = derivative_clamped(&outgoing[i], order);
                    sweep_angle(reference, candidate, self.normal)
                })
                .collect();
            let best = angles.iter().copied().fold(f64::INFINITY, f64::min);
            let tied: Vec<usize> = contenders
                .iter()
                .zip(&angles)
                .filter(|(_, angle)| (**angle - best).abs() <= self.angular_tolerance)
                .map(|(i, _)| *i)
                .collect();
            trace!(order, best, tied = tied.len(), "perimeter comparison");
            if let [winner] = tied.as_slice() {
                return Ok(candidates[*winner]);
            }
            contenders = tied;
        }

        Err(TopologyError::AmbiguousTopology {
            vertex: point,
            candidates: contenders.iter().map(|&i| candidates[i].id).collect(),
            max_order,
        })
    }
}
