use std::fmt;

use crate::point::{distance, Point, Vector};

/// Curve evaluation capabilities the topology algorithms need from a kernel.
///
/// Parametrization is over `t ∈ [0, 1]` from [`start`](CurveOps::start) to
/// [`end`](CurveOps::end). Derivatives are only ever requested at the start; callers that need
/// the other end evaluate [`reversed`](CurveOps::reversed) instead.
pub trait CurveOps: Clone + fmt::Debug {
    fn start(&self) -> Point;

    fn end(&self) -> Point;

    /// Point at the parametric middle of the curve.
    fn midpoint(&self) -> Point;

    fn length(&self) -> f64;

    /// The `order`-th parametric derivative at `t = 0`.
    ///
    /// `order` is at least 1 and never exceeds [`max_derivative_order`](CurveOps::max_derivative_order).
    fn derivative_at_start(&self, order: usize) -> Vector;

    /// Highest derivative order that is not identically zero (1 for a line, the degree for a
    /// polynomial curve, `usize::MAX` for curves with no vanishing derivative).
    fn max_derivative_order(&self) -> usize;

    /// The same geometry traversed from end to start.
    #[must_use]
    fn reversed(&self) -> Self;

    /// Shortest distance from `p` to any point of the curve.
    fn distance_to(&self, p: Point) -> f64;

    fn is_degenerate(&self, precision: f64) -> bool {
        self.length() <= precision
    }

    /// Whether both curves cover the same geometry, in either direction.
    fn coincides(&self, other: &Self, precision: f64) -> bool {
        let same_ends = (distance(self.start(), other.start()) <= precision
            && distance(self.end(), other.end()) <= precision)
            || (distance(self.start(), other.end()) <= precision
                && distance(self.end(), other.start()) <= precision);
        same_ends && distance(self.midpoint(), other.midpoint()) <= precision
    }

    /// Whether `other` lies on this curve: both ends and the midpoint within `precision`.
    fn covers(&self, other: &Self, precision: f64) -> bool {
        [other.start(), other.end(), other.midpoint()]
            .into_iter()
            .all(|p| self.distance_to(p) <= precision)
    }
}
