use std::f64::consts::{FRAC_PI_2, PI, TAU};

use perimeter_core::point::{cross, distance, segment_distance, sub, Point, Vector};
use perimeter_core::CurveOps;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("arc radius must be positive, got {0}")]
    NonPositiveRadius(f64),
    #[error("arc sweep must be non-zero and at most one full turn, got {0} degrees")]
    InvalidSweep(f64),
    #[error("invalid arc (3 points are collinear)")]
    ArcFrom3PointsCollinear,
    #[error("bezier curves need 3 or 4 control points, got {0}")]
    BezierControlCount(usize),
}

/// The planar curve kinds understood by the kernel.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    Line {
        a: Point,
        b: Point,
    },
    /// Circular arc. Angles are radians; a positive `sweep` runs counter-clockwise.
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        sweep: f64,
    },
    /// Quadratic (3 control points) or cubic (4 control points) Bézier.
    Bezier {
        points: Vec<Point>,
    },
}

fn polar(center: Point, radius: f64, angle: f64) -> Point {
    let (s, c) = angle.sin_cos();
    [center[0] + radius * c, center[1] + radius * s]
}

/// Angle folded into `(0, 2π]`.
fn positive_turn(angle: f64) -> f64 {
    let folded = angle.rem_euclid(TAU);
    if folded == 0.0 {
        TAU
    } else {
        folded
    }
}

fn binomial(n: usize, k: usize) -> f64 {
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

fn falling_factorial(n: usize, k: usize) -> f64 {
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64)
}

impl Curve {
    #[must_use]
    pub fn line(a: Point, b: Point) -> Self {
        Curve::Line { a, b }
    }

    /// Arc from a center, radius, start angle and signed sweep (degrees).
    pub fn arc(
        center: Point,
        radius: f64,
        start_deg: f64,
        sweep_deg: f64,
    ) -> Result<Self, GeometryError> {
        if !(radius > 0.0) {
            return Err(GeometryError::NonPositiveRadius(radius));
        }
        if sweep_deg == 0.0 || !sweep_deg.is_finite() || sweep_deg.abs() > 360.0 {
            return Err(GeometryError::InvalidSweep(sweep_deg));
        }
        Ok(Curve::Arc {
            center,
            radius,
            start_angle: start_deg.to_radians(),
            sweep: sweep_deg.to_radians(),
        })
    }

    /// Arc starting at `a`, passing through `through` and ending at `b`.
    pub fn arc_through(a: Point, through: Point, b: Point) -> Result<Self, GeometryError> {
        let d = 2.0
            * (a[0] * (through[1] - b[1]) + through[0] * (b[1] - a[1]) + b[0] * (a[1] - through[1]));
        if d.abs() <= f64::EPSILON {
            return Err(GeometryError::ArcFrom3PointsCollinear);
        }
        let sq = |p: Point| p[0] * p[0] + p[1] * p[1];
        let center = [
            (sq(a) * (through[1] - b[1]) + sq(through) * (b[1] - a[1]) + sq(b) * (a[1] - through[1]))
                / d,
            (sq(a) * (b[0] - through[0]) + sq(through) * (a[0] - b[0]) + sq(b) * (through[0] - a[0]))
                / d,
        ];
        let radius = distance(center, a);
        let angle_of = |p: Point| (p[1] - center[1]).atan2(p[0] - center[0]);
        let (start, end) = (angle_of(a), angle_of(b));

        let counter_clockwise = cross(sub(through, a), sub(b, through)) > 0.0;
        let sweep = if counter_clockwise {
            positive_turn(end - start)
        } else {
            -positive_turn(start - end)
        };

        Ok(Curve::Arc {
            center,
            radius,
            start_angle: start,
            sweep,
        })
    }

    pub fn bezier(points: Vec<Point>) -> Result<Self, GeometryError> {
        if !(3..=4).contains(&points.len()) {
            return Err(GeometryError::BezierControlCount(points.len()));
        }
        Ok(Curve::Bezier { points })
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Curve::Line { .. } => "line",
            Curve::Arc { .. } => "arc",
            Curve::Bezier { .. } => "bezier",
        }
    }

    #[must_use]
    pub fn point_at(&self, t: f64) -> Point {
        match self {
            Curve::Line { a, b } => [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t],
            Curve::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => polar(*center, *radius, start_angle + sweep * t),
            Curve::Bezier { points } => {
                // de Casteljau
                let mut pts = points.clone();
                for level in 1..points.len() {
                    for i in 0..points.len() - level {
                        pts[i] = [
                            pts[i][0] + (pts[i + 1][0] - pts[i][0]) * t,
                            pts[i][1] + (pts[i + 1][1] - pts[i][1]) * t,
                        ];
                    }
                }
                pts[0]
            }
        }
    }

    /// CavalierContours bulge for arcs (`tan(sweep / 4)`), `None` for everything else.
    #[must_use]
    pub fn bulge(&self) -> Option<f64> {
        match self {
            Curve::Arc { sweep, .. } => Some((sweep / 4.0).tan()),
            _ => None,
        }
    }

    /// The arc cut into pieces of at most half a turn, each with a finite bulge. Other curves
    /// come back whole.
    #[must_use]
    pub fn half_turns(&self) -> Vec<Curve> {
        match self {
            Curve::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } if sweep.abs() > PI => {
                let half = sweep / 2.0;
                vec![
                    Curve::Arc {
                        center: *center,
                        radius: *radius,
                        start_angle: *start_angle,
                        sweep: half,
                    },
                    Curve::Arc {
                        center: *center,
                        radius: *radius,
                        start_angle: start_angle + half,
                        sweep: half,
                    },
                ]
            }
            other => vec![other.clone()],
        }
    }

    /// Sample the curve at `segments + 1` evenly spaced parameters (a line always yields its
    /// two endpoints).
    #[must_use]
    pub fn flatten(&self, segments: usize) -> Vec<Point> {
        match self {
            Curve::Line { a, b } => vec![*a, *b],
            _ => {
                let segments = segments.max(2);
                (0..=segments)
                    .map(|i| self.point_at(i as f64 / segments as f64))
                    .collect()
            }
        }
    }
}

impl CurveOps for Curve {
    fn start(&self) -> Point {
        match self {
            Curve::Line { a, .. } => *a,
            Curve::Bezier { points } => points[0],
            Curve::Arc { .. } => self.point_at(0.0),
        }
    }

    fn end(&self) -> Point {
        match self {
            Curve::Line { b, .. } => *b,
            Curve::Bezier { points } => points[points.len() - 1],
            Curve::Arc { .. } => self.point_at(1.0),
        }
    }

    fn midpoint(&self) -> Point {
        self.point_at(0.5)
    }

    fn length(&self) -> f64 {
        match self {
            Curve::Line { a, b } => distance(*a, *b),
            Curve::Arc { radius, sweep, .. } => radius * sweep.abs(),
            Curve::Bezier { .. } => self
                .flatten(64)
                .windows(2)
                .map(|w| distance(w[0], w[1]))
                .sum(),
        }
    }

    fn derivative_at_start(&self, order: usize) -> Vector {
        match self {
            Curve::Line { a, b } => {
                if order == 1 {
                    sub(*b, *a)
                } else {
                    [0.0, 0.0]
                }
            }
            Curve::Arc {
                radius,
                start_angle,
                sweep,
                ..
            } => {
                // d^n/dt^n of r(cos θ, sin θ) with θ = s + sweep·t rotates by n quarter turns.
                let order = order.min(64);
                let magnitude = radius * sweep.powi(order as i32);
                let angle = start_angle + order as f64 * FRAC_PI_2;
                let (s, c) = angle.sin_cos();
                [magnitude * c, magnitude * s]
            }
            Curve::Bezier { points } => {
                let degree = points.len() - 1;
                if order > degree {
                    return [0.0, 0.0];
                }
                let mut diff = [0.0, 0.0];
                for (i, p) in points.iter().take(order + 1).enumerate() {
                    let sign = if (order - i) % 2 == 0 { 1.0 } else { -1.0 };
                    let w = sign * binomial(order, i);
                    diff[0] += w * p[0];
                    diff[1] += w * p[1];
                }
                let k = falling_factorial(degree, order);
                [diff[0] * k, diff[1] * k]
            }
        }
    }

    fn max_derivative_order(&self) -> usize {
        match self {
            Curve::Line { .. } => 1,
            Curve::Arc { .. } => usize::MAX,
            Curve::Bezier { points } => points.len() - 1,
        }
    }

    fn reversed(&self) -> Self {
        match self {
            Curve::Line { a, b } => Curve::Line { a: *b, b: *a },
            Curve::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => Curve::Arc {
                center: *center,
                radius: *radius,
                start_angle: start_angle + sweep,
                sweep: -sweep,
            },
            Curve::Bezier { points } => Curve::Bezier {
                points: points.iter().rev().copied().collect(),
            },
        }
    }

    fn distance_to(&self, p: Point) -> f64 {
        match self {
            Curve::Line { a, b } => segment_distance(p, *a, *b),
            Curve::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => {
                let offset = sub(p, *center);
                let along = if *sweep >= 0.0 {
                    (offset[1].atan2(offset[0]) - start_angle).rem_euclid(TAU)
                } else {
                    (start_angle - offset[1].atan2(offset[0])).rem_euclid(TAU)
                };
                if along <= sweep.abs() {
                    (distance(p, *center) - radius).abs()
                } else {
                    distance(p, self.start()).min(distance(p, self.end()))
                }
            }
            Curve::Bezier { .. } => self
                .flatten(64)
                .windows(2)
                .map(|w| segment_distance(p, w[0], w[1]))
                .fold(f64::INFINITY, f64::min),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn assert_point(p: Point, x: f64, y: f64) {
        let eps = 1e-9;
        assert!((p[0] - x).abs() <= eps, "x got={} expected={x}", p[0]);
        assert!((p[1] - y).abs() <= eps, "y got={} expected={y}", p[1]);
    }

    #[test]
    fn arc_endpoints_follow_sweep_direction() {
        let ccw = Curve::arc([0.0, 0.0], 2.0, 0.0, 90.0).unwrap();
        assert_point(ccw.start(), 2.0, 0.0);
        assert_point(ccw.end(), 0.0, 2.0);

        let cw = Curve::arc([0.0, 0.0], 2.0, 0.0, -90.0).unwrap();
        assert_point(cw.end(), 0.0, -2.0);
    }

    #[test]
    fn arc_rejects_bad_parameters() {
        assert_eq!(
            Curve::arc([0.0, 0.0], 0.0, 0.0, 90.0),
            Err(GeometryError::NonPositiveRadius(0.0))
        );
        assert_eq!(
            Curve::arc([0.0, 0.0], 1.0, 0.0, 0.0),
            Err(GeometryError::InvalidSweep(0.0))
        );
    }

    #[test]
    fn arc_through_three_points() {
        let arc = Curve::arc_through([-1.0, 0.0], [0.0, -1.0], [1.0, 0.0]).unwrap();
        assert_point(arc.start(), -1.0, 0.0);
        assert_point(arc.midpoint(), 0.0, -1.0);
        assert_point(arc.end(), 1.0, 0.0);
        assert_abs_diff_eq!(arc.length(), PI, epsilon = 1e-9);

        let other_way = Curve::arc_through([-1.0, 0.0], [0.0, 1.0], [1.0, 0.0]).unwrap();
        assert_point(other_way.midpoint(), 0.0, 1.0);
        assert!(matches!(other_way, Curve::Arc { sweep, .. } if sweep < 0.0));

        assert_eq!(
            Curve::arc_through([0.0, 0.0], [1.0, 1.0], [2.0, 2.0]),
            Err(GeometryError::ArcFrom3PointsCollinear)
        );
    }

    #[test]
    fn arc_derivatives_rotate_by_quarter_turns() {
        // Unit circle arc starting at (1, 0), sweeping a quarter turn.
        let arc = Curve::arc([0.0, 0.0], 1.0, 0.0, 90.0).unwrap();
        let w = FRAC_PI_2;
        let d1 = arc.derivative_at_start(1);
        assert_abs_diff_eq!(d1[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d1[1], w, epsilon = 1e-12);
        let d2 = arc.derivative_at_start(2);
        assert_abs_diff_eq!(d2[0], -w * w, epsilon = 1e-12);
        assert_abs_diff_eq!(d2[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn reversed_arc_starts_at_original_end() {
        let arc = Curve::arc([1.0, 1.0], 1.0, 90.0, 45.0).unwrap();
        let rev = arc.reversed();
        assert_point(rev.start(), arc.end()[0], arc.end()[1]);
        assert_point(rev.end(), arc.start()[0], arc.start()[1]);
        // Tangent flips.
        let a = arc.reversed().derivative_at_start(1);
        let b = arc.derivative_at_start(1);
        assert!(a[0] * b[0] + a[1] * b[1] < 0.0);
    }

    #[test]
    fn bezier_derivatives_match_control_polygon() {
        let quad = Curve::bezier(vec![[0.0, 0.0], [1.0, 2.0], [2.0, 0.0]]).unwrap();
        assert_eq!(quad.max_derivative_order(), 2);
        assert_point(quad.derivative_at_start(1), 2.0, 4.0);
        assert_point(quad.derivative_at_start(2), 0.0, -8.0);
        assert_point(quad.derivative_at_start(3), 0.0, 0.0);
        assert_point(quad.midpoint(), 1.0, 1.0);

        let cubic = Curve::bezier(vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]).unwrap();
        assert_point(cubic.derivative_at_start(1), 0.0, 3.0);
        assert_point(cubic.derivative_at_start(2), 6.0, -6.0);
        assert_point(cubic.derivative_at_start(3), -12.0, 0.0);
    }

    #[test]
    fn bezier_rejects_wrong_control_count() {
        assert_eq!(
            Curve::bezier(vec![[0.0, 0.0], [1.0, 0.0]]),
            Err(GeometryError::BezierControlCount(2))
        );
    }

    #[test]
    fn flatten_hits_parametric_midpoint() {
        let arc = Curve::arc([0.0, 0.0], 1.0, 0.0, 180.0).unwrap();
        let pts = arc.flatten(8);
        assert_eq!(pts.len(), 9);
        assert_point(pts[4], 0.0, 1.0);
    }

    #[test]
    fn coincident_lines_in_either_direction() {
        let a = Curve::line([0.0, 0.0], [1.0, 0.0]);
        assert!(a.coincides(&a.reversed(), 1e-9));
        let arc = Curve::arc_through([0.0, 0.0], [0.5, 0.5], [1.0, 0.0]).unwrap();
        assert!(!a.coincides(&arc, 1e-9));
    }

    #[test]
    fn distance_to_arc_respects_its_sweep() {
        let upper = Curve::arc([0.0, 0.0], 1.0, 0.0, 180.0).unwrap();
        assert_abs_diff_eq!(upper.distance_to([0.0, 3.0]), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(upper.distance_to([0.0, -1.0]), 2f64.sqrt(), epsilon = 1e-12);

        let clockwise = upper.reversed();
        assert_abs_diff_eq!(clockwise.distance_to([0.0, 0.5]), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(clockwise.distance_to([0.0, -1.0]), 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn collinear_pieces_are_covered_by_the_whole_side() {
        let side = Curve::line([0.0, 0.0], [1.0, 0.0]);
        assert!(side.covers(&Curve::line([0.5, 0.0], [0.0, 0.0]), 1e-9));
        assert!(!side.covers(&Curve::line([0.5, 0.0], [1.5, 0.0]), 1e-9));

        let circle = Curve::arc([0.0, 0.0], 1.0, 0.0, 360.0).unwrap();
        let quarter = Curve::arc([0.0, 0.0], 1.0, 90.0, 90.0).unwrap();
        assert!(circle.covers(&quarter, 1e-9));
        assert!(!quarter.covers(&circle, 1e-9));
    }

    #[test]
    fn full_circle_splits_into_two_half_turns() {
        let circle = Curve::arc([1.0, 1.0], 2.0, 0.0, -360.0).unwrap();
        let halves = circle.half_turns();
        assert_eq!(halves.len(), 2);
        assert_point(halves[0].end(), halves[1].start()[0], halves[1].start()[1]);
        assert_point(halves[1].end(), circle.start()[0], circle.start()[1]);
        for half in &halves {
            assert_abs_diff_eq!(half.bulge().unwrap(), -1.0, epsilon = 1e-12);
        }
        let line = Curve::line([0.0, 0.0], [1.0, 0.0]);
        assert_eq!(line.half_turns(), vec![line]);
    }
}
