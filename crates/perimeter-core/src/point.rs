/// A position in the XY plane.
pub type Point = [f64; 2];
/// A planar direction or derivative vector.
pub type Vector = [f64; 2];
/// A spatial vector, used for rotation axes.
pub type Vector3 = [f64; 3];

/// Positional tolerance used when callers do not supply their own.
pub const DEFAULT_PRECISION: f64 = 1e-6;

#[must_use]
pub fn add(a: Point, b: Vector) -> Point {
    [a[0] + b[0], a[1] + b[1]]
}

#[must_use]
pub fn sub(a: Point, b: Point) -> Vector {
    [a[0] - b[0], a[1] - b[1]]
}

#[must_use]
pub fn scale(v: Vector, k: f64) -> Vector {
    [v[0] * k, v[1] * k]
}

#[must_use]
pub fn dot(a: Vector, b: Vector) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}

/// Z component of the cross product of two planar vectors.
#[must_use]
pub fn cross(a: Vector, b: Vector) -> f64 {
    a[0] * b[1] - a[1] * b[0]
}

#[must_use]
pub fn norm(v: Vector) -> f64 {
    v[0].hypot(v[1])
}

#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    norm(sub(a, b))
}

#[must_use]
pub fn midpoint(a: Point, b: Point) -> Point {
    [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0]
}

#[must_use]
pub fn points_equal_within(a: Point, b: Point, within: f64) -> bool {
    distance(a, b) <= within
}

/// Distance from `p` to the closed segment `a`-`b`.
#[must_use]
pub fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = sub(b, a);
    let len2 = dot(ab, ab);
    if len2 == 0.0 {
        return distance(p, a);
    }
    let t = (dot(sub(p, a), ab) / len2).clamp(0.0, 1.0);
    distance(p, add(a, scale(ab, t)))
}

/// Lift a planar vector into space with `z = 0`.
#[must_use]
pub fn lift(v: Vector) -> Vector3 {
    [v[0], v[1], 0.0]
}

#[must_use]
pub fn dot3(a: Vector3, b: Vector3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[must_use]
pub fn cross3(a: Vector3, b: Vector3) -> Vector3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[must_use]
pub fn norm3(v: Vector3) -> f64 {
    dot3(v, v).sqrt()
}
