//! Closed edge loops for common shapes, returned as curves in traversal order.

use std::f64::consts::PI;

use perimeter_core::Point;

use crate::curve::Curve;

fn rotate_about(x: f64, y: f64, cx: f64, cy: f64, deg: f64) -> (f64, f64) {
    let rad = deg * PI / 180.0;
    let (s, c) = rad.sin_cos();
    let dx = x - cx;
    let dy = y - cy;
    (cx + dx * c - dy * s, cy + dx * s + dy * c)
}

/// Straight edges joining consecutive vertices, closing back to the first.
pub fn polygon(vertices: &[Point]) -> Vec<Curve> {
    let n = vertices.len();
    (0..n)
        .map(|i| Curve::line(vertices[i], vertices[(i + 1) % n]))
        .collect()
}

pub fn rectangle(center: (f64, f64), size: (f64, f64), rotation_deg: f64) -> Vec<Curve> {
    let (cx, cy) = center;
    let (hw, hh) = (size.0 / 2.0, size.1 / 2.0);
    let corners = [
        (cx - hw, cy - hh),
        (cx + hw, cy - hh),
        (cx + hw, cy + hh),
        (cx - hw, cy + hh),
    ];
    let pts: Vec<Point> = corners
        .iter()
        .map(|&(x, y)| {
            let (x, y) = rotate_about(x, y, cx, cy, rotation_deg);
            [x, y]
        })
        .collect();
    polygon(&pts)
}

/// Counter-clockwise rounded rectangle: four lines and four quarter arcs, alternating.
pub fn rounded_rectangle(
    center: (f64, f64),
    size: (f64, f64),
    corner_radius: f64,
    rotation_deg: f64,
) -> Vec<Curve> {
    let (cx, cy) = center;
    let (hw, hh) = (size.0 / 2.0, size.1 / 2.0);
    let r = corner_radius.min(hw).min(hh).max(0.0);

    if r == 0.0 {
        return rectangle(center, size, rotation_deg);
    }

    let rot = |x: f64, y: f64| -> Point {
        let (x, y) = rotate_about(x, y, cx, cy, rotation_deg);
        [x, y]
    };
    // Corner arc centers, starting bottom-right and going counter-clockwise.
    let corners = [
        (cx + hw - r, cy - hh + r, -90.0),
        (cx + hw - r, cy + hh - r, 0.0),
        (cx - hw + r, cy + hh - r, 90.0),
        (cx - hw + r, cy - hh + r, 180.0),
    ];

    let mut curves = Vec::with_capacity(8);
    for (i, &(ax, ay, start)) in corners.iter().enumerate() {
        let (nx, ny, next_start) = corners[(i + 1) % corners.len()];
        let arc_center = rot(ax, ay);
        curves.push(Curve::Arc {
            center: arc_center,
            radius: r,
            start_angle: (start + rotation_deg).to_radians(),
            sweep: PI / 2.0,
        });
        let end_angle = (start + 90.0_f64).to_radians();
        let next_angle = next_start.to_radians();
        curves.push(Curve::line(
            rot(ax + r * end_angle.cos(), ay + r * end_angle.sin()),
            rot(nx + r * next_angle.cos(), ny + r * next_angle.sin()),
        ));
    }
    curves
}

/// A full circle as two half arcs sharing both endpoints.
pub fn circle(center: (f64, f64), radius: f64) -> Vec<Curve> {
    let c = [center.0, center.1];
    vec![
        Curve::Arc {
            center: c,
            radius,
            start_angle: PI,
            sweep: PI,
        },
        Curve::Arc {
            center: c,
            radius,
            start_angle: 0.0,
            sweep: PI,
        },
    ]
}
