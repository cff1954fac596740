use perimeter_core::{orient_chain, Containment, CurveOps, RegionOps};
use perimeter_geometry::primitives::{rectangle, rounded_rectangle};
use perimeter_geometry::{Curve, PlanarKernel, Region, VertexPool};
use proptest::prelude::*;

fn face(kernel: &PlanarKernel, curves: Vec<Curve>) -> Region {
    let mut pool = VertexPool::default();
    let edges = orient_chain(pool.edges(curves)).unwrap();
    kernel.face_from_loop(&edges).unwrap()
}

proptest! {
    #[test]
    fn union_of_disjoint_rectangles_keeps_both_areas(
        w1 in 1.0f64..50.0,
        h1 in 1.0f64..50.0,
        w2 in 1.0f64..50.0,
        h2 in 1.0f64..50.0,
        gap in 5.0f64..50.0,
    ) {
        let kernel = PlanarKernel::default();
        let a = face(&kernel, rectangle((0.0, 0.0), (w1, h1), 0.0));
        let offset_x = (w1 / 2.0) + (w2 / 2.0) + gap;
        let b = face(&kernel, rectangle((offset_x, 0.0), (w2, h2), 0.0));

        let u = kernel.union(&a, &b);
        prop_assert_eq!(u.pos.len(), 2);
        prop_assert!(u.neg.is_empty());
        prop_assert!((kernel.area(&u) - (w1 * h1 + w2 * h2)).abs() < 1e-6);
    }

    #[test]
    fn rounded_rectangle_edges_lie_on_their_face(
        w in 4.0f64..50.0,
        h in 4.0f64..50.0,
        radius in 0.25f64..2.0,
    ) {
        let kernel = PlanarKernel::default();
        let curves = rounded_rectangle((0.0, 0.0), (w, h), radius, 0.0);
        let mut pool = VertexPool::default();
        let edges = orient_chain(pool.edges(curves)).unwrap();
        let region = kernel.face_from_loop(&edges).unwrap();
        for edge in &edges {
            prop_assert_eq!(kernel.classify_edge(&region, edge), Containment::Boundary);
        }
        let expected = w * h - (4.0 - std::f64::consts::PI) * radius * radius;
        prop_assert!((kernel.area(&region) - expected).abs() < 1e-6);
    }

    #[test]
    fn chord_through_rectangle_is_inside(w in 2.0f64..50.0, h in 2.0f64..50.0) {
        let kernel = PlanarKernel::default();
        let region = face(&kernel, rectangle((0.0, 0.0), (w, h), 0.0));
        let mut pool = VertexPool::default();
        let diagonal = pool.edge(Curve::line([-w / 2.0, -h / 2.0], [w / 2.0, h / 2.0]));
        prop_assert_eq!(kernel.classify_edge(&region, &diagonal), Containment::Inside);
        prop_assert!(diagonal.curve.length() > 0.0);
    }
}
