use std::collections::BTreeSet;

use perimeter_core::{Containment, CurveOps, Edge, EdgeId, RegionOps, TopologyError, VertexId};
use perimeter_geometry::primitives::{circle, rectangle, rounded_rectangle};
use perimeter_geometry::{Curve, PlanarKernel, VertexPool};
use perimeter_topology::{
    ExtractionLimits, ExtractionProgress, FarthestFromCentroid, NextEdgePolicy, NoOuterHint,
    OuterWireExtractor, PerimeterComparator, Wire,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn edges(curves: Vec<Curve>) -> Vec<Edge<Curve>> {
    VertexPool::default().edges(curves)
}

fn ids(wire: &Wire<Curve>) -> BTreeSet<EdgeId> {
    wire.ids().into_iter().collect()
}

fn assert_closed_chain(wire: &Wire<Curve>) {
    for (i, edge) in wire.edges.iter().enumerate() {
        let next = &wire.edges[(i + 1) % wire.len()];
        assert_eq!(edge.end, next.start, "edge {} does not lead into {}", edge.id, next.id);
    }
}

fn square_with_diagonal() -> Vec<Curve> {
    let mut curves = rectangle((0.5, 0.5), (1.0, 1.0), 0.0);
    curves.push(Curve::line([0.0, 0.0], [1.0, 1.0]));
    curves
}

#[test]
fn square_is_extracted_in_one_iteration() {
    let kernel = PlanarKernel::default();
    let extractor = OuterWireExtractor::new(&kernel, FarthestFromCentroid::default());
    let mut progress = ExtractionProgress::default();
    let wire = extractor
        .extract_outer_wire(
            edges(rectangle((0.5, 0.5), (1.0, 1.0), 0.0)),
            &mut progress,
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap();

    assert_eq!(wire.len(), 4);
    assert_eq!(wire.iterations, 1);
    assert_eq!(ids(&wire), (0..4).map(EdgeId).collect());
    assert_closed_chain(&wire);
    assert_eq!(progress.iterations, 1);
    assert_eq!(progress.backtracks, 0);
    assert!(progress.loops.is_empty());
}

#[test]
fn diagonal_is_discarded_after_several_iterations() {
    let kernel = PlanarKernel::default();
    let extractor = OuterWireExtractor::new(&kernel, FarthestFromCentroid::default());
    for seed in 0..20 {
        let mut progress = ExtractionProgress::default();
        let wire = extractor
            .extract_outer_wire(
                edges(square_with_diagonal()),
                &mut progress,
                &mut StdRng::seed_from_u64(seed),
            )
            .unwrap();
        assert!(wire.iterations >= 2, "seed {seed}: {} iterations", wire.iterations);
        assert_eq!(ids(&wire), (0..4).map(EdgeId).collect(), "seed {seed}");
        assert_closed_chain(&wire);
        assert_eq!(progress.loops.len(), progress.iterations - 1);
    }
}

#[test]
fn perimeter_policy_claims_the_square_first() {
    let kernel = PlanarKernel::default();
    let extractor = OuterWireExtractor::new(&kernel, FarthestFromCentroid::default())
        .with_policy(NextEdgePolicy::Perimeter(PerimeterComparator::default()));
    for seed in 0..8 {
        let mut progress = ExtractionProgress::default();
        let wire = extractor
            .extract_outer_wire(
                edges(square_with_diagonal()),
                &mut progress,
                &mut StdRng::seed_from_u64(seed),
            )
            .unwrap();
        assert_eq!(wire.iterations, 2);
        assert_eq!(progress.loops.len(), 1);
        assert_eq!(progress.loops[0].edges.len(), 4);
        assert_eq!(ids(&wire), (0..4).map(EdgeId).collect());
    }
}

#[test]
fn single_edge_is_its_own_wire() {
    let kernel = PlanarKernel::default();
    let extractor = OuterWireExtractor::new(&kernel, NoOuterHint);
    let input = edges(vec![Curve::arc([0.0, 0.0], 1.0, 0.0, 360.0).unwrap()]);
    let mut progress = ExtractionProgress::default();
    let wire = extractor
        .extract_outer_wire(input.clone(), &mut progress, &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(wire.edges, input);
    assert_eq!(wire.iterations, 0);
    assert_eq!(progress.iterations, 0);
}

#[test]
fn empty_input_is_invalid() {
    let kernel = PlanarKernel::default();
    let extractor = OuterWireExtractor::new(&kernel, NoOuterHint);
    let result = extractor.extract_outer_wire(
        Vec::<Edge<Curve>>::new(),
        &mut ExtractionProgress::default(),
        &mut StdRng::seed_from_u64(0),
    );
    assert!(matches!(result, Err(TopologyError::InvalidTopology { .. })));
}

#[test]
fn iteration_limit_is_enforced() {
    let kernel = PlanarKernel::default();
    let extractor = OuterWireExtractor::new(&kernel, NoOuterHint);
    let limits = ExtractionLimits {
        iteration_limit: 0,
        ..ExtractionLimits::default()
    };
    let mut progress = ExtractionProgress::new(&limits);
    let result = extractor.extract_outer_wire(
        edges(square_with_diagonal()),
        &mut progress,
        &mut StdRng::seed_from_u64(0),
    );
    assert_eq!(
        result,
        Err(TopologyError::IterationLimitExceeded {
            limit: 0,
            iterations: 1,
        })
    );

    // A junction-free input never needs a second snapshot, so the limit does not apply.
    let mut progress = ExtractionProgress::new(&limits);
    let wire = extractor
        .extract_outer_wire(
            edges(rectangle((0.0, 0.0), (1.0, 1.0), 0.0)),
            &mut progress,
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap();
    assert_eq!(wire.len(), 4);
}

#[test]
fn dangling_spur_is_dropped() {
    let kernel = PlanarKernel::default();
    let extractor = OuterWireExtractor::new(&kernel, FarthestFromCentroid::default());
    let mut curves = rectangle((0.5, 0.5), (1.0, 1.0), 0.0);
    curves.push(Curve::line([1.0, 1.0], [2.0, 2.0]));
    curves.push(Curve::line([2.0, 2.0], [2.0, 3.0]));
    let wire = extractor
        .extract_outer_wire(
            edges(curves),
            &mut ExtractionProgress::default(),
            &mut StdRng::seed_from_u64(4),
        )
        .unwrap();
    assert_eq!(ids(&wire), (0..4).map(EdgeId).collect());
    assert_eq!(wire.iterations, 1);
}

#[test]
fn open_chain_has_no_loop() {
    let kernel = PlanarKernel::default();
    let extractor = OuterWireExtractor::new(&kernel, NoOuterHint);
    let result = extractor.extract_outer_wire(
        edges(vec![
            Curve::line([0.0, 0.0], [1.0, 0.0]),
            Curve::line([1.0, 0.0], [1.0, 1.0]),
        ]),
        &mut ExtractionProgress::default(),
        &mut StdRng::seed_from_u64(0),
    );
    assert!(matches!(result, Err(TopologyError::NoLoopFound { .. })));
}

#[test]
fn coincident_duplicates_are_merged() {
    let kernel = PlanarKernel::default();
    let extractor = OuterWireExtractor::new(&kernel, NoOuterHint);
    let mut curves = rectangle((0.5, 0.5), (1.0, 1.0), 0.0);
    curves.push(curves[0].reversed());
    let wire = extractor
        .extract_outer_wire(
            edges(curves),
            &mut ExtractionProgress::default(),
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap();
    assert_eq!(ids(&wire), (0..4).map(EdgeId).collect());
    assert_eq!(wire.iterations, 1);
}

#[test]
fn largest_of_several_cycles_wins() {
    let kernel = PlanarKernel::default();
    let extractor = OuterWireExtractor::new(&kernel, NoOuterHint);
    let mut curves = rectangle((0.0, 0.0), (1.0, 1.0), 0.0);
    curves.extend(rectangle((10.0, 0.0), (3.0, 3.0), 0.0));
    curves.extend(circle((-10.0, 0.0), 1.0));
    let wire = extractor
        .extract_outer_wire(
            edges(curves),
            &mut ExtractionProgress::default(),
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap();
    assert_eq!(ids(&wire), (4..8).map(EdgeId).collect());
    assert_closed_chain(&wire);
}

#[test]
fn chord_across_rounded_rectangle_is_discarded() {
    let kernel = PlanarKernel::default();
    let extractor = OuterWireExtractor::new(&kernel, FarthestFromCentroid::default());
    let mut curves = rounded_rectangle((0.0, 0.0), (4.0, 2.0), 0.5, 0.0);
    curves.push(Curve::line([1.5, -1.0], [1.5, 1.0]));
    for seed in 0..10 {
        let mut progress = ExtractionProgress::default();
        let wire = extractor
            .extract_outer_wire(
                edges(curves.clone()),
                &mut progress,
                &mut StdRng::seed_from_u64(seed),
            )
            .unwrap();
        assert_eq!(ids(&wire), (0..8).map(EdgeId).collect(), "seed {seed}");
        assert!(wire.iterations >= 2);
        assert_closed_chain(&wire);
    }
}

#[test]
fn closure_classifier_is_accepted() {
    let kernel = PlanarKernel::default();
    let bottom_only = |e: &Edge<Curve>, _: &perimeter_topology::EdgeNetwork<Curve>| {
        e.id == EdgeId(0)
    };
    let extractor = OuterWireExtractor::new(&kernel, bottom_only).with_precision(1e-9);
    let wire = extractor
        .extract_outer_wire(
            edges(square_with_diagonal()),
            &mut ExtractionProgress::default(),
            &mut StdRng::seed_from_u64(11),
        )
        .unwrap();
    assert_eq!(wire.len(), 4);
}

#[test]
fn side_given_whole_and_in_halves_keeps_the_halves() {
    let kernel = PlanarKernel::default();
    let mut curves = rectangle((0.5, 0.5), (1.0, 1.0), 0.0);
    curves.push(Curve::line([0.0, 0.0], [0.5, 0.0]));
    curves.push(Curve::line([0.5, 0.0], [1.0, 0.0]));
    let policies = [
        NextEdgePolicy::default(),
        NextEdgePolicy::Perimeter(PerimeterComparator::default()),
    ];
    for policy in policies {
        let extractor =
            OuterWireExtractor::new(&kernel, FarthestFromCentroid::default()).with_policy(policy);
        for seed in 0..20 {
            let wire = extractor
                .extract_outer_wire(
                    edges(curves.clone()),
                    &mut ExtractionProgress::default(),
                    &mut StdRng::seed_from_u64(seed),
                )
                .unwrap();
            assert_eq!(ids(&wire), (1..6).map(EdgeId).collect(), "seed {seed}");
            assert_eq!(wire.iterations, 1);
            assert_closed_chain(&wire);
        }
    }
}

#[test]
fn plate_with_a_round_hole_keeps_the_plate() {
    let kernel = PlanarKernel::default();
    let extractor = OuterWireExtractor::new(&kernel, FarthestFromCentroid::default());
    let mut curves = rectangle((0.0, 0.0), (4.0, 4.0), 0.0);
    curves.push(Curve::arc([0.0, 0.0], 0.5, 0.0, 360.0).unwrap());
    let mut progress = ExtractionProgress::default();
    let wire = extractor
        .extract_outer_wire(edges(curves), &mut progress, &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(ids(&wire), (0..4).map(EdgeId).collect());
    assert_eq!(wire.iterations, 1);
    assert_closed_chain(&wire);
}

#[test]
fn enclosing_closed_edge_wins_over_the_network() {
    let kernel = PlanarKernel::default();
    let extractor = OuterWireExtractor::new(&kernel, NoOuterHint);
    let mut curves = square_with_diagonal();
    curves.push(Curve::arc([0.5, 0.5], 5.0, 90.0, -360.0).unwrap());
    let wire = extractor
        .extract_outer_wire(
            edges(curves),
            &mut ExtractionProgress::default(),
            &mut StdRng::seed_from_u64(2),
        )
        .unwrap();
    assert_eq!(wire.ids(), vec![EdgeId(5)]);
    assert!(wire.iterations >= 2);
}

#[test]
fn closed_edges_alone_pick_the_largest() {
    let kernel = PlanarKernel::default();
    let extractor = OuterWireExtractor::new(&kernel, NoOuterHint);
    let curves = vec![
        Curve::arc([0.0, 0.0], 1.0, 0.0, 360.0).unwrap(),
        Curve::arc([0.0, 0.0], 3.0, 0.0, 360.0).unwrap(),
    ];
    let mut progress = ExtractionProgress::default();
    let wire = extractor
        .extract_outer_wire(edges(curves), &mut progress, &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(wire.ids(), vec![EdgeId(1)]);
    assert_eq!(wire.iterations, 0);
}

/// A kernel whose faces never enclose anything, so no traced loop can extend a claim.
struct Flat;

impl RegionOps<Curve> for Flat {
    type Region = ();

    fn empty_region(&self) {}

    fn face_from_loop(&self, _edges: &[Edge<Curve>]) -> Result<(), TopologyError> {
        Ok(())
    }

    fn union(&self, _a: &(), _b: &()) {}

    fn outer_boundary(&self, _region: &()) {}

    fn area(&self, _region: &()) -> f64 {
        0.0
    }

    fn classify_edge(&self, _region: &(), _edge: &Edge<Curve>) -> Containment {
        Containment::Boundary
    }
}

#[test]
fn passes_that_claim_nothing_fail_fast() {
    let extractor = OuterWireExtractor::new(&Flat, NoOuterHint);
    let mut progress = ExtractionProgress::default();
    let result = extractor.extract_outer_wire(
        edges(square_with_diagonal()),
        &mut progress,
        &mut StdRng::seed_from_u64(9),
    );
    match result {
        Err(TopologyError::InvalidTopology { vertices, .. }) => {
            let junctions: BTreeSet<VertexId> = vertices.into_iter().collect();
            assert_eq!(junctions, BTreeSet::from([VertexId(0), VertexId(2)]));
        }
        other => panic!("expected a stalled extraction, got {other:?}"),
    }
    assert_eq!(progress.iterations, 1);
    assert!(progress.loops.is_empty());
}
