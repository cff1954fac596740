use std::collections::{HashMap, HashSet};

use perimeter_core::{
    orient_chain, Containment, CurveOps, Edge, EdgeId, RegionOps, TopologyError, VertexId,
    DEFAULT_PRECISION,
};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::classify::OuterEdgeClassifier;
use crate::config::ExtractionLimits;
use crate::network::{EdgeNetwork, Topology};
use crate::tracer::{LoopTracer, NextEdgePolicy, TracedLoop};

/// What an extraction did, kept by the caller for diagnostics and assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionProgress {
    pub loops: Vec<TracedLoop>,
    /// Network snapshots built so far.
    pub iterations: usize,
    pub backtracks: usize,
    pub iteration_limit: usize,
    pub loop_step_limit: Option<usize>,
}

impl ExtractionProgress {
    #[must_use]
    pub fn new(limits: &ExtractionLimits) -> Self {
        Self {
            loops: Vec::new(),
            iterations: 0,
            backtracks: 0,
            iteration_limit: limits.iteration_limit,
            loop_step_limit: limits.loop_step_limit,
        }
    }
}

impl Default for ExtractionProgress {
    fn default() -> Self {
        Self::new(&ExtractionLimits::default())
    }
}

/// The outer loop, oriented head to tail.
#[derive(Debug, Clone, PartialEq)]
pub struct Wire<C> {
    pub edges: Vec<Edge<C>>,
    pub iterations: usize,
}

impl<C> Wire<C> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<EdgeId> {
        self.edges.iter().map(|e| e.id).collect()
    }
}

/// Repeatedly traces loops, claims the faces they enclose and drops the edges that end up
/// inside the claimed area, until no vertex joins more than two edges.
pub struct OuterWireExtractor<'k, K, D> {
    kernel: &'k K,
    classifier: D,
    policy: NextEdgePolicy,
    precision: f64,
}

impl<'k, K, D> OuterWireExtractor<'k, K, D> {
    #[must_use]
    pub fn new(kernel: &'k K, classifier: D) -> Self {
        Self {
            kernel,
            classifier,
            policy: NextEdgePolicy::default(),
            precision: DEFAULT_PRECISION,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: NextEdgePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    pub fn extract_outer_wire<C, R>(
        &self,
        edges: Vec<Edge<C>>,
        progress: &mut ExtractionProgress,
        rng: &mut R,
    ) -> Result<Wire<C>, TopologyError>
    where
        C: CurveOps,
        K: RegionOps<C>,
        D: OuterEdgeClassifier<C>,
        R: Rng,
    {
        if edges.is_empty() {
            return Err(TopologyError::invalid("no edges to extract a wire from"));
        }
        if edges.len() == 1 {
            return Ok(Wire {
                edges,
                iterations: progress.iterations,
            });
        }

        // A closed edge is a cycle on its own and never part of a junction.
        let (closed, open): (Vec<Edge<C>>, Vec<Edge<C>>) = merge_coincident(edges, self.precision)
            .into_iter()
            .partition(|e| e.is_closed());
        if let Some(degenerate) = closed.iter().find(|e| e.curve.is_degenerate(self.precision)) {
            return Err(TopologyError::invalid("degenerate edge")
                .with_edges(vec![degenerate.id])
                .with_vertices(vec![degenerate.start]));
        }
        let mut pool = drop_covered(open, self.precision);
        let mut claimed = self.kernel.empty_region();

        loop {
            pool = prune_dangling(pool);
            if pool.is_empty() {
                return self.assemble(Vec::new(), closed, &claimed, progress.iterations);
            }

            let network = match EdgeNetwork::build(pool, &self.classifier, self.precision)? {
                Topology::Network(network) => network,
                Topology::SingleEdge(edge) => {
                    return Ok(Wire {
                        edges: vec![edge],
                        iterations: progress.iterations,
                    })
                }
            };
            progress.iterations += 1;

            if !network.has_junction() {
                debug!(
                    iterations = progress.iterations,
                    edges = network.edge_count(),
                    closed = closed.len(),
                    "no junctions left"
                );
                return self.assemble(cycles(&network), closed, &claimed, progress.iterations);
            }
            if progress.iterations > progress.iteration_limit {
                return Err(TopologyError::IterationLimitExceeded {
                    limit: progress.iteration_limit,
                    iterations: progress.iterations,
                });
            }

            let claim = self.claim_next(&network, &claimed, progress.loop_step_limit, rng)?;
            debug!(
                iteration = progress.iterations,
                loop_edges = claim.traced.edges.len(),
                backtracks = claim.traced.backtracks,
                claimed_area = self.kernel.area(&claim.region),
                "claimed loop"
            );
            claimed = claim.region;
            progress.backtracks += claim.traced.backtracks;
            progress.loops.push(claim.traced);

            pool = network
                .into_edges()
                .into_iter()
                .filter(|e| !claim.inside.contains(&e.id))
                .collect();
        }
    }

    /// Trace from each eligible start edge in turn until a loop extends the claimed region,
    /// either by enclosing new area or by swallowing at least one edge.
    fn claim_next<C, R>(
        &self,
        network: &EdgeNetwork<C>,
        claimed: &K::Region,
        step_limit: Option<usize>,
        rng: &mut R,
    ) -> Result<Claim<K::Region>, TopologyError>
    where
        C: CurveOps,
        K: RegionOps<C>,
        R: Rng,
    {
        let eligible = |id: &EdgeId| {
            network
                .edge(*id)
                .is_some_and(|e| e.vertices().iter().all(|v| network.degree(*v) > 1))
        };
        let mut outer: Vec<EdgeId> = network.definite_outer_edges().filter(eligible).collect();
        let mut rest: Vec<EdgeId> = network
            .edges()
            .map(|e| e.id)
            .filter(|id| eligible(id) && !network.is_definite_outer(*id))
            .collect();
        outer.shuffle(rng);
        rest.shuffle(rng);

        let tracer = LoopTracer::new(network)
            .with_policy(self.policy)
            .with_step_limit(step_limit);
        let claimed_area = self.kernel.area(claimed);
        let mut tried = Vec::new();
        let mut stalled = Vec::new();
        for start in outer.into_iter().chain(rest) {
            let traced = match tracer.trace(start, rng) {
                Ok(traced) => traced,
                Err(err) if err.is_retryable() => {
                    debug!(start = %start, "no loop from start edge, trying the next");
                    tried.push(start);
                    continue;
                }
                Err(err) => return Err(err),
            };
            let loop_edges = traced
                .edges
                .iter()
                .filter_map(|id| network.edge(*id).cloned())
                .collect();
            let face = match self.kernel.face_from_loop(&orient_chain(loop_edges)?) {
                Ok(face) => face,
                Err(err) => {
                    debug!(start = %start, error = %err, "traced loop has no face, trying the next");
                    stalled.push(start);
                    continue;
                }
            };
            let region = self
                .kernel
                .outer_boundary(&self.kernel.union(claimed, &face));
            let inside: HashSet<EdgeId> = network
                .edges()
                .filter(|e| self.kernel.classify_edge(&region, e) == Containment::Inside)
                .map(|e| e.id)
                .collect();
            // Area gains below `precision` are boolean noise.
            let grown = self.kernel.area(&region) - claimed_area > self.precision;
            if grown || !inside.is_empty() {
                return Ok(Claim {
                    traced,
                    region,
                    inside,
                });
            }
            debug!(start = %start, "loop adds nothing to the claimed region, trying the next");
            stalled.push(start);
        }

        if stalled.is_empty() {
            return Err(TopologyError::NoLoopFound {
                start: None,
                edges: tried,
            });
        }
        Err(
            TopologyError::invalid("no traced loop extends the claimed region")
                .with_edges(stalled)
                .with_vertices(network.junctions().collect()),
        )
    }

    /// Pick the outer cycle among the cycles of a junction-free network and the closed edges.
    ///
    /// Closed edges inside the claimed region are discarded, as are candidates lying inside
    /// the winner.
    fn assemble<C>(
        &self,
        cycles: Vec<Vec<Edge<C>>>,
        closed: Vec<Edge<C>>,
        claimed: &K::Region,
        iterations: usize,
    ) -> Result<Wire<C>, TopologyError>
    where
        C: CurveOps,
        K: RegionOps<C>,
    {
        let mut candidates = Vec::with_capacity(cycles.len() + closed.len());
        for cycle in cycles {
            candidates.push(orient_chain(cycle)?);
        }
        for edge in closed {
            if self.kernel.classify_edge(claimed, &edge) == Containment::Inside {
                debug!(edge = %edge.id, "closed edge lies inside the claimed region");
                continue;
            }
            candidates.push(vec![edge]);
        }

        let mut faces = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match self.kernel.face_from_loop(&candidate) {
                Ok(face) => faces.push((self.kernel.area(&face), face, candidate)),
                Err(err) => debug!(error = %err, "cycle without a face skipped"),
            }
        }
        if faces.is_empty() {
            return Err(TopologyError::NoLoopFound {
                start: None,
                edges: Vec::new(),
            });
        }
        let mut best = 0;
        for (i, (area, _, _)) in faces.iter().enumerate().skip(1) {
            if *area > faces[best].0 {
                best = i;
            }
        }

        let (_, winner_face, winner) = faces.swap_remove(best);
        let outside = faces
            .iter()
            .filter(|(_, _, cycle)| {
                cycle.iter().any(|e| {
                    self.kernel.classify_edge(&winner_face, e) == Containment::Outside
                })
            })
            .count();
        if outside > 0 {
            warn!(
                discarded = outside,
                "network splits into several cycles, keeping the one enclosing the most area"
            );
        }
        Ok(Wire {
            edges: winner,
            iterations,
        })
    }
}

/// A loop accepted by [`OuterWireExtractor::claim_next`] and what it claims.
struct Claim<G> {
    traced: TracedLoop,
    region: G,
    inside: HashSet<EdgeId>,
}

/// Drop later edges that cover the same geometry as an earlier one.
fn merge_coincident<C: CurveOps>(edges: Vec<Edge<C>>, precision: f64) -> Vec<Edge<C>> {
    let mut kept: Vec<Edge<C>> = Vec::with_capacity(edges.len());
    for edge in edges {
        if let Some(original) = kept
            .iter()
            .find(|k| k.curve.coincides(&edge.curve, precision))
        {
            debug!(dropped = %edge.id, kept = %original.id, "merged coincident edge");
            continue;
        }
        kept.push(edge);
    }
    kept
}

/// Drop every edge whose whole extent is retraced by a chain of finer edges lying on it, so a
/// side given both whole and in pieces keeps only the pieces.
fn drop_covered<C: CurveOps>(edges: Vec<Edge<C>>, precision: f64) -> Vec<Edge<C>> {
    let covered: HashSet<EdgeId> = edges
        .iter()
        .filter(|whole| {
            let pieces: Vec<&Edge<C>> = edges
                .iter()
                .filter(|e| e.id != whole.id && whole.curve.covers(&e.curve, precision))
                .collect();
            chain_connects(&pieces, whole.start, whole.end)
        })
        .map(|e| e.id)
        .collect();
    if covered.is_empty() {
        return edges;
    }
    debug!(dropped = covered.len(), "dropped edges retraced by finer pieces");
    edges.into_iter().filter(|e| !covered.contains(&e.id)).collect()
}

/// Whether `pieces` link `from` to `to`.
fn chain_connects<C: CurveOps>(pieces: &[&Edge<C>], from: VertexId, to: VertexId) -> bool {
    let mut reached: HashSet<VertexId> = HashSet::from([from]);
    let mut frontier = vec![from];
    while let Some(at) = frontier.pop() {
        for piece in pieces {
            if let Some(next) = piece.other_vertex(at) {
                if next == to {
                    return true;
                }
                if reached.insert(next) {
                    frontier.push(next);
                }
            }
        }
    }
    false
}

/// Repeatedly remove edges with an endpoint no other edge reaches.
fn prune_dangling<C>(mut edges: Vec<Edge<C>>) -> Vec<Edge<C>> {
    loop {
        let mut incidence: HashMap<VertexId, usize> = HashMap::new();
        for edge in &edges {
            *incidence.entry(edge.start).or_default() += 1;
            *incidence.entry(edge.end).or_default() += 1;
        }
        let before = edges.len();
        edges.retain(|e| incidence[&e.start] > 1 && incidence[&e.end] > 1);
        if edges.len() == before {
            return edges;
        }
        debug!(pruned = before - edges.len(), "pruned dangling edges");
    }
}

/// Connected components in which every vertex joins exactly two edges, each in walk order.
fn cycles<C: CurveOps>(network: &EdgeNetwork<C>) -> Vec<Vec<Edge<C>>> {
    let mut seen: HashSet<EdgeId> = HashSet::new();
    let mut found = Vec::new();
    for first in network.edges() {
        if seen.contains(&first.id) {
            continue;
        }
        let mut walk = vec![first.clone()];
        seen.insert(first.id);
        let (mut at, mut previous) = (first.end, first.id);
        let closed = loop {
            if network.degree(at) != 2 {
                break false;
            }
            let Some(next) = network.edges_of(at).find(|id| *id != previous) else {
                break false;
            };
            if next == first.id {
                break true;
            }
            let Some(edge) = network.edge(next) else {
                break false;
            };
            let Some(far) = edge.other_vertex(at) else {
                break false;
            };
            if !seen.insert(next) {
                break false;
            }
            walk.push(edge.clone());
            at = far;
            previous = next;
        };
        if closed && walk.len() >= 2 {
            found.push(walk);
        }
    }
    found
}
