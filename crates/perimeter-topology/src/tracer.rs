//! Single closed-loop walk over an [`EdgeNetwork`].
//!
//! The walk extends a path from the far end of the start edge, never revisiting an edge and
//! never stepping onto a vertex already inside the path, and backtracks out of dead ends. Each
//! call is one randomized attempt; the caller decides whether to try again from another start.

use std::collections::HashSet;

use perimeter_core::{CurveOps, Edge, EdgeId, TopologyError, VertexId};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

use crate::comparator::PerimeterComparator;
use crate::network::EdgeNetwork;

/// How candidate next edges are ordered at each step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NextEdgePolicy {
    /// Shuffle, then move each definite-outer candidate to the front with this probability.
    Random { prefer_outer_probability: f64 },
    /// The comparator's pick first, the remaining candidates shuffled behind it.
    Perimeter(PerimeterComparator),
}

impl Default for NextEdgePolicy {
    fn default() -> Self {
        Self::Random {
            prefer_outer_probability: 0.5,
        }
    }
}

/// Edges of the walk in visiting order, with a step budget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopSequence {
    edges: Vec<EdgeId>,
    step_limit: Option<usize>,
    steps: usize,
}

impl LoopSequence {
    #[must_use]
    pub fn new(step_limit: Option<usize>) -> Self {
        Self {
            edges: Vec::new(),
            step_limit,
            steps: 0,
        }
    }

    /// Count one step of the walk, failing once the budget is spent.
    pub fn step(&mut self) -> Result<(), TopologyError> {
        self.steps += 1;
        match self.step_limit {
            Some(limit) if self.steps > limit => Err(TopologyError::StepLimitExceeded {
                limit,
                steps: self.steps,
                sequence: self.edges.clone(),
            }),
            _ => Ok(()),
        }
    }

    pub fn push(&mut self, edge: EdgeId) {
        self.edges.push(edge);
    }

    pub fn pop(&mut self) -> Option<EdgeId> {
        self.edges.pop()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<EdgeId> {
        self.edges.last().copied()
    }

    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    #[must_use]
    pub fn as_slice(&self) -> &[EdgeId] {
        &self.edges
    }
}

/// A closed loop in walk order. Consecutive edges share a vertex and the last edge returns to
/// the start edge's start vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedLoop {
    pub edges: Vec<EdgeId>,
    pub steps: usize,
    pub backtracks: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceState {
    Walking,
    Backtrack,
    Closed,
    Failed,
}

struct Walk {
    start: EdgeId,
    /// Vertices of the path; the first is where the loop must close, the last is the open end.
    path: Vec<VertexId>,
    sequence: LoopSequence,
    visited: HashSet<EdgeId>,
    backtracks: usize,
}

impl Walk {
    fn open_end(&self) -> Option<VertexId> {
        self.path.last().copied()
    }

    fn closes_at(&self) -> Option<VertexId> {
        self.path.first().copied()
    }

    fn extend(&mut self, edge: EdgeId, far: VertexId) {
        self.visited.insert(edge);
        self.sequence.push(edge);
        self.path.push(far);
    }

    fn finish(self) -> TracedLoop {
        TracedLoop {
            steps: self.sequence.steps(),
            edges: self.sequence.edges,
            backtracks: self.backtracks,
        }
    }
}

pub struct LoopTracer<'n, C> {
    network: &'n EdgeNetwork<C>,
    policy: NextEdgePolicy,
    step_limit: Option<usize>,
}

impl<'n, C: CurveOps> LoopTracer<'n, C> {
    #[must_use]
    pub fn new(network: &'n EdgeNetwork<C>) -> Self {
        Self {
            network,
            policy: NextEdgePolicy::default(),
            step_limit: None,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: NextEdgePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_step_limit(mut self, step_limit: Option<usize>) -> Self {
        self.step_limit = step_limit;
        self
    }

    /// Walk from `start` until the path returns to `start`'s start vertex.
    pub fn trace<R: Rng>(
        &self,
        start: EdgeId,
        rng: &mut R,
    ) -> Result<TracedLoop, TopologyError> {
        let first = self.network.edge(start).ok_or_else(|| {
            TopologyError::invalid("start edge is not part of the network").with_edges(vec![start])
        })?;
        let mut walk = Walk {
            start,
            path: vec![first.start, first.end],
            sequence: LoopSequence::new(self.step_limit),
            visited: HashSet::from([start]),
            backtracks: 0,
        };
        walk.sequence.push(start);

        loop {
            walk.sequence.step()?;
            let state = self.advance(&mut walk, rng)?;
            trace!(
                ?state,
                start = %start,
                depth = walk.sequence.len(),
                steps = walk.sequence.steps(),
                "loop trace step"
            );
            match state {
                TraceState::Walking | TraceState::Backtrack => {}
                TraceState::Closed => return Ok(walk.finish()),
                TraceState::Failed => {
                    let mut considered: Vec<EdgeId> = walk.visited.into_iter().collect();
                    considered.sort_unstable();
                    return Err(TopologyError::NoLoopFound {
                        start: Some(start),
                        edges: considered,
                    });
                }
            }
        }
    }

    fn advance<R: Rng>(
        &self,
        walk: &mut Walk,
        rng: &mut R,
    ) -> Result<TraceState, TopologyError> {
        let (Some(top), Some(open_end), Some(closes_at)) =
            (walk.sequence.last(), walk.open_end(), walk.closes_at())
        else {
            return Ok(TraceState::Failed);
        };

        let candidates = self.candidates(walk, top, open_end);
        if let Some(next) = self.order(top, open_end, candidates, rng)?.first().copied() {
            let far = self.network.complementary_vertex(next, open_end)?;
            walk.extend(next, far);
            return Ok(if far == closes_at {
                TraceState::Closed
            } else {
                TraceState::Walking
            });
        }

        if walk.sequence.len() == 1 {
            return Ok(match self.self_closing(walk, closes_at, open_end) {
                Some(closing) => {
                    walk.extend(closing, closes_at);
                    TraceState::Closed
                }
                None => TraceState::Failed,
            });
        }

        walk.sequence.pop();
        walk.path.pop();
        walk.backtracks += 1;
        Ok(TraceState::Backtrack)
    }

    /// Unvisited edges leaving `open_end` that share only that vertex with `top` and do not
    /// land on a vertex already inside the path.
    fn candidates(&self, walk: &Walk, top: EdgeId, open_end: VertexId) -> Vec<EdgeId> {
        let interior = &walk.path[1..];
        self.network
            .singly_connected_neighbors(top)
            .into_iter()
            .filter(|n| n.shared == open_end && !walk.visited.contains(&n.neighbor))
            .filter(|n| {
                self.network
                    .complementary_vertex(n.neighbor, open_end)
                    .is_ok_and(|far| !interior.contains(&far))
            })
            .map(|n| n.neighbor)
            .collect()
    }

    /// A second edge joining exactly the two vertices of the start edge.
    fn self_closing(&self, walk: &Walk, v_start: VertexId, v_end: VertexId) -> Option<EdgeId> {
        self.network.adjacent_edges(walk.start).find(|id| {
            !walk.visited.contains(id)
                && self.network.edge(*id).is_some_and(|e| {
                    (e.start == v_start && e.end == v_end) || (e.start == v_end && e.end == v_start)
                })
        })
    }

    fn order<R: Rng>(
        &self,
        top: EdgeId,
        open_end: VertexId,
        mut candidates: Vec<EdgeId>,
        rng: &mut R,
    ) -> Result<Vec<EdgeId>, TopologyError> {
        candidates.shuffle(rng);
        match self.policy {
            NextEdgePolicy::Random {
                prefer_outer_probability,
            } => {
                let p = if prefer_outer_probability.is_nan() {
                    0.0
                } else {
                    prefer_outer_probability.clamp(0.0, 1.0)
                };
                let (front, back): (Vec<EdgeId>, Vec<EdgeId>) =
                    candidates.into_iter().partition(|id| {
                        self.network.is_definite_outer(*id) && rng.random_bool(p)
                    });
                Ok(front.into_iter().chain(back).collect())
            }
            NextEdgePolicy::Perimeter(comparator) => {
                if candidates.len() < 2 {
                    return Ok(candidates);
                }
                let (Some(from), Some(point)) =
                    (self.network.edge(top), self.network.vertex_position(open_end))
                else {
                    return Ok(candidates);
                };
                let options: Vec<&Edge<C>> = candidates
                    .iter()
                    .filter_map(|id| self.network.edge(*id))
                    .collect();
                let pick = comparator.select(from, &options, point)?.id;
                candidates.retain(|id| *id != pick);
                candidates.insert(0, pick);
                Ok(candidates)
            }
        }
    }
}
