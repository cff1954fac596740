use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::comparator::{PerimeterComparator, DEFAULT_MAX_ORDER};
use crate::tracer::NextEdgePolicy;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LimitsError {
    #[error("prefer_outer_probability must lie in [0, 1], got {0}")]
    Probability(f64),
    #[error("loop_step_limit must be at least 1")]
    ZeroStepLimit,
    #[error("max_derivative_order must be at least 1")]
    ZeroDerivativeOrder,
}

/// Safety valves and traversal knobs for one extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionLimits {
    /// Network snapshots allowed while junctions remain.
    pub iteration_limit: usize,
    /// Steps a single loop trace may take; `None` is unbounded.
    pub loop_step_limit: Option<usize>,
    pub prefer_outer_probability: f64,
    pub max_derivative_order: usize,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            iteration_limit: 64,
            loop_step_limit: Some(10_000),
            prefer_outer_probability: 0.5,
            max_derivative_order: DEFAULT_MAX_ORDER,
        }
    }
}

impl ExtractionLimits {
    pub fn validate(&self) -> Result<(), LimitsError> {
        if !(0.0..=1.0).contains(&self.prefer_outer_probability) {
            return Err(LimitsError::Probability(self.prefer_outer_probability));
        }
        if self.loop_step_limit == Some(0) {
            return Err(LimitsError::ZeroStepLimit);
        }
        if self.max_derivative_order == 0 {
            return Err(LimitsError::ZeroDerivativeOrder);
        }
        Ok(())
    }
}

/// How the tracer orders candidate edges, as named in configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Random,
    Perimeter,
}

impl PolicyKind {
    #[must_use]
    pub fn policy(self, limits: &ExtractionLimits, precision: f64) -> NextEdgePolicy {
        match self {
            Self::Random => NextEdgePolicy::Random {
                prefer_outer_probability: limits.prefer_outer_probability,
            },
            Self::Perimeter => NextEdgePolicy::Perimeter(PerimeterComparator {
                precision,
                max_order: limits.max_derivative_order,
                ..PerimeterComparator::default()
            }),
        }
    }
}
