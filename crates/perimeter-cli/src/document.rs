use std::path::Path;

use anyhow::{Context, Result};
use perimeter_core::{Point, DEFAULT_PRECISION};
use perimeter_geometry::{Curve, GeometryError};
use perimeter_topology::{ExtractionLimits, PolicyKind};
use serde::Deserialize;

/// An extraction request: curves plus the knobs that drive the walk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    #[serde(default = "default_precision")]
    pub precision: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub limits: ExtractionLimits,
    #[serde(default)]
    pub policy: PolicyKind,
    #[serde(default)]
    pub classifier: ClassifierKind,
    pub edges: Vec<EdgeSpec>,
}

fn default_precision() -> f64 {
    DEFAULT_PRECISION
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    #[default]
    Farthest,
    #[serde(rename = "none")]
    Unhinted,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeSpec {
    Line([Point; 2]),
    Arc {
        center: Point,
        radius: f64,
        start_deg: f64,
        sweep_deg: f64,
    },
    /// Start, a point on the arc, end.
    ArcThrough([Point; 3]),
    Bezier(Vec<Point>),
}

impl EdgeSpec {
    pub fn to_curve(&self) -> Result<Curve, GeometryError> {
        match self {
            EdgeSpec::Line([a, b]) => Ok(Curve::line(*a, *b)),
            EdgeSpec::Arc {
                center,
                radius,
                start_deg,
                sweep_deg,
            } => Curve::arc(*center, *radius, *start_deg, *sweep_deg),
            EdgeSpec::ArcThrough([a, through, b]) => Curve::arc_through(*a, *through, *b),
            EdgeSpec::Bezier(points) => Curve::bezier(points.clone()),
        }
    }
}

impl Document {
    /// Parse YAML (and therefore JSON) text.
    pub fn from_text(raw: &str) -> Result<Self> {
        let doc: Document = serde_yaml::from_str(raw).context("malformed edge document")?;
        doc.limits.validate().context("invalid limits")?;
        if !(doc.precision > 0.0) {
            anyhow::bail!("precision must be positive, got {}", doc.precision);
        }
        Ok(doc)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        Self::from_text(&raw).with_context(|| format!("in {}", path.display()))
    }

    pub fn curves(&self) -> Result<Vec<Curve>> {
        self.edges
            .iter()
            .enumerate()
            .map(|(i, spec)| spec.to_curve().with_context(|| format!("edge #{i}")))
            .collect()
    }
}
