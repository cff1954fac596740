use std::fmt::Write as _;

use perimeter_core::{CurveOps, Point};
use perimeter_geometry::Curve;
use perimeter_topology::{ExtractionProgress, Wire};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub seed: u64,
    pub iterations: usize,
    pub loops: usize,
    pub backtracks: usize,
    pub edges: Vec<EdgeReport>,
}

#[derive(Debug, Serialize)]
pub struct EdgeReport {
    pub id: usize,
    pub kind: &'static str,
    pub start: Point,
    pub end: Point,
    pub length: f64,
}

impl Report {
    pub fn new(wire: &Wire<Curve>, progress: &ExtractionProgress, seed: u64) -> Self {
        Self {
            seed,
            iterations: wire.iterations,
            loops: progress.loops.len(),
            backtracks: progress.backtracks,
            edges: wire
                .edges
                .iter()
                .map(|e| EdgeReport {
                    id: e.id.0,
                    kind: e.curve.kind(),
                    start: e.curve.start(),
                    end: e.curve.end(),
                    length: e.curve.length(),
                })
                .collect(),
        }
    }

    pub fn render(&self, format: Format) -> Result<String, serde_json::Error> {
        match format {
            Format::Json => serde_json::to_string_pretty(self).map(|s| s + "\n"),
            Format::Text => Ok(self.text()),
        }
    }

    fn text(&self) -> String {
        let mut out = format!(
            "wire: {} edges, {} iterations, {} loops claimed, {} backtracks (seed {})\n",
            self.edges.len(),
            self.iterations,
            self.loops,
            self.backtracks,
            self.seed
        );
        for e in &self.edges {
            let _ = writeln!(
                out,
                "e{:<4} {:<6} ({:.4}, {:.4}) -> ({:.4}, {:.4})",
                e.id, e.kind, e.start[0], e.start[1], e.end[0], e.end[1]
            );
        }
        out
    }
}
