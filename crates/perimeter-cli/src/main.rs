use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use perimeter_geometry::{PlanarKernel, VertexPool};
use perimeter_topology::{
    ExtractionProgress, FarthestFromCentroid, NoOuterHint, OuterWireExtractor,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod document;
mod error;
mod report;

use document::{ClassifierKind, Document};
use error::{CliError, ErrorCode};
use report::{Format, Report};

#[derive(Parser)]
#[command(version, about = "Extract the outer wire from an unordered set of planar edges")]
struct Cli {
    /// Edge document (YAML or JSON)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Seed for the randomized walk; overrides the document's seed
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value = "text")]
    format: Format,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> Result<String, CliError> {
    let doc = Document::load(&cli.input).map_err(|e| CliError::input(format!("{e:#}")))?;
    let curves = doc
        .curves()
        .map_err(|e| CliError::input(format!("{e:#}")))?;
    let edges = VertexPool::new(doc.precision).edges(curves);
    let seed = cli.seed.or(doc.seed).unwrap_or(0);
    info!(edges = edges.len(), seed, "extracting outer wire");

    let kernel = PlanarKernel::new(doc.precision);
    let policy = doc.policy.policy(&doc.limits, doc.precision);
    let mut progress = ExtractionProgress::new(&doc.limits);
    let mut rng = StdRng::seed_from_u64(seed);
    let wire = match doc.classifier {
        ClassifierKind::Farthest => OuterWireExtractor::new(
            &kernel,
            FarthestFromCentroid {
                tolerance: doc.precision,
            },
        )
        .with_policy(policy)
        .with_precision(doc.precision)
        .extract_outer_wire(edges, &mut progress, &mut rng),
        ClassifierKind::Unhinted => OuterWireExtractor::new(&kernel, NoOuterHint)
            .with_policy(policy)
            .with_precision(doc.precision)
            .extract_outer_wire(edges, &mut progress, &mut rng),
    }
    .map_err(|e| CliError::processing(format!("extraction failed: {e}")))?;

    Report::new(&wire, &progress, seed)
        .render(cli.format)
        .map_err(|e| CliError::processing(e.to_string()))
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(ErrorCode::Usage as u8)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(out) => {
            print!("{out}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.code as u8)
        }
    }
}
