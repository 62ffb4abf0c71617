// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: Reconstruct in-wall pipe segments from a raw scan log
//!
//! Usage:
//!   scan-to-pipes <INPUT> [options]

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use inwall_pipes::{run, FitStrategy, ReconstructionConfig, RunContext};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    AxisBinning,
    PathSimplification,
}

impl From<StrategyArg> for FitStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::AxisBinning => FitStrategy::AxisBinning,
            StrategyArg::PathSimplification => FitStrategy::PathSimplification,
        }
    }
}

/// Reconstruct pipe centerlines from an in-wall scan
#[derive(Parser, Debug)]
#[command(name = "scan-to-pipes", version, about)]
struct Args {
    /// Raw sensor log (`x: .. cm, y: .. cm, z: .. cm, a: ..` lines)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// JSON file with reconstruction parameters
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Segment fitting strategy
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Clustering neighbourhood radius (cm)
    #[arg(long)]
    eps: Option<f64>,

    /// Minimum neighbours for a dense point
    #[arg(long)]
    min_pts: Option<usize>,

    /// Binning and snapping tolerance on both axes (cm)
    #[arg(long)]
    tolerance: Option<f64>,

    /// Shortest binned segment kept (cm)
    #[arg(long)]
    min_length: Option<f64>,

    /// Segment CSV output
    #[arg(long, value_name = "FILE", default_value = "segments.txt")]
    output: PathBuf,

    /// Also write the WALL/PIPE coordinate file for the model exporter
    #[arg(long, value_name = "FILE")]
    model_output: Option<PathBuf>,

    /// Also write the hit-only point dump
    #[arg(long, value_name = "FILE")]
    clean_output: Option<PathBuf>,

    /// Print the result as JSON on stdout instead of a summary
    #[arg(long)]
    json: bool,
}

impl Args {
    fn resolve_config(&self) -> Result<ReconstructionConfig> {
        let mut config = match &self.config {
            Some(path) => ReconstructionConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ReconstructionConfig::default(),
        };

        if let Some(strategy) = self.strategy {
            config.strategy = strategy.into();
        }
        if let Some(eps) = self.eps {
            config.cluster_eps = eps;
        }
        if let Some(min_pts) = self.min_pts {
            config.cluster_min_pts = min_pts;
        }
        if let Some(tolerance) = self.tolerance {
            config.x_tolerance = tolerance;
            config.y_tolerance = tolerance;
        }
        if let Some(min_length) = self.min_length {
            config.min_segment_length = min_length;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,inwall_pipes=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.resolve_config()?;
    let ctx = RunContext::new(config, &args.input)
        .with_segments_output(&args.output)
        .with_model_output(args.model_output.clone())
        .with_clean_output(args.clean_output.clone());

    let reconstruction = run(&ctx)
        .with_context(|| format!("reconstructing pipes from {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reconstruction.output)?);
        return Ok(());
    }

    let stats = &reconstruction.stats;
    let bounds = &reconstruction.output.bounds;
    println!("=== In-Wall Pipe Reconstruction ===");
    println!("  Points: {} hits, {} misses", stats.hit_count, stats.miss_count);
    println!(
        "  Wall: {:.1} x {:.1} cm, depth {:.1} cm",
        bounds.max_x, bounds.max_y, bounds.depth
    );
    println!(
        "  Clusters: {} ({} noise points, {} skipped)",
        stats.cluster_count, stats.noise_points, stats.skipped_clusters
    );
    println!(
        "  Segments: {} candidates -> {} final ({} merged)",
        stats.candidate_segments, stats.final_count, stats.merged_segments
    );
    println!("Wrote {}", ctx.segments_output.display());
    if let Some(path) = &ctx.model_output {
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &ctx.clean_output {
        println!("Wrote {}", path.display());
    }

    Ok(())
}
