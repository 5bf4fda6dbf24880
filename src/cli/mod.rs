//! Command-line parsing for the `rfit` binary.
//!
//! Argument parsing and command dispatch stay separate from the fitting code:
//! this module only describes flags, `crate::app` turns them into configs.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::domain::ModelKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rfit", version, about = "RANSAC line/parabola fitting on 2D point clouds")]
pub struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace). `RUST_LOG` applies when absent.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a model once and print the summary (optionally with an ASCII plot).
    Fit(FitArgs),
    /// Step through rounds one at a time, writing an SVG chart per round.
    Demo(DemoArgs),
    /// Fit many independently seeded datasets in parallel and report success rates.
    Sweep(SweepArgs),
    /// Launch the interactive round stepper.
    Tui(CommonArgs),
}

/// Data source and fitting options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Model family to fit.
    #[arg(short = 'm', long, value_enum, default_value_t = ModelKind::Line)]
    pub model: ModelKind,

    /// Seed for synthetic data generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Seed for the RANSAC sampler (defaults to `--seed`).
    #[arg(long)]
    pub fit_seed: Option<u64>,

    /// Number of synthetic inlier points.
    #[arg(short = 'n', long, default_value_t = 500)]
    pub count: usize,

    /// Synthetic outliers as a fraction of `--count`.
    #[arg(long, default_value_t = 0.4)]
    pub outlier_ratio: f64,

    /// Read points from a CSV file instead of generating them.
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Inlier distance threshold (default: 1.5 for lines, 2.0 for parabolas).
    #[arg(short = 'd', long)]
    pub max_distance: Option<f64>,

    /// Minimum inlier fraction of the point count for acceptance.
    #[arg(short = 'r', long, default_value_t = 0.6)]
    pub ratio: f64,

    /// Round budget.
    #[arg(long, default_value_t = 1000)]
    pub max_iterations: usize,

    /// Ignore `--max-iterations` and loop until a model is accepted.
    #[arg(long)]
    pub unbounded: bool,
}

/// Output format of `fit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Summary format on stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Rounds to run before giving up.
    #[arg(long, default_value_t = 10)]
    pub max_rounds: usize,

    /// Directory for the per-round SVG charts (old charts are removed).
    #[arg(short = 'o', long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Chart size in pixels.
    #[arg(long, default_value_t = 900)]
    pub chart_size: u32,
}

#[derive(Debug, Args, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Number of datasets; run `k` uses data seed `--seed + k`.
    #[arg(long, default_value_t = 100)]
    pub runs: usize,

    /// Worker threads (default: one per core).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Summary format on stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}
