//! Shared "fit pipeline" logic used by the CLI and TUI front-ends.
//!
//! load points (synthetic or CSV) -> fit -> summary
//!
//! The front-ends then focus on presentation (printing vs widgets vs SVG).

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::data::synthetic;
use crate::domain::{DemoConfig, FitResult, Model, ModelKind, Point, PointSource};
use crate::error::AppError;
use crate::fit::{fit, normalize};
use crate::io::ingest;
use crate::report::{FitSummary, summarize};

/// Points ready for fitting, plus where they came from.
#[derive(Debug, Clone)]
pub struct LoadedPoints {
    pub points: Vec<Point>,
    /// Generating model of synthetic data.
    pub truth: Option<Model>,
    /// Rows skipped during CSV ingest.
    pub skipped_rows: usize,
}

/// All computed outputs of a single `rfit fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub data: LoadedPoints,
    pub result: FitResult,
    pub summary: FitSummary,
}

/// Generate or read the points described by `source`.
pub fn load_points(source: &PointSource, kind: ModelKind) -> Result<LoadedPoints, AppError> {
    match source {
        PointSource::Synthetic {
            count,
            outlier_ratio,
            seed,
        } => {
            let data = synthetic::generate(kind, *count, *outlier_ratio, *seed)?;
            info!(
                inliers = data.n_inliers,
                outliers = data.n_outliers,
                truth = %data.truth.equation(),
                "generated synthetic points"
            );
            Ok(LoadedPoints {
                points: data.points,
                truth: Some(data.truth),
                skipped_rows: 0,
            })
        }
        PointSource::Csv(path) => {
            let ingested = ingest::load_points(path)?;
            info!(
                path = %path.display(),
                points = ingested.points.len(),
                skipped = ingested.row_errors.len(),
                "read points from csv"
            );
            Ok(LoadedPoints {
                points: ingested.points,
                truth: None,
                skipped_rows: ingested.row_errors.len(),
            })
        }
    }
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &DemoConfig) -> Result<RunOutput, AppError> {
    let data = load_points(&config.source, config.model)?;
    run_fit_on(config, data)
}

/// Execute the fitting pipeline on already loaded points.
///
/// Used by the TUI where the points stay fixed across refits.
pub fn run_fit_on(config: &DemoConfig, data: LoadedPoints) -> Result<RunOutput, AppError> {
    let mut rng = StdRng::seed_from_u64(config.fit_seed);
    let result = fit(&data.points, config.model, &config.fit, &mut rng)?;

    let n_points = normalize(&data.points).len();
    let summary = summarize(
        &result,
        config.model,
        &config.fit,
        n_points,
        config.source_label(),
    );

    Ok(RunOutput {
        data,
        result,
        summary,
    })
}
