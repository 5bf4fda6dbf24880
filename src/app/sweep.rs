//! Many independent fits in parallel.
//!
//! Each run owns its data and its generator; rayon only distributes whole
//! runs, the fitting core itself stays single-threaded.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::app::pipeline::{LoadedPoints, load_points};
use crate::domain::{DemoConfig, PointSource};
use crate::error::AppError;
use crate::fit::fit;
use crate::report::{SweepRun, SweepSummary, summarize_sweep};

/// Fit `runs` datasets. Run `k` uses data seed `seed + k` (synthetic sources
/// only; a CSV is loaded once and shared) and fit seed `fit_seed + k`.
pub fn run_sweep(config: &DemoConfig, runs: usize, threads: Option<usize>) -> Result<SweepSummary, AppError> {
    config.fit.validate()?;

    let shared = match &config.source {
        PointSource::Csv(_) => Some(load_points(&config.source, config.model)?),
        PointSource::Synthetic { .. } => None,
    };

    let work = || {
        (0..runs)
            .into_par_iter()
            .map(|k| sweep_one(config, shared.as_ref(), k as u64))
            .collect::<Result<Vec<SweepRun>, AppError>>()
    };

    let results = match threads {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to start worker pool: {e}")))?
            .install(work)?,
        None => work()?,
    };

    let summary = summarize_sweep(config.model, &results);
    info!(
        runs = summary.runs,
        accepted = summary.accepted,
        "sweep finished"
    );
    Ok(summary)
}

fn sweep_one(config: &DemoConfig, shared: Option<&LoadedPoints>, k: u64) -> Result<SweepRun, AppError> {
    let owned;
    let (seed, data) = match (shared, &config.source) {
        (Some(data), _) => (k, data),
        (
            None,
            PointSource::Synthetic {
                count,
                outlier_ratio,
                seed: base,
            },
        ) => {
            let seed = base.wrapping_add(k);
            let source = PointSource::Synthetic {
                count: *count,
                outlier_ratio: *outlier_ratio,
                seed,
            };
            owned = load_points(&source, config.model)?;
            (seed, &owned)
        }
        (None, PointSource::Csv(_)) => {
            return Err(AppError::new(4, "CSV sweep started without loaded points."));
        }
    };

    let mut rng = StdRng::seed_from_u64(config.fit_seed.wrapping_add(k));
    let result = fit(&data.points, config.model, &config.fit, &mut rng)?;
    debug!(run = k, accepted = result.is_accepted(), attempts = result.attempts(), "sweep run done");

    Ok(SweepRun {
        seed,
        accepted: result.is_accepted(),
        attempts: result.attempts(),
    })
}
