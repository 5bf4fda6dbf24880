//! Round-by-round demo: one SVG chart per round until a round is accepted.
//!
//! The acceptance test lives here, not in the core: the demo drives
//! [`run_kind_round`] itself so every intermediate round can be drawn.

use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::app::pipeline::LoadedPoints;
use crate::domain::{DemoConfig, RoundOutcome};
use crate::error::AppError;
use crate::fit::{Decision, decide, normalize, run_kind_round};
use crate::plot::{ChartData, SvgWriter};

/// What a demo run produced.
#[derive(Debug, Clone)]
pub struct DemoOutput {
    /// Rounds actually run.
    pub rounds: usize,
    /// 1-based index of the accepted round, if any.
    pub accepted_round: Option<usize>,
    pub charts: Vec<PathBuf>,
}

/// Run up to `config.max_rounds` rounds over `data`, calling `on_round` after
/// each one with its index, outcome and decision.
pub fn run_demo<F>(config: &DemoConfig, data: &LoadedPoints, mut on_round: F) -> Result<DemoOutput, AppError>
where
    F: FnMut(usize, &RoundOutcome, Decision, f64),
{
    config.fit.validate()?;
    let set = normalize(&data.points);
    set.ensure_at_least(config.model.sample_size())?;
    let min_inliers = config.fit.min_inliers(set.len());

    let writer = SvgWriter::prepare(&config.output_dir, (config.chart_size, config.chart_size))?;
    let mut rng = StdRng::seed_from_u64(config.fit_seed);
    let mut charts = Vec::new();

    for round in 1..=config.max_rounds {
        let outcome = run_kind_round(config.model, &set, config.fit.max_distance, &mut rng);
        let decision = decide(&outcome, min_inliers);
        on_round(round, &outcome, decision, min_inliers);

        if decision == Decision::Accepted {
            let chart = ChartData::from_round(&outcome, "RANSAC result");
            charts.push(writer.write_result(&chart)?);
            info!(round, dir = %writer.dir().display(), "demo finished with an accepted model");
            return Ok(DemoOutput {
                rounds: round,
                accepted_round: Some(round),
                charts,
            });
        }

        let chart = ChartData::from_round(&outcome, format!("RANSAC round {round}"));
        charts.push(writer.write_round(round, &chart)?);
    }

    info!(rounds = config.max_rounds, "demo finished without an accepted model");
    Ok(DemoOutput {
        rounds: config.max_rounds,
        accepted_round: None,
        charts,
    })
}
