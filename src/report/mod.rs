//! Reporting: fit summaries and their terminal/JSON rendering.

pub mod format;

pub use format::*;

use serde::Serialize;

use crate::domain::{FitConfig, FitResult, Model, ModelKind, Point};

/// Distance statistics of the accepted consensus set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResidualStats {
    pub mean: f64,
    pub max: f64,
}

/// Everything printed after a `fit` run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitSummary {
    pub kind: ModelKind,
    pub source: String,
    pub config: FitConfig,
    /// Points left after normalization.
    pub n_points: usize,
    /// Acceptance threshold, `ratio * n_points`.
    pub min_inliers: f64,
    pub accepted: bool,
    pub attempts: usize,
    pub model: Option<Model>,
    pub equation: Option<String>,
    pub sample: Vec<Point>,
    pub n_inliers: usize,
    pub n_outliers: usize,
    /// Over inliers only (sample points sit on the model by construction).
    pub inlier_residuals: Option<ResidualStats>,
}

/// Build the summary of a finished fit over `n_points` normalized points.
pub fn summarize(
    result: &FitResult,
    kind: ModelKind,
    config: &FitConfig,
    n_points: usize,
    source: impl Into<String>,
) -> FitSummary {
    let base = FitSummary {
        kind,
        source: source.into(),
        config: *config,
        n_points,
        min_inliers: config.min_inliers(n_points),
        accepted: result.is_accepted(),
        attempts: result.attempts(),
        model: None,
        equation: None,
        sample: Vec::new(),
        n_inliers: 0,
        n_outliers: 0,
        inlier_residuals: None,
    };

    match result {
        FitResult::Accepted {
            model,
            sample,
            inliers,
            outliers,
            ..
        } => FitSummary {
            model: Some(*model),
            equation: Some(model.equation()),
            sample: sample.clone(),
            n_inliers: inliers.len(),
            n_outliers: outliers.len(),
            inlier_residuals: residual_stats(model, inliers),
            ..base
        },
        FitResult::NotFound { .. } => base,
    }
}

/// Mean and max distance from `points` to `model`.
pub fn residual_stats(model: &Model, points: &[Point]) -> Option<ResidualStats> {
    if points.is_empty() {
        return None;
    }
    let (sum, max) = points
        .iter()
        .map(|p| model.distance_to(p))
        .fold((0.0, 0.0_f64), |(sum, max), d| (sum + d, max.max(d)));
    Some(ResidualStats {
        mean: sum / points.len() as f64,
        max,
    })
}

/// Outcome of one run inside a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepRun {
    pub seed: u64,
    pub accepted: bool,
    pub attempts: usize,
}

/// Aggregate over many independent runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepSummary {
    pub kind: ModelKind,
    pub runs: usize,
    pub accepted: usize,
    pub success_rate: f64,
    /// Mean rounds until acceptance, over accepted runs only.
    pub mean_attempts: Option<f64>,
    pub max_attempts: Option<usize>,
}

pub fn summarize_sweep(kind: ModelKind, runs: &[SweepRun]) -> SweepSummary {
    let accepted: Vec<usize> = runs.iter().filter(|r| r.accepted).map(|r| r.attempts).collect();
    let success_rate = if runs.is_empty() {
        0.0
    } else {
        accepted.len() as f64 / runs.len() as f64
    };
    let mean_attempts =
        (!accepted.is_empty()).then(|| accepted.iter().sum::<usize>() as f64 / accepted.len() as f64);

    SweepSummary {
        kind,
        runs: runs.len(),
        accepted: accepted.len(),
        success_rate,
        mean_attempts,
        max_attempts: accepted.iter().copied().max(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted() -> FitResult {
        FitResult::Accepted {
            model: Model::Line {
                slope: 0.0,
                intercept: 1.0,
            },
            sample: vec![Point::new(0.0, 1.0), Point::new(4.0, 1.0)],
            inliers: vec![Point::new(1.0, 1.5), Point::new(2.0, 0.0)],
            outliers: vec![Point::new(3.0, 9.0)],
            attempts: 4,
        }
    }

    #[test]
    fn summary_counts_and_residuals() {
        let cfg = FitConfig::default().with_ratio(0.4);
        let s = summarize(&accepted(), ModelKind::Line, &cfg, 5, "synthetic");

        assert!(s.accepted);
        assert_eq!(s.attempts, 4);
        assert_eq!((s.n_inliers, s.n_outliers), (2, 1));
        assert!((s.min_inliers - 2.0).abs() < 1e-12);
        assert_eq!(s.equation.as_deref(), Some("y = 0.0000x + 1.0000"));

        let r = s.inlier_residuals.unwrap();
        assert!((r.mean - 0.75).abs() < 1e-12);
        assert!((r.max - 1.0).abs() < 1e-12);
    }

    #[test]
    fn not_found_summary_has_no_model() {
        let cfg = FitConfig::default();
        let s = summarize(&FitResult::NotFound { attempts: 1000 }, ModelKind::Parabola, &cfg, 10, "x.csv");
        assert!(!s.accepted);
        assert_eq!(s.attempts, 1000);
        assert!(s.model.is_none() && s.inlier_residuals.is_none());
    }

    #[test]
    fn sweep_rates_ignore_failed_runs_for_attempts() {
        let runs = [
            SweepRun { seed: 0, accepted: true, attempts: 2 },
            SweepRun { seed: 1, accepted: false, attempts: 50 },
            SweepRun { seed: 2, accepted: true, attempts: 6 },
            SweepRun { seed: 3, accepted: true, attempts: 1 },
        ];
        let s = summarize_sweep(ModelKind::Line, &runs);
        assert_eq!(s.accepted, 3);
        assert!((s.success_rate - 0.75).abs() < 1e-12);
        assert!((s.mean_attempts.unwrap() - 3.0).abs() < 1e-12);
        assert_eq!(s.max_attempts, Some(6));

        assert_eq!(summarize_sweep(ModelKind::Line, &[]).mean_attempts, None);
    }
}
