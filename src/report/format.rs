//! Terminal and JSON rendering of summaries.
//!
//! Formatting lives here so output changes stay localized and the fitting
//! code never builds strings.

use serde::Serialize;

use crate::domain::{Point, RoundModel, RoundOutcome};
use crate::error::AppError;
use crate::report::{FitSummary, SweepSummary};

/// Format the run summary of a `fit` call.
pub fn format_fit_summary(s: &FitSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== rfit - RANSAC {} fit ===\n", s.kind.display_name()));
    out.push_str(&format!("Source: {}\n", s.source));
    out.push_str(&format!(
        "Config: max_distance={} | ratio={} | max_iterations={}\n",
        s.config.max_distance,
        s.config.ratio,
        s.config
            .max_iterations
            .map_or_else(|| "unbounded".to_string(), |n| n.to_string()),
    ));
    out.push_str(&format!(
        "Points: n={} (distinct) | min inliers={:.1}\n",
        s.n_points, s.min_inliers
    ));
    out.push('\n');

    let Some(equation) = &s.equation else {
        out.push_str(&format!(
            "No acceptable model after {} attempts.\n",
            s.attempts
        ));
        return out;
    };

    out.push_str("Accepted model:\n");
    out.push_str(&format!("- {equation}\n"));
    out.push_str(&format!("- attempts: {}\n", s.attempts));
    out.push_str(&format!("- sample  : {}\n", fmt_points(&s.sample)));
    out.push_str(&format!(
        "- inliers : {} | outliers: {}\n",
        s.n_inliers, s.n_outliers
    ));
    if let Some(r) = &s.inlier_residuals {
        out.push_str(&format!(
            "- inlier distance: mean={:.4} max={:.4}\n",
            r.mean, r.max
        ));
    }
    out
}

/// Format the aggregate of a `sweep` run.
pub fn format_sweep_summary(s: &SweepSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== rfit - {} sweep ===\n", s.kind.display_name()));
    out.push_str(&format!(
        "Runs: {} | accepted: {} | success rate: {:.1}%\n",
        s.runs,
        s.accepted,
        100.0 * s.success_rate
    ));
    match (s.mean_attempts, s.max_attempts) {
        (Some(mean), Some(max)) => {
            out.push_str(&format!("Attempts to accept: mean={mean:.2} max={max}\n"))
        }
        _ => out.push_str("Attempts to accept: n/a\n"),
    }
    out
}

/// One status line per demo round.
pub fn format_round_line(round: usize, outcome: &RoundOutcome, min_inliers: f64) -> String {
    match &outcome.model {
        RoundModel::Degenerate => format!("Round {round:>3}: degenerate sample"),
        RoundModel::Fitted(model) => format!(
            "Round {round:>3}: {} | inliers {}/{:.0}",
            model.equation(),
            outcome.inlier_count(),
            min_inliers.ceil(),
        ),
    }
}

/// Pretty-printed JSON of any summary.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::new(4, format!("Failed to serialize summary: {e}")))
}

fn fmt_points(points: &[Point]) -> String {
    let parts: Vec<String> = points
        .iter()
        .map(|p| format!("({:.3}, {:.3})", p.x, p.y))
        .collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitConfig, FitResult, Model, ModelKind};
    use crate::report::{SweepRun, summarize, summarize_sweep};

    fn summary() -> FitSummary {
        let result = FitResult::Accepted {
            model: Model::Line {
                slope: 2.0,
                intercept: -1.0,
            },
            sample: vec![Point::new(0.0, -1.0), Point::new(1.0, 1.0)],
            inliers: vec![Point::new(2.0, 3.0)],
            outliers: vec![],
            attempts: 2,
        };
        summarize(&result, ModelKind::Line, &FitConfig::default(), 3, "points.csv")
    }

    #[test]
    fn text_summary_lists_model_and_counts() {
        let txt = format_fit_summary(&summary());
        assert!(txt.starts_with("=== rfit - RANSAC line fit ===\n"));
        assert!(txt.contains("- y = 2.0000x - 1.0000\n"));
        assert!(txt.contains("- sample  : [(0.000, -1.000), (1.000, 1.000)]\n"));
        assert!(txt.contains("- inliers : 1 | outliers: 0\n"));
        assert!(txt.contains("max_iterations=1000"));
    }

    #[test]
    fn text_summary_reports_exhaustion() {
        let cfg = FitConfig::default().with_max_iterations(5);
        let s = summarize(&FitResult::NotFound { attempts: 5 }, ModelKind::Parabola, &cfg, 9, "synthetic");
        let txt = format_fit_summary(&s);
        assert!(txt.ends_with("No acceptable model after 5 attempts.\n"), "{txt}");
    }

    #[test]
    fn json_summary_is_machine_readable() {
        let json = to_json(&summary()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["kind"], "line");
        assert_eq!(v["accepted"], true);
        assert_eq!(v["model"]["kind"], "line");
        assert_eq!(v["model"]["slope"], 2.0);
        assert_eq!(v["config"]["max_iterations"], 1000);
    }

    #[test]
    fn round_and_sweep_lines() {
        let outcome = RoundOutcome {
            sample: vec![Point::new(0.0, 0.0), Point::new(0.0, 0.0)],
            model: RoundModel::Degenerate,
            inliers: vec![],
            outliers: vec![],
        };
        assert_eq!(format_round_line(7, &outcome, 3.0), "Round   7: degenerate sample");

        let s = summarize_sweep(
            ModelKind::Parabola,
            &[SweepRun { seed: 1, accepted: true, attempts: 3 }],
        );
        let txt = format_sweep_summary(&s);
        assert!(txt.contains("success rate: 100.0%"));
        assert!(txt.contains("mean=3.00 max=3"));
    }
}
