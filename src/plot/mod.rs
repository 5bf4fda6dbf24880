//! Chart rendering.
//!
//! - fixed-grid terminal plots (`ascii`)
//! - per-round SVG charts via Plotters (`svg`)
//!
//! [`ChartData`] is the render-only description shared by the SVG writer and
//! the TUI widget: all series and bounds are computed here, outside any
//! drawing backend.

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;

use crate::domain::{FitResult, Model, Point, RoundModel, RoundOutcome};

/// Number of x samples used to trace a curved model.
const CURVE_SAMPLES: usize = 200;

/// Series + bounds for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub title: String,
    /// Model curve, split wherever it leaves the y bounds.
    pub curve: Vec<Vec<(f64, f64)>>,
    pub inliers: Vec<(f64, f64)>,
    pub outliers: Vec<(f64, f64)>,
    pub sample: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl ChartData {
    pub fn from_round(outcome: &RoundOutcome, title: impl Into<String>) -> Self {
        Self::build(
            title.into(),
            &outcome.inliers,
            &outcome.outliers,
            &outcome.sample,
            match &outcome.model {
                RoundModel::Fitted(model) => Some(model),
                RoundModel::Degenerate => None,
            },
        )
    }

    /// Chart of a finished fit. Without an accepted model every point in
    /// `points` is drawn as an outlier.
    pub fn from_fit(result: &FitResult, points: &[Point], title: impl Into<String>) -> Self {
        match result {
            FitResult::Accepted {
                model,
                sample,
                inliers,
                outliers,
                ..
            } => Self::build(title.into(), inliers, outliers, sample, Some(model)),
            FitResult::NotFound { .. } => Self::build(title.into(), &[], points, &[], None),
        }
    }

    /// Plain scatter of `points` (no round has run yet).
    pub fn scatter(points: &[Point], title: impl Into<String>) -> Self {
        Self::build(title.into(), &[], points, &[], None)
    }

    fn build(
        title: String,
        inliers: &[Point],
        outliers: &[Point],
        sample: &[Point],
        model: Option<&Model>,
    ) -> Self {
        let all = || inliers.iter().chain(outliers).chain(sample);
        let (x0, x1) = pad_range(value_range(all().map(|p| p.x)).unwrap_or((0.0, 1.0)), 0.05);
        let (y0, y1) = pad_range(value_range(all().map(|p| p.y)).unwrap_or((0.0, 1.0)), 0.1);
        let x_bounds = [x0, x1];
        let y_bounds = [y0, y1];

        let curve = model
            .map(|m| trace_model(m, x_bounds, y_bounds))
            .unwrap_or_default();

        Self {
            title,
            curve,
            inliers: pairs(inliers),
            outliers: pairs(outliers),
            sample: pairs(sample),
            x_bounds,
            y_bounds,
        }
    }
}

fn pairs(points: &[Point]) -> Vec<(f64, f64)> {
    points.iter().map(|p| (p.x, p.y)).collect()
}

/// Polyline segments of `model` that stay inside the given bounds.
pub fn trace_model(model: &Model, x_bounds: [f64; 2], y_bounds: [f64; 2]) -> Vec<Vec<(f64, f64)>> {
    if let Model::VerticalLine { x } = *model {
        if x < x_bounds[0] || x > x_bounds[1] {
            return Vec::new();
        }
        return vec![vec![(x, y_bounds[0]), (x, y_bounds[1])]];
    }

    let mut segments = Vec::new();
    let mut current = Vec::new();
    for i in 0..CURVE_SAMPLES {
        let u = i as f64 / (CURVE_SAMPLES as f64 - 1.0);
        let x = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        match model.predict(x) {
            Some(y) if y >= y_bounds[0] && y <= y_bounds[1] => current.push((x, y)),
            _ => {
                if current.len() > 1 {
                    segments.push(std::mem::take(&mut current));
                }
                current.clear();
            }
        }
    }
    if current.len() > 1 {
        segments.push(current);
    }
    segments
}

/// `(min, max)` over the finite values, if any.
pub(crate) fn value_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    (min <= max).then_some((min, max))
}

/// Widen a range by `frac` of its span on each side. Zero-width ranges get
/// one unit of room first.
pub(crate) fn pad_range((min, max): (f64, f64), frac: f64) -> (f64, f64) {
    let (min, max) = if max > min { (min, max) } else { (min - 1.0, max + 1.0) };
    let pad = (max - min) * frac;
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_chart_keeps_partitions_and_pads_bounds() {
        let outcome = RoundOutcome {
            sample: vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
            model: RoundModel::Fitted(Model::Line {
                slope: 1.0,
                intercept: 0.0,
            }),
            inliers: vec![Point::new(5.0, 5.0)],
            outliers: vec![Point::new(2.0, 9.0)],
        };
        let chart = ChartData::from_round(&outcome, "Round 1");

        assert_eq!(chart.sample, vec![(0.0, 0.0), (10.0, 10.0)]);
        assert_eq!(chart.inliers, vec![(5.0, 5.0)]);
        assert_eq!(chart.outliers, vec![(2.0, 9.0)]);
        assert!((chart.x_bounds[0] + 0.5).abs() < 1e-12);
        assert!((chart.y_bounds[1] - 11.0).abs() < 1e-12);
        assert_eq!(chart.curve.len(), 1);
    }

    #[test]
    fn curve_is_split_where_it_leaves_the_frame() {
        // y = x^2 - 4 over x in [-3, 3] with y limited to [-5, 0]:
        // only the part between the roots stays inside.
        let model = Model::Parabola {
            a: 1.0,
            b: 0.0,
            c: -4.0,
        };
        let segments = trace_model(&model, [-3.0, 3.0], [-5.0, 0.0]);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].iter().all(|&(x, y)| x.abs() <= 2.0 && y <= 0.0));

        // Outside-the-band ends on both sides of a dip give two segments.
        let segments = trace_model(&model, [-3.0, 3.0], [-1.0, 6.0]);
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn vertical_line_spans_the_y_bounds() {
        let segments = trace_model(&Model::VerticalLine { x: 1.0 }, [0.0, 2.0], [-3.0, 3.0]);
        assert_eq!(segments, vec![vec![(1.0, -3.0), (1.0, 3.0)]]);
        assert!(trace_model(&Model::VerticalLine { x: 5.0 }, [0.0, 2.0], [-3.0, 3.0]).is_empty());
    }

    #[test]
    fn degenerate_round_has_no_curve() {
        let outcome = RoundOutcome {
            sample: vec![Point::new(1.0, 1.0), Point::new(1.0, 2.0), Point::new(1.0, 3.0)],
            model: RoundModel::Degenerate,
            inliers: vec![],
            outliers: vec![Point::new(2.0, 2.0)],
        };
        assert!(ChartData::from_round(&outcome, "d").curve.is_empty());
    }
}
