//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - printed as JSON summaries
//! - handed to the plotting/TUI front-ends without conversion

use std::cmp::Ordering;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A 2D observation. Equality is exact coordinate equality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Lexicographic `(x, y)` order using IEEE total ordering.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }

    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Which model family to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Line,
    Parabola,
}

impl ModelKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Line => "line",
            ModelKind::Parabola => "parabola",
        }
    }

    /// Minimal number of points needed to fit the model exactly.
    pub fn sample_size(self) -> usize {
        match self {
            ModelKind::Line => 2,
            ModelKind::Parabola => 3,
        }
    }

    /// Inlier threshold used when none is configured.
    pub fn default_max_distance(self) -> f64 {
        match self {
            ModelKind::Line => 1.5,
            ModelKind::Parabola => 2.0,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            ModelKind::Line => ModelKind::Parabola,
            ModelKind::Parabola => ModelKind::Line,
        }
    }
}

/// A fitted model.
///
/// Only produced by a successful estimation: degenerate samples never carry
/// coefficients (see [`RoundModel::Degenerate`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Model {
    /// `y = slope * x + intercept`
    Line { slope: f64, intercept: f64 },
    /// `x = x` (both sample points shared an x-coordinate)
    VerticalLine { x: f64 },
    /// `y = a * x^2 + b * x + c`
    Parabola { a: f64, b: f64, c: f64 },
}

impl Model {
    pub fn kind(&self) -> ModelKind {
        match self {
            Model::Line { .. } | Model::VerticalLine { .. } => ModelKind::Line,
            Model::Parabola { .. } => ModelKind::Parabola,
        }
    }

    /// Evaluate `y(x)`. Vertical lines are not functions of `x` and yield `None`.
    pub fn predict(&self, x: f64) -> Option<f64> {
        match *self {
            Model::Line { slope, intercept } => Some(slope * x + intercept),
            Model::VerticalLine { .. } => None,
            Model::Parabola { a, b, c } => Some(a * x * x + b * x + c),
        }
    }

    /// Euclidean distance from `point` to the model curve.
    pub fn distance_to(&self, point: &Point) -> f64 {
        crate::models::distance_to_model(self, point)
    }

    /// Short one-line description, e.g. `y = 1.0000x + 0.0000`.
    pub fn equation(&self) -> String {
        match *self {
            Model::Line { slope, intercept } => format!("y = {slope:.4}x {}", signed(intercept)),
            Model::VerticalLine { x } => format!("x = {x:.4}"),
            Model::Parabola { a, b, c } => {
                format!("y = {a:.4}x^2 {}x {}", signed(b), signed(c))
            }
        }
    }
}

fn signed(v: f64) -> String {
    if v < 0.0 {
        format!("- {:.4}", -v)
    } else {
        format!("+ {v:.4}")
    }
}

/// Estimation result of a single round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundModel {
    Fitted(Model),
    /// The sample admits no unique model (e.g. singular linear system).
    Degenerate,
}

impl RoundModel {
    pub fn model(&self) -> Option<&Model> {
        match self {
            RoundModel::Fitted(model) => Some(model),
            RoundModel::Degenerate => None,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, RoundModel::Degenerate)
    }
}

/// Everything one round produced.
///
/// `sample`, `inliers` and `outliers` are pairwise disjoint and together make
/// up the normalized input. Degenerate rounds report every residual point as
/// an outlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub sample: Vec<Point>,
    pub model: RoundModel,
    pub inliers: Vec<Point>,
    pub outliers: Vec<Point>,
}

impl RoundOutcome {
    pub fn inlier_count(&self) -> usize {
        self.inliers.len()
    }

    pub fn total_points(&self) -> usize {
        self.sample.len() + self.inliers.len() + self.outliers.len()
    }
}

/// Terminal result of a fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FitResult {
    Accepted {
        model: Model,
        sample: Vec<Point>,
        inliers: Vec<Point>,
        outliers: Vec<Point>,
        /// 1-based index of the accepting round.
        attempts: usize,
    },
    /// The iteration budget ran out without an acceptable round.
    NotFound { attempts: usize },
}

impl FitResult {
    pub fn model(&self) -> Option<&Model> {
        match self {
            FitResult::Accepted { model, .. } => Some(model),
            FitResult::NotFound { .. } => None,
        }
    }

    pub fn attempts(&self) -> usize {
        match self {
            FitResult::Accepted { attempts, .. } | FitResult::NotFound { attempts } => *attempts,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, FitResult::Accepted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_is_lexicographic() {
        let mut pts = vec![Point::new(1.0, 0.0), Point::new(0.0, 5.0), Point::new(0.0, -1.0)];
        pts.sort_by(Point::canonical_cmp);
        assert_eq!(
            pts,
            vec![Point::new(0.0, -1.0), Point::new(0.0, 5.0), Point::new(1.0, 0.0)]
        );
    }

    #[test]
    fn vertical_line_has_no_prediction() {
        assert_eq!(Model::VerticalLine { x: 2.0 }.predict(2.0), None);
        let p = Model::Parabola { a: 1.0, b: 0.0, c: -1.0 };
        assert_eq!(p.predict(3.0), Some(8.0));
        assert_eq!(p.kind(), ModelKind::Parabola);
    }

    #[test]
    fn equation_formats_signs() {
        let line = Model::Line { slope: 2.0, intercept: -0.5 };
        assert_eq!(line.equation(), "y = 2.0000x - 0.5000");
    }
}
