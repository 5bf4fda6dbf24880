//! Straight lines through two sampled points.

use crate::domain::{Model, Point};
use crate::models::Estimator;

/// Two-point line estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineEstimator;

impl Estimator for LineEstimator {
    const SAMPLE_SIZE: usize = 2;

    fn estimate(&self, sample: &[Point]) -> Option<Model> {
        match sample {
            [p1, p2] => fit_line(p1, p2),
            _ => None,
        }
    }

    fn distance(&self, model: &Model, point: &Point) -> f64 {
        line_distance(model, point)
    }
}

/// Exact line through `p1` and `p2`.
///
/// A shared x-coordinate gives a [`Model::VerticalLine`]; coincident points
/// (or coordinates whose slope overflows) give `None`.
pub fn fit_line(p1: &Point, p2: &Point) -> Option<Model> {
    if p1 == p2 {
        return None;
    }

    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    if dx == 0.0 {
        return Some(Model::VerticalLine { x: p1.x });
    }

    let slope = dy / dx;
    let intercept = p1.y - p1.x * slope;
    (slope.is_finite() && intercept.is_finite()).then_some(Model::Line { slope, intercept })
}

/// Perpendicular distance from `point` to a line model.
///
/// For a general line, the foot of the perpendicular is the intersection of
/// the model line with the normal through `point`:
///
/// ```text
/// x_f = (x + m (y - b)) / (1 + m^2),   y_f = m x_f + b
/// ```
///
/// Parabolas are not lines; they are measured as `NaN` here and must go
/// through [`crate::models::parabola_distance`].
pub fn line_distance(model: &Model, point: &Point) -> f64 {
    match *model {
        Model::VerticalLine { x } => (point.x - x).abs(),
        Model::Line { slope, intercept } if slope == 0.0 => (point.y - intercept).abs(),
        Model::Line { slope, intercept } => {
            let foot_x = (point.x + slope * (point.y - intercept)) / (1.0 + slope * slope);
            let foot_y = slope * foot_x + intercept;
            let d = (point.x - foot_x).hypot(point.y - foot_y);
            if d.is_finite() {
                d
            } else {
                (slope * point.x - point.y + intercept).abs() / slope.hypot(1.0)
            }
        }
        Model::Parabola { .. } => f64::NAN,
    }
}
