//! Model families: exact fits from minimal samples and point-to-model distances.
//!
//! Every family implements [`Estimator`], which is the only seam the fitting
//! loop (`crate::fit`) needs:
//! - estimate a model exactly from `SAMPLE_SIZE` points (or report a degenerate sample)
//! - measure the distance from any point to a fitted model

pub mod line;
pub mod parabola;

pub use line::*;
pub use parabola::*;

use crate::domain::{Model, Point};
use crate::math::NewtonOptions;

/// One model family of the RANSAC loop.
pub trait Estimator {
    /// Minimal number of points that determine a model.
    const SAMPLE_SIZE: usize;

    /// Fit a model exactly through `sample` (`sample.len() == SAMPLE_SIZE`).
    ///
    /// Returns `None` for a degenerate sample: no coefficients are ever
    /// produced from a division by zero or a singular system.
    fn estimate(&self, sample: &[Point]) -> Option<Model>;

    /// Euclidean distance from `point` to the model curve.
    fn distance(&self, model: &Model, point: &Point) -> f64;
}

/// Distance from `point` to any model, using default solver settings.
pub fn distance_to_model(model: &Model, point: &Point) -> f64 {
    match *model {
        Model::Line { .. } | Model::VerticalLine { .. } => line_distance(model, point),
        Model::Parabola { a, b, c } => parabola_distance(a, b, c, point, &NewtonOptions::default()),
    }
}
