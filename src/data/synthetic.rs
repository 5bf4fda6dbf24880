//! Synthetic point clouds: a noisy random model plus scattered outliers.
//!
//! Every cloud is a pure function of `(kind, count, outlier_ratio, seed)`.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Model, ModelKind, Point};
use crate::error::AppError;

/// Inlier x-range of line clouds.
const LINE_X: (f64, f64) = (0.0, 20.0);
/// Outlier x-range of line clouds.
const LINE_OUTLIER_X: (f64, f64) = (-5.0, 25.0);
const LINE_SLOPE_SD: f64 = 0.5;
const LINE_OUTLIER_Y_SD: f64 = 20.0;

const PARABOLA_X: (f64, f64) = (-10.0, 10.0);
const PARABOLA_OUTLIER_X: (f64, f64) = (-15.0, 15.0);
const PARABOLA_COEFF_SD: f64 = 2.0;
/// Outliers sit around `±50` on the side the parabola opens towards.
const PARABOLA_OUTLIER_Y: f64 = 50.0;

const JITTER_SD: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct SyntheticData {
    /// Inliers first, then outliers.
    pub points: Vec<Point>,
    /// The noise-free model the inliers were drawn around.
    pub truth: Model,
    pub n_inliers: usize,
    pub n_outliers: usize,
}

impl SyntheticData {
    pub fn inliers(&self) -> &[Point] {
        &self.points[..self.n_inliers]
    }

    pub fn outliers(&self) -> &[Point] {
        &self.points[self.n_inliers..]
    }
}

/// Generate `count` jittered points around a random `kind` model, plus
/// `floor(count * outlier_ratio)` outliers.
pub fn generate(
    kind: ModelKind,
    count: usize,
    outlier_ratio: f64,
    seed: u64,
) -> Result<SyntheticData, AppError> {
    if count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }
    if !(outlier_ratio.is_finite() && outlier_ratio >= 0.0) {
        return Err(AppError::new(2, "Outlier ratio must be finite and >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let n_outliers = (count as f64 * outlier_ratio).floor() as usize;

    let data = match kind {
        ModelKind::Line => line_cloud(&mut rng, count, n_outliers)?,
        ModelKind::Parabola => parabola_cloud(&mut rng, count, n_outliers)?,
    };
    Ok(data)
}

fn normal(mean: f64, sd: f64) -> Result<Normal<f64>, AppError> {
    Normal::new(mean, sd).map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))
}

fn line_cloud(rng: &mut StdRng, count: usize, n_outliers: usize) -> Result<SyntheticData, AppError> {
    let jitter = normal(0.0, JITTER_SD)?;
    let slope = normal(0.0, LINE_SLOPE_SD)?.sample(rng);
    let truth = Model::Line {
        slope,
        intercept: 0.0,
    };

    let mut points = Vec::with_capacity(count + n_outliers);
    for _ in 0..count {
        let x = rng.gen_range(LINE_X.0..LINE_X.1);
        let y = slope * x;
        points.push(Point::new(x + jitter.sample(rng), y + jitter.sample(rng)));
    }

    let outlier_y = normal(0.0, LINE_OUTLIER_Y_SD)?;
    for _ in 0..n_outliers {
        let x = rng.gen_range(LINE_OUTLIER_X.0..LINE_OUTLIER_X.1);
        points.push(Point::new(x, outlier_y.sample(rng)));
    }

    Ok(SyntheticData {
        points,
        truth,
        n_inliers: count,
        n_outliers,
    })
}

fn parabola_cloud(
    rng: &mut StdRng,
    count: usize,
    n_outliers: usize,
) -> Result<SyntheticData, AppError> {
    let jitter = normal(0.0, JITTER_SD)?;
    let coeff = normal(0.0, PARABOLA_COEFF_SD)?;
    let (a, b, c) = (coeff.sample(rng), coeff.sample(rng), coeff.sample(rng));
    let truth = Model::Parabola { a, b, c };

    let mut points = Vec::with_capacity(count + n_outliers);
    for _ in 0..count {
        let x = rng.gen_range(PARABOLA_X.0..PARABOLA_X.1);
        let y = (a * x + b) * x + c;
        points.push(Point::new(x + jitter.sample(rng), y + jitter.sample(rng)));
    }

    let centre = if a > 0.0 {
        PARABOLA_OUTLIER_Y
    } else {
        -PARABOLA_OUTLIER_Y
    };
    let outlier_y = normal(centre, PARABOLA_OUTLIER_Y)?;
    for _ in 0..n_outliers {
        let x = rng.gen_range(PARABOLA_OUTLIER_X.0..PARABOLA_OUTLIER_X.1);
        points.push(Point::new(x, outlier_y.sample(rng)));
    }

    Ok(SyntheticData {
        points,
        truth,
        n_inliers: count,
        n_outliers,
    })
}
