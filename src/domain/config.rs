//! Run configuration.
//!
//! [`FitConfig`] is what the core fitting loop understands. [`DemoConfig`] is
//! the front-end view derived from CLI flags (data source, rendering, ...)
//! and embeds a `FitConfig`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::ModelKind;
use crate::error::FitError;

/// Parameters of the RANSAC acceptance loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    /// Inlier tolerance: a point is an inlier iff its distance is `<= max_distance`.
    pub max_distance: f64,
    /// Round budget. `None` loops until a round is accepted.
    ///
    /// Unbounded mode never gives up: if no model can reach `ratio`, the call
    /// does not return. Callers that cannot guarantee a good model must set a
    /// budget.
    pub max_iterations: Option<usize>,
    /// Minimum inlier fraction of the normalized point count, in `[0, 1]`.
    pub ratio: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_distance: 1.0,
            max_iterations: Some(1000),
            ratio: 0.6,
        }
    }
}

impl FitConfig {
    pub fn new(max_distance: f64, max_iterations: Option<usize>, ratio: f64) -> Self {
        Self {
            max_distance,
            max_iterations,
            ratio,
        }
    }

    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Loop until acceptance. See [`FitConfig::max_iterations`].
    pub fn unbounded(mut self) -> Self {
        self.max_iterations = None;
        self
    }

    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn validate(&self) -> Result<(), FitError> {
        validate_max_distance(self.max_distance)?;
        if !(self.ratio.is_finite() && (0.0..=1.0).contains(&self.ratio)) {
            return Err(FitError::InvalidConfiguration(format!(
                "ratio must be within [0, 1], got {}",
                self.ratio
            )));
        }
        if self.max_iterations == Some(0) {
            return Err(FitError::InvalidConfiguration(
                "max_iterations must be >= 1 when bounded".to_string(),
            ));
        }
        Ok(())
    }

    /// Minimum inlier count for acceptance over `n` normalized points.
    pub fn min_inliers(&self, n: usize) -> f64 {
        n as f64 * self.ratio
    }
}

pub(crate) fn validate_max_distance(max_distance: f64) -> Result<(), FitError> {
    if max_distance.is_finite() && max_distance >= 0.0 {
        Ok(())
    } else {
        Err(FitError::InvalidConfiguration(format!(
            "max_distance must be finite and >= 0, got {max_distance}"
        )))
    }
}

/// Where demo points come from.
#[derive(Debug, Clone, PartialEq)]
pub enum PointSource {
    /// Generate a noisy synthetic cloud around a random model.
    Synthetic {
        count: usize,
        outlier_ratio: f64,
        seed: u64,
    },
    /// Read `x,y` rows from a CSV file.
    Csv(PathBuf),
}

/// A full front-end run's configuration.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub model: ModelKind,
    pub source: PointSource,
    pub fit: FitConfig,
    /// Seed for the sampler's generator (independent from the data seed).
    pub fit_seed: u64,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    /// Rounds to animate in `demo` mode.
    pub max_rounds: usize,
    /// Directory that receives per-round SVG charts.
    pub output_dir: PathBuf,
    /// Side length of the square SVG charts, in pixels.
    pub chart_size: u32,
}

impl DemoConfig {
    /// Human-readable description of the point source.
    pub fn source_label(&self) -> String {
        match &self.source {
            PointSource::Synthetic {
                count,
                outlier_ratio,
                seed,
            } => format!("synthetic (n={count}, outlier_ratio={outlier_ratio}, seed={seed})"),
            PointSource::Csv(path) => path.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_and_bounded() {
        let cfg = FitConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(cfg.max_iterations.is_some());
    }

    #[test]
    fn rejects_bad_ratio_distance_and_budget() {
        assert!(FitConfig::default().with_ratio(1.5).validate().is_err());
        assert!(FitConfig::default().with_ratio(f64::NAN).validate().is_err());
        assert!(FitConfig::default().with_max_distance(-0.1).validate().is_err());
        assert!(FitConfig::default().with_max_iterations(0).validate().is_err());
        assert!(FitConfig::default().unbounded().validate().is_ok());
    }

    #[test]
    fn min_inliers_scales_with_ratio() {
        let cfg = FitConfig::default().with_ratio(0.75);
        assert!((cfg.min_inliers(5) - 3.75).abs() < 1e-12);
    }
}
