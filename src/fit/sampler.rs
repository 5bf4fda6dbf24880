//! Point set normalization and minimal random sampling.
//!
//! The normalized set is built once per fit call and is read-only afterwards:
//! every round draws its sample as indices into it and gets fresh `sample`
//! and `residual` vectors back, so no round can alias another.

use rand::Rng;
use rand::seq::index;
use tracing::warn;

use crate::domain::Point;
use crate::error::FitError;

/// Deduplicated points in canonical (lexicographic) order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointSet {
    points: Vec<Point>,
}

impl PointSet {
    /// Sort, drop exact duplicates and non-finite points. O(n log n).
    ///
    /// The caller's slice is left untouched.
    pub fn normalize(raw: &[Point]) -> Self {
        // `+ 0.0` folds `-0.0` into `0.0` so the total-order sort agrees with `==`.
        let mut points: Vec<Point> = raw
            .iter()
            .filter(|p| p.is_finite())
            .map(|p| Point::new(p.x + 0.0, p.y + 0.0))
            .collect();
        let dropped = raw.len() - points.len();
        if dropped > 0 {
            warn!(dropped, "ignoring non-finite points");
        }

        points.sort_by(Point::canonical_cmp);
        points.dedup();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// Fail fast when fewer than `k` distinct points are available.
    pub fn ensure_at_least(&self, k: usize) -> Result<(), FitError> {
        if self.points.len() < k {
            return Err(FitError::InsufficientPoints {
                required: k,
                available: self.points.len(),
            });
        }
        Ok(())
    }

    /// Draw `k` distinct points uniformly without replacement.
    ///
    /// Returns `(sample, residual)`: the sample in draw order and every other
    /// point in canonical order. Callers check `len() >= k` once up front
    /// (see [`PointSet::ensure_at_least`]).
    ///
    /// # Panics
    /// Panics if `k > len()`.
    pub fn sample<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> (Vec<Point>, Vec<Point>) {
        let picked = index::sample(rng, self.points.len(), k);

        let mut chosen = vec![false; self.points.len()];
        let mut sample = Vec::with_capacity(k);
        for i in picked.iter() {
            chosen[i] = true;
            sample.push(self.points[i]);
        }

        let residual = self
            .points
            .iter()
            .zip(&chosen)
            .filter(|&(_, &c)| !c)
            .map(|(p, _)| *p)
            .collect();

        (sample, residual)
    }
}

/// Shorthand for [`PointSet::normalize`].
pub fn normalize(points: &[Point]) -> PointSet {
    PointSet::normalize(points)
}
