//! Consensus classification: inliers vs outliers by distance.

use crate::domain::Point;

/// Split `points` by their `distances` (same length, same order).
///
/// A point is an inlier iff `distance <= max_distance`; a `NaN` distance is
/// never an inlier. Relative order is preserved in both outputs.
pub fn classify(points: &[Point], distances: &[f64], max_distance: f64) -> (Vec<Point>, Vec<Point>) {
    debug_assert_eq!(points.len(), distances.len());

    let mut inliers = Vec::new();
    let mut outliers = Vec::new();
    for (p, &d) in points.iter().zip(distances) {
        if d <= max_distance {
            inliers.push(*p);
        } else {
            outliers.push(*p);
        }
    }
    (inliers, outliers)
}
