//! Small dense linear solves.
//!
//! In this project we repeatedly solve tiny square systems:
//!
//! ```text
//! [x_i^2  x_i  1] [a b c]^T = y_i      (i = 1..3)
//! ```
//!
//! to fit a parabola exactly through three sampled points, and the 3x3 KKT
//! system of each constrained Newton step (see `constrained`).
//!
//! Implementation choices:
//! - LU with partial pivoting (nalgebra) is enough for 3x3 systems.
//! - Singularity is judged relative to the matrix scale (Hadamard bound), so
//!   a sample with huge coordinates is not rejected just because its
//!   determinant is large in absolute terms, and vice versa.

use nalgebra::{Matrix3, Vector3};

/// Relative determinant threshold below which a system is treated as singular.
const SINGULAR_REL_TOL: f64 = 1e-12;

/// Solve `m * v = rhs`.
///
/// Returns `None` if the system is singular (or numerically so) or the
/// solution is not finite.
pub fn solve_3x3(m: &Matrix3<f64>, rhs: &Vector3<f64>) -> Option<Vector3<f64>> {
    if !m.iter().chain(rhs.iter()).all(|v| v.is_finite()) {
        return None;
    }
    if is_singular(m) {
        return None;
    }

    let v = m.lu().solve(rhs)?;
    v.iter().all(|x| x.is_finite()).then_some(v)
}

/// `|det(m)|` compared against the product of the row norms.
pub fn is_singular(m: &Matrix3<f64>) -> bool {
    let scale: f64 = (0..3).map(|i| m.row(i).norm()).product();
    if scale == 0.0 || !scale.is_finite() {
        return true;
    }
    m.determinant().abs() <= SINGULAR_REL_TOL * scale
}
