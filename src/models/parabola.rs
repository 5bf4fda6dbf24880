//! Parabolas `y = a x² + b x + c` through three sampled points.
//!
//! Estimation solves the 3x3 Vandermonde-like system exactly. Distance has no
//! closed form: for each query point `q` we minimize `|p - q|²` subject to
//! `a x² + b x + c - y = 0`, starting the constrained Newton solver at `q`.
//!
//! The stationary points of the reduced 1D problem
//!
//! ```text
//! d(x) = (x - qx)² + (a x² + b x + c - qy)²
//! d'(x) / 2 = 2a² x³ + 3ab x² + (2a c' + b² + 1) x + (b c' - qx),   c' = c - qy
//! ```
//!
//! are the roots of a cubic, and the solver result is checked against them:
//! a local minimizer far from the query point can never overstate the distance.

use nalgebra::{Matrix2, Matrix3, Vector2, Vector3};

use crate::domain::{Model, Point};
use crate::math::{
    NewtonOptions, SmoothFn2, SquaredDistance, minimize_with_equality, real_cubic_roots, solve_3x3,
};
use crate::models::{Estimator, line_distance};

/// Three-point parabola estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParabolaEstimator {
    /// Settings of the per-point constrained solve.
    pub solver: NewtonOptions,
}

impl Estimator for ParabolaEstimator {
    const SAMPLE_SIZE: usize = 3;

    fn estimate(&self, sample: &[Point]) -> Option<Model> {
        match sample {
            [p1, p2, p3] => fit_parabola(p1, p2, p3),
            _ => None,
        }
    }

    /// Lines are not parabolas: they measure as `NaN` (never an inlier).
    fn distance(&self, model: &Model, point: &Point) -> f64 {
        match *model {
            Model::Parabola { a, b, c } => parabola_distance(a, b, c, point, &self.solver),
            Model::Line { .. } | Model::VerticalLine { .. } => f64::NAN,
        }
    }
}

/// Exact parabola through three points.
///
/// Returns `None` when the system is singular, e.g. two points share an
/// x-coordinate.
pub fn fit_parabola(p1: &Point, p2: &Point, p3: &Point) -> Option<Model> {
    let pts = [p1, p2, p3];
    let m = Matrix3::from_fn(|r, c| match c {
        0 => pts[r].x * pts[r].x,
        1 => pts[r].x,
        _ => 1.0,
    });
    let rhs = Vector3::new(p1.y, p2.y, p3.y);

    let v = solve_3x3(&m, &rhs)?;
    Some(Model::Parabola {
        a: v[0],
        b: v[1],
        c: v[2],
    })
}

/// The curve as an equality constraint `g(x, y) = a x² + b x + c - y`.
#[derive(Debug, Clone, Copy)]
struct OnParabola {
    a: f64,
    b: f64,
    c: f64,
}

impl OnParabola {
    fn eval(&self, x: f64) -> f64 {
        (self.a * x + self.b) * x + self.c
    }
}

impl SmoothFn2 for OnParabola {
    fn value(&self, p: &Vector2<f64>) -> f64 {
        self.eval(p[0]) - p[1]
    }

    fn gradient(&self, p: &Vector2<f64>) -> Vector2<f64> {
        Vector2::new(2.0 * self.a * p[0] + self.b, -1.0)
    }

    fn hessian(&self, _p: &Vector2<f64>) -> Matrix2<f64> {
        Matrix2::new(2.0 * self.a, 0.0, 0.0, 0.0)
    }
}

/// Euclidean distance from `point` to the parabola `y = a x² + b x + c`.
pub fn parabola_distance(a: f64, b: f64, c: f64, point: &Point, opts: &NewtonOptions) -> f64 {
    if a == 0.0 {
        return line_distance(&Model::Line { slope: b, intercept: c }, point);
    }

    let curve = OnParabola { a, b, c };
    let to_curve = |x: f64| point.distance(&Point::new(x, curve.eval(x)));

    let target = Vector2::new(point.x, point.y);
    let solved = minimize_with_equality(&SquaredDistance { target }, &curve, target, opts);

    // Every x yields an on-curve point, so each candidate is an upper bound;
    // the global minimum is one of the cubic's real roots.
    let c_shift = c - point.y;
    let roots = real_cubic_roots(
        2.0 * a * a,
        3.0 * a * b,
        2.0 * a * c_shift + b * b + 1.0,
        b * c_shift - point.x,
    );

    roots
        .into_iter()
        .chain(solved.point[0].is_finite().then_some(solved.point[0]))
        .map(to_curve)
        .filter(|d| d.is_finite())
        .fold(f64::INFINITY, f64::min)
}
