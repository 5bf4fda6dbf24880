//! Equality-constrained minimization in the plane.
//!
//! Solves
//!
//! ```text
//! minimize f(p)   subject to   g(p) = 0,   p ∈ R²
//! ```
//!
//! with Newton's method on the Lagrangian `L(p, λ) = f(p) + λ g(p)`: each step
//! solves the 3x3 KKT system
//!
//! ```text
//! [ ∇²L   ∇g ] [dp]   = - [ ∇L ]
//! [ ∇gᵀ    0 ] [dλ]       [ g  ]
//! ```
//!
//! This converges quadratically near a regular minimizer, which is all the
//! parabola distance needs (the start point is the query point itself, so we
//! are usually close already). Steps are clamped to `max_step` to keep a bad
//! first iterate from flinging the solver far away.

use nalgebra::{Matrix2, Matrix3, Vector2, Vector3};

use crate::math::linear::solve_3x3;

/// A twice-differentiable scalar function of a 2D point.
pub trait SmoothFn2 {
    fn value(&self, p: &Vector2<f64>) -> f64;
    fn gradient(&self, p: &Vector2<f64>) -> Vector2<f64>;
    fn hessian(&self, p: &Vector2<f64>) -> Matrix2<f64>;
}

/// Solver knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonOptions {
    pub max_iters: usize,
    /// Relative step size below which the iteration stops.
    pub step_tol: f64,
    /// Maximum `|g(p)|` accepted at convergence.
    pub feasibility_tol: f64,
    /// Longest allowed step in `p`.
    pub max_step: f64,
}

impl Default for NewtonOptions {
    fn default() -> Self {
        Self {
            max_iters: 50,
            step_tol: 1e-12,
            feasibility_tol: 1e-9,
            max_step: 1e3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstrainedMinimum {
    pub point: Vector2<f64>,
    pub multiplier: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Run the Newton-Lagrange iteration from `x0`.
///
/// Never panics: a singular KKT system or a non-finite iterate stops the
/// iteration and the last finite iterate is returned with `converged = false`.
pub fn minimize_with_equality<F, G>(
    objective: &F,
    constraint: &G,
    x0: Vector2<f64>,
    opts: &NewtonOptions,
) -> ConstrainedMinimum
where
    F: SmoothFn2,
    G: SmoothFn2,
{
    let mut p = x0;
    let mut lambda = initial_multiplier(objective, constraint, &p);

    for iter in 0..opts.max_iters {
        let gf = objective.gradient(&p);
        let gg = constraint.gradient(&p);
        let g = constraint.value(&p);

        let grad_l = gf + gg * lambda;
        let h = objective.hessian(&p) + constraint.hessian(&p) * lambda;

        #[rustfmt::skip]
        let kkt = Matrix3::new(
            h[(0, 0)], h[(0, 1)], gg[0],
            h[(1, 0)], h[(1, 1)], gg[1],
            gg[0],     gg[1],     0.0,
        );
        let rhs = Vector3::new(-grad_l[0], -grad_l[1], -g);

        let Some(step) = solve_3x3(&kkt, &rhs) else {
            return ConstrainedMinimum {
                point: p,
                multiplier: lambda,
                iterations: iter,
                converged: false,
            };
        };

        let mut dp = Vector2::new(step[0], step[1]);
        let norm = dp.norm();
        if norm > opts.max_step {
            dp *= opts.max_step / norm;
        }

        let next = p + dp;
        if !(next[0].is_finite() && next[1].is_finite()) {
            break;
        }
        p = next;
        lambda += step[2];

        if dp.norm() <= opts.step_tol * (1.0 + p.norm())
            && constraint.value(&p).abs() <= opts.feasibility_tol
        {
            return ConstrainedMinimum {
                point: p,
                multiplier: lambda,
                iterations: iter + 1,
                converged: true,
            };
        }
    }

    let converged = constraint.value(&p).abs() <= opts.feasibility_tol
        && (objective.gradient(&p) + constraint.gradient(&p) * lambda).norm()
            <= opts.feasibility_tol.sqrt();
    ConstrainedMinimum {
        point: p,
        multiplier: lambda,
        iterations: opts.max_iters,
        converged,
    }
}

/// Least-squares estimate of `λ` from `∇f + λ∇g ≈ 0`.
fn initial_multiplier<F: SmoothFn2, G: SmoothFn2>(objective: &F, constraint: &G, p: &Vector2<f64>) -> f64 {
    let gf = objective.gradient(p);
    let gg = constraint.gradient(p);
    let denom = gg.norm_squared();
    if denom > 0.0 && denom.is_finite() {
        -gf.dot(&gg) / denom
    } else {
        0.0
    }
}

/// `f(p) = |p - target|²`
#[derive(Debug, Clone, Copy)]
pub struct SquaredDistance {
    pub target: Vector2<f64>,
}

impl SmoothFn2 for SquaredDistance {
    fn value(&self, p: &Vector2<f64>) -> f64 {
        (p - self.target).norm_squared()
    }

    fn gradient(&self, p: &Vector2<f64>) -> Vector2<f64> {
        (p - self.target) * 2.0
    }

    fn hessian(&self, _p: &Vector2<f64>) -> Matrix2<f64> {
        Matrix2::identity() * 2.0
    }
}
