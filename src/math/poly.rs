//! Real roots of low-degree polynomials.
//!
//! Cubics are solved through the eigenvalues of their companion matrix and
//! then polished with a few Newton steps on the original polynomial, which
//! keeps clustered or nearly-double roots accurate enough for distance checks.

use nalgebra::Matrix3;

/// Imaginary part (relative to `1 + |re|`) below which an eigenvalue counts as real.
const REAL_TOL: f64 = 1e-7;

/// Leading coefficients smaller than this fraction of the largest one are dropped.
const DEGREE_TOL: f64 = 1e-14;

const POLISH_STEPS: usize = 3;

/// Real roots of `c3 x³ + c2 x² + c1 x + c0`, unsorted.
///
/// Degenerate leading coefficients fall back to the quadratic / linear case.
/// Returns an empty list for non-finite input or the zero polynomial.
pub fn real_cubic_roots(c3: f64, c2: f64, c1: f64, c0: f64) -> Vec<f64> {
    let coeffs = [c3, c2, c1, c0];
    if !coeffs.iter().all(|c| c.is_finite()) {
        return Vec::new();
    }
    let scale = coeffs.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
    if scale == 0.0 {
        return Vec::new();
    }
    if c3.abs() <= DEGREE_TOL * scale {
        return real_quadratic_roots(c2, c1, c0);
    }

    let (p2, p1, p0) = (c2 / c3, c1 / c3, c0 / c3);
    #[rustfmt::skip]
    let companion = Matrix3::new(
        -p2, -p1, -p0,
        1.0, 0.0, 0.0,
        0.0, 1.0, 0.0,
    );

    companion
        .complex_eigenvalues()
        .iter()
        .filter(|z| z.im.abs() <= REAL_TOL * (1.0 + z.re.abs()))
        .map(|z| polish(z.re, c3, c2, c1, c0))
        .collect()
}

/// Real roots of `a x² + b x + c`.
pub fn real_quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    let scale = a.abs().max(b.abs()).max(c.abs());
    if scale == 0.0 || !scale.is_finite() {
        return Vec::new();
    }
    if a.abs() <= DEGREE_TOL * scale {
        return if b != 0.0 { vec![-c / b] } else { Vec::new() };
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    // Numerically stable form: avoid subtracting nearly equal quantities.
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    if q == 0.0 {
        return vec![0.0];
    }
    vec![q / a, c / q]
}

fn polish(mut x: f64, c3: f64, c2: f64, c1: f64, c0: f64) -> f64 {
    for _ in 0..POLISH_STEPS {
        let f = ((c3 * x + c2) * x + c1) * x + c0;
        let df = (3.0 * c3 * x + 2.0 * c2) * x + c1;
        if df == 0.0 || !df.is_finite() {
            break;
        }
        let next = x - f / df;
        if !next.is_finite() {
            break;
        }
        x = next;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut v: Vec<f64>) -> Vec<f64> {
        v.sort_by(f64::total_cmp);
        v
    }

    #[test]
    fn cubic_with_three_real_roots() {
        // (x - 1)(x + 2)(x - 3) = x^3 - 2x^2 - 5x + 6
        let roots = sorted(real_cubic_roots(1.0, -2.0, -5.0, 6.0));
        assert_eq!(roots.len(), 3);
        for (r, e) in roots.iter().zip([-2.0, 1.0, 3.0]) {
            assert!((r - e).abs() < 1e-10, "root {r} != {e}");
        }
    }

    #[test]
    fn cubic_with_one_real_root() {
        // x^3 + x + 2 = (x + 1)(x^2 - x + 2)
        let roots = real_cubic_roots(1.0, 0.0, 1.0, 2.0);
        assert_eq!(roots.len(), 1);
        assert!((roots[0] + 1.0).abs() < 1e-10);
    }

    #[test]
    fn vanishing_leading_coefficient_falls_back() {
        let roots = sorted(real_cubic_roots(0.0, 1.0, 0.0, -4.0));
        assert_eq!(roots.len(), 2);
        assert!((roots[0] + 2.0).abs() < 1e-12);
        assert!((roots[1] - 2.0).abs() < 1e-12);
        assert!(real_cubic_roots(0.0, 0.0, 0.0, 0.0).is_empty());
        assert!(real_cubic_roots(f64::NAN, 1.0, 0.0, 0.0).is_empty());
    }
}
