//! The RANSAC round loop.
//!
//! One round: sample → estimate → evaluate → classify. The controller then
//! decides:
//! - degenerate estimate: discard, resample (costs one attempt when bounded)
//! - `inliers >= ratio * n`: accept and return
//! - otherwise: discard, resample
//!
//! `n` is the normalized point count, so the acceptance threshold is fixed
//! before the first round. The loop holds no state across calls; the only
//! thing a call consumes is the caller's generator.

use rand::Rng;
use tracing::{debug, info, trace, warn};

use crate::domain::config::validate_max_distance;
use crate::domain::{FitConfig, FitResult, ModelKind, Point, RoundModel, RoundOutcome};
use crate::error::FitError;
use crate::fit::consensus::classify;
use crate::fit::sampler::PointSet;
use crate::models::{Estimator, LineEstimator, ParabolaEstimator};

/// What the controller does with a finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Degenerate,
    Rejected,
    Accepted,
}

/// Classify a finished round against the acceptance threshold.
pub fn decide(outcome: &RoundOutcome, min_inliers: f64) -> Decision {
    if outcome.model.is_degenerate() {
        Decision::Degenerate
    } else if outcome.inlier_count() as f64 >= min_inliers {
        Decision::Accepted
    } else {
        Decision::Rejected
    }
}

/// Fit `kind` to `points`.
///
/// Fails with [`FitError::InvalidConfiguration`] or
/// [`FitError::InsufficientPoints`] before any round runs. With
/// `config.max_iterations == None` this only returns once a round is
/// accepted.
pub fn fit<R: Rng + ?Sized>(
    points: &[Point],
    kind: ModelKind,
    config: &FitConfig,
    rng: &mut R,
) -> Result<FitResult, FitError> {
    fit_with_observer(points, kind, config, rng, |_| {})
}

/// Same as [`fit`], but `observer` sees every round (degenerate ones included)
/// in the order they ran.
pub fn fit_with_observer<R, F>(
    points: &[Point],
    kind: ModelKind,
    config: &FitConfig,
    rng: &mut R,
    observer: F,
) -> Result<FitResult, FitError>
where
    R: Rng + ?Sized,
    F: FnMut(&RoundOutcome),
{
    match kind {
        ModelKind::Line => fit_with_estimator(&LineEstimator, points, config, rng, observer),
        ModelKind::Parabola => {
            fit_with_estimator(&ParabolaEstimator::default(), points, config, rng, observer)
        }
    }
}

/// Run the acceptance loop with any [`Estimator`].
pub fn fit_with_estimator<E, R, F>(
    estimator: &E,
    points: &[Point],
    config: &FitConfig,
    rng: &mut R,
    mut observer: F,
) -> Result<FitResult, FitError>
where
    E: Estimator,
    R: Rng + ?Sized,
    F: FnMut(&RoundOutcome),
{
    config.validate()?;
    let set = PointSet::normalize(points);
    set.ensure_at_least(E::SAMPLE_SIZE)?;

    let min_inliers = config.min_inliers(set.len());
    debug!(
        points = set.len(),
        min_inliers,
        max_iterations = ?config.max_iterations,
        "starting ransac"
    );

    let mut attempt = 0usize;
    loop {
        if config.max_iterations.is_some_and(|max| attempt >= max) {
            warn!(attempts = attempt, "iteration budget exhausted without an acceptable model");
            return Ok(FitResult::NotFound { attempts: attempt });
        }
        attempt += 1;

        let outcome = run_round(estimator, &set, config.max_distance, rng);
        observer(&outcome);

        match decide(&outcome, min_inliers) {
            Decision::Degenerate => debug!(attempt, "degenerate sample, resampling"),
            Decision::Rejected => debug!(attempt, inliers = outcome.inlier_count(), "round rejected"),
            Decision::Accepted => {
                if let RoundModel::Fitted(model) = outcome.model {
                    info!(attempt, inliers = outcome.inlier_count(), model = %model.equation(), "model accepted");
                    return Ok(FitResult::Accepted {
                        model,
                        sample: outcome.sample,
                        inliers: outcome.inliers,
                        outliers: outcome.outliers,
                        attempts: attempt,
                    });
                }
            }
        }
    }
}

/// Run a single round without the acceptance loop.
///
/// Applies the same up-front checks as [`fit`] (`max_distance` and the
/// minimum point count).
pub fn fit_one_round<R: Rng + ?Sized>(
    points: &[Point],
    kind: ModelKind,
    max_distance: f64,
    rng: &mut R,
) -> Result<RoundOutcome, FitError> {
    validate_max_distance(max_distance)?;
    let set = PointSet::normalize(points);
    set.ensure_at_least(kind.sample_size())?;

    Ok(run_kind_round(kind, &set, max_distance, rng))
}

/// [`run_round`] with the estimator of `kind`, for callers that keep a
/// normalized set across rounds. `set` must hold at least
/// `kind.sample_size()` points.
pub fn run_kind_round<R: Rng + ?Sized>(
    kind: ModelKind,
    set: &PointSet,
    max_distance: f64,
    rng: &mut R,
) -> RoundOutcome {
    match kind {
        ModelKind::Line => run_round(&LineEstimator, set, max_distance, rng),
        ModelKind::Parabola => run_round(&ParabolaEstimator::default(), set, max_distance, rng),
    }
}

/// One round over an already normalized set with at least `E::SAMPLE_SIZE` points.
pub fn run_round<E, R>(estimator: &E, set: &PointSet, max_distance: f64, rng: &mut R) -> RoundOutcome
where
    E: Estimator,
    R: Rng + ?Sized,
{
    let (sample, residual) = set.sample(E::SAMPLE_SIZE, rng);

    let Some(model) = estimator.estimate(&sample) else {
        trace!(?sample, "degenerate sample");
        return RoundOutcome {
            sample,
            model: RoundModel::Degenerate,
            inliers: Vec::new(),
            outliers: residual,
        };
    };

    let distances: Vec<f64> = residual
        .iter()
        .map(|p| estimator.distance(&model, p))
        .collect();
    let (inliers, outliers) = classify(&residual, &distances, max_distance);
    trace!(?sample, inliers = inliers.len(), outliers = outliers.len(), "round classified");

    RoundOutcome {
        sample,
        model: RoundModel::Fitted(model),
        inliers,
        outliers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Model;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&c| Point::from(c)).collect()
    }

    fn sorted(mut v: Vec<Point>) -> Vec<Point> {
        v.sort_by(Point::canonical_cmp);
        v
    }

    fn assert_partition(result: &FitResult, normalized: &PointSet) {
        let FitResult::Accepted {
            sample,
            inliers,
            outliers,
            ..
        } = result
        else {
            panic!("expected an accepted fit, got {result:?}");
        };
        let all: Vec<Point> = sample.iter().chain(inliers).chain(outliers).copied().collect();
        assert_eq!(sorted(all).as_slice(), normalized.as_slice());
    }

    #[test]
    fn recovers_a_line_with_one_outlier() {
        // Inliers exclude the sample, so at most 2 of the 5 points can be
        // inliers: ratio 0.4 is the strictest reachable threshold.
        let points = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0), (10.0, -5.0)]);
        let config = FitConfig::new(0.01, Some(500), 0.4);
        let mut rng = StdRng::seed_from_u64(1);

        let result = fit(&points, ModelKind::Line, &config, &mut rng).unwrap();
        let FitResult::Accepted {
            model,
            sample,
            inliers,
            outliers,
            ..
        } = &result
        else {
            panic!("expected an accepted fit, got {result:?}");
        };

        let Model::Line { slope, intercept } = *model else {
            panic!("expected a line, got {model:?}");
        };
        assert!((slope - 1.0).abs() < 1e-12);
        assert!(intercept.abs() < 1e-12);
        assert_eq!(outliers, &pts(&[(10.0, -5.0)]));

        let consensus = sorted(sample.iter().chain(inliers).copied().collect());
        assert_eq!(consensus, pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]));
        assert_partition(&result, &PointSet::normalize(&points));
    }

    #[test]
    fn recovers_a_parabola_with_one_outlier() {
        let mut points: Vec<Point> = [-2.0, -1.0, 0.0, 1.0, 2.0]
            .iter()
            .map(|&x| Point::new(x, x * x))
            .collect();
        points.push(Point::new(0.5, 8.0));

        let config = FitConfig::new(0.01, Some(500), 0.3);
        let mut rng = StdRng::seed_from_u64(3);
        let result = fit(&points, ModelKind::Parabola, &config, &mut rng).unwrap();

        let FitResult::Accepted { model, outliers, .. } = &result else {
            panic!("expected an accepted fit, got {result:?}");
        };
        let Model::Parabola { a, b, c } = *model else {
            panic!("expected a parabola, got {model:?}");
        };
        assert!((a - 1.0).abs() < 1e-9, "a = {a}");
        assert!(b.abs() < 1e-9, "b = {b}");
        assert!(c.abs() < 1e-9, "c = {c}");
        assert_eq!(outliers, &pts(&[(0.5, 8.0)]));
        assert_partition(&result, &PointSet::normalize(&points));
    }

    #[test]
    fn same_seed_same_rounds_and_result() {
        let points = pts(&[(0.0, 1.0), (1.0, 3.2), (2.0, 4.9), (3.0, 7.1), (4.0, 2.0), (5.0, 11.0)]);
        let config = FitConfig::new(0.5, Some(20), 0.9);

        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut rounds = Vec::new();
            let result = fit_with_observer(&points, ModelKind::Line, &config, &mut rng, |r| {
                rounds.push(r.sample.clone())
            })
            .unwrap();
            (rounds, result)
        };

        assert_eq!(run(99), run(99));
    }

    #[test]
    fn duplicates_do_not_change_the_result() {
        let base = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0), (10.0, -5.0)]);
        let mut noisy = base.clone();
        noisy.extend(pts(&[(1.0, 1.0), (10.0, -5.0), (0.0, 0.0)]));
        noisy.reverse();

        let config = FitConfig::new(0.01, Some(100), 0.4);
        let a = fit(&base, ModelKind::Line, &config, &mut StdRng::seed_from_u64(5)).unwrap();
        let b = fit(&noisy, ModelKind::Line, &config, &mut StdRng::seed_from_u64(5)).unwrap();
        assert!(a.is_accepted());
        assert_eq!(a, b);
    }

    #[test]
    fn bounded_mode_stops_after_exactly_max_iterations() {
        // No line through two of these points contains a third one.
        let points = pts(&[(0.0, 0.0), (1.0, 5.0), (2.0, -3.0), (3.0, 8.0), (4.0, 1.0)]);
        let config = FitConfig::new(0.001, Some(7), 1.0);

        let mut rounds = 0;
        let result = fit_with_observer(
            &points,
            ModelKind::Line,
            &config,
            &mut StdRng::seed_from_u64(11),
            |_| rounds += 1,
        )
        .unwrap();
        assert_eq!(result, FitResult::NotFound { attempts: 7 });
        assert_eq!(rounds, 7);
    }

    #[test]
    fn degenerate_parabola_samples_are_retried() {
        // Three points share x = 0; any sample containing two of them is singular.
        let points = pts(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0), (1.0, 1.0), (2.0, 4.0), (-1.0, 1.0)]);
        let config = FitConfig::new(0.01, Some(200), 0.0);

        let mut degenerate = 0;
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..20 {
            let result = fit_with_observer(&points, ModelKind::Parabola, &config, &mut rng, |r| {
                if r.model.is_degenerate() {
                    assert!(r.inliers.is_empty());
                    assert_eq!(r.total_points(), points.len());
                    degenerate += 1;
                }
            })
            .unwrap();
            assert!(result.is_accepted());
            assert!(result.model().is_some_and(|m| m.kind() == ModelKind::Parabola));
        }
        assert!(degenerate > 0, "expected at least one degenerate sample in 20 fits");
    }

    #[test]
    fn all_points_sharing_x_never_accept_a_parabola() {
        let points = pts(&[(1.0, 0.0), (1.0, 1.0), (1.0, 2.0), (1.0, 3.0)]);
        let config = FitConfig::new(1.0, Some(10), 0.0);
        let result = fit(&points, ModelKind::Parabola, &config, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(result, FitResult::NotFound { attempts: 10 });
    }

    #[test]
    fn vertical_points_give_a_vertical_line() {
        let points = pts(&[(2.0, 0.0), (2.0, 1.0), (2.0, 5.0), (2.0, 9.0)]);
        let config = FitConfig::new(0.0, Some(1), 0.5);
        let result = fit(&points, ModelKind::Line, &config, &mut StdRng::seed_from_u64(4)).unwrap();
        assert_eq!(result.model(), Some(&Model::VerticalLine { x: 2.0 }));
    }

    #[test]
    fn exactly_k_points_accept_only_with_zero_ratio() {
        let points = pts(&[(0.0, 0.0), (1.0, 2.0)]);

        let strict = FitConfig::new(1.0, Some(5), 0.5);
        let result = fit(&points, ModelKind::Line, &strict, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(result, FitResult::NotFound { attempts: 5 });

        let lenient = FitConfig::new(1.0, Some(5), 0.0);
        let result = fit(&points, ModelKind::Line, &lenient, &mut StdRng::seed_from_u64(0)).unwrap();
        let FitResult::Accepted {
            inliers,
            outliers,
            attempts,
            ..
        } = result
        else {
            panic!("expected acceptance with ratio 0");
        };
        assert!(inliers.is_empty() && outliers.is_empty());
        assert_eq!(attempts, 1);
    }

    #[test]
    fn insufficient_points_fail_before_any_round() {
        let points = pts(&[(1.0, 1.0), (1.0, 1.0), (2.0, 2.0)]);
        let mut rounds = 0;
        let err = fit_with_observer(
            &points,
            ModelKind::Parabola,
            &FitConfig::default(),
            &mut StdRng::seed_from_u64(0),
            |_| rounds += 1,
        )
        .unwrap_err();
        assert_eq!(
            err,
            FitError::InsufficientPoints {
                required: 3,
                available: 2
            }
        );
        assert_eq!(rounds, 0);

        let err = fit_one_round(&points[..1], ModelKind::Line, 1.0, &mut StdRng::seed_from_u64(0));
        assert!(matches!(err, Err(FitError::InsufficientPoints { .. })));
    }

    #[test]
    fn invalid_configuration_is_rejected_up_front() {
        let points = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        let mut rng = StdRng::seed_from_u64(0);
        let bad = FitConfig::new(-1.0, Some(10), 0.5);
        assert!(matches!(
            fit(&points, ModelKind::Line, &bad, &mut rng),
            Err(FitError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            fit_one_round(&points, ModelKind::Line, f64::NAN, &mut rng),
            Err(FitError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn unbounded_mode_terminates_when_a_model_exists() {
        let points = pts(&[(0.0, 1.0), (1.0, 3.0), (2.0, 5.0), (3.0, 7.0), (1.5, -9.0)]);
        let config = FitConfig::new(1e-9, None, 0.4);
        let result = fit(&points, ModelKind::Line, &config, &mut StdRng::seed_from_u64(8)).unwrap();
        assert_eq!(result.model(), Some(&Model::Line { slope: 2.0, intercept: 1.0 }));
    }

    #[test]
    fn single_round_partitions_the_normalized_set() {
        let points = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0), (10.0, -5.0), (3.0, 3.0)]);
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..20 {
            let round = fit_one_round(&points, ModelKind::Line, 0.01, &mut rng).unwrap();
            assert_eq!(round.sample.len(), 2);
            assert_eq!(round.total_points(), 5);
            for p in &round.inliers {
                assert!(!round.sample.contains(p) && !round.outliers.contains(p));
            }
        }
    }

    #[test]
    fn decide_follows_the_threshold() {
        let outcome = RoundOutcome {
            sample: pts(&[(0.0, 0.0), (1.0, 1.0)]),
            model: RoundModel::Fitted(Model::Line { slope: 1.0, intercept: 0.0 }),
            inliers: pts(&[(2.0, 2.0), (3.0, 3.0)]),
            outliers: pts(&[(4.0, 0.0)]),
        };
        assert_eq!(decide(&outcome, 2.0), Decision::Accepted);
        assert_eq!(decide(&outcome, 2.5), Decision::Rejected);

        let degenerate = RoundOutcome {
            model: RoundModel::Degenerate,
            ..outcome
        };
        assert_eq!(decide(&degenerate, 0.0), Decision::Degenerate);
    }
}
