// src/solver.rs - Minimum segment duration under velocity/acceleration limits
//
// For a joint moving between boundary states (x0, v0) and (x1, v1), the Hermite
// cubic over [0, T] is fully determined by T. The solver looks for the smallest
// T whose cubic keeps |p'| <= v_max and |p''| <= a_max.
//
// Rest-to-rest moves have a closed form. Otherwise every bound is active at a
// root of a quadratic in T, so those roots are tried first; a bracketed
// bisection covers the cases where none of them is feasible.

use crate::config::SmootherConfig;
use crate::error::SolverError;
use crate::limits::JointLimit;
use crate::polynomial::CubicPolynomial;
use crate::waypoint::JointBoundary;

/// Computes per-joint and per-segment minimum durations.
#[derive(Debug, Clone, Copy)]
pub struct SegmentTimeSolver<'a> {
    config: &'a SmootherConfig,
}

impl<'a> SegmentTimeSolver<'a> {
    pub fn new(config: &'a SmootherConfig) -> Self {
        Self { config }
    }

    /// Smallest duration for which `boundary` respects `limit`.
    ///
    /// Returns 0 when the joint does not move or is unconstrained; the caller
    /// floors the shared segment duration.
    pub fn joint_duration(
        &self,
        boundary: &JointBoundary,
        limit: &JointLimit,
    ) -> Result<f64, SolverError> {
        limit.check()?;
        if boundary.is_stationary() {
            return Ok(0.0);
        }

        let v_max = limit.velocity_bound();
        let a_max = limit.acceleration_bound();
        if v_max == 0.0 {
            return Err(SolverError::Infeasible(format!(
                "velocity limit is 0 but the joint must move from {} to {}",
                boundary.start_position, boundary.end_position
            )));
        }
        if a_max == 0.0 {
            // Only a constant-velocity move has zero acceleration, and only at
            // the single duration Δx / v.
            if boundary.is_constant_velocity() {
                return Err(SolverError::Unsupported(format!(
                    "constant-velocity move from {} to {} under a zero acceleration limit",
                    boundary.start_position, boundary.end_position
                )));
            }
            return Err(SolverError::Infeasible(format!(
                "acceleration limit is 0 but the joint must move from {} to {}",
                boundary.start_position, boundary.end_position
            )));
        }
        let v_allowed = v_max * (1.0 + self.config.limit_tolerance);
        for velocity in [boundary.start_velocity, boundary.end_velocity] {
            if velocity.abs() > v_allowed {
                return Err(SolverError::Infeasible(format!(
                    "boundary velocity {} exceeds velocity limit {}",
                    velocity, v_max
                )));
            }
        }
        if limit.is_unbounded() {
            return Ok(0.0);
        }

        if boundary.starts_and_ends_at_rest() {
            return Ok(rest_to_rest_duration(boundary.displacement().abs(), v_max, a_max));
        }

        let best = critical_durations(boundary, v_max, a_max)
            .into_iter()
            .filter(|&t| self.is_feasible(boundary, v_max, a_max, t))
            .fold(None, |best: Option<f64>, t| Some(best.map_or(t, |b| b.min(t))));
        if let Some(duration) = best {
            tracing::trace!(duration, ?boundary, "critical duration accepted");
            return Ok(duration);
        }

        tracing::warn!(?boundary, v_max, a_max, "no critical duration feasible, bisecting");
        self.bisect(boundary, v_max, a_max)
    }

    /// Shared duration for one waypoint pair, never shorter than `at_least`.
    ///
    /// Starts from the slowest joint's minimum. A longer duration can push
    /// another joint over its acceleration bound, so the shared value is
    /// checked against every joint and moved up to the next duration they all
    /// accept. On failure the offending joint index is returned with the error.
    pub fn segment_duration(
        &self,
        boundaries: &[JointBoundary],
        limits: &[JointLimit],
        at_least: f64,
    ) -> Result<(f64, Option<usize>), (usize, SolverError)> {
        let mut duration = at_least;
        let mut limiting_joint = None;
        for (joint, (boundary, limit)) in boundaries.iter().zip(limits).enumerate() {
            let required = self.joint_duration(boundary, limit).map_err(|e| (joint, e))?;
            tracing::trace!(joint, required, "joint duration");
            if required > duration {
                duration = required;
                limiting_joint = Some(joint);
            }
        }
        let Some(violating) = self.first_violation(boundaries, limits, duration) else {
            return Ok((duration, limiting_joint));
        };

        tracing::debug!(
            duration,
            joint = violating,
            "shared duration violates a joint limit, searching longer durations"
        );
        let mut candidates: Vec<f64> = boundaries
            .iter()
            .zip(limits)
            .flat_map(|(b, l)| critical_durations(b, l.velocity_bound(), l.acceleration_bound()))
            .filter(|&t| t > duration)
            .collect();
        candidates.sort_by(f64::total_cmp);
        let mut limiting = violating;
        for t in candidates {
            match self.first_violation(boundaries, limits, t) {
                None => return Ok((t, Some(limiting))),
                Some(joint) => limiting = joint,
            }
        }

        let mut lower = duration;
        let mut upper = duration;
        let mut expansions = 0;
        loop {
            upper *= self.config.bracket_growth;
            expansions += 1;
            match self.first_violation(boundaries, limits, upper) {
                None => break,
                Some(joint) if expansions >= self.config.max_bracket_expansions => {
                    return Err((joint, SolverError::NoConvergence { iterations: expansions }));
                }
                Some(joint) => {
                    lower = upper;
                    limiting = joint;
                }
            }
        }
        let mut iterations = 0;
        while upper - lower > self.config.duration_tolerance
            && iterations < self.config.max_bisection_iterations
        {
            let mid = 0.5 * (lower + upper);
            match self.first_violation(boundaries, limits, mid) {
                None => upper = mid,
                Some(joint) => {
                    lower = mid;
                    limiting = joint;
                }
            }
            iterations += 1;
        }
        Ok((upper, Some(limiting)))
    }

    /// First joint whose limits are broken at shared duration `t`.
    fn first_violation(
        &self,
        boundaries: &[JointBoundary],
        limits: &[JointLimit],
        t: f64,
    ) -> Option<usize> {
        boundaries.iter().zip(limits).position(|(b, l)| {
            !b.is_stationary()
                && !self.is_feasible(b, l.velocity_bound(), l.acceleration_bound(), t)
        })
    }

    /// Whether the cubic of duration `t` stays within both bounds.
    pub fn is_feasible(&self, boundary: &JointBoundary, v_max: f64, a_max: f64, t: f64) -> bool {
        if !(t.is_finite() && t > 0.0) {
            return false;
        }
        let slack = 1.0 + self.config.limit_tolerance;
        let poly = CubicPolynomial::hermite(boundary, t);
        poly.peak_acceleration(t) <= a_max * slack && poly.peak_velocity(t) <= v_max * slack
    }

    fn bisect(&self, boundary: &JointBoundary, v_max: f64, a_max: f64) -> Result<f64, SolverError> {
        let cfg = self.config;
        let mut lower = 0.0;
        let mut upper = 1.0;
        let mut expansions = 0;
        while !self.is_feasible(boundary, v_max, a_max, upper) {
            if expansions >= cfg.max_bracket_expansions {
                return Err(SolverError::NoConvergence { iterations: expansions });
            }
            lower = upper;
            upper *= cfg.bracket_growth;
            expansions += 1;
        }

        let mut iterations = 0;
        while upper - lower > cfg.duration_tolerance && iterations < cfg.max_bisection_iterations
        {
            let mid = 0.5 * (lower + upper);
            if self.is_feasible(boundary, v_max, a_max, mid) {
                upper = mid;
            } else {
                lower = mid;
            }
            iterations += 1;
        }
        tracing::debug!(duration = upper, expansions, iterations, "bisection converged");
        Ok(upper)
    }
}

/// Closed form for zero boundary velocities: peak velocity is 1.5 Δx / T and
/// peak acceleration 6 Δx / T².
pub fn rest_to_rest_duration(distance: f64, v_max: f64, a_max: f64) -> f64 {
    let by_velocity = if v_max.is_finite() { 1.5 * distance / v_max } else { 0.0 };
    let by_acceleration = if a_max.is_finite() { (6.0 * distance / a_max).sqrt() } else { 0.0 };
    by_velocity.max(by_acceleration)
}

/// Positive durations at which one of the bounds is exactly active.
///
/// With d = Δx, s = 2 v0 + v1 and w = v0 + v1:
///
/// * start acceleration  `2(3d - sT)/T² = ±a`   →  `±a T² + 2s T - 6d = 0`
/// * end acceleration    `(-6d + (2v0 + 4v1)T)/T² = ±a` → `±a T² - (2v0 + 4v1) T + 6d = 0`
/// * interior velocity   `v0 - a2²/(3 a3) = ±v` →
///   `(s² - 3w(v0 ∓ v)) T² + 6d((v0 ∓ v) - s) T + 9d² = 0`
fn critical_durations(boundary: &JointBoundary, v_max: f64, a_max: f64) -> Vec<f64> {
    let d = boundary.displacement();
    let v0 = boundary.start_velocity;
    let v1 = boundary.end_velocity;
    let s = 2.0 * v0 + v1;
    let w = v0 + v1;

    let mut roots = Vec::with_capacity(12);
    for sign in [1.0, -1.0] {
        if a_max.is_finite() {
            let a = sign * a_max;
            roots.extend(positive_roots(a, 2.0 * s, -6.0 * d));
            roots.extend(positive_roots(a, -(2.0 * v0 + 4.0 * v1), 6.0 * d));
        }
        if v_max.is_finite() {
            let offset = v0 - sign * v_max;
            roots.extend(positive_roots(
                s * s - 3.0 * w * offset,
                6.0 * d * offset - 6.0 * d * s,
                9.0 * d * d,
            ));
        }
    }
    roots
}

/// Positive real roots of `a x² + b x + c`. A repeated root is skipped: the
/// bound is only touched there, never crossed.
fn positive_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    const REL_EPS: f64 = 1e-9;
    let scale = a.abs().max(b.abs()).max(c.abs());
    if scale == 0.0 {
        return Vec::new();
    }
    if a.abs() <= REL_EPS * scale {
        if b == 0.0 {
            return Vec::new();
        }
        let x = -c / b;
        return if x > 0.0 && x.is_finite() { vec![x] } else { Vec::new() };
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant <= REL_EPS * (b * b + (4.0 * a * c).abs()) {
        return Vec::new();
    }
    // Numerically stable pair: q = -(b + sign(b) sqrt(D)) / 2.
    let q = -0.5 * (b + b.signum() * discriminant.sqrt());
    let mut roots = Vec::with_capacity(2);
    for x in [q / a, if q != 0.0 { c / q } else { f64::NAN }] {
        if x > 0.0 && x.is_finite() {
            roots.push(x);
        }
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(boundary: JointBoundary, limit: JointLimit) -> Result<f64, SolverError> {
        let config = SmootherConfig::default();
        SegmentTimeSolver::new(&config).joint_duration(&boundary, &limit)
    }

    #[test]
    fn test_rest_to_rest_acceleration_bound() {
        let t = solve(JointBoundary::new(0.0, 1.0, 0.0, 0.0), JointLimit::new(0.2, 0.1)).unwrap();
        assert!((t - 60.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_rest_to_rest_velocity_bound() {
        let t = solve(JointBoundary::new(2.0, 1.0, 0.0, 0.0), JointLimit::velocity(0.25)).unwrap();
        assert!((t - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_moving_end_against_motion() {
        let t = solve(JointBoundary::new(0.0, 1.0, 0.0, -0.2), JointLimit::new(0.2, 0.1)).unwrap();
        assert!((t - 12.717798).abs() < 1e-5, "{}", t);
    }

    #[test]
    fn test_moving_end_along_motion() {
        let t = solve(JointBoundary::new(0.0, 1.0, 0.0, 0.2), JointLimit::new(0.2, 0.1)).unwrap();
        assert!((t - 10.606602).abs() < 1e-5, "{}", t);
    }

    #[test]
    fn test_result_is_feasible_for_general_boundaries() {
        let config = SmootherConfig::default();
        let solver = SegmentTimeSolver::new(&config);
        let cases = [
            (JointBoundary::new(0.0, 2.0, 0.5, 0.3), JointLimit::new(1.0, 0.5)),
            (JointBoundary::new(1.0, -1.0, 0.4, -0.4), JointLimit::new(0.8, 2.0)),
            (JointBoundary::new(0.0, 0.0, 0.3, 0.3), JointLimit::new(0.5, 0.2)),
            (JointBoundary::new(0.0, 3.0, -0.2, 0.0), JointLimit::velocity(1.0)),
        ];
        for (boundary, limit) in cases {
            let t = solver.joint_duration(&boundary, &limit).unwrap();
            assert!(t > 0.0);
            let poly = CubicPolynomial::hermite(&boundary, t);
            let slack = 1.0 + 1e-6;
            assert!(poly.peak_velocity(t) <= limit.velocity_bound() * slack, "{:?}", boundary);
            let a_allowed = limit.acceleration_bound() * slack;
            assert!(poly.peak_acceleration(t) <= a_allowed, "{:?}", boundary);
        }
    }

    #[test]
    fn test_stationary_and_unbounded_need_no_time() {
        let idle = JointBoundary::new(1.0, 1.0, 0.0, 0.0);
        assert_eq!(solve(idle, JointLimit::new(0.0, 0.0)).unwrap(), 0.0);
        let moving = JointBoundary::new(0.0, 5.0, 1.0, 0.0);
        assert_eq!(solve(moving, JointLimit::unbounded()).unwrap(), 0.0);
    }

    #[test]
    fn test_zero_limits_are_infeasible() {
        let moving = JointBoundary::new(0.0, 1.0, 0.0, 0.0);
        let no_acceleration = JointLimit::unbounded().with_acceleration(0.0);
        let err = solve(moving, JointLimit::velocity(0.0)).unwrap_err();
        assert!(matches!(err, SolverError::Infeasible(_)));
        assert!(matches!(solve(moving, no_acceleration), Err(SolverError::Infeasible(_))));

        // Reversing at constant speed needs acceleration at any duration.
        let reversing = JointBoundary::new(0.0, -1.0, 0.5, 0.5);
        assert!(matches!(solve(reversing, no_acceleration), Err(SolverError::Infeasible(_))));
    }

    #[test]
    fn test_constant_velocity_under_zero_acceleration_is_unsupported() {
        let cruising = JointBoundary::new(0.0, 1.0, 0.5, 0.5);
        assert!(cruising.is_constant_velocity());
        let err = solve(cruising, JointLimit::new(1.0, 0.0)).unwrap_err();
        assert!(matches!(err, SolverError::Unsupported(_)), "{:?}", err);
    }

    #[test]
    fn test_boundary_velocity_above_limit_is_infeasible() {
        let boundary = JointBoundary::new(0.0, 1.0, 0.5, 0.0);
        let err = solve(boundary, JointLimit::velocity(0.2)).unwrap_err();
        assert!(matches!(err, SolverError::Infeasible(_)));
    }

    #[test]
    fn test_bisection_reports_non_convergence() {
        let config = SmootherConfig {
            max_bracket_expansions: 2,
            ..Default::default()
        };
        let solver = SegmentTimeSolver::new(&config);
        let boundary = JointBoundary::new(0.0, 1000.0, 0.0, 0.0);
        // Rest-to-rest takes the closed form, so go through bisection directly.
        let err = solver.bisect(&boundary, 0.1, f64::INFINITY).unwrap_err();
        assert_eq!(err, SolverError::NoConvergence { iterations: 2 });
    }

    #[test]
    fn test_bisection_finds_minimum() {
        let config = SmootherConfig::default();
        let solver = SegmentTimeSolver::new(&config);
        let boundary = JointBoundary::new(0.0, 1.0, 0.0, 0.0);
        let t = solver.bisect(&boundary, 0.2, 0.1).unwrap();
        assert!((t - 60.0_f64.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_segment_duration_takes_slowest_joint() {
        let config = SmootherConfig::default();
        let solver = SegmentTimeSolver::new(&config);
        let boundaries = [
            JointBoundary::new(0.0, 1.0, 0.0, 0.0),
            JointBoundary::new(1.0, 2.0, 0.0, 0.0),
        ];
        let limits = [JointLimit::velocity(0.5), JointLimit::velocity(0.25)];
        let (t, joint) = solver.segment_duration(&boundaries, &limits, 0.01).unwrap();
        assert!((t - 6.0).abs() < 1e-12);
        assert_eq!(joint, Some(1));

        let (t, joint) = solver.segment_duration(&boundaries, &limits, 8.0).unwrap();
        assert_eq!(t, 8.0);
        assert_eq!(joint, None);

        let limits = [JointLimit::velocity(0.5), JointLimit::velocity(0.0)];
        let (joint, err) = solver.segment_duration(&boundaries, &limits, 0.01).unwrap_err();
        assert_eq!(joint, 1);
        assert!(matches!(err, SolverError::Infeasible(_)));
    }

    #[test]
    fn test_shared_duration_skips_acceleration_gap() {
        // Joint 1 (d = 1, v0 = 1, a_max = 0.5) has start acceleration
        // 6/T² - 4/T, which drops below -0.5 for 2 < T < 6. A requested
        // 3.5 s lands in that gap.
        let config = SmootherConfig::default();
        let solver = SegmentTimeSolver::new(&config);
        let boundaries = [
            JointBoundary::new(0.0, 0.0, 0.0, 0.0),
            JointBoundary::new(0.0, 1.0, 1.0, 0.0),
        ];
        let limits = [JointLimit::unbounded(), JointLimit::unbounded().with_acceleration(0.5)];
        let (t, joint) = solver.segment_duration(&boundaries, &limits, 3.5).unwrap();
        assert!((t - 6.0).abs() < 1e-9, "t = {}", t);
        assert_eq!(joint, Some(1));
        let poly = CubicPolynomial::hermite(&boundaries[1], t);
        assert!(poly.peak_acceleration(t) <= 0.5 * (1.0 + 1e-6), "t = {}", t);
    }

    #[test]
    fn test_bracket_search_reports_offending_joint() {
        // A negative slack rejects every exact candidate root, leaving only
        // the bracket search, which 1.0001x growth cannot finish in one step.
        let config = SmootherConfig {
            limit_tolerance: -1e-3,
            bracket_growth: 1.0001,
            max_bracket_expansions: 1,
            ..Default::default()
        };
        let solver = SegmentTimeSolver::new(&config);
        let boundaries = [
            JointBoundary::new(0.0, 0.0, 0.0, 0.0),
            JointBoundary::new(0.0, 1.0, 0.0, 0.0),
        ];
        let limits = [JointLimit::velocity(1.0), JointLimit::unbounded().with_acceleration(0.1)];
        let (joint, err) = solver.segment_duration(&boundaries, &limits, 0.01).unwrap_err();
        assert_eq!(joint, 1);
        assert_eq!(err, SolverError::NoConvergence { iterations: 1 });

        let config = SmootherConfig {
            max_bracket_expansions: 64,
            ..config
        };
        let solver = SegmentTimeSolver::new(&config);
        let (t, joint) = solver.segment_duration(&boundaries, &limits, 0.01).unwrap();
        assert_eq!(joint, Some(1));
        assert!(t > 60.0_f64.sqrt());
        let poly = CubicPolynomial::hermite(&boundaries[1], t);
        assert!(poly.peak_acceleration(t) <= 0.1 * (1.0 - 1e-3));
    }

    #[test]
    fn test_repeated_root_skipped() {
        // (x - 7.5)² scaled: only touches zero.
        assert!(positive_roots(0.16, -2.4, 9.0).is_empty());
        let roots = positive_roots(-0.08, 0.0, 9.0);
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 112.5_f64.sqrt()).abs() < 1e-9);
        assert_eq!(positive_roots(0.0, -3.0, 9.0), vec![3.0]);
    }
}
