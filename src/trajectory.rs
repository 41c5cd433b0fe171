// src/trajectory.rs - Cubic spline trajectory construction and sampling
use serde::Serialize;

use crate::config::{ConfigError, SmootherConfig};
use crate::error::SmootherError;
use crate::limits::JointLimit;
use crate::polynomial::CubicPolynomial;
use crate::solver::SegmentTimeSolver;
use crate::waypoint::{JointBoundary, Waypoint};

/// Upper bound on the number of intervals `sample_uniform` produces; a finer
/// `dt` is coarsened to `total_duration / MAX_UNIFORM_SAMPLES`.
pub const MAX_UNIFORM_SAMPLES: usize = 1_000_000;

/// Turns a waypoint list into a time-parameterized trajectory.
pub trait TrajectoryParameterizer {
    fn parameterize(
        &self,
        waypoints: &[Waypoint],
        limits: &[JointLimit],
    ) -> Result<SplineTrajectory, SmootherError>;
}

/// One consecutive waypoint pair: a shared duration and a cubic per joint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    duration: f64,
    joints: Vec<CubicPolynomial>,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn polynomials(&self) -> &[CubicPolynomial] {
        &self.joints
    }

    /// State of every joint at local time `t` (not clamped).
    pub fn state_at(&self, t: f64) -> Waypoint {
        Waypoint {
            positions: self.joints.iter().map(|p| p.position(t)).collect(),
            velocities: self.joints.iter().map(|p| p.velocity(t)).collect(),
            accelerations: self.joints.iter().map(|p| p.acceleration(t)).collect(),
            time_from_start: None,
        }
    }

    pub fn start_state(&self) -> Waypoint {
        self.state_at(0.0)
    }

    pub fn end_state(&self) -> Waypoint {
        self.state_at(self.duration)
    }
}

/// Piecewise cubic trajectory. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplineTrajectory {
    segments: Vec<Segment>,
    /// Start time of each segment; same length as `segments`.
    start_times: Vec<f64>,
    total_duration: f64,
}

impl SplineTrajectory {
    fn from_segments(segments: Vec<Segment>) -> Self {
        let mut start_times = Vec::with_capacity(segments.len());
        let mut elapsed = 0.0;
        for segment in &segments {
            start_times.push(elapsed);
            elapsed += segment.duration;
        }
        Self {
            segments,
            start_times,
            total_duration: elapsed,
        }
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn joint_count(&self) -> usize {
        self.segments.first().map_or(0, |s| s.joints.len())
    }

    fn clamp_time(&self, t: f64) -> f64 {
        if t.is_nan() {
            0.0
        } else {
            t.clamp(0.0, self.total_duration)
        }
    }

    /// Index of the segment that owns time `t` (after clamping).
    pub fn segment_index_at(&self, t: f64) -> usize {
        let t = self.clamp_time(t);
        self.start_times
            .partition_point(|&start| start <= t)
            .saturating_sub(1)
            .min(self.segments.len().saturating_sub(1))
    }

    /// Position, velocity and acceleration of every joint at time `t`.
    ///
    /// Times outside `[0, total_duration]` are clamped; the returned waypoint
    /// carries the clamped time.
    pub fn evaluate(&self, t: f64) -> Waypoint {
        let t = self.clamp_time(t);
        let index = self.segment_index_at(t);
        let segment = &self.segments[index];
        let local = (t - self.start_times[index]).clamp(0.0, segment.duration);
        let mut state = segment.state_at(local);
        state.time_from_start = Some(t);
        state
    }

    /// One waypoint per requested time, in the order given.
    pub fn sample(&self, times: &[f64]) -> Vec<Waypoint> {
        times.iter().map(|&t| self.evaluate(t)).collect()
    }

    /// Samples every `dt` seconds from 0, always ending with the final state.
    ///
    /// At most `MAX_UNIFORM_SAMPLES + 2` waypoints are returned.
    pub fn sample_uniform(&self, dt: f64) -> Vec<Waypoint> {
        self.sample(&self.uniform_times(dt))
    }

    fn uniform_times(&self, dt: f64) -> Vec<f64> {
        if !(dt.is_finite() && dt > 0.0) {
            return vec![0.0, self.total_duration];
        }
        let dt = dt.max(self.total_duration / MAX_UNIFORM_SAMPLES as f64);
        let steps = ((self.total_duration / dt).floor() as usize).min(MAX_UNIFORM_SAMPLES);
        let mut times: Vec<f64> = (0..=steps)
            .map(|i| i as f64 * dt)
            .filter(|&t| t < self.total_duration)
            .collect();
        times.push(self.total_duration);
        times
    }
}

/// Cubic (Hermite) spline parameterization under per-joint limits.
#[derive(Debug, Clone, Default)]
pub struct CubicTrajectory {
    config: SmootherConfig,
}

impl CubicTrajectory {
    pub fn new(config: SmootherConfig) -> Self {
        Self { config }
    }

    pub fn try_new(config: SmootherConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &SmootherConfig {
        &self.config
    }

    fn validate_input(
        waypoints: &[Waypoint],
        limits: &[JointLimit],
    ) -> Result<usize, SmootherError> {
        if waypoints.len() < 2 {
            return Err(SmootherError::TooFewWaypoints(waypoints.len()));
        }
        let joints = limits.len();
        if joints == 0 {
            return Err(SmootherError::ShapeMismatch("no joint limits supplied".to_string()));
        }
        for (index, waypoint) in waypoints.iter().enumerate() {
            waypoint.validate(index, joints)?;
        }
        for (index, pair) in waypoints.windows(2).enumerate() {
            if let (Some(t0), Some(t1)) = (pair[0].time_from_start, pair[1].time_from_start) {
                if t1 < t0 {
                    return Err(SmootherError::InvalidWaypoint(format!(
                        "time_from_start decreases from {} to {} between waypoints {} and {}",
                        t0,
                        t1,
                        index,
                        index + 1
                    )));
                }
            }
        }
        Ok(joints)
    }
}

impl TrajectoryParameterizer for CubicTrajectory {
    fn parameterize(
        &self,
        waypoints: &[Waypoint],
        limits: &[JointLimit],
    ) -> Result<SplineTrajectory, SmootherError> {
        let joints = Self::validate_input(waypoints, limits)?;
        let solver = SegmentTimeSolver::new(&self.config);

        // Every duration is solved before any segment is fitted, so a failure
        // never leaves a partial trajectory behind.
        let mut planned = Vec::with_capacity(waypoints.len() - 1);
        for (segment, pair) in waypoints.windows(2).enumerate() {
            let boundaries: Vec<JointBoundary> = (0..joints)
                .map(|j| JointBoundary::between(&pair[0], &pair[1], j))
                .collect();
            let requested = match (pair[0].time_from_start, pair[1].time_from_start) {
                (Some(t0), Some(t1)) => t1 - t0,
                _ => 0.0,
            };
            let at_least = requested.max(self.config.min_segment_duration);
            let (duration, limiting_joint) = solver
                .segment_duration(&boundaries, limits, at_least)
                .map_err(|(joint, source)| SmootherError::Segment { segment, joint, source })?;
            if limiting_joint.is_none() && requested > self.config.min_segment_duration {
                tracing::debug!(segment, requested, "using requested segment timing");
            }
            tracing::debug!(segment, duration, ?limiting_joint, "segment duration");
            planned.push((duration, boundaries));
        }

        let segments: Vec<Segment> = planned
            .into_iter()
            .map(|(duration, boundaries)| Segment {
                duration,
                joints: boundaries.iter().map(|b| CubicPolynomial::hermite(b, duration)).collect(),
            })
            .collect();

        let trajectory = SplineTrajectory::from_segments(segments);
        tracing::info!(
            segments = trajectory.segment_count(),
            total_duration = trajectory.total_duration(),
            "parameterized cubic trajectory"
        );
        Ok(trajectory)
    }
}
