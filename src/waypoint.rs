// src/waypoint.rs - Multi-joint kinematic states
use serde::{Deserialize, Serialize};

use crate::error::SmootherError;

/// Full kinematic state of every joint at one point along a trajectory.
///
/// `velocities` and `accelerations` may be left empty, in which case every
/// joint is taken to be at rest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Waypoint {
    pub positions: Vec<f64>,
    #[serde(default)]
    pub velocities: Vec<f64>,
    #[serde(default)]
    pub accelerations: Vec<f64>,
    /// Requested arrival time, seconds from the start of the trajectory.
    #[serde(default)]
    pub time_from_start: Option<f64>,
}

impl Waypoint {
    /// A waypoint at rest at the given positions.
    pub fn new(positions: Vec<f64>) -> Self {
        Self {
            positions,
            ..Default::default()
        }
    }

    pub fn with_velocities(mut self, velocities: Vec<f64>) -> Self {
        self.velocities = velocities;
        self
    }

    pub fn with_accelerations(mut self, accelerations: Vec<f64>) -> Self {
        self.accelerations = accelerations;
        self
    }

    pub fn at_time(mut self, time_from_start: f64) -> Self {
        self.time_from_start = Some(time_from_start);
        self
    }

    pub fn joint_count(&self) -> usize {
        self.positions.len()
    }

    pub fn velocity(&self, joint: usize) -> f64 {
        self.velocities.get(joint).copied().unwrap_or(0.0)
    }

    pub fn acceleration(&self, joint: usize) -> f64 {
        self.accelerations.get(joint).copied().unwrap_or(0.0)
    }

    /// Checks array lengths against `joints` and rejects non-finite values.
    pub(crate) fn validate(&self, index: usize, joints: usize) -> Result<(), SmootherError> {
        if self.positions.len() != joints {
            return Err(SmootherError::ShapeMismatch(format!(
                "waypoint {} has {} positions, expected {}",
                index,
                self.positions.len(),
                joints
            )));
        }
        for (name, values) in [
            ("velocities", &self.velocities),
            ("accelerations", &self.accelerations),
        ] {
            if !values.is_empty() && values.len() != joints {
                return Err(SmootherError::ShapeMismatch(format!(
                    "waypoint {} has {} {}, expected {} or none",
                    index,
                    values.len(),
                    name,
                    joints
                )));
            }
        }
        let all_finite = self
            .positions
            .iter()
            .chain(&self.velocities)
            .chain(&self.accelerations)
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(SmootherError::InvalidWaypoint(format!(
                "waypoint {} contains a non-finite value",
                index
            )));
        }
        if let Some(t) = self.time_from_start {
            if !t.is_finite() {
                return Err(SmootherError::InvalidWaypoint(format!(
                    "waypoint {} has non-finite time_from_start {}",
                    index, t
                )));
            }
        }
        Ok(())
    }
}

/// Boundary values of one joint across a consecutive waypoint pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointBoundary {
    pub start_position: f64,
    pub end_position: f64,
    pub start_velocity: f64,
    pub end_velocity: f64,
}

impl JointBoundary {
    pub fn new(
        start_position: f64,
        end_position: f64,
        start_velocity: f64,
        end_velocity: f64,
    ) -> Self {
        Self {
            start_position,
            end_position,
            start_velocity,
            end_velocity,
        }
    }

    pub fn between(start: &Waypoint, end: &Waypoint, joint: usize) -> Self {
        Self::new(
            start.positions[joint],
            end.positions[joint],
            start.velocity(joint),
            end.velocity(joint),
        )
    }

    pub fn displacement(&self) -> f64 {
        self.end_position - self.start_position
    }

    /// No displacement and at rest on both ends.
    pub fn is_stationary(&self) -> bool {
        self.displacement() == 0.0 && self.start_velocity == 0.0 && self.end_velocity == 0.0
    }

    pub fn starts_and_ends_at_rest(&self) -> bool {
        self.start_velocity == 0.0 && self.end_velocity == 0.0
    }

    /// Equal non-zero boundary velocities pointing along the displacement, so
    /// the straight line `x0 + v t` joins both states at `T = Δx / v`.
    pub fn is_constant_velocity(&self) -> bool {
        let v = self.start_velocity;
        v != 0.0 && v == self.end_velocity && self.displacement() * v > 0.0
    }
}
