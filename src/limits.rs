// src/limits.rs - Per-joint kinematic limits
use serde::{Deserialize, Serialize};

use crate::error::SolverError;

/// Velocity and acceleration bounds for one joint.
///
/// A missing bound leaves the joint unconstrained on that axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct JointLimit {
    #[serde(default)]
    pub max_velocity: Option<f64>,
    #[serde(default)]
    pub max_acceleration: Option<f64>,
}

impl JointLimit {
    pub fn new(max_velocity: f64, max_acceleration: f64) -> Self {
        Self {
            max_velocity: Some(max_velocity),
            max_acceleration: Some(max_acceleration),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn velocity(max_velocity: f64) -> Self {
        Self {
            max_velocity: Some(max_velocity),
            max_acceleration: None,
        }
    }

    pub fn with_acceleration(mut self, max_acceleration: f64) -> Self {
        self.max_acceleration = Some(max_acceleration);
        self
    }

    /// Velocity bound, `f64::INFINITY` when absent.
    pub fn velocity_bound(&self) -> f64 {
        self.max_velocity.unwrap_or(f64::INFINITY)
    }

    /// Acceleration bound, `f64::INFINITY` when absent.
    pub fn acceleration_bound(&self) -> f64 {
        self.max_acceleration.unwrap_or(f64::INFINITY)
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_velocity.is_none() && self.max_acceleration.is_none()
    }

    /// Rejects bounds that can never describe a magnitude.
    pub fn check(&self) -> Result<(), SolverError> {
        for (name, bound) in [
            ("velocity", self.max_velocity),
            ("acceleration", self.max_acceleration),
        ] {
            if let Some(value) = bound {
                if value.is_nan() || value < 0.0 {
                    return Err(SolverError::Infeasible(format!(
                        "max {} must be non-negative, got {}",
                        name, value
                    )));
                }
            }
        }
        Ok(())
    }
}
