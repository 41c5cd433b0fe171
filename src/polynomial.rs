// src/polynomial.rs - Hermite cubic fit and evaluation
use serde::{Deserialize, Serialize};

use crate::waypoint::JointBoundary;

/// `p(t) = a0 + a1 t + a2 t² + a3 t³` on `[0, duration]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct CubicPolynomial {
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
    pub a3: f64,
}

impl CubicPolynomial {
    pub fn new(a0: f64, a1: f64, a2: f64, a3: f64) -> Self {
        Self { a0, a1, a2, a3 }
    }

    /// Fits the cubic matching boundary position and velocity at both ends.
    ///
    /// `duration` must be finite and positive.
    pub fn hermite(boundary: &JointBoundary, duration: f64) -> Self {
        let JointBoundary {
            start_position: x0,
            end_position: x1,
            start_velocity: v0,
            end_velocity: v1,
        } = *boundary;
        let t = duration;
        let t2 = t * t;
        Self {
            a0: x0,
            a1: v0,
            a2: (3.0 * (x1 - x0) - (2.0 * v0 + v1) * t) / t2,
            a3: (2.0 * (x0 - x1) + (v0 + v1) * t) / (t2 * t),
        }
    }

    pub fn position(&self, t: f64) -> f64 {
        self.a0 + t * (self.a1 + t * (self.a2 + t * self.a3))
    }

    pub fn velocity(&self, t: f64) -> f64 {
        self.a1 + t * (2.0 * self.a2 + t * 3.0 * self.a3)
    }

    pub fn acceleration(&self, t: f64) -> f64 {
        2.0 * self.a2 + 6.0 * self.a3 * t
    }

    /// Largest |p''| on `[0, duration]`. Acceleration is linear, so the
    /// endpoints bound it.
    pub fn peak_acceleration(&self, duration: f64) -> f64 {
        self.acceleration(0.0).abs().max(self.acceleration(duration).abs())
    }

    /// Largest |p'| on `[0, duration]`.
    pub fn peak_velocity(&self, duration: f64) -> f64 {
        let mut peak = self.velocity(0.0).abs().max(self.velocity(duration).abs());
        if self.a3 != 0.0 {
            let stationary = -self.a2 / (3.0 * self.a3);
            if stationary > 0.0 && stationary < duration {
                peak = peak.max((self.a1 - self.a2 * self.a2 / (3.0 * self.a3)).abs());
            }
        }
        peak
    }
}
