// src/error.rs - Error types for trajectory parameterization
use thiserror::Error;

/// Failure of the per-joint duration search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("Infeasible limits: {0}")]
    Infeasible(String),
    #[error("Unsupported boundary conditions: {0}")]
    Unsupported(String),
    #[error("No feasible duration found after {iterations} bracket expansions")]
    NoConvergence { iterations: u32 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SmootherError {
    #[error("At least two waypoints are required, got {0}")]
    TooFewWaypoints(usize),
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("Invalid waypoint: {0}")]
    InvalidWaypoint(String),
    #[error("Segment {segment}, joint {joint}: {source}")]
    Segment {
        segment: usize,
        joint: usize,
        #[source]
        source: SolverError,
    },
}

impl SmootherError {
    /// True when the failure comes from limits that no duration can satisfy.
    pub fn is_infeasible(&self) -> bool {
        matches!(
            self,
            SmootherError::Segment {
                source: SolverError::Infeasible(_),
                ..
            }
        )
    }
}
