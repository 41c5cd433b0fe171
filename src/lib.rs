//! # spline_smoother
//!
//! Time-parameterization of multi-joint waypoints into cubic spline
//! trajectories that respect per-joint velocity and acceleration limits.
//!
//! ```rust
//! use spline_smoother::{CubicTrajectory, JointLimit, TrajectoryParameterizer, Waypoint};
//!
//! let waypoints = vec![Waypoint::new(vec![0.0]), Waypoint::new(vec![1.0])];
//! let limits = [JointLimit::new(0.2, 0.1)];
//! let trajectory = CubicTrajectory::default().parameterize(&waypoints, &limits).unwrap();
//! assert!((trajectory.total_duration() - 60.0_f64.sqrt()).abs() < 1e-9);
//!
//! let end = trajectory.sample(&[trajectory.total_duration()]);
//! assert!((end[0].positions[0] - 1.0).abs() < 1e-9);
//! ```

pub mod config;
pub mod error;
pub mod limits;
pub mod polynomial;
pub mod solver;
pub mod trajectory;
pub mod waypoint;

pub use config::{load_config, Config, ConfigError, SmootherConfig};
pub use error::{SmootherError, SolverError};
pub use limits::JointLimit;
pub use polynomial::CubicPolynomial;
pub use solver::SegmentTimeSolver;
pub use trajectory::{
    CubicTrajectory, Segment, SplineTrajectory, TrajectoryParameterizer, MAX_UNIFORM_SAMPLES,
};
pub use waypoint::{JointBoundary, Waypoint};
