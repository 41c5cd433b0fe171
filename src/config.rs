//! # Smoother Configuration
//!
//! Numeric tunables for the segment time solver. Every field has a default, so
//! an empty file (or an empty `[smoother]` table) is a valid configuration.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [smoother]
//! min_segment_duration = 0.005
//! duration_tolerance = 1e-7
//! max_bisection_iterations = 300
//! ```
//!
//! ## Example: Rust Usage
//!
//! ```rust
//! use spline_smoother::config::Config;
//! let config = Config::from_toml_str("[smoother]\nmin_segment_duration = 0.005").unwrap();
//! assert_eq!(config.smoother.min_segment_duration, 0.005);
//! assert!(config.smoother.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub smoother: SmootherConfig,
}

impl Config {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.smoother.validate()?;
        Ok(config)
    }
}

/// Solver and segment tunables.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SmootherConfig {
    /// Shortest duration any segment may have (s).
    #[serde(default = "default_min_segment_duration")]
    pub min_segment_duration: f64,
    /// Bisection stops once the bracket is narrower than this (s).
    #[serde(default = "default_duration_tolerance")]
    pub duration_tolerance: f64,
    /// Relative slack when comparing peak velocity/acceleration to a limit.
    #[serde(default = "default_limit_tolerance")]
    pub limit_tolerance: f64,
    #[serde(default = "default_max_bisection_iterations")]
    pub max_bisection_iterations: u32,
    #[serde(default = "default_max_bracket_expansions")]
    pub max_bracket_expansions: u32,
    /// Factor applied to the upper bracket while searching for a feasible duration.
    #[serde(default = "default_bracket_growth")]
    pub bracket_growth: f64,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            min_segment_duration: default_min_segment_duration(),
            duration_tolerance: default_duration_tolerance(),
            limit_tolerance: default_limit_tolerance(),
            max_bisection_iterations: default_max_bisection_iterations(),
            max_bracket_expansions: default_max_bracket_expansions(),
            bracket_growth: default_bracket_growth(),
        }
    }
}

impl SmootherConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("min_segment_duration", self.min_segment_duration),
            ("duration_tolerance", self.duration_tolerance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !(self.limit_tolerance.is_finite() && self.limit_tolerance >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "limit_tolerance must be non-negative, got {}",
                self.limit_tolerance
            )));
        }
        if !(self.bracket_growth.is_finite() && self.bracket_growth > 1.0) {
            return Err(ConfigError::Invalid(format!(
                "bracket_growth must be greater than 1, got {}",
                self.bracket_growth
            )));
        }
        if self.max_bisection_iterations == 0 || self.max_bracket_expansions == 0 {
            return Err(ConfigError::Invalid("iteration limits must be non-zero".to_string()));
        }
        Ok(())
    }
}

fn default_min_segment_duration() -> f64 { 0.01 }
fn default_duration_tolerance() -> f64 { 1e-6 }
fn default_limit_tolerance() -> f64 { 1e-9 }
fn default_max_bisection_iterations() -> u32 { 200 }
fn default_max_bracket_expansions() -> u32 { 64 }
fn default_bracket_growth() -> f64 { 2.0 }

/// Loads and validates a configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Config::from_toml_str(&content)
}
