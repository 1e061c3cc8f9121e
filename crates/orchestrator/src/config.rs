//! Scenario configuration parsing and validation

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sph1d_kernel::{
    BoundaryType, GroundProfile, IntegratorType, ParticleDistribution, SimError,
    SimulationSettings, TimeSteppingMode,
};
use thiserror::Error;

/// Errors raised while loading or validating a scenario
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The scenario file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The scenario file is not valid JSON for this schema
    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field holds a value the simulation cannot run with
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// The simulation core rejected a value
    #[error(transparent)]
    Simulation(#[from] SimError),
}

/// Main scenario configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Human-readable scenario name
    pub name: String,
    /// Simulated interval along the axis
    pub domain: DomainBounds,
    /// Number of particles
    #[serde(default = "default_particle_number")]
    pub particle_number: usize,
    /// Initial particle placement
    #[serde(default)]
    pub particle_distribution: ParticleDistribution,
    /// Boundary kind at both edges
    #[serde(default)]
    pub boundary_type: BoundaryType,
    /// Bed profile
    #[serde(default)]
    pub ground: GroundProfile,
    /// Kernel smoothing length (m)
    #[serde(default = "default_smoothing_length")]
    pub smoothing_length: f64,
    /// Total fluid volume (m^2 in 1D)
    #[serde(default = "default_fluid_volume")]
    pub fluid_volume: f64,
    /// Gravitational acceleration (m/s^2)
    #[serde(default = "default_gravity")]
    pub gravity: f64,
    /// Integration scheme
    #[serde(default)]
    pub integrator_type: IntegratorType,
    /// Step size selection
    #[serde(default)]
    pub time_stepping_mode: TimeSteppingMode,
    /// Step used in fixed mode (s)
    #[serde(default = "default_fixed_time_step")]
    pub fixed_time_step: f64,
    /// Upper bound on every step; zero or negative disables it (s)
    #[serde(default)]
    pub time_step_limit: f64,
    /// Stop after this much simulated time; zero or negative disables it (s)
    #[serde(default)]
    pub time_max: f64,
    /// Stop after this many steps
    #[serde(default)]
    pub max_steps: Option<u64>,
}

/// Domain interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainBounds {
    /// Left edge (m)
    pub min: f64,
    /// Right edge (m)
    pub max: f64,
}

// Default values
fn default_particle_number() -> usize {
    750
}

fn default_smoothing_length() -> f64 {
    0.1
}

fn default_fluid_volume() -> f64 {
    7.5
}

fn default_gravity() -> f64 {
    9.81
}

fn default_fixed_time_step() -> f64 {
    0.001
}

impl SimulationConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Check domain bounds
        if !(self.domain.min.is_finite() && self.domain.max.is_finite()) {
            return Err(invalid("Domain bounds must be finite"));
        }
        if self.domain.min >= self.domain.max {
            return Err(invalid("Domain min must be less than max"));
        }

        // Check particles
        if self.particle_number == 0 {
            return Err(invalid("particle_number must be at least 1"));
        }

        // Check smoothing length
        if !(self.smoothing_length.is_finite() && self.smoothing_length > 0.0) {
            return Err(SimError::InvalidSmoothingLength(self.smoothing_length).into());
        }
        // Left and right ghost regions must not overlap
        if 4.0 * self.smoothing_length >= self.domain_width() {
            return Err(invalid(
                "smoothing_length must be less than a quarter of the domain width",
            ));
        }

        // Check physical constants
        if !(self.fluid_volume.is_finite() && self.fluid_volume > 0.0) {
            return Err(invalid("fluid_volume must be positive"));
        }
        if !(self.gravity.is_finite() && self.gravity > 0.0) {
            return Err(invalid("gravity must be positive"));
        }

        // Check time stepping
        if !(self.fixed_time_step.is_finite() && self.fixed_time_step > 0.0) {
            return Err(invalid("fixed_time_step must be positive"));
        }
        if !self.time_step_limit.is_finite() {
            return Err(invalid("time_step_limit must be finite"));
        }
        if !self.time_max.is_finite() {
            return Err(invalid("time_max must be finite"));
        }

        // Check max_steps
        if let Some(max_steps) = self.max_steps {
            if max_steps == 0 {
                return Err(invalid("max_steps must be at least 1"));
            }
        }

        self.ground.validate()?;
        Ok(())
    }

    /// Domain width
    pub fn domain_width(&self) -> f64 {
        self.domain.max - self.domain.min
    }

    /// Whether the scenario ends on its own
    pub fn has_stopping_condition(&self) -> bool {
        self.max_steps.is_some() || self.time_max > 0.0
    }

    /// Settings for building a [`sph1d_kernel::Simulation`]
    pub fn to_settings(&self) -> SimulationSettings {
        SimulationSettings {
            x_min: self.domain.min,
            x_max: self.domain.max,
            particle_number: self.particle_number,
            particle_distribution: self.particle_distribution,
            boundary_type: self.boundary_type,
            ground: self.ground,
            smoothing_length: self.smoothing_length,
            fluid_volume: self.fluid_volume,
            gravity: self.gravity,
            integrator_type: self.integrator_type,
            time_stepping_mode: self.time_stepping_mode,
            fixed_time_step: self.fixed_time_step,
            time_step_limit: self.time_step_limit,
            time_max: self.time_max,
        }
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}
