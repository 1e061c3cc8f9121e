//! Orchestration Layer
//!
//! This crate turns scenario files into running simulations:
//! - JSON scenario parsing and validation
//! - Simulation construction from a validated scenario
//! - Synchronous simulation runner with lifecycle management

#![warn(missing_docs)]

pub mod config;
pub mod runner;

pub use config::{ConfigError, DomainBounds, SimulationConfig};
pub use runner::{RunSummary, RunnerState, SimulationRunner};

use std::path::Path;

use sph1d_kernel::Simulation;

/// Create a complete simulation from a configuration file
///
/// This function performs the full simulation setup pipeline:
/// 1. Load and validate the configuration
/// 2. Place particles and build the simulation
/// 3. Wrap it in a SimulationRunner for lifecycle management
///
/// # Arguments
/// * `config_path` - Path to the JSON configuration file
///
/// # Returns
/// A `SimulationRunner` ready to be started, or an error if setup fails
///
/// # Example
/// ```no_run
/// use sph1d_orchestrator::create_simulation;
///
/// let mut runner = create_simulation("configs/dam_break_wet.json")?;
/// let summary = runner.run();
/// println!("{} steps", summary.timestep_count);
/// # Ok::<(), sph1d_orchestrator::ConfigError>(())
/// ```
pub fn create_simulation(config_path: impl AsRef<Path>) -> Result<SimulationRunner, ConfigError> {
    let config_path = config_path.as_ref();
    tracing::info!("Creating simulation from config: {}", config_path.display());

    let config = SimulationConfig::load(config_path)?;
    tracing::info!("Configuration loaded: {}", config.name);

    let simulation = build_simulation(&config)?;

    tracing::info!("Simulation ready to start");
    Ok(SimulationRunner::new(simulation, config.max_steps))
}

/// Build a simulation from a validated configuration
pub fn build_simulation(config: &SimulationConfig) -> Result<Simulation, ConfigError> {
    config.validate()?;
    tracing::info!(
        "Setting up {}: {} particles ({}) on [{}, {}], ground {}",
        config.name,
        config.particle_number,
        config.particle_distribution.name(),
        config.domain.min,
        config.domain.max,
        config.ground.name()
    );
    Ok(Simulation::new(&config.to_settings())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sph1d_kernel::{BoundaryType, IntegratorType};

    #[test]
    fn test_build_simulation_applies_config() {
        let config = SimulationConfig::from_json(
            r#"{
                "name": "cyclic",
                "domain": { "min": 0.0, "max": 4.0 },
                "particle_number": 120,
                "boundary_type": "CYCLIC",
                "integrator_type": "EULER",
                "fluid_volume": 2.0,
                "time_max": 0.25
            }"#,
        )
        .unwrap();

        let sim = build_simulation(&config).unwrap();
        assert_eq!(sim.particles().len(), 120);
        assert_eq!(sim.integrator_type(), IntegratorType::Euler);
        assert_eq!(sim.environment().boundary().kind(), BoundaryType::Cyclic);
        assert_eq!(sim.time_max(), Some(0.25));
        assert!((sim.environment().particle_volume() - 2.0 / 120.0).abs() < 1e-15);
    }

    #[test]
    fn test_build_simulation_rejects_invalid_config() {
        let mut config =
            SimulationConfig::from_json(r#"{ "name": "t", "domain": { "min": 0.0, "max": 1.0 } }"#)
                .unwrap();
        config.gravity = -1.0;
        assert!(matches!(
            build_simulation(&config),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_create_simulation_missing_file() {
        assert!(matches!(
            create_simulation("no/such/scenario.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
