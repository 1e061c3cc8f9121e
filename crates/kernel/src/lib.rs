//! 1D Shallow-Water SPH Simulation Core
//!
//! This crate simulates shallow-water flow along one axis with Smoothed
//! Particle Hydrodynamics. Particles carry equal shares of the fluid volume;
//! the fluid height anywhere is the kernel-weighted particle density and each
//! particle accelerates down the gradient of the free surface.
//!
//! # Modules
//! - [`sph`] -- Cubic spline smoothing kernel and its derivative.
//! - [`particle`] -- Struct-of-arrays particle storage.
//! - [`ground`] -- Static and time-varying bed profiles.
//! - [`boundary`] -- Solid and cyclic domain edges with ghost particles.
//! - [`neighbor`] -- Uniform-grid bucketing for kernel-support lookups.
//! - [`environment`] -- Particles plus field queries; the unit integrators mutate.
//! - [`timestep`] -- Fixed and adaptive step-size selection.
//! - [`integrator`] -- Euler and three Heun variants.
//! - [`simulation`] -- One environment driven by one integrator.
//! - [`distribution`] -- Initial particle placements.
//! - [`diagnostics`] -- Volume, momentum and energy of a snapshot.
//! - [`error`] -- Error type shared by all modules.
//!
//! # Example
//! ```
//! use sph1d_kernel::{Simulation, SimulationSettings};
//!
//! let mut sim = Simulation::new(&SimulationSettings::default()).unwrap();
//! for _ in 0..10 {
//!     sim.update().unwrap();
//! }
//! assert!(sim.total_time() > 0.0);
//! ```

#![warn(missing_docs)]

pub mod boundary;
pub mod diagnostics;
pub mod distribution;
pub mod environment;
pub mod error;
pub mod ground;
pub mod integrator;
pub mod neighbor;
pub mod particle;
pub mod simulation;
pub mod sph;
pub mod timestep;

pub use boundary::{cyclic_distance, Boundary, BoundaryType};
pub use diagnostics::Diagnostics;
pub use distribution::ParticleDistribution;
pub use environment::Environment;
pub use error::SimError;
pub use ground::GroundProfile;
pub use integrator::{Euler, HeunFast, HeunNaive, HeunStd, Integrator, IntegratorType};
pub use neighbor::NeighborGrid;
pub use particle::ParticleArrays;
pub use simulation::{Simulation, SimulationSettings};
pub use sph::{cubic_1d, d_cubic_1d, support_radius};
pub use timestep::TimeSteppingMode;
