//! Top-level simulation: one environment driven by one integrator.

use crate::boundary::{Boundary, BoundaryType};
use crate::distribution::ParticleDistribution;
use crate::environment::Environment;
use crate::error::{require_positive, SimError};
use crate::ground::GroundProfile;
use crate::integrator::{Integrator, IntegratorType};
use crate::particle::ParticleArrays;
use crate::timestep::{time_step, TimeSteppingMode};

/// Everything needed to build a [`Simulation`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    /// Left domain edge (m)
    pub x_min: f64,
    /// Right domain edge (m)
    pub x_max: f64,
    /// Number of particles
    pub particle_number: usize,
    /// Initial particle placement
    pub particle_distribution: ParticleDistribution,
    /// Boundary kind at both edges
    pub boundary_type: BoundaryType,
    /// Bed profile
    pub ground: GroundProfile,
    /// Kernel smoothing length (m)
    pub smoothing_length: f64,
    /// Total fluid volume, shared evenly between particles
    pub fluid_volume: f64,
    /// Gravitational acceleration (m/s^2)
    pub gravity: f64,
    /// Integration scheme
    pub integrator_type: IntegratorType,
    /// Step size selection
    pub time_stepping_mode: TimeSteppingMode,
    /// Step used by [`TimeSteppingMode::Fixed`] (s)
    pub fixed_time_step: f64,
    /// Upper bound on any step; zero or negative disables it (s)
    pub time_step_limit: f64,
    /// Simulated time to stop at; zero or negative runs forever (s)
    pub time_max: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            x_min: 0.0,
            x_max: 10.0,
            particle_number: 750,
            particle_distribution: ParticleDistribution::DamBreakWet,
            boundary_type: BoundaryType::Solid,
            ground: GroundProfile::default(),
            smoothing_length: 0.1,
            fluid_volume: 7.5,
            gravity: 9.81,
            integrator_type: IntegratorType::HeunFast,
            time_stepping_mode: TimeSteppingMode::Stable,
            fixed_time_step: 0.001,
            time_step_limit: 0.0,
            time_max: 0.0,
        }
    }
}

/// A running shallow-water simulation.
///
/// The caller owns the driving loop: ask for [`Simulation::next_time_step`] if
/// needed, then call [`Simulation::update`].
#[derive(Debug)]
pub struct Simulation {
    env: Environment,
    integrator: Box<dyn Integrator>,
    time_stepping_mode: TimeSteppingMode,
    fixed_time_step: f64,
    time_step_limit: Option<f64>,
    time_max: Option<f64>,
    fluid_volume: f64,
    particle_distribution: ParticleDistribution,
    step_count: u64,
}

impl Simulation {
    /// Build the environment, place particles and construct the integrator.
    pub fn new(settings: &SimulationSettings) -> Result<Self, SimError> {
        let boundary = Boundary::new(settings.boundary_type, settings.x_min, settings.x_max)?;
        let fluid_volume = require_positive("fluid volume", settings.fluid_volume)?;
        let particles = place_particles(
            settings.particle_number,
            settings.particle_distribution,
            &boundary,
        )?;
        let particle_volume = fluid_volume / settings.particle_number as f64;
        let fixed_time_step = require_positive("fixed time step", settings.fixed_time_step)?;

        let env = Environment::new(
            particles,
            boundary,
            settings.ground,
            settings.smoothing_length,
            particle_volume,
            settings.gravity,
        )?;
        let integrator = settings.integrator_type.build(&env);

        tracing::info!(
            "Simulation created: {} particles, {:?} boundary on [{}, {}], {} integrator",
            env.particle_count(),
            env.boundary().kind(),
            settings.x_min,
            settings.x_max,
            integrator.kind().name()
        );

        Ok(Self {
            env,
            integrator,
            time_stepping_mode: settings.time_stepping_mode,
            fixed_time_step,
            time_step_limit: positive_or_none(settings.time_step_limit),
            time_max: positive_or_none(settings.time_max),
            fluid_volume,
            particle_distribution: settings.particle_distribution,
            step_count: 0,
        })
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    /// Step size the next [`Simulation::update`] will use.
    ///
    /// The mode's step, capped by the step limit, then capped so the elapsed
    /// time does not pass the end time. Never negative.
    pub fn next_time_step(&self) -> f64 {
        let particles = self.env.particles();
        let mut dt = time_step(
            self.time_stepping_mode,
            particles,
            self.env.smoothing_length(),
            self.env.gravity(),
            self.fixed_time_step,
        );
        if let Some(limit) = self.time_step_limit {
            dt = dt.min(limit);
        }
        if let Some(t_max) = self.time_max {
            dt = dt.min((t_max - self.env.total_time()).max(0.0));
        }
        dt
    }

    /// Advance by [`Simulation::next_time_step`] and return the step used.
    ///
    /// A failed step is logged and leaves the simulation unchanged and usable.
    pub fn update(&mut self) -> Result<f64, SimError> {
        let dt = self.next_time_step();
        self.integrate(dt)?;
        Ok(dt)
    }

    /// Advance by an explicit step.
    pub fn integrate(&mut self, dt: f64) -> Result<(), SimError> {
        if let Err(err) = self.integrator.integrate(&mut self.env, dt) {
            tracing::error!("Step {} aborted: {}", self.step_count, err);
            return Err(err);
        }
        self.step_count += 1;
        Ok(())
    }

    /// Whether the configured end time has been reached.
    pub fn is_finished(&self) -> bool {
        self.time_max.is_some_and(|t_max| self.env.total_time() >= t_max)
    }

    /// Completed steps since construction or the last particle reset.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The simulated environment.
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Current particle state.
    pub fn particles(&self) -> &ParticleArrays {
        self.env.particles()
    }

    /// Reconstructed fluid height at `x`.
    pub fn fluid_height(&self, x: f64) -> f64 {
        self.env.fluid_height(x)
    }

    /// Bed height at `x`.
    pub fn ground_height(&self, x: f64) -> f64 {
        self.env.ground_height(x)
    }

    /// Bed slope at `x`.
    pub fn ground_slope(&self, x: f64) -> f64 {
        self.env.ground_slope(x)
    }

    /// Elapsed simulated time.
    pub fn total_time(&self) -> f64 {
        self.env.total_time()
    }

    /// Active integration scheme.
    pub fn integrator_type(&self) -> IntegratorType {
        self.integrator.kind()
    }

    /// Active step-size mode.
    pub fn time_stepping_mode(&self) -> TimeSteppingMode {
        self.time_stepping_mode
    }

    /// Step used in fixed mode.
    pub fn fixed_time_step(&self) -> f64 {
        self.fixed_time_step
    }

    /// Step limit, if enabled.
    pub fn time_step_limit(&self) -> Option<f64> {
        self.time_step_limit
    }

    /// End time, if enabled.
    pub fn time_max(&self) -> Option<f64> {
        self.time_max
    }

    /// Total fluid volume.
    pub fn fluid_volume(&self) -> f64 {
        self.fluid_volume
    }

    /// Distribution the particles were last placed with.
    pub fn particle_distribution(&self) -> ParticleDistribution {
        self.particle_distribution
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Switch the integration scheme, keeping the particle state.
    pub fn set_integrator_type(&mut self, kind: IntegratorType) {
        if kind == self.integrator.kind() {
            return;
        }
        self.integrator = kind.build(&self.env);
        tracing::info!("Integrator set to {}", kind.name());
    }

    /// Switch the boundary kind, keeping the particle state.
    pub fn set_boundary_type(&mut self, kind: BoundaryType) {
        self.env.set_boundary_type(kind);
        self.integrator.set_boundary_type(kind);
        tracing::info!("Boundary set to {}", kind.name());
    }

    /// Change the smoothing length everywhere.
    pub fn set_smoothing_length(&mut self, h: f64) -> Result<(), SimError> {
        self.env.set_smoothing_length(h)?;
        self.integrator.set_smoothing_length(h)
    }

    /// Replace the bed profile.
    pub fn set_ground(&mut self, ground: GroundProfile) -> Result<(), SimError> {
        self.env.set_ground(ground)?;
        self.integrator.sync_config(&self.env);
        tracing::info!("Ground set to {}", ground.name());
        Ok(())
    }

    /// Change gravitational acceleration.
    pub fn set_gravity(&mut self, gravity: f64) -> Result<(), SimError> {
        self.env.set_gravity(gravity)?;
        self.integrator.sync_config(&self.env);
        Ok(())
    }

    /// Change the total fluid volume, rescaling every particle's share.
    pub fn set_fluid_volume(&mut self, volume: f64) -> Result<(), SimError> {
        let volume = require_positive("fluid volume", volume)?;
        let n = self.env.particle_count().max(1);
        self.env.set_particle_volume(volume / n as f64)?;
        self.integrator.sync_config(&self.env);
        self.fluid_volume = volume;
        Ok(())
    }

    /// Change the step-size mode.
    pub fn set_time_stepping_mode(&mut self, mode: TimeSteppingMode) {
        self.time_stepping_mode = mode;
    }

    /// Change the step used in fixed mode.
    pub fn set_fixed_time_step(&mut self, dt: f64) -> Result<(), SimError> {
        self.fixed_time_step = require_positive("fixed time step", dt)?;
        Ok(())
    }

    /// Cap every step; zero or negative disables the cap.
    pub fn set_time_step_limit(&mut self, limit: f64) {
        self.time_step_limit = positive_or_none(limit);
    }

    /// Stop at `t_max`; zero or negative runs forever.
    pub fn set_time_max(&mut self, t_max: f64) {
        self.time_max = positive_or_none(t_max);
    }

    /// Replace every particle, restarting time at zero.
    ///
    /// All other configuration is kept. The integrator is rebuilt so its
    /// prediction environments match the new particle count.
    pub fn reset_particles(
        &mut self,
        number: usize,
        distribution: ParticleDistribution,
    ) -> Result<(), SimError> {
        let particles = place_particles(number, distribution, self.env.boundary())?;
        let env = Environment::new(
            particles,
            Boundary::new(
                self.env.boundary().kind(),
                self.env.boundary().x_min(),
                self.env.boundary().x_max(),
            )?,
            *self.env.ground(),
            self.env.smoothing_length(),
            self.fluid_volume / number as f64,
            self.env.gravity(),
        )?;
        self.integrator = self.integrator.kind().build(&env);
        self.env = env;
        self.particle_distribution = distribution;
        self.step_count = 0;
        tracing::info!("Particles reset: {} placed {}", number, distribution.name());
        Ok(())
    }
}

fn place_particles(
    number: usize,
    distribution: ParticleDistribution,
    boundary: &Boundary,
) -> Result<ParticleArrays, SimError> {
    if number == 0 {
        return Err(SimError::InvalidParameter {
            name: "particle number",
            value: 0.0,
            reason: "must be at least one",
        });
    }
    Ok(ParticleArrays::at_rest(distribution.positions(
        number,
        boundary.x_min(),
        boundary.x_max(),
    )))
}

fn positive_or_none(value: f64) -> Option<f64> {
    (value > 0.0).then_some(value)
}
