//! Simulation environment: particles plus everything needed to evaluate the
//! kernel-weighted fluid height and acceleration.
//!
//! An [`Environment`] is the unit the integrators mutate. Its derived state
//! (ghost particles, neighbor grid, accelerations) is refreshed by every public
//! setter, so a caller never observes stale ghosts. Integrators drive the
//! refresh phases themselves through the crate-private methods.

use crate::boundary::{Boundary, BoundaryType};
use crate::error::{require_positive, SimError};
use crate::ground::GroundProfile;
use crate::neighbor::NeighborGrid;
use crate::particle::ParticleArrays;
use crate::sph::{cubic_1d, d_cubic_1d, support_radius};

/// Particles, domain, ground and physical constants of one simulation state.
///
/// Cloning yields an independent environment with its own particle storage;
/// integrators use this for their prediction environments.
#[derive(Debug, Clone)]
pub struct Environment {
    particles: ParticleArrays,
    boundary: Boundary,
    ground: GroundProfile,
    /// Smoothing length h (m)
    smoothing_length: f64,
    /// Volume (area in 1D) carried by each particle
    particle_volume: f64,
    /// Gravitational acceleration g (m/s^2)
    gravity: f64,
    /// Elapsed simulated time (s)
    total_time: f64,
    grid: NeighborGrid,
}

impl Environment {
    /// Create an environment and compute initial ghosts and accelerations.
    ///
    /// # Arguments
    /// * `particles` - Initial particle state; the count is fixed from here on.
    /// * `boundary` - Domain extent and boundary kind.
    /// * `ground` - Bed profile.
    /// * `smoothing_length` - Kernel smoothing length h, positive.
    /// * `particle_volume` - Volume carried by each particle, positive.
    /// * `gravity` - Gravitational acceleration, positive.
    pub fn new(
        particles: ParticleArrays,
        boundary: Boundary,
        ground: GroundProfile,
        smoothing_length: f64,
        particle_volume: f64,
        gravity: f64,
    ) -> Result<Self, SimError> {
        check_smoothing_length(smoothing_length)?;
        require_positive("particle volume", particle_volume)?;
        require_positive("gravity", gravity)?;
        ground.validate()?;

        let grid = NeighborGrid::new(
            support_radius(smoothing_length),
            boundary.x_min(),
            boundary.x_max(),
        );
        let mut env = Self {
            particles,
            boundary,
            ground,
            smoothing_length,
            particle_volume,
            gravity,
            total_time: 0.0,
            grid,
        };
        env.refresh();
        Ok(env)
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// Current particle state.
    pub fn particles(&self) -> &ParticleArrays {
        &self.particles
    }

    /// Number of real particles.
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Domain and ghost particles.
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Active bed profile.
    pub fn ground(&self) -> &GroundProfile {
        &self.ground
    }

    /// Kernel smoothing length h.
    pub fn smoothing_length(&self) -> f64 {
        self.smoothing_length
    }

    /// Volume carried by each particle.
    pub fn particle_volume(&self) -> f64 {
        self.particle_volume
    }

    /// Gravitational acceleration.
    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Elapsed simulated time.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    // -----------------------------------------------------------------------
    // Field queries
    // -----------------------------------------------------------------------

    /// Reconstructed fluid height at `x`.
    ///
    /// ```text
    /// H(x) = V * sum_j W(x - x_j, h)
    /// ```
    ///
    /// The sum runs over real particles within the kernel support plus the
    /// ghost list of the edge `x` is close to.
    pub fn fluid_height(&self, x: f64) -> f64 {
        let h = self.smoothing_length;
        let mut sum = 0.0;
        self.for_each_source(x, |xj| sum += cubic_1d(x - xj, h));
        self.particle_volume * sum
    }

    /// Fluid acceleration at `x`.
    ///
    /// ```text
    /// acc(x) = g * V * sum_j dW(x_j - x, h) - g * db/dx(x, t)
    ///        = -g * d(H + b)/dx
    /// ```
    pub fn fluid_acc(&self, x: f64) -> f64 {
        let h = self.smoothing_length;
        let mut sum = 0.0;
        self.for_each_source(x, |xj| sum += d_cubic_1d(xj - x, h));
        self.gravity * (self.particle_volume * sum - self.ground_slope(x))
    }

    /// Bed height at `x` for the current time.
    pub fn ground_height(&self, x: f64) -> f64 {
        self.ground.height(x, self.total_time)
    }

    /// Bed slope at `x` for the current time.
    pub fn ground_slope(&self, x: f64) -> f64 {
        self.ground.slope(x, self.total_time)
    }

    /// Call `f` with the position of every real or ghost particle that may lie
    /// within the kernel support of `x`.
    #[inline]
    fn for_each_source<F: FnMut(f64)>(&self, x: f64, mut f: F) {
        let h = self.smoothing_length;
        let positions = &self.particles.x;
        self.grid
            .for_each_within(x, positions, support_radius(h), |j| f(positions[j]));
        for &g in self.boundary.ghosts_near(x, h) {
            f(g);
        }
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Change the smoothing length.
    ///
    /// An unchanged value is a no-op. A zero, negative or non-finite value is
    /// rejected and leaves the environment untouched.
    pub fn set_smoothing_length(&mut self, h: f64) -> Result<(), SimError> {
        if h == self.smoothing_length {
            return Ok(());
        }
        if let Err(err) = check_smoothing_length(h) {
            tracing::warn!("Rejected smoothing length {}", h);
            return Err(err);
        }
        self.smoothing_length = h;
        self.refresh();
        Ok(())
    }

    /// Switch the boundary kind, keeping the domain extent and particles.
    pub fn set_boundary_type(&mut self, kind: BoundaryType) {
        if kind == self.boundary.kind() {
            return;
        }
        self.boundary.set_kind(kind);
        self.refresh();
    }

    /// Replace the bed profile.
    pub fn set_ground(&mut self, ground: GroundProfile) -> Result<(), SimError> {
        ground.validate()?;
        self.ground = ground;
        self.refresh();
        Ok(())
    }

    /// Change gravitational acceleration.
    pub fn set_gravity(&mut self, gravity: f64) -> Result<(), SimError> {
        self.gravity = require_positive("gravity", gravity)?;
        self.refresh();
        Ok(())
    }

    /// Change the volume carried by each particle.
    pub fn set_particle_volume(&mut self, volume: f64) -> Result<(), SimError> {
        self.particle_volume = require_positive("particle volume", volume)?;
        self.refresh();
        Ok(())
    }

    /// Edit particle state in place, then rebuild ghosts and accelerations.
    ///
    /// The closure must not change the particle count.
    pub fn modify_particles<F: FnOnce(&mut ParticleArrays)>(&mut self, f: F) {
        let n = self.particles.len();
        f(&mut self.particles);
        debug_assert_eq!(n, self.particles.len(), "particle count changed");
        self.refresh();
    }

    /// Copy every configuration value from `other`, leaving particles and time
    /// alone. Derived state is rebuilt on the next [`Environment::update_boundary`].
    pub fn copy_config_from(&mut self, other: &Environment) {
        if self.boundary.kind() != other.boundary.kind() {
            self.boundary.set_kind(other.boundary.kind());
        }
        self.ground = other.ground;
        self.smoothing_length = other.smoothing_length;
        self.particle_volume = other.particle_volume;
        self.gravity = other.gravity;
    }

    // -----------------------------------------------------------------------
    // Integration phases
    // -----------------------------------------------------------------------

    /// Rebuild ghosts and the neighbor grid, then recompute accelerations.
    fn refresh(&mut self) {
        self.update_boundary();
        self.compute_accelerations();
    }

    /// Mutable particle access for integrators. Ghosts and grid are stale
    /// until [`Environment::update_boundary`] runs.
    pub(crate) fn particles_mut(&mut self) -> &mut ParticleArrays {
        &mut self.particles
    }

    /// Map every real particle back inside the domain.
    pub(crate) fn map_particles_inside(&mut self) {
        let ParticleArrays { x, vx, ax } = &mut self.particles;
        for ((x, vx), ax) in x.iter_mut().zip(vx.iter_mut()).zip(ax.iter_mut()) {
            self.boundary.map_inside(x, vx, ax);
        }
    }

    /// Rebuild ghost lists and the neighbor grid from current positions.
    pub(crate) fn update_boundary(&mut self) {
        let h = self.smoothing_length;
        self.boundary.update(&self.particles.x, h);
        let cell_size = support_radius(h);
        if self.grid.cell_size() != cell_size {
            self.grid = NeighborGrid::new(cell_size, self.boundary.x_min(), self.boundary.x_max());
        }
        self.grid.update(&self.particles.x);
    }

    pub(crate) fn advance_time(&mut self, dt: f64) {
        self.total_time += dt;
    }

    pub(crate) fn set_total_time(&mut self, t: f64) {
        self.total_time = t;
    }

    /// Overwrite particle state and time with those of `source`.
    ///
    /// Both environments must hold the same number of particles.
    pub(crate) fn load_state_from(&mut self, source: &Environment) {
        self.particles.x.copy_from_slice(&source.particles.x);
        self.particles.vx.copy_from_slice(&source.particles.vx);
        self.particles.ax.copy_from_slice(&source.particles.ax);
        self.total_time = source.total_time;
    }

    /// Write the fluid acceleration at every real particle into `ax`.
    pub(crate) fn compute_accelerations(&mut self) {
        let mut ax = std::mem::take(&mut self.particles.ax);
        self.accelerations_into(&mut ax);
        self.particles.ax = ax;
    }

    /// Evaluate the fluid acceleration at every real particle into `out`.
    ///
    /// Reads positions, ghosts and grid only.
    pub(crate) fn accelerations_into(&self, out: &mut Vec<f64>) {
        out.resize(self.particles.len(), 0.0);

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            out.par_iter_mut()
                .zip(self.particles.x.par_iter())
                .for_each(|(a, &x)| *a = self.fluid_acc(x));
        }

        #[cfg(not(feature = "parallel"))]
        {
            for (a, &x) in out.iter_mut().zip(self.particles.x.iter()) {
                *a = self.fluid_acc(x);
            }
        }
    }
}

fn check_smoothing_length(h: f64) -> Result<f64, SimError> {
    if h.is_finite() && h > 0.0 {
        Ok(h)
    } else {
        Err(SimError::InvalidSmoothingLength(h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(n: usize, x_min: f64, x_max: f64) -> Vec<f64> {
        let dx = (x_max - x_min) / n as f64;
        (0..n).map(|i| x_min + (i as f64 + 0.5) * dx).collect()
    }

    fn column(kind: BoundaryType, n: usize) -> Environment {
        let boundary = Boundary::new(kind, 0.0, 10.0).unwrap();
        let depth = 1.0;
        Environment::new(
            ParticleArrays::at_rest(uniform(n, 0.0, 10.0)),
            boundary,
            GroundProfile::default(),
            0.2,
            depth * 10.0 / n as f64,
            9.81,
        )
        .unwrap()
    }

    #[test]
    fn rejects_invalid_parameters() {
        let boundary = Boundary::new(BoundaryType::Solid, 0.0, 1.0).unwrap();
        let particles = ParticleArrays::at_rest(vec![0.5]);
        let make = |h, v, g| {
            Environment::new(
                particles.clone(),
                boundary.clone(),
                GroundProfile::default(),
                h,
                v,
                g,
            )
        };
        assert!(matches!(
            make(0.0, 1.0, 9.81),
            Err(SimError::InvalidSmoothingLength(_))
        ));
        assert!(make(0.1, -1.0, 9.81).is_err());
        assert!(make(0.1, 1.0, 0.0).is_err());
        assert!(make(0.1, 1.0, 9.81).is_ok());
    }

    #[test]
    fn uniform_column_has_flat_surface() {
        for kind in [BoundaryType::Solid, BoundaryType::Cyclic] {
            let env = column(kind, 200);
            for i in 0..=50 {
                let x = 0.2 * i as f64;
                let height = env.fluid_height(x);
                assert!(
                    (height - 1.0).abs() < 1.0e-3,
                    "{kind:?}: H({x}) = {height}"
                );
            }
        }
    }

    #[test]
    fn uniform_column_is_at_rest() {
        for kind in [BoundaryType::Solid, BoundaryType::Cyclic] {
            let env = column(kind, 200);
            for &a in &env.particles().ax {
                assert!(a.abs() < 1.0e-6, "{kind:?}: acceleration {a}");
            }
        }
    }

    #[test]
    fn surface_slope_drives_acceleration_downhill() {
        // Deeper on the left: water accelerates to the right.
        let boundary = Boundary::new(BoundaryType::Solid, 0.0, 10.0).unwrap();
        let mut x = uniform(100, 0.0, 5.0);
        x.extend(uniform(50, 5.0, 10.0));
        let env = Environment::new(
            ParticleArrays::at_rest(x),
            boundary,
            GroundProfile::default(),
            0.2,
            0.05,
            9.81,
        )
        .unwrap();
        assert!(env.fluid_acc(5.0) > 0.0);
        assert!(env.fluid_acc(2.5).abs() < 1.0e-6);
    }

    #[test]
    fn sloping_bed_adds_ground_term() {
        let mut env = column(BoundaryType::Cyclic, 200);
        env.set_ground(GroundProfile::Linear {
            slope: 0.1,
            offset: 0.0,
        })
        .unwrap();
        let a = env.fluid_acc(5.0);
        assert!((a + 0.981).abs() < 1.0e-6, "acc = {a}");
        assert_eq!(env.ground_height(5.0), 0.5);
        assert_eq!(env.ground_slope(5.0), 0.1);
    }

    #[test]
    fn smoothing_length_changes_rebuild_ghosts() {
        let mut env = column(BoundaryType::Solid, 200);
        let before = env.boundary().left_ghosts().len();
        env.set_smoothing_length(0.4).unwrap();
        assert_eq!(env.smoothing_length(), 0.4);
        assert!(env.boundary().left_ghosts().len() > before);
    }

    #[test]
    fn invalid_smoothing_length_is_rejected_without_change() {
        let mut env = column(BoundaryType::Solid, 50);
        assert_eq!(
            env.set_smoothing_length(-1.0),
            Err(SimError::InvalidSmoothingLength(-1.0))
        );
        assert!(env.set_smoothing_length(f64::NAN).is_err());
        assert_eq!(env.smoothing_length(), 0.2);
        assert!(env.set_smoothing_length(0.2).is_ok());
    }

    #[test]
    fn clone_owns_independent_particles() {
        let env = column(BoundaryType::Solid, 20);
        let mut copy = env.clone();
        copy.modify_particles(|p| p.x[0] = 0.3);
        assert_ne!(env.particles().x[0], copy.particles().x[0]);
        assert_eq!(copy.smoothing_length(), env.smoothing_length());
    }

    #[test]
    fn copy_config_keeps_particles() {
        let env = column(BoundaryType::Solid, 20);
        let mut other = column(BoundaryType::Cyclic, 20);
        other.set_gravity(1.62).unwrap();
        other.modify_particles(|p| p.vx[3] = 1.0);
        let mut target = env.clone();
        target.copy_config_from(&other);
        assert_eq!(target.boundary().kind(), BoundaryType::Cyclic);
        assert_eq!(target.gravity(), 1.62);
        assert_eq!(target.particles().vx[3], 0.0);
    }

    #[test]
    fn mapping_brings_particles_inside() {
        let mut env = column(BoundaryType::Cyclic, 20);
        env.particles_mut().x[0] = -0.1;
        env.particles_mut().x[19] = 10.2;
        env.map_particles_inside();
        assert!((env.particles().x[0] - 9.9).abs() < 1.0e-12);
        assert!((env.particles().x[19] - 0.2).abs() < 1.0e-12);
    }
}
