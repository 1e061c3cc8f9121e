//! Integral quantities of a simulation snapshot.
//!
//! Everything here is read-only. Volume and potential energy integrate the
//! reconstructed height over the domain with the midpoint rule; the remaining
//! quantities sum directly over particles.

use crate::boundary::BoundaryType;
use crate::environment::Environment;
use crate::particle::ParticleArrays;

pub use crate::timestep::max_speed;

/// Aggregate metrics for one environment snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
    /// Integral of the fluid height over the domain.
    pub fluid_volume: f64,
    /// Sum of `V * v` over particles.
    pub momentum: f64,
    /// Sum of `V * v^2 / 2` over particles.
    pub kinetic_energy: f64,
    /// Integral of `g * ((H + b)^2 - b^2) / 2` over the domain.
    pub potential_energy: f64,
    /// Largest absolute particle speed.
    pub max_speed: f64,
}

impl Diagnostics {
    /// Measure `env`, integrating fields with `samples` midpoint cells.
    pub fn measure(env: &Environment, samples: usize) -> Self {
        Self {
            fluid_volume: fluid_volume(env, samples),
            momentum: total_momentum(env),
            kinetic_energy: kinetic_energy(env),
            potential_energy: potential_energy(env, samples),
            max_speed: max_speed(env.particles()),
        }
    }

    /// Total mechanical energy.
    pub fn total_energy(&self) -> f64 {
        self.kinetic_energy + self.potential_energy
    }
}

/// Midpoint sample positions and cell width over the domain of `env`.
fn midpoints(env: &Environment, samples: usize) -> (impl Iterator<Item = f64>, f64) {
    let samples = samples.max(1);
    let x_min = env.boundary().x_min();
    let dx = env.boundary().width() / samples as f64;
    ((0..samples).map(move |i| x_min + (i as f64 + 0.5) * dx), dx)
}

/// Integral of the fluid height over the domain.
///
/// Ghosts keep the reconstructed height complete up to the edges, so this
/// matches the configured fluid volume up to discretisation error.
pub fn fluid_volume(env: &Environment, samples: usize) -> f64 {
    let (xs, dx) = midpoints(env, samples);
    xs.map(|x| env.fluid_height(x)).sum::<f64>() * dx
}

/// Net momentum per unit density.
pub fn total_momentum(env: &Environment) -> f64 {
    env.particle_volume() * env.particles().vx.iter().sum::<f64>()
}

/// Kinetic energy per unit density.
pub fn kinetic_energy(env: &Environment) -> f64 {
    0.5 * env.particle_volume() * env.particles().vx.iter().map(|v| v * v).sum::<f64>()
}

/// Gravitational potential energy of the water column per unit density.
pub fn potential_energy(env: &Environment, samples: usize) -> f64 {
    let g = env.gravity();
    let (xs, dx) = midpoints(env, samples);
    xs.map(|x| {
        let b = env.ground_height(x);
        let s = b + env.fluid_height(x);
        0.5 * g * (s * s - b * b)
    })
    .sum::<f64>()
        * dx
}

/// Whether every position, speed and acceleration is finite.
pub fn all_finite(particles: &ParticleArrays) -> bool {
    particles
        .x
        .iter()
        .chain(&particles.vx)
        .chain(&particles.ax)
        .all(|v| v.is_finite())
}

/// `(x, fluid height, ground height)` at `samples` evenly spaced positions
/// including both edges, as a renderer draws them.
pub fn height_profile(env: &Environment, samples: usize) -> Vec<(f64, f64, f64)> {
    let samples = samples.max(2);
    let x_min = env.boundary().x_min();
    let dx = env.boundary().width() / (samples - 1) as f64;
    (0..samples)
        .map(|i| {
            let x = x_min + i as f64 * dx;
            (x, env.fluid_height(x), env.ground_height(x))
        })
        .collect()
}

/// Smallest separation between neighbouring particles.
///
/// On a cyclic domain the last and first particle are neighbours across the
/// wrap. Returns `None` with fewer than two particles.
pub fn min_particle_spacing(env: &Environment) -> Option<f64> {
    let mut x = env.particles().x.clone();
    if x.len() < 2 {
        return None;
    }
    x.sort_by(f64::total_cmp);
    let boundary = env.boundary();
    let mut min = x
        .windows(2)
        .map(|w| boundary.distance(w[0], w[1]))
        .fold(f64::INFINITY, f64::min);
    if boundary.kind() == BoundaryType::Cyclic {
        if let (Some(&first), Some(&last)) = (x.first(), x.last()) {
            min = min.min(boundary.distance(first, last));
        }
    }
    Some(min)
}
