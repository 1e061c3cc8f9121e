//! Time integrators.
//!
//! Every integrator advances an [`Environment`] by one step in the same phase
//! order:
//!
//! 1. evaluate accelerations,
//! 2. update speeds and positions,
//! 3. map every real particle back inside the domain,
//! 4. rebuild ghosts and the neighbor grid,
//! 5. advance the elapsed time.
//!
//! The Heun variants evaluate a second acceleration on a predicted state held
//! in prediction environments they own for their whole lifetime. A prediction
//! whose particle count differs from the real environment aborts the step
//! before anything is mutated.

use std::fmt::Debug;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::boundary::BoundaryType;
use crate::environment::Environment;
use crate::error::SimError;

// ---------------------------------------------------------------------------
// IntegratorType
// ---------------------------------------------------------------------------

/// Selectable integration scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntegratorType {
    /// Semi-implicit Euler with accelerations lagging one step.
    Euler,
    /// Heun's method averaging the accelerations at the start and at a
    /// position-only prediction.
    HeunStd,
    /// Average of the start state and two chained Euler sub-steps.
    HeunNaive,
    /// Single force evaluation at a position-only prediction.
    #[default]
    HeunFast,
}

impl IntegratorType {
    /// All schemes, in configuration order.
    pub const ALL: [IntegratorType; 4] = [
        IntegratorType::Euler,
        IntegratorType::HeunStd,
        IntegratorType::HeunNaive,
        IntegratorType::HeunFast,
    ];

    /// Canonical configuration name.
    pub fn name(self) -> &'static str {
        match self {
            IntegratorType::Euler => "EULER",
            IntegratorType::HeunStd => "HEUN_STD",
            IntegratorType::HeunNaive => "HEUN_NAIVE",
            IntegratorType::HeunFast => "HEUN_FAST",
        }
    }

    /// Number of acceleration evaluations per step.
    pub fn force_evaluations(self) -> usize {
        match self {
            IntegratorType::Euler | IntegratorType::HeunFast => 1,
            IntegratorType::HeunStd | IntegratorType::HeunNaive => 2,
        }
    }

    /// Construct the integrator, allocating its prediction environments as
    /// copies of `env`.
    pub fn build(self, env: &Environment) -> Box<dyn Integrator> {
        match self {
            IntegratorType::Euler => Box::new(Euler),
            IntegratorType::HeunStd => Box::new(HeunStd::new(env)),
            IntegratorType::HeunNaive => Box::new(HeunNaive::new(env)),
            IntegratorType::HeunFast => Box::new(HeunFast::new(env)),
        }
    }
}

impl FromStr for IntegratorType {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EULER" => Ok(IntegratorType::Euler),
            "HEUN_STD" => Ok(IntegratorType::HeunStd),
            "HEUN_NAIVE" => Ok(IntegratorType::HeunNaive),
            "HEUN_FAST" => Ok(IntegratorType::HeunFast),
            _ => Err(SimError::UnknownVariant {
                kind: "integrator type",
                value: s.to_string(),
                expected: "EULER, HEUN_STD, HEUN_NAIVE, HEUN_FAST",
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Integrator trait
// ---------------------------------------------------------------------------

/// A time integration strategy.
///
/// Configuration setters keep the prediction environments in step with the
/// real one; a [`crate::Simulation`] calls them whenever its configuration
/// changes.
pub trait Integrator: Send + Debug {
    /// Which scheme this is.
    fn kind(&self) -> IntegratorType;

    /// Advance `env` by `dt`.
    ///
    /// On error nothing in `env` has been modified.
    fn integrate(&mut self, env: &mut Environment, dt: f64) -> Result<(), SimError>;

    /// Prediction environments owned by this integrator.
    fn predictions_mut(&mut self) -> &mut [Environment];

    /// Switch the boundary kind of every prediction environment.
    fn set_boundary_type(&mut self, kind: BoundaryType) {
        for prediction in self.predictions_mut() {
            prediction.set_boundary_type(kind);
        }
    }

    /// Change the smoothing length of every prediction environment.
    fn set_smoothing_length(&mut self, h: f64) -> Result<(), SimError> {
        for prediction in self.predictions_mut() {
            prediction.set_smoothing_length(h)?;
        }
        Ok(())
    }

    /// Copy the whole configuration of `env` into every prediction environment.
    fn sync_config(&mut self, env: &Environment) {
        for prediction in self.predictions_mut() {
            prediction.copy_config_from(env);
        }
    }
}

fn check_particle_count(env: &Environment, prediction: &Environment) -> Result<(), SimError> {
    let expected = env.particle_count();
    let actual = prediction.particle_count();
    if expected == actual {
        Ok(())
    } else {
        Err(SimError::ParticleCountMismatch { expected, actual })
    }
}

/// Map, rebuild ghosts and advance time on the real environment.
fn finish_step(env: &mut Environment, dt: f64) {
    env.map_particles_inside();
    env.update_boundary();
    env.advance_time(dt);
}

/// Load `env` into `prediction`, drift positions by `v * dt`, map them and
/// evaluate the accelerations at the predicted positions into `acc`.
fn predict_positions(env: &Environment, prediction: &mut Environment, dt: f64, acc: &mut Vec<f64>) {
    prediction.load_state_from(env);
    let p = prediction.particles_mut();
    for (x, &v) in p.x.iter_mut().zip(p.vx.iter()) {
        *x += v * dt;
    }
    prediction.map_particles_inside();
    prediction.set_total_time(env.total_time() + dt);
    prediction.update_boundary();
    prediction.accelerations_into(acc);
}

// ---------------------------------------------------------------------------
// Euler
// ---------------------------------------------------------------------------

/// Semi-implicit Euler.
///
/// ```text
/// v += a * dt
/// x += v * dt
/// ```
///
/// The acceleration used is the one stored at the end of the previous step,
/// so the force lags one step behind the positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euler;

impl Integrator for Euler {
    fn kind(&self) -> IntegratorType {
        IntegratorType::Euler
    }

    fn integrate(&mut self, env: &mut Environment, dt: f64) -> Result<(), SimError> {
        let p = env.particles_mut();
        for ((x, v), &a) in p.x.iter_mut().zip(p.vx.iter_mut()).zip(p.ax.iter()) {
            *v += a * dt;
            *x += *v * dt;
        }
        finish_step(env, dt);
        env.compute_accelerations();
        Ok(())
    }

    fn predictions_mut(&mut self) -> &mut [Environment] {
        &mut []
    }
}

// ---------------------------------------------------------------------------
// Heun (standard)
// ---------------------------------------------------------------------------

/// Heun's method with a position-only predictor.
///
/// ```text
/// a0 = acc(x0, t)
/// x1 = map(x0 + v0 * dt)
/// a1 = acc(x1, t + dt)
/// a  = (a0 + a1) / 2
/// v  = v0 + a * dt
/// x  = x0 + v * dt
/// ```
#[derive(Debug, Clone)]
pub struct HeunStd {
    prediction: Environment,
    acc0: Vec<f64>,
    acc1: Vec<f64>,
}

impl HeunStd {
    /// Create the integrator with a prediction environment copied from `env`.
    pub fn new(env: &Environment) -> Self {
        Self {
            prediction: env.clone(),
            acc0: Vec::with_capacity(env.particle_count()),
            acc1: Vec::with_capacity(env.particle_count()),
        }
    }
}

impl Integrator for HeunStd {
    fn kind(&self) -> IntegratorType {
        IntegratorType::HeunStd
    }

    fn integrate(&mut self, env: &mut Environment, dt: f64) -> Result<(), SimError> {
        check_particle_count(env, &self.prediction)?;

        env.accelerations_into(&mut self.acc0);
        predict_positions(env, &mut self.prediction, dt, &mut self.acc1);

        let p = env.particles_mut();
        for i in 0..p.len() {
            let a = 0.5 * (self.acc0[i] + self.acc1[i]);
            p.vx[i] += a * dt;
            p.x[i] += p.vx[i] * dt;
            p.ax[i] = a;
        }
        finish_step(env, dt);
        Ok(())
    }

    fn predictions_mut(&mut self) -> &mut [Environment] {
        std::slice::from_mut(&mut self.prediction)
    }
}

// ---------------------------------------------------------------------------
// Heun (naive)
// ---------------------------------------------------------------------------

/// Average of the start state and two chained Euler sub-steps.
///
/// ```text
/// v1 = v0 + a0 * dt,  x1 = x0 + v1 * dt,  a1 = acc(x1, t + dt)
/// v2 = v1 + a1 * dt,  x2 = x1 + v2 * dt
/// x  = (x0 + x2) / 2, v = (v0 + v2) / 2
/// ```
///
/// The sub-step positions are not mapped through the boundary; only the final
/// averaged state is. Ghosts of the second prediction are not rebuilt since
/// nothing evaluates forces there.
#[derive(Debug, Clone)]
pub struct HeunNaive {
    predictions: [Environment; 2],
    acc0: Vec<f64>,
    acc1: Vec<f64>,
}

impl HeunNaive {
    /// Create the integrator with two prediction environments copied from `env`.
    pub fn new(env: &Environment) -> Self {
        Self {
            predictions: [env.clone(), env.clone()],
            acc0: Vec::with_capacity(env.particle_count()),
            acc1: Vec::with_capacity(env.particle_count()),
        }
    }
}

impl Integrator for HeunNaive {
    fn kind(&self) -> IntegratorType {
        IntegratorType::HeunNaive
    }

    fn integrate(&mut self, env: &mut Environment, dt: f64) -> Result<(), SimError> {
        for prediction in &self.predictions {
            check_particle_count(env, prediction)?;
        }
        let t = env.total_time();
        let [first, second] = &mut self.predictions;

        env.accelerations_into(&mut self.acc0);

        first.load_state_from(env);
        let p = first.particles_mut();
        for i in 0..p.len() {
            p.vx[i] += self.acc0[i] * dt;
            p.x[i] += p.vx[i] * dt;
            p.ax[i] = self.acc0[i];
        }
        first.set_total_time(t + dt);
        first.update_boundary();
        first.accelerations_into(&mut self.acc1);

        second.load_state_from(first);
        let p = second.particles_mut();
        for i in 0..p.len() {
            p.vx[i] += self.acc1[i] * dt;
            p.x[i] += p.vx[i] * dt;
            p.ax[i] = self.acc1[i];
        }
        second.set_total_time(t + 2.0 * dt);

        let end = second.particles();
        let p = env.particles_mut();
        for i in 0..p.len() {
            p.x[i] = 0.5 * (p.x[i] + end.x[i]);
            p.vx[i] = 0.5 * (p.vx[i] + end.vx[i]);
            p.ax[i] = 0.5 * (self.acc0[i] + self.acc1[i]);
        }
        finish_step(env, dt);
        Ok(())
    }

    fn predictions_mut(&mut self) -> &mut [Environment] {
        &mut self.predictions
    }
}

// ---------------------------------------------------------------------------
// Heun (fast)
// ---------------------------------------------------------------------------

/// One force evaluation at a position-only prediction.
///
/// ```text
/// x1 = map(x0 + v0 * dt)
/// a1 = acc(x1, t + dt)
/// v  = v0 + a1 * dt
/// x  = x0 + v * dt
/// ```
#[derive(Debug, Clone)]
pub struct HeunFast {
    prediction: Environment,
    acc1: Vec<f64>,
}

impl HeunFast {
    /// Create the integrator with a prediction environment copied from `env`.
    pub fn new(env: &Environment) -> Self {
        Self {
            prediction: env.clone(),
            acc1: Vec::with_capacity(env.particle_count()),
        }
    }
}

impl Integrator for HeunFast {
    fn kind(&self) -> IntegratorType {
        IntegratorType::HeunFast
    }

    fn integrate(&mut self, env: &mut Environment, dt: f64) -> Result<(), SimError> {
        check_particle_count(env, &self.prediction)?;

        predict_positions(env, &mut self.prediction, dt, &mut self.acc1);

        let p = env.particles_mut();
        for i in 0..p.len() {
            let a = self.acc1[i];
            p.vx[i] += a * dt;
            p.x[i] += p.vx[i] * dt;
            p.ax[i] = a;
        }
        finish_step(env, dt);
        Ok(())
    }

    fn predictions_mut(&mut self) -> &mut [Environment] {
        std::slice::from_mut(&mut self.prediction)
    }
}
