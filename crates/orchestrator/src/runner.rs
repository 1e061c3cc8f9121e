//! Simulation runner with lifecycle management
//!
//! The `SimulationRunner` owns a [`Simulation`] and drives it synchronously on
//! the caller's thread, tracking lifecycle state and stopping conditions.

use std::time::Instant;

use sph1d_kernel::diagnostics::all_finite;
use sph1d_kernel::Simulation;

/// Steps between progress logs and finiteness checks
const PROGRESS_INTERVAL: u64 = 100;

/// Consecutive failed steps after which the runner gives up
const MAX_CONSECUTIVE_FAILURES: u32 = 10;

/// Runner state enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// Simulation created but not yet started
    Created,
    /// Simulation actively running
    Running,
    /// Simulation paused
    Paused,
    /// Simulation finished (reached stopping condition)
    Finished,
    /// Simulation encountered an error
    Error,
}

/// Totals reported when a run ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Final runner state
    pub state: RunnerState,
    /// Steps completed
    pub timestep_count: u64,
    /// Simulated time reached (seconds)
    pub sim_time: f64,
    /// Steps that failed and were skipped
    pub failed_steps: u64,
    /// Wall-clock duration of the run (seconds)
    pub wall_time: f64,
}

/// Drives a simulation until a stopping condition is met
#[derive(Debug)]
pub struct SimulationRunner {
    simulation: Simulation,
    state: RunnerState,
    max_steps: Option<u64>,
    failed_steps: u64,
    consecutive_failures: u32,
    error_message: Option<String>,
}

impl SimulationRunner {
    /// Create a new runner around `simulation`
    ///
    /// # Arguments
    /// * `simulation` - The simulation to drive
    /// * `max_steps` - Optional maximum number of timesteps; the simulation's
    ///   own end time applies as well
    pub fn new(simulation: Simulation, max_steps: Option<u64>) -> Self {
        Self {
            simulation,
            state: RunnerState::Created,
            max_steps,
            failed_steps: 0,
            consecutive_failures: 0,
            error_message: None,
        }
    }

    /// Get current runner state
    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Get current simulation time (seconds)
    pub fn sim_time(&self) -> f64 {
        self.simulation.total_time()
    }

    /// Get current timestep count
    pub fn timestep_count(&self) -> u64 {
        self.simulation.step_count()
    }

    /// Number of steps that failed so far
    pub fn failed_steps(&self) -> u64 {
        self.failed_steps
    }

    /// Get error message if state is Error
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// The driven simulation
    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Mutable access for configuration changes between steps
    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }

    /// Give the simulation back
    pub fn into_simulation(self) -> Simulation {
        self.simulation
    }

    /// Whether a run can end without outside intervention
    pub fn has_stopping_condition(&self) -> bool {
        self.max_steps.is_some() || self.simulation.time_max().is_some()
    }

    /// Start the simulation (transition from Created to Running)
    pub fn start(&mut self) {
        if self.state == RunnerState::Created {
            self.state = RunnerState::Running;
        }
    }

    /// Pause the simulation
    pub fn pause(&mut self) {
        if self.state == RunnerState::Running {
            self.state = RunnerState::Paused;
        }
    }

    /// Resume the simulation
    pub fn resume(&mut self) {
        if self.state == RunnerState::Paused {
            self.state = RunnerState::Running;
        }
    }

    /// Execute one timestep if running, then apply stopping conditions
    ///
    /// Returns the state after the step. A failed step is logged and counted;
    /// too many consecutive failures move the runner to `Error`.
    pub fn step(&mut self) -> RunnerState {
        if self.state != RunnerState::Running {
            return self.state;
        }

        match self.simulation.update() {
            Ok(dt) => {
                self.consecutive_failures = 0;
                let steps = self.simulation.step_count();
                if steps % PROGRESS_INTERVAL == 0 {
                    tracing::debug!(
                        "Step {}: sim_time={:.4}s, dt={:.6}s",
                        steps,
                        self.simulation.total_time(),
                        dt
                    );
                    if !all_finite(self.simulation.particles()) {
                        self.fail(format!("non-finite particle state at step {steps}"));
                        return self.state;
                    }
                }
            }
            Err(err) => {
                self.failed_steps += 1;
                self.consecutive_failures += 1;
                tracing::warn!("Step failed ({} so far): {}", self.failed_steps, err);
                if self.consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                    self.fail(format!(
                        "{} consecutive failed steps, last: {}",
                        self.consecutive_failures, err
                    ));
                    return self.state;
                }
            }
        }

        self.check_stopping_conditions();
        self.state
    }

    /// Run until a stopping condition is met or the runner fails
    ///
    /// Starts the runner if it was just created. Without any stopping
    /// condition the run would never end, so nothing is stepped.
    pub fn run(&mut self) -> RunSummary {
        let start_wall_time = Instant::now();
        self.start();

        if !self.has_stopping_condition() {
            tracing::warn!("No max_steps or time_max configured; refusing to run unbounded");
        } else {
            while self.step() == RunnerState::Running {}
        }

        let summary = self.summary(start_wall_time.elapsed().as_secs_f64());
        tracing::info!(
            "Simulation run ended ({:?}): {} timesteps, {:.4}s simulated, {} failed, {:.2}s wall time",
            summary.state,
            summary.timestep_count,
            summary.sim_time,
            summary.failed_steps,
            summary.wall_time
        );
        summary
    }

    /// Run at most `steps` timesteps, stopping early on any state change
    pub fn run_steps(&mut self, steps: u64) -> RunnerState {
        self.start();
        for _ in 0..steps {
            if self.step() != RunnerState::Running {
                break;
            }
        }
        self.state
    }

    fn summary(&self, wall_time: f64) -> RunSummary {
        RunSummary {
            state: self.state,
            timestep_count: self.timestep_count(),
            sim_time: self.sim_time(),
            failed_steps: self.failed_steps,
            wall_time,
        }
    }

    fn check_stopping_conditions(&mut self) {
        if let Some(max_steps) = self.max_steps {
            if self.simulation.step_count() >= max_steps {
                tracing::info!("Simulation finished: reached max_steps = {}", max_steps);
                self.state = RunnerState::Finished;
                return;
            }
        }

        if self.simulation.is_finished() {
            tracing::info!(
                "Simulation finished: reached time_max = {:.3}s",
                self.simulation.total_time()
            );
            self.state = RunnerState::Finished;
        }
    }

    fn fail(&mut self, message: String) {
        tracing::error!("Simulation stopped: {}", message);
        self.error_message = Some(message);
        self.state = RunnerState::Error;
    }
}
