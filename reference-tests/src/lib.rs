//! Reference test framework for shallow-water SPH validation
//!
//! This crate runs scenario files to completion and validates the final state
//! against physical expectations and analytical dam-break solutions.

pub mod analytical;
pub mod suite;

#[cfg(test)]
mod tests;

use analytical::{DamBreakSolution, RitterSolution, StokerSolution};
use sph1d_kernel::diagnostics::{all_finite, fluid_volume, total_momentum, Diagnostics};
use sph1d_kernel::{GroundProfile, ParticleDistribution, Simulation};
use sph1d_orchestrator::{build_simulation, RunnerState, SimulationConfig, SimulationRunner};

/// Samples used for integrals over the domain
const DIAGNOSTIC_SAMPLES: usize = 4000;

/// Expected result criteria for a reference test
#[derive(Debug, Clone, Default)]
pub struct ExpectedResult {
    /// Particle position bounds validation
    pub position_bounds: Option<PositionBoundsCheck>,
    /// Every particle field must stay finite
    pub finite_state: bool,
    /// Fluid volume conservation
    pub conservation: Option<ConservationCheck>,
    /// Dam-break front position against Ritter's solution
    pub ritter_front: Option<RitterFrontCheck>,
    /// Height profile against an analytical dam-break solution
    pub profile: Option<ProfileCheck>,
    /// Net momentum of a mirror-symmetric setup
    pub symmetry: Option<SymmetryCheck>,
}

/// Check that particles remain within specified bounds
#[derive(Debug, Clone)]
pub struct PositionBoundsCheck {
    /// Minimum allowed position (m)
    pub min: f64,
    /// Maximum allowed position (m)
    pub max: f64,
}

/// Check that the integrated fluid height matches the configured volume
#[derive(Debug, Clone)]
pub struct ConservationCheck {
    /// Maximum allowed relative volume error (0.0 to 1.0)
    pub max_volume_error: f64,
}

/// Compare the leading particle with the Ritter wet/dry front
#[derive(Debug, Clone)]
pub struct RitterFrontCheck {
    /// Analytical solution for the configured dam
    pub solution: RitterSolution,
    /// Smallest accepted ratio of simulated to analytical front travel
    pub min_ratio: f64,
    /// Largest accepted ratio of simulated to analytical front travel
    pub max_ratio: f64,
}

/// Compare the SPH fluid height with an analytical profile
#[derive(Debug, Clone)]
pub struct ProfileCheck {
    /// Analytical solution for the configured dam
    pub solution: DamBreakSolution,
    /// Maximum mean absolute height error, relative to the upstream depth
    pub max_mean_error: f64,
    /// Upstream depth used for normalisation (m)
    pub reference_depth: f64,
}

/// Check that a symmetric setup keeps zero net momentum
#[derive(Debug, Clone)]
pub struct SymmetryCheck {
    /// Maximum |sum V v| relative to sum V |v|
    pub max_relative_momentum: f64,
}

/// Result of running a reference test
#[derive(Debug)]
pub struct TestResult {
    /// Test name
    pub name: String,
    /// Whether test passed
    pub passed: bool,
    /// Individual check results
    pub checks: Vec<CheckResult>,
    /// Conserved quantities at the end of the run
    pub diagnostics: Diagnostics,
    /// Number of timesteps executed
    pub timesteps: u64,
    /// Simulated time (seconds)
    pub sim_time: f64,
}

/// Result of an individual validation check
#[derive(Debug)]
pub struct CheckResult {
    /// Check name
    pub name: String,
    /// Whether check passed
    pub passed: bool,
    /// Detail message
    pub message: Option<String>,
}

impl CheckResult {
    fn pass(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: Some(message),
        }
    }

    fn fail(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: Some(message),
        }
    }
}

/// A reference test case
#[derive(Debug, Clone)]
pub struct ReferenceTest {
    /// Test name
    pub name: String,
    /// Path to configuration file
    pub config_path: String,
    /// Expected results to validate
    pub expected: ExpectedResult,
}

impl ReferenceTest {
    /// Run the scenario to its stopping condition and validate the final state
    pub fn run(&self) -> Result<TestResult, String> {
        tracing::info!("Running reference test: {}", self.name);

        let config = SimulationConfig::load(&self.config_path).map_err(|e| e.to_string())?;
        if !config.has_stopping_condition() {
            return Err(format!("{} has no stopping condition", self.config_path));
        }
        let simulation = build_simulation(&config).map_err(|e| e.to_string())?;
        tracing::info!(
            "Initialized: {} particles, h={}",
            simulation.particles().len(),
            simulation.environment().smoothing_length()
        );

        let mut runner = SimulationRunner::new(simulation, config.max_steps);
        let summary = runner.run();
        tracing::info!(
            "Simulation complete: {} steps, {:.6}s simulated",
            summary.timestep_count,
            summary.sim_time
        );

        let simulation = runner.simulation();
        let mut checks = vec![validate_run(&runner)];

        if let Some(ref bounds) = self.expected.position_bounds {
            checks.push(validate_position_bounds(simulation, bounds));
        }
        if self.expected.finite_state {
            checks.push(validate_finite(simulation));
        }
        if let Some(ref conservation) = self.expected.conservation {
            checks.push(validate_conservation(simulation, conservation, config.fluid_volume));
        }
        if let Some(ref front) = self.expected.ritter_front {
            checks.push(validate_ritter_front(simulation, front));
        }
        if let Some(ref profile) = self.expected.profile {
            checks.push(validate_profile(simulation, profile));
        }
        if let Some(ref symmetry) = self.expected.symmetry {
            checks.push(validate_symmetry(simulation, symmetry));
        }

        Ok(TestResult {
            name: self.name.clone(),
            passed: checks.iter().all(|c| c.passed),
            checks,
            diagnostics: Diagnostics::measure(simulation.environment(), DIAGNOSTIC_SAMPLES),
            timesteps: summary.timestep_count,
            sim_time: summary.sim_time,
        })
    }
}

/// Analytical solution for a dam-break scenario over a flat bed.
///
/// The dam sits at the domain centre. Depths follow from how the particle
/// distribution shares the fluid volume between the two halves.
pub fn dam_break_solution(config: &SimulationConfig) -> Option<DamBreakSolution> {
    if !matches!(config.ground, GroundProfile::Flat { height } if height == 0.0) {
        return None;
    }
    let half_width = 0.5 * config.domain_width();
    let dam_position = config.domain.min + half_width;
    let n = config.particle_number;
    let particle_volume = config.fluid_volume / n as f64;

    match config.particle_distribution {
        ParticleDistribution::DamBreakDry => Some(DamBreakSolution::Ritter(RitterSolution::new(
            dam_position,
            config.fluid_volume / half_width,
            config.gravity,
        ))),
        ParticleDistribution::DamBreakWet => {
            let upstream = (2 * n + 1) / 3;
            let h0 = upstream as f64 * particle_volume / half_width;
            let h1 = (n - upstream) as f64 * particle_volume / half_width;
            StokerSolution::new(dam_position, h0, h1, config.gravity)
                .ok()
                .map(DamBreakSolution::Stoker)
        }
        _ => None,
    }
}

/// The run itself must end by reaching its stopping condition
fn validate_run(runner: &SimulationRunner) -> CheckResult {
    match runner.state() {
        RunnerState::Finished if runner.failed_steps() == 0 => CheckResult::pass(
            "Run",
            format!("Finished after {} steps", runner.timestep_count()),
        ),
        state => CheckResult::fail(
            "Run",
            format!(
                "Ended in {:?} with {} failed steps{}",
                state,
                runner.failed_steps(),
                runner
                    .error_message()
                    .map(|m| format!(": {m}"))
                    .unwrap_or_default()
            ),
        ),
    }
}

/// Validate that particles remain within specified bounds
fn validate_position_bounds(simulation: &Simulation, bounds: &PositionBoundsCheck) -> CheckResult {
    let mut violations = 0;
    let mut max_violation = 0.0_f64;

    for &x in &simulation.particles().x {
        let violation = (bounds.min - x).max(x - bounds.max);
        if violation > 0.0 {
            violations += 1;
            max_violation = max_violation.max(violation);
        }
    }

    if violations == 0 {
        CheckResult::pass(
            "Position Bounds",
            format!("All particles in [{}, {}]", bounds.min, bounds.max),
        )
    } else {
        CheckResult::fail(
            "Position Bounds",
            format!(
                "{} particles out of bounds (max violation: {:.6} m)",
                violations, max_violation
            ),
        )
    }
}

fn validate_finite(simulation: &Simulation) -> CheckResult {
    if all_finite(simulation.particles()) {
        CheckResult::pass("Finite State", "All particle fields finite".to_string())
    } else {
        CheckResult::fail("Finite State", "Non-finite particle field".to_string())
    }
}

/// Validate volume conservation
fn validate_conservation(
    simulation: &Simulation,
    check: &ConservationCheck,
    expected_volume: f64,
) -> CheckResult {
    let volume = fluid_volume(simulation.environment(), DIAGNOSTIC_SAMPLES);
    let error = (volume - expected_volume).abs() / expected_volume;

    if error <= check.max_volume_error {
        CheckResult::pass(
            "Conservation",
            format!("Volume: {:.6} (error: {:.4}%)", volume, error * 100.0),
        )
    } else {
        CheckResult::fail(
            "Conservation",
            format!(
                "Volume: {:.6}, expected {:.6} (error: {:.4}%, limit: {:.4}%)",
                volume,
                expected_volume,
                error * 100.0,
                check.max_volume_error * 100.0
            ),
        )
    }
}

/// Compare the leading particle's travel with Ritter's 2 c0 t
fn validate_ritter_front(simulation: &Simulation, check: &RitterFrontCheck) -> CheckResult {
    let t = simulation.total_time();
    let dam = check.solution.dam_position;
    let expected = check.solution.front_position(t) - dam;
    let front = simulation
        .particles()
        .x
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    if expected <= 0.0 || !expected.is_finite() {
        return CheckResult::fail("Ritter Front", format!("No front travel at t = {t}"));
    }
    let ratio = (front - dam) / expected;
    let message = format!(
        "Front at {:.4} m, Ritter {:.4} m (ratio {:.3}, accepted {:.2}..{:.2})",
        front,
        dam + expected,
        ratio,
        check.min_ratio,
        check.max_ratio
    );
    if ratio >= check.min_ratio && ratio <= check.max_ratio {
        CheckResult::pass("Ritter Front", message)
    } else {
        CheckResult::fail("Ritter Front", message)
    }
}

/// Mean absolute error of H(x) against the analytical depth
fn validate_profile(simulation: &Simulation, check: &ProfileCheck) -> CheckResult {
    let env = simulation.environment();
    let t = simulation.total_time();
    let boundary = env.boundary();
    let dx = boundary.width() / DIAGNOSTIC_SAMPLES as f64;

    let total_error: f64 = (0..DIAGNOSTIC_SAMPLES)
        .map(|i| {
            let x = boundary.x_min() + (i as f64 + 0.5) * dx;
            (env.fluid_height(x) - check.solution.height_at(x, t)).abs()
        })
        .sum();
    let mean_error = total_error / DIAGNOSTIC_SAMPLES as f64 / check.reference_depth;

    let message = format!(
        "Mean height error: {:.3}% of upstream depth (limit: {:.3}%)",
        mean_error * 100.0,
        check.max_mean_error * 100.0
    );
    if mean_error <= check.max_mean_error {
        CheckResult::pass("Height Profile", message)
    } else {
        CheckResult::fail("Height Profile", message)
    }
}

fn validate_symmetry(simulation: &Simulation, check: &SymmetryCheck) -> CheckResult {
    let env = simulation.environment();
    let momentum = total_momentum(env);
    let scale: f64 =
        simulation.particles().vx.iter().map(|v| v.abs()).sum::<f64>() * env.particle_volume();
    let relative = if scale > 0.0 { momentum.abs() / scale } else { 0.0 };

    let message = format!("Net momentum {:.3e} (relative {:.3e})", momentum, relative);
    if relative <= check.max_relative_momentum {
        CheckResult::pass("Momentum Symmetry", message)
    } else {
        CheckResult::fail("Momentum Symmetry", message)
    }
}

impl TestResult {
    /// Print a summary of the test result
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(80));
        println!("Test: {}", self.name);
        println!("{}", "=".repeat(80));
        println!("Status: {}", if self.passed { "PASSED" } else { "FAILED" });
        println!("Timesteps: {}", self.timesteps);
        println!("Simulated time: {:.6} s", self.sim_time);
        println!("\nDiagnostics:");
        println!("  Fluid volume: {:.6}", self.diagnostics.fluid_volume);
        println!("  Momentum: {:.3e}", self.diagnostics.momentum);
        println!("  Total energy: {:.6}", self.diagnostics.total_energy());
        println!("  Max speed: {:.4} m/s", self.diagnostics.max_speed);
        println!("\nValidation Checks:");
        for check in &self.checks {
            let status = if check.passed { "PASS" } else { "FAIL" };
            print!("  [{}] {}", status, check.name);
            if let Some(ref msg) = check.message {
                print!(" - {}", msg);
            }
            println!();
        }
        println!("{}", "=".repeat(80));
    }
}

/// Load a config and derive the dam-break checks it supports
pub fn dam_break_expectations(
    config_path: &str,
    min_front_ratio: f64,
    max_front_ratio: f64,
    max_profile_error: f64,
) -> Result<ExpectedResult, String> {
    let config = SimulationConfig::load(config_path).map_err(|e| e.to_string())?;
    let solution = dam_break_solution(&config)
        .ok_or_else(|| format!("{config_path} is not a flat-bed dam break"))?;

    let reference_depth = match solution {
        DamBreakSolution::Ritter(s) => s.upstream_depth,
        DamBreakSolution::Stoker(s) => s.upstream_depth,
    };
    let ritter_front = match solution {
        DamBreakSolution::Ritter(solution) => Some(RitterFrontCheck {
            solution,
            min_ratio: min_front_ratio,
            max_ratio: max_front_ratio,
        }),
        DamBreakSolution::Stoker(_) => None,
    };

    Ok(ExpectedResult {
        position_bounds: Some(PositionBoundsCheck {
            min: config.domain.min,
            max: config.domain.max,
        }),
        finite_state: true,
        conservation: Some(ConservationCheck {
            max_volume_error: 1.0e-3,
        }),
        ritter_front,
        profile: Some(ProfileCheck {
            solution,
            max_mean_error: max_profile_error,
            reference_depth,
        }),
        symmetry: None,
    })
}
