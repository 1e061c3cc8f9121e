//! Every shipped scenario under `configs/` must load, build and step cleanly.

use sph1d_kernel::diagnostics::all_finite;
use sph1d_orchestrator::{create_simulation, RunnerState, SimulationConfig};

const SCENARIOS: [&str; 5] = [
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../configs/dam_break_wet.json"),
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../configs/dam_break_dry.json"),
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../configs/water_drop_cyclic.json"),
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../configs/kernel_bump.json"),
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../configs/tilting_basin.json"),
];

#[test]
fn shipped_scenarios_are_valid_and_bounded() {
    for path in SCENARIOS {
        let config = SimulationConfig::load(path).unwrap_or_else(|e| panic!("{path}: {e}"));
        assert!(config.has_stopping_condition(), "{path} would run forever");
    }
}

#[test]
fn shipped_scenarios_step_cleanly() {
    for path in SCENARIOS {
        let mut runner = create_simulation(path).unwrap_or_else(|e| panic!("{path}: {e}"));
        let state = runner.run_steps(50);
        assert_eq!(state, RunnerState::Running, "{path}: {:?}", runner.error_message());
        assert_eq!(runner.timestep_count(), 50, "{path}");
        assert_eq!(runner.failed_steps(), 0, "{path}");
        assert!(runner.sim_time() > 0.0, "{path}");

        let sim = runner.simulation();
        let boundary = sim.environment().boundary();
        assert!(all_finite(sim.particles()), "{path}: non-finite state");
        assert!(
            sim.particles().x.iter().all(|&x| boundary.contains(x)),
            "{path}: particle outside the domain"
        );
    }
}

#[test]
fn wet_dam_break_runs_to_its_end_time() {
    let mut runner = create_simulation(SCENARIOS[0]).unwrap();
    let summary = runner.run();
    assert_eq!(summary.state, RunnerState::Finished);
    assert_eq!(summary.failed_steps, 0);
    assert!((summary.sim_time - 0.5).abs() < 1e-9, "ended at {}", summary.sim_time);
    assert!((499..=501).contains(&summary.timestep_count));
}
