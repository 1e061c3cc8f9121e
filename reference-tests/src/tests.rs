//! Reference test integration tests
//!
//! These tests run the full reference test suite via cargo test.

use crate::analytical::DamBreakSolution;
use crate::suite::{ritter_dam_break_test, stoker_dam_break_test, water_drop_symmetry_test};
use crate::{dam_break_solution, ReferenceTest};
use sph1d_orchestrator::SimulationConfig;

/// Resolve a path relative to the project root (one level up from this crate)
fn project_path(relative: &str) -> String {
    let manifest_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let project_root = manifest_dir.parent().unwrap_or(manifest_dir);
    project_root.join(relative).to_string_lossy().to_string()
}

fn run_and_report(test: ReferenceTest) {
    let result = test.run().expect("Test execution failed");
    result.print_summary();
    assert!(result.passed, "{} failed", result.name);
}

#[test]
fn test_ritter_dam_break() {
    run_and_report(ritter_dam_break_test(project_path("configs/dam_break_dry.json")).unwrap());
}

#[test]
fn test_stoker_dam_break() {
    run_and_report(stoker_dam_break_test(project_path("configs/dam_break_wet.json")).unwrap());
}

#[test]
fn test_water_drop_symmetry() {
    run_and_report(water_drop_symmetry_test(project_path("configs/water_drop_cyclic.json")));
}

#[test]
fn test_dam_break_solution_depths() {
    let wet = SimulationConfig::load(project_path("configs/dam_break_wet.json")).unwrap();
    match dam_break_solution(&wet) {
        Some(DamBreakSolution::Stoker(s)) => {
            assert!((s.dam_position - 5.0).abs() < 1e-12);
            assert!((s.upstream_depth - 1.0).abs() < 1e-12);
            assert!((s.downstream_depth - 0.5).abs() < 1e-12);
        }
        other => panic!("expected a Stoker solution, got {other:?}"),
    }

    let dry = SimulationConfig::load(project_path("configs/dam_break_dry.json")).unwrap();
    match dam_break_solution(&dry) {
        Some(DamBreakSolution::Ritter(s)) => {
            assert!((s.dam_position - 10.0).abs() < 1e-12);
            assert!((s.upstream_depth - 1.0).abs() < 1e-12);
        }
        other => panic!("expected a Ritter solution, got {other:?}"),
    }

    let drop = SimulationConfig::load(project_path("configs/water_drop_cyclic.json")).unwrap();
    assert!(dam_break_solution(&drop).is_none());
}

#[test]
fn test_missing_config_is_an_error() {
    let test = ReferenceTest {
        name: "missing".to_string(),
        config_path: project_path("configs/does_not_exist.json"),
        expected: Default::default(),
    };
    assert!(test.run().is_err());
}
