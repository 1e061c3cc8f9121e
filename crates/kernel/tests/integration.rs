//! Whole-simulation checks: determinism, zero-step idempotence, symmetry and
//! volume conservation for every integrator.

use sph1d_kernel::diagnostics::{all_finite, fluid_volume, total_momentum};
use sph1d_kernel::{
    BoundaryType, IntegratorType, ParticleDistribution, Simulation, SimulationSettings,
    TimeSteppingMode,
};

fn dam_break(integrator_type: IntegratorType, boundary_type: BoundaryType) -> SimulationSettings {
    SimulationSettings {
        particle_number: 750,
        particle_distribution: ParticleDistribution::DamBreakWet,
        boundary_type,
        integrator_type,
        time_stepping_mode: TimeSteppingMode::Fixed,
        fixed_time_step: 0.001,
        ..SimulationSettings::default()
    }
}

#[test]
fn heun_fast_dam_break_runs_to_expected_time() {
    let mut sim =
        Simulation::new(&dam_break(IntegratorType::HeunFast, BoundaryType::Solid)).unwrap();
    for _ in 0..100 {
        let dt = sim.update().unwrap();
        assert_eq!(dt, 0.001);
    }
    assert!(
        (sim.total_time() - 0.1).abs() < 1.0e-12,
        "total time {}",
        sim.total_time()
    );
    assert_eq!(sim.step_count(), 100);
    assert!(all_finite(sim.particles()), "non-finite particle state");
}

#[test]
fn identical_runs_are_bitwise_identical() {
    let settings = dam_break(IntegratorType::HeunStd, BoundaryType::Cyclic);
    let mut a = Simulation::new(&settings).unwrap();
    let mut b = Simulation::new(&settings).unwrap();
    for _ in 0..50 {
        a.update().unwrap();
        b.update().unwrap();
    }
    assert_eq!(a.particles(), b.particles());
    assert_eq!(a.total_time(), b.total_time());
}

#[test]
fn zero_step_leaves_fresh_state_untouched() {
    for kind in IntegratorType::ALL {
        for boundary in [BoundaryType::Solid, BoundaryType::Cyclic] {
            let mut sim = Simulation::new(&dam_break(kind, boundary)).unwrap();
            let before = sim.particles().clone();
            sim.integrate(0.0).unwrap();
            assert_eq!(sim.particles(), &before, "{kind:?}/{boundary:?}");
            assert_eq!(sim.total_time(), 0.0);
        }
    }
}

#[test]
fn zero_step_after_motion_keeps_positions_and_speeds() {
    for kind in IntegratorType::ALL {
        let mut sim = Simulation::new(&dam_break(kind, BoundaryType::Solid)).unwrap();
        for _ in 0..10 {
            sim.update().unwrap();
        }
        let x = sim.particles().x.clone();
        let vx = sim.particles().vx.clone();
        let t = sim.total_time();
        sim.integrate(0.0).unwrap();
        assert_eq!(sim.particles().x, x, "{kind:?}");
        assert_eq!(sim.particles().vx, vx, "{kind:?}");
        assert_eq!(sim.total_time(), t);
    }
}

#[test]
fn symmetric_column_keeps_zero_net_momentum() {
    for kind in [IntegratorType::HeunStd, IntegratorType::Euler] {
        let mut sim = Simulation::new(&SimulationSettings {
            particle_number: 400,
            particle_distribution: ParticleDistribution::WaterDrop,
            boundary_type: BoundaryType::Solid,
            integrator_type: kind,
            time_stepping_mode: TimeSteppingMode::Stable,
            ..SimulationSettings::default()
        })
        .unwrap();
        for _ in 0..100 {
            sim.update().unwrap();
        }
        let momentum = total_momentum(sim.environment());
        let scale: f64 = sim.particles().vx.iter().map(|v| v.abs()).sum::<f64>()
            * sim.environment().particle_volume();
        assert!(scale > 0.0, "{kind:?}: the drop never spread");
        assert!(
            momentum.abs() <= 1.0e-6 * scale,
            "{kind:?}: net momentum {momentum} against scale {scale}"
        );
    }
}

#[test]
fn still_uniform_column_stays_still() {
    for kind in IntegratorType::ALL {
        let mut sim = Simulation::new(&SimulationSettings {
            particle_number: 500,
            particle_distribution: ParticleDistribution::Uniform,
            integrator_type: kind,
            time_stepping_mode: TimeSteppingMode::Stable,
            ..SimulationSettings::default()
        })
        .unwrap();
        for _ in 0..100 {
            sim.update().unwrap();
        }
        let v_max = sim.particles().vx.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        assert!(v_max < 1.0e-8, "{kind:?}: max speed {v_max}");
    }
}

#[test]
fn fluid_volume_is_conserved() {
    for kind in IntegratorType::ALL {
        for boundary in [BoundaryType::Solid, BoundaryType::Cyclic] {
            let settings = SimulationSettings {
                time_stepping_mode: TimeSteppingMode::Stable,
                ..dam_break(kind, boundary)
            };
            let mut sim = Simulation::new(&settings).unwrap();
            for _ in 0..200 {
                sim.update().unwrap();
            }
            let volume = fluid_volume(sim.environment(), 4000);
            let expected = settings.fluid_volume;
            assert!(
                ((volume - expected) / expected).abs() < 1.0e-3,
                "{kind:?}/{boundary:?}: volume {volume}, expected {expected}"
            );
            assert!(all_finite(sim.particles()));
        }
    }
}

#[test]
fn particles_stay_inside_the_domain() {
    for kind in IntegratorType::ALL {
        let mut sim = Simulation::new(&SimulationSettings {
            particle_distribution: ParticleDistribution::DamBreakDry,
            integrator_type: kind,
            time_stepping_mode: TimeSteppingMode::Stable,
            ..SimulationSettings::default()
        })
        .unwrap();
        for _ in 0..300 {
            sim.update().unwrap();
        }
        let boundary = sim.environment().boundary();
        assert!(
            sim.particles().x.iter().all(|&x| boundary.contains(x)),
            "{kind:?}: particle escaped"
        );
    }
}
