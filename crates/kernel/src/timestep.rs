//! Time-step selection.
//!
//! The adaptive modes bound the step by the time a signal needs to cross one
//! smoothing length, where the signal speed is the fastest particle plus the
//! shallow-water wave speed `c = sqrt(g h)`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::particle::ParticleArrays;

/// Courant factor of [`stable_time_step`] for moving particles.
pub const STABLE_FACTOR: f64 = 0.20;
/// Courant factor of [`stable_time_step`] when every particle is at rest.
pub const STABLE_FACTOR_AT_REST: f64 = 0.10;
/// Courant factor of [`fast_time_step`] for moving particles.
pub const FAST_FACTOR: f64 = 0.11;
/// Courant factor of [`fast_time_step`] when every particle is at rest.
pub const FAST_FACTOR_AT_REST: f64 = 0.055;
/// Weight of the particle speed in [`fast_time_step`].
pub const FAST_SPEED_WEIGHT: f64 = 0.2;

/// How the simulation chooses its step size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeSteppingMode {
    /// Always use the configured fixed step.
    Fixed,
    /// Conservative adaptive step.
    #[default]
    Stable,
    /// Larger adaptive step that discounts particle speed.
    Fast,
}

impl TimeSteppingMode {
    /// Canonical configuration name.
    pub fn name(self) -> &'static str {
        match self {
            TimeSteppingMode::Fixed => "FIXED",
            TimeSteppingMode::Stable => "STABLE",
            TimeSteppingMode::Fast => "FAST",
        }
    }
}

impl FromStr for TimeSteppingMode {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FIXED" => Ok(TimeSteppingMode::Fixed),
            "STABLE" => Ok(TimeSteppingMode::Stable),
            "FAST" => Ok(TimeSteppingMode::Fast),
            _ => Err(SimError::UnknownVariant {
                kind: "time stepping mode",
                value: s.to_string(),
                expected: "FIXED, STABLE, FAST",
            }),
        }
    }
}

/// Largest absolute particle speed, zero for an empty set.
pub fn max_speed(particles: &ParticleArrays) -> f64 {
    particles.vx.iter().fold(0.0_f64, |m, &v| m.max(v.abs()))
}

/// Shallow-water wave speed `sqrt(g h)`.
#[inline]
pub fn wave_speed(gravity: f64, h: f64) -> f64 {
    (gravity * h).sqrt()
}

/// Conservative adaptive step.
///
/// ```text
/// dt = 0.20 * h / (v_max + c)   if v_max > 0
/// dt = 0.10 * h / c             otherwise
/// ```
pub fn stable_time_step(particles: &ParticleArrays, h: f64, gravity: f64) -> f64 {
    let v_max = max_speed(particles);
    let c = wave_speed(gravity, h);
    if v_max == 0.0 {
        STABLE_FACTOR_AT_REST * h / c
    } else {
        STABLE_FACTOR * h / (v_max + c)
    }
}

/// Larger adaptive step.
///
/// ```text
/// dt = 0.11 * h / (0.2 v_max + c)   if v_max > 0
/// dt = 0.055 * h / c                otherwise
/// ```
pub fn fast_time_step(particles: &ParticleArrays, h: f64, gravity: f64) -> f64 {
    let v_max = max_speed(particles);
    let c = wave_speed(gravity, h);
    if v_max == 0.0 {
        FAST_FACTOR_AT_REST * h / c
    } else {
        FAST_FACTOR * h / (FAST_SPEED_WEIGHT * v_max + c)
    }
}

/// Step size for `mode`, before any limit or end-time clamp.
pub fn time_step(
    mode: TimeSteppingMode,
    particles: &ParticleArrays,
    h: f64,
    gravity: f64,
    fixed_dt: f64,
) -> f64 {
    match mode {
        TimeSteppingMode::Fixed => fixed_dt,
        TimeSteppingMode::Stable => stable_time_step(particles, h, gravity),
        TimeSteppingMode::Fast => fast_time_step(particles, h, gravity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const G: f64 = 9.81;

    fn with_speeds(speeds: &[f64]) -> ParticleArrays {
        let mut p = ParticleArrays::new();
        for (i, &v) in speeds.iter().enumerate() {
            p.push_particle(i as f64, v);
        }
        p
    }

    #[test]
    fn stable_at_rest() {
        let h = 0.1;
        let p = with_speeds(&[0.0, 0.0, 0.0]);
        let dt = stable_time_step(&p, h, G);
        let expected = 0.10 * h / (G * h).sqrt();
        assert!((dt - expected).abs() < 1.0e-15, "dt={dt}, expected={expected}");
    }

    #[test]
    fn stable_with_motion_uses_fastest_particle() {
        let h = 0.1;
        let p = with_speeds(&[0.5, -2.0, 1.0]);
        let dt = stable_time_step(&p, h, G);
        let expected = 0.20 * h / (2.0 + (G * h).sqrt());
        assert!((dt - expected).abs() < 1.0e-15, "dt={dt}, expected={expected}");
    }

    #[test]
    fn fast_mode_formulas() {
        let h = 0.2;
        let c = (G * h).sqrt();
        let rest = with_speeds(&[0.0, 0.0]);
        assert!((fast_time_step(&rest, h, G) - 0.055 * h / c).abs() < 1.0e-15);

        let moving = with_speeds(&[3.0, -1.0]);
        let expected = 0.11 * h / (0.2 * 3.0 + c);
        assert!((fast_time_step(&moving, h, G) - expected).abs() < 1.0e-15);
    }

    #[test]
    fn fast_is_not_smaller_than_stable_for_fast_flow() {
        let h = 0.1;
        let p = with_speeds(&[5.0]);
        assert!(fast_time_step(&p, h, G) > stable_time_step(&p, h, G));
    }

    #[test]
    fn dispatch_by_mode() {
        let p = with_speeds(&[1.0]);
        assert_eq!(time_step(TimeSteppingMode::Fixed, &p, 0.1, G, 0.004), 0.004);
        assert_eq!(
            time_step(TimeSteppingMode::Stable, &p, 0.1, G, 0.004),
            stable_time_step(&p, 0.1, G)
        );
        assert_eq!(
            time_step(TimeSteppingMode::Fast, &p, 0.1, G, 0.004),
            fast_time_step(&p, 0.1, G)
        );
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("fast".parse::<TimeSteppingMode>().unwrap(), TimeSteppingMode::Fast);
        assert_eq!(
            TimeSteppingMode::Fixed.name().parse::<TimeSteppingMode>().unwrap(),
            TimeSteppingMode::Fixed
        );
        assert!("adaptive".parse::<TimeSteppingMode>().is_err());
    }
}
