//! Ground (bathymetry) profiles.
//!
//! A ground profile is a stateless function of position and time returning
//! the bed height `b(x, t)` and its slope `db/dx`. Every variant implements
//! the slope as the analytic derivative of its height; the integrators rely on
//! this when computing the bed contribution `-g * db/dx` to the acceleration.

use std::f64::consts::PI;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{require_finite, require_positive, SimError};
use crate::sph::{cubic_1d, d_cubic_1d};

/// Closed set of ground profiles.
///
/// Time-dependent variants are periodic in `t` with the given `period` (s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GroundProfile {
    /// Constant bed height.
    Flat {
        /// Bed height (m)
        height: f64,
    },
    /// Static inclined plane `b = offset + slope * x`.
    Linear {
        /// Bed slope (dimensionless)
        slope: f64,
        /// Bed height at x = 0 (m)
        offset: f64,
    },
    /// Static sinusoidal bed `b = offset + A sin(2 pi x / wavelength)`.
    Sine {
        /// Amplitude A (m)
        amplitude: f64,
        /// Wavelength (m)
        wavelength: f64,
        /// Mean bed height (m)
        offset: f64,
    },
    /// Plane tilting about `pivot` with slope `max_slope * sin(2 pi t / period)`.
    TiltingLinear {
        /// Peak slope (dimensionless)
        max_slope: f64,
        /// Oscillation period (s)
        period: f64,
        /// Position the plane rotates about (m)
        pivot: f64,
    },
    /// Cubic-kernel shaped bump at `center` whose peak height rises and falls
    /// as `amplitude * (1 - cos(2 pi t / period)) / 2`.
    KernelBump {
        /// Peak bump height (m)
        amplitude: f64,
        /// Kernel smoothing length of the bump; the bump spans 4 * width (m)
        width: f64,
        /// Bump center (m)
        center: f64,
        /// Rise-and-fall period (s)
        period: f64,
    },
    /// Standing sine bed `b = offset + A sin(2 pi x / wavelength) sin(2 pi t / period)`.
    DoubleSine {
        /// Amplitude A (m)
        amplitude: f64,
        /// Wavelength (m)
        wavelength: f64,
        /// Oscillation period (s)
        period: f64,
        /// Mean bed height (m)
        offset: f64,
    },
}

impl Default for GroundProfile {
    fn default() -> Self {
        GroundProfile::Flat { height: 0.0 }
    }
}

impl GroundProfile {
    /// Preset names accepted by [`GroundProfile::from_str`].
    pub const PRESET_NAMES: &'static str =
        "flat, linear, sine, tilting-linear, kernel-bump, double-sine";

    /// Bed height `b(x, t)`.
    pub fn height(&self, x: f64, t: f64) -> f64 {
        match *self {
            GroundProfile::Flat { height } => height,
            GroundProfile::Linear { slope, offset } => offset + slope * x,
            GroundProfile::Sine {
                amplitude,
                wavelength,
                offset,
            } => offset + amplitude * (wavenumber(wavelength) * x).sin(),
            GroundProfile::TiltingLinear {
                max_slope,
                period,
                pivot,
            } => max_slope * phase(t, period).sin() * (x - pivot),
            GroundProfile::KernelBump {
                amplitude,
                width,
                center,
                period,
            } => bump_scale(amplitude, width, t, period) * cubic_1d(x - center, width),
            GroundProfile::DoubleSine {
                amplitude,
                wavelength,
                period,
                offset,
            } => {
                offset
                    + amplitude
                        * (wavenumber(wavelength) * x).sin()
                        * phase(t, period).sin()
            }
        }
    }

    /// Bed slope `db/dx (x, t)`.
    pub fn slope(&self, x: f64, t: f64) -> f64 {
        match *self {
            GroundProfile::Flat { .. } => 0.0,
            GroundProfile::Linear { slope, .. } => slope,
            GroundProfile::Sine {
                amplitude,
                wavelength,
                ..
            } => {
                let k = wavenumber(wavelength);
                amplitude * k * (k * x).cos()
            }
            GroundProfile::TiltingLinear {
                max_slope, period, ..
            } => max_slope * phase(t, period).sin(),
            GroundProfile::KernelBump {
                amplitude,
                width,
                center,
                period,
            } => bump_scale(amplitude, width, t, period) * d_cubic_1d(x - center, width),
            GroundProfile::DoubleSine {
                amplitude,
                wavelength,
                period,
                ..
            } => {
                let k = wavenumber(wavelength);
                amplitude * k * (k * x).cos() * phase(t, period).sin()
            }
        }
    }

    /// Whether height or slope depends on time.
    pub fn is_time_dependent(&self) -> bool {
        matches!(
            self,
            GroundProfile::TiltingLinear { .. }
                | GroundProfile::KernelBump { .. }
                | GroundProfile::DoubleSine { .. }
        )
    }

    /// Preset name of this variant.
    pub fn name(&self) -> &'static str {
        match self {
            GroundProfile::Flat { .. } => "flat",
            GroundProfile::Linear { .. } => "linear",
            GroundProfile::Sine { .. } => "sine",
            GroundProfile::TiltingLinear { .. } => "tilting-linear",
            GroundProfile::KernelBump { .. } => "kernel-bump",
            GroundProfile::DoubleSine { .. } => "double-sine",
        }
    }

    /// Check every parameter is finite and lengths/periods are positive.
    pub fn validate(&self) -> Result<(), SimError> {
        match *self {
            GroundProfile::Flat { height } => {
                require_finite("ground height", height)?;
            }
            GroundProfile::Linear { slope, offset } => {
                require_finite("ground slope", slope)?;
                require_finite("ground offset", offset)?;
            }
            GroundProfile::Sine {
                amplitude,
                wavelength,
                offset,
            } => {
                require_finite("ground amplitude", amplitude)?;
                require_positive("ground wavelength", wavelength)?;
                require_finite("ground offset", offset)?;
            }
            GroundProfile::TiltingLinear {
                max_slope,
                period,
                pivot,
            } => {
                require_finite("ground max slope", max_slope)?;
                require_positive("ground period", period)?;
                require_finite("ground pivot", pivot)?;
            }
            GroundProfile::KernelBump {
                amplitude,
                width,
                center,
                period,
            } => {
                require_finite("ground amplitude", amplitude)?;
                require_positive("ground bump width", width)?;
                require_finite("ground bump center", center)?;
                require_positive("ground period", period)?;
            }
            GroundProfile::DoubleSine {
                amplitude,
                wavelength,
                period,
                offset,
            } => {
                require_finite("ground amplitude", amplitude)?;
                require_positive("ground wavelength", wavelength)?;
                require_positive("ground period", period)?;
                require_finite("ground offset", offset)?;
            }
        }
        Ok(())
    }
}

/// Parses a preset name into a profile with default parameters.
impl FromStr for GroundProfile {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let profile = match s.trim().to_ascii_lowercase().as_str() {
            "flat" => GroundProfile::Flat { height: 0.0 },
            "linear" => GroundProfile::Linear {
                slope: 0.1,
                offset: 0.0,
            },
            "sine" => GroundProfile::Sine {
                amplitude: 0.1,
                wavelength: 2.0,
                offset: 0.1,
            },
            "tilting-linear" => GroundProfile::TiltingLinear {
                max_slope: 0.05,
                period: 4.0,
                pivot: 5.0,
            },
            "kernel-bump" => GroundProfile::KernelBump {
                amplitude: 0.3,
                width: 0.5,
                center: 5.0,
                period: 6.0,
            },
            "double-sine" => GroundProfile::DoubleSine {
                amplitude: 0.1,
                wavelength: 5.0,
                period: 3.0,
                offset: 0.1,
            },
            _ => {
                return Err(SimError::UnknownVariant {
                    kind: "ground profile",
                    value: s.to_string(),
                    expected: Self::PRESET_NAMES,
                })
            }
        };
        Ok(profile)
    }
}

#[inline]
fn wavenumber(wavelength: f64) -> f64 {
    2.0 * PI / wavelength
}

#[inline]
fn phase(t: f64, period: f64) -> f64 {
    2.0 * PI * t / period
}

/// Factor turning the unit-area kernel into a bump of the current peak height.
#[inline]
fn bump_scale(amplitude: f64, width: f64, t: f64, period: f64) -> f64 {
    let peak = amplitude * 0.5 * (1.0 - phase(t, period).cos());
    // cubic_1d(0, width) = 2 / (3 width)
    peak * 1.5 * width
}
