//! Error type shared by the simulation core.

use thiserror::Error;

/// Errors reported by the simulation core.
///
/// Configuration errors are raised when a value is applied; the only runtime
/// error is [`SimError::ParticleCountMismatch`], which aborts a single step
/// without touching particle state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// A name did not match any member of a closed enumeration.
    #[error("unknown {kind} '{value}' (expected one of: {expected})")]
    UnknownVariant {
        /// Enumeration being parsed (e.g. "integrator type").
        kind: &'static str,
        /// The rejected input.
        value: String,
        /// Comma-separated list of accepted names.
        expected: &'static str,
    },

    /// Smoothing length was zero, negative or not finite.
    #[error("smoothing length must be positive and finite, got {0}")]
    InvalidSmoothingLength(f64),

    /// A numeric parameter was outside its valid range.
    #[error("invalid {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: f64,
        /// What the parameter requires.
        reason: &'static str,
    },

    /// Domain bounds do not describe a non-empty interval.
    #[error("empty domain: x_min ({x_min}) must be less than x_max ({x_max})")]
    EmptyDomain {
        /// Left edge.
        x_min: f64,
        /// Right edge.
        x_max: f64,
    },

    /// A prediction environment no longer matches the primary one.
    #[error("particle count mismatch: environment has {expected} particles, prediction has {actual}")]
    ParticleCountMismatch {
        /// Particle count of the primary environment.
        expected: usize,
        /// Particle count of the prediction environment.
        actual: usize,
    },
}

/// Reject a value unless it is finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter {
            name,
            value,
            reason: "must be positive and finite",
        })
    }
}

/// Reject a value unless it is finite.
pub(crate) fn require_finite(name: &'static str, value: f64) -> Result<f64, SimError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        })
    }
}
