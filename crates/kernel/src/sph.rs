//! SPH smoothing kernel functions for 1D shallow-water flow.
//!
//! Implements the cubic spline kernel and its derivative. With the 1D
//! normalization used here the kernel integrates to one over the real line,
//! so a particle of volume `V` contributes exactly `V` to the integral of the
//! reconstructed fluid height.

/// Kernel support radius in units of the smoothing length.
pub const SUPPORT_FACTOR: f64 = 2.0;

/// Support radius of the cubic kernel for smoothing length `h`.
#[inline]
pub fn support_radius(h: f64) -> f64 {
    SUPPORT_FACTOR * h
}

/// Cubic spline smoothing kernel in 1D.
///
/// ```text
/// R = |dist| / h
/// W(dist, h) = (1/h) * (2/3 - R^2 + R^3/2)   for 0 <= R < 1
/// W(dist, h) = (1/h) * (1/6) * (2 - R)^3     for 1 <= R < 2
/// W(dist, h) = 0                             for R >= 2
/// ```
///
/// # Arguments
/// * `dist` - Signed separation between the query point and the particle.
/// * `h` - Smoothing length. The support radius is 2h.
pub fn cubic_1d(dist: f64, h: f64) -> f64 {
    let r = dist.abs() / h;
    if r < 1.0 {
        let r2 = r * r;
        (2.0 / 3.0 - r2 + 0.5 * r2 * r) / h
    } else if r < 2.0 {
        let t = 2.0 - r;
        t * t * t / (6.0 * h)
    } else {
        0.0
    }
}

/// Derivative of [`cubic_1d`] with respect to `dist`.
///
/// ```text
/// dW/d(dist) = sign(dist) / h^2 * (-2R + 3R^2/2)   for 0 <= R < 1
/// dW/d(dist) = sign(dist) / h^2 * (-(2 - R)^2 / 2)  for 1 <= R < 2
/// ```
///
/// Continuous at R = 1 (both branches give -1/(2h^2)) and vanishes at R = 2.
pub fn d_cubic_1d(dist: f64, h: f64) -> f64 {
    let r = dist.abs() / h;
    let dw_dr = if r < 1.0 {
        -2.0 * r + 1.5 * r * r
    } else if r < 2.0 {
        let t = 2.0 - r;
        -0.5 * t * t
    } else {
        return 0.0;
    };
    dist.signum() * dw_dr / (h * h)
}
