//! Particle data structures using struct-of-arrays layout.

/// Struct-of-arrays particle storage for the simulated axis.
///
/// All arrays are parallel: index `i` across every array refers to the same
/// particle. The particle count is fixed once an environment is built; the
/// arrays are mutated in place every step and never resized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleArrays {
    /// Positions along the simulated axis (m)
    pub x: Vec<f64>,
    /// Velocities (m/s)
    pub vx: Vec<f64>,
    /// Accelerations (m/s^2)
    pub ax: Vec<f64>,
}

impl ParticleArrays {
    /// Create an empty particle collection with no particles allocated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create particles at rest at the given positions.
    pub fn at_rest(positions: Vec<f64>) -> Self {
        let n = positions.len();
        Self {
            x: positions,
            vx: vec![0.0; n],
            ax: vec![0.0; n],
        }
    }

    /// Return the number of particles currently stored.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Return `true` if there are no particles.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Append a single particle with the given position and velocity.
    ///
    /// Acceleration is initialized to zero.
    pub fn push_particle(&mut self, x: f64, vx: f64) {
        self.x.push(x);
        self.vx.push(vx);
        self.ax.push(0.0);
    }
}
