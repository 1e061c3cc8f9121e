//! Analytical dam-break solutions of the shallow-water equations.
//!
//! Both solutions describe a dam at `dam_position` removed at `t = 0`, with
//! still water of depth `upstream_depth` on its left. Ritter's solution covers
//! a dry bed downstream; Stoker's adds still water of `downstream_depth` and a
//! shock running into it.

/// Bisection iterations for the Stoker middle state
const BISECTION_STEPS: usize = 200;

/// Dam break onto a dry bed (Ritter 1892)
///
/// With `c0 = sqrt(g * h0)` and `xi = (x - x0) / t`:
///
/// ```text
/// xi <= -c0         h = h0,                    u = 0
/// -c0 < xi < 2 c0   h = (2 c0 - xi)^2 / (9 g), u = 2/3 (xi + c0)
/// xi >= 2 c0        h = 0,                     u = 0
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RitterSolution {
    /// Dam position x0 (m)
    pub dam_position: f64,
    /// Still depth h0 upstream of the dam (m)
    pub upstream_depth: f64,
    /// Gravitational acceleration g (m/s^2)
    pub gravity: f64,
}

impl RitterSolution {
    /// Create a new Ritter solution.
    pub fn new(dam_position: f64, upstream_depth: f64, gravity: f64) -> Self {
        Self {
            dam_position,
            upstream_depth,
            gravity,
        }
    }

    /// Upstream wave celerity c0 = sqrt(g h0)
    pub fn celerity(&self) -> f64 {
        (self.gravity * self.upstream_depth).sqrt()
    }

    /// Water depth at position x and time t
    pub fn height_at(&self, x: f64, t: f64) -> f64 {
        let c0 = self.celerity();
        if t <= 0.0 {
            return if x < self.dam_position { self.upstream_depth } else { 0.0 };
        }
        let xi = (x - self.dam_position) / t;
        if xi <= -c0 {
            self.upstream_depth
        } else if xi < 2.0 * c0 {
            let c = 2.0 * c0 - xi;
            c * c / (9.0 * self.gravity)
        } else {
            0.0
        }
    }

    /// Depth-averaged velocity at position x and time t
    pub fn velocity_at(&self, x: f64, t: f64) -> f64 {
        let c0 = self.celerity();
        if t <= 0.0 {
            return 0.0;
        }
        let xi = (x - self.dam_position) / t;
        if xi > -c0 && xi < 2.0 * c0 {
            2.0 / 3.0 * (xi + c0)
        } else {
            0.0
        }
    }

    /// Position of the wet/dry front, x0 + 2 c0 t
    pub fn front_position(&self, t: f64) -> f64 {
        self.dam_position + 2.0 * self.celerity() * t.max(0.0)
    }

    /// Position of the rarefaction head travelling upstream, x0 - c0 t
    pub fn rarefaction_head(&self, t: f64) -> f64 {
        self.dam_position - self.celerity() * t.max(0.0)
    }
}

/// Dam break onto a wet bed (Stoker 1957)
///
/// A rarefaction runs upstream, a shock runs downstream, and between them the
/// flow sits at a constant middle state `(hm, um)`. The middle depth solves
///
/// ```text
/// 2 (c0 - sqrt(g hm)) = (hm - h1) sqrt(g (hm + h1) / (2 hm h1))
/// ```
///
/// and the shock speed follows from mass conservation across the jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StokerSolution {
    /// Dam position x0 (m)
    pub dam_position: f64,
    /// Still depth h0 upstream of the dam (m)
    pub upstream_depth: f64,
    /// Still depth h1 downstream of the dam (m)
    pub downstream_depth: f64,
    /// Gravitational acceleration g (m/s^2)
    pub gravity: f64,
    middle_depth: f64,
    middle_velocity: f64,
    shock_speed: f64,
}

impl StokerSolution {
    /// Solve for the middle state.
    ///
    /// Requires `0 < downstream_depth < upstream_depth` and positive gravity.
    pub fn new(
        dam_position: f64,
        upstream_depth: f64,
        downstream_depth: f64,
        gravity: f64,
    ) -> Result<Self, String> {
        if !(gravity > 0.0 && gravity.is_finite()) {
            return Err(format!("gravity must be positive, got {gravity}"));
        }
        if !(downstream_depth > 0.0
            && downstream_depth < upstream_depth
            && upstream_depth.is_finite())
        {
            return Err(format!(
                "need 0 < downstream depth < upstream depth, got {downstream_depth} and {upstream_depth}"
            ));
        }

        let g = gravity;
        let (h0, h1) = (upstream_depth, downstream_depth);
        let c0 = (g * h0).sqrt();
        // Positive at h1, negative at h0, decreasing in between.
        let residual = |hm: f64| {
            2.0 * (c0 - (g * hm).sqrt()) - (hm - h1) * (g * (hm + h1) / (2.0 * hm * h1)).sqrt()
        };

        let (mut lo, mut hi) = (h1, h0);
        for _ in 0..BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            if residual(mid) > 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo <= f64::EPSILON * h0 {
                break;
            }
        }

        let middle_depth = 0.5 * (lo + hi);
        let middle_velocity = 2.0 * (c0 - (g * middle_depth).sqrt());
        let shock_speed = middle_depth * middle_velocity / (middle_depth - h1);

        Ok(Self {
            dam_position,
            upstream_depth,
            downstream_depth,
            gravity,
            middle_depth,
            middle_velocity,
            shock_speed,
        })
    }

    /// Depth hm between the rarefaction and the shock
    pub fn middle_depth(&self) -> f64 {
        self.middle_depth
    }

    /// Velocity um between the rarefaction and the shock
    pub fn middle_velocity(&self) -> f64 {
        self.middle_velocity
    }

    /// Shock speed S
    pub fn shock_speed(&self) -> f64 {
        self.shock_speed
    }

    /// Upstream wave celerity c0 = sqrt(g h0)
    pub fn celerity(&self) -> f64 {
        (self.gravity * self.upstream_depth).sqrt()
    }

    fn middle_celerity(&self) -> f64 {
        (self.gravity * self.middle_depth).sqrt()
    }

    /// Water depth at position x and time t
    pub fn height_at(&self, x: f64, t: f64) -> f64 {
        if t <= 0.0 {
            return if x < self.dam_position {
                self.upstream_depth
            } else {
                self.downstream_depth
            };
        }
        let c0 = self.celerity();
        let xi = (x - self.dam_position) / t;
        if xi <= -c0 {
            self.upstream_depth
        } else if xi <= self.middle_velocity - self.middle_celerity() {
            let c = 2.0 * c0 - xi;
            c * c / (9.0 * self.gravity)
        } else if xi <= self.shock_speed {
            self.middle_depth
        } else {
            self.downstream_depth
        }
    }

    /// Depth-averaged velocity at position x and time t
    pub fn velocity_at(&self, x: f64, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        let c0 = self.celerity();
        let xi = (x - self.dam_position) / t;
        if xi <= -c0 || xi > self.shock_speed {
            0.0
        } else if xi <= self.middle_velocity - self.middle_celerity() {
            2.0 / 3.0 * (xi + c0)
        } else {
            self.middle_velocity
        }
    }

    /// Position of the shock front, x0 + S t
    pub fn front_position(&self, t: f64) -> f64 {
        self.dam_position + self.shock_speed * t.max(0.0)
    }

    /// Position of the rarefaction head travelling upstream, x0 - c0 t
    pub fn rarefaction_head(&self, t: f64) -> f64 {
        self.dam_position - self.celerity() * t.max(0.0)
    }
}

/// Either dam-break solution, for harness code that handles both
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamBreakSolution {
    /// Dry bed downstream
    Ritter(RitterSolution),
    /// Wet bed downstream
    Stoker(StokerSolution),
}

impl DamBreakSolution {
    /// Water depth at position x and time t
    pub fn height_at(&self, x: f64, t: f64) -> f64 {
        match self {
            DamBreakSolution::Ritter(s) => s.height_at(x, t),
            DamBreakSolution::Stoker(s) => s.height_at(x, t),
        }
    }

    /// Depth-averaged velocity at position x and time t
    pub fn velocity_at(&self, x: f64, t: f64) -> f64 {
        match self {
            DamBreakSolution::Ritter(s) => s.velocity_at(x, t),
            DamBreakSolution::Stoker(s) => s.velocity_at(x, t),
        }
    }

    /// Downstream front: the wet/dry edge or the shock
    pub fn front_position(&self, t: f64) -> f64 {
        match self {
            DamBreakSolution::Ritter(s) => s.front_position(t),
            DamBreakSolution::Stoker(s) => s.front_position(t),
        }
    }

    /// Upstream edge of the disturbed region
    pub fn rarefaction_head(&self, t: f64) -> f64 {
        match self {
            DamBreakSolution::Ritter(s) => s.rarefaction_head(t),
            DamBreakSolution::Stoker(s) => s.rarefaction_head(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const G: f64 = 9.81;

    /// Midpoint rule over [a, b]
    fn integrate(f: impl Fn(f64) -> f64, a: f64, b: f64, n: usize) -> f64 {
        let dx = (b - a) / n as f64;
        (0..n).map(|i| f(a + (i as f64 + 0.5) * dx)).sum::<f64>() * dx
    }

    #[test]
    fn test_ritter_depth_at_dam_is_constant() {
        let ritter = RitterSolution::new(5.0, 1.0, G);
        for t in [0.1, 0.5, 2.0] {
            assert!((ritter.height_at(5.0, t) - 4.0 / 9.0).abs() < 1e-12);
            assert!((ritter.velocity_at(5.0, t) - 2.0 / 3.0 * ritter.celerity()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ritter_fan_edges() {
        let ritter = RitterSolution::new(0.0, 2.0, G);
        let t = 0.4;
        let head = ritter.rarefaction_head(t);
        let front = ritter.front_position(t);
        assert!((ritter.height_at(head - 1e-9, t) - 2.0).abs() < 1e-6);
        assert!((ritter.height_at(head + 1e-9, t) - 2.0).abs() < 1e-6);
        assert!(ritter.height_at(front - 1e-9, t) < 1e-9);
        assert_eq!(ritter.height_at(front + 1e-9, t), 0.0);
        assert!((ritter.velocity_at(front - 1e-9, t) - 2.0 * ritter.celerity()).abs() < 1e-6);
    }

    #[test]
    fn test_ritter_conserves_volume() {
        let ritter = RitterSolution::new(0.0, 1.0, G);
        let t = 0.5;
        let volume = integrate(|x| ritter.height_at(x, t), -10.0, 10.0, 200_000);
        assert!((volume - 10.0).abs() < 1e-3, "volume {volume}");
    }

    #[test]
    fn test_stoker_middle_state_satisfies_jump_conditions() {
        let stoker = StokerSolution::new(0.0, 1.0, 0.5, G).unwrap();
        let (hm, um, s) = (stoker.middle_depth(), stoker.middle_velocity(), stoker.shock_speed());
        let h1 = 0.5;
        assert!(hm > h1 && hm < 1.0, "middle depth {hm}");

        // Riemann invariant across the rarefaction
        assert!((um + 2.0 * (G * hm).sqrt() - 2.0 * stoker.celerity()).abs() < 1e-9);
        // Mass and momentum across the shock
        assert!((hm * (um - s) + h1 * s).abs() < 1e-9);
        let momentum_left = hm * um * (um - s) + 0.5 * G * hm * hm;
        let momentum_right = 0.5 * G * h1 * h1;
        assert!((momentum_left - momentum_right).abs() < 1e-8);
    }

    #[test]
    fn test_stoker_profile_is_continuous_at_rarefaction_tail() {
        let stoker = StokerSolution::new(2.0, 1.0, 0.3, G).unwrap();
        let t = 0.7;
        let tail = 2.0 + (stoker.middle_velocity() - (G * stoker.middle_depth()).sqrt()) * t;
        let below = stoker.height_at(tail - 1e-9, t);
        let above = stoker.height_at(tail + 1e-9, t);
        assert!((below - above).abs() < 1e-6, "{below} vs {above}");
        let jump = stoker.velocity_at(tail - 1e-9, t) - stoker.velocity_at(tail + 1e-9, t);
        assert!(jump.abs() < 1e-6);
    }

    #[test]
    fn test_stoker_conserves_volume() {
        let stoker = StokerSolution::new(0.0, 1.0, 0.4, G).unwrap();
        let t = 0.5;
        let volume = integrate(|x| stoker.height_at(x, t), -10.0, 10.0, 200_000);
        assert!((volume - 14.0).abs() < 1e-3, "volume {volume}");
    }

    #[test]
    fn test_stoker_small_jump_is_nearly_linear() {
        let stoker = StokerSolution::new(0.0, 1.0, 0.99, G).unwrap();
        assert!((stoker.middle_depth() - 0.995).abs() < 1e-4);
        // Both waves travel at about the mean celerity
        let c = (G * 0.995).sqrt();
        assert!((stoker.shock_speed() - c).abs() / c < 0.01);
    }

    #[test]
    fn test_stoker_rejects_invalid_depths() {
        assert!(StokerSolution::new(0.0, 1.0, 0.0, G).is_err());
        assert!(StokerSolution::new(0.0, 1.0, 1.5, G).is_err());
        assert!(StokerSolution::new(0.0, 1.0, 0.5, 0.0).is_err());
    }

    #[test]
    fn test_initial_state() {
        let stoker = DamBreakSolution::Stoker(StokerSolution::new(1.0, 2.0, 0.5, G).unwrap());
        assert_eq!(stoker.height_at(0.5, 0.0), 2.0);
        assert_eq!(stoker.height_at(1.5, 0.0), 0.5);
        assert_eq!(stoker.velocity_at(0.5, 0.0), 0.0);

        let ritter = DamBreakSolution::Ritter(RitterSolution::new(1.0, 2.0, G));
        assert_eq!(ritter.height_at(1.5, 0.0), 0.0);
        assert_eq!(ritter.front_position(0.0), 1.0);
    }
}
