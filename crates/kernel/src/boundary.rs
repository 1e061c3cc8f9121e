//! Domain boundaries and ghost particles.
//!
//! The simulated axis is the interval `[x_min, x_max]`. Near each edge the
//! kernel sums are completed with ghost particles:
//!
//! - **Solid** walls mirror real particles about the wall. Ghosts only correct
//!   the kernel sums; no mass crosses the wall. A particle that leaves the
//!   domain is reflected back and its speed and acceleration are negated.
//! - **Cyclic** boundaries translate particles by one domain width so that
//!   particles near one edge contribute at the other edge. A particle that
//!   leaves the domain is wrapped by exactly one width.
//!
//! Ghost generation assumes no particle that must be mirrored or wrapped lies
//! further than one domain width from an edge.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::sph::support_radius;

/// Boundary kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoundaryType {
    /// Reflecting walls at both edges.
    #[default]
    Solid,
    /// Periodic domain.
    Cyclic,
}

impl BoundaryType {
    /// Canonical configuration name.
    pub fn name(self) -> &'static str {
        match self {
            BoundaryType::Solid => "SOLID",
            BoundaryType::Cyclic => "CYCLIC",
        }
    }
}

impl FromStr for BoundaryType {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SOLID" => Ok(BoundaryType::Solid),
            "CYCLIC" => Ok(BoundaryType::Cyclic),
            _ => Err(SimError::UnknownVariant {
                kind: "boundary type",
                value: s.to_string(),
                expected: "SOLID, CYCLIC",
            }),
        }
    }
}

/// Shorter of the direct and the wrap-around separation between two
/// positions on a periodic interval of length `width`.
///
/// The result is non-negative and never exceeds `width / 2` for positions
/// inside the interval.
pub fn cyclic_distance(a: f64, b: f64, width: f64) -> f64 {
    let direct = (a - b).abs() % width;
    direct.min(width - direct)
}

/// Domain extent plus the ghost particles valid for the last [`Boundary::update`].
///
/// `left` holds ghost positions that contribute to queries near `x_min`,
/// `right` those that contribute near `x_max`. Both lists are stale as soon as
/// particle positions or the smoothing length change.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    kind: BoundaryType,
    x_min: f64,
    x_max: f64,
    left: Vec<f64>,
    right: Vec<f64>,
}

impl Boundary {
    /// Create a boundary over `[x_min, x_max]` with empty ghost lists.
    pub fn new(kind: BoundaryType, x_min: f64, x_max: f64) -> Result<Self, SimError> {
        if !(x_min.is_finite() && x_max.is_finite() && x_min < x_max) {
            return Err(SimError::EmptyDomain { x_min, x_max });
        }
        Ok(Self {
            kind,
            x_min,
            x_max,
            left: Vec::new(),
            right: Vec::new(),
        })
    }

    /// Boundary kind.
    pub fn kind(&self) -> BoundaryType {
        self.kind
    }

    /// Switch the boundary kind, keeping the extent. Ghost lists are cleared
    /// and must be rebuilt with [`Boundary::update`].
    pub fn set_kind(&mut self, kind: BoundaryType) {
        self.kind = kind;
        self.left.clear();
        self.right.clear();
    }

    /// Left edge.
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Right edge.
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    /// Domain width `x_max - x_min`.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Whether `x` lies inside the closed domain interval.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.x_min && x <= self.x_max
    }

    /// Ghost positions used for queries near the left edge.
    pub fn left_ghosts(&self) -> &[f64] {
        &self.left
    }

    /// Ghost positions used for queries near the right edge.
    pub fn right_ghosts(&self) -> &[f64] {
        &self.right
    }

    /// `x` lies within one kernel support of the left edge.
    #[inline]
    pub fn is_inside_left_inner(&self, x: f64, h: f64) -> bool {
        x < self.x_min + support_radius(h)
    }

    /// `x` lies within one kernel support of the right edge.
    #[inline]
    pub fn is_inside_right_inner(&self, x: f64, h: f64) -> bool {
        x > self.x_max - support_radius(h)
    }

    /// Ghost list that applies to a query at `x`.
    ///
    /// At most one side applies; the left edge is checked first.
    pub fn ghosts_near(&self, x: f64, h: f64) -> &[f64] {
        if self.is_inside_left_inner(x, h) {
            &self.left
        } else if self.is_inside_right_inner(x, h) {
            &self.right
        } else {
            &[]
        }
    }

    /// Rebuild both ghost lists from the real particle positions.
    pub fn update(&mut self, positions: &[f64], h: f64) {
        self.left.clear();
        self.right.clear();
        let width = self.width();

        for &x in positions {
            let near_left = self.is_inside_left_inner(x, h);
            let near_right = self.is_inside_right_inner(x, h);
            match self.kind {
                BoundaryType::Solid => {
                    if near_left {
                        self.left.push(2.0 * self.x_min - x);
                    }
                    if near_right {
                        self.right.push(2.0 * self.x_max - x);
                    }
                }
                BoundaryType::Cyclic => {
                    // A particle near the right edge reappears beyond the left
                    // edge and vice versa.
                    if near_right {
                        self.left.push(x - width);
                    }
                    if near_left {
                        self.right.push(x + width);
                    }
                }
            }
        }
    }

    /// Bring a particle that left the domain back inside.
    ///
    /// Solid: reflect the position about the crossed wall and negate speed and
    /// acceleration. Cyclic: wrap the position by one domain width.
    pub fn map_inside(&self, x: &mut f64, vx: &mut f64, ax: &mut f64) {
        match self.kind {
            BoundaryType::Solid => {
                if *x < self.x_min {
                    *x = 2.0 * self.x_min - *x;
                } else if *x > self.x_max {
                    *x = 2.0 * self.x_max - *x;
                } else {
                    return;
                }
                *vx = -*vx;
                *ax = -*ax;
            }
            BoundaryType::Cyclic => {
                if *x < self.x_min {
                    *x += self.width();
                } else if *x > self.x_max {
                    *x -= self.width();
                }
            }
        }
    }

    /// Separation between two positions: direct for solid walls, the shorter
    /// of direct and wrap-around for a cyclic domain.
    pub fn distance(&self, a: f64, b: f64) -> f64 {
        match self.kind {
            BoundaryType::Solid => (a - b).abs(),
            BoundaryType::Cyclic => cyclic_distance(a, b, self.width()),
        }
    }
}
