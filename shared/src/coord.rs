//! Fixed-point hierarchical coordinates and the vector algebra over them.
//!
//! Positions are always integer unit coordinates. Coarser granularities
//! (build, chunk) are derived views obtained by flooring division, so a
//! coordinate always maps to the cell that contains it, including on the
//! negative side of an axis.
//!
//! Two vector kinds exist and the operator impls are the whole contract:
//! [`Coord`] is an absolute point, [`Dist`] a relative displacement.
//! `Coord - Coord` yields a `Dist`, `Coord + Dist` (either order) yields a
//! `Coord`, and `Coord + Coord` simply does not compile.

use crate::{BUILD_SIZE, CHUNK_SIZE};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// An absolute position in the unit-coordinate plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

/// A relative displacement between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dist {
    pub dx: i32,
    pub dy: i32,
}

impl Coord {
    /// Builds a position from unit coordinates.
    pub const fn from_units(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Builds a position from the full chunk/build/unit hierarchy.
    /// Each finer granularity is an offset inside the coarser cell.
    pub const fn from_chunk_build_unit(
        chunk: (i32, i32),
        build: (i32, i32),
        unit: (i32, i32),
    ) -> Self {
        Self {
            x: chunk.0 * CHUNK_SIZE + build.0 * BUILD_SIZE + unit.0,
            y: chunk.1 * CHUNK_SIZE + build.1 * BUILD_SIZE + unit.1,
        }
    }

    /// The chunk containing this position.
    pub const fn to_chunk(self) -> (i32, i32) {
        (self.x.div_euclid(CHUNK_SIZE), self.y.div_euclid(CHUNK_SIZE))
    }

    /// The build cell containing this position.
    pub const fn to_build(self) -> (i32, i32) {
        (self.x.div_euclid(BUILD_SIZE), self.y.div_euclid(BUILD_SIZE))
    }
}

/// Midpoint of a chunk's unit-coordinate extent.
pub const fn chunk_center(cx: i32, cy: i32) -> Coord {
    Coord {
        x: cx * CHUNK_SIZE + CHUNK_SIZE / 2,
        y: cy * CHUNK_SIZE + CHUNK_SIZE / 2,
    }
}

impl Dist {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Euclidean norm of the displacement.
    pub fn length(self) -> f64 {
        let dx = f64::from(self.dx);
        let dy = f64::from(self.dy);
        (dx * dx + dy * dy).sqrt()
    }
}

impl Sub for Coord {
    type Output = Dist;

    fn sub(self, rhs: Coord) -> Dist {
        Dist {
            dx: self.x - rhs.x,
            dy: self.y - rhs.y,
        }
    }
}

impl Sub<Dist> for Coord {
    type Output = Coord;

    fn sub(self, rhs: Dist) -> Coord {
        Coord {
            x: self.x - rhs.dx,
            y: self.y - rhs.dy,
        }
    }
}

impl Add<Dist> for Coord {
    type Output = Coord;

    fn add(self, rhs: Dist) -> Coord {
        Coord {
            x: self.x + rhs.dx,
            y: self.y + rhs.dy,
        }
    }
}

impl Add<Coord> for Dist {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        rhs + self
    }
}

impl Add for Dist {
    type Output = Dist;

    fn add(self, rhs: Dist) -> Dist {
        Dist {
            dx: self.dx + rhs.dx,
            dy: self.dy + rhs.dy,
        }
    }
}

impl Neg for Dist {
    type Output = Dist;

    fn neg(self) -> Dist {
        Dist {
            dx: -self.dx,
            dy: -self.dy,
        }
    }
}

impl Mul<f64> for Dist {
    type Output = Dist;

    /// Scales the displacement, rounding each component to the nearest
    /// integer. Halfway cases round away from zero (`f64::round`), so
    /// `0.5 -> 1` and `-0.5 -> -1`; tests pin this down.
    fn mul(self, rhs: f64) -> Dist {
        Dist {
            dx: (f64::from(self.dx) * rhs).round() as i32,
            dy: (f64::from(self.dy) * rhs).round() as i32,
        }
    }
}
