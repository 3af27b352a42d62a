//! Integer grid coordinates.
//!
//! ## GridCoord
//!
//! An `(x, y, z)` cell address, local to whatever frame it is read in.
//! `GridCoord::HIDDEN` is the sentinel for "not on the grid": hidden
//! entities keep a registration but occupy no cell.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg, Sub};

/// Integer cell coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridCoord {
    /// Sentinel for "not present on the grid".
    pub const HIDDEN: Self = Self {
        x: i32::MIN,
        y: i32::MIN,
        z: i32::MIN,
    };

    /// The origin cell.
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    /// Construct a coordinate from components.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Check if this is the hidden sentinel.
    #[must_use]
    pub const fn is_hidden(self) -> bool {
        self.x == i32::MIN && self.y == i32::MIN && self.z == i32::MIN
    }

    /// Component-wise addition, `None` on overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(rhs.x)?,
            y: self.y.checked_add(rhs.y)?,
            z: self.z.checked_add(rhs.z)?,
        })
    }

    /// `None` for the hidden sentinel, `Some(self)` otherwise.
    #[must_use]
    pub const fn visible(self) -> Option<Self> {
        if self.is_hidden() {
            None
        } else {
            Some(self)
        }
    }
}

impl From<(i32, i32, i32)> for GridCoord {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self { x, y, z }
    }
}

// Arithmetic wraps so that offsetting near the sentinel can never panic;
// callers check `is_hidden` before doing math on a coordinate.
impl Add for GridCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x.wrapping_add(rhs.x),
            y: self.y.wrapping_add(rhs.y),
            z: self.z.wrapping_add(rhs.z),
        }
    }
}

impl Sub for GridCoord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x.wrapping_sub(rhs.x),
            y: self.y.wrapping_sub(rhs.y),
            z: self.z.wrapping_sub(rhs.z),
        }
    }
}

impl Neg for GridCoord {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: self.x.wrapping_neg(),
            y: self.y.wrapping_neg(),
            z: self.z.wrapping_neg(),
        }
    }
}

impl std::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_hidden() {
            f.write_str("(hidden)")
        } else {
            write!(f, "({}, {}, {})", self.x, self.y, self.z)
        }
    }
}
