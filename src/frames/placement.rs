//! Frame placement: where a frame sits inside its parent.
//!
//! Placements are integer-exact. A frame can be offset by whole cells and
//! rotated in quarter turns about the z axis; anything finer belongs to
//! the presentation layer.

use serde::{Deserialize, Serialize};

use crate::core::GridCoord;

/// Counter-clockwise quarter-turn rotation about the z axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Rotation from a number of quarter turns (any integer, wraps).
    #[must_use]
    pub const fn from_quarter_turns(turns: i32) -> Self {
        match turns.rem_euclid(4) {
            0 => Self::Deg0,
            1 => Self::Deg90,
            2 => Self::Deg180,
            _ => Self::Deg270,
        }
    }

    /// Number of counter-clockwise quarter turns, 0..4.
    #[must_use]
    pub const fn quarter_turns(self) -> i32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }

    /// Apply this rotation followed by `other`.
    #[must_use]
    pub const fn then(self, other: Self) -> Self {
        Self::from_quarter_turns(self.quarter_turns() + other.quarter_turns())
    }

    /// Rotate a coordinate about the origin, `None` if a component
    /// cannot be negated.
    #[must_use]
    pub fn checked_apply(self, c: GridCoord) -> Option<GridCoord> {
        Some(match self {
            Self::Deg0 => c,
            Self::Deg90 => GridCoord::new(c.y.checked_neg()?, c.x, c.z),
            Self::Deg180 => GridCoord::new(c.x.checked_neg()?, c.y.checked_neg()?, c.z),
            Self::Deg270 => GridCoord::new(c.y, c.x.checked_neg()?, c.z),
        })
    }

    /// Rotate a coordinate about the origin. Wraps at the `i32` edges.
    #[must_use]
    pub const fn apply(self, c: GridCoord) -> GridCoord {
        match self {
            Self::Deg0 => c,
            Self::Deg90 => GridCoord::new(c.y.wrapping_neg(), c.x, c.z),
            Self::Deg180 => GridCoord::new(c.x.wrapping_neg(), c.y.wrapping_neg(), c.z),
            Self::Deg270 => GridCoord::new(c.y, c.x.wrapping_neg(), c.z),
        }
    }
}

/// Offset and rotation of a frame relative to its parent.
///
/// ```
/// use tile_registry::core::GridCoord;
/// use tile_registry::frames::{Placement, Rotation};
///
/// let shuttle = Placement::new(GridCoord::new(10, 0, 0), Rotation::Deg90);
/// assert_eq!(shuttle.apply(GridCoord::new(1, 0, 0)), GridCoord::new(10, 1, 0));
/// assert!(shuttle.apply(GridCoord::HIDDEN).is_hidden());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    #[serde(default)]
    pub offset: GridCoord,
    #[serde(default)]
    pub rotation: Rotation,
}

impl Placement {
    /// No offset, no rotation.
    pub const IDENTITY: Self = Self {
        offset: GridCoord::ZERO,
        rotation: Rotation::Deg0,
    };

    /// Create a placement.
    #[must_use]
    pub const fn new(offset: GridCoord, rotation: Rotation) -> Self {
        Self { offset, rotation }
    }

    /// Pure translation.
    #[must_use]
    pub const fn at(offset: GridCoord) -> Self {
        Self::new(offset, Rotation::Deg0)
    }

    /// Map a frame-local coordinate into the parent's coordinates.
    ///
    /// The hidden sentinel maps to itself. Wraps at the `i32` edges; see
    /// [`Placement::checked_apply`].
    #[must_use]
    pub fn apply(self, local: GridCoord) -> GridCoord {
        if local.is_hidden() {
            return GridCoord::HIDDEN;
        }
        self.rotation.apply(local) + self.offset
    }

    /// Like [`Placement::apply`], but `None` if a visible coordinate would
    /// overflow or land on the hidden sentinel.
    #[must_use]
    pub fn checked_apply(self, local: GridCoord) -> Option<GridCoord> {
        if local.is_hidden() {
            return Some(GridCoord::HIDDEN);
        }
        self.rotation
            .checked_apply(local)?
            .checked_add(self.offset)?
            .visible()
    }
}
