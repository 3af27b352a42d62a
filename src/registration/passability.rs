//! Movement and airflow blocking.
//!
//! An occupant either blocks its whole cell (walls, closed doors) or only
//! some of the cell's sides (windoors, thin windows). Side blocking is
//! symmetric: a blocked north edge stops movement and gas crossing it in
//! either direction.

use serde::{Deserialize, Serialize};
use std::ops::BitOr;

use crate::core::GridCoord;

/// Set of cell sides in the grid plane. North is `+y`, east is `+x`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Edges(u8);

impl Edges {
    /// No sides.
    pub const NONE: Self = Self(0);
    /// The `+y` side.
    pub const NORTH: Self = Self(1 << 0);
    /// The `+x` side.
    pub const EAST: Self = Self(1 << 1);
    /// The `-y` side.
    pub const SOUTH: Self = Self(1 << 2);
    /// The `-x` side.
    pub const WEST: Self = Self(1 << 3);
    /// All four sides.
    pub const ALL: Self = Self(0b1111);

    /// Build from raw bits. Bits above the four sides are dropped.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check if no side is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check if every side in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check if any side in `other` is set.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Sides of `from`'s cell crossed when heading toward `to`.
    ///
    /// Diagonal steps cross two sides. Same cell, or a step that only
    /// changes `z`, crosses none.
    ///
    /// ```
    /// use tile_registry::core::GridCoord;
    /// use tile_registry::registration::Edges;
    ///
    /// let here = GridCoord::new(0, 0, 0);
    /// assert_eq!(Edges::toward(here, GridCoord::new(0, 1, 0)), Edges::NORTH);
    /// assert_eq!(Edges::toward(here, GridCoord::new(-1, -1, 0)), Edges::SOUTH | Edges::WEST);
    /// ```
    #[must_use]
    pub fn toward(from: GridCoord, to: GridCoord) -> Self {
        let mut edges = Self::NONE;
        if to.x > from.x {
            edges = edges | Self::EAST;
        } else if to.x < from.x {
            edges = edges | Self::WEST;
        }
        if to.y > from.y {
            edges = edges | Self::NORTH;
        } else if to.y < from.y {
            edges = edges | Self::SOUTH;
        }
        edges
    }
}

impl BitOr for Edges {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// How an entity affects movement and airflow through its cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Passability {
    /// Other entities may enter the cell.
    pub passable: bool,
    /// Gas may flow through the cell.
    pub atmos_passable: bool,
    /// Sides that block crossing even when the cell itself is open.
    #[serde(default)]
    pub blocked_edges: Edges,
}

impl Default for Passability {
    fn default() -> Self {
        Self::OPEN
    }
}

impl Passability {
    /// Blocks nothing (items, wires, most players).
    pub const OPEN: Self = Self {
        passable: true,
        atmos_passable: true,
        blocked_edges: Edges::NONE,
    };

    /// Blocks movement and gas (walls, closed doors).
    pub const SOLID: Self = Self {
        passable: false,
        atmos_passable: false,
        blocked_edges: Edges::NONE,
    };

    /// Blocks movement but lets gas through (grilles, tables).
    pub const BLOCKING: Self = Self {
        passable: false,
        atmos_passable: true,
        blocked_edges: Edges::NONE,
    };

    /// Open except across `edges` (a closed windoor on one side).
    #[must_use]
    pub const fn edge(edges: Edges) -> Self {
        Self {
            passable: true,
            atmos_passable: true,
            blocked_edges: edges,
        }
    }

    /// Check if something may enter this occupant's cell through `side`.
    #[must_use]
    pub const fn allows_entry(self, side: Edges) -> bool {
        self.passable && !self.blocked_edges.intersects(side)
    }

    /// Check if something inside this occupant's cell may leave through
    /// `side`.
    #[must_use]
    pub const fn allows_exit(self, side: Edges) -> bool {
        !self.blocked_edges.intersects(side)
    }

    /// Check if gas may enter this occupant's cell through `side`.
    #[must_use]
    pub const fn allows_gas_entry(self, side: Edges) -> bool {
        self.atmos_passable && !self.blocked_edges.intersects(side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toward() {
        let c = GridCoord::new(3, 3, 0);

        assert_eq!(Edges::toward(c, GridCoord::new(4, 3, 0)), Edges::EAST);
        assert_eq!(Edges::toward(c, GridCoord::new(2, 3, 0)), Edges::WEST);
        assert_eq!(Edges::toward(c, GridCoord::new(3, 2, 0)), Edges::SOUTH);
        assert_eq!(Edges::toward(c, GridCoord::new(4, 4, 0)), Edges::NORTH | Edges::EAST);
        assert!(Edges::toward(c, c).is_empty());
        assert!(Edges::toward(c, GridCoord::new(3, 3, 1)).is_empty());
    }

    #[test]
    fn test_edge_set_ops() {
        let ne = Edges::NORTH | Edges::EAST;

        assert!(ne.contains(Edges::NORTH));
        assert!(!ne.contains(Edges::NORTH | Edges::SOUTH));
        assert!(ne.intersects(Edges::NORTH | Edges::SOUTH));
        assert!(!ne.intersects(Edges::WEST));
        assert_eq!(Edges::from_bits(0xff), Edges::ALL);
    }

    #[test]
    fn test_one_sided_occupant() {
        let windoor = Passability::edge(Edges::NORTH);

        assert!(windoor.allows_entry(Edges::SOUTH));
        assert!(!windoor.allows_entry(Edges::NORTH));
        assert!(windoor.allows_exit(Edges::EAST));
        assert!(!windoor.allows_exit(Edges::NORTH));
        assert!(!windoor.allows_gas_entry(Edges::NORTH));
        assert!(windoor.allows_gas_entry(Edges::WEST));

        // Whole-cell blocking ignores sides.
        assert!(!Passability::SOLID.allows_entry(Edges::NONE));
        assert!(Passability::SOLID.allows_exit(Edges::NORTH));
    }

    #[test]
    fn test_serde_defaults_edges() {
        let json = r#"{"passable":false,"atmos_passable":true}"#;
        let p: Passability = serde_json::from_str(json).unwrap();
        assert_eq!(p, Passability::BLOCKING);
    }
}
