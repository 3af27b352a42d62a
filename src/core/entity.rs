//! Entity identification.
//!
//! Every object that can occupy a tile (items, machines, players, wires)
//! has a unique `EntityId`. The registry never owns entities themselves;
//! it only tracks where they are.
//!
//! ## Usage
//!
//! ```
//! use tile_registry::core::{EntityId, ObjectType};
//!
//! let crate_box = EntityId(10);
//! assert_eq!(crate_box.raw(), 10);
//! assert!(ObjectType::Player.is_player());
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for any registered entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create a new entity ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Network identity of a reference frame.
///
/// Stable across processes: the server names a parent by its `NetId` and
/// each side resolves it to a local frame handle. A client may receive a
/// `NetId` before the frame it names has arrived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetId(pub u32);

impl NetId {
    /// Create a new network ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Net({})", self.0)
    }
}

/// Broad category of a registered entity.
///
/// Closed set. Queries can filter occupants of a cell by category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    /// Something that can be picked up.
    Item,
    /// Fixed or pushable furniture and machinery.
    Object,
    /// A player-controlled mob.
    Player,
    /// Cabling laid on a tile.
    Wire,
}

impl ObjectType {
    /// Check if this is a player.
    #[must_use]
    pub const fn is_player(self) -> bool {
        matches!(self, Self::Player)
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Item => "item",
            Self::Object => "object",
            Self::Player => "player",
            Self::Wire => "wire",
        };
        f.write_str(name)
    }
}
