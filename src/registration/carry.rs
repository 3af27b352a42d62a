//! The carried-by relation.
//!
//! Containers, inventories and mobs dragging bodies all own this relation;
//! the registry only reads it, so that an entity being carried resolves to
//! wherever its carrier is.

use std::collections::HashMap;
use std::hash::BuildHasher;

use crate::core::EntityId;

/// Source of "who is carrying this entity".
pub trait CarryRelation {
    /// The entity directly carrying `entity`, if any.
    fn carrier_of(&self, entity: EntityId) -> Option<EntityId>;
}

/// Nothing is ever carried.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoCarry;

impl CarryRelation for NoCarry {
    fn carrier_of(&self, _entity: EntityId) -> Option<EntityId> {
        None
    }
}

/// Map of carried entity -> carrier.
impl<S: BuildHasher> CarryRelation for HashMap<EntityId, EntityId, S> {
    fn carrier_of(&self, entity: EntityId) -> Option<EntityId> {
        self.get(&entity).copied()
    }
}

impl<C: CarryRelation + ?Sized> CarryRelation for &C {
    fn carrier_of(&self, entity: EntityId) -> Option<EntityId> {
        (**self).carrier_of(entity)
    }
}
