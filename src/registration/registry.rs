//! The registry: frames plus every entity's registration.
//!
//! `Registry` is the owner the rest of the game talks to. It looks up the
//! registration for an entity and hands it the frame set, so every index
//! mutation goes through `SpatialRegistration` and the remove-then-add
//! discipline holds everywhere.
//!
//! ## Usage
//!
//! ```
//! use tile_registry::core::{EntityId, FrameId, GridCoord, NetId, ObjectType};
//! use tile_registry::frames::ReferenceFrame;
//! use tile_registry::index::Server;
//! use tile_registry::registration::Registry;
//!
//! let station = FrameId::new(0);
//! let mut registry = Registry::new();
//! registry.add_frame(ReferenceFrame::new(station, NetId::new(1), "Station")).unwrap();
//!
//! let toolbox = EntityId(10);
//! registry.register(toolbox, ObjectType::Item, station, GridCoord::new(3, 4, 0)).unwrap();
//! registry.set_server_position(toolbox, GridCoord::new(3, 5, 0)).unwrap();
//!
//! assert!(registry.entities_at::<Server>(station, GridCoord::new(3, 4, 0)).unwrap().is_empty());
//! assert_eq!(registry.entities_at::<Server>(station, GridCoord::new(3, 5, 0)).unwrap(), &[toolbox]);
//! ```
//!
//! ## Threading
//!
//! A registry is a single-writer structure. Hosts that split the world
//! into shards give each shard its own registry and move entities between
//! them with [`Registry::take`] and [`Registry::adopt`].

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EntityId, FrameId, GridCoord, ObjectType, RegistryConfig};
use crate::error::{RegistryError, RegistryResult};
use crate::frames::{FrameSet, Placement, ReferenceFrame};
use crate::index::{Client, Server, View};

use super::carry::CarryRelation;
use super::events::RegistrationEvent;
use super::passability::{Edges, Passability};
use super::spatial::{Binding, ParentChange, SpatialRegistration};

/// Everything needed to re-create a registration in another registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityHandoff {
    pub entity: EntityId,
    pub object_type: ObjectType,
    pub server_position: GridCoord,
    pub client_position: GridCoord,
    pub passability: Passability,
}

/// Frames and registrations for one simulation shard.
#[derive(Clone, Debug)]
pub struct Registry {
    frames: FrameSet,
    registrations: FxHashMap<EntityId, SpatialRegistration>,
    events: Vec<RegistrationEvent>,
    max_carry_depth: usize,
    /// Last binding generation handed out. Never reused.
    generation: u64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: FrameSet::new(),
            registrations: FxHashMap::default(),
            events: Vec::new(),
            max_carry_depth: RegistryConfig::DEFAULT_MAX_CARRY_DEPTH,
            generation: 0,
        }
    }

    /// Create a registry with the frames described by `config`.
    pub fn from_config(config: &RegistryConfig) -> RegistryResult<Self> {
        Ok(Self {
            frames: FrameSet::from_configs(&config.frames)?,
            max_carry_depth: config.max_carry_depth,
            ..Self::new()
        })
    }

    // === Frames ===

    /// All frames.
    #[must_use]
    pub fn frames(&self) -> &FrameSet {
        &self.frames
    }

    /// Get a frame.
    #[must_use]
    pub fn frame(&self, id: FrameId) -> Option<&ReferenceFrame> {
        self.frames.get(id)
    }

    /// Add a frame (a station loaded, a shuttle arriving over the network).
    pub fn add_frame(&mut self, frame: ReferenceFrame) -> RegistryResult<()> {
        self.frames.insert(frame)
    }

    /// Nest a frame inside another, or make it a root with `None`.
    pub fn set_frame_parent(&mut self, frame: FrameId, parent: Option<FrameId>) -> RegistryResult<()> {
        self.frames.set_parent(frame, parent)
    }

    /// Move a frame. Occupants keep their local coordinates.
    pub fn set_frame_placement(&mut self, frame: FrameId, placement: Placement) -> RegistryResult<()> {
        self.frames.set_placement(frame, placement)
    }

    // === Registrations ===

    /// Get a registration.
    #[must_use]
    pub fn registration(&self, entity: EntityId) -> Option<&SpatialRegistration> {
        self.registrations.get(&entity)
    }

    /// Check if an entity is registered.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.registrations.contains_key(&entity)
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Check if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Iterate over registrations, in no particular order.
    pub fn registrations(&self) -> impl Iterator<Item = &SpatialRegistration> {
        self.registrations.values()
    }

    /// Binding generation of an entity's registration.
    ///
    /// Changes whenever the entity is registered or moves to another
    /// frame, so a value captured earlier tells whether the binding it
    /// was captured against is still current. Generations are never
    /// reused, even across destroy and re-register of the same entity.
    #[must_use]
    pub fn binding_generation(&self, entity: EntityId) -> Option<u64> {
        self.registrations.get(&entity).map(SpatialRegistration::generation)
    }

    /// Carrier chain limit used by `assumed_location`.
    #[must_use]
    pub fn max_carry_depth(&self) -> usize {
        self.max_carry_depth
    }

    /// Create an unbound registration.
    ///
    /// The entity is not visible to any query until attached.
    pub fn spawn(&mut self, entity: EntityId, object_type: ObjectType) -> RegistryResult<()> {
        self.insert(SpatialRegistration::new(entity, object_type))
    }

    /// Create an unbound registration with custom passability.
    pub fn spawn_with(
        &mut self,
        entity: EntityId,
        object_type: ObjectType,
        passability: Passability,
    ) -> RegistryResult<()> {
        self.insert(SpatialRegistration::new(entity, object_type).with_passability(passability))
    }

    fn insert(&mut self, mut registration: SpatialRegistration) -> RegistryResult<()> {
        let entity = registration.entity();
        if self.registrations.contains_key(&entity) {
            return Err(RegistryError::DuplicateEntity(entity));
        }
        self.generation += 1;
        registration.set_generation(self.generation);
        self.registrations.insert(entity, registration);
        Ok(())
    }

    /// Spawn and attach in one step, placing the entity at `coord` in
    /// both views.
    ///
    /// Nothing is created if `frame` is unknown or the entity exists.
    pub fn register(
        &mut self,
        entity: EntityId,
        object_type: ObjectType,
        frame: FrameId,
        coord: GridCoord,
    ) -> RegistryResult<()> {
        if !self.frames.contains(frame) {
            return Err(RegistryError::UnknownFrame(frame));
        }
        self.spawn(entity, object_type)?;
        self.attach(entity, frame, coord)
    }

    /// Bind an entity to `frame` and place it at `coord` in both views.
    ///
    /// Used on initial registration and to force a re-sync from the
    /// entity's own transform.
    pub fn attach(&mut self, entity: EntityId, frame: FrameId, coord: GridCoord) -> RegistryResult<()> {
        self.set_parent_frame(entity, frame)?;
        self.set_position::<Server>(entity, coord)?;
        self.set_position::<Client>(entity, coord)
    }

    fn registration_mut(&mut self, entity: EntityId) -> RegistryResult<&mut SpatialRegistration> {
        self.registrations
            .get_mut(&entity)
            .ok_or(RegistryError::UnknownEntity(entity))
    }

    /// Change passability of a registered entity.
    pub fn set_passability(&mut self, entity: EntityId, passability: Passability) -> RegistryResult<()> {
        self.registration_mut(entity)?.set_passability(passability);
        Ok(())
    }

    // === Positions ===

    /// Move an entity to `coord` in view `V`.
    pub fn set_position<V: View>(&mut self, entity: EntityId, coord: GridCoord) -> RegistryResult<()> {
        let registration = self
            .registrations
            .get_mut(&entity)
            .ok_or(RegistryError::UnknownEntity(entity))?;
        registration.set_position::<V>(&mut self.frames, coord)
    }

    /// Move an entity in the authoritative view.
    pub fn set_server_position(&mut self, entity: EntityId, coord: GridCoord) -> RegistryResult<()> {
        self.set_position::<Server>(entity, coord)
    }

    /// Move an entity in the predicted view.
    pub fn set_client_position(&mut self, entity: EntityId, coord: GridCoord) -> RegistryResult<()> {
        self.set_position::<Client>(entity, coord)
    }

    /// Hide an entity in the authoritative view.
    pub fn hide_server(&mut self, entity: EntityId) -> RegistryResult<()> {
        self.set_position::<Server>(entity, GridCoord::HIDDEN)
    }

    /// Hide an entity in the predicted view.
    pub fn hide_client(&mut self, entity: EntityId) -> RegistryResult<()> {
        self.set_position::<Client>(entity, GridCoord::HIDDEN)
    }

    /// Hide an entity in both views, keeping its frame binding.
    pub fn disable(&mut self, entity: EntityId) -> RegistryResult<()> {
        self.hide_client(entity)?;
        self.hide_server(entity)
    }

    /// World position of an entity in view `V`.
    pub fn world_position<V: View>(&self, entity: EntityId) -> RegistryResult<GridCoord> {
        self.registrations
            .get(&entity)
            .ok_or(RegistryError::UnknownEntity(entity))?
            .world_position::<V>(&self.frames)
    }

    /// Authoritative world position.
    pub fn world_position_server(&self, entity: EntityId) -> RegistryResult<GridCoord> {
        self.world_position::<Server>(entity)
    }

    /// Predicted world position.
    pub fn world_position_client(&self, entity: EntityId) -> RegistryResult<GridCoord> {
        self.world_position::<Client>(entity)
    }

    /// Where an entity effectively is in view `V`.
    ///
    /// If something is carrying the entity, this is the carrier's assumed
    /// location (following nested carriers up to `max_carry_depth`);
    /// otherwise it is the entity's own world position. A carry cycle or a
    /// carrier with no frame ends the chain at the last resolvable entity.
    pub fn assumed_location<V: View, C: CarryRelation>(
        &self,
        entity: EntityId,
        carry: &C,
    ) -> RegistryResult<GridCoord> {
        if !self.registrations.contains_key(&entity) {
            return Err(RegistryError::UnknownEntity(entity));
        }

        let mut current = entity;
        let mut chain: SmallVec<[EntityId; 8]> = SmallVec::new();
        chain.push(entity);

        while let Some(carrier) = carry.carrier_of(current) {
            if chain.len() > self.max_carry_depth {
                tracing::warn!(%entity, depth = self.max_carry_depth, "carry chain too deep");
                break;
            }
            if chain.contains(&carrier) {
                tracing::warn!(%entity, %carrier, "carry cycle");
                break;
            }
            let resolvable = self
                .registrations
                .get(&carrier)
                .is_some_and(|r| r.frame().is_some());
            if !resolvable {
                tracing::warn!(%entity, %carrier, "carrier has no frame");
                break;
            }
            chain.push(carrier);
            current = carrier;
        }

        self.world_position::<V>(current)
    }

    // === Frame binding ===

    /// Move an entity to another frame, keeping its local positions.
    ///
    /// On error nothing changes. Queues `Attached` for a first attach, or
    /// `ParentChanging` + `ParentChanged` for a move; both are queued after
    /// the indices have been updated.
    pub fn set_parent_frame(&mut self, entity: EntityId, frame: FrameId) -> RegistryResult<ParentChange> {
        let registration = self
            .registrations
            .get_mut(&entity)
            .ok_or(RegistryError::UnknownEntity(entity))?;
        let change = registration.set_parent_frame(&mut self.frames, frame)?;
        if let ParentChange::Moved { .. } = change {
            self.generation += 1;
            registration.set_generation(self.generation);
        }

        match change {
            ParentChange::Unchanged => {}
            ParentChange::Moved { from: None, to } => {
                self.events.push(RegistrationEvent::Attached { entity, frame: to });
            }
            ParentChange::Moved { from: Some(from), to } => {
                self.events.push(RegistrationEvent::ParentChanging { entity, from, to });
                self.events.push(RegistrationEvent::ParentChanged { entity, from, to });
            }
        }
        Ok(change)
    }

    // === Teardown ===

    /// Destroy an entity's registration, removing it from both indices of
    /// its last frame.
    ///
    /// Returns the registration in the `Removed` state.
    pub fn destroy(&mut self, entity: EntityId) -> RegistryResult<SpatialRegistration> {
        let mut registration = self
            .registrations
            .remove(&entity)
            .ok_or(RegistryError::UnknownEntity(entity))?;
        let frame = registration.detach(&mut self.frames);

        tracing::debug!(%entity, ?frame, "registration destroyed");
        self.events.push(RegistrationEvent::Destroyed { entity, frame });
        Ok(registration)
    }

    /// Remove an entity so another registry can `adopt` it.
    pub fn take(&mut self, entity: EntityId) -> RegistryResult<EntityHandoff> {
        let mut registration = self
            .registrations
            .remove(&entity)
            .ok_or(RegistryError::UnknownEntity(entity))?;
        let frame = registration.detach(&mut self.frames);

        tracing::debug!(%entity, ?frame, "registration handed off");
        self.events.push(RegistrationEvent::HandedOff { entity, frame });
        Ok(EntityHandoff {
            entity,
            object_type: registration.object_type(),
            server_position: registration.server_position(),
            client_position: registration.client_position(),
            passability: registration.passability(),
        })
    }

    /// Insert an entity taken from another registry into `frame`, keeping
    /// its positions in both views.
    pub fn adopt(&mut self, handoff: EntityHandoff, frame: FrameId) -> RegistryResult<()> {
        if !self.frames.contains(frame) {
            return Err(RegistryError::UnknownFrame(frame));
        }
        let entity = handoff.entity;
        self.spawn_with(entity, handoff.object_type, handoff.passability)?;
        self.set_parent_frame(entity, frame)?;
        self.set_position::<Server>(entity, handoff.server_position)?;
        self.set_position::<Client>(entity, handoff.client_position)?;

        tracing::debug!(%entity, %frame, "registration adopted");
        Ok(())
    }

    // === Queries ===

    /// Entities in a cell of `frame`, view `V`.
    pub fn entities_at<V: View>(&self, frame: FrameId, coord: GridCoord) -> RegistryResult<&[EntityId]> {
        let f = self.frames.get(frame).ok_or(RegistryError::UnknownFrame(frame))?;
        Ok(V::index(f).entities_at(coord))
    }

    /// Entities of one category in a cell.
    pub fn entities_at_of_type<V: View>(
        &self,
        frame: FrameId,
        coord: GridCoord,
        object_type: ObjectType,
    ) -> RegistryResult<Vec<EntityId>> {
        Ok(self
            .entities_at::<V>(frame, coord)?
            .iter()
            .copied()
            .filter(|e| {
                self.registrations
                    .get(e)
                    .is_some_and(|r| r.object_type() == object_type)
            })
            .collect())
    }

    /// Check if every occupant of a cell lets others through. Per-side
    /// blocking is ignored; see [`Registry::can_move`].
    pub fn is_passable<V: View>(&self, frame: FrameId, coord: GridCoord) -> RegistryResult<bool> {
        self.all_occupants::<V>(frame, coord, |p| p.passable)
    }

    /// Check if every occupant of a cell lets gas through. Per-side
    /// blocking is ignored; see [`Registry::is_atmos_passable_from`].
    pub fn is_atmos_passable<V: View>(&self, frame: FrameId, coord: GridCoord) -> RegistryResult<bool> {
        self.all_occupants::<V>(frame, coord, |p| p.atmos_passable)
    }

    /// Check if the occupants of `to` let something in from `from`.
    pub fn is_passable_from<V: View>(&self, frame: FrameId, from: GridCoord, to: GridCoord) -> RegistryResult<bool> {
        let side = Edges::toward(to, from);
        self.all_occupants::<V>(frame, to, |p| p.allows_entry(side))
    }

    /// Check if the occupants of `from` let something leave toward `to`.
    pub fn is_passable_to<V: View>(&self, frame: FrameId, from: GridCoord, to: GridCoord) -> RegistryResult<bool> {
        let side = Edges::toward(from, to);
        self.all_occupants::<V>(frame, from, |p| p.allows_exit(side))
    }

    /// Check if something standing in `from` may step into `to`: nothing
    /// in `from` blocks the way out and nothing in `to` blocks the way in.
    pub fn can_move<V: View>(&self, frame: FrameId, from: GridCoord, to: GridCoord) -> RegistryResult<bool> {
        Ok(self.is_passable_to::<V>(frame, from, to)? && self.is_passable_from::<V>(frame, from, to)?)
    }

    /// Check if gas can flow from `from` into `to`.
    pub fn is_atmos_passable_from<V: View>(
        &self,
        frame: FrameId,
        from: GridCoord,
        to: GridCoord,
    ) -> RegistryResult<bool> {
        let out = Edges::toward(from, to);
        let into = Edges::toward(to, from);
        Ok(self.all_occupants::<V>(frame, from, |p| p.allows_exit(out))?
            && self.all_occupants::<V>(frame, to, |p| p.allows_gas_entry(into))?)
    }

    fn all_occupants<V: View>(
        &self,
        frame: FrameId,
        coord: GridCoord,
        check: impl Fn(Passability) -> bool,
    ) -> RegistryResult<bool> {
        Ok(self.entities_at::<V>(frame, coord)?.iter().all(|e| {
            self.registrations
                .get(e)
                .map_or(true, |r| check(r.passability()))
        }))
    }

    // === Events ===

    /// Take all queued events, oldest first.
    pub fn drain_events(&mut self) -> Vec<RegistrationEvent> {
        std::mem::take(&mut self.events)
    }

    /// Queued events, oldest first.
    #[must_use]
    pub fn pending_events(&self) -> &[RegistrationEvent] {
        &self.events
    }

    // === Consistency ===

    /// Check every index against every registration.
    ///
    /// For each view: each non-hidden position appears in exactly one cell
    /// of its frame's index, and each index entry belongs to a registration
    /// bound to that frame at that position.
    pub fn verify_consistency(&self) -> RegistryResult<()> {
        for frame in self.frames.iter() {
            self.verify_index::<Server>(frame)?;
            self.verify_index::<Client>(frame)?;
        }
        for registration in self.registrations.values() {
            self.verify_registration::<Server>(registration)?;
            self.verify_registration::<Client>(registration)?;
        }
        Ok(())
    }

    fn verify_index<V: View>(&self, frame: &ReferenceFrame) -> RegistryResult<()> {
        for (coord, occupants) in V::index(frame).iter() {
            if coord.is_hidden() {
                return Err(inconsistency(format!("{} {} index has a hidden cell", frame.id(), V::NAME)));
            }
            for (i, entity) in occupants.iter().enumerate() {
                if occupants[..i].contains(entity) {
                    return Err(inconsistency(format!(
                        "{entity} listed twice at {coord} in {} {} index",
                        frame.id(),
                        V::NAME
                    )));
                }
                let registration = self.registrations.get(entity).ok_or_else(|| {
                    inconsistency(format!("{entity} in {} {} index is not registered", frame.id(), V::NAME))
                })?;
                if registration.binding() != Binding::Bound(frame.id()) {
                    return Err(inconsistency(format!(
                        "{entity} in {} {} index is bound to {:?}",
                        frame.id(),
                        V::NAME,
                        registration.binding()
                    )));
                }
                if registration.position::<V>() != coord {
                    return Err(inconsistency(format!(
                        "{entity} indexed at {coord} but {} position is {}",
                        V::NAME,
                        registration.position::<V>()
                    )));
                }
            }
        }
        Ok(())
    }

    fn verify_registration<V: View>(&self, registration: &SpatialRegistration) -> RegistryResult<()> {
        let position = registration.position::<V>();
        let Some(frame) = registration.frame() else {
            return Ok(());
        };
        if position.is_hidden() {
            return Ok(());
        }
        let f = self
            .frames
            .get(frame)
            .ok_or_else(|| inconsistency(format!("{} bound to missing {frame}", registration.entity())))?;
        if !V::index(f).contains(position, registration.entity()) {
            return Err(inconsistency(format!(
                "{} missing from {frame} {} index at {position}",
                registration.entity(),
                V::NAME
            )));
        }
        Ok(())
    }
}

fn inconsistency(message: String) -> RegistryError {
    RegistryError::IndexInconsistency(message)
}
