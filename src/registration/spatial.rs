//! Per-entity spatial registration.
//!
//! A `SpatialRegistration` binds one entity to one frame and records where
//! in that frame the entity is, once per authority view. It is the only
//! writer of its entity's entries in the frame indices: every position
//! change removes the old entry and adds the new one before returning, so
//! callers never observe an entity in two cells or in none.
//!
//! ## Binding lifecycle
//!
//! ```text
//! Unbound --attach--> Bound(frame) --reparent--> Bound(other) --destroy--> Removed
//! ```
//!
//! `Removed` is terminal.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, FrameId, GridCoord, ObjectType};
use crate::error::{RegistryError, RegistryResult};
use crate::frames::FrameSet;
use crate::index::{Client, Server, View};

use super::passability::Passability;

/// Frame binding state of a registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Binding {
    /// Created but not yet attached to a frame.
    Unbound,
    /// Attached to a frame.
    Bound(FrameId),
    /// Destroyed or handed off. Terminal.
    Removed,
}

/// Result of a parent frame change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentChange {
    /// Already in the requested frame; nothing was touched.
    Unchanged,
    /// Moved from `from` (`None` on first attach) to `to`.
    Moved {
        from: Option<FrameId>,
        to: FrameId,
    },
}

/// Spatial registration of one entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpatialRegistration {
    entity: EntityId,
    object_type: ObjectType,
    binding: Binding,
    /// Frame-local position per view, indexed by `View::SLOT`.
    positions: [GridCoord; 2],
    passability: Passability,
    generation: u64,
}

/// Position write on a registration with no frame.
///
/// Panics in debug builds; release builds log and refuse the write so the
/// indices stay intact.
fn unbound(entity: EntityId) -> RegistryError {
    tracing::error!(%entity, "position update on unbound registration");
    if cfg!(debug_assertions) {
        panic!("position update on unbound registration for {entity}");
    }
    RegistryError::UnboundRegistration(entity)
}

impl SpatialRegistration {
    /// Create an unbound registration, hidden in both views.
    #[must_use]
    pub fn new(entity: EntityId, object_type: ObjectType) -> Self {
        Self {
            entity,
            object_type,
            binding: Binding::Unbound,
            positions: [GridCoord::HIDDEN; 2],
            passability: Passability::OPEN,
            generation: 0,
        }
    }

    /// Set passability (builder pattern).
    #[must_use]
    pub fn with_passability(mut self, passability: Passability) -> Self {
        self.passability = passability;
        self
    }

    // === Accessors ===

    #[must_use]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    #[must_use]
    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    #[must_use]
    pub fn binding(&self) -> Binding {
        self.binding
    }

    /// Current frame, if bound.
    #[must_use]
    pub fn frame(&self) -> Option<FrameId> {
        match self.binding {
            Binding::Bound(frame) => Some(frame),
            Binding::Unbound | Binding::Removed => None,
        }
    }

    /// Authoritative frame-local position (may be hidden).
    #[must_use]
    pub fn server_position(&self) -> GridCoord {
        self.position::<Server>()
    }

    /// Predicted frame-local position (may be hidden).
    #[must_use]
    pub fn client_position(&self) -> GridCoord {
        self.position::<Client>()
    }

    /// Frame-local position in view `V`.
    #[must_use]
    pub fn position<V: View>(&self) -> GridCoord {
        self.positions[V::SLOT]
    }

    /// Check if hidden in view `V`.
    #[must_use]
    pub fn is_hidden<V: View>(&self) -> bool {
        self.position::<V>().is_hidden()
    }

    /// Binding generation, stamped by the owning registry each time this
    /// registration is created or changes frame. Zero for registrations
    /// no registry has seen.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    #[must_use]
    pub fn passability(&self) -> Passability {
        self.passability
    }

    /// Change passability. Takes effect for queries immediately; the
    /// indices do not store it.
    pub fn set_passability(&mut self, passability: Passability) {
        self.passability = passability;
    }

    fn bound_frame(&self) -> RegistryResult<FrameId> {
        match self.binding {
            Binding::Bound(frame) => Ok(frame),
            Binding::Unbound => Err(unbound(self.entity)),
            Binding::Removed => Err(RegistryError::UnknownEntity(self.entity)),
        }
    }

    // === Position updates ===

    /// Move to `coord` in view `V`.
    ///
    /// Removes the entity from its old cell (unless hidden), then adds it
    /// at `coord` (unless hidden). Writing while unbound is a programming
    /// error; see [`RegistryError::UnboundRegistration`].
    pub fn set_position<V: View>(&mut self, frames: &mut FrameSet, coord: GridCoord) -> RegistryResult<()> {
        let frame_id = self.bound_frame()?;
        let frame = frames
            .get_mut(frame_id)
            .ok_or(RegistryError::UnknownFrame(frame_id))?;

        let old = self.position::<V>();
        let index = V::index_mut(frame);
        if !old.is_hidden() {
            index.remove(old, self.entity);
        }
        if !coord.is_hidden() {
            index.add(coord, self.entity);
        }
        self.positions[V::SLOT] = coord;

        tracing::trace!(entity = %self.entity, view = V::NAME, from = %old, to = %coord, "position updated");
        Ok(())
    }

    /// Move to `coord` in the authoritative view.
    pub fn set_server_position(&mut self, frames: &mut FrameSet, coord: GridCoord) -> RegistryResult<()> {
        self.set_position::<Server>(frames, coord)
    }

    /// Move to `coord` in the predicted view.
    pub fn set_client_position(&mut self, frames: &mut FrameSet, coord: GridCoord) -> RegistryResult<()> {
        self.set_position::<Client>(frames, coord)
    }

    /// Hide in the authoritative view.
    pub fn hide_server(&mut self, frames: &mut FrameSet) -> RegistryResult<()> {
        self.set_position::<Server>(frames, GridCoord::HIDDEN)
    }

    /// Hide in the predicted view.
    pub fn hide_client(&mut self, frames: &mut FrameSet) -> RegistryResult<()> {
        self.set_position::<Client>(frames, GridCoord::HIDDEN)
    }

    // === Frame binding ===

    /// Move this registration to another frame, keeping both local
    /// positions.
    ///
    /// Everything that can fail is checked before anything is touched: on
    /// error the binding, positions and all indices are unchanged.
    pub fn set_parent_frame(&mut self, frames: &mut FrameSet, new_frame: FrameId) -> RegistryResult<ParentChange> {
        if !frames.contains(new_frame) {
            return Err(RegistryError::UnknownFrame(new_frame));
        }
        let old_frame = match self.binding {
            Binding::Bound(current) if current == new_frame => return Ok(ParentChange::Unchanged),
            Binding::Bound(current) => Some(current),
            Binding::Unbound => None,
            Binding::Removed => return Err(RegistryError::UnknownEntity(self.entity)),
        };

        if let Some(old) = old_frame {
            self.unindex(frames, old);
        }
        self.binding = Binding::Bound(new_frame);
        self.reindex(frames, new_frame);

        tracing::debug!(entity = %self.entity, from = ?old_frame, to = %new_frame, "parent frame changed");
        Ok(ParentChange::Moved {
            from: old_frame,
            to: new_frame,
        })
    }

    /// Drop out of the current frame's indices and mark as removed.
    ///
    /// Returns the last frame. Safe to call more than once.
    pub fn detach(&mut self, frames: &mut FrameSet) -> Option<FrameId> {
        let last = self.frame();
        if let Some(frame) = last {
            self.unindex(frames, frame);
        }
        self.binding = Binding::Removed;
        last
    }

    fn unindex(&self, frames: &mut FrameSet, frame: FrameId) {
        if let Some(f) = frames.get_mut(frame) {
            f.server.remove(self.server_position(), self.entity);
            f.client.remove(self.client_position(), self.entity);
        }
    }

    fn reindex(&self, frames: &mut FrameSet, frame: FrameId) {
        if let Some(f) = frames.get_mut(frame) {
            if !self.server_position().is_hidden() {
                f.server.add(self.server_position(), self.entity);
            }
            if !self.client_position().is_hidden() {
                f.client.add(self.client_position(), self.entity);
            }
        }
    }

    // === World positions ===

    /// Position in view `V` resolved through the frame chain.
    ///
    /// Hidden stays hidden. Fails if the registration has no frame.
    pub fn world_position<V: View>(&self, frames: &FrameSet) -> RegistryResult<GridCoord> {
        match self.binding {
            Binding::Bound(frame) => frames.local_to_world(frame, self.position::<V>()),
            Binding::Unbound => Err(RegistryError::UnboundRegistration(self.entity)),
            Binding::Removed => Err(RegistryError::UnknownEntity(self.entity)),
        }
    }

    /// Authoritative world position.
    pub fn world_position_server(&self, frames: &FrameSet) -> RegistryResult<GridCoord> {
        self.world_position::<Server>(frames)
    }

    /// Predicted world position.
    pub fn world_position_client(&self, frames: &FrameSet) -> RegistryResult<GridCoord> {
        self.world_position::<Client>(frames)
    }
}
