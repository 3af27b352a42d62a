//! The set of frames known to one registry.
//!
//! Frames form a forest: every frame has at most one parent, and the
//! parent links never loop. World coordinates are resolved by applying
//! each placement from the owning frame up to its root.

use rustc_hash::FxHashMap;

use crate::core::{FrameConfig, FrameId, GridCoord, NetId};
use crate::error::{RegistryError, RegistryResult};

use super::frame::ReferenceFrame;
use super::placement::Placement;

/// All frames of a registry, with network identity resolution.
#[derive(Clone, Debug, Default)]
pub struct FrameSet {
    frames: FxHashMap<FrameId, ReferenceFrame>,
    by_net_id: FxHashMap<NetId, FrameId>,
}

impl FrameSet {
    /// Create an empty frame set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frame set from configuration.
    ///
    /// Frames may be listed in any order; parent links are checked once
    /// every frame exists.
    pub fn from_configs(configs: &[FrameConfig]) -> RegistryResult<Self> {
        let mut set = Self::new();
        for config in configs {
            let mut frame = ReferenceFrame::from_config(config);
            frame.parent = None;
            set.insert_unlinked(frame)?;
        }
        for config in configs {
            if let Some(parent) = config.parent {
                set.set_parent(config.id, Some(parent))?;
            }
        }
        Ok(set)
    }

    /// Add a frame.
    ///
    /// Fails if the handle or network identity is taken, or if the frame
    /// names a parent that does not exist.
    pub fn insert(&mut self, frame: ReferenceFrame) -> RegistryResult<()> {
        if let Some(parent) = frame.parent {
            if !self.frames.contains_key(&parent) {
                return Err(RegistryError::UnknownFrame(parent));
            }
            if parent == frame.id() {
                return Err(RegistryError::FrameCycle {
                    frame: frame.id(),
                    parent,
                });
            }
        }
        self.insert_unlinked(frame)
    }

    fn insert_unlinked(&mut self, frame: ReferenceFrame) -> RegistryResult<()> {
        if self.frames.contains_key(&frame.id()) {
            return Err(RegistryError::DuplicateFrame(frame.id()));
        }
        if self.by_net_id.contains_key(&frame.net_id()) {
            return Err(RegistryError::DuplicateNetId(frame.net_id()));
        }

        tracing::debug!(frame = %frame.id(), net_id = %frame.net_id(), name = frame.name(), "frame added");
        self.by_net_id.insert(frame.net_id(), frame.id());
        self.frames.insert(frame.id(), frame);
        Ok(())
    }

    /// Resolve a network identity to a local frame.
    #[must_use]
    pub fn resolve(&self, net_id: NetId) -> Option<FrameId> {
        self.by_net_id.get(&net_id).copied()
    }

    /// Get a frame.
    #[must_use]
    pub fn get(&self, id: FrameId) -> Option<&ReferenceFrame> {
        self.frames.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: FrameId) -> Option<&mut ReferenceFrame> {
        self.frames.get_mut(&id)
    }

    /// Check if a frame exists.
    #[must_use]
    pub fn contains(&self, id: FrameId) -> bool {
        self.frames.contains_key(&id)
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if there are no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Iterate over all frames, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &ReferenceFrame> {
        self.frames.values()
    }

    // === Nesting ===

    /// Nest `frame` inside `parent`, or make it a root with `None`.
    ///
    /// Occupants keep their local coordinates. Fails with `FrameCycle` if
    /// `parent` is `frame` or one of its descendants.
    pub fn set_parent(&mut self, frame: FrameId, parent: Option<FrameId>) -> RegistryResult<()> {
        if !self.frames.contains_key(&frame) {
            return Err(RegistryError::UnknownFrame(frame));
        }
        if let Some(parent) = parent {
            if !self.frames.contains_key(&parent) {
                return Err(RegistryError::UnknownFrame(parent));
            }
            if parent == frame || self.ancestors(parent).any(|a| a == frame) {
                return Err(RegistryError::FrameCycle { frame, parent });
            }
        }

        if let Some(f) = self.frames.get_mut(&frame) {
            f.parent = parent;
        }
        Ok(())
    }

    /// Ancestors of a frame, nearest first (excluding the frame itself).
    pub fn ancestors(&self, frame: FrameId) -> impl Iterator<Item = FrameId> + '_ {
        let mut current = self.frames.get(&frame).and_then(|f| f.parent);
        // Bounded by the frame count so a corrupted link cannot spin.
        let mut remaining = self.frames.len();
        std::iter::from_fn(move || {
            let id = current?;
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            current = self.frames.get(&id).and_then(|f| f.parent);
            Some(id)
        })
    }

    // === Placement ===

    /// Move a frame. Occupants' stored coordinates are untouched.
    pub fn set_placement(&mut self, frame: FrameId, placement: Placement) -> RegistryResult<()> {
        let f = self
            .frames
            .get_mut(&frame)
            .ok_or(RegistryError::UnknownFrame(frame))?;
        f.placement = placement;
        Ok(())
    }

    /// Resolve a frame-local coordinate to world coordinates through the
    /// frame chain. Hidden stays hidden.
    ///
    /// Fails with `CoordinateOverflow` if any step leaves the `i32` range
    /// or lands on the hidden sentinel.
    pub fn local_to_world(&self, frame: FrameId, local: GridCoord) -> RegistryResult<GridCoord> {
        let owner = self.frames.get(&frame).ok_or(RegistryError::UnknownFrame(frame))?;
        if local.is_hidden() {
            return Ok(GridCoord::HIDDEN);
        }

        let overflow = || {
            tracing::warn!(%frame, %local, "world position overflows");
            RegistryError::CoordinateOverflow { frame, local }
        };
        let mut world = owner.placement.checked_apply(local).ok_or_else(overflow)?;
        for ancestor in self.ancestors(frame) {
            if let Some(f) = self.frames.get(&ancestor) {
                world = f.placement.checked_apply(world).ok_or_else(overflow)?;
            }
        }
        Ok(world)
    }
}
