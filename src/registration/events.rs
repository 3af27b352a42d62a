//! Registration events.
//!
//! The registry queues an event for every lifecycle change so dependent
//! systems (lighting, atmos, pushing) can react after the fact without
//! the registry knowing about them. Drain with `Registry::drain_events`.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, FrameId};

/// Something that happened to a registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationEvent {
    /// First attach of an unbound registration.
    Attached { entity: EntityId, frame: FrameId },

    /// Ordering marker for a frame change, queued immediately before
    /// `ParentChanged` for the same entity. The move has already been
    /// applied when this is drained; consumers that need the old frame
    /// read it from `from`.
    ParentChanging {
        entity: EntityId,
        from: FrameId,
        to: FrameId,
    },

    /// A frame change has been applied; indices reflect the new frame.
    ParentChanged {
        entity: EntityId,
        from: FrameId,
        to: FrameId,
    },

    /// The registration was destroyed.
    Destroyed {
        entity: EntityId,
        frame: Option<FrameId>,
    },

    /// The registration left this registry for another shard.
    HandedOff {
        entity: EntityId,
        frame: Option<FrameId>,
    },
}

impl RegistrationEvent {
    /// The entity this event is about.
    #[must_use]
    pub fn entity(&self) -> EntityId {
        match *self {
            Self::Attached { entity, .. }
            | Self::ParentChanging { entity, .. }
            | Self::ParentChanged { entity, .. }
            | Self::Destroyed { entity, .. }
            | Self::HandedOff { entity, .. } => entity,
        }
    }
}
