//! Registry error types.

use thiserror::Error;

use crate::core::{EntityId, FrameId, GridCoord, NetId};

/// Errors that can occur while registering or moving entities.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The parent named by a reparent request has not arrived locally yet.
    ///
    /// Transient: retry once more state has been received.
    #[error("parent {parent} of {entity} is not known locally")]
    UnresolvedParent {
        /// Entity being reparented.
        entity: EntityId,
        /// The unresolved parent identity.
        parent: NetId,
    },

    /// A position was written before any frame was attached.
    #[error("{0} has no frame attached")]
    UnboundRegistration(EntityId),

    /// An occupancy index disagrees with a registration.
    #[error("index inconsistency: {0}")]
    IndexInconsistency(String),

    /// No registration exists for the entity.
    #[error("unknown entity: {0}")]
    UnknownEntity(EntityId),

    /// No frame exists with this handle.
    #[error("unknown frame: {0}")]
    UnknownFrame(FrameId),

    /// The entity already has a registration.
    #[error("entity already registered: {0}")]
    DuplicateEntity(EntityId),

    /// A frame with this handle already exists.
    #[error("frame already exists: {0}")]
    DuplicateFrame(FrameId),

    /// Another frame already claims this network identity.
    #[error("network id already claimed: {0}")]
    DuplicateNetId(NetId),

    /// Nesting `frame` under `parent` would make a frame its own ancestor.
    #[error("cannot nest {frame} under {parent}: cycle")]
    FrameCycle {
        /// Frame being moved.
        frame: FrameId,
        /// Requested parent.
        parent: FrameId,
    },

    /// A visible local coordinate has no representable world coordinate.
    #[error("{local} in {frame} overflows world coordinates")]
    CoordinateOverflow {
        /// Frame the coordinate is local to.
        frame: FrameId,
        /// The local coordinate.
        local: GridCoord,
    },

    /// Invalid configuration input.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RegistryError {
    /// Check if retrying later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::UnresolvedParent { .. })
    }
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = RegistryError::UnresolvedParent {
            entity: EntityId(4),
            parent: NetId(9),
        };
        assert_eq!(err.to_string(), "parent Net(9) of Entity(4) is not known locally");

        let err = RegistryError::FrameCycle {
            frame: FrameId(1),
            parent: FrameId(2),
        };
        assert_eq!(err.to_string(), "cannot nest Frame(1) under Frame(2): cycle");
    }

    #[test]
    fn test_transient() {
        let err = RegistryError::UnresolvedParent {
            entity: EntityId(4),
            parent: NetId(9),
        };
        assert!(err.is_transient());
        assert!(!RegistryError::UnboundRegistration(EntityId(4)).is_transient());
        assert!(!RegistryError::UnknownFrame(FrameId(0)).is_transient());
    }
}
