//! Reference frames ("matrices").
//!
//! A frame is a coordinate space that can move: a station, a shuttle
//! docked to it, a pod inside the shuttle. Entities store positions local
//! to their frame, so when a frame moves none of its occupants' stored
//! coordinates change; only their resolved world positions do.

use crate::core::{FrameConfig, FrameId, NetId};
use crate::index::{Client, GridCellIndex, Server};

use super::placement::Placement;

/// A movable coordinate space with one occupancy index per view.
#[derive(Clone, Debug)]
pub struct ReferenceFrame {
    id: FrameId,
    net_id: NetId,
    name: String,

    /// Placement relative to `parent`, or to the world for root frames.
    pub(crate) placement: Placement,
    pub(crate) parent: Option<FrameId>,

    pub(crate) server: GridCellIndex<Server>,
    pub(crate) client: GridCellIndex<Client>,
}

impl ReferenceFrame {
    /// Create a root frame at the origin.
    pub fn new(id: FrameId, net_id: NetId, name: impl Into<String>) -> Self {
        Self {
            id,
            net_id,
            name: name.into(),
            placement: Placement::IDENTITY,
            parent: None,
            server: GridCellIndex::new(),
            client: GridCellIndex::new(),
        }
    }

    /// Create a frame from its configuration.
    ///
    /// The parent link is recorded as-is; `FrameSet` validates it.
    pub fn from_config(config: &FrameConfig) -> Self {
        Self {
            placement: config.placement,
            parent: config.parent,
            ..Self::new(config.id, config.net_id, config.name.clone())
        }
    }

    /// Set the initial placement (builder pattern).
    #[must_use]
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the parent frame (builder pattern).
    #[must_use]
    pub fn with_parent(mut self, parent: FrameId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Local handle.
    #[must_use]
    pub fn id(&self) -> FrameId {
        self.id
    }

    /// Network identity parent changes refer to.
    #[must_use]
    pub fn net_id(&self) -> NetId {
        self.net_id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Placement relative to the parent frame, or the world for roots.
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Enclosing frame, if nested.
    #[must_use]
    pub fn parent(&self) -> Option<FrameId> {
        self.parent
    }

    /// Authoritative occupancy.
    #[must_use]
    pub fn server_index(&self) -> &GridCellIndex<Server> {
        &self.server
    }

    /// Predicted occupancy.
    #[must_use]
    pub fn client_index(&self) -> &GridCellIndex<Client> {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GridCoord;
    use crate::frames::Rotation;

    #[test]
    fn test_new_frame() {
        let frame = ReferenceFrame::new(FrameId::new(1), NetId::new(50), "Station");

        assert_eq!(frame.id(), FrameId::new(1));
        assert_eq!(frame.net_id(), NetId::new(50));
        assert_eq!(frame.name(), "Station");
        assert_eq!(frame.parent(), None);
        assert_eq!(frame.placement(), Placement::IDENTITY);
        assert!(frame.server_index().is_empty());
        assert!(frame.client_index().is_empty());
    }

    #[test]
    fn test_from_config() {
        let placement = Placement::new(GridCoord::new(5, 5, 0), Rotation::Deg270);
        let config = FrameConfig::new(FrameId::new(2), NetId::new(60), "Shuttle")
            .with_parent(FrameId::new(1))
            .with_placement(placement);

        let frame = ReferenceFrame::from_config(&config);
        assert_eq!(frame.parent(), Some(FrameId::new(1)));
        assert_eq!(frame.placement(), placement);
        assert_eq!(frame.name(), "Shuttle");
    }
}
