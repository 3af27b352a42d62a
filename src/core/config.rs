//! Registry configuration types.
//!
//! Hosts configure the registry at startup by providing:
//! - `FrameConfig`: Defines a reference frame (station, shuttle, ...)
//! - `RegistryConfig`: Combines all frame configs plus tuning knobs
//!
//! Configs are plain builders, and can also be read from TOML:
//!
//! ```
//! use tile_registry::core::{FrameId, RegistryConfig};
//!
//! let config = RegistryConfig::from_toml_str(r#"
//!     max_carry_depth = 4
//!
//!     [[frames]]
//!     id = 0
//!     net_id = 100
//!     name = "Station"
//!
//!     [[frames]]
//!     id = 1
//!     net_id = 101
//!     name = "Shuttle"
//!     parent = 0
//!     placement = { offset = { x = 20, y = 5, z = 0 }, rotation = "deg90" }
//! "#).unwrap();
//!
//! assert_eq!(config.max_carry_depth, 4);
//! assert_eq!(config.get_frame(FrameId::new(1)).unwrap().parent, Some(FrameId::new(0)));
//! ```

use serde::{Deserialize, Serialize};

use super::entity::NetId;
use crate::error::{RegistryError, RegistryResult};
use crate::frames::Placement;

/// Local handle for a reference frame.
///
/// Only meaningful inside one registry. Use `NetId` to name a frame
/// across processes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameId(pub u32);

impl FrameId {
    /// Create a new frame ID.
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

impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}

/// Configuration for a single reference frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Local handle.
    pub id: FrameId,

    /// Network identity used to resolve reparent requests.
    pub net_id: NetId,

    /// Human-readable name (for debugging/display).
    #[serde(default)]
    pub name: String,

    /// Frame this one is nested in. `None` for root frames.
    #[serde(default)]
    pub parent: Option<FrameId>,

    /// Placement relative to the parent (or world, for root frames).
    #[serde(default)]
    pub placement: Placement,
}

impl FrameConfig {
    /// Create a new root frame configuration at the origin.
    pub fn new(id: FrameId, net_id: NetId, name: impl Into<String>) -> Self {
        Self {
            id,
            net_id,
            name: name.into(),
            parent: None,
            placement: Placement::IDENTITY,
        }
    }

    /// Nest this frame inside another.
    #[must_use]
    pub fn with_parent(mut self, parent: FrameId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the initial placement.
    #[must_use]
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }
}

fn default_max_carry_depth() -> usize {
    RegistryConfig::DEFAULT_MAX_CARRY_DEPTH
}

/// Complete registry configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Frames to create, in any order. Parents are linked after all
    /// frames exist.
    #[serde(default)]
    pub frames: Vec<FrameConfig>,

    /// How many carriers `assumed_location` follows before giving up.
    #[serde(default = "default_max_carry_depth")]
    pub max_carry_depth: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryConfig {
    /// Default carrier chain limit (a body in a bag in a locker ...).
    pub const DEFAULT_MAX_CARRY_DEPTH: usize = 8;

    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            max_carry_depth: Self::DEFAULT_MAX_CARRY_DEPTH,
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> RegistryResult<Self> {
        toml::from_str(text).map_err(|e| RegistryError::InvalidConfig(e.to_string()))
    }

    /// Add a frame configuration.
    #[must_use]
    pub fn with_frame(mut self, frame: FrameConfig) -> Self {
        self.frames.push(frame);
        self
    }

    /// Set the carrier chain limit.
    #[must_use]
    pub fn with_max_carry_depth(mut self, depth: usize) -> Self {
        self.max_carry_depth = depth;
        self
    }

    /// Get a frame config by ID.
    #[must_use]
    pub fn get_frame(&self, id: FrameId) -> Option<&FrameConfig> {
        self.frames.iter().find(|f| f.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GridCoord;
    use crate::frames::Rotation;

    #[test]
    fn test_frame_id() {
        let id = FrameId::new(5);
        assert_eq!(id.raw(), 5);
        assert_eq!(format!("{}", id), "Frame(5)");
    }

    #[test]
    fn test_frame_config_builder() {
        let placement = Placement::new(GridCoord::new(4, 0, 0), Rotation::Deg180);
        let frame = FrameConfig::new(FrameId::new(2), NetId::new(77), "Escape pod")
            .with_parent(FrameId::new(0))
            .with_placement(placement);

        assert_eq!(frame.name, "Escape pod");
        assert_eq!(frame.parent, Some(FrameId::new(0)));
        assert_eq!(frame.placement, placement);
    }

    #[test]
    fn test_registry_config() {
        let config = RegistryConfig::new()
            .with_frame(FrameConfig::new(FrameId::new(0), NetId::new(1), "Station"))
            .with_frame(FrameConfig::new(FrameId::new(1), NetId::new(2), "Shuttle"))
            .with_max_carry_depth(3);

        assert_eq!(config.frames.len(), 2);
        assert_eq!(config.max_carry_depth, 3);
        assert!(config.get_frame(FrameId::new(1)).is_some());
        assert!(config.get_frame(FrameId::new(9)).is_none());
    }

    #[test]
    fn test_toml_defaults() {
        let config = RegistryConfig::from_toml_str(
            r#"
            [[frames]]
            id = 3
            net_id = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.max_carry_depth, RegistryConfig::DEFAULT_MAX_CARRY_DEPTH);
        let frame = config.get_frame(FrameId::new(3)).unwrap();
        assert_eq!(frame.net_id, NetId::new(30));
        assert_eq!(frame.parent, None);
        assert_eq!(frame.placement, Placement::IDENTITY);
        assert!(frame.name.is_empty());
    }

    #[test]
    fn test_toml_invalid() {
        let result = RegistryConfig::from_toml_str("frames = 12");
        assert!(matches!(result, Err(RegistryError::InvalidConfig(_))));
    }
}
