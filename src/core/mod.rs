//! Core types: entity and frame identifiers, grid coordinates, configuration.
//!
//! Everything here is plain data. The registry, frames and indices build
//! on these types but never extend them.

pub mod entity;
pub mod coord;
pub mod config;

pub use entity::{EntityId, NetId, ObjectType};
pub use coord::GridCoord;
pub use config::{FrameId, FrameConfig, RegistryConfig};
