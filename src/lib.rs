//! # tile-registry
//!
//! Tracks which grid cell of which reference frame every entity occupies,
//! separately for the authoritative (server) and predicted (client) views.
//!
//! ## Design Principles
//!
//! 1. **Two views, two types**: server and client occupancy are separate
//!    indices distinguished at compile time (`GridCellIndex<Server>` vs
//!    `GridCellIndex<Client>`), never one index with an authority flag.
//!
//! 2. **Local coordinates**: entities store positions local to their frame.
//!    Frames move and nest; world positions are resolved on demand.
//!
//! 3. **One write path**: every index mutation goes through
//!    `SpatialRegistration`, which removes the old entry before adding the
//!    new one. Reparenting either fully applies or changes nothing.
//!
//! ## Modules
//!
//! - `core`: Entity/frame identifiers, grid coordinates, configuration
//! - `frames`: Reference frames, placement, the frame set
//! - `index`: Per-frame occupancy indices and the `View` markers
//! - `registration`: Per-entity registrations and the owning `Registry`
//! - `reparent`: Network-identity driven parent changes with retry
//! - `error`: `RegistryError`

pub mod core;
pub mod error;
pub mod frames;
pub mod index;
pub mod registration;
pub mod reparent;

// Re-export commonly used types
pub use crate::core::{
    EntityId, NetId, ObjectType,
    GridCoord,
    FrameId, FrameConfig, RegistryConfig,
};

pub use crate::error::{RegistryError, RegistryResult};

pub use crate::frames::{FrameSet, Placement, ReferenceFrame, Rotation};

pub use crate::index::{Client, GridCellIndex, Server, View};

pub use crate::registration::{
    Binding, CarryRelation, Edges, EntityHandoff, NoCarry, ParentChange, Passability,
    Registry, RegistrationEvent, SpatialRegistration,
};

pub use crate::reparent::ReparentCoordinator;
