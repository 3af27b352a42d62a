//! Entity registrations and the registry that owns them.
//!
//! ## Key Types
//!
//! - `SpatialRegistration`: one entity's frame binding and per-view positions
//! - `Registry`: frames + registrations, the surface the game calls
//! - `RegistrationEvent`: queued lifecycle notifications
//! - `Passability`: whole-cell and per-side blocking
//! - `CarryRelation`: externally owned "carried by" lookup

pub mod carry;
pub mod events;
pub mod passability;
pub mod registry;
pub mod spatial;

pub use carry::{CarryRelation, NoCarry};
pub use events::RegistrationEvent;
pub use passability::{Edges, Passability};
pub use registry::{EntityHandoff, Registry};
pub use spatial::{Binding, ParentChange, SpatialRegistration};
