//! Reference frames and their placement.
//!
//! ## Key Types
//!
//! - `ReferenceFrame`: a movable coordinate space owning two occupancy indices
//! - `Placement` / `Rotation`: integer-exact frame transform
//! - `FrameSet`: every frame of a registry, nesting, `NetId` resolution

pub mod frame;
pub mod placement;
pub mod set;

pub use frame::ReferenceFrame;
pub use placement::{Placement, Rotation};
pub use set::FrameSet;
