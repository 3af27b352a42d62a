//! Occupancy indices.
//!
//! ## Key Types
//!
//! - `GridCellIndex<V>`: coordinate -> occupants, for one view of one frame
//! - `View`: sealed marker trait, implemented by `Server` and `Client`

pub mod cell;
pub mod view;

pub use cell::{CellOccupants, GridCellIndex};
pub use view::{Client, Server, View};
