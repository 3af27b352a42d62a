//! Reparenting driven by network identities.
//!
//! See [`ReparentCoordinator`].

mod coordinator;

pub use coordinator::ReparentCoordinator;
