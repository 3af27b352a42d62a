//! Authority views.
//!
//! Every frame keeps two occupancy indices and every registration keeps
//! two positions: one authoritative (`Server`), one predicted (`Client`).
//! The views are distinct types rather than a runtime flag, so a
//! `GridCellIndex<Server>` can never be handed to code expecting the
//! client index.
//!
//! Code that is identical for both views is written once, generic over
//! `V: View`.

use crate::frames::ReferenceFrame;

use super::cell::GridCellIndex;

mod sealed {
    pub trait Sealed {}
}

/// One of the two authority views. Sealed: only `Server` and `Client`.
pub trait View: sealed::Sealed + Copy + Default + std::fmt::Debug + Send + Sync + 'static {
    /// Name used in logs.
    const NAME: &'static str;

    /// Slot of this view in per-view storage such as `[GridCoord; 2]`.
    const SLOT: usize;

    /// This view's index in a frame.
    fn index(frame: &ReferenceFrame) -> &GridCellIndex<Self>;

    /// This view's index in a frame, mutably.
    fn index_mut(frame: &mut ReferenceFrame) -> &mut GridCellIndex<Self>;
}

/// Authoritative state, mutated only by the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Server;

/// Predicted state, mutated only by the presentation side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Client;

impl sealed::Sealed for Server {}
impl sealed::Sealed for Client {}

impl View for Server {
    const NAME: &'static str = "server";
    const SLOT: usize = 0;

    fn index(frame: &ReferenceFrame) -> &GridCellIndex<Self> {
        frame.server_index()
    }

    fn index_mut(frame: &mut ReferenceFrame) -> &mut GridCellIndex<Self> {
        &mut frame.server
    }
}

impl View for Client {
    const NAME: &'static str = "client";
    const SLOT: usize = 1;

    fn index(frame: &ReferenceFrame) -> &GridCellIndex<Self> {
        frame.client_index()
    }

    fn index_mut(frame: &mut ReferenceFrame) -> &mut GridCellIndex<Self> {
        &mut frame.client
    }
}
