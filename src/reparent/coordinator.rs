//! Parent change coordination.
//!
//! The transport layer announces "entity X now lives in the frame with
//! network identity N". On a client that frame may not have arrived yet.
//! The coordinator resolves N, applies the move if it can, and otherwise
//! remembers the request so it can be replayed when more state arrives.
//!
//! Server-side code goes through the same entry point, so there is one
//! path by which an entity's parent frame changes.
//!
//! A deferred request is stamped with the registration's binding
//! generation. If the entity changes frame by any other route, or is
//! destroyed and registered again, the stamp no longer matches and the
//! request is dropped on the next retry instead of overriding the newer
//! binding.

use rustc_hash::FxHashMap;

use crate::core::{EntityId, NetId};
use crate::error::{RegistryError, RegistryResult};
use crate::registration::{ParentChange, Registry};

/// A request waiting for its frame to arrive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingRequest {
    parent: NetId,
    /// Binding generation of the registration when the request was made.
    generation: u64,
}

/// Applies parent changes named by network identity, retrying those
/// whose frame is not yet known.
#[derive(Clone, Debug, Default)]
pub struct ReparentCoordinator {
    /// Latest unresolved request per entity.
    pending: FxHashMap<EntityId, PendingRequest>,
}

impl ReparentCoordinator {
    /// Create a coordinator with nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `entity` into the frame identified by `parent`.
    ///
    /// If `parent` does not resolve locally, the request is kept (replacing
    /// any older one for the same entity) and `UnresolvedParent` is
    /// returned; the registration is left exactly as it was. A request
    /// that resolves supersedes anything pending for the entity.
    pub fn request(
        &mut self,
        registry: &mut Registry,
        entity: EntityId,
        parent: NetId,
    ) -> RegistryResult<ParentChange> {
        let Some(generation) = registry.binding_generation(entity) else {
            return Err(RegistryError::UnknownEntity(entity));
        };

        let Some(frame) = registry.frames().resolve(parent) else {
            tracing::debug!(%entity, %parent, "parent not known yet, deferring");
            self.pending.insert(entity, PendingRequest { parent, generation });
            return Err(RegistryError::UnresolvedParent { entity, parent });
        };

        self.pending.remove(&entity);
        registry.set_parent_frame(entity, frame)
    }

    /// Replay pending requests against the registry's current frames.
    ///
    /// Returns the entities whose request was applied, in entity order.
    /// Requests for entities no longer registered, or whose binding has
    /// changed since the request was made, are dropped.
    pub fn retry_pending(&mut self, registry: &mut Registry) -> Vec<EntityId> {
        let mut entities: Vec<EntityId> = self.pending.keys().copied().collect();
        entities.sort_unstable();

        let mut applied = Vec::new();
        for entity in entities {
            let Some(&PendingRequest { parent, generation }) = self.pending.get(&entity) else {
                continue;
            };
            match registry.binding_generation(entity) {
                None => {
                    tracing::debug!(%entity, %parent, "dropping request for unregistered entity");
                    self.pending.remove(&entity);
                    continue;
                }
                Some(current) if current != generation => {
                    tracing::debug!(%entity, %parent, "dropping request superseded by a newer binding");
                    self.pending.remove(&entity);
                    continue;
                }
                Some(_) => {}
            }
            let Some(frame) = registry.frames().resolve(parent) else {
                continue;
            };

            self.pending.remove(&entity);
            match registry.set_parent_frame(entity, frame) {
                Ok(_) => applied.push(entity),
                Err(e) => tracing::warn!(%entity, %parent, error = %e, "deferred reparent failed"),
            }
        }
        applied
    }

    /// Drop the pending request for an entity (e.g. it was destroyed).
    pub fn forget(&mut self, entity: EntityId) -> Option<NetId> {
        self.pending.remove(&entity).map(|request| request.parent)
    }

    /// The unresolved parent an entity is waiting for.
    #[must_use]
    pub fn pending_parent(&self, entity: EntityId) -> Option<NetId> {
        self.pending.get(&entity).map(|request| request.parent)
    }

    /// Check if an entity has a request waiting.
    #[must_use]
    pub fn is_pending(&self, entity: EntityId) -> bool {
        self.pending.contains_key(&entity)
    }

    /// Number of waiting requests.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
