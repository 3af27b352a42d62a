//! Registration integration tests.
//!
//! These tests drive the registry the way the game does: entities spawn
//! into frames, move, hide, ride shuttles, get carried and get destroyed,
//! and the occupancy indices must agree with every registration throughout.

use rustc_hash::FxHashMap;

use tile_registry::core::{EntityId, FrameId, GridCoord, NetId, ObjectType, RegistryConfig};
use tile_registry::frames::{Placement, ReferenceFrame, Rotation};
use tile_registry::index::{Client, Server};
use tile_registry::registration::{
    Binding, CarryRelation, Edges, NoCarry, ParentChange, Passability, Registry, RegistrationEvent,
};
use tile_registry::RegistryError;

const A: FrameId = FrameId(0);
const B: FrameId = FrameId(1);

fn two_frames() -> Registry {
    let mut registry = Registry::new();
    registry.add_frame(ReferenceFrame::new(A, NetId(100), "A")).unwrap();
    registry.add_frame(ReferenceFrame::new(B, NetId(101), "B")).unwrap();
    registry
}

/// Carrier lookup that records how often it was asked.
struct MockCarrier {
    carried_by: FxHashMap<EntityId, EntityId>,
    lookups: std::cell::Cell<usize>,
}

impl MockCarrier {
    fn new() -> Self {
        Self {
            carried_by: FxHashMap::default(),
            lookups: std::cell::Cell::new(0),
        }
    }

    fn carry(mut self, carried: EntityId, carrier: EntityId) -> Self {
        self.carried_by.insert(carried, carrier);
        self
    }
}

impl CarryRelation for MockCarrier {
    fn carrier_of(&self, entity: EntityId) -> Option<EntityId> {
        self.lookups.set(self.lookups.get() + 1);
        self.carried_by.get(&entity).copied()
    }
}

// =============================================================================
// Position Updates
// =============================================================================

/// Entity at (3,4,0) moves to (3,5,0): old cell empties, new cell holds it.
#[test]
fn test_move_between_cells() {
    let mut registry = two_frames();
    let e = EntityId(1);
    registry.register(e, ObjectType::Item, A, GridCoord::new(3, 4, 0)).unwrap();

    registry.set_server_position(e, GridCoord::new(3, 5, 0)).unwrap();

    assert!(registry.entities_at::<Server>(A, GridCoord::new(3, 4, 0)).unwrap().is_empty());
    assert_eq!(registry.entities_at::<Server>(A, GridCoord::new(3, 5, 0)).unwrap(), &[e]);
    // Client view was not touched.
    assert_eq!(registry.entities_at::<Client>(A, GridCoord::new(3, 4, 0)).unwrap(), &[e]);
    registry.verify_consistency().unwrap();
}

/// Many moves in a row never leave a stale entry behind.
#[test]
fn test_walk_leaves_single_entry() {
    let mut registry = two_frames();
    let e = EntityId(1);
    registry.register(e, ObjectType::Player, A, GridCoord::ZERO).unwrap();

    for step in 1..=20 {
        registry.set_server_position(e, GridCoord::new(step, step % 3, 0)).unwrap();
        registry.set_client_position(e, GridCoord::new(step + 1, 0, 0)).unwrap();
    }

    let frame = registry.frame(A).unwrap();
    assert_eq!(frame.server_index().entry_count(), 1);
    assert_eq!(frame.client_index().entry_count(), 1);
    assert_eq!(frame.server_index().cells_containing(e).count(), 1);
    registry.verify_consistency().unwrap();
}

/// Hiding removes the entity from its last cell.
#[test]
fn test_hide_server() {
    let mut registry = two_frames();
    let e = EntityId(1);
    let cell = GridCoord::new(7, 7, 0);
    registry.register(e, ObjectType::Item, A, cell).unwrap();

    registry.hide_server(e).unwrap();

    assert!(!registry.entities_at::<Server>(A, cell).unwrap().contains(&e));
    assert!(registry.entities_at::<Server>(A, GridCoord::HIDDEN).unwrap().is_empty());
    assert!(registry.world_position_server(e).unwrap().is_hidden());

    // Showing it again re-indexes.
    registry.set_server_position(e, cell).unwrap();
    assert_eq!(registry.entities_at::<Server>(A, cell).unwrap(), &[e]);
    registry.verify_consistency().unwrap();
}

/// Writing a position with no frame attached is a programming error.
#[test]
#[cfg_attr(debug_assertions, should_panic(expected = "unbound registration"))]
fn test_unbound_write() {
    let mut registry = two_frames();
    let e = EntityId(1);
    registry.spawn(e, ObjectType::Item).unwrap();

    let result = registry.set_server_position(e, GridCoord::new(1, 1, 0));

    assert_eq!(result, Err(RegistryError::UnboundRegistration(e)));
    assert!(registry.frame(A).unwrap().server_index().is_empty());
}

// =============================================================================
// Reparenting
// =============================================================================

/// Entity at (1,1,0) in A moves to B and keeps its local coordinate.
#[test]
fn test_reparent_success() {
    let mut registry = two_frames();
    let e = EntityId(1);
    let cell = GridCoord::new(1, 1, 0);
    registry.register(e, ObjectType::Object, A, cell).unwrap();

    let change = registry.set_parent_frame(e, B).unwrap();

    assert_eq!(change, ParentChange::Moved { from: Some(A), to: B });
    assert!(registry.frame(A).unwrap().server_index().cells_containing(e).next().is_none());
    assert!(registry.frame(A).unwrap().client_index().cells_containing(e).next().is_none());
    assert_eq!(registry.entities_at::<Server>(B, cell).unwrap(), &[e]);
    assert_eq!(registry.entities_at::<Client>(B, cell).unwrap(), &[e]);
    assert_eq!(registry.registration(e).unwrap().server_position(), cell);
    registry.verify_consistency().unwrap();
}

/// A failed reparent leaves the registration and both frames untouched.
#[test]
fn test_reparent_failure_is_atomic() {
    let mut registry = two_frames();
    let e = EntityId(1);
    registry.register(e, ObjectType::Object, A, GridCoord::new(1, 1, 0)).unwrap();
    registry.set_client_position(e, GridCoord::new(1, 2, 0)).unwrap();
    registry.drain_events();

    let before = registry.registration(e).unwrap().clone();
    let a_server = registry.frame(A).unwrap().server_index().clone();
    let a_client = registry.frame(A).unwrap().client_index().clone();

    let result = registry.set_parent_frame(e, FrameId(42));

    assert_eq!(result, Err(RegistryError::UnknownFrame(FrameId(42))));
    assert_eq!(registry.registration(e).unwrap(), &before);
    let a = registry.frame(A).unwrap();
    assert_eq!(a.server_index().entities_at(GridCoord::new(1, 1, 0)), a_server.entities_at(GridCoord::new(1, 1, 0)));
    assert_eq!(a.client_index().entities_at(GridCoord::new(1, 2, 0)), a_client.entities_at(GridCoord::new(1, 2, 0)));
    assert!(registry.frame(B).unwrap().server_index().is_empty());
    assert!(registry.pending_events().is_empty());
}

/// Riding a shuttle: the shuttle moves, the passenger's local coordinate
/// does not, its world position does.
#[test]
fn test_nested_frames_and_movement() {
    let config = RegistryConfig::from_toml_str(
        r#"
        [[frames]]
        id = 0
        net_id = 100
        name = "Station"

        [[frames]]
        id = 1
        net_id = 101
        name = "Shuttle"
        parent = 0
        placement = { offset = { x = 10, y = 0, z = 0 } }
        "#,
    )
    .unwrap();
    let mut registry = Registry::from_config(&config).unwrap();
    let pilot = EntityId(7);
    registry.register(pilot, ObjectType::Player, B, GridCoord::new(2, 0, 0)).unwrap();

    assert_eq!(registry.world_position_server(pilot).unwrap(), GridCoord::new(12, 0, 0));

    // Shuttle turns around and flies off.
    registry
        .set_frame_placement(B, Placement::new(GridCoord::new(0, 40, 0), Rotation::Deg180))
        .unwrap();
    assert_eq!(registry.world_position_server(pilot).unwrap(), GridCoord::new(-2, 40, 0));
    assert_eq!(registry.world_position_client(pilot).unwrap(), GridCoord::new(-2, 40, 0));
    assert_eq!(registry.registration(pilot).unwrap().server_position(), GridCoord::new(2, 0, 0));

    // Undock: the shuttle becomes a root frame.
    registry.set_frame_parent(B, None).unwrap();
    assert_eq!(registry.world_position_server(pilot).unwrap(), GridCoord::new(-2, 40, 0));
    assert!(matches!(
        registry.set_frame_parent(A, Some(A)),
        Err(RegistryError::FrameCycle { .. })
    ));
}

// =============================================================================
// Assumed Location
// =============================================================================

/// A carried body resolves to its carrier's position.
#[test]
fn test_assumed_location_carried() {
    let mut registry = two_frames();
    let body = EntityId(1);
    let medic = EntityId(2);
    registry.register(body, ObjectType::Player, A, GridCoord::new(1, 1, 0)).unwrap();
    registry.register(medic, ObjectType::Player, B, GridCoord::new(5, 5, 0)).unwrap();
    registry
        .set_frame_placement(B, Placement::at(GridCoord::new(100, 0, 0)))
        .unwrap();

    let carrier = MockCarrier::new().carry(body, medic);

    assert_eq!(
        registry.assumed_location::<Server, _>(body, &carrier).unwrap(),
        GridCoord::new(105, 5, 0)
    );
    assert!(carrier.lookups.get() > 0);
}

/// Without a carry relation the entity's own world position is used.
#[test]
fn test_assumed_location_not_carried() {
    let mut registry = two_frames();
    let body = EntityId(1);
    registry.register(body, ObjectType::Player, A, GridCoord::new(1, 1, 0)).unwrap();

    let carrier = MockCarrier::new().carry(EntityId(50), EntityId(51));

    assert_eq!(
        registry.assumed_location::<Server, _>(body, &carrier).unwrap(),
        GridCoord::new(1, 1, 0)
    );
    assert_eq!(
        registry.assumed_location::<Client, _>(body, &NoCarry).unwrap(),
        GridCoord::new(1, 1, 0)
    );
}

/// A body in a bag in a locker resolves to the locker.
#[test]
fn test_assumed_location_nested_carriers() {
    let mut registry = two_frames();
    let (body, bag, locker) = (EntityId(1), EntityId(2), EntityId(3));
    registry.register(body, ObjectType::Player, A, GridCoord::ZERO).unwrap();
    registry.register(bag, ObjectType::Item, A, GridCoord::ZERO).unwrap();
    registry.register(locker, ObjectType::Object, A, GridCoord::new(9, 2, 0)).unwrap();
    registry.hide_server(body).unwrap();
    registry.hide_server(bag).unwrap();

    let carrier = MockCarrier::new().carry(body, bag).carry(bag, locker);

    assert_eq!(
        registry.assumed_location::<Server, _>(body, &carrier).unwrap(),
        GridCoord::new(9, 2, 0)
    );
}

/// The chain limit from configuration stops the walk.
#[test]
fn test_assumed_location_depth_limit() {
    let config = RegistryConfig::from_toml_str(
        r#"
        max_carry_depth = 1

        [[frames]]
        id = 0
        net_id = 100
        "#,
    )
    .unwrap();
    let mut registry = Registry::from_config(&config).unwrap();
    for (i, x) in [(1, 1), (2, 2), (3, 3)] {
        registry
            .register(EntityId(i), ObjectType::Item, A, GridCoord::new(x, 0, 0))
            .unwrap();
    }
    let carrier = MockCarrier::new()
        .carry(EntityId(1), EntityId(2))
        .carry(EntityId(2), EntityId(3));

    assert_eq!(
        registry.assumed_location::<Server, _>(EntityId(1), &carrier).unwrap(),
        GridCoord::new(2, 0, 0)
    );
}

/// An unbound carrier is skipped in favour of the entity's own position.
#[test]
fn test_assumed_location_unbound_carrier() {
    let mut registry = two_frames();
    registry.register(EntityId(1), ObjectType::Item, A, GridCoord::new(4, 0, 0)).unwrap();
    registry.spawn(EntityId(2), ObjectType::Player).unwrap();

    let carrier = MockCarrier::new().carry(EntityId(1), EntityId(2));

    assert_eq!(
        registry.assumed_location::<Server, _>(EntityId(1), &carrier).unwrap(),
        GridCoord::new(4, 0, 0)
    );
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Destroy cleans both indices even when the views disagree.
#[test]
fn test_destroy_cleans_both_views() {
    let mut registry = two_frames();
    let e = EntityId(1);
    registry.register(e, ObjectType::Wire, A, GridCoord::new(0, 0, 0)).unwrap();
    registry.set_client_position(e, GridCoord::new(0, 1, 0)).unwrap();

    let removed = registry.destroy(e).unwrap();

    assert_eq!(removed.binding(), Binding::Removed);
    assert!(registry.frame(A).unwrap().server_index().is_empty());
    assert!(registry.frame(A).unwrap().client_index().is_empty());
    registry.verify_consistency().unwrap();
}

/// Full lifecycle emits events in order.
#[test]
fn test_lifecycle_events() {
    let mut registry = two_frames();
    let e = EntityId(1);

    registry.spawn(e, ObjectType::Item).unwrap();
    registry.attach(e, A, GridCoord::new(1, 0, 0)).unwrap();
    registry.set_parent_frame(e, B).unwrap();
    registry.destroy(e).unwrap();

    assert_eq!(
        registry.drain_events(),
        vec![
            RegistrationEvent::Attached { entity: e, frame: A },
            RegistrationEvent::ParentChanging { entity: e, from: A, to: B },
            RegistrationEvent::ParentChanged { entity: e, from: A, to: B },
            RegistrationEvent::Destroyed { entity: e, frame: Some(B) },
        ]
    );
}

/// Moving an entity between two shards keeps positions and passability.
#[test]
fn test_shard_handoff() {
    let mut west = two_frames();
    let mut east = Registry::new();
    east.add_frame(ReferenceFrame::new(FrameId(5), NetId(500), "East")).unwrap();

    let e = EntityId(1);
    west.spawn_with(e, ObjectType::Object, Passability::SOLID).unwrap();
    west.attach(e, A, GridCoord::new(3, 3, 0)).unwrap();
    west.hide_client(e).unwrap();

    let handoff = west.take(e).unwrap();
    assert!(!west.contains(e));
    assert!(west.frame(A).unwrap().server_index().is_empty());

    east.adopt(handoff, FrameId(5)).unwrap();

    let reg = east.registration(e).unwrap();
    assert_eq!(reg.frame(), Some(FrameId(5)));
    assert_eq!(reg.server_position(), GridCoord::new(3, 3, 0));
    assert!(reg.is_hidden::<Client>());
    assert_eq!(reg.passability(), Passability::SOLID);
    assert!(!east.is_passable::<Server>(FrameId(5), GridCoord::new(3, 3, 0)).unwrap());
    west.verify_consistency().unwrap();
    east.verify_consistency().unwrap();

    // Adopting twice is rejected.
    assert_eq!(east.adopt(handoff, FrameId(5)), Err(RegistryError::DuplicateEntity(e)));
}

// =============================================================================
// Directional Passability
// =============================================================================

/// A windoor on the east side of its cell blocks only that side.
#[test]
fn test_windoor_blocks_one_side() {
    let mut registry = two_frames();
    let door = GridCoord::new(2, 2, 0);
    let east = GridCoord::new(3, 2, 0);
    let west = GridCoord::new(1, 2, 0);
    let windoor = EntityId(1);
    registry
        .spawn_with(windoor, ObjectType::Object, Passability::edge(Edges::EAST))
        .unwrap();
    registry.attach(windoor, A, door).unwrap();

    // Walking west to east through the door is stopped at the east side.
    assert!(registry.can_move::<Server>(A, west, door).unwrap());
    assert!(!registry.can_move::<Server>(A, door, east).unwrap());
    assert!(!registry.can_move::<Server>(A, east, door).unwrap());
    assert!(!registry.is_atmos_passable_from::<Server>(A, east, door).unwrap());

    // A player standing in the doorway does not change that.
    registry.register(EntityId(2), ObjectType::Player, A, door).unwrap();
    assert!(!registry.can_move::<Client>(A, door, east).unwrap());
    assert!(registry.can_move::<Client>(A, door, west).unwrap());

    // Opening the windoor clears the side.
    registry.set_passability(windoor, Passability::OPEN).unwrap();
    assert!(registry.can_move::<Server>(A, door, east).unwrap());
    assert!(registry.is_atmos_passable_from::<Server>(A, east, door).unwrap());

    // Passability survives a frame change.
    registry.set_passability(windoor, Passability::edge(Edges::EAST)).unwrap();
    registry.set_parent_frame(windoor, B).unwrap();
    assert!(registry.can_move::<Server>(A, door, east).unwrap());
    assert!(!registry.can_move::<Server>(B, door, east).unwrap());
    registry.verify_consistency().unwrap();
}
