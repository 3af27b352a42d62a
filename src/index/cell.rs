//! Per-frame occupancy index.
//!
//! Maps a grid coordinate to the entities currently occupying it. A
//! coordinate with no entry is an empty cell; cells are dropped from the
//! map as soon as their last occupant leaves, so the map only ever holds
//! occupied cells and never holds the hidden sentinel.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::marker::PhantomData;

use crate::core::{EntityId, GridCoord};

use super::view::View;

/// Occupants of one cell. Most cells hold a handful of entities
/// (floor item, a wire, a player), so keep them inline.
pub type CellOccupants = SmallVec<[EntityId; 4]>;

/// Occupancy index for one authority view of one frame.
///
/// ## Usage
///
/// ```
/// use tile_registry::core::{EntityId, GridCoord};
/// use tile_registry::index::{GridCellIndex, Server};
///
/// let mut index: GridCellIndex<Server> = GridCellIndex::new();
/// let cell = GridCoord::new(3, 4, 0);
///
/// index.add(cell, EntityId(1));
/// index.add(cell, EntityId(1)); // idempotent
/// assert_eq!(index.entities_at(cell), &[EntityId(1)]);
///
/// index.remove(cell, EntityId(1));
/// index.remove(cell, EntityId(1)); // no-op
/// assert!(index.entities_at(cell).is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct GridCellIndex<V: View> {
    cells: FxHashMap<GridCoord, CellOccupants>,
    _view: PhantomData<V>,
}

impl<V: View> Default for GridCellIndex<V> {
    fn default() -> Self {
        Self {
            cells: FxHashMap::default(),
            _view: PhantomData,
        }
    }
}

impl<V: View> GridCellIndex<V> {
    /// Create a new empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity into the cell at `coord`.
    ///
    /// Returns `true` if the entity was not already there. The hidden
    /// sentinel is rejected: hidden entities occupy no cell.
    pub fn add(&mut self, coord: GridCoord, entity: EntityId) -> bool {
        if coord.is_hidden() {
            tracing::warn!(%entity, view = V::NAME, "refusing to index hidden position");
            return false;
        }

        let occupants = self.cells.entry(coord).or_default();
        if occupants.contains(&entity) {
            return false;
        }
        occupants.push(entity);
        true
    }

    /// Remove an entity from the cell at `coord`.
    ///
    /// Returns `true` if it was there. Removing an absent pair is a no-op.
    pub fn remove(&mut self, coord: GridCoord, entity: EntityId) -> bool {
        let Some(occupants) = self.cells.get_mut(&coord) else {
            return false;
        };
        let Some(pos) = occupants.iter().position(|&e| e == entity) else {
            return false;
        };

        occupants.swap_remove(pos);
        if occupants.is_empty() {
            self.cells.remove(&coord);
        }
        true
    }

    /// Entities in the cell at `coord`, in no particular order.
    ///
    /// Empty for unknown coordinates.
    #[must_use]
    pub fn entities_at(&self, coord: GridCoord) -> &[EntityId] {
        self.cells.get(&coord).map_or(&[], |v| v.as_slice())
    }

    /// Check if an entity is in the cell at `coord`.
    #[must_use]
    pub fn contains(&self, coord: GridCoord, entity: EntityId) -> bool {
        self.entities_at(coord).contains(&entity)
    }

    /// Check if the cell at `coord` has no occupants.
    #[must_use]
    pub fn is_cell_empty(&self, coord: GridCoord) -> bool {
        !self.cells.contains_key(&coord)
    }

    /// Every cell holding `entity`. Linear in the index size; intended for
    /// consistency checks, not hot paths.
    pub fn cells_containing(&self, entity: EntityId) -> impl Iterator<Item = GridCoord> + '_ {
        self.cells
            .iter()
            .filter(move |(_, occupants)| occupants.contains(&entity))
            .map(|(&coord, _)| coord)
    }

    /// Iterate over occupied cells.
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, &[EntityId])> {
        self.cells.iter().map(|(&coord, occupants)| (coord, occupants.as_slice()))
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Total number of (cell, entity) entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.cells.values().map(|v| v.len()).sum()
    }

    /// Check if no cell is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
