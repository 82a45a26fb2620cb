//! Brick entity store
//!
//! Owns every live brick for the current playfield, indexed two ways:
//! by identity for collision dispatch, and by grid cell for area-effect
//! queries. The grid index is maintained incrementally on every add,
//! remove, and move - a destroyed brick must vanish from spatial queries
//! immediately, even in the middle of a cascade.

use std::collections::{BTreeMap, HashMap};

use super::brick::{Brick, BrickId};
use super::grid::{CellMetrics, GridCoord, HalfSlot};

/// Occupancy of one cell: either a full-size brick or up to two halves
#[derive(Debug, Clone, Copy, Default)]
struct CellSlots {
    full: Option<BrickId>,
    left: Option<BrickId>,
    right: Option<BrickId>,
}

impl CellSlots {
    fn is_empty(&self) -> bool {
        self.full.is_none() && self.left.is_none() && self.right.is_none()
    }
}

/// The mutable collection of live bricks
#[derive(Debug, Default)]
pub struct BrickStore {
    // BTreeMap keeps iteration order stable by id for determinism
    bricks: BTreeMap<BrickId, Brick>,
    grid: HashMap<GridCoord, CellSlots>,
    next_id: BrickId,
}

impl BrickStore {
    pub fn new() -> Self {
        Self {
            bricks: BTreeMap::new(),
            grid: HashMap::new(),
            next_id: 1,
        }
    }

    /// Allocate a fresh brick id
    pub fn next_id(&mut self) -> BrickId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn len(&self) -> usize {
        self.bricks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bricks.is_empty()
    }

    pub fn get(&self, id: BrickId) -> Option<&Brick> {
        self.bricks.get(&id)
    }

    pub fn get_mut(&mut self, id: BrickId) -> Option<&mut Brick> {
        self.bricks.get_mut(&id)
    }

    /// All live bricks in stable id order
    pub fn all(&self) -> impl Iterator<Item = &Brick> {
        self.bricks.values()
    }

    /// Insert a brick, indexing its cell if it has grid coordinates.
    ///
    /// Rejects placements that would mix a full-size brick with half-size
    /// occupants in the same cell, or land on an occupied slot. Invalid
    /// placements are a level-data problem: logged and dropped, never fatal.
    pub fn add(&mut self, brick: Brick) -> Option<BrickId> {
        let id = brick.id;
        if self.bricks.contains_key(&id) {
            log::warn!("duplicate brick id {id}, dropping");
            return None;
        }

        if let Some(coord) = brick.grid {
            let slots = self.grid.entry(coord).or_default();
            let blocked = match brick.half {
                None => !slots.is_empty(),
                Some(_) => slots.full.is_some(),
            };
            let taken = match brick.half {
                None => false,
                Some(HalfSlot::Left) => slots.left.is_some(),
                Some(HalfSlot::Right) => slots.right.is_some(),
            };
            if blocked || taken {
                log::warn!(
                    "cell ({},{}) occupancy conflict, dropping brick {id}",
                    coord.col,
                    coord.row
                );
                if slots.is_empty() {
                    self.grid.remove(&coord);
                }
                return None;
            }
            match brick.half {
                None => slots.full = Some(id),
                Some(HalfSlot::Left) => slots.left = Some(id),
                Some(HalfSlot::Right) => slots.right = Some(id),
            }
        }

        self.next_id = self.next_id.max(id + 1);
        self.bricks.insert(id, brick);
        Some(id)
    }

    /// Remove a brick and unindex its cell. Returns the removed brick.
    pub fn remove(&mut self, id: BrickId) -> Option<Brick> {
        let brick = self.bricks.remove(&id)?;
        if let Some(coord) = brick.grid {
            self.unindex(coord, id);
        }
        Some(brick)
    }

    /// Look up a cell occupant. A slot-less query returns only a full-size
    /// occupant; half-slot queries see only that half.
    pub fn find_by_grid(&self, coord: GridCoord, half: Option<HalfSlot>) -> Option<&Brick> {
        let slots = self.grid.get(&coord)?;
        let id = match half {
            None => slots.full,
            Some(HalfSlot::Left) => slots.left,
            Some(HalfSlot::Right) => slots.right,
        }?;
        self.bricks.get(&id)
    }

    /// Every brick occupying a cell: the full-size occupant, or both halves.
    /// Used by fuse splash, which damages each adjacent entity.
    pub fn occupants_of(&self, coord: GridCoord) -> impl Iterator<Item = &Brick> {
        let slots = self.grid.get(&coord).copied().unwrap_or_default();
        [slots.full, slots.left, slots.right]
            .into_iter()
            .flatten()
            .filter_map(|id| self.bricks.get(&id))
    }

    /// Reposition a brick to a new cell, keeping its half-slot, and
    /// recompute its pixel center. Used by the endless-mode row shift.
    /// Fails (logged) if the destination is occupied.
    pub fn move_to(&mut self, id: BrickId, coord: GridCoord, metrics: &CellMetrics) -> bool {
        let Some((half, old)) = self.bricks.get(&id).map(|b| (b.half, b.grid)) else {
            return false;
        };

        let dest = self.grid.get(&coord).copied().unwrap_or_default();
        let blocked = match half {
            None => !dest.is_empty(),
            Some(HalfSlot::Left) => dest.full.is_some() || dest.left.is_some(),
            Some(HalfSlot::Right) => dest.full.is_some() || dest.right.is_some(),
        };
        if blocked {
            log::warn!(
                "move of brick {id} into occupied cell ({},{})",
                coord.col,
                coord.row
            );
            return false;
        }

        if let Some(old) = old {
            self.unindex(old, id);
        }
        let slots = self.grid.entry(coord).or_default();
        match half {
            None => slots.full = Some(id),
            Some(HalfSlot::Left) => slots.left = Some(id),
            Some(HalfSlot::Right) => slots.right = Some(id),
        }

        if let Some(brick) = self.bricks.get_mut(&id) {
            brick.grid = Some(coord);
            brick.pos = metrics.to_pixel(coord, half);
        }
        true
    }

    fn unindex(&mut self, coord: GridCoord, id: BrickId) {
        if let Some(slots) = self.grid.get_mut(&coord) {
            if slots.full == Some(id) {
                slots.full = None;
            }
            if slots.left == Some(id) {
                slots.left = None;
            }
            if slots.right == Some(id) {
                slots.right = None;
            }
            if slots.is_empty() {
                self.grid.remove(&coord);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::brick::BrickKind;

    fn brick_at(id: BrickId, col: u32, row: u32, half: Option<HalfSlot>) -> Brick {
        let mut b = Brick::new(id, BrickKind::Normal);
        b.grid = Some(GridCoord::new(col, row));
        b.half = half;
        b
    }

    #[test]
    fn add_and_find_full() {
        let mut store = BrickStore::new();
        store.add(brick_at(1, 2, 3, None)).unwrap();
        assert!(store.find_by_grid(GridCoord::new(2, 3), None).is_some());
        // Slot queries don't see full occupants
        assert!(
            store
                .find_by_grid(GridCoord::new(2, 3), Some(HalfSlot::Left))
                .is_none()
        );
    }

    #[test]
    fn half_slot_exclusivity() {
        let mut store = BrickStore::new();
        store.add(brick_at(1, 0, 0, Some(HalfSlot::Left))).unwrap();
        // Full-size into a half-occupied cell is rejected
        assert!(store.add(brick_at(2, 0, 0, None)).is_none());
        // Second half in the other slot is fine
        store.add(brick_at(3, 0, 0, Some(HalfSlot::Right))).unwrap();
        // Same slot twice is rejected
        assert!(store.add(brick_at(4, 0, 0, Some(HalfSlot::Right))).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn full_blocks_halves() {
        let mut store = BrickStore::new();
        store.add(brick_at(1, 0, 0, None)).unwrap();
        assert!(store.add(brick_at(2, 0, 0, Some(HalfSlot::Left))).is_none());
    }

    #[test]
    fn remove_unindexes_immediately() {
        let mut store = BrickStore::new();
        store.add(brick_at(1, 5, 5, None)).unwrap();
        store.remove(1);
        assert!(store.find_by_grid(GridCoord::new(5, 5), None).is_none());
        assert_eq!(store.occupants_of(GridCoord::new(5, 5)).count(), 0);
        // Cell is free again
        store.add(brick_at(2, 5, 5, Some(HalfSlot::Left))).unwrap();
    }

    #[test]
    fn occupants_of_returns_both_halves() {
        let mut store = BrickStore::new();
        store.add(brick_at(1, 1, 1, Some(HalfSlot::Left))).unwrap();
        store.add(brick_at(2, 1, 1, Some(HalfSlot::Right))).unwrap();
        let ids: Vec<_> = store.occupants_of(GridCoord::new(1, 1)).map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn move_to_reindexes_and_repositions() {
        let mut store = BrickStore::new();
        let metrics = CellMetrics::default();
        store.add(brick_at(1, 0, 0, None)).unwrap();
        assert!(store.move_to(1, GridCoord::new(0, 1), &metrics));
        assert!(store.find_by_grid(GridCoord::new(0, 0), None).is_none());
        let moved = store.find_by_grid(GridCoord::new(0, 1), None).unwrap();
        assert_eq!(moved.pos, metrics.to_pixel(GridCoord::new(0, 1), None));
    }

    #[test]
    fn move_to_occupied_fails() {
        let mut store = BrickStore::new();
        let metrics = CellMetrics::default();
        store.add(brick_at(1, 0, 0, None)).unwrap();
        store.add(brick_at(2, 0, 1, None)).unwrap();
        assert!(!store.move_to(1, GridCoord::new(0, 1), &metrics));
        // Unmoved
        assert!(store.find_by_grid(GridCoord::new(0, 0), None).is_some());
    }

    #[test]
    fn ungridded_bricks_skip_the_index() {
        let mut store = BrickStore::new();
        let b = Brick::new(7, BrickKind::Tnt);
        store.add(b).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get(7).is_some());
    }
}
