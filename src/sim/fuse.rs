//! Fuse chain-reaction resolution
//!
//! Fuse bricks have 1 HP and die to any hit. When one dies, the connected
//! component of fuse bricks (flood-fill over the 4 cardinal grid neighbors,
//! any fuse orientation) burns down sequentially: the triggering fuse
//! splashes and dies immediately, the rest are scheduled at fixed
//! increments in BFS visitation order. Each step re-validates that its
//! brick is still alive, splashes 1 damage into the cardinal neighbors
//! (fuse and unbreakable neighbors are immune), then destroys the fuse.
//!
//! Splash kills route through the victim's own destruction path, so a TNT
//! neighbor detonates and a fuse neighbor starts its own chain - recursion
//! bounded by the per-pass processed set.

use std::collections::{HashSet, VecDeque};

use crate::consts::FUSE_STEP_MS;

use super::brick::{BrickId, BrickKind};
use super::engine::{EffectKind, EffectPass, Engine};
use super::grid::GridCoord;

impl Engine {
    /// Start a chain reaction from the fuse brick `id`, which has just
    /// reached zero health.
    pub(crate) fn trigger_chain(&mut self, id: BrickId, pass: &mut EffectPass) {
        if !pass.mark(id) {
            return;
        }
        let Some(brick) = self.store.get(id) else {
            return;
        };
        let Some(origin) = brick.grid else {
            // No grid coordinates: cannot participate in chain detection,
            // dies alone
            self.destroy_brick(id, pass);
            return;
        };

        let component = self.fuse_component(origin);

        // The trigger splashes right away; the rest of the chain burns on a
        // visible delay, ordered by BFS distance from the trigger
        self.splash_neighbors(origin, pass);
        self.destroy_brick(id, pass);

        let mut delay_steps = 0u64;
        for fid in component {
            if fid == id || pass.contains(fid) {
                continue;
            }
            if self.fuse_queue.iter().any(|s| s.brick == fid) {
                continue;
            }
            delay_steps += 1;
            let due_ms = self.now_ms + delay_steps * FUSE_STEP_MS;
            self.schedule_fuse_step(fid, due_ms);
            pass.mark(fid);
        }
    }

    /// Fire one scheduled cascade step: re-validate, splash, destroy.
    pub(crate) fn fire_fuse_step(&mut self, id: BrickId, pass: &mut EffectPass) {
        let Some(brick) = self.store.get(id) else {
            return; // already gone, e.g. eaten by a TNT blast
        };
        let coord = brick.grid;
        let pos = brick.pos;
        pass.mark(id);
        self.push_effect(EffectKind::FuseBurst, pos);
        if let Some(coord) = coord {
            self.splash_neighbors(coord, pass);
        }
        self.destroy_brick(id, pass);
    }

    /// Connected component of fuse bricks reachable from `origin` over
    /// cardinal adjacency, in BFS visitation order (origin's occupants
    /// first). Connectivity is type-based: orientation never matters.
    fn fuse_component(&self, origin: GridCoord) -> Vec<BrickId> {
        let mut seen_cells: HashSet<GridCoord> = HashSet::new();
        let mut queue: VecDeque<GridCoord> = VecDeque::new();
        let mut component = Vec::new();

        seen_cells.insert(origin);
        queue.push_back(origin);

        while let Some(cell) = queue.pop_front() {
            for occupant in self.store.occupants_of(cell) {
                if occupant.kind.is_fuse() {
                    component.push(occupant.id);
                }
            }
            // Only cells known to hold a fuse ever enter the queue
            for neighbor in cell.cardinal_neighbors() {
                if seen_cells.insert(neighbor) {
                    let has_fuse = self
                        .store
                        .occupants_of(neighbor)
                        .any(|b| b.kind.is_fuse());
                    if has_fuse {
                        queue.push_back(neighbor);
                    }
                }
            }
        }
        component
    }

    /// Cardinal-neighbor splash: 1 damage to every adjacent entity that is
    /// neither a fuse nor unbreakable. Both halves of a split cell count.
    fn splash_neighbors(&mut self, cell: GridCoord, pass: &mut EffectPass) {
        let victims: Vec<BrickId> = cell
            .cardinal_neighbors()
            .flat_map(|n| self.store.occupants_of(n))
            .filter(|b| !b.kind.is_fuse() && b.kind != BrickKind::Unbreakable)
            .map(|b| b.id)
            .collect();
        for vid in victims {
            self.deal_area_damage(vid, 1, false, pass);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FUSE_STEP_MS;
    use crate::sim::brick::Brick;
    use crate::sim::engine::{BallContact, Engine, EngineEvent};
    use crate::sim::grid::CellMetrics;
    use crate::sim::store::BrickStore;
    use glam::Vec2;

    fn fuse_at(store: &mut BrickStore, metrics: &CellMetrics, col: u32, row: u32) -> BrickId {
        let id = store.next_id();
        let mut b = Brick::new(id, BrickKind::FuseHorizontal);
        b.grid = Some(GridCoord::new(col, row));
        b.pos = metrics.to_pixel(GridCoord::new(col, row), None);
        store.add(b).unwrap()
    }

    fn normal_at(
        store: &mut BrickStore,
        metrics: &CellMetrics,
        col: u32,
        row: u32,
        hp: i32,
    ) -> BrickId {
        let id = store.next_id();
        let mut b = Brick::new(id, BrickKind::Normal);
        b.grid = Some(GridCoord::new(col, row));
        b.pos = metrics.to_pixel(GridCoord::new(col, row), None);
        b.health = hp;
        b.max_health = hp;
        store.add(b).unwrap()
    }

    fn engine_with(store: BrickStore) -> Engine {
        Engine::new(store, CellMetrics::default(), 16, 16, Default::default(), Default::default(), 7)
    }

    fn hit(engine: &mut Engine, id: BrickId, now: u64) {
        let ball = BallContact {
            pos: Vec2::ZERO,
            vel: Vec2::new(100.0, -100.0),
        };
        engine.on_collision(id, &ball, now);
    }

    #[test]
    fn linear_chain_burns_end_to_end_with_increasing_delays() {
        let metrics = CellMetrics::default();
        let mut store = BrickStore::new();
        let fuses: Vec<_> = (0..5).map(|c| fuse_at(&mut store, &metrics, c, 0)).collect();
        let mut engine = engine_with(store);

        hit(&mut engine, fuses[0], 1_000);
        // Trigger dies immediately, the other four are pending
        assert!(engine.store.get(fuses[0]).is_none());
        for &f in &fuses[1..] {
            assert!(engine.store.get(f).is_some());
        }

        // Walk time forward; destruction times strictly increase down the
        // line. The trigger died at t=1000 before the walk begins.
        let mut destroyed_at = vec![(0usize, 1_000u64)];
        for step in 1..=4u64 {
            let now = 1_000 + step * FUSE_STEP_MS;
            engine.update(now);
            for (i, &f) in fuses.iter().enumerate() {
                if engine.store.get(f).is_none() && !destroyed_at.iter().any(|&(j, _)| j == i) {
                    destroyed_at.push((i, now));
                }
            }
        }
        assert_eq!(destroyed_at.len(), 5);
        for w in destroyed_at.windows(2) {
            assert!(w[0].1 < w[1].1);
            assert!(w[0].0 < w[1].0);
        }
        assert!(engine.store.is_empty());
    }

    #[test]
    fn orientation_is_cosmetic_for_connectivity() {
        let metrics = CellMetrics::default();
        let mut store = BrickStore::new();
        let a = fuse_at(&mut store, &metrics, 0, 0);
        let id = store.next_id();
        let mut b = Brick::new(id, BrickKind::FuseLeftDown);
        b.grid = Some(GridCoord::new(1, 0));
        let b = store.add(b).unwrap();
        let mut engine = engine_with(store);

        hit(&mut engine, a, 0);
        engine.update(FUSE_STEP_MS);
        assert!(engine.store.get(b).is_none());
    }

    #[test]
    fn splash_damages_cardinal_non_fuse_neighbors() {
        let metrics = CellMetrics::default();
        let mut store = BrickStore::new();
        let fuse = fuse_at(&mut store, &metrics, 5, 5);
        let above = normal_at(&mut store, &metrics, 5, 4, 2);
        let left = normal_at(&mut store, &metrics, 4, 5, 1);
        let diagonal = normal_at(&mut store, &metrics, 4, 4, 1);
        let mut engine = engine_with(store);

        hit(&mut engine, fuse, 0);
        // Cardinal neighbors took 1 splash damage
        assert_eq!(engine.store.get(above).unwrap().health, 1);
        assert!(engine.store.get(left).is_none());
        // Diagonal untouched
        assert_eq!(engine.store.get(diagonal).unwrap().health, 1);
    }

    #[test]
    fn splash_hits_both_halves_of_a_split_cell() {
        use crate::sim::grid::HalfSlot;

        let metrics = CellMetrics::default();
        let mut store = BrickStore::new();
        let fuse = fuse_at(&mut store, &metrics, 2, 2);
        let mut halves = Vec::new();
        for slot in [HalfSlot::Left, HalfSlot::Right] {
            let id = store.next_id();
            let mut b = Brick::new(id, BrickKind::Normal);
            b.grid = Some(GridCoord::new(3, 2));
            b.half = Some(slot);
            b.pos = metrics.to_pixel(GridCoord::new(3, 2), Some(slot));
            b.health = 2;
            b.max_health = 2;
            halves.push(store.add(b).unwrap());
        }
        let mut engine = engine_with(store);

        hit(&mut engine, fuse, 0);
        // Both half-size occupants of the neighbor cell took 1 splash damage
        for id in halves {
            assert_eq!(engine.store.get(id).unwrap().health, 1);
        }
    }

    #[test]
    fn unbreakable_neighbor_immune_to_splash() {
        let metrics = CellMetrics::default();
        let mut store = BrickStore::new();
        let fuse = fuse_at(&mut store, &metrics, 2, 2);
        let id = store.next_id();
        let mut wall = Brick::new(id, BrickKind::Unbreakable);
        wall.grid = Some(GridCoord::new(3, 2));
        let wall = store.add(wall).unwrap();
        let mut engine = engine_with(store);

        hit(&mut engine, fuse, 0);
        assert_eq!(engine.store.get(wall).unwrap().health, 1);
    }

    #[test]
    fn splash_detonates_adjacent_tnt() {
        let metrics = CellMetrics::default();
        let mut store = BrickStore::new();
        let fuse = fuse_at(&mut store, &metrics, 2, 2);
        let id = store.next_id();
        let mut tnt = Brick::new(id, BrickKind::Tnt);
        tnt.grid = Some(GridCoord::new(2, 3));
        tnt.pos = metrics.to_pixel(GridCoord::new(2, 3), None);
        let tnt = store.add(tnt).unwrap();
        // Victim in the TNT's ring 1 but two cells from the fuse
        let victim = normal_at(&mut store, &metrics, 2, 4, 3);
        let mut engine = engine_with(store);

        hit(&mut engine, fuse, 0);
        assert!(engine.store.get(tnt).is_none());
        assert!(engine.store.get(victim).is_none());
    }

    #[test]
    fn fuse_without_grid_dies_alone() {
        let metrics = CellMetrics::default();
        let mut store = BrickStore::new();
        let id = store.next_id();
        let loner = store.add(Brick::new(id, BrickKind::FuseVertical)).unwrap();
        let other = fuse_at(&mut store, &metrics, 0, 0);
        let mut engine = engine_with(store);

        hit(&mut engine, loner, 0);
        assert!(engine.store.get(loner).is_none());
        // Unconnected fuse untouched, nothing scheduled
        engine.update(10 * FUSE_STEP_MS);
        assert!(engine.store.get(other).is_some());
    }

    #[test]
    fn pending_steps_survive_until_due_and_skip_dead_bricks() {
        let metrics = CellMetrics::default();
        let mut store = BrickStore::new();
        let a = fuse_at(&mut store, &metrics, 0, 0);
        let b = fuse_at(&mut store, &metrics, 1, 0);
        let mut engine = engine_with(store);

        hit(&mut engine, a, 0);
        // Kill b out of band before its step fires
        engine.store.remove(b);
        engine.update(FUSE_STEP_MS);
        // No panic, no event for b beyond what already happened
        let events = engine.drain_events();
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, EngineEvent::Destroyed { id, .. } if *id == b))
        );
    }

    #[test]
    fn adjacent_fuses_never_double_schedule() {
        let metrics = CellMetrics::default();
        let mut store = BrickStore::new();
        let a = fuse_at(&mut store, &metrics, 0, 0);
        let b = fuse_at(&mut store, &metrics, 1, 0);
        let c = fuse_at(&mut store, &metrics, 2, 0);
        let mut engine = engine_with(store);

        hit(&mut engine, a, 0);
        assert_eq!(engine.pending_fuse_steps(), 2);
        // Burn everything down
        engine.update(2 * FUSE_STEP_MS);
        assert!(engine.store.get(b).is_none());
        assert!(engine.store.get(c).is_none());
        assert_eq!(engine.pending_fuse_steps(), 0);
    }
}
