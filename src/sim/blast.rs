//! TNT blast-radius resolution
//!
//! Blast damage is keyed by "half-block distance": a metric over the
//! half-slots a brick occupies. A full-size brick occupies both slots of
//! its cell, a half-size brick only one, and the distance between two
//! bricks is the minimum over all their slot pairs. Column and row terms
//! combine by Chebyshev max, and the ring (damage tier) is the distance
//! rounded up.
//!
//! TNT detonates on any hit, bypassing the health path entirely, and the
//! whole blast resolves in one pass over a snapshot of the live bricks -
//! no distance re-evaluation mid-cascade. Neighboring TNT and fuse bricks
//! killed by the blast re-trigger recursively, guarded by the pass's
//! processed set.

use crate::consts::{TNT_FAR_DAMAGE, TNT_MAX_RING, TNT_NEAR_DAMAGE, TNT_PIXEL_RADIUS};

use super::brick::{BrickId, BrickKind};
use super::engine::{EffectKind, EffectPass, Engine};
use super::grid::{GridCoord, HalfSlot};

/// Half-block distance between two occupied slots, column axis only.
///
/// Same cell, different slots: 0.5. Across cells the distance grows by two
/// half-blocks per full column of gap, plus 0.5 when the slots face each
/// other (e.g. left brick's right half against right brick's left half)
/// or 1.5 otherwise.
fn column_distance(a_col: u32, a_slot: HalfSlot, b_col: u32, b_slot: HalfSlot) -> f32 {
    if a_col == b_col {
        return if a_slot == b_slot { 0.0 } else { 0.5 };
    }
    let (near_slot, far_slot, gap) = if a_col < b_col {
        (a_slot, b_slot, b_col - a_col)
    } else {
        (b_slot, a_slot, a_col - b_col)
    };
    let facing = near_slot == HalfSlot::Right && far_slot == HalfSlot::Left;
    (gap - 1) as f32 * 2.0 + if facing { 0.5 } else { 1.5 }
}

/// Minimum half-block distance between two bricks given their occupied
/// slots. Row distance contributes one half-block per row; the two axes
/// combine by Chebyshev (max), not Euclidean.
pub fn half_block_distance(
    a: GridCoord,
    a_slots: &[HalfSlot],
    b: GridCoord,
    b_slots: &[HalfSlot],
) -> f32 {
    let row_dist = a.row.abs_diff(b.row) as f32;
    let mut best = f32::INFINITY;
    for &sa in a_slots {
        for &sb in b_slots {
            let col_dist = column_distance(a.col, sa, b.col, sb);
            best = best.min(col_dist.max(row_dist));
        }
    }
    best
}

/// Blast ring for a half-block distance: the distance rounded up
#[inline]
pub fn ring(distance: f32) -> u32 {
    distance.ceil().max(1.0) as u32
}

/// Damage for a blast ring: 5 at rings 1-2, 1 at ring 3, nothing beyond
#[inline]
pub fn ring_damage(ring: u32) -> i32 {
    match ring {
        0 | 1 | 2 => TNT_NEAR_DAMAGE,
        3 => TNT_FAR_DAMAGE,
        _ => 0,
    }
}

impl Engine {
    /// Detonate the TNT brick `id`. The TNT itself dies first (and leaves
    /// the spatial index before any neighbor is evaluated), then every
    /// other live brick takes ring damage from a single snapshot pass.
    pub(crate) fn resolve_blast(&mut self, id: BrickId, pass: &mut EffectPass) {
        if !pass.mark(id) {
            return;
        }
        let Some(tnt) = self.store.get(id) else {
            return;
        };
        let origin_pos = tnt.pos;
        let origin = tnt.grid.map(|g| (g, tnt.occupied_slots()));

        self.push_effect(EffectKind::Explosion, origin_pos);
        self.destroy_brick(id, pass);

        match origin {
            Some((coord, slots)) => self.blast_from_grid(coord, slots, pass),
            None => {
                // Legacy brick without grid coordinates: approximate
                // pixel-radius blast, compatibility path
                log::debug!("TNT {id} has no grid coordinates, pixel fallback");
                self.blast_from_pixel(origin_pos, pass);
            }
        }
    }

    fn blast_from_grid(&mut self, origin: GridCoord, slots: &[HalfSlot], pass: &mut EffectPass) {
        // Snapshot before mutating: bricks destroyed mid-pass (chained TNT,
        // fuse cascades) simply fail the liveness re-check later
        let targets: Vec<(BrickId, GridCoord, &[HalfSlot], BrickKind)> = self
            .store
            .all()
            .filter_map(|b| b.grid.map(|g| (b.id, g, b.occupied_slots(), b.kind)))
            .collect();

        for (tid, coord, tslots, kind) in targets {
            let dist = half_block_distance(origin, slots, coord, tslots);
            let ring = ring(dist);
            if kind == BrickKind::Unbreakable {
                // Destroyable at ring 1 only; beyond that unbreakables are
                // skipped outright - no damage, no visual feedback
                if dist <= 1.0 {
                    self.deal_area_damage(tid, i32::MAX, true, pass);
                }
                continue;
            }
            if ring > TNT_MAX_RING {
                continue;
            }
            self.deal_area_damage(tid, ring_damage(ring), false, pass);
        }
    }

    fn blast_from_pixel(&mut self, center: glam::Vec2, pass: &mut EffectPass) {
        let targets: Vec<BrickId> = self
            .store
            .all()
            .filter(|b| b.kind != BrickKind::Unbreakable)
            .filter(|b| b.pos.distance(center) <= TNT_PIXEL_RADIUS)
            .map(|b| b.id)
            .collect();
        for tid in targets {
            self.deal_area_damage(tid, TNT_NEAR_DAMAGE, false, pass);
        }
    }
}
