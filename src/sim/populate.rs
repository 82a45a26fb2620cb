//! Level population
//!
//! Builds the brick store from parsed level data. Grid coordinates are
//! preferred; bricks that only carry legacy pixel positions are migrated
//! once by rounding against the cell dimensions. Pixel centers are always
//! recomputed from the grid afterwards, so layouts stay aligned even when
//! cell sizing differs between the editor and the runtime.
//!
//! Population is where the sim's input invariants are enforced: bricks that
//! land out of bounds or on occupied slots are logged and dropped here,
//! never inside the engine.

use super::brick::{Brick, Rgb};
use super::grid::{CellMetrics, GridCoord};
use super::store::BrickStore;
use crate::level::{BrickSpec, LevelData};

/// Cell metrics for a level, falling back to engine defaults
pub fn metrics_for(level: &LevelData) -> CellMetrics {
    let defaults = CellMetrics::default();
    CellMetrics::new(
        level.brick_width.unwrap_or(defaults.cell_w),
        level.brick_height.unwrap_or(defaults.cell_h),
        level.padding.unwrap_or(defaults.padding),
    )
}

/// Build a store from level data. Invalid bricks are dropped with a log
/// line; the result always satisfies the engine's invariants.
pub fn populate(level: &LevelData) -> (BrickStore, CellMetrics) {
    let metrics = metrics_for(level);
    let mut store = BrickStore::new();

    for spec in &level.bricks {
        let id = store.next_id();
        if let Some(brick) = build_brick(id, spec, level, &metrics) {
            store.add(brick); // occupancy conflicts logged by the store
        }
    }
    (store, metrics)
}

fn build_brick(
    id: u32,
    spec: &BrickSpec,
    level: &LevelData,
    metrics: &CellMetrics,
) -> Option<Brick> {
    let coord = match (spec.col, spec.row) {
        (Some(col), Some(row)) => {
            if col >= level.width || row >= level.height {
                log::warn!("brick at ({col},{row}) outside {}x{} level, dropping", level.width, level.height);
                return None;
            }
            Some(GridCoord::new(col, row))
        }
        _ => match (spec.x, spec.y) {
            (Some(x), Some(y)) => {
                // Legacy data: one-time pixel migration, clamped to bounds
                let coord =
                    metrics.coord_from_pixel(glam::Vec2::new(x, y), level.width, level.height);
                log::info!("migrated legacy brick at ({x},{y}) to ({},{})", coord.col, coord.row);
                Some(coord)
            }
            _ => {
                log::warn!("brick without grid or pixel position, dropping");
                return None;
            }
        },
    };

    let mut brick = Brick::new(id, spec.kind);
    brick.grid = coord;
    brick.half = spec.half;
    // Pixel position is always re-derived; stored x/y are never trusted
    if let Some(coord) = coord {
        brick.pos = metrics.to_pixel(coord, spec.half);
    }

    if brick.kind.is_fuse() {
        // Fuse bricks chain off a single hit; level data can't override that
        brick.health = 1;
        brick.max_health = 1;
    } else {
        let health = spec.health.unwrap_or(1).max(1);
        brick.max_health = spec.max_health.unwrap_or(health).max(health);
        brick.health = health;
    }
    brick.color = spec.color.unwrap_or(Rgb::WHITE);
    brick.drop_chance = spec.drop_chance.unwrap_or(0.0).clamp(0.0, 1.0);
    brick.coin_value = spec.coin_value.unwrap_or(0);
    brick.pair_id = spec.pair_id.clone();
    brick.required = spec.is_required.unwrap_or(true);
    brick.one_way = spec.is_one_way.unwrap_or(false);
    Some(brick)
}
