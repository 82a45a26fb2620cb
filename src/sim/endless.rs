//! Endless-mode population
//!
//! Endless mode plays on a fixed 16x16 grid. The initial board is filled
//! from a procedurally generated shape (rectangle, ellipse, triangle,
//! diamond, or cross, filled or outline). On each advance trigger the whole
//! grid shifts down one row: rows falling off the bottom edge are discarded
//! (each discarded required brick costs one life) and a freshly randomized
//! row drops in at the top.

use rand::Rng;
use rand_pcg::Pcg32;

use super::brick::{Brick, BrickKind, Rgb};
use super::engine::{Engine, EngineEvent};
use super::grid::GridCoord;

/// Procedural shape families for the endless board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Triangle,
    Diamond,
    Cross,
}

/// A generated shape: family plus filled-vs-outline rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeSpec {
    pub kind: ShapeKind,
    pub filled: bool,
}

impl ShapeSpec {
    pub fn random(rng: &mut Pcg32) -> Self {
        let kind = match rng.random_range(0..5u8) {
            0 => ShapeKind::Rectangle,
            1 => ShapeKind::Ellipse,
            2 => ShapeKind::Triangle,
            3 => ShapeKind::Diamond,
            _ => ShapeKind::Cross,
        };
        Self {
            kind,
            filled: rng.random::<bool>(),
        }
    }

    fn member(&self, col: u32, row: u32, size: u32) -> bool {
        let c = (size as f32 - 1.0) / 2.0;
        let (x, y) = (col as f32, row as f32);
        match self.kind {
            ShapeKind::Rectangle => true,
            ShapeKind::Ellipse => {
                let r = size as f32 / 2.0;
                let dx = (x - c) / r;
                let dy = (y - c) / r;
                dx * dx + dy * dy <= 1.0
            }
            // Apex at the top row, full width on the bottom row
            ShapeKind::Triangle => {
                let half_width = y / (size as f32 - 1.0) * c + 0.5;
                (x - c).abs() <= half_width
            }
            ShapeKind::Diamond => (x - c).abs() + (y - c).abs() <= c + 0.5,
            ShapeKind::Cross => {
                let arm = size as f32 / 6.0;
                (x - c).abs() <= arm || (y - c).abs() <= arm
            }
        }
    }

    /// Cells of the shape on a `size` x `size` grid, row-major. Outline
    /// shapes keep only member cells bordering a non-member (or the grid
    /// edge).
    pub fn cells(&self, size: u32) -> Vec<GridCoord> {
        let mut out = Vec::new();
        for row in 0..size {
            for col in 0..size {
                if !self.member(col, row, size) {
                    continue;
                }
                if self.filled {
                    out.push(GridCoord::new(col, row));
                    continue;
                }
                let on_edge = col == 0 || row == 0 || col == size - 1 || row == size - 1;
                let has_gap = GridCoord::new(col, row)
                    .cardinal_neighbors()
                    .any(|n| n.col >= size || n.row >= size || !self.member(n.col, n.row, size));
                if on_edge || has_gap {
                    out.push(GridCoord::new(col, row));
                }
            }
        }
        out
    }
}

/// Small fixed palette for generated bricks
const ENDLESS_PALETTE: [Rgb; 5] = [
    Rgb { r: 0xe9, g: 0x4f, b: 0x37 },
    Rgb { r: 0xf3, g: 0xa7, b: 0x12 },
    Rgb { r: 0x44, g: 0xaf, b: 0x69 },
    Rgb { r: 0x3a, g: 0x86, b: 0xff },
    Rgb { r: 0x8e, g: 0x44, b: 0xad },
];

fn random_endless_brick(id: u32, coord: GridCoord, rng: &mut Pcg32) -> Brick {
    let roll = rng.random_range(0..100u32);
    let kind = if roll < 70 {
        BrickKind::Normal
    } else if roll < 85 {
        BrickKind::Metal
    } else if roll < 93 {
        BrickKind::Gold
    } else if roll < 97 {
        BrickKind::Tnt
    } else {
        BrickKind::FuseHorizontal
    };
    let mut brick = Brick::new(id, kind);
    brick.grid = Some(coord);
    let hp = match kind {
        BrickKind::Metal => 3,
        _ => 1,
    };
    brick.health = hp;
    brick.max_health = hp;
    brick.coin_value = if kind == BrickKind::Gold { 5 } else { 1 };
    brick.drop_chance = 0.05;
    brick.color = ENDLESS_PALETTE[rng.random_range(0..ENDLESS_PALETTE.len())];
    brick
}

impl Engine {
    /// Fill an empty endless board from a randomly generated shape.
    pub fn seed_endless(&mut self) {
        let size = self.width.min(self.height);
        let spec = ShapeSpec::random(&mut self.rng);
        log::info!("endless board: {:?} filled={}", spec.kind, spec.filled);

        let mut added_required = 0u32;
        for coord in spec.cells(size) {
            let id = self.store.next_id();
            let mut brick = Brick::new(id, BrickKind::Normal);
            brick.grid = Some(coord);
            brick.pos = self.metrics.to_pixel(coord, None);
            brick.coin_value = 1;
            brick.drop_chance = 0.05;
            brick.color = ENDLESS_PALETTE[self.rng.random_range(0..ENDLESS_PALETTE.len())];
            if self.store.add(brick).is_some() {
                added_required += 1;
            }
        }
        self.note_required_added(added_required);
    }

    /// Shift the whole board down one row: discard the bottom row (a life
    /// per discarded required brick), move everything else, and inject a
    /// randomized new top row.
    pub fn advance_endless(&mut self) {
        let height = self.height;
        // Bottom-first so moves never land on a still-occupied cell
        let mut placed: Vec<(u32, GridCoord)> = self
            .store
            .all()
            .filter_map(|b| b.grid.map(|g| (b.id, g)))
            .collect();
        placed.sort_by(|a, b| b.1.row.cmp(&a.1.row).then(a.0.cmp(&b.0)));

        let mut lost = 0u32;
        for (id, coord) in placed {
            if coord.row + 1 >= height {
                if self.discard_brick(id) {
                    lost += 1;
                }
            } else {
                let metrics = self.metrics;
                self.store
                    .move_to(id, GridCoord::new(coord.col, coord.row + 1), &metrics);
            }
        }
        if lost > 0 {
            self.note_required_discarded(lost);
            self.push_event(EngineEvent::LivesLost(lost));
        }

        self.spawn_top_row();
    }

    fn spawn_top_row(&mut self) {
        let mut added_required = 0u32;
        for col in 0..self.width {
            if self.rng.random::<f32>() >= 0.55 {
                continue;
            }
            let coord = GridCoord::new(col, 0);
            let id = self.store.next_id();
            let mut brick = random_endless_brick(id, coord, &mut self.rng);
            brick.pos = self.metrics.to_pixel(coord, None);
            let counts = brick.counts_for_clear();
            if self.store.add(brick).is_some() && counts {
                added_required += 1;
            }
        }
        self.note_required_added(added_required);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::ENDLESS_GRID_SIZE;
    use crate::sim::grid::CellMetrics;
    use crate::sim::store::BrickStore;

    fn endless_engine(seed: u64) -> Engine {
        Engine::new(
            BrickStore::new(),
            CellMetrics::default(),
            ENDLESS_GRID_SIZE,
            ENDLESS_GRID_SIZE,
            Default::default(),
            Default::default(),
            seed,
        )
    }

    #[test]
    fn filled_rectangle_covers_the_grid() {
        let spec = ShapeSpec {
            kind: ShapeKind::Rectangle,
            filled: true,
        };
        assert_eq!(spec.cells(16).len(), 256);
    }

    #[test]
    fn outline_rectangle_is_the_border() {
        let spec = ShapeSpec {
            kind: ShapeKind::Rectangle,
            filled: false,
        };
        let cells = spec.cells(16);
        assert_eq!(cells.len(), 16 * 4 - 4);
        assert!(
            cells
                .iter()
                .all(|c| c.col == 0 || c.row == 0 || c.col == 15 || c.row == 15)
        );
    }

    #[test]
    fn diamond_is_symmetric_and_bounded() {
        let spec = ShapeSpec {
            kind: ShapeKind::Diamond,
            filled: true,
        };
        let cells = spec.cells(16);
        assert!(!cells.is_empty());
        // Corners are never part of a diamond
        assert!(!cells.contains(&GridCoord::new(0, 0)));
        assert!(!cells.contains(&GridCoord::new(15, 15)));
        // Horizontal mirror symmetry
        for c in &cells {
            assert!(cells.contains(&GridCoord::new(15 - c.col, c.row)));
        }
    }

    #[test]
    fn triangle_widens_downward() {
        let spec = ShapeSpec {
            kind: ShapeKind::Triangle,
            filled: true,
        };
        let cells = spec.cells(16);
        let width_of = |row: u32| cells.iter().filter(|c| c.row == row).count();
        assert!(width_of(0) < width_of(8));
        assert!(width_of(8) < width_of(15));
    }

    #[test]
    fn outline_cells_are_a_subset_of_filled() {
        for kind in [
            ShapeKind::Ellipse,
            ShapeKind::Diamond,
            ShapeKind::Cross,
            ShapeKind::Triangle,
        ] {
            let filled = ShapeSpec { kind, filled: true }.cells(16);
            let outline = ShapeSpec {
                kind,
                filled: false,
            }
            .cells(16);
            assert!(!outline.is_empty());
            assert!(outline.len() < filled.len());
            assert!(outline.iter().all(|c| filled.contains(c)));
        }
    }

    #[test]
    fn seeding_fills_the_board_and_counts_required() {
        let mut engine = endless_engine(11);
        engine.seed_endless();
        assert!(!engine.store.is_empty());
        assert_eq!(
            engine.required_remaining(),
            engine.store.all().filter(|b| b.counts_for_clear()).count() as u32
        );
    }

    #[test]
    fn advance_shifts_rows_down() {
        let mut engine = endless_engine(3);
        // One brick at the top, nothing else
        let id = engine.store.next_id();
        let mut b = Brick::new(id, BrickKind::Normal);
        b.grid = Some(GridCoord::new(4, 0));
        let id = engine.store.add(b).unwrap();
        engine.note_required_added(1);

        engine.advance_endless();
        let moved = engine.store.get(id).unwrap();
        assert_eq!(moved.grid, Some(GridCoord::new(4, 1)));
        // Row 0 now holds only freshly injected bricks
        for brick in engine.store.all() {
            if brick.id != id {
                assert_eq!(brick.grid.map(|g| g.row), Some(0));
            }
        }
    }

    #[test]
    fn bottom_row_discard_costs_lives() {
        let mut engine = endless_engine(5);
        let bottom = ENDLESS_GRID_SIZE - 1;
        for col in 0..3 {
            let id = engine.store.next_id();
            let mut b = Brick::new(id, BrickKind::Normal);
            b.grid = Some(GridCoord::new(col, bottom));
            engine.store.add(b).unwrap();
        }
        // One unbreakable in the bottom row costs nothing
        let id = engine.store.next_id();
        let mut wall = Brick::new(id, BrickKind::Unbreakable);
        wall.grid = Some(GridCoord::new(5, bottom));
        engine.store.add(wall).unwrap();
        engine.note_required_added(3);

        engine.advance_endless();
        let events = engine.drain_events();
        assert!(events.contains(&EngineEvent::LivesLost(3)));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, EngineEvent::Discarded { .. }))
                .count(),
            4
        );
        // Discards never read as destructions
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, EngineEvent::Destroyed { .. }))
        );
    }

    #[test]
    fn advance_is_deterministic_per_seed() {
        let mut a = endless_engine(99);
        let mut b = endless_engine(99);
        a.seed_endless();
        b.seed_endless();
        a.advance_endless();
        b.advance_endless();
        let ids_a: Vec<_> = a.store.all().map(|x| (x.id, x.grid, x.kind)).collect();
        let ids_b: Vec<_> = b.store.all().map(|x| (x.id, x.grid, x.kind)).collect();
        assert_eq!(ids_a, ids_b);
    }
}
