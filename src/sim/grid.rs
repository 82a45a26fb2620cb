//! Logical grid coordinates and pixel derivation
//!
//! Bricks are addressed two ways at once: the physics engine sees pixel-space
//! centers, area effects see logical grid cells. The grid is the source of
//! truth; pixel positions are always recomputed from it, so the editor and
//! the runtime derive identical layouts from the same stored coordinates.
//!
//! A cell holds either one full-size brick or up to two half-size bricks,
//! one per [`HalfSlot`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Logical address of a cell on the playfield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    pub col: u32,
    pub row: u32,
}

impl GridCoord {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// The four cardinal neighbors, clipped to non-negative coordinates
    pub fn cardinal_neighbors(&self) -> impl Iterator<Item = GridCoord> + '_ {
        let (c, r) = (self.col as i64, self.row as i64);
        [(c - 1, r), (c + 1, r), (c, r - 1), (c, r + 1)]
            .into_iter()
            .filter(|&(c, r)| c >= 0 && r >= 0)
            .map(|(c, r)| GridCoord::new(c as u32, r as u32))
    }
}

/// Sub-cell occupancy position for half-size bricks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HalfSlot {
    Left,
    Right,
}

/// Cell sizing shared by the editor and the runtime
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellMetrics {
    /// Full brick width in pixels
    pub cell_w: f32,
    /// Brick height in pixels
    pub cell_h: f32,
    /// Gap between cells (and between the two halves of a split cell)
    pub padding: f32,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            cell_w: crate::consts::CELL_WIDTH,
            cell_h: crate::consts::CELL_HEIGHT,
            padding: crate::consts::CELL_PADDING,
        }
    }
}

impl CellMetrics {
    pub fn new(cell_w: f32, cell_h: f32, padding: f32) -> Self {
        Self {
            cell_w,
            cell_h,
            padding,
        }
    }

    /// Width of one half-size brick: the cell splits into two equal halves
    /// with a gap equal to `padding` between them.
    #[inline]
    pub fn half_width(&self) -> f32 {
        (self.cell_w - self.padding) / 2.0
    }

    /// Pixel-space center of a brick at `coord` occupying `half`
    /// (`None` = full-size). Pure and deterministic.
    pub fn to_pixel(&self, coord: GridCoord, half: Option<HalfSlot>) -> Vec2 {
        let stride_x = self.cell_w + self.padding;
        let stride_y = self.cell_h + self.padding;
        let cell_left = coord.col as f32 * stride_x;
        let y = coord.row as f32 * stride_y + self.cell_h / 2.0;

        let x = match half {
            None => cell_left + self.cell_w / 2.0,
            Some(HalfSlot::Left) => cell_left + self.half_width() / 2.0,
            Some(HalfSlot::Right) => {
                let cell_center = cell_left + self.cell_w / 2.0;
                cell_center + self.padding / 2.0 + self.half_width() / 2.0
            }
        };

        Vec2::new(x, y)
    }

    /// Derive a grid coordinate from a legacy pixel-space center, clamped to
    /// `[0, width) x [0, height)`. One-time migration path for level data
    /// that predates grid addressing; not used in steady state.
    pub fn coord_from_pixel(&self, pos: Vec2, width: u32, height: u32) -> GridCoord {
        let stride_x = self.cell_w + self.padding;
        let stride_y = self.cell_h + self.padding;
        let col = ((pos.x - self.cell_w / 2.0) / stride_x).round().max(0.0) as u32;
        let row = ((pos.y - self.cell_h / 2.0) / stride_y).round().max(0.0) as u32;
        GridCoord::new(col.min(width.saturating_sub(1)), row.min(height.saturating_sub(1)))
    }
}
