//! Brickfall - grid-addressable brick destruction engine
//!
//! Core modules:
//! - `sim`: Deterministic destruction engine (grid model, brick store,
//!   damage resolution, TNT/fuse area effects, collision dispatch)
//! - `level`: Level data exchange format shared with the editor
//!
//! Rendering, physics broad-phase, and editor UI live outside this crate.
//! They feed collisions in through [`sim::Engine::on_collision`] and drain
//! side effects back out through [`sim::EngineEvent`].

pub mod level;
pub mod sim;

pub use level::LevelData;
pub use sim::{Engine, EngineEvent};

/// Engine tuning constants
pub mod consts {
    /// Default cell width in pixels (full-size brick)
    pub const CELL_WIDTH: f32 = 64.0;
    /// Default cell height in pixels
    pub const CELL_HEIGHT: f32 = 32.0;
    /// Default gap between cells in pixels
    pub const CELL_PADDING: f32 = 4.0;

    /// Minimum time between accepted hits on the same brick
    pub const DEBOUNCE_WINDOW_MS: u64 = 50;
    /// Debounce entries older than this are prunable
    pub const DEBOUNCE_STALE_MS: u64 = 1_000;
    /// Prune the debounce map once it grows past this many entries
    pub const DEBOUNCE_PRUNE_THRESHOLD: usize = 100;

    /// Damage dealt by a TNT blast at rings 1 and 2
    pub const TNT_NEAR_DAMAGE: i32 = 5;
    /// Damage dealt by a TNT blast at ring 3
    pub const TNT_FAR_DAMAGE: i32 = 1;
    /// Blast rings beyond this deal no damage
    pub const TNT_MAX_RING: u32 = 3;
    /// Pixel-radius fallback for TNT bricks without grid coordinates
    pub const TNT_PIXEL_RADIUS: f32 = 80.0;

    /// Delay between sequential fuse-chain destruction steps
    pub const FUSE_STEP_MS: u64 = 100;

    /// Endless mode playfield is a fixed square grid of this many cells
    pub const ENDLESS_GRID_SIZE: u32 = 16;
}
