//! Deterministic destruction engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (store keyed by brick ID)
//! - No rendering or platform dependencies
//!
//! The host game engine delivers physics collisions via
//! [`Engine::on_collision`], advances deferred fuse cascades via
//! [`Engine::update`], and drains [`EngineEvent`]s each frame.

pub mod blast;
pub mod brick;
pub mod damage;
pub mod debounce;
pub mod endless;
pub mod engine;
pub mod fuse;
pub mod grid;
pub mod populate;
pub mod store;

pub use brick::{Brick, BrickId, BrickKind, Rgb};
pub use damage::{Capabilities, DamageOutcome, RewardTuning, apply_damage};
pub use debounce::HitDebounce;
pub use endless::{ShapeKind, ShapeSpec};
pub use engine::{BallContact, EffectKind, Engine, EngineEvent};
pub use grid::{CellMetrics, GridCoord, HalfSlot};
pub use populate::populate;
pub use store::BrickStore;
