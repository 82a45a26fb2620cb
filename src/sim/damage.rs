//! Damage and health resolution
//!
//! One entry point, [`apply_damage`], decides whether a hit destroys a brick.
//! Capabilities are passed in explicitly so resolution stays pure - no
//! ambient talent lookups.

use serde::{Deserialize, Serialize};

use super::brick::{Brick, BrickKind};

/// Player capability flags that alter damage resolution
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// Normal hits deal 2 damage instead of 1
    pub brick_breaker: bool,
    /// Unbreakable bricks take damage like any other
    pub unbreakable_breaker: bool,
}

impl Capabilities {
    /// Damage dealt by an ordinary ball hit
    #[inline]
    pub fn hit_damage(&self) -> i32 {
        if self.brick_breaker { 2 } else { 1 }
    }
}

/// Reward scaling applied on destruction
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RewardTuning {
    pub coin_multiplier: f32,
    pub drop_chance_bonus: f32,
}

impl Default for RewardTuning {
    fn default() -> Self {
        Self {
            coin_multiplier: 1.0,
            drop_chance_bonus: 0.0,
        }
    }
}

/// Result of one damage application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    pub destroyed: bool,
    /// Metal appearance stage after the hit, when relevant
    pub stage: Option<u8>,
}

impl DamageOutcome {
    pub const UNTOUCHED: DamageOutcome = DamageOutcome {
        destroyed: false,
        stage: None,
    };
}

/// Apply `amount` damage to a brick.
///
/// Unbreakable bricks shrug off everything unless the breaker capability is
/// active; area effects that may kill them (TNT ring 1) pass `i32::MAX` via
/// [`apply_damage_forced`]. Health never rises above `max_health` and the
/// destruction decision happens exactly here - callers must not decrement
/// health themselves.
pub fn apply_damage(brick: &mut Brick, amount: i32, caps: &Capabilities) -> DamageOutcome {
    if brick.kind == BrickKind::Unbreakable && !caps.unbreakable_breaker {
        return DamageOutcome::UNTOUCHED;
    }
    apply_damage_forced(brick, amount)
}

/// Damage application that ignores the unbreakable exemption. Used by the
/// TNT ring-1 override.
pub fn apply_damage_forced(brick: &mut Brick, amount: i32) -> DamageOutcome {
    if amount <= 0 {
        return DamageOutcome::UNTOUCHED;
    }
    brick.health = brick
        .health
        .saturating_sub(amount)
        .clamp(0, brick.max_health.max(0));
    let stage = (brick.kind == BrickKind::Metal).then(|| brick.metal_stage());
    DamageOutcome {
        destroyed: brick.health <= 0,
        stage,
    }
}
