//! Collision dispatch, destruction lifecycle, and the host-facing seam
//!
//! The host's physics layer reports contacts through [`Engine::on_collision`]
//! and pumps [`Engine::update`] every frame for deferred fuse-cascade steps.
//! Everything the engine wants the outside world to do - visuals, ball
//! teleports, rewards, level completion - comes back out as [`EngineEvent`]s
//! drained once per frame. The engine never calls out and never awaits.
//!
//! Reentrancy discipline: a single collision can cascade through TNT and
//! fuse chains that mutate the store mid-resolution. Every area-effect pass
//! snapshots its targets before mutating and carries an [`EffectPass`]
//! processed-set so adjacent TNT/fuse bricks can't re-enter each other
//! within one pass.

use std::collections::HashSet;
use std::f32::consts::FRAC_PI_4;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::brick::{BrickId, BrickKind};
use super::damage::{Capabilities, RewardTuning, apply_damage, apply_damage_forced};
use super::debounce::HitDebounce;
use super::grid::CellMetrics;
use super::store::BrickStore;

/// Ball state captured just before the physics engine resolves the contact,
/// so a portal teleport can restore the pre-collision velocity exactly.
#[derive(Debug, Clone, Copy)]
pub struct BallContact {
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Cosmetic effect requests; fire-and-forget for the rendering collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Explosion,
    FuseBurst,
    BoostFlash,
}

/// Outbound events, drained by the host each frame
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Spawn a cosmetic effect at a position
    Effect { kind: EffectKind, pos: Vec2 },
    /// A surviving brick's look changed (health badge, metal wear stage)
    Appearance { id: BrickId, stage: Option<u8> },
    /// An invisible brick was hit for the first time; render it solid now
    Revealed { id: BrickId },
    /// Brick destroyed: remove its visual and physics body, pay out
    Destroyed { id: BrickId, coins: u32, drop: bool },
    /// Endless-mode row fell off the bottom; remove visuals, no rewards
    Discarded { id: BrickId },
    /// Reposition the ball at a portal partner, restoring this velocity
    BallTeleported { pos: Vec2, vel: Vec2 },
    /// Chaos brick: give the ball this new velocity
    BallDeflected { vel: Vec2 },
    /// All required bricks are gone
    LevelCompleted,
    /// Endless mode discarded required bricks off the bottom edge
    LivesLost(u32),
}

/// Per-resolution-pass guard against re-entering area effects
#[derive(Debug, Default)]
pub(crate) struct EffectPass {
    processed: HashSet<BrickId>,
}

impl EffectPass {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns false if `id` was already processed this pass
    pub(crate) fn mark(&mut self, id: BrickId) -> bool {
        self.processed.insert(id)
    }

    pub(crate) fn contains(&self, id: BrickId) -> bool {
        self.processed.contains(&id)
    }
}

/// A deferred fuse-cascade destruction step
#[derive(Debug, Clone, Copy)]
pub(crate) struct FuseStep {
    pub(crate) due_ms: u64,
    pub(crate) brick: BrickId,
}

/// The destruction engine for one playfield
pub struct Engine {
    pub store: BrickStore,
    pub metrics: CellMetrics,
    /// Level bounds in cells
    pub width: u32,
    pub height: u32,
    caps: Capabilities,
    rewards: RewardTuning,
    debounce: HitDebounce,
    pub(crate) fuse_queue: Vec<FuseStep>,
    pub(crate) rng: Pcg32,
    required_remaining: u32,
    events: Vec<EngineEvent>,
    pub(crate) now_ms: u64,
}

impl Engine {
    pub fn new(
        store: BrickStore,
        metrics: CellMetrics,
        width: u32,
        height: u32,
        caps: Capabilities,
        rewards: RewardTuning,
        seed: u64,
    ) -> Self {
        let required_remaining = store.all().filter(|b| b.counts_for_clear()).count() as u32;
        Self {
            store,
            metrics,
            width,
            height,
            caps,
            rewards,
            debounce: HitDebounce::default(),
            fuse_queue: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            required_remaining,
            events: Vec::new(),
            now_ms: 0,
        }
    }

    /// Required bricks still standing
    pub fn required_remaining(&self) -> u32 {
        self.required_remaining
    }

    /// Number of fuse-cascade steps not yet fired
    pub fn pending_fuse_steps(&self) -> usize {
        self.fuse_queue.len()
    }

    /// Take the events accumulated since the last drain
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Physics collision callback: dispatch by brick type, then damage.
    ///
    /// Duplicate contacts for the same brick inside the debounce window are
    /// swallowed, so damage applies exactly once per physical collision.
    pub fn on_collision(&mut self, id: BrickId, ball: &BallContact, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
        let Some(brick) = self.store.get(id) else {
            return;
        };
        let kind = brick.kind;

        // Unbreakable bounce costs nothing and shouldn't consume the
        // debounce slot either
        if kind == BrickKind::Unbreakable && !self.caps.unbreakable_breaker {
            return;
        }
        if !self.debounce.accept(id, now_ms) {
            return;
        }

        match kind {
            BrickKind::Tnt => {
                // Any hit detonates; the health path is never consulted
                let mut pass = EffectPass::new();
                self.resolve_blast(id, &mut pass);
            }
            BrickKind::Portal => self.portal_send(id, ball),
            _ => {
                if kind == BrickKind::Chaos {
                    self.chaos_deflect(ball);
                }
                if kind == BrickKind::Boost {
                    // Placeholder for the buff system; cosmetic trigger only
                    let pos = self.store.get(id).map(|b| b.pos).unwrap_or_default();
                    self.push_effect(EffectKind::BoostFlash, pos);
                }
                self.hit_with_damage(id, self.caps.hit_damage());
            }
        }
    }

    /// Advance engine time, firing any due fuse-cascade steps. Steps fired
    /// within one update share a resolution pass.
    pub fn update(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
        if self.fuse_queue.is_empty() {
            return;
        }
        let mut due: Vec<FuseStep> = Vec::new();
        self.fuse_queue.retain(|step| {
            if step.due_ms <= now_ms {
                due.push(*step);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|s| s.due_ms);

        let mut pass = EffectPass::new();
        for step in due {
            self.fire_fuse_step(step.brick, &mut pass);
        }
    }

    /// Normal damage path shared by direct hits. Reveals invisible bricks,
    /// reports appearance changes, and routes zero-health bricks to their
    /// type-appropriate destruction.
    fn hit_with_damage(&mut self, id: BrickId, amount: i32) {
        let caps = self.caps;
        let Some(brick) = self.store.get_mut(id) else {
            return;
        };
        if brick.kind == BrickKind::Invisible && !brick.revealed {
            brick.revealed = true;
            self.events.push(EngineEvent::Revealed { id });
        }
        let Some(brick) = self.store.get_mut(id) else {
            return;
        };
        let outcome = apply_damage(brick, amount, &caps);
        let is_fuse = brick.kind.is_fuse();

        if outcome.destroyed {
            let mut pass = EffectPass::new();
            if is_fuse {
                self.trigger_chain(id, &mut pass);
            } else {
                self.destroy_brick(id, &mut pass);
            }
        } else {
            self.events.push(EngineEvent::Appearance {
                id,
                stage: outcome.stage,
            });
        }
    }

    /// Damage from an area effect (blast ring or fuse splash). TNT targets
    /// detonate instead of taking damage; destroyed fuses chain; everything
    /// is re-fetched from the store so mid-pass removals are tolerated.
    pub(crate) fn deal_area_damage(
        &mut self,
        id: BrickId,
        amount: i32,
        forced: bool,
        pass: &mut EffectPass,
    ) {
        let Some(brick) = self.store.get(id) else {
            return;
        };
        if brick.kind == BrickKind::Tnt {
            self.resolve_blast(id, pass);
            return;
        }

        let Some(brick) = self.store.get_mut(id) else {
            return;
        };
        if brick.kind == BrickKind::Invisible && !brick.revealed {
            brick.revealed = true;
            self.events.push(EngineEvent::Revealed { id });
        }
        let Some(brick) = self.store.get_mut(id) else {
            return;
        };
        let outcome = if forced {
            apply_damage_forced(brick, amount)
        } else {
            apply_damage(brick, amount, &Capabilities::default())
        };
        let is_fuse = brick.kind.is_fuse();

        if outcome.destroyed {
            if is_fuse {
                self.trigger_chain(id, pass);
            } else {
                self.destroy_brick(id, pass);
            }
        } else {
            self.events.push(EngineEvent::Appearance {
                id,
                stage: outcome.stage,
            });
        }
    }

    /// Remove a brick from the store and physics, pay out rewards, and
    /// check level completion. The store (and with it the grid index) is
    /// updated before the event goes out, so subsequent area-effect queries
    /// in the same pass no longer see the brick.
    pub(crate) fn destroy_brick(&mut self, id: BrickId, _pass: &mut EffectPass) {
        let Some(brick) = self.store.remove(id) else {
            return;
        };
        self.debounce.forget(id);

        let coins = (brick.coin_value as f32 * self.rewards.coin_multiplier).floor() as u32;
        let drop_chance = (brick.drop_chance + self.rewards.drop_chance_bonus).min(1.0);
        let drop = self.rng.random::<f32>() < drop_chance;
        self.events.push(EngineEvent::Destroyed { id, coins, drop });

        if brick.counts_for_clear() {
            self.required_remaining = self.required_remaining.saturating_sub(1);
            if self.required_remaining == 0 {
                self.events.push(EngineEvent::LevelCompleted);
            }
        }
    }

    /// Portal hit: teleport the ball to the live partner, preserving the
    /// pre-collision velocity. One-way portals and unpaired portals send
    /// nothing; the portal itself takes no damage either way.
    fn portal_send(&mut self, id: BrickId, ball: &BallContact) {
        let Some(portal) = self.store.get(id) else {
            return;
        };
        if portal.one_way {
            return;
        }
        let Some(pair_id) = portal.pair_id.clone() else {
            return;
        };
        let partner = self
            .store
            .all()
            .find(|b| b.id != id && b.kind == BrickKind::Portal && b.pair_id.as_deref() == Some(&pair_id));
        match partner {
            Some(partner) => {
                self.events.push(EngineEvent::BallTeleported {
                    pos: partner.pos,
                    vel: ball.vel,
                });
            }
            None => {
                log::info!("portal {id} pair {pair_id:?} has no live partner");
            }
        }
    }

    /// Chaos hit: new direction uniformly sampled from the upward-facing
    /// arc, same speed magnitude. Falls through to normal damage.
    fn chaos_deflect(&mut self, ball: &BallContact) {
        let speed = ball.vel.length();
        let angle = self.rng.random_range(-3.0 * FRAC_PI_4..-FRAC_PI_4);
        self.events.push(EngineEvent::BallDeflected {
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
        });
    }

    pub(crate) fn push_effect(&mut self, kind: EffectKind, pos: Vec2) {
        self.events.push(EngineEvent::Effect { kind, pos });
    }

    pub(crate) fn schedule_fuse_step(&mut self, brick: BrickId, due_ms: u64) {
        self.fuse_queue.push(FuseStep { due_ms, brick });
    }

    /// Remove a brick without rewards or completion checks - the
    /// endless-mode discard path for rows that fall off the bottom edge.
    /// Returns whether the brick counted toward completion.
    pub(crate) fn discard_brick(&mut self, id: BrickId) -> bool {
        let Some(brick) = self.store.remove(id) else {
            return false;
        };
        self.debounce.forget(id);
        self.events.push(EngineEvent::Discarded { id });
        brick.counts_for_clear()
    }

    pub(crate) fn note_required_added(&mut self, count: u32) {
        self.required_remaining += count;
    }

    pub(crate) fn note_required_discarded(&mut self, count: u32) {
        self.required_remaining = self.required_remaining.saturating_sub(count);
    }

    pub(crate) fn push_event(&mut self, event: EngineEvent) {
        self.events.push(event);
    }
}
