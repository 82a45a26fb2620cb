//! Brick entity types
//!
//! The central mutable record of the engine. Bricks are created by level
//! population, mutated by damage resolution and area effects, and removed
//! from the store the instant health reaches zero.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::{GridCoord, HalfSlot};

/// Stable identity for collision dispatch and physics-body pairing
pub type BrickId = u32;

/// Brick behavior on hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BrickKind {
    #[default]
    Normal,
    /// Multi-hit brick with a damage-staged appearance
    Metal,
    /// Immune to normal hits; dies only to TNT ring 1 or the breaker capability
    Unbreakable,
    /// Detonates on any hit, bypassing the health path
    Tnt,
    /// High coin value, otherwise ordinary
    Gold,
    /// Visual-only trigger for a future buff system
    Boost,
    /// Teleports the ball to its paired partner
    Portal,
    /// Randomizes the ball's direction on hit
    Chaos,
    /// Hidden until first damaged, then permanently revealed
    Invisible,
    /// Fuse bricks chain-react; orientation is cosmetic only
    FuseHorizontal,
    FuseVertical,
    FuseLeftUp,
    FuseRightUp,
    FuseLeftDown,
    FuseRightDown,
}

impl BrickKind {
    /// Fuse connectivity is type-based, not direction-based: all six
    /// orientations chain with each other.
    #[inline]
    pub fn is_fuse(&self) -> bool {
        matches!(
            self,
            BrickKind::FuseHorizontal
                | BrickKind::FuseVertical
                | BrickKind::FuseLeftUp
                | BrickKind::FuseRightUp
                | BrickKind::FuseLeftDown
                | BrickKind::FuseRightDown
        )
    }
}

/// An sRGB color, serialized as a `#rrggbb` hex string in level data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#')?;
        if s.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&s[0..2], 16).ok()?;
        let g = u8::from_str_radix(&s[2..4], 16).ok()?;
        let b = u8::from_str_radix(&s[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color {s:?}")))
    }
}

/// A live brick on the playfield
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub id: BrickId,
    pub kind: BrickKind,
    /// Logical cell. Legacy bricks migrated from pixel data always have this
    /// set after population; `None` only survives for compatibility paths.
    pub grid: Option<GridCoord>,
    /// `None` = full-size (occupies both half-slots of the cell)
    pub half: Option<HalfSlot>,
    /// Pixel-space center, recomputed from `grid` - never authoritative
    pub pos: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub color: Rgb,
    /// Item drop probability on destruction, 0..=1
    pub drop_chance: f32,
    pub coin_value: u32,
    /// Two portals sharing a pair id are linked; unpaired portals never send
    pub pair_id: Option<String>,
    /// Counts toward level completion (default true)
    pub required: bool,
    /// A one-way portal only receives, never sends
    pub one_way: bool,
    /// Invisible bricks flip to visible on first damage, irreversibly
    pub revealed: bool,
}

impl Brick {
    pub fn new(id: BrickId, kind: BrickKind) -> Self {
        Self {
            id,
            kind,
            grid: None,
            half: None,
            pos: Vec2::ZERO,
            health: 1,
            max_health: 1,
            color: Rgb::WHITE,
            drop_chance: 0.0,
            coin_value: 0,
            pair_id: None,
            required: true,
            one_way: false,
            revealed: false,
        }
    }

    /// The half-slots this brick occupies within its cell
    pub fn occupied_slots(&self) -> &'static [HalfSlot] {
        match self.half {
            None => &[HalfSlot::Left, HalfSlot::Right],
            Some(HalfSlot::Left) => &[HalfSlot::Left],
            Some(HalfSlot::Right) => &[HalfSlot::Right],
        }
    }

    /// Discrete appearance stage for metal bricks, 0 (pristine) to 3.
    /// Informational only; the rendering collaborator maps it to a palette.
    pub fn metal_stage(&self) -> u8 {
        if self.max_health <= 0 {
            return 0;
        }
        let worn = 1.0 - self.health as f32 / self.max_health as f32;
        ((worn * 4.0).floor() as i32).clamp(0, 3) as u8
    }

    /// Whether this brick counts toward the level-completion counter
    pub fn counts_for_clear(&self) -> bool {
        self.required && self.kind != BrickKind::Unbreakable
    }
}
