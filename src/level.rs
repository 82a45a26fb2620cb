//! Level data exchange format
//!
//! The JSON document shared between the editor and the runtime. Optional
//! fields stay optional through a round-trip: a legacy brick that only has
//! pixel coordinates serializes back without invented `col`/`row` fields,
//! and colors travel as `#rrggbb` hex strings.
//!
//! Malformed JSON is rejected here, at the boundary - the sim core assumes
//! its invariants hold once population has filtered the parsed data.

use serde::{Deserialize, Serialize};

use crate::sim::{BrickKind, HalfSlot, Rgb};

/// One serialized brick. Everything except the type is optional so old
/// editor exports keep loading; population fills in defaults and migrates
/// pixel-only placements.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BrickSpec {
    #[serde(rename = "type", default)]
    pub kind: BrickKind,
    /// Grid placement; absent on legacy bricks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<u32>,
    /// Half-size sub-cell slot; absent = full-size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half: Option<HalfSlot>,
    /// Legacy pixel-space center, only consulted when col/row are absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_health: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_chance: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coin_value: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_one_way: Option<bool>,
}

/// A complete level document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    pub name: String,
    /// Playfield size in cells
    pub width: u32,
    pub height: u32,
    pub bricks: Vec<BrickSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Rgb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brick_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brick_height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<f32>,
}

impl LevelData {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
