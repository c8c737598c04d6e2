//! In-memory world snapshot.
//!
//! A sparse map of blocks and light levels implementing [`BlockContext`].
//! Snapshots are built in code or read from a JSON document:
//!
//! ```json
//! {
//!   "height": 256,
//!   "light_style": "day",
//!   "sky_light": 15,
//!   "blocks": [ { "x": 0, "y": 64, "z": 0, "id": 1 } ],
//!   "light": [ { "x": 0, "y": 65, "z": 0, "sky": 15, "block": 0 } ]
//! }
//! ```

use crate::error::{MesherError, Result};
use crate::mesher::lighting::{LightStyle, MAX_LIGHT};
use crate::types::{BlockContext, BlockPosition, LightFace, AIR};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Default world height in blocks.
pub const DEFAULT_HEIGHT: i32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StoredBlock {
    id: u16,
    data: u8,
}

/// An immutable-once-built set of blocks with their light.
#[derive(Debug, Clone)]
pub struct WorldSnapshot {
    height: i32,
    light_style: LightStyle,
    default_levels: (u8, u8),
    biome_colour: [f32; 4],
    blocks: BTreeMap<BlockPosition, StoredBlock>,
    light: HashMap<BlockPosition, (u8, u8)>,
}

impl Default for WorldSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldSnapshot {
    /// Empty world of default height, lit by full sky light.
    pub fn new() -> Self {
        Self {
            height: DEFAULT_HEIGHT,
            light_style: LightStyle::default(),
            default_levels: (MAX_LIGHT, 0),
            biome_colour: [1.0; 4],
            blocks: BTreeMap::new(),
            light: HashMap::new(),
        }
    }

    pub fn with_height(mut self, height: i32) -> Self {
        self.height = height.max(1);
        self
    }

    pub fn with_light_style(mut self, style: LightStyle) -> Self {
        self.light_style = style;
        self
    }

    /// Sky and block level used where no explicit light was stored.
    pub fn with_default_light(mut self, sky: u8, block: u8) -> Self {
        self.default_levels = (sky.min(MAX_LIGHT), block.min(MAX_LIGHT));
        self
    }

    pub fn with_biome_colour(mut self, colour: [f32; 4]) -> Self {
        self.biome_colour = colour;
        self
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn light_style(&self) -> LightStyle {
        self.light_style
    }

    pub fn contains(&self, pos: BlockPosition) -> bool {
        pos.y >= 0 && pos.y < self.height
    }

    /// Place a block. Air and positions outside the world are ignored.
    pub fn set_block(&mut self, pos: BlockPosition, id: u16, data: u8) {
        if !self.contains(pos) {
            return;
        }
        if id == AIR {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, StoredBlock { id, data: data & 0x0F });
        }
    }

    pub fn set_light(&mut self, pos: BlockPosition, sky: u8, block: u8) {
        if self.contains(pos) {
            self.light.insert(pos, (sky.min(MAX_LIGHT), block.min(MAX_LIGHT)));
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Stored (sky, block) levels, `None` outside the world.
    pub fn light_levels(&self, pos: BlockPosition) -> Option<(u8, u8)> {
        if !self.contains(pos) {
            return None;
        }
        Some(self.light.get(&pos).copied().unwrap_or(self.default_levels))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: SnapshotFile = serde_json::from_str(json)?;
        file.into_snapshot()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        let file = SnapshotFile {
            height: self.height,
            light_style: self.light_style,
            sky_light: self.default_levels.0,
            block_light: self.default_levels.1,
            biome_colour: self.biome_colour,
            blocks: self
                .blocks
                .iter()
                .map(|(pos, block)| BlockEntry {
                    x: pos.x,
                    y: pos.y,
                    z: pos.z,
                    id: block.id,
                    data: block.data,
                })
                .collect(),
            light: {
                let mut entries: Vec<_> = self
                    .light
                    .iter()
                    .map(|(pos, (sky, block))| LightEntry {
                        x: pos.x,
                        y: pos.y,
                        z: pos.z,
                        sky: *sky,
                        block: *block,
                    })
                    .collect();
                entries.sort_by_key(|e| (e.x, e.y, e.z));
                entries
            },
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}

impl BlockContext for WorldSnapshot {
    fn block_id(&self, pos: BlockPosition) -> u16 {
        self.blocks.get(&pos).map_or(AIR, |b| b.id)
    }

    fn block_data(&self, pos: BlockPosition) -> u8 {
        self.blocks.get(&pos).map_or(0, |b| b.data)
    }

    fn light(&self, pos: BlockPosition, face: LightFace) -> f32 {
        self.light_style
            .face_light(self.light_levels(pos), pos.y, self.height, face)
    }

    fn biome_colour(&self, _pos: BlockPosition) -> [f32; 4] {
        self.biome_colour
    }

    fn iter_blocks(&self) -> Box<dyn Iterator<Item = BlockPosition> + '_> {
        Box::new(self.blocks.keys().copied())
    }
}

fn default_height() -> i32 {
    DEFAULT_HEIGHT
}

fn default_sky() -> u8 {
    MAX_LIGHT
}

fn default_colour() -> [f32; 4] {
    [1.0; 4]
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    #[serde(default = "default_height")]
    height: i32,
    #[serde(default)]
    light_style: LightStyle,
    #[serde(default = "default_sky")]
    sky_light: u8,
    #[serde(default)]
    block_light: u8,
    #[serde(default = "default_colour")]
    biome_colour: [f32; 4],
    #[serde(default)]
    blocks: Vec<BlockEntry>,
    #[serde(default)]
    light: Vec<LightEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BlockEntry {
    x: i32,
    y: i32,
    z: i32,
    id: u16,
    #[serde(default)]
    data: u8,
}

#[derive(Debug, Serialize, Deserialize)]
struct LightEntry {
    x: i32,
    y: i32,
    z: i32,
    #[serde(default = "default_sky")]
    sky: u8,
    #[serde(default)]
    block: u8,
}

impl SnapshotFile {
    fn into_snapshot(self) -> Result<WorldSnapshot> {
        if self.height <= 0 {
            return Err(MesherError::InvalidBlockConfig(format!(
                "world height must be positive, got {}",
                self.height
            )));
        }

        let mut world = WorldSnapshot::new()
            .with_height(self.height)
            .with_light_style(self.light_style)
            .with_default_light(self.sky_light, self.block_light)
            .with_biome_colour(self.biome_colour);

        for entry in self.blocks {
            let pos = BlockPosition::new(entry.x, entry.y, entry.z);
            if !world.contains(pos) {
                tracing::warn!(?pos, "block outside the world height, skipped");
                continue;
            }
            world.set_block(pos, entry.id, entry.data);
        }
        for entry in self.light {
            world.set_light(BlockPosition::new(entry.x, entry.y, entry.z), entry.sky, entry.block);
        }

        tracing::debug!(blocks = world.block_count(), height = world.height, "loaded world snapshot");
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_world_is_air() {
        let mut world = WorldSnapshot::new().with_height(16);
        world.set_block(BlockPosition::new(0, 20, 0), 1, 0);
        world.set_block(BlockPosition::new(0, 15, 0), 1, 0);

        assert_eq!(world.block_id(BlockPosition::new(0, 20, 0)), AIR);
        assert_eq!(world.block_id(BlockPosition::new(0, 15, 0)), 1);
        assert_eq!(world.block_id(BlockPosition::new(0, -1, 0)), AIR);
        assert_eq!(world.light_levels(BlockPosition::new(0, 16, 0)), None);
    }

    #[test]
    fn test_data_is_a_nibble() {
        let mut world = WorldSnapshot::new();
        world.set_block(BlockPosition::new(1, 2, 3), 64, 0x1A);
        assert_eq!(world.block_data(BlockPosition::new(1, 2, 3)), 0x0A);
    }

    #[test]
    fn test_light_uses_style() {
        let mut world = WorldSnapshot::new().with_light_style(LightStyle::Night);
        let pos = BlockPosition::new(0, 10, 0);
        world.set_light(pos, 0, 15);
        assert!((world.light(pos, LightFace::Top) - 0.8).abs() < 1e-5);

        let day = WorldSnapshot::new();
        assert!((day.light(pos, LightFace::EastWest) - 0.7).abs() < 1e-5);
    }

    #[test]
    fn test_json_round_trip() {
        let json = r#"{
            "height": 128,
            "light_style": "cave",
            "blocks": [
                { "x": 0, "y": 64, "z": 0, "id": 1 },
                { "x": 1, "y": 64, "z": 0, "id": 50, "data": 5 },
                { "x": 0, "y": 200, "z": 0, "id": 1 }
            ],
            "light": [ { "x": 1, "y": 65, "z": 0, "block": 14 } ]
        }"#;

        let world = WorldSnapshot::from_json(json).unwrap();
        assert_eq!(world.height(), 128);
        assert_eq!(world.light_style(), LightStyle::Cave);
        assert_eq!(world.block_count(), 2);
        assert_eq!(world.block_data(BlockPosition::new(1, 64, 0)), 5);
        assert_eq!(world.light_levels(BlockPosition::new(1, 65, 0)), Some((15, 14)));

        let again = WorldSnapshot::from_json(&world.to_json().unwrap()).unwrap();
        assert_eq!(again.block_count(), 2);
        assert_eq!(
            again.iter_blocks().collect::<Vec<_>>(),
            world.iter_blocks().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_rejects_bad_height() {
        assert!(WorldSnapshot::from_json(r#"{ "height": 0 }"#).is_err());
    }
}
