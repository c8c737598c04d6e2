//! JSON block type configuration.
//!
//! ```json
//! { "blocks": [
//!     { "name": "stone", "id": 1, "kind": "solid", "top": "stone" },
//!     { "name": "oak_stairs", "id": 53, "kind": "stairs", "top": "planks_oak", "side": "planks_oak" }
//! ] }
//! ```
//!
//! Texture fields are request strings for a
//! [`TextureProvider`](crate::texture::TextureProvider).

use crate::error::Result;
use crate::mesher::geometry::BlendMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const BUILTIN: &str = include_str!("default_blocks.json");

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BlockConfig {
    #[serde(default)]
    pub blocks: Vec<BlockEntry>,
}

impl BlockConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Block set covering every kind, with 1.9 to 1.11 texture names.
    pub fn builtin() -> Self {
        // Checked by the tests below.
        Self::from_json(BUILTIN).unwrap_or_default()
    }
}

/// One block type: which id (and optionally which data value) it covers,
/// and how it is drawn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockEntry {
    pub name: String,
    pub id: u16,
    /// Restrict the entry to one data value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<u8>,
    #[serde(flatten)]
    pub kind: KindConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KindConfig {
    Solid {
        top: String,
        /// Defaults to the top texture.
        #[serde(default)]
        side: Option<String>,
        #[serde(default)]
        alpha_test: bool,
    },
    DataSolid {
        tops: Vec<String>,
        sides: Vec<String>,
        #[serde(default)]
        alpha_test: bool,
    },
    Glass {
        texture: String,
    },
    Plant {
        texture: String,
        #[serde(default)]
        tinted: bool,
    },
    Slab {
        top: String,
        side: String,
    },
    Stairs {
        top: String,
        side: String,
    },
    Torch {
        texture: String,
    },
    Lever {
        base: String,
        handle: String,
    },
    Fence {
        texture: String,
        #[serde(default)]
        gate_ids: Vec<u16>,
    },
    RedstoneWire {
        junction: String,
        line: String,
        #[serde(default)]
        conductors: Option<Vec<u16>>,
    },
    Door {
        top: String,
        bottom: String,
    },
    Bed {
        head_top: String,
        foot_top: String,
        head_side: String,
        foot_side: String,
        head_edge: String,
        foot_edge: String,
    },
    Model {
        blockstate: String,
        /// Data value (as a string key) to variant key.
        #[serde(default)]
        variants: BTreeMap<String, String>,
        #[serde(default)]
        default_variant: String,
        #[serde(default)]
        blend: BlendMode,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_config_parses() {
        let config = BlockConfig::from_json(BUILTIN).unwrap();
        assert!(config.blocks.len() > 10);
        assert_eq!(config, BlockConfig::builtin());

        let kinds: std::collections::HashSet<_> = config
            .blocks
            .iter()
            .map(|b| std::mem::discriminant(&b.kind))
            .collect();
        assert_eq!(kinds.len(), 13, "every kind appears");
    }

    #[test]
    fn test_entry_fields() {
        let config = BlockConfig::from_json(
            r#"{ "blocks": [
                { "name": "leaves", "id": 18, "data": 2, "kind": "solid", "top": "leaves_birch", "alpha_test": true },
                { "name": "ladder", "id": 65, "kind": "model", "blockstate": "ladder",
                  "variants": { "2": "facing=north" }, "blend": "alpha_test" }
            ] }"#,
        )
        .unwrap();

        let leaves = &config.blocks[0];
        assert_eq!(leaves.data, Some(2));
        assert_eq!(
            leaves.kind,
            KindConfig::Solid {
                top: "leaves_birch".into(),
                side: None,
                alpha_test: true
            }
        );
        match &config.blocks[1].kind {
            KindConfig::Model { variants, blend, default_variant, .. } => {
                assert_eq!(variants["2"], "facing=north");
                assert_eq!(*blend, BlendMode::AlphaTest);
                assert!(default_variant.is_empty());
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_unknown_kind_is_an_error() {
        assert!(BlockConfig::from_json(r#"{ "blocks": [ { "name": "x", "id": 1, "kind": "portal" } ] }"#).is_err());
    }
}
