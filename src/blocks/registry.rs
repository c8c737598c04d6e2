//! Lookup from (id, data) to block type.

use super::config::{BlockConfig, BlockEntry, KindConfig};
use super::redstone::DEFAULT_CONDUCTORS;
use super::*;
use crate::error::{MesherError, Result};
use crate::resolver::ModelRegistry;
use crate::resource_pack::LoadReport;
use crate::texture::{TextureProvider, TextureRegion};
use std::collections::{BTreeMap, HashMap};

/// Block types keyed by id, optionally narrowed to one data value.
#[derive(Debug, Clone, Default)]
pub struct BlockTypeRegistry {
    by_id: HashMap<u16, BlockType>,
    by_data: HashMap<(u16, u8), BlockType>,
}

impl BlockTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `block` for every data value, or only for `data`.
    ///
    /// A later registration for the same key replaces the earlier one.
    pub fn insert(&mut self, block: BlockType, data: Option<u8>) {
        match data {
            Some(data) => {
                self.by_data.insert((block.id(), data & 15), block);
            }
            None => {
                self.by_id.insert(block.id(), block);
            }
        }
    }

    /// The type registered for exactly `(id, data)`, else the one for `id`.
    pub fn get(&self, id: u16, data: u8) -> Option<&BlockType> {
        self.by_data.get(&(id, data)).or_else(|| self.by_id.get(&id))
    }

    pub fn len(&self) -> usize {
        self.by_id.len() + self.by_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockType> {
        self.by_id.values().chain(self.by_data.values())
    }

    /// Build every configured block type, looking up its textures.
    ///
    /// Fails on the first texture the provider cannot supply. `Model` kinds
    /// need `models`; one whose blockstate or models did not resolve is left
    /// out and recorded in the report, so its ids draw nothing.
    #[tracing::instrument(skip_all, fields(blocks = config.blocks.len()))]
    pub fn from_config(
        config: &BlockConfig,
        provider: &dyn TextureProvider,
        models: Option<&ModelRegistry>,
    ) -> Result<(Self, LoadReport)> {
        let mut registry = Self::new();
        let mut report = LoadReport::new();
        for entry in &config.blocks {
            let kind = match build_kind(entry, provider, models) {
                Ok(kind) => kind,
                Err(e) if is_pack_failure(entry, &e) => {
                    report.push(format!("block {}", entry.name), e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            tracing::debug!(name = %entry.name, id = entry.id, kind = kind.name(), "registered block type");
            registry.insert(BlockType::new(&entry.name, entry.id, kind), entry.data);
        }
        tracing::info!(types = registry.len(), skipped = report.len(), "built block type registry");
        Ok((registry, report))
    }

    /// The built-in block set.
    pub fn builtin(provider: &dyn TextureProvider, models: Option<&ModelRegistry>) -> Result<(Self, LoadReport)> {
        Self::from_config(&BlockConfig::builtin(), provider, models)
    }
}

fn build_kind(
    entry: &BlockEntry,
    provider: &dyn TextureProvider,
    models: Option<&ModelRegistry>,
) -> Result<BlockKind> {
    let tex = |request: &str| provider.require(&entry.name, request);
    let all = |requests: &[String]| -> Result<Vec<TextureRegion>> { requests.iter().map(|r| tex(r)).collect() };

    let kind = match &entry.kind {
        KindConfig::Solid { top, side, alpha_test } => {
            let top = tex(top)?;
            let side = side.as_deref().map(tex).transpose()?.unwrap_or(top);
            BlockKind::Solid(Solid::new(top, side, *alpha_test))
        }
        KindConfig::DataSolid { tops, sides, alpha_test } => {
            if tops.is_empty() || tops.len() != sides.len() {
                return Err(MesherError::InvalidBlockConfig(format!(
                    "{}: needs as many side textures as top textures, and at least one",
                    entry.name
                )));
            }
            BlockKind::DataSolid(DataSolid::new(&all(tops)?, &all(sides)?, *alpha_test))
        }
        KindConfig::Glass { texture } => BlockKind::Glass(Glass::new(tex(texture)?)),
        KindConfig::Plant { texture, tinted } => BlockKind::Plant(Plant::new(tex(texture)?, *tinted)),
        KindConfig::Slab { top, side } => BlockKind::Slab(Slab::new(tex(top)?, tex(side)?)),
        KindConfig::Stairs { top, side } => BlockKind::Stairs(Stairs::new(tex(top)?, tex(side)?)),
        KindConfig::Torch { texture } => BlockKind::Torch(Torch::new(tex(texture)?)),
        KindConfig::Lever { base, handle } => BlockKind::Lever(Lever::new(tex(base)?, tex(handle)?)),
        KindConfig::Fence { texture, gate_ids } => BlockKind::Fence(Fence::new(tex(texture)?, gate_ids.clone())),
        KindConfig::RedstoneWire { junction, line, conductors } => BlockKind::RedstoneWire(RedstoneWire::new(
            tex(junction)?,
            tex(line)?,
            conductors.clone().unwrap_or_else(|| DEFAULT_CONDUCTORS.to_vec()),
        )),
        KindConfig::Door { top, bottom } => BlockKind::Door(Door::new(tex(top)?, tex(bottom)?)),
        KindConfig::Bed {
            head_top,
            foot_top,
            head_side,
            foot_side,
            head_edge,
            foot_edge,
        } => BlockKind::Bed(Bed::new(
            tex(head_top)?,
            tex(foot_top)?,
            tex(head_side)?,
            tex(foot_side)?,
            tex(head_edge)?,
            tex(foot_edge)?,
        )),
        KindConfig::Model {
            blockstate,
            variants,
            default_variant,
            blend,
        } => {
            let models = models.ok_or_else(|| {
                MesherError::InvalidBlockConfig(format!("{}: model blocks need a resource pack", entry.name))
            })?;
            let variants = variant_table(&entry.name, variants)?;
            BlockKind::Model(ModelBlock::new(
                blockstate,
                &variants,
                default_variant,
                models,
                provider,
                *blend,
            )?)
        }
    };
    Ok(kind)
}

/// A model block the pack could not supply, as opposed to a config mistake.
fn is_pack_failure(entry: &BlockEntry, error: &MesherError) -> bool {
    matches!(entry.kind, KindConfig::Model { .. })
        && matches!(
            error,
            MesherError::ModelResolution(_) | MesherError::ResourceNotFound(_)
        )
}

/// Parse the data-value keys of a variant table.
fn variant_table(name: &str, variants: &BTreeMap<String, String>) -> Result<BTreeMap<u8, String>> {
    variants
        .iter()
        .map(|(data, key)| match data.trim().parse::<u8>() {
            Ok(value) if value < 16 => Ok((value, key.clone())),
            _ => Err(MesherError::InvalidBlockConfig(format!(
                "{name}: variant table key '{data}' is not a data value 0-15"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::texture::{AtlasId, PackVersion, TextureTable};

    fn provider() -> TextureTable {
        let mut table = TextureTable::new(PackVersion::V1_9);
        for name in ["blocks/stone", "blocks/glass", "blocks/torch_on"] {
            table.insert(name, TextureRegion::full(AtlasId(0), PackVersion::V1_9), 1);
        }
        table
    }

    #[test]
    fn test_exact_data_wins_over_any_data() {
        let mut registry = BlockTypeRegistry::new();
        registry.insert(solid_type(5), None);
        registry.insert(
            BlockType::new("glass", 5, BlockKind::Glass(Glass::new(region()))),
            Some(3),
        );

        assert_eq!(registry.get(5, 3).unwrap().name(), "glass");
        assert_eq!(registry.get(5, 0).unwrap().name(), "stone");
        assert!(registry.get(6, 0).is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_from_config_builds_kinds() {
        let config = BlockConfig::from_json(
            r#"{ "blocks": [
                { "name": "stone", "id": 1, "kind": "solid", "top": "stone" },
                { "name": "glass", "id": 20, "kind": "glass", "texture": "glass" },
                { "name": "torch", "id": 50, "kind": "torch", "texture": "torch_on" }
            ] }"#,
        )
        .unwrap();
        let (registry, report) = BlockTypeRegistry::from_config(&config, &provider(), None).unwrap();

        assert!(report.is_empty());
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(20, 0).unwrap().kind().name(), "glass");
        assert_eq!(registry.get(1, 9).unwrap().cull_type(), crate::mesher::face_culler::CullType::Opaque);
    }

    #[test]
    fn test_missing_texture_fails_fast() {
        let config = BlockConfig::from_json(
            r#"{ "blocks": [ { "name": "dirt", "id": 3, "kind": "solid", "top": "dirt" } ] }"#,
        )
        .unwrap();
        let err = BlockTypeRegistry::from_config(&config, &provider(), None).unwrap_err();
        match err {
            MesherError::MissingTexture { block, texture } => {
                assert_eq!(block, "dirt");
                assert_eq!(texture, "dirt");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_model_kind_needs_models() {
        let config = BlockConfig::from_json(
            r#"{ "blocks": [ { "name": "ladder", "id": 65, "kind": "model", "blockstate": "ladder" } ] }"#,
        )
        .unwrap();
        assert!(matches!(
            BlockTypeRegistry::from_config(&config, &provider(), None),
            Err(MesherError::InvalidBlockConfig(_))
        ));
    }

    #[test]
    fn test_unresolved_model_block_is_skipped() {
        let mut pack = crate::resource_pack::ResourcePack::new();
        pack.add_blockstate(
            "minecraft",
            "ladder",
            serde_json::from_str(r#"{ "variants": { "facing=north": { "model": "block/ladder" } } }"#).unwrap(),
        );
        pack.add_model(
            "minecraft",
            "block/ladder",
            serde_json::from_str(r#"{ "parent": "block/missing" }"#).unwrap(),
        );
        let (models, model_report) = ModelRegistry::build(&pack);
        assert_eq!(model_report.len(), 1);

        let config = BlockConfig::from_json(
            r#"{ "blocks": [
                { "name": "stone", "id": 1, "kind": "solid", "top": "stone" },
                { "name": "ladder", "id": 65, "kind": "model", "blockstate": "ladder",
                  "default_variant": "facing=north" },
                { "name": "rail", "id": 66, "kind": "model", "blockstate": "rail" }
            ] }"#,
        )
        .unwrap();
        let (registry, report) = BlockTypeRegistry::from_config(&config, &provider(), Some(&models)).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.get(65, 2).is_none());
        assert_eq!(report.len(), 2);
        assert!(report.contains("block ladder"));
        assert!(report.contains("block rail"));
        assert!(report
            .iter()
            .any(|issue| matches!(issue.error, MesherError::ModelResolution(_))));
    }

    #[test]
    fn test_variant_table_rejects_bad_keys() {
        let mut table = BTreeMap::new();
        table.insert("2".to_string(), "facing=north".to_string());
        assert_eq!(variant_table("x", &table).unwrap()[&2], "facing=north");
        table.insert("16".to_string(), "facing=south".to_string());
        assert!(variant_table("x", &table).is_err());
    }
}
