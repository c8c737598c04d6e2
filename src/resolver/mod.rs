//! Block state and model resolution.
//!
//! [`ModelRegistry::build`] resolves every model a pack's blockstates
//! reference, once, into immutable [`BlockModel`]s. The registry is then
//! shared read-only between mesher threads.

pub mod model_resolver;
pub mod multipart;
pub mod state_resolver;

pub use model_resolver::ModelResolver;
pub use multipart::select_cases;
pub use state_resolver::select_variant;

use crate::error::{MesherError, Result};
use crate::resource_pack::{BlockModel, Blockstate, LoadReport, ResourcePack, VariantModel};
use crate::texture::PackVersion;
use crate::types::BlockTransform;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A resolved model ready for meshing.
#[derive(Debug, Clone)]
pub struct ResolvedModel {
    pub model: Arc<BlockModel>,
    /// Block-level transform (x/y rotation, uvlock).
    pub transform: BlockTransform,
    pub weight: u32,
}

/// Blockstates and resolved models of one pack, keyed by full location.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    version: PackVersion,
    blockstates: BTreeMap<String, Blockstate>,
    models: BTreeMap<String, Arc<BlockModel>>,
}

impl ModelRegistry {
    /// Resolve every model referenced by the pack's blockstates.
    ///
    /// Models that fail to resolve are left out and recorded in the report.
    #[tracing::instrument(skip(pack))]
    pub fn build(pack: &ResourcePack) -> (Self, LoadReport) {
        let resolver = ModelResolver::new(pack);
        let mut report = LoadReport::new();
        let mut registry = Self {
            version: pack.version,
            ..Self::default()
        };

        for (name, blockstate) in pack.blockstate_entries() {
            for reference in blockstate.model_references() {
                let location = reference.model_location();
                if registry.models.contains_key(&location) || report.contains(&location) {
                    continue;
                }
                match resolver.resolve(&location) {
                    Ok(model) => {
                        registry.models.insert(location, Arc::new(model));
                    }
                    Err(e) => report.push(location, e),
                }
            }
            registry.blockstates.insert(name, blockstate.clone());
        }

        tracing::info!(
            blockstates = registry.blockstates.len(),
            models = registry.models.len(),
            failures = report.len(),
            "built model registry"
        );

        (registry, report)
    }

    pub fn version(&self) -> PackVersion {
        self.version
    }

    pub fn blockstate(&self, name: &str) -> Option<&Blockstate> {
        self.blockstates.get(&qualify(name))
    }

    pub fn model(&self, location: &str) -> Option<&Arc<BlockModel>> {
        self.models
            .get(&crate::resource_pack::model::model_location(location))
    }

    pub fn blockstate_names(&self) -> impl Iterator<Item = &str> {
        self.blockstates.keys().map(String::as_str)
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// All weighted alternatives of the variant closest to `key`.
    pub fn resolve_variant(&self, blockstate: &str, key: &str) -> Result<Vec<ResolvedModel>> {
        let definition = self.definition(blockstate)?;
        let variant = select_variant(definition, key).ok_or_else(|| {
            MesherError::ResourceNotFound(format!("variant '{key}' of blockstate {blockstate}"))
        })?;

        variant
            .models
            .iter()
            .map(|reference| self.resolved(reference))
            .collect()
    }

    /// The parts drawn for `key`, each a list of weighted alternatives.
    ///
    /// A `variants` blockstate gives one part; a `multipart` one gives a part
    /// per applicable case, possibly none.
    pub fn resolve_parts(&self, blockstate: &str, key: &str) -> Result<Vec<Vec<ResolvedModel>>> {
        match self.definition(blockstate)? {
            Blockstate::Variants(_) => Ok(vec![self.resolve_variant(blockstate, key)?]),
            Blockstate::Multipart(cases) => select_cases(cases, key)
                .map(|case| case.apply.iter().map(|reference| self.resolved(reference)).collect())
                .collect(),
        }
    }

    fn definition(&self, blockstate: &str) -> Result<&Blockstate> {
        self.blockstate(blockstate)
            .ok_or_else(|| MesherError::ResourceNotFound(format!("blockstate {blockstate}")))
    }

    fn resolved(&self, reference: &VariantModel) -> Result<ResolvedModel> {
        let model = self.model(&reference.model).ok_or_else(|| {
            MesherError::ModelResolution(format!("model {} did not resolve", reference.model))
        })?;
        Ok(ResolvedModel {
            model: Arc::clone(model),
            transform: BlockTransform::new(reference.x, reference.y, reference.uvlock),
            weight: reference.weight,
        })
    }
}

fn qualify(name: &str) -> String {
    if name.contains(':') {
        name.to_string()
    } else {
        format!("minecraft:{name}")
    }
}

/// Pick one of several weighted alternatives from a seed.
pub fn pick_weighted(models: &[ResolvedModel], seed: u64) -> Option<&ResolvedModel> {
    let total: u64 = models.iter().map(|m| u64::from(m.weight.max(1))).sum();
    if total == 0 {
        return None;
    }
    let mut target = seed % total;
    for model in models {
        let weight = u64::from(model.weight.max(1));
        if target < weight {
            return Some(model);
        }
        target -= weight;
    }
    models.last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource_pack::ModelFile;

    fn pack() -> ResourcePack {
        let mut pack = ResourcePack::new();
        let model = |json: &str| serde_json::from_str::<ModelFile>(json).unwrap();
        let state = |json: &str| serde_json::from_str::<Blockstate>(json).unwrap();

        pack.add_model(
            "minecraft",
            "block/cube_all",
            model(
                r##"{ "elements": [ { "from": [0, 0, 0], "to": [16, 16, 16], "faces": {
                    "up": { "texture": "#all" }, "down": { "texture": "#all" }
                } } ] }"##,
            ),
        );
        pack.add_model(
            "minecraft",
            "block/stone",
            model(r#"{ "parent": "block/cube_all", "textures": { "all": "block/stone" } }"#),
        );
        pack.add_model(
            "minecraft",
            "block/stone_mirrored",
            model(r#"{ "parent": "block/cube_all", "textures": { "all": "block/stone" } }"#),
        );
        pack.add_model("minecraft", "block/broken", model(r#"{ "parent": "block/missing" }"#));
        pack.add_model(
            "minecraft",
            "block/post",
            model(r##"{ "textures": { "all": "block/stone" }, "elements": [ { "from": [6, 0, 6], "to": [10, 16, 10],
                "faces": { "up": { "texture": "#all" } } } ] }"##),
        );
        pack.add_model(
            "minecraft",
            "block/side",
            model(r##"{ "textures": { "all": "block/stone" }, "elements": [ { "from": [7, 12, 0], "to": [9, 15, 9],
                "faces": { "up": { "texture": "#all" } } } ] }"##),
        );

        pack.add_blockstate(
            "minecraft",
            "stone",
            state(
                r#"{ "variants": { "": [
                    { "model": "block/stone", "weight": 3 },
                    { "model": "stone_mirrored", "y": 90 }
                ] } }"#,
            ),
        );
        pack.add_blockstate(
            "minecraft",
            "broken",
            state(r#"{ "variants": { "": { "model": "block/broken" } } }"#),
        );
        pack.add_blockstate(
            "minecraft",
            "fence",
            state(
                r#"{ "multipart": [
                    { "apply": { "model": "block/post" } },
                    { "when": { "north": "true" }, "apply": { "model": "block/side" } },
                    { "when": { "east": "true" }, "apply": { "model": "block/side", "y": 90 } },
                    { "when": { "south": "true" }, "apply": { "model": "block/broken" } }
                ] }"#,
            ),
        );
        pack
    }

    #[test]
    fn test_build_resolves_referenced_models() {
        let (registry, report) = ModelRegistry::build(&pack());

        assert_eq!(registry.model_count(), 4);
        assert!(registry.model("stone_mirrored").is_some());
        assert!(registry.model("block/side").is_some());
        assert_eq!(report.len(), 1);
        assert!(report.contains("minecraft:block/broken"));
        assert_eq!(registry.blockstate_names().count(), 3);
    }

    #[test]
    fn test_resolve_variant_and_pick() {
        let (registry, _) = ModelRegistry::build(&pack());

        let models = registry.resolve_variant("stone", "").unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[1].transform.y, 90);
        assert_eq!(models[0].model.steps, 2);

        assert_eq!(pick_weighted(&models, 2).unwrap().model.location, "minecraft:block/stone");
        assert_eq!(
            pick_weighted(&models, 3).unwrap().model.location,
            "minecraft:block/stone_mirrored"
        );
        assert!(pick_weighted(&[], 3).is_none());
    }

    #[test]
    fn test_failed_model_is_an_error_at_lookup() {
        let (registry, _) = ModelRegistry::build(&pack());
        assert!(matches!(
            registry.resolve_variant("broken", ""),
            Err(MesherError::ModelResolution(_))
        ));
        assert!(matches!(
            registry.resolve_variant("missing", ""),
            Err(MesherError::ResourceNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_parts_of_multipart() {
        let (registry, _) = ModelRegistry::build(&pack());

        let alone = registry.resolve_parts("fence", "").unwrap();
        assert_eq!(alone.len(), 1);
        assert_eq!(alone[0][0].model.location, "minecraft:block/post");

        let corner = registry.resolve_parts("fence", "east=true,north=true").unwrap();
        assert_eq!(corner.len(), 3);
        assert_eq!(corner[1][0].transform.y, 0);
        assert_eq!(corner[2][0].transform.y, 90);
        assert_eq!(corner[2][0].model.location, "minecraft:block/side");

        assert!(matches!(
            registry.resolve_parts("fence", "south=true"),
            Err(MesherError::ModelResolution(_))
        ));
    }

    #[test]
    fn test_variants_blockstate_is_one_part() {
        let (registry, _) = ModelRegistry::build(&pack());
        let parts = registry.resolve_parts("stone", "").unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].len(), 2);
    }
}
