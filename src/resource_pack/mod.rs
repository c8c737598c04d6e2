//! Resource pack loading and parsing.
//!
//! Packs are read from ZIP files or directories. Blockstates, models and
//! textures are parsed file by file; a file that fails to parse is recorded
//! in the [`LoadReport`] and loading carries on.

pub mod blockstate;
pub mod loader;
pub mod model;
pub mod texture;

pub use blockstate::{parse_state_key, BlockVariant, Blockstate, MultipartCase, MultipartCondition, VariantModel};
pub use loader::{load_from_bytes, load_from_path};
pub use model::{BlockElement, BlockModel, ElementFace, ModelElement, ModelFace, ModelFile};
pub use texture::TextureData;

use crate::error::MesherError;
use crate::texture::PackVersion;
use std::collections::HashMap;

/// Location of the legacy terrain atlas.
pub const TERRAIN_LOCATION: &str = "minecraft:terrain";

/// A loaded resource pack.
#[derive(Debug, Default, Clone)]
pub struct ResourcePack {
    /// Pack generation, detected from the pack layout.
    pub version: PackVersion,

    /// Blockstate definitions by namespace and block ID.
    pub blockstates: HashMap<String, HashMap<String, Blockstate>>,

    /// Model files by namespace and model path.
    pub models: HashMap<String, HashMap<String, ModelFile>>,

    /// Texture data by namespace and texture path.
    pub textures: HashMap<String, HashMap<String, TextureData>>,
}

impl ResourcePack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a blockstate definition by full resource location (e.g., "minecraft:stone").
    pub fn get_blockstate(&self, resource_location: &str) -> Option<&Blockstate> {
        let (namespace, path) = parse_resource_location(resource_location);
        self.blockstates.get(namespace).and_then(|ns| ns.get(path))
    }

    /// Get a model by full resource location (e.g., "minecraft:block/stone").
    pub fn get_model(&self, resource_location: &str) -> Option<&ModelFile> {
        let (namespace, path) = parse_resource_location(resource_location);
        self.models.get(namespace).and_then(|ns| ns.get(path))
    }

    /// Get a texture by full resource location (e.g., "minecraft:block/stone").
    pub fn get_texture(&self, resource_location: &str) -> Option<&TextureData> {
        let (namespace, path) = parse_resource_location(resource_location);
        self.textures.get(namespace).and_then(|ns| ns.get(path))
    }

    pub fn add_blockstate(&mut self, namespace: &str, block_id: &str, definition: Blockstate) {
        self.blockstates
            .entry(namespace.to_string())
            .or_default()
            .insert(block_id.to_string(), definition);
    }

    pub fn add_model(&mut self, namespace: &str, model_path: &str, model: ModelFile) {
        self.models
            .entry(namespace.to_string())
            .or_default()
            .insert(model_path.to_string(), model);
    }

    pub fn add_texture(&mut self, namespace: &str, texture_path: &str, texture: TextureData) {
        self.textures
            .entry(namespace.to_string())
            .or_default()
            .insert(texture_path.to_string(), texture);
    }

    pub fn blockstate_count(&self) -> usize {
        self.blockstates.values().map(|m| m.len()).sum()
    }

    pub fn model_count(&self) -> usize {
        self.models.values().map(|m| m.len()).sum()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.values().map(|m| m.len()).sum()
    }

    /// Every blockstate as (full location, definition), sorted by location.
    pub fn blockstate_entries(&self) -> Vec<(String, &Blockstate)> {
        let mut entries: Vec<_> = self
            .blockstates
            .iter()
            .flat_map(|(ns, map)| map.iter().map(move |(id, def)| (format!("{ns}:{id}"), def)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Every texture as (full location, data), sorted by location.
    pub fn texture_entries(&self) -> Vec<(String, &TextureData)> {
        let mut entries: Vec<_> = self
            .textures
            .iter()
            .flat_map(|(ns, map)| map.iter().map(move |(path, tex)| (format!("{ns}:{path}"), tex)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Get all namespaces in the resource pack.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut namespaces: Vec<_> = self
            .blockstates
            .keys()
            .chain(self.models.keys())
            .chain(self.textures.keys())
            .map(|s| s.as_str())
            .collect();
        namespaces.sort();
        namespaces.dedup();
        namespaces
    }
}

/// Parse a resource location into namespace and path.
/// "minecraft:block/stone" -> ("minecraft", "block/stone")
/// "block/stone" -> ("minecraft", "block/stone")
pub(crate) fn parse_resource_location(resource_location: &str) -> (&str, &str) {
    resource_location
        .split_once(':')
        .unwrap_or(("minecraft", resource_location))
}

/// One file that could not be used.
#[derive(Debug)]
pub struct LoadIssue {
    pub path: String,
    pub error: MesherError,
}

/// Per-file failures collected while loading a pack or building a registry.
#[derive(Debug, Default)]
pub struct LoadReport {
    issues: Vec<LoadIssue>,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, error: MesherError) {
        let path = path.into();
        tracing::warn!(path = %path, error = %error, "skipping unusable pack entry");
        self.issues.push(LoadIssue { path, error });
    }

    pub fn extend(&mut self, other: LoadReport) {
        self.issues.extend(other.issues);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadIssue> {
        self.issues.iter()
    }

    /// Whether a file with this path was reported.
    pub fn contains(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path == path)
    }
}
