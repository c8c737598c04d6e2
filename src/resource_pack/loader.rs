//! Resource pack loading from ZIP files and directories.
//!
//! Both sources are flattened to (relative path, bytes) pairs and fed
//! through the same ingest step, so a directory and its zipped copy load
//! identically.

use super::texture::load_texture_from_bytes;
use super::{Blockstate, LoadReport, ModelFile, ResourcePack, TERRAIN_LOCATION};
use crate::error::{MesherError, Result};
use crate::texture::PackVersion;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Load a resource pack from a file path.
///
/// Supports both ZIP files and directories.
#[tracing::instrument]
pub fn load_from_path<P: AsRef<Path> + std::fmt::Debug>(path: P) -> Result<(ResourcePack, LoadReport)> {
    let path = path.as_ref();

    if path.is_dir() {
        load_from_directory(path)
    } else {
        let data = std::fs::read(path)?;
        load_from_bytes(&data)
    }
}

/// Load a resource pack from bytes (ZIP data).
pub fn load_from_bytes(data: &[u8]) -> Result<(ResourcePack, LoadReport)> {
    let cursor = std::io::Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor)?;
    let mut ingest = Ingest::default();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let file_path = file.name().to_string();
        if !ingest.wants(&file_path) {
            continue;
        }

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        ingest.add(&file_path, &bytes);
    }

    ingest.finish()
}

/// Load a resource pack from a directory.
fn load_from_directory(path: &Path) -> Result<(ResourcePack, LoadReport)> {
    if !path.join("assets").is_dir() && !path.join("terrain.png").is_file() {
        return Err(MesherError::InvalidResourcePack(format!(
            "{} has neither an assets directory nor terrain.png",
            path.display()
        )));
    }

    let mut ingest = Ingest::default();
    walk_directory(path, path, &mut ingest)?;
    ingest.finish()
}

fn walk_directory(base: &Path, dir: &Path, ingest: &mut Ingest) -> Result<()> {
    let mut entries = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            walk_directory(base, &path, ingest)?;
            continue;
        }

        let Ok(relative) = path.strip_prefix(base) else {
            continue;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");
        if ingest.wants(&relative) {
            let data = std::fs::read(&path)?;
            ingest.add(&relative, &data);
        }
    }
    Ok(())
}

#[derive(Deserialize)]
struct PackMeta {
    pack: PackSection,
}

#[derive(Deserialize)]
struct PackSection {
    pack_format: u32,
}

/// Accumulates parsed files into a pack.
#[derive(Default)]
struct Ingest {
    pack: ResourcePack,
    report: LoadReport,
    pack_format: Option<u32>,
    has_terrain: bool,
    legacy_folders: bool,
}

impl Ingest {
    fn wants(&self, file_path: &str) -> bool {
        file_path == "pack.mcmeta"
            || file_path == "terrain.png"
            || parse_asset_path(file_path).is_some()
    }

    fn add(&mut self, file_path: &str, data: &[u8]) {
        match file_path {
            "pack.mcmeta" => self.add_pack_meta(file_path, data),
            "terrain.png" => match load_texture_from_bytes(data) {
                Ok(texture) => {
                    let (namespace, path) = super::parse_resource_location(TERRAIN_LOCATION);
                    self.pack.add_texture(namespace, path, texture);
                    self.has_terrain = true;
                }
                Err(e) => self.report.push(file_path, e.into()),
            },
            _ => {
                if let Some((namespace, asset_type, asset_path)) = parse_asset_path(file_path) {
                    self.add_asset(file_path, namespace, asset_type, asset_path, data);
                }
            }
        }
    }

    fn add_pack_meta(&mut self, file_path: &str, data: &[u8]) {
        match serde_json::from_slice::<PackMeta>(data) {
            Ok(meta) => self.pack_format = Some(meta.pack.pack_format),
            Err(e) => self.report.push(file_path, e.into()),
        }
    }

    fn add_asset(&mut self, file_path: &str, namespace: &str, asset_type: &str, asset_path: &str, data: &[u8]) {
        match asset_type {
            "blockstates" => {
                let Some(block_id) = asset_path.strip_suffix(".json") else {
                    return;
                };
                match serde_json::from_slice::<Blockstate>(data) {
                    Ok(def) => {
                        tracing::debug!(namespace, block_id, "loaded blockstate");
                        self.pack.add_blockstate(namespace, block_id, def);
                    }
                    Err(e) => self.report.push(file_path, e.into()),
                }
            }
            "models" => {
                let Some(model_path) = asset_path.strip_suffix(".json") else {
                    return;
                };
                match serde_json::from_slice::<ModelFile>(data) {
                    Ok(model) => {
                        tracing::debug!(namespace, model_path, "loaded model");
                        self.pack.add_model(namespace, model_path, model);
                    }
                    Err(e) => self.report.push(file_path, e.into()),
                }
            }
            "textures" => {
                let Some(texture_path) = asset_path.strip_suffix(".png") else {
                    return;
                };
                match load_texture_from_bytes(data) {
                    Ok(texture) => {
                        if texture_path.starts_with("blocks/") {
                            self.legacy_folders = true;
                        }
                        self.pack.add_texture(namespace, texture_path, texture);
                    }
                    Err(e) => self.report.push(file_path, e.into()),
                }
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Result<(ResourcePack, LoadReport)> {
        self.pack.version = detect_version(self.has_terrain, self.pack_format, self.legacy_folders);

        tracing::info!(
            version = %self.pack.version,
            blockstates = self.pack.blockstate_count(),
            models = self.pack.model_count(),
            textures = self.pack.texture_count(),
            issues = self.report.len(),
            "loaded resource pack"
        );

        Ok((self.pack, self.report))
    }
}

/// Pack generation from its layout.
///
/// A root `terrain.png` marks a 1.4 pack. Otherwise `pack_format` decides,
/// and a pack without one is dated by its texture folder name.
fn detect_version(has_terrain: bool, pack_format: Option<u32>, legacy_folders: bool) -> PackVersion {
    if has_terrain {
        return PackVersion::V1_4;
    }
    match pack_format {
        Some(0 | 1) => PackVersion::V1_6,
        Some(2) => PackVersion::V1_9,
        Some(3) => PackVersion::V1_12,
        Some(4) => PackVersion::V1_13,
        Some(_) => PackVersion::V1_15,
        None if legacy_folders => PackVersion::V1_12,
        None => PackVersion::V1_15,
    }
}

/// Parse an asset path from a ZIP file.
/// Returns (namespace, asset_type, asset_path) if valid.
fn parse_asset_path(file_path: &str) -> Option<(&str, &str, &str)> {
    // Expected format: assets/{namespace}/{type}/{path}
    let parts: Vec<&str> = file_path.splitn(4, '/').collect();

    match parts.as_slice() {
        ["assets", namespace, asset_type, path] if !path.is_empty() => {
            Some((namespace, asset_type, path))
        }
        _ => None,
    }
}
