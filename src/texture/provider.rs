//! Named texture lookups.
//!
//! Block configs refer to textures with small request strings:
//!
//! - `block/stone` names a whole texture.
//! - `terrain[1, 0]` names one tile of a 16x16 grid laid over the texture.
//! - `block/door(0, 0, 1, 0.5)` names an explicit rectangle in fractions of
//!   the texture.
//!
//! In 1.4 packs `terrain` is the shared terrain atlas.

use super::region::{FrameSelection, PackVersion, TextureRegion};
use crate::error::{MesherError, Result};
use std::collections::HashMap;

/// Source of texture regions for emitters.
pub trait TextureProvider {
    /// Look up a request string. `None` when the texture is unknown or the
    /// request is malformed.
    fn find(&self, request: &str) -> Option<TextureRegion>;

    /// Pack generation of this provider's textures.
    fn version(&self) -> PackVersion;

    /// Like [`find`](Self::find), but names the block that needed it on failure.
    fn require(&self, block: &str, request: &str) -> Result<TextureRegion> {
        self.find(request).ok_or_else(|| MesherError::MissingTexture {
            block: block.to_string(),
            texture: request.to_string(),
        })
    }
}

/// Which part of the named texture a request selects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RequestArea {
    Full,
    Tile(u32, u32),
    Rect(f32, f32, f32, f32),
}

/// A parsed texture request.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureRequest {
    pub path: String,
    pub area: RequestArea,
}

impl TextureRequest {
    pub fn parse(request: &str) -> Result<Self> {
        let request = request.trim();
        let invalid = || MesherError::InvalidTextureRequest(request.to_string());

        let (path, area) = if let Some(split) = request.find('[') {
            let params = request[split..]
                .strip_prefix('[')
                .and_then(|p| p.strip_suffix(']'))
                .ok_or_else(invalid)?;
            let values = parse_numbers(params).ok_or_else(invalid)?;
            match values.as_slice() {
                [x, y] if *x >= 0.0 && *y >= 0.0 => {
                    (&request[..split], RequestArea::Tile(*x as u32, *y as u32))
                }
                _ => return Err(invalid()),
            }
        } else if let Some(split) = request.find('(') {
            let params = request[split..]
                .strip_prefix('(')
                .and_then(|p| p.strip_suffix(')'))
                .ok_or_else(invalid)?;
            let values = parse_numbers(params).ok_or_else(invalid)?;
            match values.as_slice() {
                [u0, v0, u1, v1] => (&request[..split], RequestArea::Rect(*u0, *v0, *u1, *v1)),
                _ => return Err(invalid()),
            }
        } else {
            (request, RequestArea::Full)
        };

        let path = path.trim();
        if path.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            path: path.to_string(),
            area,
        })
    }
}

fn parse_numbers(params: &str) -> Option<Vec<f32>> {
    params
        .split(',')
        .map(|p| p.trim().parse::<f32>().ok())
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct TableEntry {
    region: TextureRegion,
    frame_count: u32,
}

/// Texture regions keyed by resource location.
///
/// Built by the atlas builder; usable directly in tests.
#[derive(Debug, Clone, Default)]
pub struct TextureTable {
    version: PackVersion,
    frame_selection: FrameSelection,
    entries: HashMap<String, TableEntry>,
}

impl TextureTable {
    pub fn new(version: PackVersion) -> Self {
        Self {
            version,
            frame_selection: FrameSelection::default(),
            entries: HashMap::new(),
        }
    }

    pub fn with_frame_selection(mut self, selection: FrameSelection) -> Self {
        self.frame_selection = selection;
        self
    }

    /// Register a texture. `frame_count > 1` marks a vertical animation strip.
    pub fn insert(&mut self, location: &str, region: TextureRegion, frame_count: u32) {
        let region = TextureRegion {
            version: self.version,
            ..region
        };
        self.entries.insert(
            normalize_location(location),
            TableEntry {
                region,
                frame_count: frame_count.max(1),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn lookup(&self, path: &str) -> Option<&TableEntry> {
        let path = path.trim_end_matches(".png");
        self.entries
            .get(&normalize_location(path))
            .or_else(|| {
                // Bare names fall back to the block texture folders.
                if path.contains('/') {
                    None
                } else {
                    ["block/", "blocks/"]
                        .iter()
                        .find_map(|folder| self.entries.get(&normalize_location(&format!("{folder}{path}"))))
                }
            })
    }
}

impl TextureProvider for TextureTable {
    fn find(&self, request: &str) -> Option<TextureRegion> {
        let request = TextureRequest::parse(request).ok()?;
        let entry = self.lookup(&request.path)?;
        let base = entry.region.select_frame(entry.frame_count, self.frame_selection);

        Some(match request.area {
            RequestArea::Full => base,
            RequestArea::Tile(x, y) => base.tile(x, y),
            RequestArea::Rect(u0, v0, u1, v1) => base.sub_region(u0, v0, u1, v1),
        })
    }

    fn version(&self) -> PackVersion {
        self.version
    }
}

/// "block/stone" and "minecraft:block/stone" name the same texture.
pub fn normalize_location(location: &str) -> String {
    if location.contains(':') {
        location.to_string()
    } else {
        format!("minecraft:{location}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::AtlasId;

    #[test]
    fn test_parse_plain_request() {
        let req = TextureRequest::parse("  block/stone ").unwrap();
        assert_eq!(req.path, "block/stone");
        assert_eq!(req.area, RequestArea::Full);
    }

    #[test]
    fn test_parse_tile_request() {
        let req = TextureRequest::parse("terrain[3, 14]").unwrap();
        assert_eq!(req.path, "terrain");
        assert_eq!(req.area, RequestArea::Tile(3, 14));
    }

    #[test]
    fn test_parse_rect_request() {
        let req = TextureRequest::parse("block/door(0, 0.5, 1, 1)").unwrap();
        assert_eq!(req.area, RequestArea::Rect(0.0, 0.5, 1.0, 1.0));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(TextureRequest::parse("terrain[1]").is_err());
        assert!(TextureRequest::parse("terrain[a, b]").is_err());
        assert!(TextureRequest::parse("terrain(1, 2)").is_err());
        assert!(TextureRequest::parse("[1, 2]").is_err());
    }

    #[test]
    fn test_table_lookup_forms() {
        let mut table = TextureTable::new(PackVersion::V1_9);
        let region = TextureRegion::new(AtlasId(0), 0.0, 0.0, 0.5, 0.5, PackVersion::V1_9);
        table.insert("block/stone", region, 1);

        assert_eq!(table.find("minecraft:block/stone"), Some(region));
        assert_eq!(table.find("block/stone.png"), Some(region));
        assert_eq!(table.find("stone"), Some(region));
        assert!(table.find("block/dirt").is_none());
    }

    #[test]
    fn test_table_stamps_version() {
        let mut table = TextureTable::new(PackVersion::V1_4);
        table.insert("terrain", TextureRegion::full(AtlasId(0), PackVersion::V1_15), 1);
        let tile = table.find("terrain[1, 0]").unwrap();
        assert_eq!(tile.version, PackVersion::V1_4);
        assert!(tile.u0 > 1.0 / 16.0 && tile.u1 < 2.0 / 16.0);
    }

    #[test]
    fn test_table_selects_animation_frame() {
        let mut table =
            TextureTable::new(PackVersion::V1_9).with_frame_selection(FrameSelection::Fixed(2));
        table.insert("block/water", TextureRegion::full(AtlasId(0), PackVersion::V1_9), 4);
        let region = table.find("block/water").unwrap();
        assert!((region.v0 - 0.5).abs() < 1e-6);
        assert!((region.v1 - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_require_names_block() {
        let table = TextureTable::new(PackVersion::V1_9);
        let err = table.require("Slab", "block/missing").unwrap_err();
        assert!(err.to_string().contains("Slab"));
        assert!(err.to_string().contains("block/missing"));
    }
}
