//! Texture atlas builder using shelf packing.

use crate::error::{MesherError, Result};
use crate::resource_pack::{ResourcePack, TextureData};
use crate::texture::{AtlasId, FrameSelection, PackVersion, TextureRegion, TextureTable};
use image::ImageEncoder;
use std::collections::BTreeMap;

/// A built texture atlas.
#[derive(Debug, Clone)]
pub struct TextureAtlas {
    pub id: AtlasId,
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data.
    pub pixels: Vec<u8>,
    /// Region of each packed texture, by resource location.
    pub regions: BTreeMap<String, TextureRegion>,
    /// Frame count of each packed texture's source strip.
    frame_counts: BTreeMap<String, u32>,
}

impl TextureAtlas {
    /// Pack every texture of a pack into one atlas.
    #[tracing::instrument(skip(pack), fields(textures = pack.texture_count()))]
    pub fn from_pack(
        pack: &ResourcePack,
        id: AtlasId,
        max_size: u32,
        padding: u32,
        frame_selection: FrameSelection,
    ) -> Result<Self> {
        let mut builder = AtlasBuilder::new(id, max_size, padding)
            .with_version(pack.version)
            .with_frame_selection(frame_selection);
        for (location, texture) in pack.texture_entries() {
            builder.add_texture(location, texture.clone());
        }
        let atlas = builder.build()?;
        tracing::info!(
            width = atlas.width,
            height = atlas.height,
            regions = atlas.regions.len(),
            "built texture atlas"
        );
        Ok(atlas)
    }

    /// Get the region for a texture.
    pub fn get_region(&self, location: &str) -> Option<&TextureRegion> {
        self.regions.get(location)
    }

    /// Check if the atlas contains a texture.
    pub fn contains(&self, location: &str) -> bool {
        self.regions.contains_key(location)
    }

    /// Create an empty atlas.
    pub fn empty(id: AtlasId) -> Self {
        Self {
            id,
            width: 16,
            height: 16,
            pixels: vec![255; 16 * 16 * 4], // White
            regions: BTreeMap::new(),
            frame_counts: BTreeMap::new(),
        }
    }

    /// Named regions of this atlas for emitters.
    ///
    /// Frames were already chosen while packing, so every entry is a single
    /// frame.
    pub fn texture_table(&self, version: PackVersion) -> TextureTable {
        let mut table = TextureTable::new(version);
        for (location, region) in &self.regions {
            table.insert(location, *region, 1);
        }
        table
    }

    /// Whether the packed texture came from an animation strip.
    pub fn is_animated(&self, location: &str) -> bool {
        self.frame_counts.get(location).is_some_and(|count| *count > 1)
    }

    /// Export the atlas as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let cursor = std::io::Cursor::new(&mut bytes);
        let encoder = image::codecs::png::PngEncoder::new(cursor);

        encoder
            .write_image(
                &self.pixels,
                self.width,
                self.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| MesherError::AtlasBuild(format!("Failed to encode PNG: {}", e)))?;

        Ok(bytes)
    }
}

/// Builder for creating texture atlases.
pub struct AtlasBuilder {
    id: AtlasId,
    max_size: u32,
    padding: u32,
    version: PackVersion,
    frame_selection: FrameSelection,
    textures: BTreeMap<String, TextureData>,
}

impl AtlasBuilder {
    pub fn new(id: AtlasId, max_size: u32, padding: u32) -> Self {
        Self {
            id,
            max_size,
            padding,
            version: PackVersion::default(),
            frame_selection: FrameSelection::default(),
            textures: BTreeMap::new(),
        }
    }

    pub fn with_version(mut self, version: PackVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_frame_selection(mut self, selection: FrameSelection) -> Self {
        self.frame_selection = selection;
        self
    }

    pub fn add_texture(&mut self, location: impl Into<String>, texture: TextureData) {
        self.textures.insert(location.into(), texture);
    }

    /// Pack the textures, growing the atlas in powers of two up to
    /// `max_size`.
    pub fn build(self) -> Result<TextureAtlas> {
        if self.textures.is_empty() {
            return Ok(TextureAtlas::empty(self.id));
        }

        let padding = self.padding;
        let max_size = self.max_size;

        let mut frame_counts = BTreeMap::new();
        let mut textures: Vec<(String, TextureData)> = Vec::with_capacity(self.textures.len());
        for (location, texture) in self.textures {
            if texture.width == 0 || texture.height == 0 {
                continue;
            }
            frame_counts.insert(location.clone(), texture.frame_count);
            let frame = texture.frame(self.frame_selection.frame(texture.frame_count));
            textures.push((location, frame));
        }

        // Tallest first; ties keep location order so packing is stable.
        textures.sort_by(|a, b| b.1.height.cmp(&a.1.height).then_with(|| a.0.cmp(&b.0)));

        let total_area: u64 = textures
            .iter()
            .map(|(_, t)| u64::from(t.width + padding * 2) * u64::from(t.height + padding * 2))
            .sum();
        let widest = textures
            .iter()
            .map(|(_, t)| t.width.max(t.height) + padding * 2)
            .max()
            .unwrap_or(0);

        let min_size = ((total_area as f64).sqrt().ceil() as u32).max(widest);
        let mut atlas_size = 16u32;
        while atlas_size < min_size {
            atlas_size = atlas_size.saturating_mul(2);
        }

        loop {
            if atlas_size > max_size {
                return Err(MesherError::AtlasBuild(format!(
                    "Failed to pack {} textures into {}x{} atlas",
                    textures.len(),
                    max_size,
                    max_size
                )));
            }

            if let Some((pixels, placements)) = try_pack(&textures, atlas_size, padding) {
                let size = atlas_size as f32;
                let regions = placements
                    .into_iter()
                    .map(|(location, (x, y, w, h))| {
                        let region = TextureRegion::new(
                            self.id,
                            x as f32 / size,
                            y as f32 / size,
                            (x + w) as f32 / size,
                            (y + h) as f32 / size,
                            self.version,
                        );
                        (location, region)
                    })
                    .collect();

                return Ok(TextureAtlas {
                    id: self.id,
                    width: atlas_size,
                    height: atlas_size,
                    pixels,
                    regions,
                    frame_counts,
                });
            }

            atlas_size *= 2;
        }
    }
}

type Placement = (u32, u32, u32, u32);

/// Try to pack textures into an atlas of the given size.
fn try_pack(
    textures: &[(String, TextureData)],
    atlas_size: u32,
    padding: u32,
) -> Option<(Vec<u8>, BTreeMap<String, Placement>)> {
    let mut pixels = vec![0u8; (atlas_size as usize) * (atlas_size as usize) * 4];
    let mut placements = BTreeMap::new();

    let mut current_x = 0u32;
    let mut current_y = 0u32;
    let mut row_height = 0u32;

    for (location, texture) in textures {
        let cell_width = texture.width + padding * 2;
        let cell_height = texture.height + padding * 2;

        if current_x + cell_width > atlas_size {
            current_x = 0;
            current_y += row_height;
            row_height = 0;
        }

        if current_y + cell_height > atlas_size || cell_width > atlas_size {
            return None;
        }

        // Padding repeats the nearest edge pixel so filtering never samples
        // a neighbouring texture.
        for py in 0..cell_height {
            for px in 0..cell_width {
                let sx = (px as i32 - padding as i32).clamp(0, texture.width as i32 - 1) as u32;
                let sy = (py as i32 - padding as i32).clamp(0, texture.height as i32 - 1) as u32;

                let dst_idx = (((current_y + py) * atlas_size + current_x + px) * 4) as usize;
                if let Some(dst) = pixels.get_mut(dst_idx..dst_idx + 4) {
                    dst.copy_from_slice(&texture.get_pixel(sx, sy));
                }
            }
        }

        placements.insert(
            location.clone(),
            (current_x + padding, current_y + padding, texture.width, texture.height),
        );

        current_x += cell_width;
        row_height = row_height.max(cell_height);
    }

    Some((pixels, placements))
}
