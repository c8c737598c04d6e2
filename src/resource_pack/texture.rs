//! Decoded pack textures.

/// RGBA8 pixels of one PNG from the pack.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixel data (4 bytes per pixel).
    pub pixels: Vec<u8>,
    /// Frames stacked vertically (1 if not animated).
    pub frame_count: u32,
}

impl TextureData {
    /// Create a new texture from RGBA data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
            frame_count: 1,
        }
    }

    /// Texture filled with one colour.
    pub fn solid(width: u32, height: u32, colour: [u8; 4]) -> Self {
        let pixels = (0..width * height).flat_map(|_| colour).collect();
        Self::new(width, height, pixels)
    }

    pub fn is_animated(&self) -> bool {
        self.frame_count > 1
    }

    /// Check if this texture has transparency.
    pub fn has_transparency(&self) -> bool {
        self.pixels.chunks(4).any(|pixel| pixel.get(3).is_some_and(|a| *a < 255))
    }

    /// Get a pixel at (x, y). Out-of-range coordinates read as transparent.
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let idx = ((y * self.width + x) * 4) as usize;
        match self.pixels.get(idx..idx + 4) {
            Some(p) => [p[0], p[1], p[2], p[3]],
            None => [0; 4],
        }
    }

    /// One frame of a vertical strip, clamped to the last frame.
    ///
    /// Non-animated textures return themselves.
    pub fn frame(&self, index: u32) -> TextureData {
        if !self.is_animated() {
            return self.clone();
        }

        let index = index.min(self.frame_count - 1);
        let frame_height = self.height / self.frame_count;
        let row_bytes = (self.width * 4) as usize;
        let start = index as usize * frame_height as usize * row_bytes;
        let end = start + frame_height as usize * row_bytes;

        Self::new(
            self.width,
            frame_height,
            self.pixels.get(start..end).map(<[u8]>::to_vec).unwrap_or_default(),
        )
    }
}

/// Decode a texture from PNG bytes.
///
/// A texture taller than wide whose height is a multiple of its width is
/// an animation strip of square frames.
pub fn load_texture_from_bytes(data: &[u8]) -> Result<TextureData, image::ImageError> {
    let img = image::load_from_memory(data)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let animated = width > 0 && height > width && height % width == 0;
    let frame_count = if animated { height / width } else { 1 };

    Ok(TextureData {
        width,
        height,
        pixels: rgba.into_raw(),
        frame_count,
    })
}
