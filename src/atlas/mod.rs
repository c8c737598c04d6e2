//! Texture atlas building.
//!
//! All pack textures are packed into a single RGBA image, and each texture's
//! rectangle is recorded as a [`TextureRegion`](crate::texture::TextureRegion).

mod builder;

pub use builder::{AtlasBuilder, TextureAtlas};
