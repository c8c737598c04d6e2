//! Texture regions and the providers that hand them to emitters.

pub mod provider;
pub mod region;

pub use provider::{TextureProvider, TextureRequest, TextureTable};
pub use region::{AtlasId, FrameSelection, PackVersion, TextureRegion};
