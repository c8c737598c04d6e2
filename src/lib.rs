//! # isomap-mesher
//!
//! Turns a snapshot of a voxel world into textured triangle geometry for
//! isometric map rendering.
//!
//! ## Overview
//!
//! A resource pack (ZIP or directory) provides textures, blockstates and
//! models. Textures are packed into an atlas, models are resolved once, and
//! a [`BlockConfig`] maps numeric block ids to block types. The [`Mesher`]
//! then walks a [`BlockContext`] and emits one indexed triangle list per
//! (atlas, blend mode), which the exporters write as GLB, OBJ or raw arrays.
//!
//! ## Quick Start
//!
//! ```ignore
//! use isomap_mesher::{export_glb, load_resource_pack, BlockConfig, Mesher, MesherConfig, WorldSnapshot};
//!
//! let (pack, _report) = load_resource_pack("path/to/pack.zip")?;
//! let (mesher, _report) = Mesher::from_pack(&pack, &BlockConfig::builtin(), MesherConfig::default())?;
//!
//! let world = WorldSnapshot::load("world.json")?;
//! let output = mesher.mesh(&world);
//! let glb_bytes = export_glb(&output)?;
//! ```
//!
//! ## Library Integration
//!
//! Existing world storage can be meshed directly by implementing
//! [`BlockContext`] for it. Implementations must be `Sync`: chunks are
//! built in parallel and look up their neighbours across chunk borders.

pub mod atlas;
pub mod blocks;
pub mod error;
pub mod export;
pub mod mesher;
pub mod resolver;
pub mod resource_pack;
pub mod texture;
pub mod types;
pub mod world;

pub use atlas::TextureAtlas;
pub use blocks::{BlockConfig, BlockKind, BlockType, BlockTypeRegistry};
pub use error::{MesherError, Result};
pub use export::gltf::export_glb;
pub use export::obj::{export_obj, ObjExport};
pub use export::raw::{export_raw, RawMeshData};
pub use mesher::{
    BlendMode, GeometryBuffers, LightStyle, Mesh, MeshKey, Mesher, MesherConfig, MesherOutput, RenderMode,
    Vertex,
};
pub use resolver::ModelRegistry;
pub use resource_pack::{BlockModel, Blockstate, LoadReport, ResourcePack};
pub use texture::{FrameSelection, PackVersion, TextureProvider, TextureRegion};
pub use types::{BlockContext, BlockPosition, BoundingBox, Direction};
pub use world::WorldSnapshot;

/// Load a resource pack from a file path (ZIP or directory).
///
/// Files that fail to parse are skipped and listed in the report.
pub fn load_resource_pack<P: AsRef<std::path::Path> + std::fmt::Debug>(path: P) -> Result<(ResourcePack, LoadReport)> {
    resource_pack::loader::load_from_path(path)
}

/// Load a resource pack from the bytes of a ZIP archive.
pub fn load_resource_pack_from_bytes(data: &[u8]) -> Result<(ResourcePack, LoadReport)> {
    resource_pack::loader::load_from_bytes(data)
}
