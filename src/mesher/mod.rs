//! Geometry generation for block snapshots.
//!
//! [`Mesher::build`] walks every block of a [`BlockContext`], groups the
//! positions by chunk column and runs the block emitters for each chunk on
//! the rayon pool. Chunk results are merged in ascending chunk order, so the
//! output does not depend on scheduling.

pub mod cuboid;
pub mod element;
pub mod face_culler;
pub mod geometry;
pub mod lighting;
pub mod sub_mesh;

pub use face_culler::RenderMode;
pub use geometry::{BlendMode, GeometryBuffers, Mesh, MeshKey, Vertex};
pub use lighting::LightStyle;

use crate::atlas::TextureAtlas;
use crate::blocks::{BlockConfig, BlockTypeRegistry};
use crate::error::Result;
use crate::resolver::ModelRegistry;
use crate::resource_pack::{LoadReport, ResourcePack};
use crate::texture::{AtlasId, FrameSelection};
use crate::types::{BlockContext, BlockPosition, BoundingBox, ChunkCoord, AIR};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Main mesher configuration.
#[derive(Debug, Clone)]
pub struct MesherConfig {
    /// Whether faces are culled against neighbours.
    pub render_mode: RenderMode,
    /// Frame of animated textures packed into the atlas.
    pub frame_selection: FrameSelection,
    /// Build chunks on the rayon pool.
    pub parallel: bool,
    /// Maximum texture atlas dimension.
    pub atlas_max_size: u32,
    /// Padding between textures in the atlas.
    pub atlas_padding: u32,
}

impl Default for MesherConfig {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::Edge,
            frame_selection: FrameSelection::First,
            parallel: true,
            atlas_max_size: 4096,
            atlas_padding: 1,
        }
    }
}

impl MesherConfig {
    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    pub fn with_frame_selection(mut self, selection: FrameSelection) -> Self {
        self.frame_selection = selection;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_atlas_size(mut self, max_size: u32, padding: u32) -> Self {
        self.atlas_max_size = max_size;
        self.atlas_padding = padding;
        self
    }
}

/// Output from the mesher.
#[derive(Debug, Clone)]
pub struct MesherOutput {
    /// One buffer per (atlas, blend mode).
    pub buffers: GeometryBuffers,
    /// The texture atlas the buffers' UVs point into.
    pub atlas: TextureAtlas,
    /// Bounds of every emitted vertex. `None` when nothing was emitted.
    pub bounds: Option<BoundingBox>,
}

impl MesherOutput {
    pub fn new(buffers: GeometryBuffers, atlas: TextureAtlas) -> Self {
        let bounds = BoundingBox::from_points(
            buffers
                .iter()
                .flat_map(|(_, mesh)| mesh.vertices.iter().map(|v| v.position)),
        );
        Self { buffers, atlas, bounds }
    }

    /// Check if the output has any alpha-blended geometry.
    pub fn has_transparency(&self) -> bool {
        self.buffers
            .non_empty()
            .any(|(key, _)| key.blend == BlendMode::Transparent)
    }

    pub fn total_vertices(&self) -> usize {
        self.buffers.total_vertices()
    }

    pub fn total_triangles(&self) -> usize {
        self.buffers.total_triangles()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

/// The main mesher: a texture atlas, the block types drawn with it and the
/// build settings.
pub struct Mesher {
    atlas: TextureAtlas,
    blocks: BlockTypeRegistry,
    config: MesherConfig,
}

impl Mesher {
    /// Mesher over a prepared atlas and block registry.
    pub fn new(atlas: TextureAtlas, blocks: BlockTypeRegistry, config: MesherConfig) -> Self {
        Self { atlas, blocks, config }
    }

    /// Pack the pack's textures, resolve its models and build the configured
    /// block types against them.
    ///
    /// Models that failed to resolve, and model blocks left out because of
    /// them, are returned in the report.
    #[tracing::instrument(skip_all, fields(block_types = blocks.blocks.len()))]
    pub fn from_pack(pack: &ResourcePack, blocks: &BlockConfig, config: MesherConfig) -> Result<(Self, LoadReport)> {
        let atlas = TextureAtlas::from_pack(
            pack,
            AtlasId(0),
            config.atlas_max_size,
            config.atlas_padding,
            config.frame_selection,
        )?;
        let textures = atlas.texture_table(pack.version);
        let (models, mut report) = ModelRegistry::build(pack);
        let (registry, skipped) = BlockTypeRegistry::from_config(blocks, &textures, Some(&models))?;
        report.extend(skipped);
        Ok((Self::new(atlas, registry, config), report))
    }

    pub fn atlas(&self) -> &TextureAtlas {
        &self.atlas
    }

    pub fn blocks(&self) -> &BlockTypeRegistry {
        &self.blocks
    }

    pub fn config(&self) -> &MesherConfig {
        &self.config
    }

    /// Build geometry for every block of `ctx`, paired with the atlas.
    pub fn mesh<C: BlockContext>(&self, ctx: &C) -> MesherOutput {
        MesherOutput::new(self.build(ctx), self.atlas.clone())
    }

    /// Build geometry for every block of `ctx`.
    #[tracing::instrument(skip_all, fields(mode = ?self.config.render_mode, parallel = self.config.parallel))]
    pub fn build<C: BlockContext>(&self, ctx: &C) -> GeometryBuffers {
        self.build_positions(ctx, ctx.iter_blocks())
    }

    /// Build geometry for the given positions only. Neighbours outside the
    /// set are still looked up for culling.
    pub fn build_positions<C: BlockContext>(
        &self,
        ctx: &C,
        positions: impl IntoIterator<Item = BlockPosition>,
    ) -> GeometryBuffers {
        let mut chunks: BTreeMap<ChunkCoord, Vec<BlockPosition>> = BTreeMap::new();
        for pos in positions {
            chunks.entry(pos.chunk()).or_default().push(pos);
        }
        let chunks: Vec<_> = chunks.into_iter().collect();

        let results: Vec<(GeometryBuffers, BTreeSet<u16>)> = if self.config.parallel {
            chunks
                .par_iter()
                .map(|(_, positions)| self.build_chunk(ctx, positions))
                .collect()
        } else {
            chunks
                .iter()
                .map(|(_, positions)| self.build_chunk(ctx, positions))
                .collect()
        };

        let mut buffers = GeometryBuffers::new();
        let mut unknown = BTreeSet::new();
        for (chunk, missing) in &results {
            buffers.merge(chunk);
            unknown.extend(missing.iter().copied());
        }
        for id in &unknown {
            tracing::warn!(id, "no block type registered, blocks skipped");
        }

        tracing::info!(
            chunks = chunks.len(),
            vertices = buffers.total_vertices(),
            triangles = buffers.total_triangles(),
            "built geometry"
        );
        buffers
    }

    /// Emit one chunk's blocks into fresh buffers. Returns the ids that had
    /// no registered type.
    fn build_chunk<C: BlockContext>(&self, ctx: &C, positions: &[BlockPosition]) -> (GeometryBuffers, BTreeSet<u16>) {
        let mut buffers = GeometryBuffers::new();
        let mut unknown = BTreeSet::new();
        let mut positions = positions.to_vec();
        positions.sort_unstable();

        for pos in positions {
            let id = ctx.block_id(pos);
            if id == AIR {
                continue;
            }
            match self.blocks.get(id, ctx.block_data(pos)) {
                Some(block) => block.add_geometry(pos, ctx, &self.blocks, self.config.render_mode, &mut buffers),
                None => {
                    unknown.insert(id);
                }
            }
        }
        (buffers, unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::test_support::{region, registry_with, solid_type};
    use crate::blocks::{BlockKind, BlockType, Glass, Torch};
    use crate::types::Direction;
    use crate::world::WorldSnapshot;

    fn mesher(config: MesherConfig) -> Mesher {
        let registry = registry_with(vec![
            solid_type(1),
            BlockType::new("glass", 20, BlockKind::Glass(Glass::new(region()))),
            BlockType::new("torch", 50, BlockKind::Torch(Torch::new(region()))),
        ]);
        Mesher::new(TextureAtlas::empty(AtlasId(0)), registry, config)
    }

    /// Blocks spread over several chunk columns, including negative ones.
    fn scattered_world() -> WorldSnapshot {
        let mut world = WorldSnapshot::new();
        for x in -20..20 {
            for z in [-17, 0, 3, 18] {
                world.set_block(BlockPosition::new(x, 60, z), 1, 0);
            }
        }
        world.set_block(BlockPosition::new(5, 61, 3), 50, 5);
        world.set_block(BlockPosition::new(-3, 61, 0), 20, 0);
        world.set_block(BlockPosition::new(-2, 61, 0), 20, 0);
        world
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let world = scattered_world();
        let parallel = mesher(MesherConfig::default()).build(&world);
        let sequential = mesher(MesherConfig::default().with_parallel(false)).build(&world);
        assert!(!parallel.is_empty());
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_enclosed_block_adds_nothing() {
        let mut world = WorldSnapshot::new();
        let centre = BlockPosition::new(8, 64, 8);
        for dir in Direction::ALL {
            world.set_block(centre.neighbor(dir), 1, 0);
        }
        let mesher = mesher(MesherConfig::default());
        let without = mesher.build(&world).total_quads();
        world.set_block(centre, 1, 0);
        let with = mesher.build(&world).total_quads();
        // The centre hides one face of each neighbour and shows none itself.
        assert_eq!(with, without - 6);
    }

    #[test]
    fn test_interior_mode_keeps_every_face() {
        let mut world = WorldSnapshot::new();
        world.set_block(BlockPosition::new(0, 64, 0), 1, 0);
        world.set_block(BlockPosition::new(1, 64, 0), 1, 0);

        let edge = mesher(MesherConfig::default()).build(&world);
        let interior = mesher(MesherConfig::default().with_render_mode(RenderMode::Interior)).build(&world);
        assert_eq!(edge.total_quads(), 10);
        assert_eq!(interior.total_quads(), 12);
    }

    #[test]
    fn test_unknown_ids_are_skipped() {
        let mut world = WorldSnapshot::new();
        world.set_block(BlockPosition::new(0, 64, 0), 999, 0);
        world.set_block(BlockPosition::new(4, 64, 0), 1, 0);
        let buffers = mesher(MesherConfig::default()).build(&world);
        assert_eq!(buffers.total_quads(), 6);
    }

    #[test]
    fn test_output_bounds_and_transparency() {
        let world = scattered_world();
        let output = mesher(MesherConfig::default()).mesh(&world);
        let bounds = output.bounds.unwrap();
        assert_eq!(bounds.min, [-20.0, 60.0, -17.0]);
        assert_eq!(bounds.max, [20.0, 62.0, 19.0]);
        assert!(output.has_transparency());

        let empty = mesher(MesherConfig::default()).mesh(&WorldSnapshot::new());
        assert!(empty.is_empty());
        assert!(empty.bounds.is_none());
    }
}
