//! Full-cube blocks: plain solids, per-data solids and glass.

use super::Placement;
use crate::mesher::cuboid::{add_cuboid, Cuboid, CuboidTextures, FaceLights};
use crate::mesher::face_culler::CullType;
use crate::mesher::geometry::{BlendMode, GeometryBuffers, MeshKey};
use crate::texture::TextureRegion;
use crate::types::Direction;

fn emit_cube(at: &Placement, textures: &CuboidTextures, blend: BlendMode, buffers: &mut GeometryBuffers) {
    let faces = at.visible_faces();
    if faces.count() == 0 {
        return;
    }
    let lights = FaceLights::sample(at.ctx, at.pos);
    let key = MeshKey::for_region(textures.region(Direction::Up), blend);
    add_cuboid(
        buffers.mesh_mut(key),
        at.origin(),
        &Cuboid::full(),
        textures,
        &lights,
        [1.0; 4],
        faces,
    );
}

fn blend_for(alpha_test: bool) -> BlendMode {
    if alpha_test {
        BlendMode::AlphaTest
    } else {
        BlendMode::Solid
    }
}

fn cull_for(alpha_test: bool) -> CullType {
    if alpha_test {
        CullType::NonSolid
    } else {
        CullType::Opaque
    }
}

/// A cube with one top and one side texture.
///
/// Alpha-tested solids (leaves) go to the cut-out mesh and do not hide their
/// neighbours' faces.
#[derive(Debug, Clone)]
pub struct Solid {
    textures: CuboidTextures,
    alpha_test: bool,
}

impl Solid {
    pub fn new(top: TextureRegion, side: TextureRegion, alpha_test: bool) -> Self {
        Self {
            textures: CuboidTextures::uniform(top, side),
            alpha_test,
        }
    }

    pub fn blend(&self) -> BlendMode {
        blend_for(self.alpha_test)
    }

    pub fn cull_type(&self) -> CullType {
        cull_for(self.alpha_test)
    }

    pub(crate) fn emit(&self, at: &Placement, buffers: &mut GeometryBuffers) {
        emit_cube(at, &self.textures, self.blend(), buffers);
    }
}

/// A cube whose textures are picked by the data nibble (wool, planks).
#[derive(Debug, Clone)]
pub struct DataSolid {
    variants: Vec<CuboidTextures>,
    alpha_test: bool,
}

impl DataSolid {
    /// `tops` and `sides` pair up by index; extra entries of the longer list
    /// are ignored.
    pub fn new(tops: &[TextureRegion], sides: &[TextureRegion], alpha_test: bool) -> Self {
        Self {
            variants: tops
                .iter()
                .zip(sides)
                .map(|(top, side)| CuboidTextures::uniform(*top, *side))
                .collect(),
            alpha_test,
        }
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    pub fn cull_type(&self) -> CullType {
        cull_for(self.alpha_test)
    }

    fn textures(&self, data: u8) -> Option<&CuboidTextures> {
        let index = usize::from(data);
        if index >= self.variants.len() {
            tracing::warn!(data, variants = self.variants.len(), "data value out of range, using variant 0");
            return self.variants.first();
        }
        self.variants.get(index)
    }

    pub(crate) fn emit(&self, at: &Placement, buffers: &mut GeometryBuffers) {
        if let Some(textures) = self.textures(at.data) {
            emit_cube(at, textures, blend_for(self.alpha_test), buffers);
        }
    }
}

/// Blended cube. Faces between blocks of the same id are dropped.
#[derive(Debug, Clone)]
pub struct Glass {
    textures: CuboidTextures,
}

impl Glass {
    pub fn new(texture: TextureRegion) -> Self {
        Self {
            textures: CuboidTextures::uniform(texture, texture),
        }
    }

    pub(crate) fn emit(&self, at: &Placement, buffers: &mut GeometryBuffers) {
        emit_cube(at, &self.textures, BlendMode::Transparent, buffers);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{BlockKind, BlockType};
    use super::*;
    use crate::mesher::face_culler::RenderMode;
    use crate::texture::{AtlasId, PackVersion};
    use crate::types::BlockPosition;
    use crate::world::WorldSnapshot;

    #[test]
    fn test_enclosed_block_emits_nothing() {
        let mut world = WorldSnapshot::new();
        let pos = BlockPosition::new(4, 20, 4);
        world.set_block(pos, 1, 0);
        for dir in Direction::ALL {
            world.set_block(pos.neighbor(dir), 1, 0);
        }
        let registry = registry_with(vec![solid_type(1)]);

        let edge = emit(&world, &registry, pos, RenderMode::Edge);
        assert_eq!(edge.total_quads(), 0);

        let interior = emit(&world, &registry, pos, RenderMode::Interior);
        assert_eq!(interior.total_quads(), 6);
    }

    #[test]
    fn test_lone_block_emits_six_faces() {
        let mut world = WorldSnapshot::new();
        let pos = BlockPosition::new(0, 64, 0);
        world.set_block(pos, 1, 0);
        let registry = registry_with(vec![solid_type(1)]);

        let buffers = emit(&world, &registry, pos, RenderMode::Edge);
        let mesh = buffers.mesh(MeshKey::new(AtlasId(0), BlendMode::Solid)).unwrap();
        assert_eq!(mesh.quad_count(), 6);
    }

    #[test]
    fn test_data_solid_clamps_index() {
        let a = TextureRegion::new(AtlasId(0), 0.0, 0.0, 0.5, 0.5, PackVersion::V1_9);
        let b = TextureRegion::new(AtlasId(0), 0.5, 0.5, 1.0, 1.0, PackVersion::V1_9);
        let wool = DataSolid::new(&[a, b], &[a, b], false);
        assert_eq!(wool.variant_count(), 2);
        assert_eq!(wool.textures(1).map(|t| *t.region(Direction::Up)), Some(b));
        assert_eq!(wool.textures(9).map(|t| *t.region(Direction::Up)), Some(a));
    }

    #[test]
    fn test_glass_hides_faces_between_panes() {
        let mut world = WorldSnapshot::new();
        let pos = BlockPosition::new(0, 64, 0);
        world.set_block(pos, 20, 0);
        world.set_block(pos.neighbor(Direction::East), 20, 0);
        world.set_block(pos.neighbor(Direction::West), 95, 0);
        let registry = registry_with(vec![
            BlockType::new("glass", 20, BlockKind::Glass(Glass::new(region()))),
            BlockType::new("stained glass", 95, BlockKind::Glass(Glass::new(region()))),
        ]);

        let buffers = emit(&world, &registry, pos, RenderMode::Edge);
        let mesh = buffers.mesh(MeshKey::new(AtlasId(0), BlendMode::Transparent)).unwrap();
        assert_eq!(mesh.quad_count(), 5);
    }

    #[test]
    fn test_leaves_use_cut_out_mesh() {
        let leaves = Solid::new(region(), region(), true);
        assert_eq!(leaves.blend(), BlendMode::AlphaTest);
    }
}
