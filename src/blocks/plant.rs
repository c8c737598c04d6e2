//! Crossed-quad plants (flowers, saplings, tall grass).

use super::{grey, Placement};
use crate::mesher::geometry::{region_uvs, BlendMode, GeometryBuffers, MeshKey};
use crate::texture::TextureRegion;
use crate::types::LightFace;
use glam::Vec3;

/// Two double-sided quads crossing diagonally through the block.
#[derive(Debug, Clone)]
pub struct Plant {
    texture: TextureRegion,
    tinted: bool,
}

impl Plant {
    /// `tinted` plants are multiplied by the biome colour.
    pub fn new(texture: TextureRegion, tinted: bool) -> Self {
        Self { texture, tinted }
    }

    pub(crate) fn emit(&self, at: &Placement, buffers: &mut GeometryBuffers) {
        let mut colour = grey(at.light(LightFace::Top));
        if self.tinted {
            let biome = at.ctx.biome_colour(at.pos);
            for (c, b) in colour.iter_mut().zip(biome).take(3) {
                *c *= b;
            }
        }

        let Vec3 { x, y, z } = at.origin();
        let v = Vec3::new;
        let uvs = region_uvs(&self.texture);
        let mesh = buffers.mesh_mut(MeshKey::for_region(&self.texture, BlendMode::AlphaTest));

        mesh.add_double_sided_quad(
            [v(x, y + 1.0, z), v(x + 1.0, y + 1.0, z + 1.0), v(x + 1.0, y, z + 1.0), v(x, y, z)],
            uvs,
            colour,
        );
        mesh.add_double_sided_quad(
            [v(x + 1.0, y + 1.0, z), v(x, y + 1.0, z + 1.0), v(x, y, z + 1.0), v(x + 1.0, y, z)],
            uvs,
            colour,
        );
    }
}
