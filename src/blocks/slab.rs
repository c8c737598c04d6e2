//! Half-height slabs.
//!
//! Data values above 7 put the slab in the upper half of the block. Sides
//! show the matching half of the side texture.

use super::{grey, Placement};
use crate::mesher::cuboid::{cuboid_face, Cuboid};
use crate::mesher::geometry::{region_uvs, BlendMode, GeometryBuffers, MeshKey};
use crate::texture::TextureRegion;
use crate::types::{Direction, LightFace};

#[derive(Debug, Clone)]
pub struct Slab {
    top: TextureRegion,
    side: TextureRegion,
}

impl Slab {
    pub fn new(top: TextureRegion, side: TextureRegion) -> Self {
        Self { top, side }
    }

    pub(crate) fn emit(&self, at: &Placement, buffers: &mut GeometryBuffers) {
        let upside_down = at.data > 7;
        let half = self.side.half_v(upside_down);
        let y = if upside_down { 8.0 } else { 0.0 };
        let cuboid = Cuboid::new([0.0, y, 0.0], [16.0, 8.0, 16.0]);

        let origin = at.origin();
        let top_light = at.ctx.light(at.pos.neighbor(Direction::Up), LightFace::Top);
        let mesh = buffers.mesh_mut(MeshKey::for_region(&self.top, BlendMode::Solid));

        // The free face of a slab is never against a neighbour.
        if !upside_down || !at.neighbour_hides(Direction::Up) {
            let (positions, uvs) = cuboid_face(origin, &cuboid, Direction::Up, &self.top);
            mesh.add_textured_quad(positions, uvs, grey(top_light));
        }
        if upside_down || !at.neighbour_hides(Direction::Down) {
            let (positions, uvs) = cuboid_face(origin, &cuboid, Direction::Down, &self.top);
            mesh.add_textured_quad(positions, uvs, grey(top_light));
        }

        for dir in Direction::HORIZONTAL {
            if at.neighbour_hides(dir) {
                continue;
            }
            let light = at.ctx.light(at.pos.neighbor(dir), dir.light_face());
            let (positions, _) = cuboid_face(origin, &cuboid, dir, &half);
            mesh.add_textured_quad(positions, region_uvs(&half), grey(light));
        }
    }
}
