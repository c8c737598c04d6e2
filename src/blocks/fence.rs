//! Fences: a post with bars toward connecting neighbours.

use super::Placement;
use crate::mesher::cuboid::{add_cuboid, Cuboid, CuboidTextures, FaceLights, FaceMask};
use crate::mesher::geometry::{BlendMode, GeometryBuffers, MeshKey};
use crate::texture::TextureRegion;
use crate::types::Direction;

const POST: Cuboid = Cuboid {
    offset: [6.0, 0.0, 6.0],
    extent: [4.0, 16.0, 4.0],
};

/// Heights of the two bars, in sixteenths.
const BAR_HEIGHTS: [f32; 2] = [12.0, 6.0];

fn bar(dir: Direction, y: f32) -> Option<Cuboid> {
    let (offset, extent) = match dir {
        Direction::West => ([0.0, y, 7.0], [8.0, 3.0, 2.0]),
        Direction::East => ([8.0, y, 7.0], [8.0, 3.0, 2.0]),
        Direction::North => ([7.0, y, 0.0], [2.0, 3.0, 8.0]),
        Direction::South => ([7.0, y, 8.0], [2.0, 3.0, 8.0]),
        Direction::Up | Direction::Down => return None,
    };
    Some(Cuboid::new(offset, extent))
}

#[derive(Debug, Clone)]
pub struct Fence {
    textures: CuboidTextures,
    gate_ids: Vec<u16>,
}

impl Fence {
    /// Bars reach toward fences of the same id and toward `gate_ids`.
    pub fn new(texture: TextureRegion, gate_ids: Vec<u16>) -> Self {
        Self {
            textures: CuboidTextures::uniform(texture, texture),
            gate_ids,
        }
    }

    fn connects(&self, own_id: u16, neighbour: u16) -> bool {
        neighbour == own_id || self.gate_ids.contains(&neighbour)
    }

    pub(crate) fn emit(&self, at: &Placement, buffers: &mut GeometryBuffers) {
        let lights = FaceLights::at(at.ctx, at.pos);
        let origin = at.origin();
        let mesh = buffers.mesh_mut(MeshKey::for_region(self.textures.region(Direction::Up), BlendMode::Solid));

        add_cuboid(mesh, origin, &POST, &self.textures, &lights, [1.0; 4], FaceMask::ALL);

        for dir in Direction::HORIZONTAL {
            if !self.connects(at.id, at.ctx.block_id(at.pos.neighbor(dir))) {
                continue;
            }
            for y in BAR_HEIGHTS {
                if let Some(cuboid) = bar(dir, y) {
                    add_cuboid(mesh, origin, &cuboid, &self.textures, &lights, [1.0; 4], FaceMask::ALL);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{BlockKind, BlockType};
    use super::*;
    use crate::mesher::face_culler::RenderMode;
    use crate::texture::AtlasId;
    use crate::types::BlockPosition;
    use crate::world::WorldSnapshot;

    fn quads_with(neighbours: &[(Direction, u16)]) -> usize {
        let mut world = WorldSnapshot::new();
        let pos = BlockPosition::new(0, 64, 0);
        world.set_block(pos, 85, 0);
        for (dir, id) in neighbours {
            world.set_block(pos.neighbor(*dir), *id, 0);
        }
        let registry = registry_with(vec![
            solid_type(1),
            BlockType::new("fence", 85, BlockKind::Fence(Fence::new(region(), vec![107]))),
        ]);
        let buffers = emit(&world, &registry, pos, RenderMode::Edge);
        buffers
            .mesh(MeshKey::new(AtlasId(0), BlendMode::Solid))
            .map_or(0, |m| m.quad_count())
    }

    #[test]
    fn test_lone_post() {
        assert_eq!(quads_with(&[]), 6);
    }

    #[test]
    fn test_bars_toward_fences_and_gates() {
        // Two bars per connection, six faces each.
        assert_eq!(quads_with(&[(Direction::East, 85)]), 6 + 12);
        assert_eq!(quads_with(&[(Direction::East, 85), (Direction::North, 107)]), 6 + 24);
    }

    #[test]
    fn test_no_bars_toward_other_blocks() {
        assert_eq!(quads_with(&[(Direction::West, 1), (Direction::Up, 85)]), 6);
    }

    #[test]
    fn test_bar_shapes_meet_post() {
        let east = bar(Direction::East, 12.0).unwrap();
        assert_eq!(east.offset[0] + east.extent[0], 16.0);
        assert!(bar(Direction::Up, 6.0).is_none());
    }
}
