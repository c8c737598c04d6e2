//! Beds: two blocks, head and foot, modelled along x and turned by the
//! direction bits.

use super::{grey, Placement};
use crate::mesher::geometry::{BlendMode, GeometryBuffers, MeshKey};
use crate::mesher::sub_mesh::{mirrored_uvs, SubMesh, Turn};
use crate::texture::TextureRegion;
use crate::types::LightFace;
use glam::Vec3;

const HEIGHT: f32 = 9.0 / 16.0;

/// Turn for the low two data bits. Every value has an entry.
fn direction_turn(data: u8) -> Turn {
    match data & 3 {
        0 => Turn::anti_clockwise(90.0),
        1 => Turn::clockwise(180.0),
        2 => Turn::clockwise(90.0),
        _ => Turn::NONE,
    }
}

/// Textures of one half of a bed.
#[derive(Debug, Clone, Copy)]
struct BedHalf {
    top: TextureRegion,
    end: TextureRegion,
    edge: TextureRegion,
}

#[derive(Debug, Clone)]
pub struct Bed {
    head: BedHalf,
    foot: BedHalf,
}

impl Bed {
    /// Side and end textures have nine empty rows above the mattress.
    pub fn new(
        head_top: TextureRegion,
        foot_top: TextureRegion,
        head_side: TextureRegion,
        foot_side: TextureRegion,
        head_edge: TextureRegion,
        foot_edge: TextureRegion,
    ) -> Self {
        Self {
            head: BedHalf {
                top: head_top,
                end: head_side.offset_v_texels(9.0),
                edge: head_edge.offset_v_texels(9.0),
            },
            foot: BedHalf {
                top: foot_top,
                end: foot_side.offset_v_texels(9.0),
                edge: foot_edge.offset_v_texels(9.0),
            },
        }
    }

    fn half_mesh(half: &BedHalf, is_head: bool, colour: [f32; 4]) -> SubMesh {
        let v = Vec3::new;
        let h = HEIGHT;
        let mut mesh = SubMesh::new();

        mesh.add_quad([v(0.0, h, 0.0), v(1.0, h, 0.0), v(1.0, h, 1.0), v(0.0, h, 1.0)], colour, &half.top);
        if is_head {
            mesh.add_quad([v(1.0, h, 1.0), v(1.0, h, 0.0), v(1.0, 0.0, 0.0), v(1.0, 0.0, 1.0)], colour, &half.end);
        } else {
            mesh.add_quad([v(0.0, h, 0.0), v(0.0, h, 1.0), v(0.0, 0.0, 1.0), v(0.0, 0.0, 0.0)], colour, &half.end);
        }
        mesh.add_quad([v(0.0, h, 1.0), v(1.0, h, 1.0), v(1.0, 0.0, 1.0), v(0.0, 0.0, 1.0)], colour, &half.edge);
        mesh.add_quad_uvs(
            [v(1.0, h, 0.0), v(0.0, h, 0.0), v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0)],
            colour,
            mirrored_uvs(&half.edge),
        );
        mesh
    }

    pub(crate) fn emit(&self, at: &Placement, buffers: &mut GeometryBuffers) {
        let is_head = at.data & 8 != 0;
        let half = if is_head { &self.head } else { &self.foot };
        let colour = grey(at.light(LightFace::Top));

        Self::half_mesh(half, is_head, colour).push_to(
            buffers.mesh_mut(MeshKey::for_region(&half.top, BlendMode::AlphaTest)),
            at.origin(),
            direction_turn(at.data),
            Turn::NONE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{BlockKind, BlockType};
    use super::*;
    use crate::mesher::face_culler::RenderMode;
    use crate::mesher::geometry::Mesh;
    use crate::texture::AtlasId;
    use crate::types::BlockPosition;
    use crate::world::WorldSnapshot;

    fn bed_mesh(data: u8) -> Mesh {
        let mut world = WorldSnapshot::new();
        let pos = BlockPosition::new(0, 64, 0);
        world.set_block(pos, 26, data);
        let r = region();
        let registry = registry_with(vec![BlockType::new(
            "bed",
            26,
            BlockKind::Bed(Bed::new(r, r, r, r, r, r)),
        )]);
        emit(&world, &registry, pos, RenderMode::Edge)
            .mesh(MeshKey::new(AtlasId(0), BlendMode::AlphaTest))
            .cloned()
            .unwrap()
    }

    /// Horizontal position of the end quad, the second one emitted.
    fn end_centre(mesh: &Mesh) -> [f32; 2] {
        let quad = &mesh.vertices[4..8];
        let x = quad.iter().map(|v| v.position[0]).sum::<f32>() / 4.0;
        let z = quad.iter().map(|v| v.position[2]).sum::<f32>() / 4.0;
        [x, z]
    }

    #[test]
    fn test_bed_is_nine_sixteenths_tall() {
        let mesh = bed_mesh(3);
        assert_eq!(mesh.quad_count(), 4);
        let top = mesh.vertices.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        assert!((top - 64.0 - HEIGHT).abs() < 1e-4);
    }

    #[test]
    fn test_head_and_foot_ends_face_apart() {
        let head = end_centre(&bed_mesh(3 | 8));
        let foot = end_centre(&bed_mesh(3));
        assert!((head[0] - 1.0).abs() < 1e-4);
        assert!(foot[0].abs() < 1e-4);
    }

    #[test]
    fn test_direction_turns_end() {
        let turned = end_centre(&bed_mesh(1 | 8));
        assert!(turned[0].abs() < 1e-4, "half turn puts the head end at x = 0");
        let quarter = end_centre(&bed_mesh(2 | 8));
        assert!((quarter[0] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_side_textures_skip_empty_rows() {
        let r = region();
        let bed = Bed::new(r, r, r, r, r, r);
        assert!((bed.head.end.v0 - 9.0 / 16.0).abs() < 1e-6);
        assert_eq!(bed.foot.top, r);
    }
}
