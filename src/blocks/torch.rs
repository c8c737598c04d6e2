//! Torches, standing or leaning against a wall.

use super::Placement;
use crate::mesher::geometry::{BlendMode, GeometryBuffers, MeshKey};
use crate::texture::TextureRegion;
use glam::Vec3;

const LEFT: f32 = 7.0 / 16.0;
const RIGHT: f32 = 9.0 / 16.0;
const HEIGHT: f32 = 10.0 / 16.0;

/// Side and top cut from a torch texture.
///
/// The side skips the six empty rows above the flame; the top is the 2x2
/// texel tip of the stick.
pub(crate) fn torch_textures(texture: &TextureRegion) -> (TextureRegion, TextureRegion) {
    (texture.offset_v_texels(6.0), texture.inset_texels(7.0, 6.0, 7.0, 8.0))
}

/// Feed the five quads of a torch stick to `quad`.
///
/// `base` is the corner of the unit cell the stick stands in. `lean` moves
/// the bottom of the stick (x and z) and raises the whole stick (y).
pub(crate) fn torch_quads(
    base: Vec3,
    lean: Vec3,
    side: &TextureRegion,
    top: &TextureRegion,
    mut quad: impl FnMut([Vec3; 4], &TextureRegion),
) {
    let Vec3 { x, y, z } = base;
    let Vec3 { x: ox, y: oy, z: oz } = lean;
    let v = Vec3::new;
    let (bottom, tip) = (y + oy, y + HEIGHT + oy);

    quad(
        [v(x + LEFT, tip, z + LEFT), v(x + RIGHT, tip, z + LEFT), v(x + RIGHT, tip, z + RIGHT), v(x + LEFT, tip, z + RIGHT)],
        top,
    );
    quad(
        [
            v(x + LEFT, tip, z),
            v(x + LEFT, tip, z + 1.0),
            v(x + LEFT + ox, bottom, z + 1.0 + oz),
            v(x + LEFT + ox, bottom, z + oz),
        ],
        side,
    );
    quad(
        [
            v(x + RIGHT, tip, z + 1.0),
            v(x + RIGHT, tip, z),
            v(x + RIGHT + ox, bottom, z + oz),
            v(x + RIGHT + ox, bottom, z + 1.0 + oz),
        ],
        side,
    );
    quad(
        [
            v(x + 1.0, tip, z + LEFT),
            v(x, tip, z + LEFT),
            v(x + ox, bottom, z + LEFT + oz),
            v(x + 1.0 + ox, bottom, z + LEFT + oz),
        ],
        side,
    );
    quad(
        [
            v(x, tip, z + RIGHT),
            v(x + 1.0, tip, z + RIGHT),
            v(x + 1.0 + ox, bottom, z + RIGHT + oz),
            v(x + ox, bottom, z + RIGHT + oz),
        ],
        side,
    );
}

/// Lean of a torch by data value: toward the wall it hangs on.
fn lean(data: u8) -> Vec3 {
    match data {
        1 => Vec3::new(-0.5, 0.4, 0.0),
        2 => Vec3::new(0.5, 0.4, 0.0),
        3 => Vec3::new(0.0, 0.4, -0.5),
        4 => Vec3::new(0.0, 0.4, 0.5),
        0 | 5 => Vec3::ZERO,
        other => {
            tracing::warn!(data = other, "unknown torch placement, drawing it upright");
            Vec3::ZERO
        }
    }
}

#[derive(Debug, Clone)]
pub struct Torch {
    side: TextureRegion,
    top: TextureRegion,
}

impl Torch {
    pub fn new(texture: TextureRegion) -> Self {
        let (side, top) = torch_textures(&texture);
        Self { side, top }
    }

    pub(crate) fn emit(&self, at: &Placement, buffers: &mut GeometryBuffers) {
        let mesh = buffers.mesh_mut(MeshKey::for_region(&self.top, BlendMode::AlphaTest));
        torch_quads(at.origin(), lean(at.data), &self.side, &self.top, |positions, region| {
            mesh.add_region_quad(positions, [1.0; 4], region);
        });
    }
}
