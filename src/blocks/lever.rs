//! Levers: a cobblestone base with a torch-like handle.
//!
//! Both parts are modelled standing on the floor and turned into place. The
//! handle is tipped a further 45 degrees so it points up out of the base.

use super::torch::{torch_quads, torch_textures};
use super::{grey, Placement};
use crate::mesher::geometry::{BlendMode, GeometryBuffers, MeshKey};
use crate::mesher::sub_mesh::{SubMesh, Turn};
use crate::texture::TextureRegion;
use crate::types::LightFace;
use glam::Vec3;

const TEXEL: f32 = 1.0 / 16.0;

/// Horizontal and vertical turn for a placement (low three bits) and state.
fn orientation(placement: u8, on: bool) -> (Turn, Turn) {
    use Turn as T;
    match (placement & 7, on) {
        // Wall, facing east.
        (1, false) => (T::clockwise(180.0), T::clockwise(90.0)),
        (1, true) => (T::clockwise(0.0), T::clockwise(270.0)),
        // Wall, facing west.
        (2, false) => (T::clockwise(0.0), T::clockwise(90.0)),
        (2, true) => (T::clockwise(180.0), T::clockwise(270.0)),
        // Wall, facing south.
        (3, false) => (T::clockwise(90.0), T::clockwise(90.0)),
        (3, true) => (T::clockwise(270.0), T::clockwise(270.0)),
        // Wall, facing north.
        (4, false) => (T::anti_clockwise(90.0), T::clockwise(90.0)),
        (4, true) => (T::clockwise(90.0), T::clockwise(270.0)),
        // Floor, north-south.
        (5, false) => (T::clockwise(270.0), T::NONE),
        (5, true) => (T::clockwise(90.0), T::NONE),
        // Floor, east-west.
        (6, false) => (T::clockwise(0.0), T::clockwise(0.0)),
        (6, true) => (T::clockwise(180.0), T::clockwise(0.0)),
        // Ceiling, north-south.
        (7, false) => (T::clockwise(90.0), T::clockwise(180.0)),
        (7, true) => (T::clockwise(270.0), T::clockwise(180.0)),
        // Ceiling, east-west.
        (_, false) => (T::clockwise(180.0), T::clockwise(180.0)),
        (_, true) => (T::clockwise(0.0), T::clockwise(180.0)),
    }
}

/// `Turn` with the same sense and `delta` more degrees. A disabled turn
/// stays disabled.
fn tipped(turn: Turn, delta: f32) -> Turn {
    Turn {
        degrees: turn.degrees + delta,
        ..turn
    }
}

#[derive(Debug, Clone)]
pub struct Lever {
    base: TextureRegion,
    handle_side: TextureRegion,
    handle_top: TextureRegion,
}

impl Lever {
    pub fn new(base: TextureRegion, handle: TextureRegion) -> Self {
        let (handle_side, handle_top) = torch_textures(&handle);
        Self {
            base,
            handle_side,
            handle_top,
        }
    }

    fn base_mesh(&self, colour: [f32; 4]) -> SubMesh {
        let mut base = SubMesh::new();
        base.add_block(
            Vec3::new(TEXEL * 4.0, 0.0, TEXEL * 5.0),
            Vec3::new(TEXEL * 8.0, TEXEL * 3.0, TEXEL * 6.0),
            colour,
            &self.base,
            &self.base,
            &self.base,
        );
        base
    }

    fn handle_mesh(&self) -> SubMesh {
        let mut handle = SubMesh::new();
        let corner = Vec3::new(TEXEL * 12.0 - TEXEL * 7.0, TEXEL * 4.0, TEXEL * 7.0 - TEXEL * 7.0);
        torch_quads(corner, Vec3::ZERO, &self.handle_side, &self.handle_top, |positions, region| {
            handle.add_quad(positions, [1.0; 4], region);
        });
        handle
    }

    pub(crate) fn emit(&self, at: &Placement, buffers: &mut GeometryBuffers) {
        let colour = grey(at.light(LightFace::Top));
        let on = at.data & 8 != 0;
        let (horizontal, vertical) = orientation(at.data, on);
        let origin = at.origin();

        self.base_mesh(colour).push_to(
            buffers.mesh_mut(MeshKey::for_region(&self.base, BlendMode::Solid)),
            origin,
            horizontal,
            vertical,
        );
        self.handle_mesh().push_to(
            buffers.mesh_mut(MeshKey::for_region(&self.handle_top, BlendMode::AlphaTest)),
            origin,
            horizontal,
            tipped(vertical, -45.0),
        );
    }
}
