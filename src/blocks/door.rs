//! Doors.
//!
//! A door is two blocks. The lower half stores facing and the open flag, the
//! upper half stores the hinge side, so each half reads the other's data.
//! The panel is modelled closed against the north edge and then turned.

use super::{grey, Placement};
use crate::mesher::geometry::{region_uvs, BlendMode, GeometryBuffers, MeshKey, QuadUvs};
use crate::mesher::sub_mesh::{mirrored_uvs, SubMesh, Turn};
use crate::texture::TextureRegion;
use crate::types::{Direction, LightFace};
use glam::Vec3;

const THICKNESS: f32 = 3.0 / 16.0;
const CLOSED_SHIFT: f32 = 13.0 / 16.0;

/// State of a whole door, gathered from both halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DoorState {
    top: bool,
    open: bool,
    facing: u8,
    right_hinge: bool,
}

impl DoorState {
    fn read(at: &Placement) -> Self {
        let top = at.data & 8 != 0;
        let (lower, upper) = if top {
            (at.ctx.block_data(at.pos.neighbor(Direction::Down)), at.data)
        } else {
            (at.data, at.ctx.block_data(at.pos.neighbor(Direction::Up)))
        };
        Self {
            top,
            open: lower & 4 != 0,
            facing: lower & 3,
            right_hinge: upper & 1 != 0,
        }
    }

    /// Turn and shift placing the panel for this state.
    fn placement(&self) -> (Turn, Vec3) {
        let shift = |x: f32, z: f32| Vec3::new(x, 0.0, z);
        if self.open {
            let turn = match (self.right_hinge, self.facing) {
                (false, 0) => Turn::NONE,
                (false, 1) => Turn::anti_clockwise(90.0),
                (false, 2) => Turn::clockwise(180.0),
                (false, _) => Turn::clockwise(90.0),
                (true, 0) => Turn::clockwise(180.0),
                (true, 1) => Turn::clockwise(90.0),
                (true, 2) => Turn::NONE,
                (true, _) => Turn::anti_clockwise(90.0),
            };
            (turn, Vec3::ZERO)
        } else {
            match self.facing {
                0 => (Turn::anti_clockwise(90.0), shift(-CLOSED_SHIFT, 0.0)),
                1 => (Turn::clockwise(180.0), shift(0.0, -CLOSED_SHIFT)),
                2 => (Turn::clockwise(90.0), shift(CLOSED_SHIFT, 0.0)),
                _ => (Turn::NONE, shift(0.0, CLOSED_SHIFT)),
            }
        }
    }
}

/// `region` turned a quarter so its columns run along the quad's length.
fn edge_uvs(region: &TextureRegion, open: bool) -> QuadUvs {
    let (u0, v0, u1, v1) = (region.u0, region.v0, region.u1, region.v1);
    if open {
        [[u0, v1], [u0, v0], [u1, v0], [u1, v1]]
    } else {
        [[u1, v0], [u1, v1], [u0, v1], [u0, v0]]
    }
}

#[derive(Debug, Clone)]
pub struct Door {
    top: TextureRegion,
    bottom: TextureRegion,
    edge: TextureRegion,
    top_edge: TextureRegion,
}

impl Door {
    pub fn new(top: TextureRegion, bottom: TextureRegion) -> Self {
        Self {
            top,
            bottom,
            // Three texel strips from the panel textures.
            edge: top.inset_texels(0.0, 0.0, 13.0, 0.0),
            top_edge: bottom.inset_texels(13.0, 0.0, 0.0, 0.0),
        }
    }

    fn panel(&self, state: &DoorState, colour: [f32; 4]) -> SubMesh {
        let v = Vec3::new;
        let t = THICKNESS;
        let front = if state.top { &self.top } else { &self.bottom };
        let mut panel = SubMesh::new();

        let front_uvs = if state.right_hinge { mirrored_uvs(front) } else { region_uvs(front) };
        panel.add_quad_uvs([v(0.0, 1.0, t), v(1.0, 1.0, t), v(1.0, 0.0, t), v(0.0, 0.0, t)], colour, front_uvs);

        let back_uvs = if state.right_hinge { region_uvs(front) } else { mirrored_uvs(front) };
        panel.add_quad_uvs([v(1.0, 1.0, 0.0), v(0.0, 1.0, 0.0), v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0)], colour, back_uvs);

        let (hinge_uvs, free_uvs) = if state.open {
            (region_uvs(&self.edge), mirrored_uvs(&self.edge))
        } else {
            (mirrored_uvs(&self.edge), region_uvs(&self.edge))
        };
        panel.add_quad_uvs([v(0.0, 1.0, 0.0), v(0.0, 1.0, t), v(0.0, 0.0, t), v(0.0, 0.0, 0.0)], colour, hinge_uvs);
        panel.add_quad_uvs([v(1.0, 1.0, t), v(1.0, 1.0, 0.0), v(1.0, 0.0, 0.0), v(1.0, 0.0, t)], colour, free_uvs);
        panel
    }

    fn top_edge(&self, state: &DoorState, colour: [f32; 4]) -> SubMesh {
        let v = Vec3::new;
        let t = THICKNESS;
        let mut edge = SubMesh::new();
        edge.add_quad_uvs(
            [v(0.0, 1.0, 0.0), v(1.0, 1.0, 0.0), v(1.0, 1.0, t), v(0.0, 1.0, t)],
            colour,
            edge_uvs(&self.top_edge, state.open),
        );
        edge
    }

    pub(crate) fn emit(&self, at: &Placement, buffers: &mut GeometryBuffers) {
        let state = DoorState::read(at);
        let colour = grey(at.light(LightFace::Top));
        let (turn, shift) = state.placement();
        let offset = at.origin() + shift;
        let mesh = buffers.mesh_mut(MeshKey::for_region(&self.top, BlendMode::AlphaTest));

        self.panel(&state, colour).push_to(mesh, offset, turn, Turn::NONE);
        if state.top {
            self.top_edge(&state, colour).push_to(mesh, offset, turn, Turn::NONE);
        }
    }
}
