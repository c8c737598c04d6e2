//! Redstone wire.
//!
//! The wire connects to conductive blocks on its four sides, at its own
//! level or one step up or down. Straight runs use the line texture, anything
//! else is built from a centre piece and arms cut from the junction texture.

use super::Placement;
use crate::mesher::geometry::{BlendMode, GeometryBuffers, MeshKey};
use crate::texture::TextureRegion;
use crate::types::{BlockPosition, Direction, LightFace};
use glam::Vec3;

/// Wire, lit redstone torch, lever, both pressure plates and stone button.
pub const DEFAULT_CONDUCTORS: [u16; 6] = [55, 76, 69, 70, 72, 77];

const NUDGE: f32 = 0.001;
const ARM: f32 = 4.0 / 16.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Link {
    /// Conductor at this level or below.
    flat: bool,
    /// Conductor one step up.
    above: bool,
}

impl Link {
    fn any(&self) -> bool {
        self.flat || self.above
    }
}

/// Links in [`Direction::HORIZONTAL`] order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Links([Link; 4]);

impl Links {
    fn get(&self, dir: Direction) -> Link {
        let index = Direction::HORIZONTAL.iter().position(|d| *d == dir).unwrap_or(0);
        self.0[index]
    }

    fn has(&self, dir: Direction) -> bool {
        self.get(dir).any()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Junction,
    AlongX,
    AlongZ,
    Arms,
}

fn shape(links: &Links) -> Shape {
    let x = links.has(Direction::West) || links.has(Direction::East);
    let z = links.has(Direction::North) || links.has(Direction::South);
    let count = Direction::HORIZONTAL.iter().filter(|d| links.has(**d)).count();
    match (x, z) {
        _ if count == 0 || count == 4 => Shape::Junction,
        (true, false) => Shape::AlongX,
        (false, true) => Shape::AlongZ,
        _ => Shape::Arms,
    }
}

#[derive(Debug, Clone)]
pub struct RedstoneWire {
    junction: TextureRegion,
    line: TextureRegion,
    conductors: Vec<u16>,
}

impl RedstoneWire {
    pub fn new(junction: TextureRegion, line: TextureRegion, conductors: Vec<u16>) -> Self {
        Self {
            junction,
            line,
            conductors,
        }
    }

    fn conducts(&self, at: &Placement, pos: BlockPosition) -> bool {
        self.conductors.contains(&at.ctx.block_id(pos))
    }

    fn links(&self, at: &Placement) -> Links {
        let mut links = Links::default();
        for (link, dir) in links.0.iter_mut().zip(Direction::HORIZONTAL) {
            let side = at.pos.neighbor(dir);
            link.above = self.conducts(at, side.neighbor(Direction::Up));
            link.flat = self.conducts(at, side) || self.conducts(at, side.neighbor(Direction::Down));
        }
        links
    }

    pub(crate) fn emit(&self, at: &Placement, buffers: &mut GeometryBuffers) {
        let links = self.links(at);
        let power = f32::from(at.data) / 16.0 * at.light(LightFace::Top);
        let colour = [power, 0.2 * power, 0.2 * power, 1.0];

        let Vec3 { x, y, z } = at.origin();
        let ay = y + NUDGE;
        let v = Vec3::new;
        let (l, r) = (ARM, 1.0 - ARM);
        let mesh = buffers.mesh_mut(MeshKey::for_region(&self.junction, BlendMode::AlphaTest));

        let flat = [v(x, ay, z), v(x + 1.0, ay, z), v(x + 1.0, ay, z + 1.0), v(x, ay, z + 1.0)];
        match shape(&links) {
            Shape::Junction => mesh.add_region_quad(flat, colour, &self.junction),
            Shape::AlongX => mesh.add_region_quad(flat, colour, &self.line),
            Shape::AlongZ => mesh.add_region_quad(
                [v(x, ay, z + 1.0), v(x, ay, z), v(x + 1.0, ay, z), v(x + 1.0, ay, z + 1.0)],
                colour,
                &self.line,
            ),
            Shape::Arms => {
                let centre = self.junction.inset_texels(4.0, 4.0, 4.0, 4.0);
                mesh.add_region_quad(
                    [v(x + l, ay, z + r), v(x + l, ay, z + l), v(x + r, ay, z + l), v(x + r, ay, z + r)],
                    colour,
                    &centre,
                );
                let j = &self.junction;
                if links.has(Direction::West) {
                    mesh.add_region_quad(
                        [v(x, ay, z), v(x + l, ay, z), v(x + l, ay, z + 1.0), v(x, ay, z + 1.0)],
                        colour,
                        &j.inset_texels(0.0, 0.0, 12.0, 0.0),
                    );
                }
                if links.has(Direction::East) {
                    mesh.add_region_quad(
                        [v(x + r, ay, z), v(x + 1.0, ay, z), v(x + 1.0, ay, z + 1.0), v(x + r, ay, z + 1.0)],
                        colour,
                        &j.inset_texels(12.0, 0.0, 0.0, 0.0),
                    );
                }
                if links.has(Direction::North) {
                    mesh.add_region_quad(
                        [v(x, ay, z), v(x + 1.0, ay, z), v(x + 1.0, ay, z + l), v(x, ay, z + l)],
                        colour,
                        &j.inset_texels(0.0, 0.0, 0.0, 12.0),
                    );
                }
                if links.has(Direction::South) {
                    mesh.add_region_quad(
                        [v(x, ay, z + r), v(x + 1.0, ay, z + r), v(x + 1.0, ay, z + 1.0), v(x, ay, z + 1.0)],
                        colour,
                        &j.inset_texels(0.0, 12.0, 0.0, 0.0),
                    );
                }
            }
        }

        // Climbing runs up the side of the neighbouring block.
        let (top, n) = (y + 1.0, NUDGE);
        for dir in Direction::HORIZONTAL {
            if !links.get(dir).above {
                continue;
            }
            let quad = match dir {
                Direction::West => [v(x + n, y, z + 1.0), v(x + n, top, z + 1.0), v(x + n, top, z), v(x + n, y, z)],
                Direction::East => {
                    let px = x + 1.0 - n;
                    [v(px, y, z), v(px, top, z), v(px, top, z + 1.0), v(px, y, z + 1.0)]
                }
                Direction::North => [v(x, y, z + n), v(x, top, z + n), v(x + 1.0, top, z + n), v(x + 1.0, y, z + n)],
                _ => {
                    let pz = z + 1.0 - n;
                    [v(x + 1.0, y, pz), v(x + 1.0, top, pz), v(x, top, pz), v(x, y, pz)]
                }
            };
            mesh.add_region_quad(quad, colour, &self.line);
        }
    }
}
