//! Stairs: a half-slab base with a step on the high side.
//!
//! The step is tracked as a set of 8x8x8 cells so corner stairs fall out of
//! set operations with the neighbouring stairs' steps.

use super::{BlockKind, Placement};
use crate::mesher::cuboid::{add_cuboid, Cuboid, CuboidTextures, FaceLights};
use crate::mesher::geometry::{BlendMode, GeometryBuffers, MeshKey};
use crate::texture::TextureRegion;
use crate::types::Direction;

/// Bitset of the four step cells, bit `x + 2 * z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cells(u8);

impl Cells {
    const fn cell(x: u8, z: u8) -> u8 {
        1 << (x + 2 * z)
    }

    const EAST: Cells = Cells(Self::cell(1, 0) | Self::cell(1, 1));
    const WEST: Cells = Cells(Self::cell(0, 0) | Self::cell(0, 1));
    const SOUTH: Cells = Cells(Self::cell(0, 1) | Self::cell(1, 1));
    const NORTH: Cells = Cells(Self::cell(0, 0) | Self::cell(1, 0));

    fn contains(&self, x: u8, z: u8) -> bool {
        self.0 & Self::cell(x, z) != 0
    }
}

/// Ascending direction and step cells of a facing value (low two bits).
fn facing(data: u8) -> (Direction, Cells) {
    match data & 3 {
        0 => (Direction::East, Cells::EAST),
        1 => (Direction::West, Cells::WEST),
        2 => (Direction::South, Cells::SOUTH),
        _ => (Direction::North, Cells::NORTH),
    }
}

fn perpendicular(a: Direction, b: Direction) -> bool {
    a.axis() != b.axis()
}

/// Boxes covering `cells` at height `y`, merging halves into one box.
fn step_boxes(cells: Cells, y: f32) -> Vec<Cuboid> {
    match cells {
        Cells::EAST => vec![Cuboid::new([8.0, y, 0.0], [8.0, 8.0, 16.0])],
        Cells::WEST => vec![Cuboid::new([0.0, y, 0.0], [8.0, 8.0, 16.0])],
        Cells::SOUTH => vec![Cuboid::new([0.0, y, 8.0], [16.0, 8.0, 8.0])],
        Cells::NORTH => vec![Cuboid::new([0.0, y, 0.0], [16.0, 8.0, 8.0])],
        _ => {
            let mut boxes = Vec::new();
            for z in 0..2u8 {
                for x in 0..2u8 {
                    if cells.contains(x, z) {
                        let offset = [f32::from(x) * 8.0, y, f32::from(z) * 8.0];
                        boxes.push(Cuboid::new(offset, [8.0, 8.0, 8.0]));
                    }
                }
            }
            boxes
        }
    }
}

#[derive(Debug, Clone)]
pub struct Stairs {
    textures: CuboidTextures,
}

impl Stairs {
    pub fn new(top: TextureRegion, side: TextureRegion) -> Self {
        Self {
            textures: CuboidTextures::uniform(top, side),
        }
    }

    /// Facing and half of the stairs at `dir` from `at`, if there are any.
    fn neighbour_stairs(at: &Placement, dir: Direction) -> Option<u8> {
        let pos = at.pos.neighbor(dir);
        let block = at.block_at(pos)?;
        matches!(block.kind(), BlockKind::Stairs(_)).then(|| at.ctx.block_data(pos))
    }

    /// Step cells after joining with neighbouring stairs of the same half.
    fn step_cells(at: &Placement) -> (Direction, Cells) {
        let (ascending, own) = facing(at.data);
        let same_half = |data: u8| data & 4 == at.data & 4;

        if let Some(data) = Self::neighbour_stairs(at, ascending).filter(|d| same_half(*d)) {
            let (dir, cells) = facing(data);
            if perpendicular(ascending, dir) {
                return (ascending, Cells(own.0 & cells.0));
            }
        }
        if let Some(data) = Self::neighbour_stairs(at, ascending.opposite()).filter(|d| same_half(*d)) {
            let (dir, cells) = facing(data);
            if perpendicular(ascending, dir) {
                return (ascending, Cells(own.0 | cells.0));
            }
        }
        (ascending, own)
    }

    pub(crate) fn emit(&self, at: &Placement, buffers: &mut GeometryBuffers) {
        let upside_down = at.data & 4 != 0;
        let (base_y, step_y) = if upside_down { (8.0, 0.0) } else { (0.0, 8.0) };
        let (ascending, cells) = Self::step_cells(at);

        let sampled = FaceLights::sample(at.ctx, at.pos);
        let brightest = sampled.max();
        let origin = at.origin();
        let mesh = buffers.mesh_mut(MeshKey::for_region(self.textures.region(Direction::Up), BlendMode::Solid));

        let base = Cuboid::new([0.0, base_y, 0.0], [16.0, 8.0, 16.0]);
        add_cuboid(
            mesh,
            origin,
            &base,
            &self.textures,
            &sampled.with(Direction::Up, brightest),
            [1.0; 4],
            at.boundary_faces(&base),
        );

        // The step rests on the base.
        let resting = if upside_down { Direction::Up } else { Direction::Down };
        let riser = sampled.with(ascending.opposite(), brightest);
        for step in step_boxes(cells, step_y) {
            let faces = at.boundary_faces(&step).without(resting);
            add_cuboid(mesh, origin, &step, &self.textures, &riser, [1.0; 4], faces);
        }
    }
}
