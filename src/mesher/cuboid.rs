//! Axis-aligned box emission.
//!
//! Boxes are given in sixteenths of a block. Each face samples only the part
//! of its texture that lines up with the face's position inside the full
//! block, so a half-height slab shows the lower half of a side texture.

use super::geometry::{Mesh, QuadUvs};
use crate::texture::TextureRegion;
use crate::types::{BlockContext, BlockPosition, Direction};
use glam::Vec3;

/// Box inside a block, in sixteenths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid {
    pub offset: [f32; 3],
    pub extent: [f32; 3],
}

impl Cuboid {
    pub fn new(offset: [f32; 3], extent: [f32; 3]) -> Self {
        Self { offset, extent }
    }

    /// The whole block.
    pub fn full() -> Self {
        Self::new([0.0; 3], [16.0; 3])
    }
}

/// Texture assignment for the faces of a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CuboidTextures {
    /// Top and bottom share `top`; facing pairs share a side texture.
    Simple {
        top: TextureRegion,
        north_south: TextureRegion,
        east_west: TextureRegion,
    },
    /// One region per face, indexed by [`Direction::index`].
    Full([TextureRegion; 6]),
}

impl CuboidTextures {
    /// Same texture on all four sides.
    pub fn uniform(top: TextureRegion, side: TextureRegion) -> Self {
        CuboidTextures::Simple {
            top,
            north_south: side,
            east_west: side,
        }
    }

    pub fn region(&self, face: Direction) -> &TextureRegion {
        match self {
            CuboidTextures::Simple { top, north_south, east_west } => match face {
                Direction::Up | Direction::Down => top,
                Direction::North | Direction::South => north_south,
                Direction::West | Direction::East => east_west,
            },
            CuboidTextures::Full(regions) => &regions[face.index()],
        }
    }
}

/// Light scalar per face, indexed by [`Direction::index`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceLights(pub [f32; 6]);

impl FaceLights {
    pub fn uniform(light: f32) -> Self {
        Self([light; 6])
    }

    /// Sample each face's light from the neighbour it looks at.
    pub fn sample<C: BlockContext + ?Sized>(ctx: &C, pos: BlockPosition) -> Self {
        let mut lights = [1.0; 6];
        for dir in Direction::ALL {
            lights[dir.index()] = ctx.light(pos.neighbor(dir), dir.light_face());
        }
        Self(lights)
    }

    /// Every face lit from `pos` itself, by its light channel.
    pub fn at<C: BlockContext + ?Sized>(ctx: &C, pos: BlockPosition) -> Self {
        let mut lights = [1.0; 6];
        for dir in Direction::ALL {
            lights[dir.index()] = ctx.light(pos, dir.light_face());
        }
        Self(lights)
    }

    pub fn with(mut self, face: Direction, light: f32) -> Self {
        self.0[face.index()] = light;
        self
    }

    pub fn get(&self, face: Direction) -> f32 {
        self.0[face.index()]
    }

    /// Brightest face.
    pub fn max(&self) -> f32 {
        self.0.iter().copied().fold(0.0, f32::max)
    }

    /// The bottom face is lit like the top.
    pub fn with_bottom_from_top(mut self) -> Self {
        self.0[Direction::Down.index()] = self.0[Direction::Up.index()];
        self
    }
}

/// Set of faces to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaceMask(u8);

impl FaceMask {
    pub const NONE: FaceMask = FaceMask(0);
    pub const ALL: FaceMask = FaceMask(0b11_1111);

    pub fn from_fn(mut f: impl FnMut(Direction) -> bool) -> Self {
        let mut mask = FaceMask::NONE;
        for dir in Direction::ALL {
            if f(dir) {
                mask.insert(dir);
            }
        }
        mask
    }

    pub fn contains(&self, dir: Direction) -> bool {
        self.0 & (1 << dir.index()) != 0
    }

    pub fn insert(&mut self, dir: Direction) {
        self.0 |= 1 << dir.index();
    }

    pub fn remove(&mut self, dir: Direction) {
        self.0 &= !(1 << dir.index());
    }

    pub fn without(mut self, dir: Direction) -> Self {
        self.remove(dir);
        self
    }

    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }
}

/// Corners and UVs of one face of a box placed at `origin`.
pub fn cuboid_face(
    origin: Vec3,
    cuboid: &Cuboid,
    face: Direction,
    region: &TextureRegion,
) -> ([Vec3; 4], QuadUvs) {
    let n = Vec3::from(cuboid.offset) / 16.0;
    let size = Vec3::from(cuboid.extent) / 16.0;
    let (w, h, d) = (size.x, size.y, size.z);
    let Vec3 { x, y, z } = origin + n;

    let (u0, v0, u1, v1) = (region.u0, region.v0, region.u1, region.v1);
    let (ur, vr) = (u1 - u0, v1 - v0);

    // Top and bottom project onto x/z.
    let flat = [
        [u0 + ur * n.x, v0 + vr * n.z],
        [u0 + ur * (n.x + w), v0 + vr * n.z],
        [u0 + ur * (n.x + w), v0 + vr * (n.z + d)],
        [u0 + ur * n.x, v0 + vr * (n.z + d)],
    ];
    // Faces across x project onto z/y.
    let across_x = [
        [u0 + ur * n.z, v1 - vr * (n.y + h)],
        [u0 + ur * (n.z + d), v1 - vr * (n.y + h)],
        [u0 + ur * (n.z + d), v1 - vr * n.y],
        [u0 + ur * n.z, v1 - vr * n.y],
    ];
    // Faces across z project onto x/y, mirrored in u.
    let across_z = [
        [u1 - ur * (n.x + w), v1 - vr * (n.y + h)],
        [u1 - ur * n.x, v1 - vr * (n.y + h)],
        [u1 - ur * n.x, v1 - vr * n.y],
        [u1 - ur * (n.x + w), v1 - vr * n.y],
    ];

    let v = Vec3::new;
    match face {
        Direction::Up => (
            [v(x, y + h, z), v(x + w, y + h, z), v(x + w, y + h, z + d), v(x, y + h, z + d)],
            flat,
        ),
        Direction::Down => (
            [v(x, y, z + d), v(x + w, y, z + d), v(x + w, y, z), v(x, y, z)],
            flat,
        ),
        Direction::West => (
            [v(x, y + h, z), v(x, y + h, z + d), v(x, y, z + d), v(x, y, z)],
            across_x,
        ),
        Direction::East => (
            [v(x + w, y + h, z + d), v(x + w, y + h, z), v(x + w, y, z), v(x + w, y, z + d)],
            across_x,
        ),
        Direction::North => (
            [v(x + w, y + h, z), v(x, y + h, z), v(x, y, z), v(x + w, y, z)],
            across_z,
        ),
        Direction::South => (
            [v(x, y + h, z + d), v(x + w, y + h, z + d), v(x + w, y, z + d), v(x, y, z + d)],
            across_z,
        ),
    }
}

fn lit(colour: [f32; 4], light: f32) -> [f32; 4] {
    [colour[0] * light, colour[1] * light, colour[2] * light, colour[3]]
}

/// Emit the faces of `cuboid` selected by `faces`.
///
/// Returns the number of quads written.
pub fn add_cuboid(
    mesh: &mut Mesh,
    origin: Vec3,
    cuboid: &Cuboid,
    textures: &CuboidTextures,
    lights: &FaceLights,
    colour: [f32; 4],
    faces: FaceMask,
) -> usize {
    let mut emitted = 0;
    for dir in Direction::ALL {
        if !faces.contains(dir) {
            continue;
        }
        let (positions, uvs) = cuboid_face(origin, cuboid, dir, textures.region(dir));
        mesh.add_textured_quad(positions, uvs, lit(colour, lights.get(dir)));
        emitted += 1;
    }
    emitted
}

/// Unit cube with fixed shading, for markers and debugging.
///
/// Up and down keep `colour`; west and east are 0.2 darker, north and south
/// 0.2 lighter, clamped to 0..1. Alpha is unchanged.
pub fn add_cube(mesh: &mut Mesh, origin: Vec3, colour: [f32; 4], region: &TextureRegion) {
    const STEP: f32 = 0.2;
    let shade = |delta: f32| {
        [
            (colour[0] + delta).clamp(0.0, 1.0),
            (colour[1] + delta).clamp(0.0, 1.0),
            (colour[2] + delta).clamp(0.0, 1.0),
            colour[3],
        ]
    };
    let cube = Cuboid::full();
    for dir in Direction::ALL {
        let tint = match dir.axis() {
            crate::types::Axis::Y => colour,
            crate::types::Axis::X => shade(-STEP),
            crate::types::Axis::Z => shade(STEP),
        };
        let (positions, uvs) = cuboid_face(origin, &cube, dir, region);
        mesh.add_textured_quad(positions, uvs, tint);
    }
}
