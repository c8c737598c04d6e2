//! Shared types used throughout the library.

mod direction;
mod transform;

pub use direction::{Axis, Direction, LightFace};
pub use transform::{BlockTransform, ElementRotation};

use serde::{Deserialize, Serialize};

/// Block id reserved for air. Also returned for positions outside the world.
pub const AIR: u16 = 0;

/// A block position in world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Get the neighboring position in the given direction.
    pub fn neighbor(&self, direction: Direction) -> Self {
        let (dx, dy, dz) = direction.offset();
        self.offset(dx, dy, dz)
    }

    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// The chunk column containing this position.
    pub fn chunk(&self) -> ChunkCoord {
        ChunkCoord {
            x: self.x.div_euclid(ChunkCoord::SIZE),
            z: self.z.div_euclid(ChunkCoord::SIZE),
        }
    }

    pub fn as_vec3(&self) -> glam::Vec3 {
        glam::Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

/// Column of 16x16 blocks, the unit of parallel work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const SIZE: i32 = 16;
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl Iterator<Item = [f32; 3]>) -> Option<Self> {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        let mut has_points = false;

        for p in points {
            has_points = true;
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        has_points.then_some(Self { min, max })
    }

    pub fn dimensions(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

/// Read-only view of an immutable block snapshot.
///
/// Lookups take arbitrary world coordinates so emitters can inspect
/// neighbours in other chunks. Positions outside the world report [`AIR`].
pub trait BlockContext: Sync {
    fn block_id(&self, pos: BlockPosition) -> u16;

    /// Auxiliary data nibble (0 to 15).
    fn block_data(&self, pos: BlockPosition) -> u8;

    /// Light scalar (0.0 to 1.0) for a face lit through `pos`.
    fn light(&self, pos: BlockPosition, face: LightFace) -> f32;

    /// Biome colour for tinted faces.
    fn biome_colour(&self, _pos: BlockPosition) -> [f32; 4] {
        [1.0, 1.0, 1.0, 1.0]
    }

    /// Every non-air position in the snapshot.
    fn iter_blocks(&self) -> Box<dyn Iterator<Item = BlockPosition> + '_>;
}
