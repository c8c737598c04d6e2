//! Block types and their geometry emitters.
//!
//! A [`BlockType`] pairs an id with a [`BlockKind`]. Kinds are a closed set;
//! each one reads the block's data nibble and its neighbours and writes quads
//! into [`GeometryBuffers`].

pub mod bed;
pub mod config;
pub mod door;
pub mod fence;
pub mod lever;
pub mod model;
pub mod plant;
pub mod redstone;
pub mod registry;
pub mod slab;
pub mod solid;
pub mod stairs;
pub mod torch;

pub use bed::Bed;
pub use config::{BlockConfig, BlockEntry, KindConfig};
pub use door::Door;
pub use fence::Fence;
pub use lever::Lever;
pub use model::ModelBlock;
pub use plant::Plant;
pub use redstone::RedstoneWire;
pub use registry::BlockTypeRegistry;
pub use slab::Slab;
pub use solid::{DataSolid, Glass, Solid};
pub use stairs::Stairs;
pub use torch::Torch;

use crate::mesher::cuboid::{Cuboid, FaceMask};
use crate::mesher::face_culler::{CullType, FaceCuller, RenderMode};
use crate::mesher::geometry::GeometryBuffers;
use crate::types::{BlockContext, BlockPosition, Direction, LightFace};
use glam::Vec3;

/// Everything an emitter knows about the block it is drawing.
pub(crate) struct Placement<'a> {
    pub pos: BlockPosition,
    pub id: u16,
    pub data: u8,
    pub ctx: &'a dyn BlockContext,
    pub registry: &'a BlockTypeRegistry,
    pub mode: RenderMode,
}

impl<'a> Placement<'a> {
    pub fn new(
        pos: BlockPosition,
        ctx: &'a dyn BlockContext,
        registry: &'a BlockTypeRegistry,
        mode: RenderMode,
    ) -> Self {
        Self {
            pos,
            id: ctx.block_id(pos),
            data: ctx.block_data(pos),
            ctx,
            registry,
            mode,
        }
    }

    pub fn culler(&self) -> FaceCuller<'a, dyn BlockContext + 'a> {
        FaceCuller::new(self.ctx, self.registry)
    }

    pub fn origin(&self) -> Vec3 {
        self.pos.as_vec3()
    }

    /// Light of this block's own cell.
    pub fn light(&self, face: LightFace) -> f32 {
        self.ctx.light(self.pos, face)
    }

    /// Faces of a full cube at this position that survive culling.
    pub fn visible_faces(&self) -> FaceMask {
        self.culler().visible_faces(self.pos, self.mode)
    }

    /// Whether the neighbour toward `dir` hides faces lying on that side of
    /// the block. Always false when drawing interiors.
    pub fn neighbour_hides(&self, dir: Direction) -> bool {
        self.mode == RenderMode::Edge && self.culler().is_solid_at(self.pos.neighbor(dir))
    }

    /// Faces of `cuboid` worth emitting: faces flush with the block boundary
    /// are dropped when the neighbour there is solid, inner faces are kept.
    pub fn boundary_faces(&self, cuboid: &Cuboid) -> FaceMask {
        FaceMask::from_fn(|dir| !(touches_boundary(cuboid, dir) && self.neighbour_hides(dir)))
    }

    /// Registry entry for the block at `pos`.
    pub fn block_at(&self, pos: BlockPosition) -> Option<&'a BlockType> {
        self.registry.get(self.ctx.block_id(pos), self.ctx.block_data(pos))
    }
}

fn touches_boundary(cuboid: &Cuboid, dir: Direction) -> bool {
    const EPSILON: f32 = 0.001;
    let lo = |axis: usize| cuboid.offset[axis] <= EPSILON;
    let hi = |axis: usize| cuboid.offset[axis] + cuboid.extent[axis] >= 16.0 - EPSILON;
    match dir {
        Direction::West => lo(0),
        Direction::East => hi(0),
        Direction::Down => lo(1),
        Direction::Up => hi(1),
        Direction::North => lo(2),
        Direction::South => hi(2),
    }
}

/// Grey vertex colour for a light scalar.
pub(crate) fn grey(light: f32) -> [f32; 4] {
    [light, light, light, 1.0]
}

/// The closed set of block categories.
#[derive(Debug, Clone)]
pub enum BlockKind {
    Solid(Solid),
    DataSolid(DataSolid),
    Glass(Glass),
    Plant(Plant),
    Slab(Slab),
    Stairs(Stairs),
    Torch(Torch),
    Lever(Lever),
    Fence(Fence),
    RedstoneWire(RedstoneWire),
    Door(Door),
    Bed(Bed),
    Model(ModelBlock),
}

impl BlockKind {
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Solid(_) => "solid",
            BlockKind::DataSolid(_) => "data_solid",
            BlockKind::Glass(_) => "glass",
            BlockKind::Plant(_) => "plant",
            BlockKind::Slab(_) => "slab",
            BlockKind::Stairs(_) => "stairs",
            BlockKind::Torch(_) => "torch",
            BlockKind::Lever(_) => "lever",
            BlockKind::Fence(_) => "fence",
            BlockKind::RedstoneWire(_) => "redstone_wire",
            BlockKind::Door(_) => "door",
            BlockKind::Bed(_) => "bed",
            BlockKind::Model(_) => "model",
        }
    }
}

/// A registered block: display name, id and emitter.
#[derive(Debug, Clone)]
pub struct BlockType {
    name: String,
    id: u16,
    kind: BlockKind,
}

impl BlockType {
    pub fn new(name: impl Into<String>, id: u16, kind: BlockKind) -> Self {
        Self {
            name: name.into(),
            id,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }

    pub fn cull_type(&self) -> CullType {
        match &self.kind {
            BlockKind::Solid(solid) => solid.cull_type(),
            BlockKind::DataSolid(solid) => solid.cull_type(),
            BlockKind::Glass(_) => CullType::Transparent(self.id),
            BlockKind::Model(model) => model.cull_type(),
            _ => CullType::NonSolid,
        }
    }

    /// Emit every face, without looking at neighbours for culling.
    pub fn add_interior_geometry(
        &self,
        pos: BlockPosition,
        ctx: &dyn BlockContext,
        registry: &BlockTypeRegistry,
        buffers: &mut GeometryBuffers,
    ) {
        self.add_geometry(pos, ctx, registry, RenderMode::Interior, buffers);
    }

    /// Emit the faces not hidden by neighbours.
    pub fn add_edge_geometry(
        &self,
        pos: BlockPosition,
        ctx: &dyn BlockContext,
        registry: &BlockTypeRegistry,
        buffers: &mut GeometryBuffers,
    ) {
        self.add_geometry(pos, ctx, registry, RenderMode::Edge, buffers);
    }

    pub fn add_geometry(
        &self,
        pos: BlockPosition,
        ctx: &dyn BlockContext,
        registry: &BlockTypeRegistry,
        mode: RenderMode,
        buffers: &mut GeometryBuffers,
    ) {
        let at = Placement::new(pos, ctx, registry, mode);
        match &self.kind {
            BlockKind::Solid(kind) => kind.emit(&at, buffers),
            BlockKind::DataSolid(kind) => kind.emit(&at, buffers),
            BlockKind::Glass(kind) => kind.emit(&at, buffers),
            BlockKind::Plant(kind) => kind.emit(&at, buffers),
            BlockKind::Slab(kind) => kind.emit(&at, buffers),
            BlockKind::Stairs(kind) => kind.emit(&at, buffers),
            BlockKind::Torch(kind) => kind.emit(&at, buffers),
            BlockKind::Lever(kind) => kind.emit(&at, buffers),
            BlockKind::Fence(kind) => kind.emit(&at, buffers),
            BlockKind::RedstoneWire(kind) => kind.emit(&at, buffers),
            BlockKind::Door(kind) => kind.emit(&at, buffers),
            BlockKind::Bed(kind) => kind.emit(&at, buffers),
            BlockKind::Model(kind) => kind.emit(&at, buffers),
        }
    }
}
