//! Face culling for hidden faces between adjacent blocks.
//!
//! A face is dropped when the neighbour it touches is opaque. Transparent
//! blocks (glass, ice, water) also drop the faces they share with blocks of
//! their own group so stacked glass has no inner seams.

use super::cuboid::FaceMask;
use crate::blocks::BlockTypeRegistry;
use crate::resource_pack::BlockModel;
use crate::types::{BlockContext, BlockPosition, Direction};

/// Classification of a block for culling purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullType {
    /// Air or non-solid blocks. They hide nothing.
    NonSolid,
    /// Fully opaque solid blocks. They hide every face touching them.
    Opaque,
    /// Hides faces only of blocks in the same group.
    Transparent(u16),
}

impl CullType {
    pub fn is_solid(&self) -> bool {
        matches!(self, CullType::Opaque)
    }
}

/// Whether a block of type `current` shows its face toward `neighbor`.
pub fn should_emit(current: CullType, neighbor: CullType) -> bool {
    match (current, neighbor) {
        (_, CullType::Opaque) => false,
        (CullType::Transparent(a), CullType::Transparent(b)) => a != b,
        _ => true,
    }
}

/// How much neighbour information an emitter may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Emit every face. For cross-sections where neighbours are not drawn.
    Interior,
    /// Cull faces against neighbours.
    #[default]
    Edge,
}

/// Neighbour lookups for one snapshot and block registry.
pub struct FaceCuller<'a, C: BlockContext + ?Sized> {
    ctx: &'a C,
    registry: &'a BlockTypeRegistry,
}

impl<'a, C: BlockContext + ?Sized> FaceCuller<'a, C> {
    pub fn new(ctx: &'a C, registry: &'a BlockTypeRegistry) -> Self {
        Self { ctx, registry }
    }

    /// Cull type of whatever sits at `pos`. Unknown ids count as air.
    pub fn cull_type_at(&self, pos: BlockPosition) -> CullType {
        let id = self.ctx.block_id(pos);
        let data = self.ctx.block_data(pos);
        self.registry
            .get(id, data)
            .map(|block| block.cull_type())
            .unwrap_or(CullType::NonSolid)
    }

    pub fn is_solid_at(&self, pos: BlockPosition) -> bool {
        self.cull_type_at(pos).is_solid()
    }

    /// Check if the face of `pos` toward `direction` is hidden.
    pub fn should_cull(&self, pos: BlockPosition, direction: Direction) -> bool {
        let current = self.cull_type_at(pos);
        !should_emit(current, self.cull_type_at(pos.neighbor(direction)))
    }

    /// Faces of the block at `pos` that survive culling under `mode`.
    pub fn visible_faces(&self, pos: BlockPosition, mode: RenderMode) -> FaceMask {
        match mode {
            RenderMode::Interior => FaceMask::ALL,
            RenderMode::Edge => {
                let current = self.cull_type_at(pos);
                FaceMask::from_fn(|dir| should_emit(current, self.cull_type_at(pos.neighbor(dir))))
            }
        }
    }
}

/// Whether a resolved model is a single element filling the block with all
/// six faces present.
pub fn is_full_opaque_cube(model: &BlockModel) -> bool {
    const EPSILON: f32 = 0.001;

    let [element] = model.elements.as_slice() else {
        return false;
    };

    let spans_block = element.from.iter().all(|v| v.abs() <= EPSILON)
        && element.to.iter().all(|v| (v - 16.0).abs() <= EPSILON);

    spans_block
        && element.rotation.is_none()
        && Direction::ALL.iter().all(|dir| element.faces.contains_key(dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_neighbour_hides_face() {
        assert!(!should_emit(CullType::Opaque, CullType::Opaque));
        assert!(!should_emit(CullType::NonSolid, CullType::Opaque));
        assert!(!should_emit(CullType::Transparent(20), CullType::Opaque));
    }

    #[test]
    fn test_same_transparent_group_hides_face() {
        assert!(!should_emit(CullType::Transparent(20), CullType::Transparent(20)));
        assert!(should_emit(CullType::Transparent(20), CullType::Transparent(79)));
    }

    #[test]
    fn test_non_solid_neighbour_shows_face() {
        assert!(should_emit(CullType::Opaque, CullType::NonSolid));
        assert!(should_emit(CullType::Opaque, CullType::Transparent(20)));
    }
}
