//! Block-local geometry that is rotated into place before output.
//!
//! Oriented blocks (doors, beds, levers) are modelled once facing a canonical
//! direction inside the unit cube and turned about the block centre.

use super::geometry::{region_uvs, Mesh, QuadUvs};
use crate::texture::TextureRegion;
use glam::{Mat4, Vec3};

/// Sense of a rotation. `None` disables it whatever the angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Clockwise,
    AntiClockwise,
}

impl Rotation {
    fn radians(&self, degrees: f32) -> f32 {
        let radians = degrees / 360.0 * std::f32::consts::TAU;
        match self {
            Rotation::AntiClockwise => -radians,
            _ => radians,
        }
    }
}

/// A rotation about one axis through the block centre.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Turn {
    pub rotation: Rotation,
    pub degrees: f32,
}

impl Turn {
    pub const NONE: Turn = Turn {
        rotation: Rotation::None,
        degrees: 0.0,
    };

    pub fn clockwise(degrees: f32) -> Self {
        Self {
            rotation: Rotation::Clockwise,
            degrees,
        }
    }

    pub fn anti_clockwise(degrees: f32) -> Self {
        Self {
            rotation: Rotation::AntiClockwise,
            degrees,
        }
    }

    pub fn is_none(&self) -> bool {
        self.rotation == Rotation::None
    }
}

/// Matrix turning unit-cube space: vertical (about Z) first, then
/// horizontal (about Y), both about (0.5, 0.5, 0.5).
///
/// `None` when neither turn is active.
pub fn local_transform(horizontal: Turn, vertical: Turn) -> Option<Mat4> {
    if horizontal.is_none() && vertical.is_none() {
        return None;
    }

    let h = if horizontal.is_none() {
        0.0
    } else {
        horizontal.rotation.radians(horizontal.degrees)
    };
    let v = if vertical.is_none() {
        0.0
    } else {
        vertical.rotation.radians(vertical.degrees)
    };

    let centre = Vec3::splat(0.5);
    Some(
        Mat4::from_translation(centre)
            * Mat4::from_rotation_y(h)
            * Mat4::from_rotation_z(v)
            * Mat4::from_translation(-centre),
    )
}

/// Accumulator for one block's local geometry.
#[derive(Debug, Clone, Default)]
pub struct SubMesh {
    mesh: Mesh,
}

impl SubMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }

    pub fn add_quad(&mut self, positions: [Vec3; 4], colour: [f32; 4], region: &TextureRegion) {
        self.mesh.add_region_quad(positions, colour, region);
    }

    pub fn add_quad_uvs(&mut self, positions: [Vec3; 4], colour: [f32; 4], uvs: QuadUvs) {
        self.mesh.add_textured_quad(positions, uvs, colour);
    }

    /// Box with one side texture, a top and a bottom, each face mapped onto
    /// the whole of its region.
    pub fn add_block(
        &mut self,
        origin: Vec3,
        size: Vec3,
        colour: [f32; 4],
        side: &TextureRegion,
        top: &TextureRegion,
        bottom: &TextureRegion,
    ) {
        let Vec3 { x, y, z } = origin;
        let Vec3 { x: w, y: h, z: d } = size;
        let v = Vec3::new;

        // -x
        self.add_quad([v(x, y + h, z), v(x, y + h, z + d), v(x, y, z + d), v(x, y, z)], colour, side);
        // -z
        self.add_quad([v(x + w, y + h, z), v(x, y + h, z), v(x, y, z), v(x + w, y, z)], colour, side);
        // +z
        self.add_quad(
            [v(x, y + h, z + d), v(x + w, y + h, z + d), v(x + w, y, z + d), v(x, y, z + d)],
            colour,
            side,
        );
        // +x
        self.add_quad(
            [v(x + w, y + h, z + d), v(x + w, y + h, z), v(x + w, y, z), v(x + w, y, z + d)],
            colour,
            side,
        );
        self.add_quad(
            [v(x, y + h, z), v(x + w, y + h, z), v(x + w, y + h, z + d), v(x, y + h, z + d)],
            colour,
            top,
        );
        self.add_quad([v(x, y, z), v(x, y, z + d), v(x + w, y, z + d), v(x + w, y, z)], colour, bottom);
    }

    /// Append this geometry to `target`, turned and then moved by `offset`.
    ///
    /// UVs and colours are copied unchanged.
    pub fn push_to(&self, target: &mut Mesh, offset: Vec3, horizontal: Turn, vertical: Turn) {
        let transform = local_transform(horizontal, vertical);
        let base = target.vertices.len() as u32;

        for vertex in &self.mesh.vertices {
            let mut out = *vertex;
            let mut position = Vec3::from(vertex.position);
            let mut normal = Vec3::from(vertex.normal);
            if let Some(m) = transform {
                position = m.transform_point3(position);
                normal = m.transform_vector3(normal);
            }
            out.position = (position + offset).to_array();
            out.normal = normal.to_array();
            target.vertices.push(out);
        }
        target
            .indices
            .extend(self.mesh.indices.iter().map(|i| i + base));
    }

    /// Turned copy of this geometry, still in local space plus `offset`.
    pub fn transformed(&self, offset: Vec3, horizontal: Turn, vertical: Turn) -> SubMesh {
        let mut mesh = Mesh::new();
        self.push_to(&mut mesh, offset, horizontal, vertical);
        SubMesh { mesh }
    }

    /// Append another sub-mesh unchanged.
    pub fn extend(&mut self, other: &SubMesh) {
        self.mesh.merge(&other.mesh);
    }
}

/// Standard UVs of `region` with u mirrored.
pub fn mirrored_uvs(region: &TextureRegion) -> QuadUvs {
    let [a, b, c, d] = region_uvs(region);
    [b, a, d, c]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::{AtlasId, PackVersion};

    fn region() -> TextureRegion {
        TextureRegion::full(AtlasId(0), PackVersion::V1_9)
    }

    fn panel() -> SubMesh {
        let mut sub = SubMesh::new();
        sub.add_block(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 3.0 / 16.0),
            [1.0; 4],
            &region(),
            &region(),
            &region(),
        );
        sub
    }

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn test_no_rotation_is_translation_only() {
        let sub = panel();
        let mut target = Mesh::new();
        sub.push_to(&mut target, Vec3::new(10.0, 64.0, -3.0), Turn::NONE, Turn::NONE);

        assert_eq!(target.vertex_count(), 24);
        for (before, after) in sub.mesh().vertices.iter().zip(&target.vertices) {
            let expected = [
                before.position[0] + 10.0,
                before.position[1] + 64.0,
                before.position[2] - 3.0,
            ];
            assert!(close(after.position, expected));
            assert_eq!(after.uv, before.uv);
        }
    }

    #[test]
    fn test_none_rotation_ignores_angle() {
        let horizontal = Turn { rotation: Rotation::None, degrees: 90.0 };
        assert!(local_transform(horizontal, Turn::NONE).is_none());
    }

    #[test]
    fn test_four_quarter_turns_round_trip() {
        let mut current = panel();
        for _ in 0..4 {
            current = current.transformed(Vec3::ZERO, Turn::clockwise(90.0), Turn::NONE);
        }
        for (a, b) in panel().mesh().vertices.iter().zip(&current.mesh().vertices) {
            assert!(close(a.position, b.position), "{:?} vs {:?}", a.position, b.position);
        }
    }

    #[test]
    fn test_half_turn_moves_panel_to_far_side() {
        let turned = panel().transformed(Vec3::ZERO, Turn::clockwise(180.0), Turn::NONE);
        let min_z = turned
            .mesh()
            .vertices
            .iter()
            .map(|v| v.position[2])
            .fold(f32::MAX, f32::min);
        assert!((min_z - 13.0 / 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_anticlockwise_undoes_clockwise() {
        let there = panel().transformed(Vec3::ZERO, Turn::clockwise(90.0), Turn::clockwise(90.0));
        let back = there.transformed(Vec3::ZERO, Turn::anti_clockwise(90.0), Turn::NONE);
        let back = back.transformed(Vec3::ZERO, Turn::NONE, Turn::anti_clockwise(90.0));
        for (a, b) in panel().mesh().vertices.iter().zip(&back.mesh().vertices) {
            assert!(close(a.position, b.position));
        }
    }

    #[test]
    fn test_normals_follow_rotation() {
        let mut sub = SubMesh::new();
        let v = Vec3::new;
        sub.add_quad(
            [v(0.0, 1.0, 0.0), v(1.0, 1.0, 0.0), v(1.0, 1.0, 1.0), v(0.0, 1.0, 1.0)],
            [1.0; 4],
            &region(),
        );
        let turned = sub.transformed(Vec3::ZERO, Turn::NONE, Turn::clockwise(180.0));
        assert!(close(turned.mesh().vertices[0].normal, [0.0, -1.0, 0.0]));
    }
}
