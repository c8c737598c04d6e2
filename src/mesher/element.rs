//! Geometry of JSON model elements.
//!
//! Element faces are built in unit-cube space, turned by the element's own
//! rotation and then by the variant's block transform, and finally moved to
//! the block's world position.

use super::geometry::{Mesh, QuadUvs};
use crate::resource_pack::model::default_face_uv;
use crate::resource_pack::BlockElement;
use crate::texture::TextureRegion;
use crate::types::{BlockTransform, Direction};
use glam::{Mat4, Vec3};

/// Corners of the face of the box `from..to` (unit-cube space) on side
/// `direction`, in emission order.
pub fn face_vertices(direction: Direction, from: Vec3, to: Vec3) -> [Vec3; 4] {
    let v = Vec3::new;
    match direction {
        Direction::Down => [
            v(from.x, from.y, to.z),
            v(to.x, from.y, to.z),
            v(to.x, from.y, from.z),
            v(from.x, from.y, from.z),
        ],
        Direction::Up => [
            v(from.x, to.y, from.z),
            v(to.x, to.y, from.z),
            v(to.x, to.y, to.z),
            v(from.x, to.y, to.z),
        ],
        Direction::North => [
            v(to.x, to.y, from.z),
            v(from.x, to.y, from.z),
            v(from.x, from.y, from.z),
            v(to.x, from.y, from.z),
        ],
        Direction::South => [
            v(from.x, to.y, to.z),
            v(to.x, to.y, to.z),
            v(to.x, from.y, to.z),
            v(from.x, from.y, to.z),
        ],
        Direction::West => [
            v(from.x, to.y, from.z),
            v(from.x, to.y, to.z),
            v(from.x, from.y, to.z),
            v(from.x, from.y, from.z),
        ],
        Direction::East => [
            v(to.x, to.y, to.z),
            v(to.x, to.y, from.z),
            v(to.x, from.y, from.z),
            v(to.x, from.y, to.z),
        ],
    }
}

/// Rotate corner UVs clockwise in 90 degree steps.
pub fn rotate_uvs(uvs: QuadUvs, rotation: i32) -> QuadUvs {
    let steps = ((rotation / 90) % 4 + 4) % 4;
    let mut result = uvs;
    for _ in 0..steps {
        result = [result[3], result[0], result[1], result[2]];
    }
    result
}

/// Map a face UV rectangle (0-16 units) into `region`, then rotate it.
pub fn map_uvs(uv: [f32; 4], rotation: i32, region: &TextureRegion) -> QuadUvs {
    let at = |u: f32, v: f32| {
        [
            region.u0 + region.width() * u / 16.0,
            region.v0 + region.height() * v / 16.0,
        ]
    };
    let [u1, v1, u2, v2] = uv;
    rotate_uvs([at(u1, v1), at(u2, v1), at(u2, v2), at(u1, v2)], rotation)
}

/// World-facing side of a model face after the block transform.
pub fn world_direction(direction: Direction, transform: &BlockTransform) -> Direction {
    direction.rotate_x(transform.x).rotate_y(transform.y)
}

/// UV rectangle a uv-locked face shows: the element's box after the block
/// rotation, projected onto the side it now faces.
pub fn uvlock_uv(element: &BlockElement, direction: Direction, transform: &BlockTransform) -> [f32; 4] {
    let matrix = transform.matrix();
    let a = matrix.transform_point3(Vec3::from(element.from) / 16.0) * 16.0;
    let b = matrix.transform_point3(Vec3::from(element.to) / 16.0) * 16.0;
    let (from, to) = (a.min(b).to_array(), a.max(b).to_array());
    default_face_uv(from, to, world_direction(direction, transform))
}

/// Local-to-block matrix of an element under a block transform.
pub fn element_matrix(element: &BlockElement, transform: &BlockTransform) -> Mat4 {
    let block = if transform.is_identity() {
        Mat4::IDENTITY
    } else {
        transform.matrix()
    };
    match &element.rotation {
        Some(rotation) => block * rotation.matrix(),
        None => block,
    }
}

/// Emit one face of `element` at `origin`.
pub fn add_element_face(
    mesh: &mut Mesh,
    origin: Vec3,
    element: &BlockElement,
    direction: Direction,
    matrix: &Mat4,
    uvs: QuadUvs,
    colour: [f32; 4],
) {
    let from = Vec3::from(element.from) / 16.0;
    let to = Vec3::from(element.to) / 16.0;
    let positions = face_vertices(direction, from, to).map(|p| matrix.transform_point3(p) + origin);
    mesh.add_textured_quad(positions, uvs, colour);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesher::geometry::quad_normal;
    use crate::texture::{AtlasId, PackVersion};
    use crate::types::{Axis, ElementRotation};
    use std::collections::BTreeMap;

    fn element(from: [f32; 3], to: [f32; 3]) -> BlockElement {
        BlockElement {
            from,
            to,
            rotation: None,
            shade: true,
            faces: BTreeMap::new(),
        }
    }

    #[test]
    fn test_rotate_uvs() {
        let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

        assert_eq!(rotate_uvs(uvs, 0), uvs);

        let rotated_90 = rotate_uvs(uvs, 90);
        assert_eq!(rotated_90[0], uvs[3]);
        assert_eq!(rotated_90[1], uvs[0]);

        let rotated_180 = rotate_uvs(uvs, 180);
        assert_eq!(rotated_180[0], uvs[2]);
        assert_eq!(rotated_180[2], uvs[0]);

        assert_eq!(rotate_uvs(uvs, -90), rotate_uvs(uvs, 270));
    }

    #[test]
    fn test_face_vertices_face_outward() {
        let (from, to) = (Vec3::ZERO, Vec3::ONE);
        for dir in Direction::ALL {
            let normal = quad_normal(&face_vertices(dir, from, to));
            assert!((normal - Vec3::from(dir.normal())).length() < 1e-5, "{dir}");
        }
    }

    #[test]
    fn test_map_uvs_into_region() {
        let region = TextureRegion::new(AtlasId(0), 0.5, 0.25, 0.75, 0.5, PackVersion::V1_9);
        let uvs = map_uvs([0.0, 0.0, 8.0, 16.0], 0, &region);
        assert_eq!(uvs[0], [0.5, 0.25]);
        assert_eq!(uvs[2], [0.625, 0.5]);
    }

    #[test]
    fn test_world_direction_follows_block_rotation() {
        let t = BlockTransform::new(0, 90, false);
        assert_eq!(world_direction(Direction::North, &t), Direction::East);
        let t = BlockTransform::new(90, 0, false);
        assert_eq!(world_direction(Direction::Up, &t), Direction::North);
    }

    #[test]
    fn test_rotated_face_lands_on_world_side() {
        let slab = element([0.0, 0.0, 0.0], [16.0, 16.0, 8.0]);
        let t = BlockTransform::new(0, 90, false);
        let mut mesh = Mesh::new();
        let matrix = element_matrix(&slab, &t);
        add_element_face(&mut mesh, Vec3::ZERO, &slab, Direction::North, &matrix, [[0.0; 2]; 4], [1.0; 4]);

        // North face turned to east sits on x = 1.
        assert!(mesh.vertices.iter().all(|v| (v.position[0] - 1.0).abs() < 1e-5));
        let normal = Vec3::from(mesh.vertices[0].normal);
        assert!((normal - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_uvlock_projects_rotated_box() {
        let half = element([0.0, 0.0, 0.0], [8.0, 16.0, 16.0]);
        let t = BlockTransform::new(0, 90, true);
        // The west half turned 90 degrees becomes the north half.
        let uv = uvlock_uv(&half, Direction::Up, &t);
        assert!((uv[0] - 0.0).abs() < 1e-4 && (uv[2] - 16.0).abs() < 1e-4);
        assert!((uv[1] - 0.0).abs() < 1e-4 && (uv[3] - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_element_rotation_applies_before_block() {
        let mut cross = element([0.8, 0.0, 8.0], [15.2, 16.0, 8.0]);
        cross.rotation = Some(ElementRotation {
            origin: [8.0, 8.0, 8.0],
            axis: Axis::Y,
            angle: 45.0,
            rescale: false,
        });
        let matrix = element_matrix(&cross, &BlockTransform::default());
        let centre = matrix.transform_point3(Vec3::splat(0.5));
        assert!((centre - Vec3::splat(0.5)).length() < 1e-5);
        let end = matrix.transform_point3(Vec3::new(15.2 / 16.0, 0.0, 0.5));
        assert!((end.x - 0.5).abs() > 0.1 && (end.z - 0.5).abs() > 0.1);
    }
}
