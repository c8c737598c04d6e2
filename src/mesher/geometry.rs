//! Mesh geometry types and the per-texture buffer set.

use crate::texture::{AtlasId, TextureRegion};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A vertex in the output mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in world-block units.
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// RGBA, already multiplied by the face light.
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            normal: [0.0, 1.0, 0.0],
            uv: [0.0, 0.0],
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// UVs for the four corners of a quad, in vertex order.
pub type QuadUvs = [[f32; 2]; 4];

/// Standard corner mapping: p0 at (u0,v0), p1 at (u1,v0), p2 at (u1,v1),
/// p3 at (u0,v1).
pub fn region_uvs(region: &TextureRegion) -> QuadUvs {
    [
        [region.u0, region.v0],
        [region.u1, region.v0],
        [region.u1, region.v1],
        [region.u0, region.v1],
    ]
}

/// Outward normal of a quad given in emission order.
pub fn quad_normal(positions: &[Vec3; 4]) -> Vec3 {
    let n = (positions[2] - positions[0]).cross(positions[1] - positions[0]);
    n.try_normalize().unwrap_or(Vec3::Y)
}

/// A triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    /// Triangle indices (3 per triangle).
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    /// Add a quad (two triangles) by vertex indices.
    ///
    /// Triangles are (0,2,1) and (0,3,2), so corners listed the way the
    /// builders list them come out counter-clockwise seen from outside.
    pub fn add_quad(&mut self, i0: u32, i1: u32, i2: u32, i3: u32) {
        self.add_triangle(i0, i2, i1);
        self.add_triangle(i0, i3, i2);
    }

    /// Add a textured, coloured quad from four corner positions.
    pub fn add_textured_quad(&mut self, positions: [Vec3; 4], uvs: QuadUvs, color: [f32; 4]) {
        let normal = quad_normal(&positions).to_array();
        let base = self.vertices.len() as u32;
        for (position, uv) in positions.iter().zip(uvs) {
            self.vertices
                .push(Vertex::new(position.to_array(), normal, uv).with_color(color));
        }
        self.add_quad(base, base + 1, base + 2, base + 3);
    }

    /// Quad mapped onto a whole region with the standard corner mapping.
    pub fn add_region_quad(&mut self, positions: [Vec3; 4], color: [f32; 4], region: &TextureRegion) {
        self.add_textured_quad(positions, region_uvs(region), color);
    }

    /// Quad visible from both sides: the corners again in reverse order.
    pub fn add_double_sided_quad(&mut self, positions: [Vec3; 4], uvs: QuadUvs, color: [f32; 4]) {
        self.add_textured_quad(positions, uvs, color);
        let [p0, p1, p2, p3] = positions;
        let [t0, t1, t2, t3] = uvs;
        self.add_textured_quad([p0, p3, p2, p1], [t0, t3, t2, t1], color);
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Every quad contributes four vertices.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Merge another mesh into this one.
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + offset));
    }

    pub fn translate(&mut self, offset: [f32; 3]) {
        for vertex in &mut self.vertices {
            for (p, o) in vertex.position.iter_mut().zip(offset) {
                *p += o;
            }
        }
    }

    pub fn positions_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.position).collect()
    }

    pub fn normals_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.normal).collect()
    }

    pub fn uvs_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.uv).collect()
    }

    pub fn colors_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.color).collect()
    }
}

/// How a buffer's fragments are blended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    /// Fully opaque.
    Solid,
    /// Binary alpha cut-out (plants, torches, doors).
    AlphaTest,
    /// Alpha blended (glass, water, ice).
    Transparent,
}

impl BlendMode {
    pub fn name(&self) -> &'static str {
        match self {
            BlendMode::Solid => "solid",
            BlendMode::AlphaTest => "alpha_test",
            BlendMode::Transparent => "transparent",
        }
    }
}

/// Key of one output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshKey {
    pub atlas: AtlasId,
    pub blend: BlendMode,
}

impl MeshKey {
    pub fn new(atlas: AtlasId, blend: BlendMode) -> Self {
        Self { atlas, blend }
    }

    /// Key for geometry textured from `region`.
    pub fn for_region(region: &TextureRegion, blend: BlendMode) -> Self {
        Self::new(region.atlas, blend)
    }
}

/// Output buffers, one per (atlas, blend mode), created on first use.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryBuffers {
    meshes: BTreeMap<MeshKey, Mesh>,
}

impl GeometryBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// The buffer for `key`, creating it if needed.
    pub fn mesh_mut(&mut self, key: MeshKey) -> &mut Mesh {
        self.meshes.entry(key).or_default()
    }

    pub fn mesh(&self, key: MeshKey) -> Option<&Mesh> {
        self.meshes.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MeshKey, &Mesh)> {
        self.meshes.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &MeshKey> {
        self.meshes.keys()
    }

    /// Concatenate `other` into this set, key by key.
    pub fn merge(&mut self, other: &GeometryBuffers) {
        for (key, mesh) in &other.meshes {
            self.mesh_mut(*key).merge(mesh);
        }
    }

    /// Buffers that hold at least one vertex.
    pub fn non_empty(&self) -> impl Iterator<Item = (&MeshKey, &Mesh)> {
        self.meshes.iter().filter(|(_, mesh)| !mesh.is_empty())
    }

    pub fn total_vertices(&self) -> usize {
        self.meshes.values().map(Mesh::vertex_count).sum()
    }

    pub fn total_triangles(&self) -> usize {
        self.meshes.values().map(Mesh::triangle_count).sum()
    }

    pub fn total_quads(&self) -> usize {
        self.meshes.values().map(Mesh::quad_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.values().all(Mesh::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::PackVersion;

    #[test]
    fn test_mesh_creation() {
        let mut mesh = Mesh::new();
        assert!(mesh.is_empty());

        let v0 = mesh.add_vertex(Vertex::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]));
        let v1 = mesh.add_vertex(Vertex::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]));
        let v2 = mesh.add_vertex(Vertex::new([1.0, 0.0, 1.0], [0.0, 1.0, 0.0], [1.0, 1.0]));

        mesh.add_triangle(v0, v1, v2);

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_top_quad_faces_up() {
        let mut mesh = Mesh::new();
        let positions = [
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
        ];
        let region = TextureRegion::full(AtlasId(0), PackVersion::V1_9);
        mesh.add_region_quad(positions, [1.0; 4], &region);

        assert_eq!(mesh.indices, vec![0, 2, 1, 0, 3, 2]);
        assert_eq!(mesh.vertices[0].normal, [0.0, 1.0, 0.0]);
        assert_eq!(mesh.vertices[2].uv, [1.0, 1.0]);
    }

    #[test]
    fn test_double_sided_quad_has_both_normals() {
        let mut mesh = Mesh::new();
        let positions = [
            Vec3::new(0.0, 1.0, 0.5),
            Vec3::new(1.0, 1.0, 0.5),
            Vec3::new(1.0, 0.0, 0.5),
            Vec3::new(0.0, 0.0, 0.5),
        ];
        let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        mesh.add_double_sided_quad(positions, uvs, [1.0; 4]);

        assert_eq!(mesh.quad_count(), 2);
        let front = mesh.vertices[0].normal;
        let back = mesh.vertices[4].normal;
        assert_eq!(front[2], -back[2]);
        assert_eq!(mesh.vertices[5].uv, [0.0, 1.0]);
    }

    #[test]
    fn test_mesh_merge() {
        let mut mesh1 = Mesh::new();
        let v0 = mesh1.add_vertex(Vertex::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]));
        let v1 = mesh1.add_vertex(Vertex::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]));
        let v2 = mesh1.add_vertex(Vertex::new([0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.0, 1.0]));
        mesh1.add_triangle(v0, v1, v2);

        let mut mesh2 = mesh1.clone();
        mesh2.translate([2.0, 0.0, 0.0]);

        mesh1.merge(&mesh2);

        assert_eq!(mesh1.vertex_count(), 6);
        assert_eq!(mesh1.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh1.vertices[3].position, [2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_buffers_created_lazily_and_merged() {
        let solid = MeshKey::new(AtlasId(0), BlendMode::Solid);
        let glass = MeshKey::new(AtlasId(0), BlendMode::Transparent);

        let mut a = GeometryBuffers::new();
        assert!(a.mesh(solid).is_none());
        a.mesh_mut(solid).add_vertex(Vertex::default());

        let mut b = GeometryBuffers::new();
        b.mesh_mut(solid).add_vertex(Vertex::default());
        b.mesh_mut(glass).add_vertex(Vertex::default());

        a.merge(&b);
        assert_eq!(a.mesh(solid).unwrap().vertex_count(), 2);
        assert_eq!(a.mesh(glass).unwrap().vertex_count(), 1);
        assert_eq!(a.total_vertices(), 3);
    }
}
