//! Raw mesh data export for custom rendering.

use crate::mesher::geometry::BlendMode;
use crate::mesher::MesherOutput;
use crate::texture::AtlasId;

/// A run of triangles sharing one (atlas, blend mode) buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawGroup {
    pub atlas: AtlasId,
    pub blend: BlendMode,
    /// First index of the group in [`RawMeshData::indices`].
    pub index_start: usize,
    pub index_count: usize,
}

/// Raw mesh data for custom use.
#[derive(Debug)]
pub struct RawMeshData {
    /// Vertex positions (3 floats per vertex).
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals (3 floats per vertex).
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates (2 floats per vertex).
    pub uvs: Vec<[f32; 2]>,
    /// Vertex colors (4 floats per vertex, RGBA).
    pub colors: Vec<[f32; 4]>,
    /// Triangle indices (3 per triangle), into the shared vertex arrays.
    pub indices: Vec<u32>,
    /// Index ranges per buffer, in buffer order.
    pub groups: Vec<RawGroup>,
    /// Texture atlas RGBA data.
    pub texture_rgba: Vec<u8>,
    pub texture_width: u32,
    pub texture_height: u32,
}

/// Concatenate every buffer into shared arrays, keeping the index range of
/// each buffer.
pub fn export_raw(output: &MesherOutput) -> RawMeshData {
    let atlas = &output.atlas;
    let mut raw = RawMeshData {
        positions: Vec::with_capacity(output.total_vertices()),
        normals: Vec::with_capacity(output.total_vertices()),
        uvs: Vec::with_capacity(output.total_vertices()),
        colors: Vec::with_capacity(output.total_vertices()),
        indices: Vec::with_capacity(output.total_triangles() * 3),
        groups: Vec::new(),
        texture_rgba: atlas.pixels.clone(),
        texture_width: atlas.width,
        texture_height: atlas.height,
    };

    for (key, mesh) in output.buffers.non_empty() {
        let base = raw.positions.len() as u32;
        raw.groups.push(RawGroup {
            atlas: key.atlas,
            blend: key.blend,
            index_start: raw.indices.len(),
            index_count: mesh.indices.len(),
        });
        for vertex in &mesh.vertices {
            raw.positions.push(vertex.position);
            raw.normals.push(vertex.normal);
            raw.uvs.push(vertex.uv);
            raw.colors.push(vertex.color);
        }
        raw.indices.extend(mesh.indices.iter().map(|i| i + base));
    }
    raw
}

impl RawMeshData {
    pub fn positions_flat(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| p.iter().copied()).collect()
    }

    pub fn normals_flat(&self) -> Vec<f32> {
        self.normals.iter().flat_map(|n| n.iter().copied()).collect()
    }

    pub fn uvs_flat(&self) -> Vec<f32> {
        self.uvs.iter().flat_map(|uv| uv.iter().copied()).collect()
    }

    pub fn colors_flat(&self) -> Vec<f32> {
        self.colors.iter().flat_map(|c| c.iter().copied()).collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::TextureAtlas;
    use crate::mesher::geometry::{GeometryBuffers, Mesh, MeshKey, Vertex};

    fn triangle(mesh: &mut Mesh) {
        mesh.add_vertex(Vertex::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]));
        mesh.add_vertex(Vertex::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]));
        mesh.add_vertex(Vertex::new([0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.0, 1.0]));
        mesh.add_triangle(0, 1, 2);
    }

    #[test]
    fn test_export_raw() {
        let mut buffers = GeometryBuffers::new();
        triangle(buffers.mesh_mut(MeshKey::new(AtlasId(0), BlendMode::Solid)));
        triangle(buffers.mesh_mut(MeshKey::new(AtlasId(0), BlendMode::Transparent)));
        let output = MesherOutput::new(buffers, TextureAtlas::empty(AtlasId(0)));

        let raw = export_raw(&output);

        assert_eq!(raw.vertex_count(), 6);
        assert_eq!(raw.triangle_count(), 2);
        assert_eq!(raw.positions_flat().len(), 18);
        assert_eq!(&raw.indices[3..], &[3, 4, 5]);
        assert_eq!(raw.groups.len(), 2);
        assert_eq!(raw.groups[1].blend, BlendMode::Transparent);
        assert_eq!(raw.groups[1].index_start, 3);
        assert_eq!(raw.texture_rgba.len(), (raw.texture_width * raw.texture_height * 4) as usize);
    }
}
