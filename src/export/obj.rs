//! Wavefront OBJ export.
//!
//! Vertex colours are written as the common `v x y z r g b` extension. Each
//! blend mode gets its own material; all of them sample the same atlas.

use crate::error::{MesherError, Result};
use crate::mesher::geometry::{BlendMode, Mesh};
use crate::mesher::MesherOutput;
use std::fmt::{self, Write};

/// Export a mesh to OBJ format.
/// Returns (obj_content, mtl_content) as strings.
pub fn export_obj(output: &MesherOutput, name: &str) -> Result<(String, String)> {
    let write_err = |e: fmt::Error| MesherError::Export(format!("Failed to write OBJ: {e}"));
    let obj = write_obj(output, name).map_err(write_err)?;
    let mtl = write_mtl(output, name).map_err(write_err)?;
    Ok((obj, mtl))
}

fn material_name(name: &str, blend: BlendMode) -> String {
    format!("{}_{}", name, blend.name())
}

fn write_obj(output: &MesherOutput, name: &str) -> std::result::Result<String, fmt::Error> {
    let total_verts = output.total_vertices();
    let total_tris = output.total_triangles();
    let meshes: Vec<(BlendMode, &Mesh)> = output
        .buffers
        .non_empty()
        .map(|(key, mesh)| (key.blend, mesh))
        .collect();

    // Roughly 60 bytes per v/vt/vn line and 40 per face.
    let mut obj = String::with_capacity(256 + total_verts * 180 + total_tris * 40);

    writeln!(obj, "# isomap-mesher OBJ export")?;
    writeln!(obj, "# Vertices: {}", total_verts)?;
    writeln!(obj, "# Triangles: {}", total_tris)?;
    writeln!(obj)?;
    writeln!(obj, "mtllib {}.mtl", name)?;
    writeln!(obj, "o {}", name)?;
    writeln!(obj)?;

    // OBJ has global vertex pools.
    for (_, mesh) in &meshes {
        for vertex in &mesh.vertices {
            let [x, y, z] = vertex.position;
            let [r, g, b, _] = vertex.color;
            writeln!(obj, "v {} {} {} {} {} {}", x, y, z, r, g, b)?;
        }
    }
    writeln!(obj)?;
    for (_, mesh) in &meshes {
        for vertex in &mesh.vertices {
            // OBJ's v axis points up.
            writeln!(obj, "vt {} {}", vertex.uv[0], 1.0 - vertex.uv[1])?;
        }
    }
    writeln!(obj)?;
    for (_, mesh) in &meshes {
        for vertex in &mesh.vertices {
            writeln!(obj, "vn {} {} {}", vertex.normal[0], vertex.normal[1], vertex.normal[2])?;
        }
    }

    let mut vertex_offset = 0usize;
    for (blend, mesh) in &meshes {
        writeln!(obj)?;
        writeln!(obj, "usemtl {}", material_name(name, *blend))?;
        for tri in mesh.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0], tri[1], tri[2]].map(|i| i as usize + vertex_offset + 1);
            writeln!(obj, "f {i0}/{i0}/{i0} {i1}/{i1}/{i1} {i2}/{i2}/{i2}")?;
        }
        vertex_offset += mesh.vertex_count();
    }

    Ok(obj)
}

fn write_mtl(output: &MesherOutput, name: &str) -> std::result::Result<String, fmt::Error> {
    let mut mtl = String::with_capacity(512);
    writeln!(mtl, "# isomap-mesher materials")?;

    let mut blends: Vec<BlendMode> = output.buffers.non_empty().map(|(key, _)| key.blend).collect();
    blends.dedup();
    for blend in blends {
        writeln!(mtl)?;
        writeln!(mtl, "newmtl {}", material_name(name, blend))?;
        writeln!(mtl, "Ka 1.0 1.0 1.0")?;
        writeln!(mtl, "Kd 1.0 1.0 1.0")?;
        writeln!(mtl, "Ks 0.0 0.0 0.0")?;
        writeln!(mtl, "Ns 10.0")?;
        writeln!(mtl, "d 1.0")?;
        writeln!(mtl, "illum 1")?;
        writeln!(mtl, "map_Kd {}_atlas.png", name)?;
        if blend != BlendMode::Solid {
            writeln!(mtl, "map_d {}_atlas.png", name)?;
        }
    }
    Ok(mtl)
}

/// OBJ, MTL and atlas PNG contents, ready to be written side by side.
pub struct ObjExport {
    pub obj: String,
    pub mtl: String,
    pub texture_png: Vec<u8>,
}

impl ObjExport {
    pub fn from_output(output: &MesherOutput, name: &str) -> Result<Self> {
        let (obj, mtl) = export_obj(output, name)?;
        let texture_png = output.atlas.to_png()?;
        Ok(Self { obj, mtl, texture_png })
    }

    /// Write `<dir>/<name>.obj`, `<name>.mtl` and `<name>_atlas.png`.
    pub fn write_to(&self, dir: &std::path::Path, name: &str) -> Result<()> {
        std::fs::write(dir.join(format!("{name}.obj")), &self.obj)?;
        std::fs::write(dir.join(format!("{name}.mtl")), &self.mtl)?;
        std::fs::write(dir.join(format!("{name}_atlas.png")), &self.texture_png)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::TextureAtlas;
    use crate::mesher::geometry::{GeometryBuffers, MeshKey, Vertex};
    use crate::texture::AtlasId;

    fn triangle(mesh: &mut Mesh) {
        let v0 = mesh.add_vertex(Vertex::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]));
        let v1 = mesh.add_vertex(Vertex::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]));
        let v2 = mesh.add_vertex(Vertex::new([0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.0, 1.0]));
        mesh.add_triangle(v0, v1, v2);
    }

    #[test]
    fn test_export_simple_obj() {
        let mut buffers = GeometryBuffers::new();
        triangle(buffers.mesh_mut(MeshKey::new(AtlasId(0), BlendMode::Solid)));
        let output = MesherOutput::new(buffers, TextureAtlas::empty(AtlasId(0)));

        let (obj, mtl) = export_obj(&output, "test").unwrap();

        assert!(obj.contains("v 0 0 0 1 1 1"));
        assert!(obj.contains("vt 0 1"));
        assert!(obj.contains("vn 0 1 0"));
        assert!(obj.contains("usemtl test_solid"));
        assert!(obj.contains("f 1/1/1 2/2/2 3/3/3"));
        assert!(mtl.contains("newmtl test_solid"));
        assert!(!mtl.contains("map_d"));
    }

    #[test]
    fn test_face_indices_continue_across_groups() {
        let mut buffers = GeometryBuffers::new();
        triangle(buffers.mesh_mut(MeshKey::new(AtlasId(0), BlendMode::Solid)));
        triangle(buffers.mesh_mut(MeshKey::new(AtlasId(0), BlendMode::AlphaTest)));
        let output = MesherOutput::new(buffers, TextureAtlas::empty(AtlasId(0)));

        let (obj, mtl) = export_obj(&output, "scene").unwrap();
        assert!(obj.contains("usemtl scene_alpha_test\nf 4/4/4 5/5/5 6/6/6"));
        assert!(mtl.contains("newmtl scene_alpha_test"));
        assert!(mtl.contains("map_d scene_atlas.png"));
    }

    #[test]
    fn test_write_files() {
        let mut buffers = GeometryBuffers::new();
        triangle(buffers.mesh_mut(MeshKey::new(AtlasId(0), BlendMode::Solid)));
        let output = MesherOutput::new(buffers, TextureAtlas::empty(AtlasId(0)));
        let dir = tempfile::tempdir().unwrap();

        ObjExport::from_output(&output, "out").unwrap().write_to(dir.path(), "out").unwrap();
        assert!(dir.path().join("out.obj").exists());
        assert!(dir.path().join("out_atlas.png").exists());
    }
}
