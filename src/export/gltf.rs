//! glTF/GLB export.
//!
//! Each non-empty (atlas, blend mode) buffer becomes one primitive. Blend
//! modes map to glTF alpha modes: solid is `OPAQUE`, alpha-tested is `MASK`
//! with a 0.5 cutoff and transparent is `BLEND`. The atlas PNG is embedded in
//! the binary chunk.

use crate::error::{MesherError, Result};
use crate::mesher::geometry::{BlendMode, Mesh};
use crate::mesher::MesherOutput;
use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;
use std::collections::BTreeMap;

const MAGIC: &[u8; 4] = b"glTF";
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

/// Export a mesh to GLB format (binary glTF) with embedded texture.
#[tracing::instrument(skip_all, fields(vertices = output.total_vertices()))]
pub fn export_glb(output: &MesherOutput) -> Result<Vec<u8>> {
    if output.is_empty() {
        return Err(MesherError::Export("Cannot export empty mesh".to_string()));
    }

    let texture_png = output.atlas.to_png()?;
    let mut doc = Document::default();

    // Atlas image first, so texture 0 is always the atlas.
    let image_view = doc.push_bytes(&texture_png, None);
    let images = vec![json::Image {
        buffer_view: Some(json::Index::new(image_view)),
        mime_type: Some(json::image::MimeType("image/png".to_string())),
        uri: None,
        extensions: Default::default(),
        extras: Default::default(),
    }];
    let textures = vec![json::Texture {
        sampler: Some(json::Index::new(0)),
        source: json::Index::new(0),
        extensions: Default::default(),
        extras: Default::default(),
    }];

    let mut materials = Vec::new();
    let mut material_for: BTreeMap<BlendMode, u32> = BTreeMap::new();
    let mut primitives = Vec::new();
    for (key, mesh) in output.buffers.non_empty() {
        let material = *material_for.entry(key.blend).or_insert_with(|| {
            materials.push(create_material(key.blend, 0));
            (materials.len() - 1) as u32
        });
        primitives.push(doc.push_mesh(mesh, material));
    }

    let root = json::Root {
        accessors: doc.accessors,
        buffers: vec![json::Buffer {
            byte_length: USize64(doc.buffer.len() as u64),
            extensions: Default::default(),
            extras: Default::default(),
            uri: None,
        }],
        buffer_views: doc.views,
        images,
        samplers: vec![json::texture::Sampler {
            mag_filter: Some(Valid(json::texture::MagFilter::Nearest)),
            min_filter: Some(Valid(json::texture::MinFilter::Nearest)),
            wrap_s: Valid(json::texture::WrappingMode::ClampToEdge),
            wrap_t: Valid(json::texture::WrappingMode::ClampToEdge),
            extensions: Default::default(),
            extras: Default::default(),
        }],
        textures,
        materials,
        meshes: vec![json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            primitives,
            weights: None,
        }],
        nodes: vec![json::Node {
            camera: None,
            children: None,
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: Some(json::Index::new(0)),
            rotation: None,
            scale: None,
            translation: None,
            skin: None,
            weights: None,
        }],
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            nodes: vec![json::Index::new(0)],
        }],
        scene: Some(json::Index::new(0)),
        ..Default::default()
    };

    let json_string = json::serialize::to_string(&root)
        .map_err(|e| MesherError::Export(format!("Failed to serialize glTF JSON: {}", e)))?;
    let glb = write_glb(json_string.as_bytes(), &doc.buffer);
    tracing::info!(bytes = glb.len(), "wrote GLB");
    Ok(glb)
}

/// Binary buffer and the views and accessors pointing into it.
#[derive(Default)]
struct Document {
    buffer: Vec<u8>,
    views: Vec<json::buffer::View>,
    accessors: Vec<json::Accessor>,
}

impl Document {
    /// Append `bytes` at a 4-byte boundary and return the new view's index.
    fn push_bytes(&mut self, bytes: &[u8], target: Option<json::buffer::Target>) -> u32 {
        pad_to_four(&mut self.buffer, 0);
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);
        self.views.push(create_buffer_view(offset, bytes.len(), target));
        (self.views.len() - 1) as u32
    }

    fn push_accessor(&mut self, accessor: json::Accessor) -> u32 {
        self.accessors.push(accessor);
        (self.accessors.len() - 1) as u32
    }

    /// Positions, normals, UVs, colours and indices of one mesh.
    fn push_mesh(&mut self, mesh: &Mesh, material: u32) -> json::mesh::Primitive {
        use json::accessor::{ComponentType, Type};
        use json::buffer::Target;

        let count = mesh.vertex_count();
        let (min, max) = bounds(mesh);

        let view = self.push_bytes(&f32_bytes(&mesh.positions_flat()), Some(Target::ArrayBuffer));
        let positions = self.push_accessor(create_accessor(view, count, Type::Vec3, ComponentType::F32, Some((min, max))));
        let view = self.push_bytes(&f32_bytes(&mesh.normals_flat()), Some(Target::ArrayBuffer));
        let normals = self.push_accessor(create_accessor(view, count, Type::Vec3, ComponentType::F32, None));
        let view = self.push_bytes(&f32_bytes(&mesh.uvs_flat()), Some(Target::ArrayBuffer));
        let uvs = self.push_accessor(create_accessor(view, count, Type::Vec2, ComponentType::F32, None));
        let view = self.push_bytes(&f32_bytes(&mesh.colors_flat()), Some(Target::ArrayBuffer));
        let colours = self.push_accessor(create_accessor(view, count, Type::Vec4, ComponentType::F32, None));

        let index_bytes: Vec<u8> = mesh.indices.iter().flat_map(|i| i.to_le_bytes()).collect();
        let view = self.push_bytes(&index_bytes, Some(Target::ElementArrayBuffer));
        let indices = self.push_accessor(create_accessor(
            view,
            mesh.indices.len(),
            Type::Scalar,
            ComponentType::U32,
            None,
        ));

        create_primitive([positions, normals, uvs, colours], indices, material)
    }
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn pad_to_four(bytes: &mut Vec<u8>, fill: u8) {
    let padding = (4 - bytes.len() % 4) % 4;
    bytes.extend(std::iter::repeat(fill).take(padding));
}

/// Assemble the header, JSON chunk and binary chunk.
fn write_glb(json_bytes: &[u8], buffer: &[u8]) -> Vec<u8> {
    let mut json_chunk = json_bytes.to_vec();
    pad_to_four(&mut json_chunk, b' ');
    let mut bin_chunk = buffer.to_vec();
    pad_to_four(&mut bin_chunk, 0);

    let total_size = 12 + 8 + json_chunk.len() + 8 + bin_chunk.len();
    let mut glb = Vec::with_capacity(total_size);

    glb.extend_from_slice(MAGIC);
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_size as u32).to_le_bytes());

    glb.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(&json_chunk);

    glb.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    glb.extend_from_slice(&bin_chunk);

    glb
}

/// Per-axis bounds of a mesh's positions.
fn bounds(mesh: &Mesh) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for vertex in &mesh.vertices {
        for i in 0..3 {
            min[i] = min[i].min(vertex.position[i]);
            max[i] = max[i].max(vertex.position[i]);
        }
    }
    (min, max)
}

fn create_buffer_view(offset: usize, size: usize, target: Option<json::buffer::Target>) -> json::buffer::View {
    json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: USize64(size as u64),
        byte_offset: Some(USize64(offset as u64)),
        byte_stride: None,
        extensions: Default::default(),
        extras: Default::default(),
        target: target.map(Valid),
    }
}

fn create_accessor(
    buffer_view: u32,
    count: usize,
    type_: json::accessor::Type,
    component_type: json::accessor::ComponentType,
    min_max: Option<([f32; 3], [f32; 3])>,
) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(json::Index::new(buffer_view)),
        byte_offset: Some(USize64(0)),
        count: USize64(count as u64),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: min_max.map(|(min, _)| json::Value::from(min.to_vec())),
        max: min_max.map(|(_, max)| json::Value::from(max.to_vec())),
        normalized: false,
        sparse: None,
    }
}

/// `attributes` holds the position, normal, UV and colour accessors.
fn create_primitive(attributes: [u32; 4], indices: u32, material: u32) -> json::mesh::Primitive {
    let [positions, normals, uvs, colours] = attributes;
    let mut map = BTreeMap::new();
    map.insert(Valid(json::mesh::Semantic::Positions), json::Index::new(positions));
    map.insert(Valid(json::mesh::Semantic::Normals), json::Index::new(normals));
    map.insert(Valid(json::mesh::Semantic::TexCoords(0)), json::Index::new(uvs));
    map.insert(Valid(json::mesh::Semantic::Colors(0)), json::Index::new(colours));

    json::mesh::Primitive {
        attributes: map,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(indices)),
        material: Some(json::Index::new(material)),
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    }
}

fn create_material(blend: BlendMode, texture_idx: u32) -> json::Material {
    let (alpha_mode, alpha_cutoff) = match blend {
        BlendMode::Solid => (json::material::AlphaMode::Opaque, None),
        BlendMode::AlphaTest => (
            json::material::AlphaMode::Mask,
            Some(json::material::AlphaCutoff(0.5)),
        ),
        BlendMode::Transparent => (json::material::AlphaMode::Blend, None),
    };
    json::Material {
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_texture: Some(json::texture::Info {
                index: json::Index::new(texture_idx),
                tex_coord: 0,
                extensions: Default::default(),
                extras: Default::default(),
            }),
            base_color_factor: json::material::PbrBaseColorFactor([1.0, 1.0, 1.0, 1.0]),
            metallic_factor: json::material::StrengthFactor(0.0),
            roughness_factor: json::material::StrengthFactor(1.0),
            metallic_roughness_texture: None,
            extensions: Default::default(),
            extras: Default::default(),
        },
        alpha_mode: Valid(alpha_mode),
        alpha_cutoff,
        double_sided: blend != BlendMode::Solid,
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: json::material::EmissiveFactor([0.0, 0.0, 0.0]),
        extensions: Default::default(),
        extras: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::TextureAtlas;
    use crate::mesher::geometry::{GeometryBuffers, MeshKey};
    use crate::texture::AtlasId;
    use glam::Vec3;

    fn quad(mesh: &mut Mesh, y: f32) {
        let v = Vec3::new;
        mesh.add_textured_quad(
            [v(0.0, y, 0.0), v(1.0, y, 0.0), v(1.0, y, 1.0), v(0.0, y, 1.0)],
            [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            [1.0; 4],
        );
    }

    fn output(blends: &[BlendMode]) -> MesherOutput {
        let mut buffers = GeometryBuffers::new();
        for (i, blend) in blends.iter().enumerate() {
            quad(buffers.mesh_mut(MeshKey::new(AtlasId(0), *blend)), i as f32);
        }
        MesherOutput::new(buffers, TextureAtlas::empty(AtlasId(0)))
    }

    /// The JSON chunk of a GLB file.
    fn json_chunk(glb: &[u8]) -> serde_json::Value {
        let len = u32::from_le_bytes([glb[12], glb[13], glb[14], glb[15]]) as usize;
        serde_json::from_slice(&glb[20..20 + len]).unwrap()
    }

    #[test]
    fn test_export_header() {
        let glb = export_glb(&output(&[BlendMode::Solid])).unwrap();

        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes([glb[4], glb[5], glb[6], glb[7]]), 2);
        assert_eq!(u32::from_le_bytes([glb[8], glb[9], glb[10], glb[11]]) as usize, glb.len());
        assert_eq!(glb.len() % 4, 0);
    }

    #[test]
    fn test_export_empty_mesh_fails() {
        let empty = MesherOutput::new(GeometryBuffers::new(), TextureAtlas::empty(AtlasId(0)));
        assert!(export_glb(&empty).is_err());
    }

    #[test]
    fn test_blend_modes_become_alpha_modes() {
        let glb = export_glb(&output(&[BlendMode::Solid, BlendMode::AlphaTest, BlendMode::Transparent])).unwrap();
        let json = json_chunk(&glb);

        let materials = json["materials"].as_array().unwrap();
        assert_eq!(materials.len(), 3);
        let modes: Vec<_> = materials.iter().map(|m| m["alphaMode"].as_str().unwrap_or("OPAQUE")).collect();
        assert_eq!(modes, ["OPAQUE", "MASK", "BLEND"]);
        assert_eq!(materials[1]["alphaCutoff"].as_f64(), Some(0.5));
        assert_eq!(json["meshes"][0]["primitives"].as_array().unwrap().len(), 3);
        assert_eq!(json["images"][0]["mimeType"], "image/png");
    }

    #[test]
    fn test_position_bounds_per_primitive() {
        let glb = export_glb(&output(&[BlendMode::Solid, BlendMode::AlphaTest])).unwrap();
        let json = json_chunk(&glb);
        let mask_positions = json["meshes"][0]["primitives"][1]["attributes"]["POSITION"].as_u64().unwrap();
        let accessor = &json["accessors"][mask_positions as usize];
        assert_eq!(accessor["min"][1].as_f64(), Some(1.0));
        assert_eq!(accessor["max"][0].as_f64(), Some(1.0));
    }
}
