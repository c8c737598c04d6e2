//! Blocks drawn from resource pack JSON models.
//!
//! A per-data table maps the nibble to a blockstate state key. The parts
//! drawn for that key (one for a `variants` blockstate, one per applicable
//! case for a `multipart` one) are resolved once, when the block type is
//! built, and the textures they name are looked up in the provider at the
//! same time.

use super::{grey, Placement};
use crate::error::Result;
use crate::mesher::element::{add_element_face, element_matrix, map_uvs, uvlock_uv, world_direction};
use crate::mesher::face_culler::{is_full_opaque_cube, CullType, RenderMode};
use crate::mesher::geometry::{BlendMode, GeometryBuffers, MeshKey};
use crate::resolver::{pick_weighted, ModelRegistry, ResolvedModel};
use crate::texture::{TextureProvider, TextureRegion};
use crate::types::{BlockPosition, LightFace};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Weighted alternatives, one of which is drawn.
type Part = Vec<ResolvedModel>;

#[derive(Debug, Clone)]
pub struct ModelBlock {
    blockstate: String,
    by_data: BTreeMap<u8, Vec<Part>>,
    default: Vec<Part>,
    textures: HashMap<String, TextureRegion>,
    blend: BlendMode,
    cull: CullType,
}

impl ModelBlock {
    /// Resolve the states of `blockstate` named by `variants` (data value
    /// to state key). Data values without an entry use `default_variant`.
    pub fn new(
        blockstate: &str,
        variants: &BTreeMap<u8, String>,
        default_variant: &str,
        models: &ModelRegistry,
        provider: &dyn TextureProvider,
        blend: BlendMode,
    ) -> Result<Self> {
        let default = models.resolve_parts(blockstate, default_variant)?;
        let mut by_data = BTreeMap::new();
        for (data, key) in variants {
            by_data.insert(*data & 15, models.resolve_parts(blockstate, key)?);
        }

        let mut textures = HashMap::new();
        let mut missing = BTreeSet::new();
        let faces = by_data
            .values()
            .chain(std::iter::once(&default))
            .flatten()
            .flatten()
            .flat_map(|resolved| resolved.model.elements.iter())
            .flat_map(|element| element.faces.values());
        for face in faces {
            if textures.contains_key(&face.texture) || missing.contains(&face.texture) {
                continue;
            }
            match provider.find(&face.texture) {
                Some(region) => {
                    textures.insert(face.texture.clone(), region);
                }
                None => {
                    missing.insert(face.texture.clone());
                }
            }
        }
        for texture in &missing {
            tracing::warn!(blockstate, texture = %texture, "texture not in atlas, faces using it are skipped");
        }

        let full_cubes = !default.is_empty()
            && default.iter().all(|part| !part.is_empty() && part.iter().all(|m| is_full_opaque_cube(&m.model)));
        let cull = if full_cubes && blend == BlendMode::Solid {
            CullType::Opaque
        } else {
            CullType::NonSolid
        };

        Ok(Self {
            blockstate: blockstate.to_string(),
            by_data,
            default,
            textures,
            blend,
            cull,
        })
    }

    pub fn blockstate(&self) -> &str {
        &self.blockstate
    }

    pub fn cull_type(&self) -> CullType {
        self.cull
    }

    fn parts_for(&self, data: u8) -> &[Part] {
        self.by_data.get(&data).unwrap_or(&self.default)
    }

    pub(crate) fn emit(&self, at: &Placement, buffers: &mut GeometryBuffers) {
        let seed = position_seed(at.pos);
        for part in self.parts_for(at.data) {
            if let Some(chosen) = pick_weighted(part, seed) {
                self.emit_model(at, chosen, buffers);
            }
        }
    }

    fn emit_model(&self, at: &Placement, chosen: &ResolvedModel, buffers: &mut GeometryBuffers) {
        let transform = &chosen.transform;
        let culler = at.culler();
        let origin = at.origin();

        for element in &chosen.model.elements {
            let matrix = element_matrix(element, transform);
            for (&direction, face) in &element.faces {
                let Some(region) = self.textures.get(&face.texture) else {
                    continue;
                };

                let cullface = face.cullface.map(|dir| world_direction(dir, transform));
                if let Some(side) = cullface {
                    if at.mode == RenderMode::Edge && culler.should_cull(at.pos, side) {
                        continue;
                    }
                }

                let facing = world_direction(direction, transform);
                let light = if !element.shade {
                    at.light(LightFace::Top)
                } else {
                    // Boundary faces are lit through the cell they face.
                    let lit_from = cullface.map_or(at.pos, |side| at.pos.neighbor(side));
                    at.ctx.light(lit_from, facing.light_face())
                };
                let mut colour = grey(light);
                if face.tinted {
                    let biome = at.ctx.biome_colour(at.pos);
                    for (c, b) in colour.iter_mut().zip(biome) {
                        *c *= b;
                    }
                }

                let uv = if transform.uvlock {
                    uvlock_uv(element, direction, transform)
                } else {
                    face.uv
                };
                let uvs = map_uvs(uv, face.rotation, region);
                let mesh = buffers.mesh_mut(MeshKey::for_region(region, self.blend));
                add_element_face(mesh, origin, element, direction, &matrix, uvs, colour);
            }
        }
    }
}

/// Stable per-position seed for picking between weighted models.
fn position_seed(pos: BlockPosition) -> u64 {
    let mut seed = i64::from(pos.x).wrapping_mul(3_129_871)
        ^ i64::from(pos.z).wrapping_mul(116_129_781)
        ^ i64::from(pos.y);
    seed = seed
        .wrapping_mul(seed)
        .wrapping_mul(42_317_861)
        .wrapping_add(seed.wrapping_mul(11));
    (seed >> 16) as u64
}
