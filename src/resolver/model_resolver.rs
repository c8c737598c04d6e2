//! Model inheritance resolution.
//!
//! Resolution is a pure recursion over parent links. Each link's flattened
//! result is memoized, so shared parents such as `block/cube_all` are
//! walked once per resolver.

use crate::error::{MesherError, Result};
use crate::resource_pack::model::{default_face_uv, model_location};
use crate::resource_pack::{BlockElement, BlockModel, ElementFace, ModelElement, ModelFile, ResourcePack};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// Parent links followed before giving up.
pub const MAX_INHERITANCE_DEPTH: usize = 32;

/// A model chain flattened up to, but not including, texture resolution.
#[derive(Debug)]
struct Flattened {
    textures: BTreeMap<String, String>,
    elements: Option<Vec<ModelElement>>,
    ambient_occlusion: Option<bool>,
    steps: usize,
}

/// Resolves model inheritance chains.
pub struct ModelResolver<'a> {
    pack: &'a ResourcePack,
    cache: RefCell<HashMap<String, Rc<Flattened>>>,
}

impl<'a> ModelResolver<'a> {
    pub fn new(pack: &'a ResourcePack) -> Self {
        Self {
            pack,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Resolve a model with all inherited properties.
    ///
    /// Every face of the result names a literal texture path, and the
    /// texture map holds no `#` references.
    pub fn resolve(&self, location: &str) -> Result<BlockModel> {
        let location = model_location(location);
        let flat = self.flatten(&location, 0)?;

        let textures: BTreeMap<String, String> = flat
            .textures
            .keys()
            .filter_map(|key| {
                resolve_reference(&format!("#{key}"), &flat.textures)
                    .map(|path| (key.clone(), path))
            })
            .collect();

        let elements = flat
            .elements
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|element| decode_element(&location, element, &flat.textures))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(model = %location, steps = flat.steps, elements = elements.len(), "resolved model");

        Ok(BlockModel {
            location,
            ambient_occlusion: flat.ambient_occlusion.unwrap_or(true),
            elements,
            textures,
            steps: flat.steps,
        })
    }

    fn flatten(&self, location: &str, depth: usize) -> Result<Rc<Flattened>> {
        if depth > MAX_INHERITANCE_DEPTH {
            return Err(MesherError::ModelInheritanceTooDeep(location.to_string()));
        }
        if let Some(cached) = self.cache.borrow().get(location) {
            return Ok(Rc::clone(cached));
        }

        let file = self
            .pack
            .get_model(location)
            .ok_or_else(|| MesherError::ResourceNotFound(format!("model {location}")))?;

        let flat = match parent_of(file) {
            Some(parent) => {
                let parent = self.flatten(&parent, depth + 1)?;
                merge(&parent, file)
            }
            None => Flattened {
                textures: file.textures.clone(),
                elements: file.elements.clone(),
                ambient_occlusion: file.ambient_occlusion,
                steps: 1,
            },
        };

        let flat = Rc::new(flat);
        self.cache
            .borrow_mut()
            .insert(location.to_string(), Rc::clone(&flat));
        Ok(flat)
    }
}

/// Parent location, ignoring `builtin/` pseudo-models.
fn parent_of(file: &ModelFile) -> Option<String> {
    file.parent
        .as_deref()
        .filter(|parent| !parent.trim_start_matches("minecraft:").starts_with("builtin/"))
        .map(model_location)
}

/// Overlay a child file on its flattened parent.
fn merge(parent: &Flattened, child: &ModelFile) -> Flattened {
    let mut textures = parent.textures.clone();
    textures.extend(child.textures.iter().map(|(k, v)| (k.clone(), v.clone())));

    Flattened {
        textures,
        elements: child.elements.clone().or_else(|| parent.elements.clone()),
        ambient_occlusion: child.ambient_occlusion.or(parent.ambient_occlusion),
        steps: parent.steps + 1,
    }
}

/// Follow `#var` links to a literal path.
///
/// Returns `None` for a dangling or cyclic reference.
pub fn resolve_reference(reference: &str, textures: &BTreeMap<String, String>) -> Option<String> {
    let mut current = reference;
    for _ in 0..=MAX_INHERITANCE_DEPTH {
        match current.strip_prefix('#') {
            Some(key) => current = textures.get(key).map(String::as_str)?,
            None => return Some(current.to_string()),
        }
    }
    None
}

fn decode_element(
    location: &str,
    element: &ModelElement,
    textures: &BTreeMap<String, String>,
) -> Result<BlockElement> {
    let faces = element
        .faces
        .iter()
        .map(|(direction, face)| {
            let texture = resolve_reference(&face.texture, textures).ok_or_else(|| {
                MesherError::UnresolvedTexture(format!("{location}: {} on {direction} face", face.texture))
            })?;
            Ok((
                *direction,
                ElementFace {
                    texture,
                    uv: face
                        .uv
                        .unwrap_or_else(|| default_face_uv(element.from, element.to, *direction)),
                    cullface: face.cullface,
                    rotation: face.rotation,
                    tinted: face.has_tint(),
                },
            ))
        })
        .collect::<Result<BTreeMap<_, _>>>()?;

    Ok(BlockElement {
        from: element.from,
        to: element.to,
        rotation: element.rotation,
        shade: element.shade,
        faces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn model(json: &str) -> ModelFile {
        serde_json::from_str(json).unwrap()
    }

    fn create_test_pack() -> ResourcePack {
        let mut pack = ResourcePack::new();
        pack.add_model(
            "minecraft",
            "block/cube",
            model(
                r##"{ "elements": [ { "from": [0, 0, 0], "to": [16, 16, 16], "faces": {
                    "down":  { "texture": "#down", "cullface": "down" },
                    "up":    { "texture": "#up", "cullface": "up" },
                    "north": { "texture": "#north", "cullface": "north" },
                    "south": { "texture": "#south", "cullface": "south" },
                    "west":  { "texture": "#west", "cullface": "west" },
                    "east":  { "texture": "#east", "cullface": "east" }
                } } ] }"##,
            ),
        );
        pack.add_model(
            "minecraft",
            "block/cube_all",
            model(
                r##"{ "parent": "block/cube", "textures": {
                    "particle": "#all", "down": "#all", "up": "#all",
                    "north": "#all", "south": "#all", "west": "#all", "east": "#all"
                } }"##,
            ),
        );
        pack.add_model(
            "minecraft",
            "block/stone",
            model(r#"{ "parent": "block/cube_all", "textures": { "all": "block/stone" } }"#),
        );
        pack
    }

    #[test]
    fn test_resolve_with_inheritance() {
        let pack = create_test_pack();
        let resolver = ModelResolver::new(&pack);

        let model = resolver.resolve("minecraft:block/stone").unwrap();
        assert_eq!(model.steps, 3);
        assert!(model.ambient_occlusion);
        assert_eq!(model.elements.len(), 1);
        assert_eq!(model.textures["particle"], "block/stone");
        assert!(model.textures.values().all(|v| !v.starts_with('#')));

        let element = &model.elements[0];
        assert_eq!(element.faces.len(), 6);
        for face in element.faces.values() {
            assert_eq!(face.texture, "block/stone");
        }
        assert_eq!(element.faces[&Direction::Up].uv, [0.0, 0.0, 16.0, 16.0]);
    }

    #[test]
    fn test_abstract_parent_fails_unresolved() {
        let pack = create_test_pack();
        let resolver = ModelResolver::new(&pack);

        let err = resolver.resolve("block/cube_all").unwrap_err();
        assert!(matches!(err, MesherError::UnresolvedTexture(_)));
    }

    #[test]
    fn test_child_elements_and_flags_override() {
        let mut pack = create_test_pack();
        pack.add_model(
            "minecraft",
            "block/slab",
            model(
                r#"{ "parent": "block/stone", "ambientocclusion": false, "elements": [
                    { "from": [0, 0, 0], "to": [16, 8, 16], "shade": false, "faces": {
                        "up": { "texture": "block/smooth", "tintindex": 1 }
                    } }
                ] }"#,
            ),
        );
        let resolver = ModelResolver::new(&pack);

        let model = resolver.resolve("minecraft:block/slab").unwrap();
        assert_eq!(model.steps, 4);
        assert!(!model.ambient_occlusion);
        assert_eq!(model.elements.len(), 1);
        let element = &model.elements[0];
        assert!(!element.shade);
        let up = &element.faces[&Direction::Up];
        assert_eq!(up.texture, "block/smooth");
        assert!(up.tinted);
    }

    #[test]
    fn test_missing_model_and_parent() {
        let mut pack = create_test_pack();
        pack.add_model("minecraft", "block/orphan", model(r#"{ "parent": "block/nowhere" }"#));
        let resolver = ModelResolver::new(&pack);

        assert!(matches!(
            resolver.resolve("minecraft:block/nonexistent"),
            Err(MesherError::ResourceNotFound(_))
        ));
        assert!(matches!(
            resolver.resolve("minecraft:block/orphan"),
            Err(MesherError::ResourceNotFound(_))
        ));
    }

    #[test]
    fn test_cycle_is_too_deep() {
        let mut pack = ResourcePack::new();
        pack.add_model("minecraft", "block/a", model(r#"{ "parent": "block/b" }"#));
        pack.add_model("minecraft", "block/b", model(r#"{ "parent": "block/a" }"#));
        let resolver = ModelResolver::new(&pack);

        assert!(matches!(
            resolver.resolve("block/a"),
            Err(MesherError::ModelInheritanceTooDeep(_))
        ));
    }

    #[test]
    fn test_builtin_parent_is_a_root() {
        let mut pack = ResourcePack::new();
        pack.add_model(
            "minecraft",
            "block/flat",
            model(r#"{ "parent": "builtin/generated", "textures": { "layer0": "block/x" } }"#),
        );
        let resolver = ModelResolver::new(&pack);
        let model = resolver.resolve("block/flat").unwrap();
        assert_eq!(model.steps, 1);
        assert!(model.elements.is_empty());
    }

    #[test]
    fn test_resolve_reference() {
        let textures: BTreeMap<String, String> = [
            ("a".to_string(), "#b".to_string()),
            ("b".to_string(), "block/stone".to_string()),
            ("loop".to_string(), "#loop".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(resolve_reference("#a", &textures).as_deref(), Some("block/stone"));
        assert_eq!(resolve_reference("block/dirt", &textures).as_deref(), Some("block/dirt"));
        assert_eq!(resolve_reference("#missing", &textures), None);
        assert_eq!(resolve_reference("#loop", &textures), None);
    }
}
