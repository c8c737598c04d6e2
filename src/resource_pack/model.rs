//! Block model files and the resolved models built from them.
//!
//! A [`ModelFile`] is one JSON document exactly as written. Parent chains
//! are flattened by the resolver into a [`BlockModel`], whose faces name
//! literal texture paths.

use crate::types::{Direction, ElementRotation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One parsed `models/*.json` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModelFile {
    /// Parent model to inherit from.
    #[serde(default)]
    pub parent: Option<String>,

    /// Literal flag when present; inherited otherwise.
    #[serde(default, rename = "ambientocclusion")]
    pub ambient_occlusion: Option<bool>,

    /// Texture variables. Values are paths or `#other` references.
    #[serde(default)]
    pub textures: BTreeMap<String, String>,

    /// Absent means "inherit from the parent".
    #[serde(default)]
    pub elements: Option<Vec<ModelElement>>,
}

impl ModelFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parent as a full resource location.
    pub fn parent_location(&self) -> Option<String> {
        self.parent.as_deref().map(model_location)
    }
}

/// Full resource location of a model path.
///
/// Legacy blockstates name models without a folder (`"stone"`), which
/// live under `block/`.
pub fn model_location(path: &str) -> String {
    let (namespace, path) = path.split_once(':').unwrap_or(("minecraft", path));
    if path.contains('/') {
        format!("{namespace}:{path}")
    } else {
        format!("{namespace}:block/{path}")
    }
}

/// A cuboid element within a model file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelElement {
    /// Minimum corner (0-16 range).
    pub from: [f32; 3],
    /// Maximum corner (0-16 range).
    pub to: [f32; 3],
    #[serde(default)]
    pub rotation: Option<ElementRotation>,
    /// Literal flag; faces are shaded unless this is `false`.
    #[serde(default = "default_shade")]
    pub shade: bool,
    #[serde(default)]
    pub faces: BTreeMap<Direction, ModelFace>,
}

fn default_shade() -> bool {
    true
}

/// A face of a model element.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelFace {
    /// UV rectangle [u0, v0, u1, v1] in 0-16 range.
    #[serde(default)]
    pub uv: Option<[f32; 4]>,
    /// Texture reference (e.g., "#side" or "block/stone").
    pub texture: String,
    #[serde(default)]
    pub cullface: Option<Direction>,
    /// UV rotation in degrees (0, 90, 180, 270).
    #[serde(default)]
    pub rotation: i32,
    /// Tint index for biome coloring (-1 = no tint).
    #[serde(default = "default_tint_index")]
    pub tintindex: i32,
}

fn default_tint_index() -> i32 {
    -1
}

impl ModelFace {
    pub fn has_tint(&self) -> bool {
        self.tintindex >= 0
    }
}

/// UV rectangle a face gets when the model does not give one: the element
/// projected onto that face, in 0-16 units.
pub fn default_face_uv(from: [f32; 3], to: [f32; 3], face: Direction) -> [f32; 4] {
    let [x0, y0, z0] = from;
    let [x1, y1, z1] = to;
    match face {
        Direction::Up => [x0, z0, x1, z1],
        Direction::Down => [x0, 16.0 - z1, x1, 16.0 - z0],
        Direction::North => [16.0 - x1, 16.0 - y1, 16.0 - x0, 16.0 - y0],
        Direction::South => [x0, 16.0 - y1, x1, 16.0 - y0],
        Direction::West => [z0, 16.0 - y1, z1, 16.0 - y0],
        Direction::East => [16.0 - z1, 16.0 - y1, 16.0 - z0, 16.0 - y0],
    }
}

/// A model with its parent chain flattened and textures resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockModel {
    pub location: String,
    /// Passed through to renderers; not computed here.
    pub ambient_occlusion: bool,
    pub elements: Vec<BlockElement>,
    /// Variable name to literal texture path.
    pub textures: BTreeMap<String, String>,
    /// Model files read to build this model.
    pub steps: usize,
}

/// A resolved cuboid element.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockElement {
    pub from: [f32; 3],
    pub to: [f32; 3],
    pub rotation: Option<ElementRotation>,
    pub shade: bool,
    pub faces: BTreeMap<Direction, ElementFace>,
}

/// A resolved element face.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementFace {
    /// Literal texture path.
    pub texture: String,
    /// UV rectangle in 0-16 units, explicit or derived from the element.
    pub uv: [f32; 4],
    pub cullface: Option<Direction>,
    pub rotation: i32,
    pub tinted: bool,
}
