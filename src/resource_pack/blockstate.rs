//! Blockstate definition parsing.
//!
//! There are two formats: `variants`, keyed by state, and `multipart`, a
//! list of cases each applied when its condition matches the state. A file
//! declaring both is read as `variants`.

use super::model::model_location;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A blockstate definition from `blockstates/*.json`.
#[derive(Debug, Clone, PartialEq)]
pub enum Blockstate {
    /// Variants sorted by key.
    Variants(Vec<BlockVariant>),
    /// Cases in file order.
    Multipart(Vec<MultipartCase>),
}

impl<'de> Deserialize<'de> for Blockstate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawBlockstate {
            #[serde(default)]
            variants: Option<BTreeMap<String, VariantValue>>,
            #[serde(default)]
            multipart: Option<Vec<RawCase>>,
        }

        #[derive(Deserialize)]
        struct RawCase {
            #[serde(default)]
            when: Option<MultipartCondition>,
            apply: VariantValue,
        }

        let raw = RawBlockstate::deserialize(deserializer)?;

        match (raw.variants, raw.multipart) {
            (Some(variants), _) => Ok(Blockstate::Variants(
                variants
                    .into_iter()
                    .map(|(name, value)| BlockVariant::new(name, value.into_vec()))
                    .collect(),
            )),
            (None, Some(cases)) => Ok(Blockstate::Multipart(
                cases
                    .into_iter()
                    .map(|case| MultipartCase {
                        when: case.when,
                        apply: case.apply.into_vec(),
                    })
                    .collect(),
            )),
            (None, None) => Ok(Blockstate::Variants(Vec::new())),
        }
    }
}

impl Blockstate {
    pub fn variants(&self) -> &[BlockVariant] {
        match self {
            Blockstate::Variants(variants) => variants,
            Blockstate::Multipart(_) => &[],
        }
    }

    pub fn cases(&self) -> &[MultipartCase] {
        match self {
            Blockstate::Variants(_) => &[],
            Blockstate::Multipart(cases) => cases,
        }
    }

    /// Every model reference, in either format.
    pub fn model_references(&self) -> impl Iterator<Item = &VariantModel> {
        self.variants()
            .iter()
            .flat_map(|variant| variant.models.iter())
            .chain(self.cases().iter().flat_map(|case| case.apply.iter()))
    }

    /// Find a variant by its raw key, falling back to comparing parsed
    /// state maps so property order does not matter.
    pub fn variant(&self, key: &str) -> Option<&BlockVariant> {
        let variants = self.variants();
        variants.iter().find(|v| v.name == key).or_else(|| {
            let states = parse_state_key(key);
            variants.iter().find(|v| v.states == states)
        })
    }
}

/// A variant value can be a single model or an array of weighted models.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum VariantValue {
    Single(VariantModel),
    Multiple(Vec<VariantModel>),
}

impl VariantValue {
    fn into_vec(self) -> Vec<VariantModel> {
        match self {
            VariantValue::Single(v) => vec![v],
            VariantValue::Multiple(v) => v,
        }
    }
}

/// One keyed entry of a blockstate's `variants` map.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockVariant {
    /// The raw key, e.g. `facing=north,half=top`.
    pub name: String,
    pub states: BTreeMap<String, String>,
    pub models: Vec<VariantModel>,
}

impl BlockVariant {
    pub fn new(name: impl Into<String>, models: Vec<VariantModel>) -> Self {
        let name = name.into();
        let states = parse_state_key(&name);
        Self {
            name,
            states,
            models,
        }
    }
}

/// One entry of a blockstate's `multipart` list.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartCase {
    /// Applies unconditionally when absent.
    pub when: Option<MultipartCondition>,
    /// Weighted alternatives; one is drawn.
    pub apply: Vec<VariantModel>,
}

impl MultipartCase {
    pub fn applies(&self, states: &BTreeMap<String, String>) -> bool {
        self.when.as_ref().map_or(true, |when| when.matches(states))
    }
}

/// Condition of a multipart case.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MultipartCondition {
    /// Any of the clauses matches.
    Or {
        #[serde(rename = "OR")]
        or: Vec<BTreeMap<String, String>>,
    },
    /// All of the clauses match.
    And {
        #[serde(rename = "AND")]
        and: Vec<BTreeMap<String, String>>,
    },
    /// Every listed property matches.
    Simple(BTreeMap<String, String>),
}

impl MultipartCondition {
    pub fn matches(&self, states: &BTreeMap<String, String>) -> bool {
        match self {
            MultipartCondition::Or { or } => or.iter().any(|clause| clause_matches(clause, states)),
            MultipartCondition::And { and } => and.iter().all(|clause| clause_matches(clause, states)),
            MultipartCondition::Simple(clause) => clause_matches(clause, states),
        }
    }
}

/// `a|b` accepts either value. A property the state leaves out takes its
/// default, so `false` or `none` match it.
fn clause_matches(clause: &BTreeMap<String, String>, states: &BTreeMap<String, String>) -> bool {
    clause.iter().all(|(name, expected)| {
        let mut allowed = expected.split('|');
        match states.get(name) {
            Some(value) => allowed.any(|a| a == value),
            None => allowed.any(is_default_value),
        }
    })
}

fn is_default_value(value: &str) -> bool {
    matches!(value, "false" | "none" | "0" | "normal" | "bottom" | "floor")
}

/// Parse a variant key into its state map.
///
/// Pairs are split on `,` and then on `=`. A bare flag maps to the empty
/// string, and the empty key gives the empty map.
pub fn parse_state_key(key: &str) -> BTreeMap<String, String> {
    key.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((name, value)) => (name.trim().to_string(), value.trim().to_string()),
            None => (part.to_string(), String::new()),
        })
        .collect()
}

/// A model reference with its block rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantModel {
    /// Model path as written (e.g., "block/stone" or "stone").
    pub model: String,
    /// X rotation in degrees (0, 90, 180, 270).
    #[serde(default)]
    pub x: i32,
    /// Y rotation in degrees (0, 90, 180, 270).
    #[serde(default)]
    pub y: i32,
    /// If true, UV coordinates don't rotate with the block.
    #[serde(default)]
    pub uvlock: bool,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

impl VariantModel {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            x: 0,
            y: 0,
            uvlock: false,
            weight: 1,
        }
    }

    /// Full resource location of the referenced model.
    pub fn model_location(&self) -> String {
        model_location(&self.model)
    }
}
