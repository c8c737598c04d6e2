//! Variant selection for a requested state key.
//!
//! Block configs name variants by key (`facing=east,half=top`). Keys that do
//! not match any variant exactly fall back to the closest variant: every
//! requested property must agree, and properties the key leaves out are
//! filled with their most default-looking value.

use crate::resource_pack::{parse_state_key, BlockVariant, Blockstate};
use std::collections::BTreeMap;

/// Pick the variant of `blockstate` best matching `key`.
pub fn select_variant<'a>(blockstate: &'a Blockstate, key: &str) -> Option<&'a BlockVariant> {
    if let Some(exact) = blockstate.variant(key) {
        return Some(exact);
    }

    let requested = parse_state_key(key);
    let variants = blockstate.variants();

    variants
        .iter()
        .filter(|variant| agrees(&variant.states, &requested))
        .max_by_key(|variant| default_score(&variant.states, &requested))
        .or_else(|| {
            variants
                .iter()
                .max_by_key(|variant| default_score(&variant.states, &BTreeMap::new()))
        })
}

/// Whether no requested property contradicts the variant.
fn agrees(states: &BTreeMap<String, String>, requested: &BTreeMap<String, String>) -> bool {
    states
        .iter()
        .all(|(name, value)| requested.get(name).map_or(true, |wanted| wanted == value))
}

/// How default-like the variant's unrequested properties are.
fn default_score(states: &BTreeMap<String, String>, requested: &BTreeMap<String, String>) -> i32 {
    if states.is_empty() {
        return i32::MAX;
    }
    states
        .iter()
        .filter(|(name, _)| !requested.contains_key(*name))
        .map(|(name, value)| value_default_score(name, value))
        .sum()
}

fn value_default_score(property: &str, value: &str) -> i32 {
    // Lower numbers are more default (power=0 over power=15).
    if let Ok(num) = value.parse::<i32>() {
        return -num * 10;
    }

    match (property, value) {
        ("axis", "y") => 50,
        ("half", "bottom" | "lower") | ("type", "single" | "normal" | "bottom") => 50,
        ("half", "top" | "upper") | ("type", "double" | "top") => -50,
        ("facing", "north") => 50,
        ("facing", "south") => 40,
        ("facing", "east") => 30,
        ("facing", "west") => 20,
        ("shape", "straight") => 50,
        ("north" | "south" | "east" | "west", "none" | "false") => 50,
        ("north" | "south" | "east" | "west", "true") => -50,
        (_, "false" | "off" | "none") => 100,
        (_, "true" | "on") => -100,
        _ => 0,
    }
}
