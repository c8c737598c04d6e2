//! Multipart case selection for a requested state key.
//!
//! Each case whose condition holds for the state contributes one part, and
//! the block is drawn as all of its parts together.

use crate::resource_pack::{parse_state_key, MultipartCase};

/// The cases applying to `key`, in file order.
pub fn select_cases<'a>(cases: &'a [MultipartCase], key: &str) -> impl Iterator<Item = &'a MultipartCase> {
    let states = parse_state_key(key);
    cases.iter().filter(move |case| case.applies(&states))
}
