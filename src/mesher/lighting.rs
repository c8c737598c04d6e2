//! Lighting styles.
//!
//! A style turns the sky and block light levels stored with a block into the
//! brightness multiplier baked into vertex colours. Side faces are darkened
//! by a fixed amount so the three visible faces of an isometric cube read
//! differently.

use crate::types::LightFace;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest stored light level.
pub const MAX_LIGHT: u8 = 15;

/// How stored light levels become face brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightStyle {
    /// Mostly sky light with a bright floor.
    #[default]
    Day,
    /// Mostly block light; unlit areas are near black.
    Night,
    /// Brightness grows with height, plus block light.
    Cave,
    /// Fixed per-face shading, ignoring stored light.
    None,
}

impl LightStyle {
    /// Brightness of a face lit through a block with the given light levels.
    ///
    /// `levels` is `None` for positions outside the world.
    pub fn face_light(&self, levels: Option<(u8, u8)>, y: i32, height: i32, face: LightFace) -> f32 {
        let max = f32::from(MAX_LIGHT);
        let base = match (self, levels) {
            (LightStyle::None, _) => {
                return match face {
                    LightFace::Top => 1.0,
                    LightFace::NorthSouth => 0.85,
                    LightFace::EastWest => 0.7,
                };
            }
            (LightStyle::Day, None) => 1.0,
            (LightStyle::Night | LightStyle::Cave, None) => 0.1,
            (LightStyle::Day, Some((sky, block))) => {
                ((f32::from(sky) * 0.7 + f32::from(block) * 0.3) / max + 0.3).clamp(0.0, 1.0)
            }
            (LightStyle::Night, Some((sky, block))) => {
                (f32::from(sky) / max * 0.1 + f32::from(block) / max * 0.7 + 0.1).clamp(0.0, 1.0)
            }
            (LightStyle::Cave, Some((_, block))) => {
                let height_scale = (y as f32 / height.max(1) as f32) * 0.6 + 0.1;
                (height_scale + f32::from(block) / max * 0.5).clamp(0.0, 1.0)
            }
        };

        (base - self.side_darkening(face)).max(0.0)
    }

    fn side_darkening(&self, face: LightFace) -> f32 {
        match (self, face) {
            (_, LightFace::Top) | (LightStyle::None, _) => 0.0,
            (LightStyle::Day, LightFace::NorthSouth) => 0.15,
            (LightStyle::Day, LightFace::EastWest) => 0.30,
            (_, LightFace::NorthSouth) => 0.05,
            (_, LightFace::EastWest) => 0.1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LightStyle::Day => "day",
            LightStyle::Night => "night",
            LightStyle::Cave => "cave",
            LightStyle::None => "none",
        }
    }
}

impl fmt::Display for LightStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LightStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(LightStyle::Day),
            "night" => Ok(LightStyle::Night),
            "cave" => Ok(LightStyle::Cave),
            "none" => Ok(LightStyle::None),
            other => Err(format!("unknown light style '{other}'")),
        }
    }
}
