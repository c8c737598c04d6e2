//! Immutable texture rectangles and the slicing helpers emitters use.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of an atlas image. Geometry is bucketed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct AtlasId(pub u32);

/// Texture pack generation.
///
/// Only `V1_4` packs ship one shared `terrain.png`. Everything later stores
/// each texture as its own image, which changes what a texel means for
/// slicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum PackVersion {
    #[serde(rename = "1.4")]
    V1_4,
    #[serde(rename = "1.5")]
    V1_5,
    #[serde(rename = "1.6")]
    V1_6,
    #[serde(rename = "1.RV")]
    V1_RV,
    #[serde(rename = "1.9")]
    V1_9,
    #[serde(rename = "1.12")]
    V1_12,
    #[serde(rename = "1.13")]
    V1_13,
    #[serde(rename = "1.14")]
    V1_14,
    #[default]
    #[serde(rename = "1.15")]
    V1_15,
}

impl PackVersion {
    pub const ALL: [PackVersion; 9] = [
        PackVersion::V1_4,
        PackVersion::V1_5,
        PackVersion::V1_6,
        PackVersion::V1_RV,
        PackVersion::V1_9,
        PackVersion::V1_12,
        PackVersion::V1_13,
        PackVersion::V1_14,
        PackVersion::V1_15,
    ];

    /// True when regions are tiles of a 16x16 terrain atlas.
    pub fn is_atlas_texel(&self) -> bool {
        *self == PackVersion::V1_4
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PackVersion::V1_4 => "1.4",
            PackVersion::V1_5 => "1.5",
            PackVersion::V1_6 => "1.6",
            PackVersion::V1_RV => "1.RV",
            PackVersion::V1_9 => "1.9",
            PackVersion::V1_12 => "1.12",
            PackVersion::V1_13 => "1.13",
            PackVersion::V1_14 => "1.14",
            PackVersion::V1_15 => "1.15",
        }
    }
}

impl fmt::Display for PackVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // 1.6 to 1.8 and 1.9 to 1.11 share a layout.
        let version = match s {
            "1.7" | "1.8" => PackVersion::V1_6,
            "1.10" | "1.11" => PackVersion::V1_9,
            _ => PackVersion::ALL
                .into_iter()
                .find(|v| v.as_str().eq_ignore_ascii_case(s))
                .ok_or_else(|| format!("unknown texture pack version '{s}'"))?,
        };
        Ok(version)
    }
}

/// Which frame of a vertical animation strip to sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameSelection {
    #[default]
    First,
    /// Zero-based frame, clamped to the last frame.
    Fixed(u32),
}

impl FrameSelection {
    pub fn frame(&self, frame_count: u32) -> u32 {
        match self {
            FrameSelection::First => 0,
            FrameSelection::Fixed(n) => (*n).min(frame_count.saturating_sub(1)),
        }
    }
}

/// Rectangle of an atlas, in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureRegion {
    pub atlas: AtlasId,
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
    pub version: PackVersion,
}

/// Tiles per row and column of a legacy terrain atlas.
const TILES: f32 = 16.0;

impl TextureRegion {
    pub fn new(atlas: AtlasId, u0: f32, v0: f32, u1: f32, v1: f32, version: PackVersion) -> Self {
        Self { atlas, u0, v0, u1, v1, version }
    }

    /// The whole of an atlas image.
    pub fn full(atlas: AtlasId, version: PackVersion) -> Self {
        Self::new(atlas, 0.0, 0.0, 1.0, 1.0, version)
    }

    pub fn width(&self) -> f32 {
        self.u1 - self.u0
    }

    pub fn height(&self) -> f32 {
        self.v1 - self.v0
    }

    /// Horizontal texel size.
    ///
    /// A 1.4 atlas is 16 tiles of 16 texels, so a texel is 1/256 of the
    /// atlas. Later packs slice within the texture's own span.
    pub fn texel_u(&self) -> f32 {
        if self.version.is_atlas_texel() {
            1.0 / (TILES * 16.0)
        } else {
            self.width() / 16.0
        }
    }

    pub fn texel_v(&self) -> f32 {
        if self.version.is_atlas_texel() {
            1.0 / (TILES * 16.0)
        } else {
            self.height() / 16.0
        }
    }

    /// Sub-rectangle given as fractions of this region.
    ///
    /// Fractions are clamped to `0..=1`, so the result always lies inside
    /// `self`.
    pub fn sub_region(&self, u0: f32, v0: f32, u1: f32, v1: f32) -> Self {
        let lerp_u = |t: f32| self.u0 + self.width() * t.clamp(0.0, 1.0);
        let lerp_v = |t: f32| self.v0 + self.height() * t.clamp(0.0, 1.0);
        Self {
            u0: lerp_u(u0),
            v0: lerp_v(v0),
            u1: lerp_u(u1),
            v1: lerp_v(v1),
            ..*self
        }
    }

    /// Shrink each edge inward by a number of texels.
    pub fn inset_texels(&self, left: f32, top: f32, right: f32, bottom: f32) -> Self {
        let (tu, tv) = (self.texel_u(), self.texel_v());
        self.clamped(
            self.u0 + tu * left,
            self.v0 + tv * top,
            self.u1 - tu * right,
            self.v1 - tv * bottom,
        )
    }

    /// Sub-rectangle spanning texel columns `x0..x1` and rows `y0..y1`.
    pub fn texel_rect(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        let (tu, tv) = (self.texel_u(), self.texel_v());
        self.clamped(
            self.u0 + tu * x0,
            self.v0 + tv * y0,
            self.u0 + tu * x1,
            self.v0 + tv * y1,
        )
    }

    /// Move the top edge down by `n` texels.
    pub fn offset_v_texels(&self, n: f32) -> Self {
        self.clamped(self.u0, self.v0 + self.texel_v() * n, self.u1, self.v1)
    }

    /// Top (`upper`) or bottom half of a tile.
    pub fn half_v(&self, upper: bool) -> Self {
        let half = if self.version.is_atlas_texel() {
            1.0 / (TILES * 2.0)
        } else {
            self.height() / 2.0
        };
        let offset = if upper { 0.0 } else { half };
        self.clamped(self.u0, self.v0 + offset, self.u1, self.v0 + offset + half)
    }

    /// One tile of a 16x16 grid laid over this region.
    ///
    /// Edges are pulled in by 1/64 of a tile so filtering never bleeds into
    /// the neighbouring tile.
    pub fn tile(&self, tx: u32, ty: u32) -> Self {
        let tile_u = self.width() / TILES;
        let tile_v = self.height() / TILES;
        let nudge_u = tile_u / 64.0;
        let nudge_v = tile_v / 64.0;
        let (tx, ty) = (tx.min(15) as f32, ty.min(15) as f32);
        Self {
            u0: self.u0 + tile_u * tx + nudge_u,
            v0: self.v0 + tile_v * ty + nudge_v,
            u1: self.u0 + tile_u * (tx + 1.0) - nudge_u,
            v1: self.v0 + tile_v * (ty + 1.0) - nudge_v,
            ..*self
        }
    }

    /// One frame of a vertical animation strip `frame_count` frames tall.
    pub fn select_frame(&self, frame_count: u32, selection: FrameSelection) -> Self {
        if frame_count <= 1 {
            return *self;
        }
        let frame = selection.frame(frame_count) as f32;
        let step = self.height() / frame_count as f32;
        Self {
            v0: self.v0 + step * frame,
            v1: self.v0 + step * (frame + 1.0),
            ..*self
        }
    }

    /// Whether `other` lies inside this region (with float tolerance).
    pub fn contains(&self, other: &TextureRegion) -> bool {
        const EPS: f32 = 1e-6;
        let (lo_u, hi_u) = (self.u0.min(self.u1), self.u0.max(self.u1));
        let (lo_v, hi_v) = (self.v0.min(self.v1), self.v0.max(self.v1));
        [other.u0, other.u1].iter().all(|u| *u >= lo_u - EPS && *u <= hi_u + EPS)
            && [other.v0, other.v1].iter().all(|v| *v >= lo_v - EPS && *v <= hi_v + EPS)
    }

    fn clamped(&self, u0: f32, v0: f32, u1: f32, v1: f32) -> Self {
        let (lo_u, hi_u) = (self.u0.min(self.u1), self.u0.max(self.u1));
        let (lo_v, hi_v) = (self.v0.min(self.v1), self.v0.max(self.v1));
        Self {
            u0: u0.clamp(lo_u, hi_u),
            v0: v0.clamp(lo_v, hi_v),
            u1: u1.clamp(lo_u, hi_u),
            v1: v1.clamp(lo_v, hi_v),
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_version_parsing() {
        assert_eq!("1.4".parse::<PackVersion>().unwrap(), PackVersion::V1_4);
        assert_eq!("1.8".parse::<PackVersion>().unwrap(), PackVersion::V1_6);
        assert_eq!("1.rv".parse::<PackVersion>().unwrap(), PackVersion::V1_RV);
        assert_eq!("1.11".parse::<PackVersion>().unwrap(), PackVersion::V1_9);
        assert!("2.0".parse::<PackVersion>().is_err());
        assert_eq!(PackVersion::V1_RV.to_string(), "1.RV");
    }

    #[test]
    fn test_versions_compare_by_value() {
        let parsed: PackVersion = String::from("1.4").parse().unwrap();
        assert!(parsed.is_atlas_texel());
        assert!(PackVersion::V1_4 < PackVersion::V1_15);
    }

    #[test]
    fn test_tile_coordinates() {
        let atlas = TextureRegion::full(AtlasId(0), PackVersion::V1_4);
        let stone = atlas.tile(1, 0);
        let nudge = 1.0 / 16.0 / 64.0;
        assert!(approx(stone.u0, 1.0 / 16.0 + nudge));
        assert!(approx(stone.u1, 2.0 / 16.0 - nudge));
        assert!(approx(stone.v0, nudge));
        assert!(approx(stone.v1, 1.0 / 16.0 - nudge));
    }

    #[test]
    fn test_atlas_texel_is_fixed() {
        let tile = TextureRegion::full(AtlasId(0), PackVersion::V1_4).tile(3, 3);
        assert!(approx(tile.texel_u(), 1.0 / 256.0));

        let modern = TextureRegion::new(AtlasId(0), 0.5, 0.0, 0.75, 0.25, PackVersion::V1_9);
        assert!(approx(modern.texel_u(), 0.25 / 16.0));
    }

    #[test]
    fn test_half_v() {
        let modern = TextureRegion::new(AtlasId(1), 0.0, 0.0, 1.0, 1.0, PackVersion::V1_9);
        let lower = modern.half_v(false);
        assert!(approx(lower.v0, 0.5));
        assert!(approx(lower.v1, 1.0));

        let legacy = TextureRegion::full(AtlasId(0), PackVersion::V1_4).tile(0, 0);
        let upper = legacy.half_v(true);
        assert!(approx(upper.v1 - upper.v0, 1.0 / 32.0));
    }

    #[test]
    fn test_select_frame() {
        let strip = TextureRegion::new(AtlasId(0), 0.0, 0.0, 0.5, 1.0, PackVersion::V1_9);
        let second = strip.select_frame(4, FrameSelection::Fixed(1));
        assert!(approx(second.v0, 0.25));
        assert!(approx(second.v1, 0.5));
        assert_eq!(strip.select_frame(4, FrameSelection::First).v0, 0.0);
        let clamped = strip.select_frame(4, FrameSelection::Fixed(99));
        assert!(approx(clamped.v0, 0.75));
    }

    #[test]
    fn test_inset_stays_inside() {
        let region = TextureRegion::new(AtlasId(0), 0.1, 0.1, 0.2, 0.2, PackVersion::V1_12);
        let inset = region.inset_texels(4.0, 4.0, 4.0, 4.0);
        assert!(region.contains(&inset));
        let overshoot = region.inset_texels(20.0, 0.0, 0.0, 0.0);
        assert!(region.contains(&overshoot));
    }
}
