//! Rotations applied to whole blocks and to single model elements.

use super::Axis;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Whole-block rotation taken from a blockstate variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockTransform {
    /// X rotation in degrees (0, 90, 180, 270).
    pub x: i32,
    /// Y rotation in degrees (0, 90, 180, 270).
    pub y: i32,
    /// Keep face textures aligned to the world instead of the block.
    pub uvlock: bool,
}

impl BlockTransform {
    pub fn new(x: i32, y: i32, uvlock: bool) -> Self {
        Self { x, y, uvlock }
    }

    pub fn is_identity(&self) -> bool {
        self.x.rem_euclid(360) == 0 && self.y.rem_euclid(360) == 0
    }

    /// Matrix rotating block-local unit-cube space about the block centre.
    ///
    /// X is applied first, then Y. Angles are clockwise when looking down
    /// the positive axis, so `y = 90` turns north-facing geometry east.
    pub fn matrix(&self) -> Mat4 {
        let centre = Vec3::splat(0.5);
        let rot_x = Mat4::from_rotation_x(-(self.x as f32).to_radians());
        let rot_y = Mat4::from_rotation_y(-(self.y as f32).to_radians());
        Mat4::from_translation(centre) * rot_y * rot_x * Mat4::from_translation(-centre)
    }
}

/// Single-axis rotation of a model element.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ElementRotation {
    /// Pivot in model units (0 to 16).
    #[serde(default = "default_origin")]
    pub origin: [f32; 3],
    pub axis: Axis,
    /// Degrees, usually one of -45, -22.5, 0, 22.5, 45.
    pub angle: f32,
    /// Stretch the rotated element back across the full block.
    #[serde(default)]
    pub rescale: bool,
}

fn default_origin() -> [f32; 3] {
    [8.0, 8.0, 8.0]
}

impl ElementRotation {
    /// Matrix in unit-cube space (model units divided by 16).
    pub fn matrix(&self) -> Mat4 {
        let origin = Vec3::from(self.origin) / 16.0;
        let radians = self.angle.to_radians();
        let rotation = match self.axis {
            Axis::X => Mat4::from_rotation_x(radians),
            Axis::Y => Mat4::from_rotation_y(radians),
            Axis::Z => Mat4::from_rotation_z(radians),
        };

        let scale = if self.rescale {
            let factor = 1.0 / radians.cos();
            match self.axis {
                Axis::X => Vec3::new(1.0, factor, factor),
                Axis::Y => Vec3::new(factor, 1.0, factor),
                Axis::Z => Vec3::new(factor, factor, 1.0),
            }
        } else {
            Vec3::ONE
        };

        Mat4::from_translation(origin)
            * Mat4::from_scale(scale)
            * rotation
            * Mat4::from_translation(-origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn test_block_transform_turns_north_to_east() {
        let t = BlockTransform::new(0, 90, false);
        // Centre of the north face ends up at the centre of the east face.
        let p = t.matrix().transform_point3(Vec3::new(0.5, 0.5, 0.0));
        assert!(close(p, Vec3::new(1.0, 0.5, 0.5)), "{p:?}");
    }

    #[test]
    fn test_identity_transform() {
        assert!(BlockTransform::new(0, 360, true).is_identity());
        assert!(!BlockTransform::new(90, 0, false).is_identity());
        let p = Vec3::new(0.25, 0.75, 0.1);
        assert!(close(BlockTransform::default().matrix().transform_point3(p), p));
    }

    #[test]
    fn test_element_rotation_keeps_origin_fixed() {
        let rotation = ElementRotation {
            origin: [8.0, 0.0, 8.0],
            axis: Axis::Y,
            angle: 45.0,
            rescale: true,
        };
        let pivot = Vec3::new(0.5, 0.0, 0.5);
        assert!(close(rotation.matrix().transform_point3(pivot), pivot));
    }
}
