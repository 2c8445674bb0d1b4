//! Axis conversion between the source engine's convention (Y up)
//! and the target editor's convention (Z up).
//!
//! All three mappings are signed permutations of the input axes. No
//! validation happens here: NaN and infinities pass straight through.

use glam::DVec3;
use serde::Serialize;

/// Position, Euler rotation (radians, XYZ order) and scale of one object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub position: DVec3,
    pub rotation: DVec3,
    pub scale: DVec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: DVec3::ZERO,
        rotation: DVec3::ZERO,
        scale: DVec3::ONE,
    };

    /// Convert raw source-space triples into a target-space transform.
    pub fn from_source(position: [f64; 3], rotation: [f64; 3], scale: [f64; 3]) -> Self {
        Self {
            position: position_transform(DVec3::from_array(position)),
            rotation: rotation_transform(DVec3::from_array(rotation)),
            scale: scale_transform(DVec3::from_array(scale)),
        }
    }

    /// Uniformly rescale the translation, leaving rotation and scale intact.
    pub fn with_position_scale(mut self, factor: f64) -> Self {
        self.position *= factor;
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

pub fn position_transform(p: DVec3) -> DVec3 {
    DVec3::new(-p.x, -p.z, p.y)
}

pub fn rotation_transform(r: DVec3) -> DVec3 {
    DVec3::new(r.x, r.z, -r.y)
}

pub fn scale_transform(s: DVec3) -> DVec3 {
    DVec3::new(s.x, s.z, s.y)
}
