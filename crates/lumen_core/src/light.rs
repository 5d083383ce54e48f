//! Light source descriptions.
//!
//! Variants are data only; position sampling and shadow checks live in the
//! renderer, which has access to the world geometry the object lights
//! reference. Object lights (`Mesh`, `Sphere`) point at a scene object that
//! carries an emissive radiance attachment.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A light source in the scene.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Light {
    /// Point light with inverse-square falloff
    Point { position: Vec3, intensity: Vec3 },

    /// Directional light: constant radiance, no position, shadow rays cast
    /// opposite to `direction`
    Directional { direction: Vec3, radiance: Vec3 },

    /// Parallelogram area light spanned by two edge vectors, with cosine
    /// falloff across its surface normal and inverse-square falloff
    Area {
        position: Vec3,
        intensity: Vec3,
        edge_u: Vec3,
        edge_v: Vec3,
    },

    /// Emissive mesh object; positions sampled over its triangles
    Mesh { object: usize, radiance: Vec3 },

    /// Emissive sphere object; positions sampled over its surface
    Sphere { object: usize, intensity: Vec3 },
}

impl Light {
    /// Index of the emissive scene object backing this light, if any.
    /// Used to keep a light's own geometry from occluding itself.
    pub fn emitter(&self) -> Option<usize> {
        match self {
            Light::Mesh { object, .. } | Light::Sphere { object, .. } => Some(*object),
            _ => None,
        }
    }
}
