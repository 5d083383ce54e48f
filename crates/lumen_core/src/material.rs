//! Surface material definition.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Reflectance properties of a surface. Immutable after scene load.
///
/// When `brdf` is set, the referenced BRDF replaces the built-in
/// diffuse + Blinn-Phong direct-lighting terms.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Material {
    /// Ambient reflectance (multiplied with the scene ambient light)
    pub ambient: Vec3,

    /// Diffuse reflectance
    pub diffuse: Vec3,

    /// Specular reflectance
    pub specular: Vec3,

    /// Mirror reflectance; non-zero enables recursive reflection
    pub mirror: Vec3,

    /// Transparency tint; non-zero enables recursive refraction
    pub transparency: Vec3,

    /// Index of refraction for the dielectric branch
    pub refraction_index: f32,

    /// Roughness of the mirror reflection (0 = perfect mirror)
    pub roughness: f32,

    /// Blinn-Phong specular exponent
    pub phong_exponent: f32,

    /// Optional BRDF index into the scene's BRDF table
    pub brdf: Option<usize>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vec3::ZERO,
            diffuse: Vec3::splat(0.5),
            specular: Vec3::ZERO,
            mirror: Vec3::ZERO,
            transparency: Vec3::ZERO,
            refraction_index: 1.0,
            roughness: 0.0,
            phong_exponent: 1.0,
            brdf: None,
        }
    }
}

impl Material {
    /// Create a plain diffuse material.
    pub fn diffuse(color: Vec3) -> Self {
        Self {
            diffuse: color,
            ..Default::default()
        }
    }

    /// Whether the mirror branch contributes.
    pub fn is_reflective(&self) -> bool {
        self.mirror != Vec3::ZERO
    }

    /// Whether the refraction branch contributes.
    pub fn is_transparent(&self) -> bool {
        self.transparency != Vec3::ZERO
    }
}
