//! BRDF variants.
//!
//! Each variant is a pure function of the material reflectances, the surface
//! normal and the incoming/outgoing directions. When a material references a
//! BRDF, its value replaces both the diffuse and specular direct terms; the
//! caller still multiplies by the cosine term and the incident radiance.

use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A reflectance model evaluated at a surface point.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Brdf {
    /// Classic Phong: kd + ks cos^p(alpha) / cos(theta_i)
    Phong { exponent: f32 },

    /// Phong without the cosine division
    ModifiedPhong { exponent: f32 },

    /// Energy-normalized modified Phong
    NormalizedModifiedPhong { exponent: f32 },

    /// Blinn-Phong with the half-vector lobe and cosine division
    BlinnPhong { exponent: f32 },

    /// Blinn-Phong without the cosine division
    ModifiedBlinnPhong { exponent: f32 },

    /// Energy-normalized modified Blinn-Phong
    NormalizedModifiedBlinnPhong { exponent: f32 },

    /// Torrance-Sparrow microfacet model with a Blinn distribution,
    /// Schlick Fresnel and the min-based geometry term
    TorranceSparrow { exponent: f32, refraction_index: f32 },
}

impl Brdf {
    /// Evaluate the BRDF.
    ///
    /// `wi` points toward the light, `wo` toward the viewer; both are unit
    /// vectors on the same side as `normal`. Returns zero when the light is
    /// at or below the horizon.
    pub fn eval(&self, diffuse: Vec3, specular: Vec3, normal: Vec3, wo: Vec3, wi: Vec3) -> Vec3 {
        let cos_i = normal.dot(wi);
        if cos_i <= 0.0 {
            return Vec3::ZERO;
        }

        match *self {
            Brdf::Phong { exponent } => {
                let lobe = reflection_lobe(normal, wo, wi).powf(exponent);
                diffuse + specular * (lobe / cos_i)
            }
            Brdf::ModifiedPhong { exponent } => {
                let lobe = reflection_lobe(normal, wo, wi).powf(exponent);
                diffuse + specular * lobe
            }
            Brdf::NormalizedModifiedPhong { exponent } => {
                let lobe = reflection_lobe(normal, wo, wi).powf(exponent);
                diffuse / PI + specular * ((exponent + 2.0) / (2.0 * PI) * lobe)
            }
            Brdf::BlinnPhong { exponent } => {
                let lobe = half_vector_lobe(normal, wo, wi).powf(exponent);
                diffuse + specular * (lobe / cos_i)
            }
            Brdf::ModifiedBlinnPhong { exponent } => {
                let lobe = half_vector_lobe(normal, wo, wi).powf(exponent);
                diffuse + specular * lobe
            }
            Brdf::NormalizedModifiedBlinnPhong { exponent } => {
                let lobe = half_vector_lobe(normal, wo, wi).powf(exponent);
                diffuse / PI + specular * ((exponent + 8.0) / (8.0 * PI) * lobe)
            }
            Brdf::TorranceSparrow {
                exponent,
                refraction_index,
            } => torrance_sparrow(diffuse, specular, normal, wo, wi, exponent, refraction_index),
        }
    }
}

/// Cosine of the angle between the view direction and the mirror
/// reflection of the light direction, clamped to zero.
fn reflection_lobe(normal: Vec3, wo: Vec3, wi: Vec3) -> f32 {
    let wr = 2.0 * normal.dot(wi) * normal - wi;
    wr.dot(wo).max(0.0)
}

/// Cosine of the angle between the half vector and the normal, clamped.
fn half_vector_lobe(normal: Vec3, wo: Vec3, wi: Vec3) -> f32 {
    let h = (wi + wo).normalize_or_zero();
    normal.dot(h).max(0.0)
}

fn torrance_sparrow(
    diffuse: Vec3,
    specular: Vec3,
    normal: Vec3,
    wo: Vec3,
    wi: Vec3,
    exponent: f32,
    refraction_index: f32,
) -> Vec3 {
    let cos_i = normal.dot(wi).max(0.0);
    let cos_o = normal.dot(wo).max(0.0);
    if cos_i <= 0.0 || cos_o <= 0.0 {
        return Vec3::ZERO;
    }

    let h = (wi + wo).normalize_or_zero();
    let cos_h = normal.dot(h).max(0.0);
    let wo_dot_h = wo.dot(h);
    if wo_dot_h <= 0.0 {
        return diffuse / PI;
    }

    // Blinn distribution
    let d = (exponent + 2.0) / (2.0 * PI) * cos_h.powf(exponent);

    // Schlick Fresnel at normal incidence for an air interface
    let r0 = ((refraction_index - 1.0) / (refraction_index + 1.0)).powi(2);
    let f = r0 + (1.0 - r0) * (1.0 - wo_dot_h).powi(5);

    // Min-based geometry term
    let g = (2.0 * cos_h * cos_o / wo_dot_h)
        .min(2.0 * cos_h * cos_i / wo_dot_h)
        .min(1.0);

    diffuse / PI + specular * (d * f * g / (4.0 * cos_i * cos_o))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Vec3, Vec3, Vec3, Vec3, Vec3) {
        let n = Vec3::Y;
        let wi = Vec3::new(1.0, 1.0, 0.0).normalize();
        let wo = Vec3::new(-1.0, 1.0, 0.0).normalize();
        (Vec3::splat(0.5), Vec3::splat(0.4), n, wo, wi)
    }

    #[test]
    fn test_below_horizon_is_black() {
        let (kd, ks, n, wo, _) = setup();
        let below = Vec3::new(0.0, -1.0, 0.0);
        for brdf in [
            Brdf::Phong { exponent: 10.0 },
            Brdf::ModifiedBlinnPhong { exponent: 10.0 },
            Brdf::TorranceSparrow {
                exponent: 10.0,
                refraction_index: 1.5,
            },
        ] {
            assert_eq!(brdf.eval(kd, ks, n, wo, below), Vec3::ZERO);
        }
    }

    #[test]
    fn test_specular_peaks_at_mirror_direction() {
        let (kd, ks, n, _, wi) = setup();
        let brdf = Brdf::ModifiedPhong { exponent: 50.0 };

        // Mirror direction of wi about n.
        let mirror = 2.0 * n.dot(wi) * n - wi;
        let peak = brdf.eval(kd, ks, n, mirror, wi);
        let off = brdf.eval(kd, ks, n, Vec3::Y, wi);
        assert!(peak.x > off.x);
    }

    #[test]
    fn test_normalized_variants_scale_with_exponent() {
        let (kd, ks, n, _, wi) = setup();
        // At the half-vector peak the normalized lobe grows with exponent.
        let wo = wi;
        let lo = Brdf::NormalizedModifiedBlinnPhong { exponent: 2.0 }.eval(kd, ks, n, wo, wi);
        let hi = Brdf::NormalizedModifiedBlinnPhong { exponent: 64.0 }.eval(kd, ks, n, wo, wi);
        assert!(hi.x > lo.x);
    }

    #[test]
    fn test_torrance_sparrow_is_finite_and_positive() {
        let (kd, ks, n, wo, wi) = setup();
        let brdf = Brdf::TorranceSparrow {
            exponent: 20.0,
            refraction_index: 1.5,
        };
        let f = brdf.eval(kd, ks, n, wo, wi);
        assert!(f.x.is_finite() && f.y.is_finite() && f.z.is_finite());
        assert!(f.min_element() >= 0.0);
    }
}
