//! Light sampling.
//!
//! Point and directional lights are deterministic; the area variants draw
//! fresh uniform variates per call. Object lights (emissive meshes and
//! spheres) sample a position on their geometry through the world, and the
//! shadow check excludes that geometry so a light never shadows itself.

use lumen_core::Light;
use lumen_math::Vec3;
use rand::Rng;

use crate::world::World;

/// A sampled light position with the incident radiance it contributes.
#[derive(Debug, Clone, Copy)]
pub struct LightSample {
    /// Unit direction from the shaded point toward the sampled position
    pub wi: Vec3,
    /// Distance to the sampled position (infinite for directional lights)
    pub distance: f32,
    /// Incident radiance arriving from the sample
    pub radiance: Vec3,
    /// Emissive object backing this light, excluded from occlusion
    pub emitter: Option<usize>,
}

/// Sample a light as seen from `point`. Returns None when the sample is
/// degenerate (a light at the shaded point, an empty light mesh).
pub fn sample_light(
    light: &Light,
    world: &World,
    point: Vec3,
    rng: &mut impl Rng,
) -> Option<LightSample> {
    match light {
        Light::Point {
            position,
            intensity,
        } => toward(*position, point, *intensity, None),

        Light::Directional {
            direction,
            radiance,
        } => {
            let wi = (-*direction).normalize_or_zero();
            if wi == Vec3::ZERO {
                return None;
            }
            Some(LightSample {
                wi,
                distance: f32::INFINITY,
                radiance: *radiance,
                emitter: None,
            })
        }

        Light::Area {
            position,
            intensity,
            edge_u,
            edge_v,
        } => {
            let r1: f32 = rng.gen();
            let r2: f32 = rng.gen();
            let sampled = *position + r1 * *edge_u + r2 * *edge_v;
            let normal = edge_u.cross(*edge_v).normalize_or_zero();

            let sample = toward(sampled, point, *intensity, None)?;
            // Cosine falloff across the panel's own normal.
            let cosine = (-sample.wi).dot(normal).abs();
            Some(LightSample {
                radiance: sample.radiance * cosine,
                ..sample
            })
        }

        Light::Mesh { object, radiance } => {
            let instance = world.object(*object);
            let mesh = instance.mesh()?;
            let faces = mesh.triangle_count();
            if faces == 0 {
                return None;
            }

            let [a, b, c] = mesh.triangle(rng.gen_range(0..faces))?;
            // sqrt warp gives a uniform density over the triangle.
            let r1: f32 = rng.gen();
            let r2: f32 = rng.gen();
            let sq = r1.sqrt();
            let local = (1.0 - sq) * a + sq * (1.0 - r2) * b + sq * r2 * c;
            let sampled = instance.transform().transform_point3(local);

            toward(sampled, point, *radiance, Some(*object))
        }

        Light::Sphere { object, intensity } => {
            let instance = world.object(*object);
            let sphere = instance.sphere()?;
            let local = sphere.center + sphere.radius * random_unit_vector(rng);
            let sampled = instance.transform().transform_point3(local);

            let sample = toward(sampled, point, *intensity, Some(*object))?;
            // Constant intensity: undo the inverse-square factor.
            Some(LightSample {
                radiance: *intensity,
                ..sample
            })
        }
    }
}

/// Shadow test for a sampled light: cast from the shaded point, offset by
/// `epsilon` along the light direction, and report occlusion when any hit
/// lies strictly between the point and the sample. A light's own emissive
/// geometry never occludes.
pub fn in_shadow(world: &World, point: Vec3, sample: &LightSample, epsilon: f32) -> bool {
    let origin = point + sample.wi * epsilon;
    let max_t = if sample.distance.is_finite() {
        sample.distance - epsilon
    } else {
        f32::INFINITY
    };
    if max_t <= 0.0 {
        return false;
    }
    world.occluded(origin, sample.wi, max_t, sample.emitter)
}

/// Inverse-square sample toward a concrete position.
fn toward(
    position: Vec3,
    point: Vec3,
    intensity: Vec3,
    emitter: Option<usize>,
) -> Option<LightSample> {
    let offset = position - point;
    let distance = offset.length();
    if distance < 1e-6 {
        return None;
    }
    Some(LightSample {
        wi: offset / distance,
        distance,
        radiance: intensity / (distance * distance),
        emitter,
    })
}

/// Uniformly distributed unit vector, by rejection from the unit cube.
pub fn random_unit_vector(rng: &mut impl Rng) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.gen::<f32>() * 2.0 - 1.0,
            rng.gen::<f32>() * 2.0 - 1.0,
            rng.gen::<f32>() * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-12 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}
