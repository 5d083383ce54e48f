//! Recursive shading evaluator.
//!
//! At a hit: emissive objects return their radiance directly; otherwise the
//! evaluator accumulates ambient, per-light direct terms (diffuse +
//! Blinn-Phong, or the material's BRDF), a mirror branch, a dielectric
//! branch, and in path-tracing mode an averaged uniform-hemisphere indirect
//! estimate. Mirror and refraction recursion happens once per hit,
//! independent of any shadow test. Output is unclamped linear color.

use lumen_core::{DecalMode, Integrator, Material, Scene};
use lumen_math::{Onb, Ray, Vec3};
use rand::rngs::StdRng;
use rand::Rng;

use crate::lights;
use crate::world::{Hit, World};

/// Shading context: the scene settings plus the resolved world, both
/// read-only and shared by every worker.
pub struct Shader<'a> {
    scene: &'a Scene,
    world: &'a World,
}

impl<'a> Shader<'a> {
    pub fn new(scene: &'a Scene, world: &'a World) -> Self {
        Self { scene, world }
    }

    /// Evaluate the radiance arriving along `ray`. `depth` counts recursive
    /// trace calls; a call at the scene's maximum depth returns black, so
    /// `max_recursion_depth = 0` renders nothing at all.
    pub fn shade(&self, ray: &Ray, depth: u32, rng: &mut StdRng) -> Vec3 {
        if depth >= self.scene.max_recursion_depth {
            return Vec3::ZERO;
        }

        let hit = match self
            .world
            .trace_nearest(ray, self.scene.intersection_epsilon, false)
        {
            Some(hit) => hit,
            None => return self.scene.background_color,
        };

        let object = self.world.object(hit.object);
        if let Some(radiance) = object.radiance {
            return radiance;
        }

        let material = &self.scene.materials[object.material];

        let mut normal = hit.normal;
        let mut kd = material.diffuse;
        if let Some(texture) = object.texture {
            let texture = &self.scene.textures[texture];
            if texture.bump {
                normal = texture.bump_normal(normal, hit.uv.0, hit.uv.1, hit.dpdu, hit.dpdv);
            }
            let color = texture.sample(hit.uv.0, hit.uv.1);
            // Image texels are in [0, 255]; the normalized color still
            // clamps so HDR texels cannot push reflectance above 1.
            let tex_kd = (color / texture.normalizer).clamp(Vec3::ZERO, Vec3::ONE);
            match texture.decal_mode {
                DecalMode::ReplaceAll => return color,
                DecalMode::ReplaceKd => kd = tex_kd,
                DecalMode::BlendKd => kd = (kd + tex_kd) * 0.5,
            }
        }

        let wo = (-ray.direction()).normalize_or_zero();
        let mut color = material.ambient * self.scene.ambient_light;

        for light in &self.scene.lights {
            let sample = match lights::sample_light(light, self.world, hit.point, rng) {
                Some(sample) => sample,
                None => continue,
            };

            let cos_i = normal.dot(sample.wi);
            if cos_i <= 0.0 {
                continue;
            }
            if lights::in_shadow(self.world, hit.point, &sample, self.scene.shadow_ray_epsilon) {
                continue;
            }

            if let Some(brdf) = material.brdf {
                let f = self.scene.brdfs[brdf].eval(kd, material.specular, normal, wo, sample.wi);
                color += f * cos_i * sample.radiance;
            } else {
                color += kd * cos_i * sample.radiance;
                let half = (sample.wi + wo).normalize_or_zero();
                let cos_h = normal.dot(half).max(0.0);
                color += material.specular * cos_h.powf(material.phong_exponent) * sample.radiance;
            }
        }

        // Recursive branches short-circuit when the child call would hit
        // the depth cutoff anyway.
        if material.is_reflective() && depth + 1 < self.scene.max_recursion_depth {
            let mut direction = reflect(ray.direction().normalize_or_zero(), normal);
            if material.roughness > 0.0 {
                direction = perturb(direction, material.roughness, rng);
            }
            let reflected = Ray::new_inside(
                hit.point + direction * self.scene.shadow_ray_epsilon,
                direction,
                ray.inside(),
            );
            color += material.mirror * self.shade(&reflected, depth + 1, rng);
        }

        if material.is_transparent() && depth + 1 < self.scene.max_recursion_depth {
            color += self.refraction(ray, &hit, normal, material, depth, rng);
        }

        if let Integrator::PathTracing { bounces } = self.scene.integrator {
            if bounces > 0 && depth + 1 < self.scene.max_recursion_depth {
                let basis = Onb::from_w(normal);
                let mut indirect = Vec3::ZERO;
                for _ in 0..bounces {
                    let direction = uniform_hemisphere(&basis, rng);
                    let bounce = Ray::new(
                        hit.point + direction * self.scene.shadow_ray_epsilon,
                        direction,
                    );
                    indirect += self.shade(&bounce, depth + 1, rng);
                }
                // Unweighted average added as-is: no albedo factor, no
                // cosine weighting, no termination by throughput.
                color += indirect / bounces as f32;
            }
        }

        color
    }

    /// Dielectric branch: Snell refraction with entering/leaving detection,
    /// Schlick Fresnel blending, and total internal reflection when the
    /// discriminant goes negative on exit.
    fn refraction(
        &self,
        ray: &Ray,
        hit: &Hit,
        shading_normal: Vec3,
        material: &Material,
        depth: u32,
        rng: &mut StdRng,
    ) -> Vec3 {
        let epsilon = self.scene.shadow_ray_epsilon;
        let direction = ray.direction().normalize_or_zero();

        let entering = direction.dot(shading_normal) < 0.0;
        let (n1, n2, normal) = if entering {
            (1.0, material.refraction_index, shading_normal)
        } else {
            (material.refraction_index, 1.0, -shading_normal)
        };

        let cos_i = (-direction).dot(normal).clamp(0.0, 1.0);
        let reflect_dir = reflect(direction, normal);
        let reflected = Ray::new_inside(
            hit.point + reflect_dir * epsilon,
            reflect_dir,
            ray.inside(),
        );

        let (refract_dir, cos_t) = match refract(direction, normal, n1 / n2, cos_i) {
            Some(result) => result,
            None => {
                // Total internal reflection: all weight on the reflection
                // branch.
                return material.transparency * self.shade(&reflected, depth + 1, rng);
            }
        };

        let fresnel = schlick(n1, n2, if n1 <= n2 { cos_i } else { cos_t });

        let inside = if entering { Some(hit.object) } else { None };
        let refracted = Ray::new_inside(hit.point + refract_dir * epsilon, refract_dir, inside);

        // The tint applies to the whole Fresnel blend, like the TIR branch.
        material.transparency
            * (fresnel * self.shade(&reflected, depth + 1, rng)
                + (1.0 - fresnel) * self.shade(&refracted, depth + 1, rng))
    }
}

/// Mirror reflection of `d` about unit normal `n`.
#[inline]
pub(crate) fn reflect(d: Vec3, n: Vec3) -> Vec3 {
    d - 2.0 * d.dot(n) * n
}

/// Snell refraction. Returns the refracted direction and the transmitted
/// cosine, or None on total internal reflection.
#[inline]
pub(crate) fn refract(d: Vec3, n: Vec3, eta: f32, cos_i: f32) -> Option<(Vec3, f32)> {
    let sin2_t = eta * eta * (1.0 - cos_i * cos_i);
    if sin2_t > 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    let direction = (eta * d + (eta * cos_i - cos_t) * n).normalize_or_zero();
    Some((direction, cos_t))
}

/// Schlick approximation of the Fresnel reflectance.
#[inline]
pub(crate) fn schlick(n1: f32, n2: f32, cosine: f32) -> f32 {
    let r0 = ((n1 - n2) / (n1 + n2)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Jitter a reflection direction inside a local basis around it.
fn perturb(direction: Vec3, roughness: f32, rng: &mut StdRng) -> Vec3 {
    let basis = Onb::from_w(direction);
    let r1 = rng.gen::<f32>() - 0.5;
    let r2 = rng.gen::<f32>() - 0.5;
    (direction + roughness * (r1 * basis.u + r2 * basis.v)).normalize_or_zero()
}

/// Uniformly distributed direction over the hemisphere around `basis.w`.
fn uniform_hemisphere(basis: &Onb, rng: &mut StdRng) -> Vec3 {
    let cos_theta = rng.gen::<f32>();
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = 2.0 * std::f32::consts::PI * rng.gen::<f32>();
    basis.local(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{Light, Object, Surface, Texture};
    use rand::SeedableRng;

    fn lit_sphere_scene(material: Material) -> Scene {
        let mut scene = Scene::new("lit sphere");
        let material = scene.add_material(material);
        scene.add_object(Object::new(
            Surface::Sphere {
                center: Vec3::new(0.0, 0.0, -3.0),
                radius: 1.0,
            },
            material,
        ));
        scene.add_light(Light::Point {
            position: Vec3::new(0.0, 5.0, 0.0),
            intensity: Vec3::splat(200.0),
        });
        scene
    }

    fn primary_ray() -> Ray {
        Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn test_miss_returns_background() {
        let mut scene = Scene::new("empty");
        scene.background_color = Vec3::new(0.1, 0.2, 0.3);
        let world = World::build(&scene).expect("build");
        let shader = Shader::new(&scene, &world);
        let mut rng = StdRng::seed_from_u64(0);

        let color = shader.shade(&primary_ray(), 0, &mut rng);
        assert_eq!(color, Vec3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_emissive_hit_returns_radiance() {
        let mut scene = lit_sphere_scene(Material::default());
        scene.objects[0].radiance = Some(Vec3::splat(7.0));
        let world = World::build(&scene).expect("build");
        let shader = Shader::new(&scene, &world);
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(shader.shade(&primary_ray(), 0, &mut rng), Vec3::splat(7.0));
    }

    #[test]
    fn test_diffuse_lit_from_above() {
        let scene = lit_sphere_scene(Material::diffuse(Vec3::splat(0.8)));
        let world = World::build(&scene).expect("build");
        let shader = Shader::new(&scene, &world);
        let mut rng = StdRng::seed_from_u64(0);

        let color = shader.shade(&primary_ray(), 0, &mut rng);
        assert!(color.min_element() > 0.0);
        assert!(color.is_finite());
    }

    #[test]
    fn test_replace_all_decal_bypasses_lighting() {
        let mut scene = lit_sphere_scene(Material::diffuse(Vec3::splat(0.8)));
        let mut texture = Texture::checkerboard(2.0);
        texture.decal_mode = DecalMode::ReplaceAll;
        let texture = scene.add_texture(texture);
        scene.objects[0].texture = Some(texture);

        let world = World::build(&scene).expect("build");
        let shader = Shader::new(&scene, &world);
        let mut rng = StdRng::seed_from_u64(0);

        let color = shader.shade(&primary_ray(), 0, &mut rng);
        // Either checker cell, never a lit blend.
        assert!(color == Vec3::ZERO || color == Vec3::splat(255.0));
    }

    #[test]
    fn test_recursion_is_bounded_by_depth() {
        let mut material = Material::default();
        material.diffuse = Vec3::ZERO;
        material.mirror = Vec3::ONE;

        let mut scene = lit_sphere_scene(material);
        scene.lights.clear();
        scene.ambient_light = Vec3::splat(0.2);
        scene.materials[0].ambient = Vec3::ONE;
        scene.background_color = Vec3::splat(100.0);
        scene.max_recursion_depth = 0;

        let world = World::build(&scene).expect("build");
        let shader = Shader::new(&scene, &world);
        let mut rng = StdRng::seed_from_u64(0);

        // A call at the maximum depth is black, so a zero budget renders
        // nothing at all.
        let color = shader.shade(&primary_ray(), 0, &mut rng);
        assert_eq!(color, Vec3::ZERO);

        // One level shades the hit but the mirror branch cannot recurse:
        // the huge background must not leak in, only ambient remains.
        scene.max_recursion_depth = 1;
        let world = World::build(&scene).expect("build");
        let shader = Shader::new(&scene, &world);
        let color = shader.shade(&primary_ray(), 0, &mut rng);
        assert!((color - Vec3::splat(0.2)).length() < 1e-5);

        // Two levels let the mirror see the background.
        scene.max_recursion_depth = 2;
        let world = World::build(&scene).expect("build");
        let shader = Shader::new(&scene, &world);
        let color = shader.shade(&primary_ray(), 0, &mut rng);
        assert!(color.x > 50.0);
    }

    #[test]
    fn test_schlick_stays_in_unit_interval() {
        for n2 in [1.0_f32, 1.33, 1.5, 2.4] {
            for i in 0..=100 {
                let cosine = i as f32 / 100.0;
                let f = schlick(1.0, n2, cosine);
                assert!((0.0..=1.0).contains(&f), "schlick({n2}, {cosine}) = {f}");
                let f = schlick(n2, 1.0, cosine);
                assert!((0.0..=1.0).contains(&f));
            }
        }
    }

    #[test]
    fn test_total_internal_reflection_at_grazing_exit() {
        // Leaving glass (eta = 1.5) at near-grazing incidence.
        let n = Vec3::Z;
        let cos_i = 0.1_f32;
        let sin_i = (1.0 - cos_i * cos_i).sqrt();
        let d = Vec3::new(sin_i, 0.0, -cos_i).normalize();
        assert!(refract(d, n, 1.5, cos_i).is_none());

        // Near-normal exit still refracts.
        let cos_i = 0.99_f32;
        let sin_i = (1.0 - cos_i * cos_i).sqrt();
        let d = Vec3::new(sin_i, 0.0, -cos_i).normalize();
        let (dir, cos_t) = refract(d, n, 1.5, cos_i).expect("refracts");
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(cos_t > 0.0 && cos_t <= 1.0);
    }

    #[test]
    fn test_transparency_tints_the_whole_fresnel_blend() {
        // Frontal hit on glass: F = ((1 - 1.5) / 2.5)^2 = 0.04 exactly.
        // With depth for a single recursion only the reflected branch
        // reaches the background, so the result is
        // transparency * F * background and must scale linearly with the
        // tint.
        let shade_with = |tint: f32| {
            let mut material = Material::diffuse(Vec3::ZERO);
            material.transparency = Vec3::splat(tint);
            material.refraction_index = 1.5;

            let mut scene = lit_sphere_scene(material);
            scene.lights.clear();
            scene.background_color = Vec3::splat(8.0);
            scene.max_recursion_depth = 2;

            let world = World::build(&scene).expect("build");
            let shader = Shader::new(&scene, &world);
            let mut rng = StdRng::seed_from_u64(0);
            shader.shade(&primary_ray(), 0, &mut rng)
        };

        let full = shade_with(1.0);
        let half = shade_with(0.5);
        assert!((full.x - 0.04 * 8.0).abs() < 1e-4);
        assert!((half * 2.0 - full).length() < 1e-5);
    }

    #[test]
    fn test_texture_kd_clamped_to_unit_reflectance() {
        // A texel ten times the normalizer must act like reflectance one,
        // not ten.
        let shade_scene = |scene: &Scene| {
            let world = World::build(scene).expect("build");
            let shader = Shader::new(scene, &world);
            let mut rng = StdRng::seed_from_u64(0);
            shader.shade(&primary_ray(), 0, &mut rng)
        };

        let mut hot = lit_sphere_scene(Material::diffuse(Vec3::ONE));
        let texture = hot.add_texture(Texture::image(1, 1, vec![Vec3::splat(2550.0)]));
        hot.objects[0].texture = Some(texture);

        let plain = lit_sphere_scene(Material::diffuse(Vec3::ONE));
        assert!((shade_scene(&hot) - shade_scene(&plain)).length() < 1e-5);
    }

    #[test]
    fn test_reflect_preserves_length_and_flips_normal_component() {
        let d = Vec3::new(1.0, -1.0, 0.0).normalize();
        let r = reflect(d, Vec3::Y);
        assert!((r - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-6);
    }

    #[test]
    fn test_uniform_hemisphere_stays_above_surface() {
        let basis = Onb::from_w(Vec3::new(0.3, 0.8, -0.5).normalize());
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..256 {
            let d = uniform_hemisphere(&basis, &mut rng);
            assert!((d.length() - 1.0).abs() < 1e-4);
            assert!(d.dot(basis.w) >= 0.0);
        }
    }

    #[test]
    fn test_path_tracing_indirect_adds_bounce_light() {
        // A zero-diffuse sphere inside a bright emissive shell: Whitted
        // sees nothing, while the indirect average contributes the shell's
        // radiance as-is, with no albedo factor on the estimate.
        let mut scene = lit_sphere_scene(Material::diffuse(Vec3::ZERO));
        scene.lights.clear();
        let material = scene.objects[0].material;
        scene.add_object(
            Object::new(
                Surface::Sphere {
                    center: Vec3::new(0.0, 0.0, -3.0),
                    radius: 10.0,
                },
                material,
            )
            .with_radiance(Vec3::splat(5.0)),
        );

        let world = World::build(&scene).expect("build");
        let shader = Shader::new(&scene, &world);
        let mut rng = StdRng::seed_from_u64(42);
        let whitted = shader.shade(&primary_ray(), 0, &mut rng);
        assert_eq!(whitted, Vec3::ZERO);

        scene.integrator = Integrator::PathTracing { bounces: 16 };
        let world = World::build(&scene).expect("build");
        let shader = Shader::new(&scene, &world);
        let traced = shader.shade(&primary_ray(), 0, &mut rng);
        assert!(traced.x > 1.0);
    }
}
