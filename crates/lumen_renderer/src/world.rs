//! Scene intersection dispatcher.
//!
//! `World::build` resolves the scene's object descriptions into renderable
//! instances: per-object inverse transforms are precomputed and every mesh
//! gets one acceleration structure, shared through `Arc` by all instances
//! that reference it. `trace_nearest` then iterates the top-level object
//! list (acceleration is per object, not across objects), transforms the
//! ray into each object's local space, and keeps the globally minimal
//! positive t.

use std::sync::Arc;

use lumen_core::{Mesh, Scene, SceneError, ShadingMode, Surface};
use lumen_math::{Interval, Mat4, Mat4Ext, Ray, Vec3};

use crate::bvh::{BvhNode, LocalRay, MeshHit};
use crate::sphere::Sphere;
use crate::triangle::Triangle;

/// A world-space hit with everything the shading evaluator needs.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub t: f32,
    /// World-space hit point
    pub point: Vec3,
    /// World-space unit shading normal (before bump perturbation)
    pub normal: Vec3,
    /// Surface parameterization at the hit
    pub uv: (f32, f32),
    /// World-space surface partials w.r.t. (u, v); zero when the surface
    /// has no usable parameterization
    pub dpdu: Vec3,
    pub dpdv: Vec3,
    /// Index of the hit object
    pub object: usize,
}

#[derive(Clone)]
enum Geometry {
    Sphere(Sphere),
    Mesh {
        mesh: Arc<Mesh>,
        accel: Arc<BvhNode>,
    },
}

/// A resolved, renderable scene object.
pub struct ObjectInstance {
    geometry: Geometry,
    pub material: usize,
    pub texture: Option<usize>,
    pub radiance: Option<Vec3>,
    transform: Mat4,
    inverse: Mat4,
}

impl ObjectInstance {
    /// Local-to-world transform.
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// The shared mesh backing this object, if it is mesh geometry.
    pub fn mesh(&self) -> Option<&Arc<Mesh>> {
        match &self.geometry {
            Geometry::Mesh { mesh, .. } => Some(mesh),
            Geometry::Sphere(_) => None,
        }
    }

    /// The local-space sphere, if this object is sphere geometry.
    pub fn sphere(&self) -> Option<&Sphere> {
        match &self.geometry {
            Geometry::Sphere(sphere) => Some(sphere),
            Geometry::Mesh { .. } => None,
        }
    }

    #[cfg(test)]
    fn accel(&self) -> Option<&Arc<BvhNode>> {
        match &self.geometry {
            Geometry::Mesh { accel, .. } => Some(accel),
            Geometry::Sphere(_) => None,
        }
    }
}

type MeshEntry = (Arc<Mesh>, Arc<BvhNode>);

/// The resolved scene, read-only for the whole render.
pub struct World {
    objects: Vec<ObjectInstance>,
}

impl World {
    /// Validate the scene and resolve it into renderable instances.
    pub fn build(scene: &Scene) -> Result<Self, SceneError> {
        scene.validate()?;

        let mut cache: Vec<Option<MeshEntry>> = vec![None; scene.meshes.len()];
        let mut objects = Vec::with_capacity(scene.objects.len());

        for index in 0..scene.objects.len() {
            let (geometry, transform) = resolve_geometry(scene, &mut cache, index);
            let object = &scene.objects[index];
            objects.push(ObjectInstance {
                geometry,
                material: object.material,
                texture: object.texture,
                radiance: object.radiance,
                transform,
                inverse: transform.inverse(),
            });
        }

        let triangles: usize = objects
            .iter()
            .filter_map(|o| match &o.geometry {
                Geometry::Mesh { accel, .. } => Some(accel.triangle_count()),
                Geometry::Sphere(_) => None,
            })
            .sum();
        log::info!(
            "world built: {} objects, {} mesh triangles (instances share their base trees)",
            objects.len(),
            triangles
        );

        Ok(Self { objects })
    }

    /// Number of resolved objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Access a resolved object by index.
    pub fn object(&self, index: usize) -> &ObjectInstance {
        &self.objects[index]
    }

    /// Closest hit with `t > t_min` across all objects. The `shadow` flag
    /// disables back-face culling so any occluder blocks light.
    pub fn trace_nearest(&self, ray: &Ray, t_min: f32, shadow: bool) -> Option<Hit> {
        let mut closest = f32::INFINITY;
        let mut best: Option<Hit> = None;

        for (index, object) in self.objects.iter().enumerate() {
            let origin = object.inverse.transform_point3(ray.origin());
            let direction = object.inverse.transform_vector3(ray.direction());

            match &object.geometry {
                Geometry::Sphere(sphere) => {
                    if let Some(hit) = sphere.hit(origin, direction) {
                        if hit.t > t_min && hit.t < closest {
                            closest = hit.t;
                            best = Some(Hit {
                                t: hit.t,
                                point: ray.at(hit.t),
                                normal: object.inverse.transform_normal(hit.normal),
                                uv: hit.uv,
                                dpdu: object.transform.transform_vector3(hit.dpdu),
                                dpdv: object.transform.transform_vector3(hit.dpdv),
                                object: index,
                            });
                        }
                    }
                }
                Geometry::Mesh { mesh, accel } => {
                    let local = LocalRay::new(origin, direction);
                    if let Some(hit) = accel.hit(&local, Interval::new(t_min, closest), shadow) {
                        closest = hit.t;
                        best = Some(mesh_hit_to_world(ray, object, mesh, &hit, index));
                    }
                }
            }
        }

        best
    }

    /// Whether anything lies between `origin` and `origin + max_t *
    /// direction`. Back-face culling is off; the object at `skip` (a
    /// light's own emissive geometry) never occludes.
    pub fn occluded(&self, origin: Vec3, direction: Vec3, max_t: f32, skip: Option<usize>) -> bool {
        for (index, object) in self.objects.iter().enumerate() {
            if Some(index) == skip {
                continue;
            }

            let local_origin = object.inverse.transform_point3(origin);
            let local_direction = object.inverse.transform_vector3(direction);

            match &object.geometry {
                Geometry::Sphere(sphere) => {
                    if let Some(hit) = sphere.hit(local_origin, local_direction) {
                        if hit.t < max_t {
                            return true;
                        }
                    }
                }
                Geometry::Mesh { accel, .. } => {
                    let local = LocalRay::new(local_origin, local_direction);
                    if accel
                        .hit(&local, Interval::new(0.0, max_t), true)
                        .is_some()
                    {
                        return true;
                    }
                }
            }
        }
        false
    }
}

/// Resolve one object's geometry and effective transform. Instances share
/// their base mesh's tree; validation guarantees an instance base is a
/// plain mesh object, so the recursion is one level deep.
fn resolve_geometry(
    scene: &Scene,
    cache: &mut Vec<Option<MeshEntry>>,
    index: usize,
) -> (Geometry, Mat4) {
    let object = &scene.objects[index];
    match object.surface {
        Surface::Sphere { center, radius } => (
            Geometry::Sphere(Sphere::new(center, radius)),
            object.transform,
        ),
        Surface::Mesh { mesh } => {
            let (mesh, accel) = mesh_entry(scene, cache, mesh);
            (Geometry::Mesh { mesh, accel }, object.transform)
        }
        Surface::MeshInstance {
            base,
            reset_transform,
        } => {
            let (geometry, base_transform) = resolve_geometry(scene, cache, base);
            let transform = if reset_transform {
                object.transform
            } else {
                object.transform * base_transform
            };
            (geometry, transform)
        }
    }
}

fn mesh_entry(scene: &Scene, cache: &mut Vec<Option<MeshEntry>>, index: usize) -> MeshEntry {
    if let Some(entry) = &cache[index] {
        return entry.clone();
    }

    let mut mesh = scene.meshes[index].clone();
    if mesh.shading == ShadingMode::Smooth {
        mesh.ensure_normals();
    }

    let mut triangles = Vec::with_capacity(mesh.triangle_count());
    for face in 0..mesh.triangle_count() {
        if let Some([a, b, c]) = mesh.triangle(face) {
            let base = face * 3;
            let indices = [
                mesh.indices[base],
                mesh.indices[base + 1],
                mesh.indices[base + 2],
            ];
            triangles.push(Triangle::new(indices, a, b, c));
        }
    }

    let accel = if scene.use_bvh {
        BvhNode::build(triangles)
    } else {
        BvhNode::build_flat(triangles)
    };
    log::debug!(
        "mesh {}: accelerator over {} triangles (bvh: {})",
        index,
        accel.triangle_count(),
        scene.use_bvh
    );

    let entry = (Arc::new(mesh), Arc::new(accel));
    cache[index] = Some(entry.clone());
    entry
}

fn mesh_hit_to_world(
    ray: &Ray,
    object: &ObjectInstance,
    mesh: &Mesh,
    hit: &MeshHit,
    index: usize,
) -> Hit {
    let alpha = 1.0 - hit.beta - hit.gamma;
    let [i0, i1, i2] = hit.indices.map(|i| i as usize);

    let local_normal = match (mesh.shading, &mesh.normals) {
        (ShadingMode::Smooth, Some(normals)) if i2 < normals.len() => {
            (alpha * normals[i0] + hit.beta * normals[i1] + hit.gamma * normals[i2])
                .normalize_or_zero()
        }
        _ => hit.face_normal,
    };

    let (uv, dpdu, dpdv) = match &mesh.uvs {
        Some(uvs) if i0 < uvs.len() && i1 < uvs.len() && i2 < uvs.len() => {
            let (a_uv, b_uv, c_uv) = (uvs[i0], uvs[i1], uvs[i2]);
            let u = alpha * a_uv[0] + hit.beta * b_uv[0] + hit.gamma * c_uv[0];
            let v = alpha * a_uv[1] + hit.beta * b_uv[1] + hit.gamma * c_uv[1];

            // Surface partials from the UV edge matrix.
            let e1 = mesh.positions[i1] - mesh.positions[i0];
            let e2 = mesh.positions[i2] - mesh.positions[i0];
            let du1 = b_uv[0] - a_uv[0];
            let dv1 = b_uv[1] - a_uv[1];
            let du2 = c_uv[0] - a_uv[0];
            let dv2 = c_uv[1] - a_uv[1];
            let det = du1 * dv2 - dv1 * du2;
            if det.abs() < 1e-12 {
                ((u, v), Vec3::ZERO, Vec3::ZERO)
            } else {
                let inv = 1.0 / det;
                let dpdu = (dv2 * e1 - dv1 * e2) * inv;
                let dpdv = (du1 * e2 - du2 * e1) * inv;
                (
                    (u, v),
                    object.transform.transform_vector3(dpdu),
                    object.transform.transform_vector3(dpdv),
                )
            }
        }
        _ => ((0.0, 0.0), Vec3::ZERO, Vec3::ZERO),
    };

    Hit {
        t: hit.t,
        point: ray.at(hit.t),
        normal: object.inverse.transform_normal(local_normal),
        uv,
        dpdu,
        dpdv,
        object: index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{Material, Object};

    fn sphere_object(center: Vec3, radius: f32, material: usize) -> Object {
        Object::new(Surface::Sphere { center, radius }, material)
    }

    fn quad_mesh(shading: ShadingMode) -> Mesh {
        Mesh::new(
            vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
            shading,
        )
    }

    #[test]
    fn test_nearest_across_objects() {
        let mut scene = Scene::new("two spheres");
        let material = scene.add_material(Material::default());
        scene.add_object(sphere_object(Vec3::new(0.0, 0.0, -5.0), 1.0, material));
        scene.add_object(sphere_object(Vec3::new(0.0, 0.0, -2.0), 1.0, material));

        let world = World::build(&scene).expect("build");
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = world.trace_nearest(&ray, 1e-6, false).expect("hit");

        assert_eq!(hit.object, 1);
        assert!((hit.t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_transformed_sphere_normal() {
        // Sphere squashed 2x along y; normal at the squashed equator must
        // come out of the inverse-transpose rule, not the raw transform.
        let mut scene = Scene::new("squashed");
        let material = scene.add_material(Material::default());
        scene.add_object(
            sphere_object(Vec3::ZERO, 1.0, material)
                .with_transform(Mat4::from_scale(Vec3::new(1.0, 0.5, 1.0))),
        );

        let world = World::build(&scene).expect("build");
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = world.trace_nearest(&ray, 1e-6, false).expect("hit");

        assert!((hit.t - 4.0).abs() < 1e-4);
        assert!((hit.normal - Vec3::Z).length() < 1e-4);
        assert!((hit.normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_instances_share_base_tree() {
        let mut scene = Scene::new("instanced");
        let material = scene.add_material(Material::default());
        let mesh = scene.add_mesh(quad_mesh(ShadingMode::Flat));
        let base = scene.add_object(Object::new(Surface::Mesh { mesh }, material));
        scene.add_object(
            Object::new(
                Surface::MeshInstance {
                    base,
                    reset_transform: false,
                },
                material,
            )
            .with_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0))),
        );

        let world = World::build(&scene).expect("build");
        let a = world.object(0).accel().expect("base accel");
        let b = world.object(1).accel().expect("instance accel");
        assert!(Arc::ptr_eq(a, b));

        // The instance is hit at its own transform.
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = world.trace_nearest(&ray, 1e-6, false).expect("hit");
        assert_eq!(hit.object, 1);
        assert!((hit.t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_smooth_normals_require_smooth_mode() {
        let mut scene = Scene::new("flat vs smooth");
        let material = scene.add_material(Material::default());
        let mesh = scene.add_mesh(quad_mesh(ShadingMode::Smooth));
        scene.add_object(Object::new(Surface::Mesh { mesh }, material));

        let world = World::build(&scene).expect("build");
        let ray = Ray::new(Vec3::new(0.2, 0.3, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = world.trace_nearest(&ray, 1e-6, false).expect("hit");

        // Planar quad: smooth normals agree with the face normal.
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_occlusion_and_emitter_skip() {
        let mut scene = Scene::new("occlusion");
        let material = scene.add_material(Material::default());
        let blocker = scene.add_object(sphere_object(Vec3::new(0.0, 0.0, -2.0), 0.5, material));

        let world = World::build(&scene).expect("build");
        let origin = Vec3::ZERO;
        let direction = Vec3::new(0.0, 0.0, -1.0);

        assert!(world.occluded(origin, direction, 4.0, None));
        // Too short to reach the blocker.
        assert!(!world.occluded(origin, direction, 1.0, None));
        // The blocker is the light's own geometry.
        assert!(!world.occluded(origin, direction, 4.0, Some(blocker)));
    }

    #[test]
    fn test_bvh_matches_linear_scan_through_world() {
        let mut scene = Scene::new("toggle");
        let material = scene.add_material(Material::default());
        let mesh = scene.add_mesh(quad_mesh(ShadingMode::Flat));
        scene.add_object(Object::new(Surface::Mesh { mesh }, material));

        let mut linear = scene.clone();
        linear.use_bvh = false;

        let fast = World::build(&scene).expect("bvh world");
        let slow = World::build(&linear).expect("linear world");

        for x in [-0.9_f32, -0.3, 0.0, 0.4, 0.95, 1.5] {
            let ray = Ray::new(Vec3::new(x, 0.1, 5.0), Vec3::new(0.0, 0.0, -1.0));
            let a = fast.trace_nearest(&ray, 1e-6, true);
            let b = slow.trace_nearest(&ray, 1e-6, true);
            match (a, b) {
                (Some(a), Some(b)) => assert!((a.t - b.t).abs() < 1e-5),
                (None, None) => {}
                _ => panic!("bvh and linear scan disagree at x = {x}"),
            }
        }
    }
}
