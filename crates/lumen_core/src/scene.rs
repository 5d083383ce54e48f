//! Scene aggregate.
//!
//! A scene owns all cameras, lights, materials, BRDFs, textures, meshes and
//! objects, plus the render settings. It is built once by an external
//! loader, validated, then read-only for the whole render; the renderer
//! receives it by reference everywhere.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::{Brdf, Camera, Light, Material, Mesh, SceneError, Texture};

/// Light-transport mode for the shading evaluator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Integrator {
    /// Direct lighting plus mirror/dielectric recursion only
    Whitted,
    /// Whitted terms plus an averaged uniform-hemisphere indirect estimate
    /// of `bounces` samples per hit
    PathTracing { bounces: u32 },
}

/// Geometry carried by a scene object.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Surface {
    /// Analytic sphere in local space
    Sphere { center: Vec3, radius: f32 },

    /// Triangle mesh, by index into the scene's mesh table
    Mesh { mesh: usize },

    /// Re-use of another mesh object's geometry and acceleration structure
    /// under this object's own transform. When `reset_transform` is false,
    /// the instance transform composes on top of the base object's.
    MeshInstance { base: usize, reset_transform: bool },
}

/// A renderable object: geometry plus appearance and placement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Object {
    pub surface: Surface,

    /// Index into the scene's material table
    pub material: usize,

    /// Optional index into the scene's texture table
    pub texture: Option<usize>,

    /// Local-to-world transform
    pub transform: Mat4,

    /// Emissive attachment: set when this object doubles as a light's
    /// geometry. An emissive hit returns this radiance directly.
    pub radiance: Option<Vec3>,
}

impl Object {
    /// Create a non-emissive, untextured object at the identity transform.
    pub fn new(surface: Surface, material: usize) -> Self {
        Self {
            surface,
            material,
            texture: None,
            transform: Mat4::IDENTITY,
            radiance: None,
        }
    }

    /// Set the local-to-world transform.
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Attach a texture.
    pub fn with_texture(mut self, texture: usize) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Mark the object as emissive with the given radiance.
    pub fn with_radiance(mut self, radiance: Vec3) -> Self {
        self.radiance = Some(radiance);
        self
    }
}

/// A complete scene plus render settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scene {
    pub name: String,

    pub cameras: Vec<Camera>,
    pub lights: Vec<Light>,
    pub materials: Vec<Material>,
    pub brdfs: Vec<Brdf>,
    pub textures: Vec<Texture>,
    pub meshes: Vec<Mesh>,
    pub objects: Vec<Object>,

    pub ambient_light: Vec3,
    pub background_color: Vec3,

    /// Offset applied along shadow and secondary ray directions to avoid
    /// self-intersection
    pub shadow_ray_epsilon: f32,
    /// Minimum t accepted by primary/secondary intersection queries
    pub intersection_epsilon: f32,

    pub max_recursion_depth: u32,
    pub integrator: Integrator,

    /// Run seed; per-worker generators derive from it deterministically
    pub seed: u64,

    /// Disable to intersect meshes by linear triangle scan
    pub use_bvh: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            name: String::new(),
            cameras: Vec::new(),
            lights: Vec::new(),
            materials: Vec::new(),
            brdfs: Vec::new(),
            textures: Vec::new(),
            meshes: Vec::new(),
            objects: Vec::new(),
            ambient_light: Vec3::ZERO,
            background_color: Vec3::ZERO,
            shadow_ray_epsilon: 1e-3,
            intersection_epsilon: 1e-6,
            max_recursion_depth: 6,
            integrator: Integrator::Whitted,
            seed: 0,
            use_bvh: true,
        }
    }
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a mesh and return its index.
    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    /// Add a material and return its index.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Add a BRDF and return its index.
    pub fn add_brdf(&mut self, brdf: Brdf) -> usize {
        self.brdfs.push(brdf);
        self.brdfs.len() - 1
    }

    /// Add a texture and return its index.
    pub fn add_texture(&mut self, texture: Texture) -> usize {
        self.textures.push(texture);
        self.textures.len() - 1
    }

    /// Add an object and return its index.
    pub fn add_object(&mut self, object: Object) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Add a light.
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Add a camera.
    pub fn add_camera(&mut self, camera: Camera) {
        self.cameras.push(camera);
    }

    /// Total triangle count across mesh objects (instances excluded).
    pub fn triangle_count(&self) -> usize {
        self.objects
            .iter()
            .filter_map(|o| match o.surface {
                Surface::Mesh { mesh } => self.meshes.get(mesh).map(Mesh::triangle_count),
                _ => None,
            })
            .sum()
    }

    /// Check every cross-reference in the scene before rendering.
    pub fn validate(&self) -> Result<(), SceneError> {
        for (i, object) in self.objects.iter().enumerate() {
            if object.material >= self.materials.len() {
                return Err(SceneError::MaterialIndex {
                    object: i,
                    index: object.material,
                    count: self.materials.len(),
                });
            }
            if let Some(texture) = object.texture {
                if texture >= self.textures.len() {
                    return Err(SceneError::TextureIndex {
                        object: i,
                        index: texture,
                        count: self.textures.len(),
                    });
                }
            }
            match object.surface {
                Surface::Mesh { mesh } => {
                    if mesh >= self.meshes.len() {
                        return Err(SceneError::MeshIndex {
                            object: i,
                            index: mesh,
                            count: self.meshes.len(),
                        });
                    }
                }
                Surface::MeshInstance { base, .. } => {
                    let valid = base != i
                        && matches!(
                            self.objects.get(base).map(|o| &o.surface),
                            Some(Surface::Mesh { .. })
                        );
                    if !valid {
                        return Err(SceneError::InstanceBase { object: i, base });
                    }
                }
                Surface::Sphere { .. } => {}
            }
        }

        for (i, material) in self.materials.iter().enumerate() {
            if let Some(brdf) = material.brdf {
                if brdf >= self.brdfs.len() {
                    return Err(SceneError::BrdfIndex {
                        material: i,
                        index: brdf,
                        count: self.brdfs.len(),
                    });
                }
            }
        }

        for (i, light) in self.lights.iter().enumerate() {
            if let Some(object) = light.emitter() {
                let emissive = self
                    .objects
                    .get(object)
                    .map(|o| o.radiance.is_some())
                    .unwrap_or(false);
                if !emissive {
                    return Err(SceneError::LightObject { light: i, object });
                }
            }
        }

        for (i, camera) in self.cameras.iter().enumerate() {
            camera.validate().map_err(|reason| SceneError::Camera {
                camera: i,
                reason,
            })?;
        }

        Ok(())
    }
}
