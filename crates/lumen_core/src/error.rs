//! Scene validation errors.

use thiserror::Error;

/// Errors reported when a scene fails validation before rendering.
///
/// Numerical failures during rendering (degenerate triangles, zero slab
/// denominators) are never errors; they simply contribute "no hit".
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("object {object} references material {index}, but only {count} materials exist")]
    MaterialIndex {
        object: usize,
        index: usize,
        count: usize,
    },

    #[error("object {object} references mesh {index}, but only {count} meshes exist")]
    MeshIndex {
        object: usize,
        index: usize,
        count: usize,
    },

    #[error("object {object} references texture {index}, but only {count} textures exist")]
    TextureIndex {
        object: usize,
        index: usize,
        count: usize,
    },

    #[error("material {material} references BRDF {index}, but only {count} BRDFs exist")]
    BrdfIndex {
        material: usize,
        index: usize,
        count: usize,
    },

    #[error("instance {object} references base object {base}, which is not a mesh object")]
    InstanceBase { object: usize, base: usize },

    #[error("light {light} references object {object}, which is out of range or not emissive")]
    LightObject { light: usize, object: usize },

    #[error("camera {camera}: {reason}")]
    Camera { camera: usize, reason: String },
}
