//! Scene description for the lumen renderer.
//!
//! Everything here is data: geometry, materials, BRDFs, textures, lights and
//! cameras, aggregated into a [`Scene`]. A scene is produced once by an
//! external loader, validated, and then read-only for the whole render.
//! The behavior that consumes this data (intersection, sampling, shading)
//! lives in `lumen_renderer`.

mod brdf;
mod camera;
mod error;
mod light;
mod material;
mod mesh;
mod scene;
mod texture;

pub use brdf::Brdf;
pub use camera::{Camera, NearPlane};
pub use error::SceneError;
pub use light::Light;
pub use material::Material;
pub use mesh::{Mesh, ShadingMode};
pub use scene::{Integrator, Object, Scene, Surface};
pub use texture::{Appearance, DecalMode, Interpolation, Texture, TextureData};
