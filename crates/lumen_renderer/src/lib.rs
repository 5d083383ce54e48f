//! Ray-traced rendering of `lumen_core` scenes.
//!
//! The crate turns a validated [`lumen_core::Scene`] into images: it
//! builds per-mesh bounding volume hierarchies, traces camera rays through
//! a jittered pixel sampler, shades hits with Whitted-style direct
//! lighting plus optional path-traced indirect light, and schedules the
//! work across row bands.

pub mod bvh;
pub mod lights;
pub mod renderer;
pub mod sampler;
pub mod scheduler;
pub mod shading;
pub mod sphere;
pub mod triangle;
pub mod world;

pub use renderer::{color_to_rgba, render, render_with_world, ImageBuffer};
pub use sampler::PixelSampler;
pub use scheduler::{bands, Band, BAND_COUNT};
pub use shading::Shader;
pub use world::{Hit, World};
