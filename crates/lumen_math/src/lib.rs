//! Math foundation for the lumen renderer.
//!
//! Re-exports glam and adds the ray/interval/bounding-box types the
//! intersection code is built on.

pub use glam::*;

mod aabb;
mod interval;
mod onb;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use onb::Onb;
pub use ray::Ray;
pub use transform::Mat4Ext;
