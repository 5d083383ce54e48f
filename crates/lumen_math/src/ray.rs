//! Ray type for tracing.
//!
//! A ray is an origin point plus a direction vector. The direction is not
//! required to be normalized; intersection code keeps the parameter t
//! comparable across objects by transforming origin and direction together.

use glam::Vec3;

/// A ray with origin, direction, and refraction bookkeeping.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray
    origin: Vec3,
    /// Direction vector (not necessarily normalized)
    direction: Vec3,
    /// Index of the scene object this ray travels inside, if any.
    /// Set when a refracted ray enters a dielectric, cleared on exit.
    inside: Option<usize>,
}

impl Ray {
    /// Create a new ray travelling in open space.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            inside: None,
        }
    }

    /// Create a ray travelling inside the given object.
    #[inline]
    pub fn new_inside(origin: Vec3, direction: Vec3, inside: Option<usize>) -> Self {
        Self {
            origin,
            direction,
            inside,
        }
    }

    /// Get the ray's origin point.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the ray's direction vector.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Index of the object this ray is inside of, if any.
    #[inline]
    pub fn inside(&self) -> Option<usize> {
        self.inside
    }

    /// Compute a point along the ray at parameter t.
    /// P(t) = origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::Z,
            inside: None,
        }
    }
}
