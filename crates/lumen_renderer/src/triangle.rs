//! Triangle intersection.
//!
//! The barycentric system is solved with Cramer's rule: three 3x3
//! determinants over the edge vectors and the ray direction. Back-facing
//! hits are rejected unless the query is a shadow test, which must be
//! blocked by either face.

use lumen_math::{Aabb, Vec3};

/// A triangle with resolved vertex positions, the original vertex indices
/// (for normal/UV interpolation), and its precomputed unit face normal.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub indices: [u32; 3],
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub normal: Vec3,
}

/// Parameters of a triangle hit.
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    pub t: f32,
    pub beta: f32,
    pub gamma: f32,
}

/// Determinant of the 3x3 matrix with the given columns.
#[inline]
fn det3(c0: Vec3, c1: Vec3, c2: Vec3) -> f32 {
    c0.dot(c1.cross(c2))
}

impl Triangle {
    /// Build a triangle from vertex positions, CCW winding.
    pub fn new(indices: [u32; 3], a: Vec3, b: Vec3, c: Vec3) -> Self {
        let normal = (b - a).cross(c - a).normalize_or_zero();
        Self {
            indices,
            a,
            b,
            c,
            normal,
        }
    }

    /// Bounding box of the three vertices.
    pub fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::from_points(self.a, self.b);
        bounds.grow(self.c);
        bounds
    }

    /// Centroid of the three vertices.
    pub fn centroid(&self) -> Vec3 {
        (self.a + self.b + self.c) / 3.0
    }

    /// Intersect with a ray given in the same space as the vertices.
    ///
    /// Accepts a hit only when `t > 0`, `beta >= 0`, `gamma >= 0` and
    /// `beta + gamma <= 1`. A zero system determinant (parallel or
    /// degenerate triangle) is no hit.
    pub fn hit(&self, origin: Vec3, direction: Vec3, shadow: bool) -> Option<TriangleHit> {
        if !shadow && direction.dot(self.normal) >= 0.0 {
            return None;
        }

        let ab = self.a - self.b;
        let ac = self.a - self.c;
        let ao = self.a - origin;

        let det_a = det3(ab, ac, direction);
        if det_a == 0.0 {
            return None;
        }

        let beta = det3(ao, ac, direction) / det_a;
        let gamma = det3(ab, ao, direction) / det_a;
        let t = det3(ab, ac, ao) / det_a;

        if t > 0.0 && beta >= 0.0 && gamma >= 0.0 && beta + gamma <= 1.0 {
            Some(TriangleHit { t, beta, gamma })
        } else {
            None
        }
    }
}
