//! Transform helpers for glam's Mat4.

use glam::{Mat4, Vec3};

use crate::Aabb;

/// Extension trait adding the transforms the renderer needs on top of
/// glam's point transform.
pub trait Mat4Ext {
    /// Transform a direction vector (w = 0, no translation).
    fn transform_vector3(&self, v: Vec3) -> Vec3;

    /// Transform a surface normal given that `self` is the INVERSE of the
    /// object's local-to-world matrix. Applies the transpose-of-inverse
    /// rule so normals stay perpendicular under non-uniform scaling.
    /// The result is normalized.
    fn transform_normal(&self, n: Vec3) -> Vec3;

    /// Transform an axis-aligned bounding box, returning the axis-aligned
    /// box of the transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    #[inline]
    fn transform_vector3(&self, v: Vec3) -> Vec3 {
        self.transform_vector3(v)
    }

    #[inline]
    fn transform_normal(&self, n: Vec3) -> Vec3 {
        self.transpose()
            .transform_vector3(n)
            .normalize_or_zero()
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let corners = [
            Vec3::new(aabb.min.x, aabb.min.y, aabb.min.z),
            Vec3::new(aabb.max.x, aabb.min.y, aabb.min.z),
            Vec3::new(aabb.min.x, aabb.max.y, aabb.min.z),
            Vec3::new(aabb.max.x, aabb.max.y, aabb.min.z),
            Vec3::new(aabb.min.x, aabb.min.y, aabb.max.z),
            Vec3::new(aabb.max.x, aabb.min.y, aabb.max.z),
            Vec3::new(aabb.min.x, aabb.max.y, aabb.max.z),
            Vec3::new(aabb.max.x, aabb.max.y, aabb.max.z),
        ];

        let mut out = Aabb::empty();
        for corner in corners {
            out.grow(self.transform_point3(corner));
        }
        out
    }
}
