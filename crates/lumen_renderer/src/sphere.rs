//! Analytic sphere intersection.

use std::f32::consts::PI;

use lumen_math::{Aabb, Vec3};

/// A sphere in object-local space.
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

/// A sphere hit in local space, with the spherical parameterization the
/// texture and bump-mapping paths need.
#[derive(Debug, Clone, Copy)]
pub struct SphereHit {
    pub t: f32,
    pub point: Vec3,
    pub normal: Vec3,
    pub uv: (f32, f32),
    pub dpdu: Vec3,
    pub dpdv: Vec3,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Local-space bounding box.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(
            self.center - Vec3::splat(self.radius),
            self.center + Vec3::splat(self.radius),
        )
    }

    /// Solve `|o + t d - c|^2 = r^2`; the smallest strictly-positive root
    /// is the hit. The direction need not be normalized.
    pub fn hit(&self, origin: Vec3, direction: Vec3) -> Option<SphereHit> {
        let oc = origin - self.center;
        let a = direction.length_squared();
        if a == 0.0 {
            return None;
        }
        let half_b = oc.dot(direction);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();

        let mut t = (-half_b - sqrt_d) / a;
        if t <= 0.0 {
            t = (-half_b + sqrt_d) / a;
        }
        if t <= 0.0 {
            return None;
        }

        let point = origin + t * direction;
        let rel = point - self.center;
        let normal = rel / self.radius;

        let theta = (rel.y / self.radius).clamp(-1.0, 1.0).acos();
        let phi = rel.z.atan2(rel.x);
        let uv = ((PI - phi) / (2.0 * PI), theta / PI);

        // Partial derivatives of the spherical parameterization, for bump
        // mapping. Degenerate at the poles, where the bump path falls back
        // to the unperturbed normal.
        let dpdu = Vec3::new(2.0 * PI * rel.z, 0.0, -2.0 * PI * rel.x);
        let sin_theta = theta.sin();
        let dpdv = PI
            * Vec3::new(
                rel.y * phi.cos(),
                -self.radius * sin_theta,
                rel.y * phi.sin(),
            );

        Some(SphereHit {
            t,
            point,
            normal,
            uv,
            dpdu,
            dpdv,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sphere() -> Sphere {
        Sphere::new(Vec3::ZERO, 1.0)
    }

    #[test]
    fn test_frontal_hit_parameters() {
        // Ray from (0,0,5) toward -z against the unit sphere at the origin.
        let sphere = unit_sphere();
        let hit = sphere
            .hit(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0))
            .expect("hit");
        assert!((hit.t - 4.0).abs() < 1e-5);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_origin_inside_uses_far_root() {
        let sphere = unit_sphere();
        let hit = sphere
            .hit(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0))
            .expect("hit from inside");
        assert!((hit.t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_miss_and_behind() {
        let sphere = unit_sphere();
        assert!(sphere
            .hit(Vec3::new(0.0, 3.0, 5.0), Vec3::new(0.0, 0.0, -1.0))
            .is_none());
        // Sphere fully behind the origin.
        assert!(sphere
            .hit(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0))
            .is_none());
    }

    #[test]
    fn test_unnormalized_direction() {
        let sphere = unit_sphere();
        let hit = sphere
            .hit(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -2.0))
            .expect("hit");
        assert!((hit.t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_uv_range_and_poles() {
        let sphere = unit_sphere();
        let hit = sphere
            .hit(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0))
            .expect("pole hit");
        // North pole has v = 0.
        assert!(hit.uv.1.abs() < 1e-4);

        let hit = sphere
            .hit(Vec3::new(5.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0))
            .expect("equator hit");
        assert!((hit.uv.1 - 0.5).abs() < 1e-4);
        assert!(hit.uv.0 >= 0.0 && hit.uv.0 <= 1.0);
    }

    #[test]
    fn test_partials_tangent_to_surface() {
        let sphere = unit_sphere();
        let hit = sphere
            .hit(Vec3::new(3.0, 1.0, 2.0), Vec3::new(-1.0, -0.3, -0.6))
            .expect("hit");
        assert!(hit.dpdu.dot(hit.normal).abs() < 1e-3);
        assert!(hit.dpdv.dot(hit.normal).abs() < 1e-3);
    }
}
