//! Orthonormal basis around a unit vector.
//!
//! Used to turn canonical hemisphere or disk samples into world-space
//! directions around a surface normal or reflection direction.

use glam::Vec3;

/// A right-handed orthonormal basis (u, v, w).
#[derive(Debug, Clone, Copy)]
pub struct Onb {
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
}

impl Onb {
    /// Build a basis whose w axis is the given unit vector.
    ///
    /// The helper axis is chosen by zeroing-out w's smallest component,
    /// which keeps the cross product well conditioned.
    pub fn from_w(w: Vec3) -> Self {
        let a = w.abs();
        let helper = if a.x <= a.y && a.x <= a.z {
            Vec3::new(1.0, w.z, -w.y)
        } else if a.y <= a.z {
            Vec3::new(w.z, 1.0, -w.x)
        } else {
            Vec3::new(w.y, -w.x, 1.0)
        };
        let u = helper.cross(w).normalize();
        let v = w.cross(u);
        Self { u, v, w }
    }

    /// Map local coordinates into this basis.
    #[inline]
    pub fn local(&self, a: f32, b: f32, c: f32) -> Vec3 {
        a * self.u + b * self.v + c * self.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(basis: &Onb) {
        assert!((basis.u.length() - 1.0).abs() < 1e-5);
        assert!((basis.v.length() - 1.0).abs() < 1e-5);
        assert!((basis.w.length() - 1.0).abs() < 1e-5);
        assert!(basis.u.dot(basis.v).abs() < 1e-5);
        assert!(basis.u.dot(basis.w).abs() < 1e-5);
        assert!(basis.v.dot(basis.w).abs() < 1e-5);
    }

    #[test]
    fn test_basis_is_orthonormal() {
        for w in [
            Vec3::X,
            Vec3::Y,
            Vec3::Z,
            Vec3::new(1.0, 2.0, 3.0).normalize(),
            Vec3::new(-0.3, 0.1, -0.9).normalize(),
        ] {
            let basis = Onb::from_w(w);
            assert_orthonormal(&basis);
            assert!((basis.w - w).length() < 1e-6);
        }
    }

    #[test]
    fn test_local_recovers_w() {
        let basis = Onb::from_w(Vec3::new(0.0, 1.0, 0.0));
        let d = basis.local(0.0, 0.0, 1.0);
        assert!((d - Vec3::Y).length() < 1e-6);
    }
}
