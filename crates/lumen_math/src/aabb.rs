//! Axis-aligned bounding box.
//!
//! Stored as a min/max corner pair so the slab test can index the near and
//! far bound per axis by the sign of the ray direction instead of branching.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::Interval;

/// An axis-aligned bounding box given by its two extreme corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// An empty box (contains nothing, grows to fit anything).
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Box spanning two corner points (in any order).
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest box containing both inputs.
    pub fn surrounding(a: &Aabb, b: &Aabb) -> Self {
        Self {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        }
    }

    /// Grow to include a point.
    pub fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Whether this box fully contains another.
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.min.z <= other.min.z
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
            && self.max.z >= other.max.z
    }

    /// Center of the box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Corner selected per axis by sign index: 0 = min, 1 = max.
    #[inline]
    fn bound(&self, sign: usize) -> Vec3 {
        if sign == 0 {
            self.min
        } else {
            self.max
        }
    }

    /// Pad degenerate axes so the slab test never sees a zero-thickness box.
    pub fn pad_to_minimums(&mut self, delta: f32) {
        for axis in 0..3 {
            if self.max[axis] - self.min[axis] < delta {
                let pad = delta / 2.0;
                self.min[axis] -= pad;
                self.max[axis] += pad;
            }
        }
    }

    /// Slab test against a ray given its precomputed reciprocal direction
    /// and per-axis sign indices (1 where the direction component is
    /// negative). Returns true if the ray passes through the box within
    /// `range`. A zero direction component produces +/- infinity slab
    /// bounds, which resolve correctly through the interval intersection.
    #[inline]
    pub fn hit(&self, origin: Vec3, inv_dir: Vec3, sign: [usize; 3], range: Interval) -> bool {
        let near = self.bound(0);
        let far = self.bound(1);
        let mut t_min = range.min;
        let mut t_max = range.max;

        for axis in 0..3 {
            let (lo, hi) = if sign[axis] == 0 {
                (near[axis], far[axis])
            } else {
                (far[axis], near[axis])
            };
            let t0 = (lo - origin[axis]) * inv_dir[axis];
            let t1 = (hi - origin[axis]) * inv_dir[axis];
            if t0 > t_min {
                t_min = t0;
            }
            if t1 < t_max {
                t_max = t1;
            }
            if t_max < t_min {
                return false;
            }
        }
        true
    }

    /// Per-axis sign indices for a direction, for use with [`Aabb::hit`].
    #[inline]
    pub fn direction_signs(direction: Vec3) -> [usize; 3] {
        [
            (direction.x < 0.0) as usize,
            (direction.y < 0.0) as usize,
            (direction.z < 0.0) as usize,
        ]
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    fn hit_ray(bbox: &Aabb, origin: Vec3, direction: Vec3) -> bool {
        let inv = direction.recip();
        bbox.hit(origin, inv, Aabb::direction_signs(direction), Interval::POSITIVE)
    }

    #[test]
    fn test_ray_hits_box() {
        let bbox = unit_box();
        assert!(hit_ray(&bbox, Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)));
        assert!(hit_ray(&bbox, Vec3::new(-5.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_ray_misses_box() {
        let bbox = unit_box();
        assert!(!hit_ray(&bbox, Vec3::new(0.0, 5.0, 5.0), Vec3::new(0.0, 0.0, -1.0)));
        // Pointing away from the box.
        assert!(!hit_ray(&bbox, Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_negative_direction_signs() {
        let bbox = unit_box();
        let dir = Vec3::new(-1.0, -1.0, -1.0);
        assert_eq!(Aabb::direction_signs(dir), [1, 1, 1]);
        assert!(hit_ray(&bbox, Vec3::splat(5.0), dir));
    }

    #[test]
    fn test_axis_parallel_ray() {
        // Zero direction components must not produce false hits.
        let bbox = unit_box();
        assert!(!hit_ray(&bbox, Vec3::new(3.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)));
        assert!(hit_ray(&bbox, Vec3::new(0.5, 0.5, 5.0), Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_surrounding_contains_inputs() {
        let a = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::from_points(Vec3::splat(2.0), Vec3::splat(3.0));
        let s = Aabb::surrounding(&a, &b);
        assert!(s.contains(&a));
        assert!(s.contains(&b));
        assert_eq!(s.centroid(), Vec3::splat(1.5));
    }

    #[test]
    fn test_grow_and_pad() {
        let mut bbox = Aabb::empty();
        bbox.grow(Vec3::new(1.0, 2.0, 3.0));
        bbox.grow(Vec3::new(-1.0, 0.0, 3.0));
        assert_eq!(bbox.min, Vec3::new(-1.0, 0.0, 3.0));
        assert_eq!(bbox.max, Vec3::new(1.0, 2.0, 3.0));

        // z axis is flat until padded.
        bbox.pad_to_minimums(0.001);
        assert!(bbox.max.z > bbox.min.z);
    }
}
