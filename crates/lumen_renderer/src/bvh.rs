//! Bounding volume hierarchy over a mesh's triangles.
//!
//! Built once per mesh in local space and immutable afterwards; instances
//! share the tree through an `Arc` instead of duplicating it. Splitting
//! alternates the axis X -> Y -> Z and partitions by the sign of each
//! triangle centroid relative to the node box's centroid. When a partition
//! is one-sided on all three axes, the range is bisected by index, so
//! construction depth is always bounded.

use lumen_math::{Aabb, Interval, Vec3};

use crate::triangle::{Triangle, TriangleHit};

/// Leaves hold at most this many triangles.
pub const LEAF_MAX_SIZE: usize = 2;

/// A ray in the same local space as the tree, with the reciprocal
/// direction and per-axis sign indices the slab test wants precomputed.
#[derive(Debug, Clone, Copy)]
pub struct LocalRay {
    pub origin: Vec3,
    pub direction: Vec3,
    pub inv_dir: Vec3,
    pub sign: [usize; 3],
}

impl LocalRay {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            inv_dir: direction.recip(),
            sign: Aabb::direction_signs(direction),
        }
    }
}

/// A hit inside a mesh, carrying what normal/UV interpolation needs.
#[derive(Debug, Clone, Copy)]
pub struct MeshHit {
    pub t: f32,
    pub beta: f32,
    pub gamma: f32,
    pub indices: [u32; 3],
    pub face_normal: Vec3,
}

impl MeshHit {
    fn from_triangle(triangle: &Triangle, hit: TriangleHit) -> Self {
        Self {
            t: hit.t,
            beta: hit.beta,
            gamma: hit.gamma,
            indices: triangle.indices,
            face_normal: triangle.normal,
        }
    }
}

/// A BVH node. The box of a branch always contains the union of its
/// children's boxes.
#[derive(Debug)]
pub enum BvhNode {
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bounds: Aabb,
    },
    Leaf {
        triangles: Vec<Triangle>,
        bounds: Aabb,
    },
    Empty,
}

impl BvhNode {
    /// Build a tree over the given triangles.
    pub fn build(triangles: Vec<Triangle>) -> Self {
        Self::build_axis(triangles, 0)
    }

    /// Build a single flat leaf; used when acceleration is disabled so the
    /// traversal path stays identical to a linear scan.
    pub fn build_flat(triangles: Vec<Triangle>) -> Self {
        if triangles.is_empty() {
            return BvhNode::Empty;
        }
        let bounds = bounds_of(&triangles);
        BvhNode::Leaf { triangles, bounds }
    }

    fn build_axis(mut triangles: Vec<Triangle>, axis: usize) -> Self {
        if triangles.is_empty() {
            return BvhNode::Empty;
        }

        let bounds = bounds_of(&triangles);

        if triangles.len() <= LEAF_MAX_SIZE {
            return BvhNode::Leaf { triangles, bounds };
        }

        let pivot = bounds.centroid();

        // Try the preferred axis first, then the remaining two; a split
        // counts only if it actually separates the set.
        let mut split_axis = None;
        for attempt in 0..3 {
            let candidate = (axis + attempt) % 3;
            let left_count = triangles
                .iter()
                .filter(|tri| tri.centroid()[candidate] < pivot[candidate])
                .count();
            if left_count > 0 && left_count < triangles.len() {
                split_axis = Some(candidate);
                break;
            }
        }

        let (left, right, next_axis) = match split_axis {
            Some(candidate) => {
                let (left, right): (Vec<Triangle>, Vec<Triangle>) = triangles
                    .into_iter()
                    .partition(|tri| tri.centroid()[candidate] < pivot[candidate]);
                (left, right, (candidate + 1) % 3)
            }
            None => {
                // All centroids coincide on every axis; bisect by index so
                // recursion still terminates.
                let mid = triangles.len() / 2;
                let right = triangles.split_off(mid);
                (triangles, right, (axis + 1) % 3)
            }
        };

        BvhNode::Branch {
            left: Box::new(Self::build_axis(left, next_axis)),
            right: Box::new(Self::build_axis(right, next_axis)),
            bounds,
        }
    }

    /// Bounding box of this subtree.
    pub fn bounds(&self) -> Aabb {
        match self {
            BvhNode::Branch { bounds, .. } | BvhNode::Leaf { bounds, .. } => *bounds,
            BvhNode::Empty => Aabb::empty(),
        }
    }

    /// Number of triangles in this subtree.
    pub fn triangle_count(&self) -> usize {
        match self {
            BvhNode::Branch { left, right, .. } => left.triangle_count() + right.triangle_count(),
            BvhNode::Leaf { triangles, .. } => triangles.len(),
            BvhNode::Empty => 0,
        }
    }

    /// Closest hit within `range`, or None. Both children are visited and
    /// the globally closer hit wins.
    pub fn hit(&self, ray: &LocalRay, range: Interval, shadow: bool) -> Option<MeshHit> {
        match self {
            BvhNode::Empty => None,
            BvhNode::Leaf { triangles, bounds } => {
                if !bounds.hit(ray.origin, ray.inv_dir, ray.sign, range) {
                    return None;
                }
                let mut best: Option<MeshHit> = None;
                for triangle in triangles {
                    if let Some(hit) = triangle.hit(ray.origin, ray.direction, shadow) {
                        let closer = best.as_ref().map_or(true, |b| hit.t < b.t);
                        if range.surrounds(hit.t) && closer {
                            best = Some(MeshHit::from_triangle(triangle, hit));
                        }
                    }
                }
                best
            }
            BvhNode::Branch {
                left,
                right,
                bounds,
            } => {
                if !bounds.hit(ray.origin, ray.inv_dir, ray.sign, range) {
                    return None;
                }
                let left_hit = left.hit(ray, range, shadow);
                let right_hit = right.hit(ray, range, shadow);
                match (left_hit, right_hit) {
                    (Some(l), Some(r)) => Some(if l.t <= r.t { l } else { r }),
                    (hit, None) | (None, hit) => hit,
                }
            }
        }
    }
}

fn bounds_of(triangles: &[Triangle]) -> Aabb {
    let mut bounds = Aabb::empty();
    for triangle in triangles {
        bounds = Aabb::surrounding(&bounds, &triangle.bounds());
    }
    // Flat geometry would otherwise produce a zero-thickness slab.
    bounds.pad_to_minimums(1e-4);
    bounds
}
