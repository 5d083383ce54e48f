//! Triangle mesh geometry.
//!
//! Meshes are stored in object-local space; per-object transforms live on
//! the scene objects that reference them, so one mesh can back many
//! instances.

use lumen_math::{Aabb, Vec3};
use serde::{Deserialize, Serialize};

/// How triangle normals are produced at a hit point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadingMode {
    /// Face normal everywhere on the triangle
    Flat,
    /// Per-vertex averaged normals interpolated by barycentric weights
    Smooth,
}

/// A mesh of vertex positions, optional normals and UVs, and triangle
/// indices (every 3 indices form a triangle, CCW winding).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals (computed on demand for smooth shading)
    pub normals: Option<Vec<Vec3>>,

    /// UV coordinates (optional, one [u, v] per vertex)
    pub uvs: Option<Vec<[f32; 2]>>,

    /// Triangle indices
    pub indices: Vec<u32>,

    /// Local-space bounding box
    pub bounds: Aabb,

    /// Flat or smooth shading for this mesh
    pub shading: ShadingMode,
}

impl Mesh {
    /// Create a new mesh from positions and indices.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, shading: ShadingMode) -> Self {
        let bounds = Self::compute_bounds(&positions);
        Self {
            positions,
            normals: None,
            uvs: None,
            indices,
            bounds,
            shading,
        }
    }

    /// Attach per-vertex UV coordinates.
    pub fn with_uvs(mut self, uvs: Vec<[f32; 2]>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    fn compute_bounds(positions: &[Vec3]) -> Aabb {
        let mut bounds = Aabb::empty();
        for p in positions {
            bounds.grow(*p);
        }
        bounds
    }

    /// Compute smooth vertex normals by accumulating face normals at each
    /// vertex and normalizing the sums. Replaces any existing normals.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        for face in self.indices.chunks(3) {
            if face.len() < 3 {
                continue;
            }

            let i0 = face[0] as usize;
            let i1 = face[1] as usize;
            let i2 = face[2] as usize;
            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }

            let p0 = self.positions[i0];
            let p1 = self.positions[i1];
            let p2 = self.positions[i2];
            let face_normal = (p1 - p0).cross(p2 - p0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            let len = normal.length();
            if len > 0.0 {
                *normal /= len;
            } else {
                *normal = Vec3::Y;
            }
        }

        self.normals = Some(normals);
    }

    /// Ensure vertex normals exist and match the vertex count, computing
    /// them if needed. Smooth shading requires this before rendering.
    pub fn ensure_normals(&mut self) {
        let should_compute = match &self.normals {
            None => true,
            Some(normals) => normals.len() != self.positions.len(),
        };

        if should_compute {
            if let Some(normals) = &self.normals {
                log::debug!(
                    "normals length {} does not match vertex count {}, recomputing",
                    normals.len(),
                    self.positions.len()
                );
            }
            self.compute_normals();
        }
    }

    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Vertex positions of triangle `face`, or None if indices are out of
    /// range.
    pub fn triangle(&self, face: usize) -> Option<[Vec3; 3]> {
        let base = face * 3;
        if base + 2 >= self.indices.len() {
            return None;
        }
        let i0 = self.indices[base] as usize;
        let i1 = self.indices[base + 1] as usize;
        let i2 = self.indices[base + 2] as usize;
        if i0 >= self.positions.len() || i1 >= self.positions.len() || i2 >= self.positions.len() {
            return None;
        }
        Some([self.positions[i0], self.positions[i1], self.positions[i2]])
    }
}
