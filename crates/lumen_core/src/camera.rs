//! Camera and lens parameters.
//!
//! The camera supplies already-resolved scalars: near-plane extents, eye
//! position and basis, per-pixel sample count, and depth-of-field aperture
//! and focus distance. Ray generation itself happens in the renderer.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Near-plane extents in camera space.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct NearPlane {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl NearPlane {
    /// Symmetric plane of the given half extents.
    pub fn symmetric(half_width: f32, half_height: f32) -> Self {
        Self {
            left: -half_width,
            right: half_width,
            bottom: -half_height,
            top: half_height,
        }
    }

    fn scaled(&self, factor: f32) -> Self {
        Self {
            left: self.left * factor,
            right: self.right * factor,
            bottom: self.bottom * factor,
            top: self.top * factor,
        }
    }
}

/// A pinhole or thin-lens camera.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    /// View direction (toward the scene, not necessarily unit length)
    pub gaze: Vec3,
    pub up: Vec3,

    pub near_plane: NearPlane,
    pub near_distance: f32,

    pub image_width: u32,
    pub image_height: u32,

    /// Samples per pixel; the sampler uses a sqrt(n) x sqrt(n) jittered grid
    pub num_samples: u32,

    /// Side length of the square lens aperture; 0 disables depth of field
    pub aperture_size: f32,
    /// Distance to the plane of perfect focus; 0 disables depth of field
    pub focus_distance: f32,

    /// Output name for this camera's image
    pub image_name: String,
}

impl Camera {
    /// Create a camera with the given placement and a symmetric near plane.
    pub fn new(position: Vec3, gaze: Vec3, up: Vec3) -> Self {
        Self {
            position,
            gaze,
            up,
            near_plane: NearPlane::symmetric(1.0, 1.0),
            near_distance: 1.0,
            image_width: 800,
            image_height: 800,
            num_samples: 1,
            aperture_size: 0.0,
            focus_distance: 0.0,
            image_name: String::from("render.png"),
        }
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set the near plane extents and distance.
    pub fn with_near_plane(mut self, near_plane: NearPlane, near_distance: f32) -> Self {
        self.near_plane = near_plane;
        self.near_distance = near_distance;
        self
    }

    /// Set samples per pixel.
    pub fn with_samples(mut self, num_samples: u32) -> Self {
        self.num_samples = num_samples;
        self
    }

    /// Set the depth-of-field lens parameters.
    pub fn with_lens(mut self, aperture_size: f32, focus_distance: f32) -> Self {
        self.aperture_size = aperture_size;
        self.focus_distance = focus_distance;
        self
    }

    /// Right-handed camera basis: u points right, v up, w opposite gaze.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let w = (-self.gaze).normalize();
        let u = self.up.cross(w).normalize();
        let v = w.cross(u);
        (u, v, w)
    }

    /// Near plane and distance with the depth-of-field adjustment applied:
    /// when focusing, the image plane moves out to the focus distance and
    /// its extents scale proportionally so the field of view is unchanged.
    pub fn focal_plane(&self) -> (NearPlane, f32) {
        if self.has_depth_of_field() {
            let factor = self.focus_distance / self.near_distance;
            (self.near_plane.scaled(factor), self.focus_distance)
        } else {
            (self.near_plane, self.near_distance)
        }
    }

    /// Whether lens jitter applies.
    pub fn has_depth_of_field(&self) -> bool {
        self.aperture_size > 0.0 && self.focus_distance > 0.0
    }

    /// Check the camera is usable for rendering.
    pub fn validate(&self) -> Result<(), String> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(format!(
                "image size {}x{} is empty",
                self.image_width, self.image_height
            ));
        }
        if self.num_samples == 0 {
            return Err("sample count is zero".to_string());
        }
        if self.near_distance <= 0.0 {
            return Err(format!("near distance {} is not positive", self.near_distance));
        }
        if self.gaze.length_squared() == 0.0 || self.up.length_squared() == 0.0 {
            return Err("gaze and up must be non-zero".to_string());
        }
        if self.gaze.normalize().dot(self.up.normalize()).abs() > 1.0 - 1e-6 {
            return Err("gaze and up are parallel".to_string());
        }
        if self.near_plane.right <= self.near_plane.left
            || self.near_plane.top <= self.near_plane.bottom
        {
            return Err("near plane extents are inverted or empty".to_string());
        }
        Ok(())
    }
}
