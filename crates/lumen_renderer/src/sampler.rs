//! Primary-ray generation and per-pixel sampling.
//!
//! Rays go through the camera's near plane: `m = e - w * distance`,
//! `q = m + u * left + v * top`, and a pixel offset walks right and down
//! from `q`. Supersampling jitters a sqrt(n) x sqrt(n) sub-pixel grid and
//! reconstructs with a Gaussian weight; depth of field additionally
//! jitters the eye on the square aperture, aiming at the focal plane.

use std::f32::consts::PI;

use lumen_core::Camera;
use lumen_math::{Ray, Vec3};
use rand::rngs::StdRng;
use rand::Rng;

use crate::shading::Shader;

/// Precomputed camera-ray setup for one camera.
pub struct PixelSampler {
    eye: Vec3,
    u: Vec3,
    v: Vec3,
    /// Top-left corner of the (possibly focus-scaled) image plane
    q: Vec3,
    /// World-space step per pixel, rightward and downward
    su: f32,
    sv: f32,
    aperture: f32,
    samples: u32,
    grid: u32,
}

impl PixelSampler {
    pub fn new(camera: &Camera) -> Self {
        let (u, v, w) = camera.basis();
        let (plane, distance) = camera.focal_plane();

        let m = camera.position - w * distance;
        let q = m + u * plane.left + v * plane.top;
        let su = (plane.right - plane.left) / camera.image_width as f32;
        let sv = (plane.top - plane.bottom) / camera.image_height as f32;

        let grid = (camera.num_samples as f32).sqrt().floor().max(1.0) as u32;
        let aperture = if camera.has_depth_of_field() {
            camera.aperture_size
        } else {
            0.0
        };

        Self {
            eye: camera.position,
            u,
            v,
            q,
            su,
            sv,
            aperture,
            samples: camera.num_samples,
            grid,
        }
    }

    /// Ray through the image-plane position `(px, py)` in pixel units.
    /// With a lens, the origin jitters over the aperture square while the
    /// plane target stays fixed, which focuses the focal plane.
    fn ray_through(&self, px: f32, py: f32, rng: &mut StdRng) -> Ray {
        let target = self.q + self.u * (self.su * px) - self.v * (self.sv * py);
        let origin = if self.aperture > 0.0 {
            let r1 = rng.gen::<f32>() - 0.5;
            let r2 = rng.gen::<f32>() - 0.5;
            self.eye + self.u * (r1 * self.aperture) + self.v * (r2 * self.aperture)
        } else {
            self.eye
        };
        Ray::new(origin, target - origin)
    }

    /// Estimate the color of pixel (x, y).
    pub fn sample_pixel(&self, shader: &Shader, x: u32, y: u32, rng: &mut StdRng) -> Vec3 {
        if self.samples <= 1 && self.aperture == 0.0 {
            let ray = self.ray_through(x as f32 + 0.5, y as f32 + 0.5, rng);
            return shader.shade(&ray, 0, rng);
        }

        let mut sum = Vec3::ZERO;
        let mut weight_sum = 0.0;

        for gy in 0..self.grid {
            for gx in 0..self.grid {
                let jx = (gx as f32 + rng.gen::<f32>()) / self.grid as f32;
                let jy = (gy as f32 + rng.gen::<f32>()) / self.grid as f32;

                // Gaussian reconstruction filter centered on the pixel.
                let dx = jx - 0.5;
                let dy = jy - 0.5;
                let weight = (1.0 / (2.0 * PI)) * (-(dx * dx + dy * dy) / 2.0).exp();

                let ray = self.ray_through(x as f32 + jx, y as f32 + jy, rng);
                sum += shader.shade(&ray, 0, rng) * weight;
                weight_sum += weight;
            }
        }

        sum / weight_sum
    }
}
