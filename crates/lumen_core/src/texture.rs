//! Texture sampling.
//!
//! The renderer consumes textures through `sample(u, v)` and the bump
//! perturbation helper; what backs them is opaque to the core. An image
//! texture is an in-memory pixel buffer (decoding image files is the
//! loader's job), a checkerboard is procedural.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// How a sampled texture color combines with the material's diffuse term.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecalMode {
    /// Texture replaces the diffuse reflectance
    ReplaceKd,
    /// Texture is averaged with the diffuse reflectance
    BlendKd,
    /// Texture replaces the whole shading result, bypassing lighting
    ReplaceAll,
}

/// Wrapping behavior outside [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Appearance {
    Repeat,
    Clamp,
}

/// Image filtering mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    Nearest,
    Bilinear,
}

/// Backing data of a texture.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TextureData {
    /// Row-major pixel buffer, colors in [0, 255] range as loaded
    Image {
        width: u32,
        height: u32,
        pixels: Vec<Vec3>,
        interpolation: Interpolation,
    },
    /// Procedural checkerboard over the UV plane
    Checkerboard {
        scale: f32,
        offset: f32,
        black: Vec3,
        white: Vec3,
    },
}

/// A texture plus the modes that control how it is applied.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Texture {
    pub data: TextureData,
    pub decal_mode: DecalMode,
    pub appearance: Appearance,
    /// Divisor applied when the sampled color replaces or blends into kd
    pub normalizer: f32,
    /// Whether this texture perturbs the shading normal
    pub bump: bool,
    pub bump_multiplier: f32,
}

impl Texture {
    /// Create an image-backed texture with default modes.
    pub fn image(width: u32, height: u32, pixels: Vec<Vec3>) -> Self {
        Self {
            data: TextureData::Image {
                width,
                height,
                pixels,
                interpolation: Interpolation::Bilinear,
            },
            decal_mode: DecalMode::ReplaceKd,
            appearance: Appearance::Repeat,
            normalizer: 255.0,
            bump: false,
            bump_multiplier: 1.0,
        }
    }

    /// Create a black/white checkerboard with default modes.
    pub fn checkerboard(scale: f32) -> Self {
        Self {
            data: TextureData::Checkerboard {
                scale,
                offset: 0.0,
                black: Vec3::ZERO,
                white: Vec3::splat(255.0),
            },
            decal_mode: DecalMode::ReplaceKd,
            appearance: Appearance::Repeat,
            normalizer: 255.0,
            bump: false,
            bump_multiplier: 1.0,
        }
    }

    /// Sample the texture color at (u, v).
    pub fn sample(&self, u: f32, v: f32) -> Vec3 {
        let (u, v) = self.wrap(u, v);
        match &self.data {
            TextureData::Image {
                width,
                height,
                pixels,
                interpolation,
            } => sample_image(*width, *height, pixels, *interpolation, u, v),
            TextureData::Checkerboard {
                scale,
                offset,
                black,
                white,
            } => {
                let x = ((u + offset) * scale).floor() as i32;
                let y = ((v + offset) * scale).floor() as i32;
                if (x + y) % 2 == 0 {
                    *black
                } else {
                    *white
                }
            }
        }
    }

    /// Perturb a shading normal from the local height variation of this
    /// texture, given the surface partial derivatives w.r.t. (u, v).
    /// Falls back to the unperturbed normal when the parameterization is
    /// degenerate.
    pub fn bump_normal(&self, normal: Vec3, u: f32, v: f32, dpdu: Vec3, dpdv: Vec3) -> Vec3 {
        if dpdu == Vec3::ZERO || dpdv == Vec3::ZERO {
            return normal;
        }

        let (du, dv) = self.gradient_step();
        let h0 = self.height(u, v);
        let gu = (self.height(u + du, v) - h0) * self.bump_multiplier;
        let gv = (self.height(u, v + dv) - h0) * self.bump_multiplier;

        let qu = dpdu + gu * normal;
        let qv = dpdv + gv * normal;
        let perturbed = qv.cross(qu).normalize_or_zero();
        if perturbed == Vec3::ZERO {
            return normal;
        }
        if perturbed.dot(normal) < 0.0 {
            -perturbed
        } else {
            perturbed
        }
    }

    fn gradient_step(&self) -> (f32, f32) {
        match &self.data {
            TextureData::Image { width, height, .. } => {
                (1.0 / (*width).max(1) as f32, 1.0 / (*height).max(1) as f32)
            }
            TextureData::Checkerboard { .. } => (1e-3, 1e-3),
        }
    }

    /// Scalar height used for bump gradients: mean channel over normalizer.
    fn height(&self, u: f32, v: f32) -> f32 {
        let c = self.sample(u, v);
        (c.x + c.y + c.z) / (3.0 * self.normalizer)
    }

    fn wrap(&self, u: f32, v: f32) -> (f32, f32) {
        match self.appearance {
            Appearance::Repeat => (u - u.floor(), v - v.floor()),
            Appearance::Clamp => (u.clamp(0.0, 1.0), v.clamp(0.0, 1.0)),
        }
    }
}

fn sample_image(
    width: u32,
    height: u32,
    pixels: &[Vec3],
    interpolation: Interpolation,
    u: f32,
    v: f32,
) -> Vec3 {
    if width == 0 || height == 0 || pixels.is_empty() {
        return Vec3::ZERO;
    }

    let fetch = |x: u32, y: u32| -> Vec3 {
        let x = x.min(width - 1);
        let y = y.min(height - 1);
        pixels[(y * width + x) as usize]
    };

    let x = u * (width - 1) as f32;
    let y = v * (height - 1) as f32;

    match interpolation {
        Interpolation::Nearest => fetch(x.round() as u32, y.round() as u32),
        Interpolation::Bilinear => {
            let x0 = x.floor();
            let y0 = y.floor();
            let fx = x - x0;
            let fy = y - y0;
            let x0 = x0 as u32;
            let y0 = y0 as u32;

            let c00 = fetch(x0, y0);
            let c10 = fetch(x0 + 1, y0);
            let c01 = fetch(x0, y0 + 1);
            let c11 = fetch(x0 + 1, y0 + 1);

            c00 * (1.0 - fx) * (1.0 - fy)
                + c10 * fx * (1.0 - fy)
                + c01 * (1.0 - fx) * fy
                + c11 * fx * fy
        }
    }
}
