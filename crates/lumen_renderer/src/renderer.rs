//! Top-level render driver: builds the world once per scene, then fills a
//! flat row-major RGB buffer per camera through the band scheduler.

use std::time::Instant;

use lumen_core::{Camera, Scene, SceneError};
use lumen_math::Vec3;

use crate::sampler::PixelSampler;
use crate::scheduler;
use crate::shading::Shader;
use crate::world::World;

/// A rendered image, linear RGB, row-major from the top-left pixel.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Vec3>,
}

impl ImageBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec3::ZERO; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Vec3] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Vec3 {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Vec3) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Convert to 8-bit RGBA. Output stays linear; channels clamp to
    /// [0, 255] with no tone mapping.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*pixel));
        }
        bytes
    }
}

/// Clamp a linear color into an RGBA byte quad, alpha fully opaque.
pub fn color_to_rgba(color: Vec3) -> [u8; 4] {
    let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [
        quantize(color.x),
        quantize(color.y),
        quantize(color.z),
        255,
    ]
}

/// Render one camera's view of the scene.
pub fn render(scene: &Scene, camera: &Camera) -> Result<ImageBuffer, SceneError> {
    let world = World::build(scene)?;
    render_with_world(scene, &world, camera)
}

/// Render one camera against an already built world. Lets multi-camera
/// scenes share the acceleration structures.
pub fn render_with_world(
    scene: &Scene,
    world: &World,
    camera: &Camera,
) -> Result<ImageBuffer, SceneError> {
    let shader = Shader::new(scene, world);
    let sampler = PixelSampler::new(camera);

    log::info!(
        "rendering '{}' at {}x{}, {} samples, {} triangles",
        camera.image_name,
        camera.image_width,
        camera.image_height,
        camera.num_samples,
        scene.triangle_count()
    );

    let start = Instant::now();
    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
    scheduler::render_bands(
        &mut image.pixels,
        camera.image_width,
        camera.image_height,
        scene.seed,
        |x, y, rng| sampler.sample_pixel(&shader, x, y, rng),
    );

    log::info!(
        "rendered '{}' in {:.2}s",
        camera.image_name,
        start.elapsed().as_secs_f32()
    );
    Ok(image)
}
