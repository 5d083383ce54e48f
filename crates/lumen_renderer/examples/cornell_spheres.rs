//! Cornell-box example.
//!
//! Renders a box with a mirror and a glass sphere under an area light and
//! saves the result as a PNG.

use anyhow::Context;
use lumen_core::{
    Camera, Light, Material, Mesh, NearPlane, Object, Scene, ShadingMode, Surface,
};
use lumen_math::Vec3;
use lumen_renderer::render;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let scene = build_scene();
    let camera = &scene.cameras[0];

    let image = render(&scene, camera)?;

    image::save_buffer(
        &camera.image_name,
        &image.to_rgba8(),
        image.width(),
        image.height(),
        image::ColorType::Rgba8,
    )
    .with_context(|| format!("saving {}", camera.image_name))?;

    println!("Saved {}", camera.image_name);
    Ok(())
}

fn build_scene() -> Scene {
    let mut scene = Scene::new("cornell_spheres");
    scene.ambient_light = Vec3::splat(0.05);
    scene.max_recursion_depth = 6;

    let white = scene.add_material(Material::diffuse(Vec3::splat(0.73)));
    let red = scene.add_material(Material::diffuse(Vec3::new(0.65, 0.05, 0.05)));
    let green = scene.add_material(Material::diffuse(Vec3::new(0.12, 0.45, 0.15)));

    let mut mirror = Material::diffuse(Vec3::splat(0.05));
    mirror.mirror = Vec3::splat(0.9);
    mirror.specular = Vec3::splat(0.5);
    mirror.phong_exponent = 200.0;
    let mirror = scene.add_material(mirror);

    let mut glass = Material::diffuse(Vec3::ZERO);
    glass.transparency = Vec3::splat(0.95);
    glass.refraction_index = 1.5;
    let glass = scene.add_material(glass);

    // Box interior, 10 units on a side, open toward the camera.
    let s = 5.0;
    quad(
        &mut scene,
        white,
        [
            Vec3::new(-s, -s, -2.0 * s),
            Vec3::new(s, -s, -2.0 * s),
            Vec3::new(s, -s, 0.0),
            Vec3::new(-s, -s, 0.0),
        ],
    );
    quad(
        &mut scene,
        white,
        [
            Vec3::new(-s, s, 0.0),
            Vec3::new(s, s, 0.0),
            Vec3::new(s, s, -2.0 * s),
            Vec3::new(-s, s, -2.0 * s),
        ],
    );
    quad(
        &mut scene,
        white,
        [
            Vec3::new(-s, -s, -2.0 * s),
            Vec3::new(-s, s, -2.0 * s),
            Vec3::new(s, s, -2.0 * s),
            Vec3::new(s, -s, -2.0 * s),
        ],
    );
    quad(
        &mut scene,
        red,
        [
            Vec3::new(-s, -s, 0.0),
            Vec3::new(-s, s, 0.0),
            Vec3::new(-s, s, -2.0 * s),
            Vec3::new(-s, -s, -2.0 * s),
        ],
    );
    quad(
        &mut scene,
        green,
        [
            Vec3::new(s, -s, -2.0 * s),
            Vec3::new(s, s, -2.0 * s),
            Vec3::new(s, s, 0.0),
            Vec3::new(s, -s, 0.0),
        ],
    );

    scene.add_object(Object::new(
        Surface::Sphere {
            center: Vec3::new(-2.0, -3.0, -7.0),
            radius: 2.0,
        },
        mirror,
    ));
    scene.add_object(Object::new(
        Surface::Sphere {
            center: Vec3::new(2.2, -3.5, -4.5),
            radius: 1.5,
        },
        glass,
    ));

    scene.add_light(Light::Area {
        position: Vec3::new(-1.5, 4.9, -6.5),
        intensity: Vec3::splat(180.0),
        edge_u: Vec3::new(3.0, 0.0, 0.0),
        edge_v: Vec3::new(0.0, 0.0, 3.0),
    });

    scene.add_camera(
        Camera::new(
            Vec3::new(0.0, 0.0, 9.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::Y,
        )
        .with_near_plane(NearPlane::symmetric(1.0, 1.0), 2.0)
        .with_resolution(600, 600)
        .with_samples(16),
    );
    scene.cameras[0].image_name = String::from("cornell_spheres.png");

    scene
}

/// Add a quad as a two-triangle mesh object. Vertices wind
/// counter-clockwise as seen from inside the box.
fn quad(scene: &mut Scene, material: usize, corners: [Vec3; 4]) -> usize {
    let mesh = scene.add_mesh(Mesh::new(
        corners.to_vec(),
        vec![0, 1, 2, 0, 2, 3],
        ShadingMode::Flat,
    ));
    scene.add_object(Object::new(Surface::Mesh { mesh }, material))
}
