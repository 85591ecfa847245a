//! Drives a render by hand with `RenderTask::step`.
//!
//! Renders a small glass/metal/diffuse sphere scene, printing progress
//! between steps, and saves it in PPM format.

use lumen_renderer::{
    color_to_rgba, BvhNode, Camera, CameraConfig, Color, Dielectric, Hittable, ImageBuffer,
    Lambertian, Metal, RenderConfig, RenderResult, Sphere, Step, Vec3,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

fn main() -> RenderResult<()> {
    let world = build_scene()?;

    let config = CameraConfig::default()
        .with_size(320, 180)
        .with_quality(16, 8)
        .with_position(Vec3::new(0.0, 1.0, 4.0), Vec3::new(0.0, 0.5, 0.0))
        .with_vertical_fov(35.0);
    let camera = Camera::new(&config)?;

    let mut image = ImageBuffer::new(camera.width(), camera.height());
    let mut task = camera.render(&world, RenderConfig::default().with_pixels_per_yield(4096));

    let summary = loop {
        match task.step(&mut image) {
            Step::Pending => println!("stride {}...", task.stride()),
            Step::Finished(summary) => break summary,
        }
    };
    println!(
        "{} pixels, {} passes in {:?}",
        summary.pixels_written, summary.passes_completed, summary.elapsed
    );

    save_ppm(&image, "step_render.ppm")?;
    println!("Saved to step_render.ppm");
    Ok(())
}

fn build_scene() -> RenderResult<BvhNode> {
    let objects: Vec<Arc<dyn Hittable>> = vec![
        // Ground
        Arc::new(Sphere::new(
            Vec3::new(0.0, -1000.0, 0.0),
            1000.0,
            Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5))),
        )),
        Arc::new(Sphere::new(
            Vec3::new(0.0, 0.5, 0.0),
            0.5,
            Arc::new(Dielectric::new(1.5)),
        )),
        Arc::new(Sphere::new(
            Vec3::new(-1.1, 0.5, 0.0),
            0.5,
            Arc::new(Lambertian::new(Color::new(0.4, 0.2, 0.1))),
        )),
        Arc::new(Sphere::new(
            Vec3::new(1.1, 0.5, 0.0),
            0.5,
            Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.05)),
        )),
    ];

    BvhNode::new(objects)
}

fn save_ppm(image: &ImageBuffer, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width(), image.height())?;
    writeln!(writer, "255")?;

    for color in image.pixels() {
        let rgba = color_to_rgba(*color);
        writeln!(writer, "{} {} {}", rgba[0], rgba[1], rgba[2])?;
    }

    Ok(())
}
