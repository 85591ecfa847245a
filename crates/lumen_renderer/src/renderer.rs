//! Core path tracing.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing up to a maximum depth
//! - Emission from lights plus attenuated scattered light
//! - Anti-aliasing via multi-sampling

use crate::{Camera, Color, Hittable};
use lumen_math::{Interval, Ray, Vec3Ext};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Radiance returned by rays that leave the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Background {
    /// White at the horizon blending to light blue overhead
    SkyGradient,
    Solid { color: Color },
}

impl Background {
    pub fn color(&self, ray: &Ray) -> Color {
        match self {
            Background::SkyGradient => sky_gradient(ray),
            Background::Solid { color } => *color,
        }
    }
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    /// Background radiance for rays that miss everything
    pub background: Background,
    /// Intersections closer than this are ignored to avoid self-hits
    pub ray_epsilon: f32,
    /// Coarsest progressive pass visits every n-th pixel
    pub initial_stride: u32,
    /// Pixels rendered between cooperative yields
    pub pixels_per_yield: u32,
    /// Fixed seed for reproducible renders; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: Background::SkyGradient,
            ray_epsilon: 1e-3,
            initial_stride: 3,
            pixels_per_yield: 256,
            seed: None,
        }
    }
}

impl RenderConfig {
    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    pub fn with_initial_stride(mut self, stride: u32) -> Self {
        self.initial_stride = stride;
        self
    }

    pub fn with_pixels_per_yield(mut self, pixels: u32) -> Self {
        self.pixels_per_yield = pixels;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Compute the color seen by a ray.
///
/// `depth` counts the intersections already made along this path, starting
/// at 0. Once it exceeds `max_depth` the path contributes no light, so a
/// path gets `max_depth + 1` intersections in total.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    max_depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    if depth > max_depth {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(config.ray_epsilon, f32::INFINITY)) else {
        return config.background.color(ray);
    };

    let emission = rec.material.emitted(rec.u, rec.v, rec.p);
    let result = rec.material.scatter(ray, &rec, rng);

    match result.scattered {
        Some(scattered) => {
            let incoming = ray_color(&scattered, world, depth + 1, max_depth, config, rng);
            emission + result.attenuation * incoming
        }
        None => emission,
    }
}

/// Compute sky gradient background.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().unit_or(lumen_math::Vec3::Y);
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Render a single pixel, averaging the camera's samples per pixel.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let samples = camera.samples_per_pixel().max(1);
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        let ray = camera.get_ray(x, y, rng);
        pixel_color += ray_color(&ray, world, 0, camera.max_depth(), config, rng);
    }

    pixel_color / samples as f32
}
