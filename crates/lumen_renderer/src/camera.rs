//! Camera for ray generation.

use crate::{RenderError, RenderResult};
use lumen_math::random::{gen_f32, random_in_unit_disk};
use lumen_math::{Ray, Vec3, Vec3Ext};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// User-facing camera options.
///
/// Deserializes from camelCase JSON (`verticalFOV` for the field of view);
/// every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraConfig {
    pub width: u32,
    pub height: u32,
    /// Vertical field of view in degrees
    #[serde(rename = "verticalFOV", alias = "verticalFov")]
    pub vertical_fov: f32,
    pub samples_per_pixel: u32,
    /// Maximum number of bounces per path
    pub max_depth: u32,
    /// Distance to the plane of perfect focus. Defaults to |look_at - origin|.
    pub focus_distance: Option<f32>,
    /// Cone angle in degrees of rays through each pixel; 0 is a pinhole
    pub defocus_angle: f32,
    pub origin: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 225,
            vertical_fov: 40.0,
            samples_per_pixel: 16,
            max_depth: 10,
            focus_distance: None,
            defocus_angle: 0.0,
            origin: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::Y,
        }
    }
}

impl CameraConfig {
    /// Set image resolution.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, origin: Vec3, look_at: Vec3) -> Self {
        self.origin = origin;
        self.look_at = look_at;
        self
    }

    pub fn with_up(mut self, up: Vec3) -> Self {
        self.up = up;
        self
    }

    pub fn with_vertical_fov(mut self, degrees: f32) -> Self {
        self.vertical_fov = degrees;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, defocus_angle: f32, focus_distance: Option<f32>) -> Self {
        self.defocus_angle = defocus_angle;
        self.focus_distance = focus_distance;
        self
    }
}

/// Camera for generating rays into the scene.
///
/// All viewport geometry is derived once at construction.
#[derive(Debug, Clone)]
pub struct Camera {
    width: u32,
    height: u32,
    samples_per_pixel: u32,
    max_depth: u32,

    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,

    defocus_angle: f32,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

fn invalid(msg: impl Into<String>) -> RenderError {
    RenderError::InvalidCamera(msg.into())
}

impl Camera {
    /// Build a camera, rejecting configurations with no usable view.
    pub fn new(config: &CameraConfig) -> RenderResult<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(invalid(format!(
                "image size must be positive, got {}x{}",
                config.width, config.height
            )));
        }
        if config.samples_per_pixel == 0 {
            return Err(invalid("samples per pixel must be at least 1"));
        }
        if !(config.vertical_fov > 0.0 && config.vertical_fov < 180.0) {
            return Err(invalid(format!(
                "vertical field of view must be in (0, 180) degrees, got {}",
                config.vertical_fov
            )));
        }

        let forward = config.look_at - config.origin;
        let look_distance = forward.length();
        if !(look_distance > 0.0 && look_distance.is_finite()) {
            return Err(invalid("origin and look-at point must differ"));
        }

        // Basis: w points backwards, u right, v up
        let w = -forward / look_distance;
        let right = config.up.cross(w);
        if right.length_squared() < 1e-12 || !right.is_finite() {
            return Err(invalid("view direction is parallel to the up vector"));
        }
        let u = right.normalize();
        let v = w.cross(u);

        let focus_dist = config.focus_distance.unwrap_or(look_distance);
        if !(focus_dist > 0.0 && focus_dist.is_finite()) {
            return Err(invalid(format!(
                "focus distance must be positive, got {focus_dist}"
            )));
        }

        // Calculate viewport dimensions
        let h = (config.vertical_fov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h * focus_dist;
        let viewport_width = viewport_height * (config.width as f32 / config.height as f32);

        // Rows run top to bottom, so the vertical edge points down
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        let pixel_delta_u = viewport_u / config.width as f32;
        let pixel_delta_v = viewport_v / config.height as f32;

        let viewport_upper_left =
            config.origin - focus_dist * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        let defocus_angle = config.defocus_angle.max(0.0);
        let defocus_radius = focus_dist * (defocus_angle / 2.0).to_radians().tan();

        Ok(Self {
            width: config.width,
            height: config.height,
            samples_per_pixel: config.samples_per_pixel,
            max_depth: config.max_depth,
            center: config.origin,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            u,
            v,
            w,
            defocus_angle,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Camera frame as (right, up, backward).
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }

    /// World position of the center of pixel (i, j) on the focus plane.
    pub fn pixel_center(&self, i: u32, j: u32) -> Vec3 {
        self.pixel00_loc + (i as f32) * self.pixel_delta_u + (j as f32) * self.pixel_delta_v
    }

    /// Generate a ray for pixel (i, j) with random sampling.
    ///
    /// The sample point is jittered across the pixel footprint and the
    /// returned direction is unit length.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);

        let pixel_sample = self.pixel00_loc
            + ((i as f32) + offset.x) * self.pixel_delta_u
            + ((j as f32) + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        let ray_direction = (pixel_sample - ray_origin).unit_or(-self.w);
        Ray::new(ray_origin, ray_direction)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}

/// Sample a random point in the square [-0.5, 0.5] x [-0.5, 0.5].
fn sample_square(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::new(gen_f32(rng) - 0.5, gen_f32(rng) - 0.5, 0.0)
}
