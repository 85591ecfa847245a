//! Lumen renderer - progressive CPU path tracing.
//!
//! A Monte Carlo path tracer for physically-based rendering. Scenes are
//! built once from shared primitives ([`Sphere`], [`Quad`]) and materials,
//! optionally wrapped in a [`BvhNode`], then rendered through a [`Camera`]
//! by a cooperative [`RenderTask`] that refines the image pass by pass and
//! can be cancelled at any time through its [`RenderHandle`].

mod bvh;
mod camera;
mod cook_torrance;
mod error;
mod hittable;
mod image_buffer;
mod material;
mod progressive;
mod quad;
mod renderer;
mod sphere;
mod texture;

pub use bvh::BvhNode;
pub use camera::{Camera, CameraConfig};
pub use cook_torrance::CookTorrance;
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use image_buffer::{color_to_rgba, ImageBuffer, PixelSink};
pub use material::{Dielectric, DiffuseLight, Lambertian, Material, Metal, ScatterResult};
pub use progressive::{
    yield_now, RenderHandle, RenderSession, RenderStatus, RenderSummary, RenderTask, Step,
};
pub use quad::Quad;
pub use renderer::{ray_color, render_pixel, sky_gradient, Background, RenderConfig};
pub use sphere::Sphere;
pub use texture::{ImageTexture, Texture, TextureLoader, LOADING_COLOR};

/// Re-export the math types scenes are built from
pub use lumen_math::{Aabb, Color, Interval, Ray, Vec3};
