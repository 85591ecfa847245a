//! Lumen math - vectors, intervals, rays and bounding boxes.
//!
//! Everything here is a small `Copy` value type. Vector arithmetic comes
//! from glam; the ray-tracing specific helpers live in [`Vec3Ext`] and the
//! [`random`] module.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod error;
mod interval;
mod onb;
mod ray;
pub mod random;
mod vec;

pub use aabb::Aabb;
pub use error::{MathError, MathResult};
pub use interval::Interval;
pub use onb::Onb;
pub use ray::Ray;
pub use vec::Vec3Ext;

/// Colors share the vector representation (linear RGB).
pub type Color = Vec3;
