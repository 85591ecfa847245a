//! Error types for scene and camera construction.
//!
//! Everything that can go wrong during rendering itself (degenerate
//! vectors, parallel rays, textures still loading) is recovered locally
//! and never shows up here.

use lumen_math::MathError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid camera configuration: {0}")]
    InvalidCamera(String),

    #[error("Cannot build a BVH over an empty scene")]
    EmptyScene,

    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("Image decoding error: {0}")]
    Texture(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;
