//! Textures: map a surface parameterization to a color.

use crate::{Color, RenderResult};
use image::DynamicImage;
use lumen_math::Vec3;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Returned by an image texture whose pixels have not arrived yet.
pub const LOADING_COLOR: Color = Color::new(1.0, 0.0, 0.0);

/// A texture, sampled by surface (u, v) and world position.
#[derive(Clone)]
pub enum Texture {
    SolidColor(Color),
    Image(ImageTexture),
}

impl Texture {
    pub fn solid(color: Color) -> Self {
        Texture::SolidColor(color)
    }

    /// Color at surface coordinates `(u, v)` and point `p`.
    pub fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        match self {
            Texture::SolidColor(color) => *color,
            Texture::Image(image) => image.value(u, v, p),
        }
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Texture::SolidColor(color)
    }
}

impl From<ImageTexture> for Texture {
    fn from(image: ImageTexture) -> Self {
        Texture::Image(image)
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Decoded pixels in linear RGB, rows top to bottom.
struct ImageData {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl ImageData {
    fn from_image(image: &DynamicImage) -> Self {
        let rgb = image.to_rgb32f();
        let pixels = rgb
            .pixels()
            .map(|p| {
                Color::new(
                    srgb_to_linear(p.0[0]),
                    srgb_to_linear(p.0[1]),
                    srgb_to_linear(p.0[2]),
                )
            })
            .collect();

        Self {
            width: rgb.width() as usize,
            height: rgb.height() as usize,
            pixels,
        }
    }
}

/// Image-backed texture whose pixels may arrive after construction.
///
/// Clones share one backing store, so a texture handed to several materials
/// becomes ready everywhere at once. Until then [`LOADING_COLOR`] is returned.
#[derive(Clone, Default)]
pub struct ImageTexture {
    data: Arc<OnceLock<ImageData>>,
}

/// Write side of a pending [`ImageTexture`]. Publishes pixels once.
pub struct TextureLoader {
    data: Arc<OnceLock<ImageData>>,
}

impl TextureLoader {
    /// Make `image` visible to every clone of the texture.
    pub fn publish(self, image: &DynamicImage) {
        let data = ImageData::from_image(image);
        log::debug!("Texture ready ({}x{})", data.width, data.height);
        // The loader is consumed, so the cell can only be empty here
        let _ = self.data.set(data);
    }
}

impl ImageTexture {
    /// An empty texture plus the handle that will fill it.
    pub fn pending() -> (Self, TextureLoader) {
        let texture = Self::default();
        let loader = TextureLoader {
            data: texture.data.clone(),
        };
        (texture, loader)
    }

    /// A texture that is ready immediately.
    pub fn from_image(image: &DynamicImage) -> Self {
        let (texture, loader) = Self::pending();
        loader.publish(image);
        texture
    }

    /// Decode an image file on the calling thread.
    pub fn load(path: impl AsRef<Path>) -> RenderResult<Self> {
        let image = image::open(path.as_ref())?;
        Ok(Self::from_image(&image))
    }

    /// Decode an image file on a worker thread.
    ///
    /// The texture is usable right away and shows [`LOADING_COLOR`] until
    /// decoding finishes. A file that fails to decode is logged and the
    /// texture stays in its loading state.
    pub fn load_in_background(path: impl Into<PathBuf>) -> RenderResult<Self> {
        let path = path.into();
        let (texture, loader) = Self::pending();

        std::thread::Builder::new()
            .name("texture-decode".into())
            .spawn(move || match image::open(&path) {
                Ok(image) => loader.publish(&image),
                Err(e) => log::warn!("Failed to load texture {}: {}", path.display(), e),
            })?;

        Ok(texture)
    }

    pub fn is_loaded(&self) -> bool {
        self.data.get().is_some()
    }

    /// Image size in pixels, once loaded.
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.data.get().map(|d| (d.width, d.height))
    }

    /// Nearest-pixel lookup with repeating coordinates.
    pub fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        let Some(data) = self.data.get() else {
            return LOADING_COLOR;
        };
        if data.pixels.is_empty() {
            return LOADING_COLOR;
        }

        // Wrap into [0, 1); v is flipped because image rows run top-down
        let u = u.rem_euclid(1.0);
        let v = (-v).rem_euclid(1.0);

        let i = ((u * data.width as f32) as usize).min(data.width - 1);
        let j = ((v * data.height as f32) as usize).min(data.height - 1);

        data.pixels[j * data.width + i]
    }
}
