//! Pixel output: the sink trait the renderer writes through, and an
//! in-memory image that implements it.

use crate::{Color, RenderResult};
use std::path::Path;

const GAMMA: f32 = 2.2;

/// Receives finished pixels in linear RGB.
///
/// Implementations own display encoding; the renderer never clamps.
pub trait PixelSink {
    fn put_pixel(&mut self, x: u32, y: u32, color: Color);
}

impl<F> PixelSink for F
where
    F: FnMut(u32, u32, Color),
{
    fn put_pixel(&mut self, x: u32, y: u32, color: Color) {
        self(x, y, color)
    }
}

/// Encode one linear channel: gamma 1/2.2, NaN and negatives to 0, clamp to 1.
#[inline]
fn encode_channel(linear: f32) -> u8 {
    if linear.is_nan() || linear <= 0.0 {
        return 0;
    }
    let encoded = linear.powf(1.0 / GAMMA).min(1.0);
    (255.0 * encoded).round() as u8
}

/// Convert a linear color to 8-bit RGBA for display.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    [
        encode_channel(color.x),
        encode_channel(color.y),
        encode_channel(color.z),
        255,
    ]
}

/// Simple image buffer for storing render output.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Linear pixels, row-major from the top-left corner.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Get the pixel at (x, y), if it is inside the image.
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set the pixel at (x, y). Writes outside the image are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let rgba: Vec<[u8; 4]> = self.pixels.iter().map(|c| color_to_rgba(*c)).collect();
        bytemuck::cast_slice(&rgba).to_vec()
    }

    /// Encode the image and write it to `path`; the format follows the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        image::save_buffer(
            path,
            &self.to_rgba(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
        )?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

impl PixelSink for ImageBuffer {
    fn put_pixel(&mut self, x: u32, y: u32, color: Color) {
        self.set(x, y, color);
    }
}
