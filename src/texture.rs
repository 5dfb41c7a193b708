use std::path::Path;

use anyhow::{Context, Result};
use glam::{Vec2, Vec4};
use image::{imageops, Rgba, RgbaImage};

use crate::shading::Sampler;

/// CPU-side RGBA8 texture.
///
/// Rows are stored bottom-up so that `v = 0` addresses the bottom of the
/// picture, the same layout the GPU texture is uploaded with.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pixels: RgbaImage,
}

impl TextureImage {
    /// Loads an image file in any format the `image` crate decodes.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .with_context(|| format!("failed to load texture {}", path.display()))?
            .to_rgba8();
        if image.width() == 0 || image.height() == 0 {
            anyhow::bail!("texture {} has no pixels", path.display());
        }
        log::info!(
            "loaded texture {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self::from_image(image))
    }

    /// Wraps a picture whose first row is the top of the image. An empty
    /// picture samples as transparent black.
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            pixels: imageops::flip_vertical(&image),
        }
    }

    /// A `size` x `size` checkerboard with `cell`-pixel squares.
    pub fn checkerboard(size: u32, cell: u32, a: [u8; 4], b: [u8; 4]) -> Self {
        let cell = cell.max(1);
        let pixels = RgbaImage::from_fn(size.max(1), size.max(1), |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Rgba(a)
            } else {
                Rgba(b)
            }
        });
        Self { pixels }
    }

    /// A single-texel texture.
    pub fn solid(color: [u8; 4]) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(1, 1, Rgba(color)),
        }
    }

    /// Default floor texture: grass-green checkerboard.
    pub fn default_floor() -> Self {
        Self::checkerboard(64, 8, [96, 160, 72, 255], [80, 136, 60, 255])
    }

    /// Default wall texture: brown checkerboard.
    pub fn default_wall() -> Self {
        Self::checkerboard(64, 16, [150, 110, 70, 255], [128, 92, 58, 255])
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Raw RGBA8 bytes, bottom row first.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    fn texel(coord: f32, size: u32) -> u32 {
        let index = (coord * size as f32).floor();
        if index.is_nan() || index < 0.0 {
            0
        } else {
            (index as u32).min(size.saturating_sub(1))
        }
    }
}

impl Sampler for TextureImage {
    /// Nearest texel, clamped to the edge.
    fn sample(&self, tex_coords: Vec2) -> Vec4 {
        if self.width() == 0 || self.height() == 0 {
            return Vec4::ZERO;
        }
        let x = Self::texel(tex_coords.x, self.width());
        let y = Self::texel(tex_coords.y, self.height());
        let Rgba([r, g, b, a]) = *self.pixels.get_pixel(x, y);
        Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn solid_texture_samples_everywhere() {
        let tex = TextureImage::solid([255, 0, 51, 255]);
        for uv in [Vec2::ZERO, Vec2::ONE, Vec2::new(-3.0, 7.0)] {
            assert_relative_eq!(tex.sample(uv), Vec4::new(1.0, 0.0, 0.2, 1.0));
        }
    }

    #[test]
    fn bottom_of_picture_is_v_zero() {
        let mut image = RgbaImage::from_pixel(1, 2, Rgba([0, 0, 0, 255]));
        image.put_pixel(0, 1, Rgba([255, 255, 255, 255]));
        let tex = TextureImage::from_image(image);
        assert_eq!(tex.sample(Vec2::new(0.5, 0.1)), Vec4::ONE);
        assert_eq!(tex.sample(Vec2::new(0.5, 0.9)), Vec4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn checkerboard_alternates() {
        let tex = TextureImage::checkerboard(4, 2, [255; 4], [0, 0, 0, 255]);
        assert_eq!(tex.sample(Vec2::new(0.1, 0.1)), Vec4::ONE);
        assert_eq!(tex.sample(Vec2::new(0.6, 0.1)).x, 0.0);
        assert_eq!(tex.sample(Vec2::new(0.6, 0.6)), Vec4::ONE);
    }

    #[test]
    fn alpha_is_kept() {
        let tex = TextureImage::solid([255, 255, 255, 0]);
        assert_eq!(tex.sample(Vec2::ZERO).w, 0.0);
    }

    #[test]
    fn empty_image_samples_transparent() {
        let tex = TextureImage::from_image(RgbaImage::new(0, 0));
        assert_eq!(tex.sample(Vec2::new(0.5, 0.5)), Vec4::ZERO);
        assert_eq!(tex.sample(Vec2::ONE), Vec4::ZERO);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = TextureImage::load("/definitely/not/here.png").unwrap_err();
        assert!(format!("{err:#}").contains("failed to load texture"));
    }
}
