//! Pixel access for drawing surfaces.
//!
//! A [`Surface`] is anything the trimmer can read RGBA pixels from. Reading
//! may fail (a surface whose backing store is gone or locked); the trimmer
//! treats that as "leave the surface alone" rather than as an error.

use image::{DynamicImage, RgbaImage};
use std::borrow::Cow;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("pixel data unavailable: {0}")]
    Unavailable(String),
}

/// A raster with a top-left origin whose pixels can be read as RGBA8.
pub trait Surface {
    /// `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Row-major RGBA8 pixels. Borrowed when the surface already stores
    /// RGBA8, owned when a conversion was needed.
    fn pixels(&self) -> Result<Cow<'_, RgbaImage>, SurfaceError>;
}

impl Surface for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn pixels(&self) -> Result<Cow<'_, RgbaImage>, SurfaceError> {
        Ok(Cow::Borrowed(self))
    }
}

impl Surface for DynamicImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn pixels(&self) -> Result<Cow<'_, RgbaImage>, SurfaceError> {
        Ok(match self.as_rgba8() {
            Some(rgba) => Cow::Borrowed(rgba),
            None => Cow::Owned(self.to_rgba8()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn rgba_surface_borrows() {
        let img = canvas(3, 2);
        let pixels = Surface::pixels(&img).unwrap();
        assert!(matches!(pixels, Cow::Borrowed(_)));
        assert_eq!(Surface::dimensions(&img), (3, 2));
    }

    #[test]
    fn dynamic_rgba_borrows() {
        let img = DynamicImage::ImageRgba8(canvas(2, 2));
        assert!(matches!(Surface::pixels(&img).unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn dynamic_rgb_converts_to_opaque_rgba() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::new(2, 3));
        let pixels = Surface::pixels(&img).unwrap();
        assert!(matches!(pixels, Cow::Owned(_)));
        assert_eq!(pixels.dimensions(), (2, 3));
        assert!(pixels.pixels().all(|p| p[3] == 255));
    }
}
