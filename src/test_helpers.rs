//! Shared test utilities for the sigtrim test suite.
//!
//! Raster builders for the imaging tests: transparent canvases, solid
//! fills, and rectangles painted pixel by pixel.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut img = canvas(4, 4);
//! fill_rect(&mut img, 1, 1, 2, 2, |_, _| RED);
//! assert_eq!(bounding_box(&img).unwrap().width(), 2);
//! ```

use image::{Rgba, RgbaImage};

// =========================================================================
// Colors
// =========================================================================

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

// =========================================================================
// Canvas builders
// =========================================================================

/// Fully transparent `width` × `height` canvas.
pub fn canvas(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, TRANSPARENT)
}

/// Canvas where every pixel is `color`.
pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width, height, color)
}

/// Paint a `w` × `h` rectangle with its top-left corner at `(x0, y0)`.
///
/// `paint` receives offsets relative to the rectangle, so tests can give
/// every pixel a distinct color and check the crop kept them in place.
/// Panics if the rectangle does not fit.
pub fn fill_rect(
    img: &mut RgbaImage,
    x0: u32,
    y0: u32,
    w: u32,
    h: u32,
    paint: impl Fn(u32, u32) -> Rgba<u8>,
) {
    assert!(
        x0 + w <= img.width() && y0 + h <= img.height(),
        "rect {w}x{h} at ({x0}, {y0}) exceeds {}x{} canvas",
        img.width(),
        img.height()
    );
    for y in 0..h {
        for x in 0..w {
            img.put_pixel(x0 + x, y0 + y, paint(x, y));
        }
    }
}
