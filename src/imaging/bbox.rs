//! Bounding box of the opaque region of a raster.
//!
//! All functions here are pure: they read an RGBA buffer and return
//! coordinates, without allocating image data.

use image::RgbaImage;

/// Pixel-inclusive rectangle: `left..=right` × `top..=bottom`.
///
/// Only ever produced with `top <= bottom` and `left <= right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub top: u32,
    pub left: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BoundingBox {
    /// Box covering a single pixel.
    fn at(x: u32, y: u32) -> Self {
        Self {
            top: y,
            left: x,
            right: x,
            bottom: y,
        }
    }

    /// Box covering an entire `width` × `height` raster.
    ///
    /// Returns `None` for a zero-sized raster.
    pub fn full(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            top: 0,
            left: 0,
            right: width - 1,
            bottom: height - 1,
        })
    }

    /// Grow the box to include `(x, y)`.
    ///
    /// Pixels arrive in row-major order, so `y` is never above `top` and
    /// `top` stays where the first opaque pixel put it.
    fn extended(mut self, x: u32, y: u32) -> Self {
        debug_assert!(y >= self.top, "row-major scan never revisits earlier rows");
        if x < self.left {
            self.left = x;
        }
        if x > self.right {
            self.right = x;
        }
        if y > self.bottom {
            self.bottom = y;
        }
        self
    }

    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.left..=self.right).contains(&x) && (self.top..=self.bottom).contains(&y)
    }

    /// True when the box spans the whole `width` × `height` raster.
    pub fn covers(&self, width: u32, height: u32) -> bool {
        Self::full(width, height) == Some(*self)
    }
}

/// Find the tightest box containing every pixel with non-zero alpha.
///
/// Scans once in increasing linear pixel index (row 0 first, left to right
/// within each row). Returns `None` when no pixel is opaque, including for
/// zero-sized images.
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use sigtrim::imaging::bounding_box;
///
/// let mut img = RgbaImage::new(8, 8);
/// img.put_pixel(2, 3, Rgba([0, 0, 0, 255]));
/// img.put_pixel(5, 6, Rgba([0, 0, 0, 255]));
///
/// let bbox = bounding_box(&img).unwrap();
/// assert_eq!((bbox.left, bbox.top, bbox.right, bbox.bottom), (2, 3, 5, 6));
/// assert_eq!((bbox.width(), bbox.height()), (4, 4));
/// ```
pub fn bounding_box(image: &RgbaImage) -> Option<BoundingBox> {
    let width = image.width() as usize;
    if width == 0 {
        return None;
    }

    // The container may be longer than the image; only the first
    // width * height pixels belong to it.
    let len = width * image.height() as usize * 4;
    let mut bbox: Option<BoundingBox> = None;
    for (index, pixel) in image.as_raw()[..len].chunks_exact(4).enumerate() {
        if pixel[3] == 0 {
            continue;
        }
        let x = (index % width) as u32;
        let y = (index / width) as u32;
        bbox = Some(match bbox {
            None => BoundingBox::at(x, y),
            Some(current) => current.extended(x, y),
        });
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn transparent_canvas_has_no_box() {
        assert_eq!(bounding_box(&canvas(6, 4)), None);
    }

    #[test]
    fn zero_sized_canvas_has_no_box() {
        assert_eq!(bounding_box(&canvas(0, 0)), None);
        assert_eq!(bounding_box(&canvas(0, 5)), None);
        assert_eq!(bounding_box(&canvas(5, 0)), None);
    }

    #[test]
    fn single_pixel_box() {
        let mut img = canvas(5, 5);
        img.put_pixel(3, 1, RED);

        let bbox = bounding_box(&img).unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                top: 1,
                left: 3,
                right: 3,
                bottom: 1
            }
        );
        assert_eq!((bbox.width(), bbox.height()), (1, 1));
    }

    #[test]
    fn top_is_fixed_by_first_opaque_pixel() {
        // First hit is on row 0 at the far right; later rows pull left and
        // bottom outward but must not move top.
        let mut img = canvas(6, 6);
        img.put_pixel(4, 0, RED);
        img.put_pixel(0, 2, BLUE);
        img.put_pixel(2, 5, RED);

        let bbox = bounding_box(&img).unwrap();
        assert_eq!(bbox.top, 0);
        assert_eq!(bbox.left, 0);
        assert_eq!(bbox.right, 4);
        assert_eq!(bbox.bottom, 5);
    }

    #[test]
    fn left_tightens_on_later_rows() {
        let mut img = canvas(8, 8);
        img.put_pixel(6, 2, RED);
        img.put_pixel(1, 4, RED);

        let bbox = bounding_box(&img).unwrap();
        assert_eq!((bbox.left, bbox.right), (1, 6));
        assert_eq!((bbox.top, bbox.bottom), (2, 4));
    }

    #[test]
    fn any_nonzero_alpha_counts_as_opaque() {
        let mut img = canvas(4, 4);
        img.put_pixel(2, 2, image::Rgba([0, 0, 0, 1]));
        assert!(bounding_box(&img).is_some());
    }

    #[test]
    fn color_without_alpha_is_ignored() {
        let mut img = canvas(4, 4);
        img.put_pixel(1, 1, image::Rgba([255, 255, 255, 0]));
        assert_eq!(bounding_box(&img), None);
    }

    #[test]
    fn bytes_past_the_last_pixel_are_ignored() {
        let mut raw = vec![0u8; 2 * 2 * 4];
        raw.extend_from_slice(&[255, 0, 0, 255]);
        let img = RgbaImage::from_raw(2, 2, raw).unwrap();
        assert_eq!(img.pixels().count(), 4);
        assert_eq!(bounding_box(&img), None);
    }

    #[test]
    fn box_from_oversized_container_stays_in_bounds() {
        let mut raw = vec![0u8; 3 * 2 * 4];
        // Alpha of pixel (2, 1).
        raw[5 * 4 + 3] = 255;
        raw.extend_from_slice(&[255; 8]);
        let img = RgbaImage::from_raw(3, 2, raw).unwrap();
        let bbox = bounding_box(&img).unwrap();
        assert_eq!((bbox.left, bbox.top, bbox.right, bbox.bottom), (2, 1, 2, 1));
    }

    #[test]
    fn fully_opaque_box_covers_canvas() {
        let img = filled(7, 3, RED);
        let bbox = bounding_box(&img).unwrap();
        assert!(bbox.covers(7, 3));
        assert!(!bbox.covers(7, 4));
    }

    #[test]
    fn full_rejects_zero_size() {
        assert_eq!(BoundingBox::full(0, 3), None);
        assert_eq!(BoundingBox::full(2, 3).unwrap().height(), 3);
    }

    #[test]
    fn contains_is_inclusive() {
        let bbox = BoundingBox {
            top: 1,
            left: 2,
            right: 4,
            bottom: 3,
        };
        assert!(bbox.contains(2, 1));
        assert!(bbox.contains(4, 3));
        assert!(!bbox.contains(5, 3));
        assert!(!bbox.contains(3, 0));
    }
}
