//! Crop a surface to its opaque region.
//!
//! [`trim`] is total: a fully transparent surface, or one whose pixels
//! cannot be read, comes back as [`Trimmed::Unchanged`] pointing at the
//! caller's own value. Everything else is copied into a fresh
//! [`RgbaImage`] that shares nothing with the source.

use super::bbox::{BoundingBox, bounding_box};
use super::surface::{Surface, SurfaceError};
use image::{RgbaImage, imageops};
use std::borrow::Cow;

/// Result of [`trim`].
#[derive(Debug)]
pub enum Trimmed<'a, S: ?Sized> {
    /// Nothing to crop; this is the input itself, not a copy.
    Unchanged(&'a S),
    /// Newly allocated raster holding exactly `bbox` of the source.
    Cropped { image: RgbaImage, bbox: BoundingBox },
}

impl<S: ?Sized> Trimmed<'_, S> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Trimmed::Unchanged(_))
    }

    /// True when a new raster was produced. A fully opaque source still
    /// yields a (same-sized) copy.
    pub fn was_trimmed(&self) -> bool {
        !self.is_unchanged()
    }

    /// Source rectangle the crop was taken from.
    pub fn bbox(&self) -> Option<BoundingBox> {
        match self {
            Trimmed::Unchanged(_) => None,
            Trimmed::Cropped { bbox, .. } => Some(*bbox),
        }
    }

    pub fn cropped(&self) -> Option<&RgbaImage> {
        match self {
            Trimmed::Unchanged(_) => None,
            Trimmed::Cropped { image, .. } => Some(image),
        }
    }
}

impl<'a, S: Surface + ?Sized> Trimmed<'a, S> {
    /// Dimensions of whichever raster this result holds.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Trimmed::Unchanged(source) => source.dimensions(),
            Trimmed::Cropped { image, .. } => (image.width(), image.height()),
        }
    }

    /// The resulting pixels: the crop when there is one, otherwise the
    /// source's own pixels (borrowed when it already stores RGBA8).
    ///
    /// Fails only when the source is unchanged because its pixels could
    /// not be read.
    pub fn into_rgba(self) -> Result<Cow<'a, RgbaImage>, SurfaceError> {
        match self {
            Trimmed::Unchanged(source) => source.pixels(),
            Trimmed::Cropped { image, .. } => Ok(Cow::Owned(image)),
        }
    }
}

/// Crop `source` to the smallest rectangle holding every non-transparent pixel.
///
/// Runs in one pass over the pixels and then copies the region out. Large
/// surfaces take proportionally long; callers on an interactive thread
/// should run this on a worker.
pub fn trim<S: Surface + ?Sized>(source: &S) -> Trimmed<'_, S> {
    let pixels = match source.pixels() {
        Ok(pixels) => pixels,
        Err(e) => {
            tracing::debug!("Leaving surface untrimmed: {e}");
            return Trimmed::Unchanged(source);
        }
    };

    match bounding_box(&pixels) {
        None => Trimmed::Unchanged(source),
        Some(bbox) => Trimmed::Cropped {
            image: crop(&pixels, bbox),
            bbox,
        },
    }
}

/// [`trim`] for a plain buffer: borrowed when untouched, owned when cropped.
pub fn trim_rgba(image: &RgbaImage) -> Cow<'_, RgbaImage> {
    // Reading an `RgbaImage` cannot fail.
    trim(image).into_rgba().unwrap_or(Cow::Borrowed(image))
}

/// Copy `bbox` out of `image` into a new buffer placed at (0, 0).
fn crop(image: &RgbaImage, bbox: BoundingBox) -> RgbaImage {
    debug_assert!(
        bbox.right < image.width() && bbox.bottom < image.height(),
        "{bbox:?} outside {}x{} raster",
        image.width(),
        image.height()
    );
    imageops::crop_imm(image, bbox.left, bbox.top, bbox.width(), bbox.height()).to_image()
}
