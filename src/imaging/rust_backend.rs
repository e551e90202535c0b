//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | Decode (PNG, JPEG, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Encode → PNG / WebP / TIFF | `image::RgbaImage::save_with_format` |
//!
//! Output is restricted to formats that store alpha losslessly; see
//! [`OutputFormat`].

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::OutputFormat;
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("webp", ImageFormat::WebP),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Backend using the `image` crate's decoders and encoders.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn to_image_format(format: OutputFormat) -> ImageFormat {
    match format {
        OutputFormat::Png => ImageFormat::Png,
        OutputFormat::WebP => ImageFormat::WebP,
        OutputFormat::Tiff => ImageFormat::Tiff,
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to read dimensions of {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Dimensions { width, height })
    }

    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!(
                    "Failed to decode {}: {}",
                    path.display(),
                    e
                ))
            })
    }

    fn save(&self, image: &RgbaImage, path: &Path) -> Result<(), BackendError> {
        let format = OutputFormat::from_path(path)
            .ok_or_else(|| BackendError::UnsupportedFormat(path.display().to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        image
            .save_with_format(path, to_image_format(format))
            .map_err(|e| {
                BackendError::ProcessingFailed(format!(
                    "Failed to encode {}: {}",
                    path.display(),
                    e
                ))
            })
    }
}
