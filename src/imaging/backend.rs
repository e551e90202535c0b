//! Image file backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the three file operations the trim
//! pipeline needs: identify, load and save. The production implementation
//! is [`RustBackend`](super::rust_backend::RustBackend); tests use the
//! in-memory `MockBackend` below so operation logic runs without touching
//! the filesystem.

use image::{DynamicImage, RgbaImage};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("Invalid job: {0}")]
    InvalidJob(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn of(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }
}

/// Trait for image file backends.
///
/// `Sync` so one backend can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Get image dimensions without decoding pixel data where possible.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode an image file.
    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Encode `image` to `path`, choosing the format from the extension.
    fn save(&self, image: &RgbaImage, path: &Path) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory backend: "files" live in a map keyed by path.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        pub files: Mutex<HashMap<String, DynamicImage>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Load(String),
        Save {
            path: String,
            width: u32,
            height: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_file(self, path: &str, image: impl Into<DynamicImage>) -> Self {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_string(), image.into());
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn saved(&self, path: &str) -> Option<RgbaImage> {
            self.files.lock().unwrap().get(path).map(|i| i.to_rgba8())
        }

        fn lookup(&self, path: &Path) -> Result<DynamicImage, BackendError> {
            self.files
                .lock()
                .unwrap()
                .get(path.to_string_lossy().as_ref())
                .cloned()
                .ok_or_else(|| {
                    BackendError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("no mock file {}", path.display()),
                    ))
                })
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));
            let image = self.lookup(path)?;
            Ok(Dimensions {
                width: image.width(),
                height: image.height(),
            })
        }

        fn load(&self, path: &Path) -> Result<DynamicImage, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Load(path.to_string_lossy().to_string()));
            self.lookup(path)
        }

        fn save(&self, image: &RgbaImage, path: &Path) -> Result<(), BackendError> {
            let key = path.to_string_lossy().to_string();
            self.operations.lock().unwrap().push(RecordedOp::Save {
                path: key.clone(),
                width: image.width(),
                height: image.height(),
            });
            self.files
                .lock()
                .unwrap()
                .insert(key, DynamicImage::ImageRgba8(image.clone()));
            Ok(())
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::new().with_file("/in/logo.png", RgbaImage::new(800, 600));

        let result = backend.identify(Path::new("/in/logo.png")).unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/in/logo.png"));
    }

    #[test]
    fn mock_missing_file_is_io_error() {
        let backend = MockBackend::new();
        let err = backend.load(Path::new("/nope.png")).unwrap_err();
        assert!(matches!(err, BackendError::Io(_)));
    }

    #[test]
    fn mock_save_is_loadable() {
        let backend = MockBackend::new();
        backend
            .save(&RgbaImage::new(3, 2), Path::new("/out.png"))
            .unwrap();

        assert_eq!(backend.saved("/out.png").unwrap().dimensions(), (3, 2));
        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Save {
                width: 3,
                height: 2,
                ..
            }
        ));
    }
}
