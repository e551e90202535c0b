//! Parameter types for file-level trim operations.
//!
//! These describe *what* to do: which file to read, where to write, and in
//! which encoding. The [`backend`](super::backend) decides *how*.

use std::path::{Path, PathBuf};

/// Output encodings the backend can write. All of them keep the alpha
/// channel losslessly, which a trimmed signature or logo depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    WebP,
    Tiff,
}

impl OutputFormat {
    /// Infer the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            "tif" | "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Tiff => "tiff",
        }
    }
}

/// One file to trim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimJob {
    pub source: PathBuf,
    pub output: PathBuf,
}

impl TrimJob {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
        }
    }
}
