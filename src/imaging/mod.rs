//! Image trimming in pure Rust, built on the `image` crate.
//!
//! | Operation | Where |
//! |---|---|
//! | **Bounding box** | [`bounding_box`]: one row-major pass over alpha |
//! | **Trim** | [`trim`]: crop to the box, or hand back the input untouched |
//! | **Load / save** | [`RustBackend`] (PNG, JPEG, WebP, TIFF in; PNG, WebP, TIFF out) |
//! | **Trim files** | [`trim_file`], [`trim_files`] (rayon) |
//!
//! The module is split into:
//! - **Bounding box + trim**: pure functions over RGBA buffers (unit testable)
//! - **Surface**: [`Surface`] trait for pixel access that may be unavailable
//! - **Parameters**: data structures describing file jobs
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: high-level functions combining trim + backend

pub mod backend;
mod bbox;
pub mod operations;
mod params;
pub mod rust_backend;
mod surface;
mod trim;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use bbox::{BoundingBox, bounding_box};
pub use operations::{TrimOutcome, check_jobs, plan_output_path, trim_file, trim_files};
pub use params::{OutputFormat, TrimJob};
pub use rust_backend::RustBackend;
pub use surface::{Surface, SurfaceError};
pub use trim::{Trimmed, trim, trim_rgba};
