//! # sigtrim
//!
//! Crops signature and logo rasters to the smallest rectangle that holds all
//! of their non-transparent pixels, with the diagnostics and log-feed plumbing
//! the drawing tools around it rely on.
//!
//! # Architecture
//!
//! ```text
//! file ──load──▶ DynamicImage ──Surface──▶ bounding_box ──crop──▶ RgbaImage ──save──▶ file
//! ```
//!
//! The trim itself is a pure function over a [`imaging::Surface`]: it never
//! fails and never mutates its input. A fully transparent image, or a surface
//! whose pixels cannot be read, comes back as [`imaging::Trimmed::Unchanged`]
//! borrowing the input. File I/O lives behind [`imaging::ImageBackend`] so the
//! load/trim/save path can be tested in memory.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Bounding box scan, trim, pixel surfaces, file backend and batch operations |
//! | [`diagnostics`] | `tracing` capture sink, ring buffer, key-value persistence, scoped install |
//! | [`feed`] | Realtime log feed: records, RAII subscriptions, console rendering |
//! | [`config`] | `config.toml` loading, merging onto stock defaults, validation |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## Logging Through `tracing`
//!
//! Nothing replaces global output functions. Code logs with the `tracing`
//! macros, and [`diagnostics::Diagnostics::install`] registers sinks for the
//! current scope: a stderr formatter and a capture layer feeding a bounded
//! in-memory buffer. Dropping the returned guard writes the newest entries to
//! a [`diagnostics::KeyValueStore`] and puts the previous panic hook back.
//!
//! ## Subscriptions Release Themselves
//!
//! A [`feed::Subscription`] unsubscribes in `Drop`, so leaving its scope by
//! return, `?` or unwinding all release it.
//!
//! ## Outputs Are Always Written
//!
//! `sigtrim trim` writes an output file for every input it could decode, even
//! when nothing was cropped, so scripts can rely on the output path existing.

pub mod config;
pub mod diagnostics;
pub mod feed;
pub mod imaging;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
