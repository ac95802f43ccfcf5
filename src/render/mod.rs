//! PDF rasterization
//!
//! Converts a PDF into two parallel image sequences: full pages for the
//! flipbook and thumbnails for the filmstrip.
//!
//! # Design
//!
//! - `PdfBackend` / `PdfDocument`: the engine seam. `MuPdfBackend` implements it
//!   behind the `mupdf` feature.
//! - `Rasterizer`: renders pages strictly in order, one at a time, yielding to
//!   the runtime between pages so progress reaches the UI.
//! - `LoadGeneration`: a newer document load supersedes any in-flight render.

pub mod encode;
pub mod error;
pub mod generation;
#[cfg(feature = "mupdf")]
pub mod mupdf_backend;
pub mod rasterizer;
pub mod source;

pub use encode::{encode_jpeg, PageImage};
pub use error::{RenderError, RenderResult};
pub use generation::{LoadGeneration, LoadTicket};
pub use rasterizer::{PageImageSet, RasterOptions, Rasterizer, RenderOutcome, RenderProgress};
pub use source::{PageSize, PdfBackend, PdfDocument};
#[cfg(feature = "mupdf")]
pub use mupdf_backend::MuPdfBackend;

/// Target resolution of full pages
pub const DEFAULT_DPI: f32 = 150.0;

/// PDF user space resolution
pub const PDF_POINTS_PER_INCH: f32 = 72.0;

/// Thumbnail width in pixels; height follows the page aspect ratio
pub const DEFAULT_THUMB_WIDTH: u32 = 240;

/// JPEG quality of full pages (0-100)
pub const PAGE_JPEG_QUALITY: u8 = 92;

/// JPEG quality of thumbnails (0-100)
pub const THUMB_JPEG_QUALITY: u8 = 85;
