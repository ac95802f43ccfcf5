//! MuPDF rendering backend
//!
//! MuPDF documents are not thread-safe and its context is per thread, while
//! the rasterizer hands pages to whichever blocking thread is free. So this
//! backend keeps only the document bytes and opens a fresh document for each
//! operation, serializing access through a mutex.

use std::sync::Arc;

use image::RgbaImage;
use mupdf::{Colorspace, Document, Matrix, Page};
use parking_lot::Mutex;

use super::error::{RenderError, RenderResult};
use super::source::{thumb_scale, PageSize, PdfBackend, PdfDocument};

const PDF_MAGIC: &str = "application/pdf";

impl From<mupdf::Error> for RenderError {
    fn from(err: mupdf::Error) -> Self {
        RenderError::Page(err.to_string())
    }
}

/// Opens PDFs with MuPDF
#[derive(Debug, Clone, Copy, Default)]
pub struct MuPdfBackend;

impl PdfBackend for MuPdfBackend {
    fn open(&self, data: Vec<u8>) -> RenderResult<Arc<dyn PdfDocument>> {
        let doc = MuPdfDocument::from_bytes(data)?;
        Ok(Arc::new(doc))
    }
}

/// Thread-safe MuPDF document
pub struct MuPdfDocument {
    data: Arc<Vec<u8>>,
    page_count: usize,
    _lock: Mutex<()>,
}

// SAFETY: no MuPDF handle is stored. Every operation opens its own
// `Document` on the calling thread inside `with_doc`, under `_lock`, and the
// handle never escapes the closure.
unsafe impl Send for MuPdfDocument {}
unsafe impl Sync for MuPdfDocument {}

impl MuPdfDocument {
    pub fn from_bytes(data: Vec<u8>) -> RenderResult<Self> {
        let doc = Document::from_bytes(&data, PDF_MAGIC)
            .map_err(|e| RenderError::Open(e.to_string()))?;
        let page_count = doc
            .page_count()
            .map_err(|e| RenderError::Open(e.to_string()))? as usize;

        Ok(Self {
            data: Arc::new(data),
            page_count,
            _lock: Mutex::new(()),
        })
    }

    fn with_doc<F, R>(&self, f: F) -> RenderResult<R>
    where
        F: FnOnce(&Document) -> RenderResult<R>,
    {
        let _guard = self._lock.lock();
        let doc = Document::from_bytes(&self.data, PDF_MAGIC)?;
        f(&doc)
    }

    fn check_index(&self, index: usize) -> RenderResult<()> {
        if index >= self.page_count {
            return Err(RenderError::PageNotFound(index));
        }
        Ok(())
    }
}

impl PdfDocument for MuPdfDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_size(&self, index: usize) -> RenderResult<PageSize> {
        self.check_index(index)?;
        self.with_doc(|doc| page_size(&doc.load_page(index as i32)?))
    }

    fn render(&self, index: usize, scale: f32) -> RenderResult<RgbaImage> {
        self.check_index(index)?;
        self.with_doc(|doc| render_at(&doc.load_page(index as i32)?, scale))
    }

    /// One document parse and page load for both images
    fn render_with_thumbnail(
        &self,
        index: usize,
        scale: f32,
        thumb_width: u32,
    ) -> RenderResult<(RgbaImage, RenderResult<RgbaImage>)> {
        self.check_index(index)?;
        self.with_doc(|doc| {
            let page = doc.load_page(index as i32)?;
            let full = render_at(&page, scale)?;
            let thumb = page_size(&page)
                .and_then(|size| thumb_scale(index, size, thumb_width))
                .and_then(|thumb| render_at(&page, thumb));
            Ok((full, thumb))
        })
    }
}

fn page_size(page: &Page) -> RenderResult<PageSize> {
    let bounds = page.bounds()?;
    Ok(PageSize {
        width: bounds.x1 - bounds.x0,
        height: bounds.y1 - bounds.y0,
    })
}

fn render_at(page: &Page, scale: f32) -> RenderResult<RgbaImage> {
    let matrix = Matrix::new_scale(scale, scale);
    let colorspace = Colorspace::device_rgb();
    // Opaque pixmap: MuPDF paints the white page background
    let pixmap = page.to_pixmap(&matrix, &colorspace, false, true)?;
    pixmap_to_rgba(&pixmap)
}

fn pixmap_to_rgba(pixmap: &mupdf::Pixmap) -> RenderResult<RgbaImage> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;

    let mut rgba_buffer = Vec::with_capacity((width * height * 4) as usize);

    for y in 0..height as usize {
        for x in 0..width as usize {
            let offset = (y * width as usize + x) * n;
            let r = samples.get(offset).copied().unwrap_or(0);
            let g = samples.get(offset + 1).copied().unwrap_or(0);
            let b = samples.get(offset + 2).copied().unwrap_or(0);
            let a = if n >= 4 {
                samples.get(offset + 3).copied().unwrap_or(255)
            } else {
                255
            };
            rgba_buffer.extend_from_slice(&[r, g, b, a]);
        }
    }

    RgbaImage::from_raw(width, height, rgba_buffer)
        .ok_or_else(|| RenderError::Image("Failed to create image buffer".to_string()))
}
