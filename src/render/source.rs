//! Rendering engine seam

use std::sync::Arc;

use image::RgbaImage;

use super::error::{RenderError, RenderResult};

/// Page size in PDF points (1/72 inch)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// Opens documents for rendering
pub trait PdfBackend: Send + Sync {
    /// Open a document from its bytes
    fn open(&self, data: Vec<u8>) -> RenderResult<Arc<dyn PdfDocument>>;
}

/// An opened document
///
/// Implementations serialize access internally; the rasterizer never calls
/// into the same document from two threads at once, but it may call from
/// different blocking threads over time.
pub trait PdfDocument: Send + Sync {
    fn page_count(&self) -> usize;

    /// Unscaled page size
    fn page_size(&self, index: usize) -> RenderResult<PageSize>;

    /// Rasterize page `index` at `scale` pixels per point
    fn render(&self, index: usize, scale: f32) -> RenderResult<RgbaImage>;

    /// Full page at `scale` plus a thumbnail `thumb_width` pixels wide
    ///
    /// The thumbnail has its own result so that its failure keeps the page.
    /// Engines that pay per call for loading a page should override this.
    fn render_with_thumbnail(
        &self,
        index: usize,
        scale: f32,
        thumb_width: u32,
    ) -> RenderResult<(RgbaImage, RenderResult<RgbaImage>)> {
        let full = self.render(index, scale)?;
        let thumb = self
            .page_size(index)
            .and_then(|size| thumb_scale(index, size, thumb_width))
            .and_then(|thumb| self.render(index, thumb));
        Ok((full, thumb))
    }
}

/// Scale that makes page `index` exactly `thumb_width` pixels wide
pub fn thumb_scale(index: usize, size: PageSize, thumb_width: u32) -> RenderResult<f32> {
    if size.width <= 0.0 {
        return Err(RenderError::Page(format!("Page {} has zero width", index + 1)));
    }
    Ok(thumb_width as f32 / size.width)
}
