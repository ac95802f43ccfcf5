//! Sequential page rasterizer

use std::sync::Arc;

use super::encode::{encode_jpeg, PageImage};
use super::error::{RenderError, RenderResult};
use super::generation::LoadTicket;
use super::source::{PdfBackend, PdfDocument};
use super::{
    DEFAULT_DPI, DEFAULT_THUMB_WIDTH, PAGE_JPEG_QUALITY, PDF_POINTS_PER_INCH, THUMB_JPEG_QUALITY,
};

/// Rendering parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    pub dpi: f32,
    pub thumb_width: u32,
    pub page_quality: u8,
    pub thumb_quality: u8,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            thumb_width: DEFAULT_THUMB_WIDTH,
            page_quality: PAGE_JPEG_QUALITY,
            thumb_quality: THUMB_JPEG_QUALITY,
        }
    }
}

impl RasterOptions {
    /// Pixels per PDF point for full pages
    pub fn page_scale(&self) -> f32 {
        self.dpi / PDF_POINTS_PER_INCH
    }
}

/// Progress after a page, reported once per page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderProgress {
    pub done: usize,
    pub total: usize,
}

impl RenderProgress {
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        ((self.done as f64 / self.total as f64) * 100.0).round() as u32
    }

    /// Progress bar caption, e.g. `42% (5/12)`
    pub fn label(&self) -> String {
        format!("{}% ({}/{})", self.percent(), self.done, self.total)
    }
}

/// Full pages and thumbnails, index-aligned
///
/// Slot `i` of both sequences belongs to PDF page `i + 1`. A slot is `None`
/// when that page failed to render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageImageSet {
    pub pages: Vec<Option<PageImage>>,
    pub thumbs: Vec<Option<PageImage>>,
}

impl PageImageSet {
    fn with_len(len: usize) -> Self {
        Self {
            pages: vec![None; len],
            thumbs: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn page(&self, index: usize) -> Option<&PageImage> {
        self.pages.get(index).and_then(Option::as_ref)
    }

    pub fn thumb(&self, index: usize) -> Option<&PageImage> {
        self.thumbs.get(index).and_then(Option::as_ref)
    }
}

/// Result of rendering a whole document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOutcome {
    pub images: PageImageSet,
    /// 0-based indices of pages whose full image is missing
    pub failed_pages: Vec<usize>,
}

impl RenderOutcome {
    pub fn total(&self) -> usize {
        self.images.len()
    }

    pub fn rendered(&self) -> usize {
        self.total() - self.failed_pages.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed_pages.is_empty()
    }

    /// e.g. `11 of 12 pages rendered`
    pub fn summary(&self) -> String {
        format!("{} of {} pages rendered", self.rendered(), self.total())
    }
}

/// Renders documents through a [`PdfBackend`]
#[derive(Clone)]
pub struct Rasterizer {
    backend: Arc<dyn PdfBackend>,
    options: RasterOptions,
}

impl Rasterizer {
    pub fn new(backend: Arc<dyn PdfBackend>) -> Self {
        Self::with_options(backend, RasterOptions::default())
    }

    pub fn with_options(backend: Arc<dyn PdfBackend>, options: RasterOptions) -> Self {
        Self { backend, options }
    }

    pub fn options(&self) -> &RasterOptions {
        &self.options
    }

    /// Render every page of `data`
    ///
    /// Pages are processed strictly in order. `on_progress` runs after each
    /// page, failed or not, so it sees `done = 1..=total` exactly once each.
    /// A page failure is logged and leaves an empty slot; only an unopenable
    /// document or a superseded ticket fails the whole call.
    pub async fn render<F>(
        &self,
        data: Vec<u8>,
        ticket: &LoadTicket,
        mut on_progress: F,
    ) -> RenderResult<RenderOutcome>
    where
        F: FnMut(RenderProgress),
    {
        ticket.ensure_current()?;

        let backend = Arc::clone(&self.backend);
        let doc = tokio::task::spawn_blocking(move || backend.open(data))
            .await
            .map_err(|e| RenderError::Task(e.to_string()))??;

        let total = doc.page_count();
        let mut outcome = RenderOutcome {
            images: PageImageSet::with_len(total),
            failed_pages: Vec::new(),
        };

        tracing::info!(pages = total, dpi = self.options.dpi, "Rendering document");

        for index in 0..total {
            ticket.ensure_current()?;

            let page_doc = Arc::clone(&doc);
            let options = self.options;
            let rendered =
                tokio::task::spawn_blocking(move || render_page(page_doc.as_ref(), index, &options))
                    .await
                    .map_err(|e| RenderError::Task(e.to_string()))
                    .and_then(|r| r);

            match rendered {
                Ok((page, thumb)) => {
                    outcome.images.pages[index] = Some(page);
                    match thumb {
                        Ok(thumb) => outcome.images.thumbs[index] = Some(thumb),
                        Err(e) => tracing::warn!(page = index + 1, "Thumbnail render failed: {}", e),
                    }
                }
                Err(e) => {
                    tracing::error!(page = index + 1, "Render page error: {}", e);
                    outcome.failed_pages.push(index);
                }
            }

            on_progress(RenderProgress {
                done: index + 1,
                total,
            });

            // Let the UI draw the progress before the next page
            tokio::task::yield_now().await;
        }

        if outcome.is_complete() {
            tracing::info!("{}", outcome.summary());
        } else {
            tracing::warn!(failed = ?outcome.failed_pages, "{}", outcome.summary());
        }

        Ok(outcome)
    }
}

/// Full page plus thumbnail; a thumbnail failure does not lose the page
fn render_page(
    doc: &dyn PdfDocument,
    index: usize,
    options: &RasterOptions,
) -> RenderResult<(PageImage, RenderResult<PageImage>)> {
    let (full, thumb) =
        doc.render_with_thumbnail(index, options.page_scale(), options.thumb_width)?;
    let page = encode_jpeg(&full, options.page_quality)?;
    let thumb = thumb.and_then(|img| encode_jpeg(&img, options.thumb_quality));
    Ok((page, thumb))
}
