//! Flipbook viewer
//!
//! Presentation-independent viewer state. A [`Viewer`] owns the site
//! configuration, the rendered page images and the interactive pieces
//! (navigator, zoom, filmstrip, session). UI bindings feed it input events
//! and read its state back; nothing here touches a display.
//!
//! # Design
//!
//! - `FlipNavigator`: current page and single/two-page mode
//! - `ZoomPan`: scale and translation of the page area
//! - `SessionStore`: last page per document, in a key/value store
//! - `Filmstrip`: thumbnail buttons with one active entry
//! - `ResizeDebouncer`: trailing-edge viewport resize coalescing
//!
//! Document loads are tagged with a [`LoadTicket`]; a load that finishes
//! after a newer one started is discarded.

pub mod filmstrip;
pub mod keyboard;
pub mod navigator;
pub mod resize;
pub mod session;
pub mod zoom;

pub use filmstrip::{Filmstrip, ScrollRequest, ThumbButton};
pub use keyboard::ViewerCommand;
pub use navigator::{DisplayMode, FlipNavigator, NavigatorError, NavigatorEvent, ToolbarState};
pub use resize::{flip_height, ResizeDebouncer, Viewport, RESIZE_DEBOUNCE};
pub use session::{DocumentKey, FileStore, KeyValueStore, MemoryStore, SessionStore};
pub use zoom::{ViewTransform, ZoomPan};

use reqwest::{header, Client, Url};
use thiserror::Error;

use crate::render::{
    LoadGeneration, LoadTicket, Rasterizer, RenderError, RenderOutcome, RenderProgress,
};
use crate::site::{config_path_from_query, BrandView, ConfigError, ConfigLoader, SiteConfig, UiTexts};

/// File name used when the PDF URL has no last path segment
pub const DEFAULT_DOCUMENT_NAME: &str = "documento.pdf";

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("HTTP {0}")]
    Http(u16),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// The document currently shown
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub key: DocumentKey,
    pub outcome: RenderOutcome,
}

/// Viewer state for one page view
pub struct Viewer {
    config: Option<SiteConfig>,
    brand: BrandView,
    texts: UiTexts,
    rasterizer: Rasterizer,
    generation: LoadGeneration,
    sessions: SessionStore,
    viewport: Viewport,
    zoom: ZoomPan,
    document: Option<LoadedDocument>,
    navigator: Option<FlipNavigator>,
    filmstrip: Filmstrip,
    fullscreen: bool,
    progress: Option<RenderProgress>,
    pending_scroll: Option<ScrollRequest>,
}

impl std::fmt::Debug for Viewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("viewport", &self.viewport)
            .field("document", &self.document.as_ref().map(|d| d.key.as_str()))
            .field("navigator", &self.navigator)
            .field("zoom", &self.zoom)
            .field("fullscreen", &self.fullscreen)
            .finish_non_exhaustive()
    }
}

impl Viewer {
    pub fn new(
        config: Option<SiteConfig>,
        rasterizer: Rasterizer,
        sessions: SessionStore,
        viewport: Viewport,
    ) -> Self {
        let brand = BrandView::from_config(config.as_ref());
        let texts = UiTexts::resolve(config.as_ref());

        Self {
            config,
            brand,
            texts,
            rasterizer,
            generation: LoadGeneration::new(),
            sessions,
            viewport,
            zoom: ZoomPan::new(viewport.width, viewport.flip_height()),
            document: None,
            navigator: None,
            filmstrip: Filmstrip::default(),
            fullscreen: false,
            progress: None,
            pending_scroll: None,
        }
    }

    /// Page-load sequence: configuration, then the configured PDF
    ///
    /// `query` is the page's query string; `cfg=<path>` selects another
    /// configuration file. The PDF location only ever comes from the
    /// configuration. Failures are logged and leave an empty viewer.
    pub async fn bootstrap(
        loader: &ConfigLoader,
        query: Option<&str>,
        rasterizer: Rasterizer,
        sessions: SessionStore,
        viewport: Viewport,
    ) -> Self {
        let config_path = config_path_from_query(query);
        let config = loader.load(&config_path).await;
        let mut viewer = Self::new(config, rasterizer, sessions, viewport);

        let pdf_url = SiteConfig::pdf_url_or_default(viewer.config.as_ref());
        let result = match loader.resolve(&pdf_url) {
            Ok(url) => viewer.open_url(loader.client(), url).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            tracing::error!(url = %pdf_url, "Error preloading PDF: {}", e);
        }

        viewer
    }

    /// Download a PDF and load it
    pub async fn open_url(&mut self, client: &Client, url: Url) -> Result<(), ViewerError> {
        let name = document_name(&url);
        tracing::info!(url = %url, "Fetching PDF");

        let response = client
            .get(url)
            .header(header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ViewerError::Http(status.as_u16()));
        }

        let data = response.bytes().await?.to_vec();
        self.load_document(&name, data).await
    }

    pub async fn load_document(&mut self, name: &str, data: Vec<u8>) -> Result<(), ViewerError> {
        self.load_document_with_progress(name, data, |_| {}).await
    }

    /// Render `data` and show it, reporting per-page progress
    pub async fn load_document_with_progress<F>(
        &mut self,
        name: &str,
        data: Vec<u8>,
        mut on_progress: F,
    ) -> Result<(), ViewerError>
    where
        F: FnMut(RenderProgress),
    {
        let key = DocumentKey::new(name, data.len());
        let ticket = self.begin_load();
        let rasterizer = self.rasterizer.clone();

        let mut last = None;
        let outcome = rasterizer
            .render(data, &ticket, |progress| {
                last = Some(progress);
                on_progress(progress);
            })
            .await?;
        self.progress = last;

        self.finish_load(&ticket, key, outcome)
    }

    /// Start a load, superseding any in flight
    pub fn begin_load(&self) -> LoadTicket {
        self.generation.begin()
    }

    /// Install a finished render
    ///
    /// The navigator starts at the page restored from the session, the
    /// filmstrip is rebuilt and its active thumbnail centered. Outcomes of
    /// superseded loads are dropped.
    pub fn finish_load(
        &mut self,
        ticket: &LoadTicket,
        key: DocumentKey,
        outcome: RenderOutcome,
    ) -> Result<(), ViewerError> {
        if !ticket.is_current() {
            tracing::debug!(document = %key, ticket = ticket.id(), "Discarding superseded load");
            return Err(RenderError::Superseded.into());
        }

        let start_index = self
            .sessions
            .restore(&key)
            .map(|page| page - 1)
            .unwrap_or(0);

        self.filmstrip = Filmstrip::build(&outcome.images, &self.texts);
        self.navigator = match FlipNavigator::new(outcome.total(), start_index, self.viewport.width)
        {
            Ok(navigator) => Some(navigator),
            Err(e) => {
                tracing::warn!(document = %key, "Nothing to show: {}", e);
                None
            }
        };
        if let Some(navigator) = &self.navigator {
            self.pending_scroll = self.filmstrip.set_active(navigator.current_index(), true);
        }

        tracing::info!(
            document = %key,
            pages = outcome.total(),
            start_page = start_index + 1,
            "Document ready"
        );

        self.document = Some(LoadedDocument { key, outcome });
        Ok(())
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn next_page(&mut self) -> bool {
        let event = self.navigator.as_mut().and_then(FlipNavigator::turn_next);
        self.apply_event(event)
    }

    pub fn prev_page(&mut self) -> bool {
        let event = self.navigator.as_mut().and_then(FlipNavigator::turn_prev);
        self.apply_event(event)
    }

    /// Turn to a 0-based page index
    pub fn go_to_index(&mut self, index: usize) -> bool {
        let event = self.navigator.as_mut().and_then(|nav| nav.turn_to(index));
        self.apply_event(event)
    }

    /// Turn to a page number typed into the toolbar
    pub fn go_to_page_input(&mut self, input: &str) -> bool {
        let event = self
            .navigator
            .as_mut()
            .and_then(|nav| nav.turn_to_page_input(input));
        self.apply_event(event)
    }

    pub fn click_thumb(&mut self, index: usize) -> bool {
        match self.filmstrip.click(index) {
            Some(index) => self.go_to_index(index),
            None => false,
        }
    }

    /// Handle a key press; returns whether it did anything
    ///
    /// Keys are ignored until a document is shown.
    pub fn handle_key(&mut self, key: &str) -> bool {
        if self.navigator.is_none() {
            return false;
        }
        let Some(command) = ViewerCommand::from_key(key) else {
            return false;
        };

        match command {
            ViewerCommand::NextPage => self.next_page(),
            ViewerCommand::PrevPage => self.prev_page(),
            ViewerCommand::ZoomIn => {
                self.zoom.zoom_in();
                true
            }
            ViewerCommand::ZoomOut => {
                self.zoom.zoom_out();
                true
            }
            ViewerCommand::ZoomDigit(digit) => {
                self.zoom.set_from_digit(digit);
                true
            }
            ViewerCommand::ToggleFullscreen => {
                self.toggle_fullscreen();
                true
            }
            ViewerCommand::Escape => {
                if self.fullscreen {
                    self.fullscreen = false;
                    true
                } else if self.zoom.is_zoomed() {
                    self.zoom.set_zoom(zoom::ZOOM_MIN);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Apply a (debounced) viewport change
    pub fn on_viewport_resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.zoom.set_container(viewport.width, viewport.flip_height());

        let event = self
            .navigator
            .as_mut()
            .and_then(|nav| nav.on_resize(viewport.width));
        self.apply_event(event);
    }

    fn apply_event(&mut self, event: Option<NavigatorEvent>) -> bool {
        match event {
            Some(NavigatorEvent::Flip { index }) => {
                self.filmstrip.set_active(index, false);
                if let Some(document) = &self.document {
                    self.sessions.save(&document.key, index + 1);
                }
                true
            }
            Some(NavigatorEvent::StateChanged { index, .. }) => {
                self.filmstrip.set_active(index, false);
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn config(&self) -> Option<&SiteConfig> {
        self.config.as_ref()
    }

    pub fn brand(&self) -> &BrandView {
        &self.brand
    }

    pub fn texts(&self) -> &UiTexts {
        &self.texts
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    pub fn navigator(&self) -> Option<&FlipNavigator> {
        self.navigator.as_ref()
    }

    pub fn toolbar(&self) -> Option<ToolbarState> {
        self.navigator.as_ref().map(FlipNavigator::toolbar)
    }

    /// Page counter text, e.g. "Página 3 de 12"
    pub fn page_info(&self) -> Option<String> {
        self.toolbar()
            .map(|t| self.texts.page_info(t.current_page, t.page_count))
    }

    pub fn filmstrip(&self) -> &Filmstrip {
        &self.filmstrip
    }

    /// Scroll the filmstrip wants performed, if any
    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.pending_scroll.take()
    }

    pub fn zoom(&self) -> &ZoomPan {
        &self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut ZoomPan {
        &mut self.zoom
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Progress of the last completed render
    pub fn progress(&self) -> Option<RenderProgress> {
        self.progress
    }

    /// Shared generation counter; `begin()` on a clone supersedes loads here
    pub fn generation(&self) -> &LoadGeneration {
        &self.generation
    }

    pub fn rasterizer(&self) -> &Rasterizer {
        &self.rasterizer
    }
}

/// Last path segment of `url`, or the default document name
pub fn document_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DOCUMENT_NAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{PageImage, PageImageSet};

    fn viewer(width: f32) -> Viewer {
        Viewer::new(
            None,
            test_rasterizer(),
            SessionStore::default(),
            Viewport::new(width, 900.0),
        )
    }

    /// Loads in these tests go through `finish_load` directly
    fn test_rasterizer() -> Rasterizer {
        use crate::render::{PdfBackend, PdfDocument, RenderResult};
        use std::sync::Arc;

        struct Unused;
        impl PdfBackend for Unused {
            fn open(&self, _data: Vec<u8>) -> RenderResult<Arc<dyn PdfDocument>> {
                Err(RenderError::Open("unused".into()))
            }
        }
        Rasterizer::new(Arc::new(Unused))
    }

    fn outcome(pages: usize) -> RenderOutcome {
        let image = PageImage {
            data: vec![0xFF, 0xD8],
            width: 10,
            height: 10,
        };
        RenderOutcome {
            images: PageImageSet {
                pages: vec![Some(image.clone()); pages],
                thumbs: vec![Some(image); pages],
            },
            failed_pages: Vec::new(),
        }
    }

    fn loaded(width: f32, pages: usize) -> Viewer {
        let mut viewer = viewer(width);
        let ticket = viewer.begin_load();
        viewer
            .finish_load(&ticket, DocumentKey::new("doc.pdf", 100), outcome(pages))
            .unwrap();
        viewer
    }

    #[test]
    fn test_finish_load_builds_state() {
        let mut viewer = loaded(600.0, 4);

        assert_eq!(viewer.navigator().unwrap().page_count(), 4);
        assert_eq!(viewer.filmstrip().len(), 4);
        assert_eq!(viewer.filmstrip().active(), Some(0));
        assert_eq!(
            viewer.take_scroll_request(),
            Some(ScrollRequest {
                index: 0,
                center: true
            })
        );
        assert_eq!(viewer.take_scroll_request(), None);
        assert_eq!(viewer.page_info().as_deref(), Some("Página 1 de 4"));
    }

    #[test]
    fn test_stale_outcome_discarded() {
        let mut viewer = viewer(600.0);
        let stale = viewer.begin_load();
        let fresh = viewer.begin_load();

        let result = viewer.finish_load(&stale, DocumentKey::new("old.pdf", 1), outcome(9));
        assert!(matches!(result, Err(ViewerError::Render(RenderError::Superseded))));
        assert!(viewer.navigator().is_none());

        viewer
            .finish_load(&fresh, DocumentKey::new("new.pdf", 2), outcome(2))
            .unwrap();
        assert_eq!(viewer.navigator().unwrap().page_count(), 2);
        assert_eq!(viewer.document().unwrap().key.as_str(), "new.pdf|2");
    }

    #[test]
    fn test_flip_saves_session_and_marks_thumb() {
        let sessions = SessionStore::default();
        let mut viewer = Viewer::new(None, test_rasterizer(), sessions, Viewport::new(600.0, 900.0));
        let ticket = viewer.begin_load();
        let key = DocumentKey::new("doc.pdf", 100);
        viewer.finish_load(&ticket, key.clone(), outcome(5)).unwrap();

        assert!(viewer.next_page());
        assert!(viewer.go_to_page_input("4"));
        assert_eq!(viewer.filmstrip().active(), Some(3));
        assert_eq!(viewer.sessions.restore(&key), Some(4));

        // Reloading the same document resumes there
        let ticket = viewer.begin_load();
        viewer.finish_load(&ticket, key, outcome(5)).unwrap();
        assert_eq!(viewer.navigator().unwrap().current_index(), 3);
    }

    #[test]
    fn test_keys_ignored_without_document() {
        let mut viewer = viewer(600.0);
        assert!(!viewer.handle_key("ArrowRight"));
        assert!(!viewer.handle_key("+"));
        assert_eq!(viewer.zoom().scale(), 1.0);
    }

    #[test]
    fn test_keyboard_commands() {
        let mut viewer = loaded(600.0, 3);

        assert!(viewer.handle_key("ArrowRight"));
        assert_eq!(viewer.navigator().unwrap().current_index(), 1);
        assert!(viewer.handle_key("ArrowLeft"));
        assert!(!viewer.handle_key("ArrowLeft"));

        assert!(viewer.handle_key("5"));
        assert!(viewer.zoom().is_zoomed());
        assert!(viewer.handle_key("f"));
        assert!(viewer.is_fullscreen());

        // First Escape leaves fullscreen, the second unzooms
        assert!(viewer.handle_key("Escape"));
        assert!(!viewer.is_fullscreen());
        assert!(viewer.zoom().is_zoomed());
        assert!(viewer.handle_key("Escape"));
        assert!(!viewer.zoom().is_zoomed());
        assert!(!viewer.handle_key("Escape"));

        assert!(!viewer.handle_key("q"));
    }

    #[test]
    fn test_resize_crossing_breakpoint() {
        let mut viewer = loaded(600.0, 6);
        viewer.go_to_index(3);

        viewer.on_viewport_resize(Viewport::new(1400.0, 900.0));
        let navigator = viewer.navigator().unwrap();
        assert_eq!(navigator.mode(), DisplayMode::TwoPage);
        assert_eq!(navigator.current_index(), 2);
        assert_eq!(navigator.rebuilds(), 1);
        assert_eq!(viewer.filmstrip().active(), Some(2));

        viewer.on_viewport_resize(Viewport::new(1300.0, 700.0));
        assert_eq!(viewer.navigator().unwrap().rebuilds(), 1);
    }

    #[test]
    fn test_thumb_click() {
        let mut viewer = loaded(600.0, 3);
        assert!(viewer.click_thumb(2));
        assert_eq!(viewer.toolbar().unwrap().current_page, 3);
        assert!(!viewer.click_thumb(5));
    }

    #[test]
    fn test_document_name() {
        let url = Url::parse("https://example.com/docs/revista.pdf?x=1").unwrap();
        assert_eq!(document_name(&url), "revista.pdf");
        let url = Url::parse("https://example.com/docs/").unwrap();
        assert_eq!(document_name(&url), DEFAULT_DOCUMENT_NAME);
    }
}
