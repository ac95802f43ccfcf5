//! Viewport sizing and resize debouncing

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Quiet window before a resize is acted on
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(150);

/// Header height assumed when the page does not report one
pub const DEFAULT_HEADER_HEIGHT: f32 = 60.0;

/// Vertical breathing room below the header
pub const FLIP_VERTICAL_MARGIN: f32 = 28.0;

/// The flipbook never gets shorter than this
pub const MIN_FLIP_HEIGHT: f32 = 420.0;

/// Browser viewport as seen by the viewer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Measured header height, if any
    pub header_height: Option<f32>,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            header_height: None,
        }
    }

    /// Height available to the flipbook
    pub fn flip_height(&self) -> f32 {
        flip_height(self.height, self.header_height)
    }
}

/// `max(420, round(viewport - header - 28))`
pub fn flip_height(viewport_height: f32, header_height: Option<f32>) -> f32 {
    let header = header_height
        .filter(|h| h.is_finite() && *h > 0.0)
        .unwrap_or(DEFAULT_HEADER_HEIGHT);
    (viewport_height - header - FLIP_VERTICAL_MARGIN)
        .round()
        .max(MIN_FLIP_HEIGHT)
}

/// Trailing-edge debouncer
///
/// Every `push` restarts the timer; only the last value of a burst is
/// delivered on the receiver, once `delay` has passed without a new push.
#[derive(Debug)]
pub struct ResizeDebouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> ResizeDebouncer<T> {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            delay,
            tx,
            pending: None,
        };
        (debouncer, rx)
    }

    pub fn push(&mut self, value: T) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }

        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the viewer shut down
            let _ = tx.send(value);
        }));
    }
}

impl<T> Drop for ResizeDebouncer<T> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}
