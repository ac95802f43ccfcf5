//! Rendering error types

use thiserror::Error;

/// Rasterization error
#[derive(Debug, Error)]
pub enum RenderError {
    /// The document could not be opened at all
    #[error("Failed to open document: {0}")]
    Open(String),

    /// Page index outside the document
    #[error("Page not found: index {0}")]
    PageNotFound(usize),

    /// Engine failure while rendering a page
    #[error("Render error: {0}")]
    Page(String),

    /// Image conversion or encoding failure
    #[error("Image error: {0}")]
    Image(String),

    /// A newer load started while this one was running
    #[error("Render superseded by a newer document load")]
    Superseded,

    /// Blocking task failed to complete
    #[error("Task join error: {0}")]
    Task(String),
}

/// Result type alias for render operations
pub type RenderResult<T> = std::result::Result<T, RenderError>;

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        RenderError::Image(err.to_string())
    }
}
