//! Site configuration
//!
//! Branding, UI texts and the PDF source for the viewer, as stored in
//! `revista.config.json` and edited through the admin editor.

pub mod branding;
pub mod loader;
pub mod types;

pub use branding::{format_pattern, BrandView, LogoView, UiTexts};
pub use loader::{config_path_from_query, parse_config, validate, ConfigLoader};
pub use types::*;

use thiserror::Error;

/// Configuration load/validation error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("HTTP {0}")]
    Http(u16),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Required top-level keys absent or null
    #[error("Invalid structure (missing keys: {0:?})")]
    MissingKeys(Vec<&'static str>),

    /// Keys present but with the wrong shape
    #[error("Invalid structure: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("Invalid config URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
