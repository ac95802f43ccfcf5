//! Branding editor
//!
//! Form model over the site configuration plus the client for the upload and
//! save endpoints.

pub mod client;
pub mod form;

pub use client::EditorClient;
pub use form::{check_logo_file, check_pdf_file, BrandPreview, EditorSession, FORM_FIELDS};

use thiserror::Error;

use crate::site::ConfigError;

/// Editor error; messages are shown to the user as toasts
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("No se pudo cargar revista.config.json: {0}")]
    Config(#[from] ConfigError),

    #[error("Campo desconocido: {0}")]
    UnknownField(String),

    #[error("Campo bloqueado: {0}")]
    TextsLocked(String),

    #[error("Selecciona una imagen válida.")]
    InvalidLogoFile,

    #[error("Selecciona un PDF válido.")]
    InvalidPdfFile,

    #[error("HTTP {0}")]
    Http(u16),

    #[error("Error de red: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Respuesta inválida del servidor")]
    InvalidResponse,

    #[error("{0}")]
    Server(String),

    #[error("URL inválida: {0}")]
    InvalidUrl(String),
}
