//! Upload types

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Accepted content types, as detected from the uploaded bytes
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/webp",
    "image/gif",
    "image/svg+xml",
    "application/pdf",
];

/// Multipart field carrying the file
pub const UPLOAD_FIELD: &str = "file";

/// Public path prefix under which uploads are served
pub const UPLOADS_PATH: &str = "/uploads";

/// Check whether a detected MIME type may be stored
pub fn is_allowed_mime(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime)
}

/// File extension for a stored upload
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        "application/pdf" => "pdf",
        _ => "bin",
    }
}

// ============================================================================
// Wire Types
// ============================================================================

/// Response body of the upload endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub ok: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResponse {
    pub fn success(url: String) -> Self {
        Self {
            ok: true,
            url: Some(url),
            error: None,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Upload rejection or storage failure
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Archivo no recibido")]
    MissingFile,

    #[error("Error en subida ({0})")]
    Malformed(String),

    #[error("Archivo demasiado grande")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Tipo de archivo no permitido: {0}")]
    InvalidFileType(String),

    #[error("No se pudo crear el directorio de subida")]
    CreateDir(#[source] std::io::Error),

    #[error("No se pudo mover el archivo")]
    Write(#[source] std::io::Error),
}

impl UploadError {
    /// Whether the client caused the failure
    pub fn is_client_error(&self) -> bool {
        !matches!(self, UploadError::CreateDir(_) | UploadError::Write(_))
    }
}

impl From<UploadError> for crate::error::AppError {
    fn from(err: UploadError) -> Self {
        if err.is_client_error() {
            crate::error::AppError::BadRequest(err.to_string())
        } else {
            tracing::error!(error = ?err, "Upload storage failure");
            crate::error::AppError::Internal(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list() {
        assert!(is_allowed_mime("application/pdf"));
        assert!(is_allowed_mime("image/svg+xml"));
        assert!(!is_allowed_mime("text/plain"));
        assert!(!is_allowed_mime("application/zip"));
    }

    #[test]
    fn test_extensions() {
        assert_eq!(extension_for_mime("image/jpg"), "jpg");
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(extension_for_mime("image/svg+xml"), "svg");
        assert_eq!(extension_for_mime("application/x-unknown"), "bin");
    }

    #[test]
    fn test_invalid_type_message() {
        let err = UploadError::InvalidFileType("text/plain".into());
        assert_eq!(err.to_string(), "Tipo de archivo no permitido: text/plain");
        assert!(err.is_client_error());
    }
}
