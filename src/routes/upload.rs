//! Upload Routes
//!
//! Endpoints:
//! - POST /upload      - Store an image or PDF for the branding editor
//! - POST /upload.php  - Same handler, kept for editors pointing at the old path
//!
//! Any other method answers 405 with the usual `{ok:false}` body.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};

use crate::error::{method_not_allowed, Result};
use crate::state::AppState;
use crate::upload::{
    describe_mime, is_allowed_mime, sniff_mime, UploadError, UploadResponse, UploadStore,
    UPLOADS_PATH, UPLOAD_FIELD,
};

/// Slack above the file limit for multipart framing, so oversized files are
/// reported by our own size check rather than a bare 413
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

// ============================================================================
// Router
// ============================================================================

/// Create the upload router
pub fn router(max_upload_bytes: u64) -> Router<AppState> {
    let body_limit = usize::try_from(max_upload_bytes.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/upload", post(upload_file).fallback(method_not_allowed))
        .route("/upload.php", post(upload_file).fallback(method_not_allowed))
        .layer(DefaultBodyLimit::max(body_limit))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /upload
///
/// Multipart form with a `file` field. Returns `{ok:true, url}`.
async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!("Upload without multipart body: {}", rejection);
        UploadError::MissingFile
    })?;

    let max = state.max_upload_bytes();
    let data = read_file_field(&mut multipart, max).await?;

    if data.len() as u64 > max {
        return Err(UploadError::FileTooLarge {
            size: data.len() as u64,
            max,
        }
        .into());
    }

    let mime = match sniff_mime(&data) {
        Some(mime) if is_allowed_mime(mime) => mime,
        Some(mime) => return Err(UploadError::InvalidFileType(mime.to_string()).into()),
        None => return Err(UploadError::InvalidFileType(describe_mime(&data).to_string()).into()),
    };

    let store = UploadStore::new(state.upload_dir());
    let stored = store.store(&data, mime).await?;

    let url = format!(
        "{}{}/{}",
        public_base_url(&state, &headers),
        UPLOADS_PATH,
        stored.file_name
    );

    Ok(Json(UploadResponse::success(url)))
}

// ============================================================================
// Helpers
// ============================================================================

/// Read the bytes of the `file` field, skipping any other fields
async fn read_file_field(
    multipart: &mut Multipart,
    max: u64,
) -> std::result::Result<Vec<u8>, UploadError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(UploadError::MissingFile),
            Err(e) => return Err(multipart_failure(e, max)),
        };

        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let data = field.bytes().await.map_err(|e| multipart_failure(e, max))?;
        if data.is_empty() {
            return Err(UploadError::MissingFile);
        }
        return Ok(data.to_vec());
    }
}

fn multipart_failure(err: axum::extract::multipart::MultipartError, max: u64) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::FileTooLarge { size: max + 1, max }
    } else {
        UploadError::Malformed(err.body_text())
    }
}

/// Scheme + host the uploaded file is reachable at
fn public_base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(base) = &state.config().upload.public_base_url {
        return base.clone();
    }

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .filter(|v| *v == "https" || *v == "http")
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    format!("{}://{}", scheme, host)
}
