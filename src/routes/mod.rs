//! Route modules for the Revista server

pub mod health;
pub mod save;
pub mod upload;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;
use crate::upload::UPLOADS_PATH;

/// Build the full application router
///
/// Uploads are served from the upload directory; everything else that is not
/// an API route falls through to the site root (viewer assets and the saved
/// `*.config.json` files). Hidden files (`.env`, `.git/...`) are never served.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/health", get(health::health_check))
        .merge(upload::router(state.max_upload_bytes()))
        .merge(save::router())
        .nest_service(UPLOADS_PATH, ServeDir::new(state.upload_dir()))
        .fallback_service(ServeDir::new(state.site_root()))
        .layer(middleware::from_fn(reject_hidden_paths))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// 404 for any path with a segment starting with `.`
async fn reject_hidden_paths(request: Request, next: Next) -> Response {
    if is_hidden_path(request.uri().path()) {
        tracing::warn!(path = %request.uri().path(), "Refusing hidden path");
        return AppError::NotFound.into_response();
    }
    next.run(request).await
}

/// Whether a request path names a dotfile, literally or percent-encoded
fn is_hidden_path(path: &str) -> bool {
    path.split('/').any(|segment| {
        segment.starts_with('.')
            || segment
                .get(..3)
                .map_or(false, |prefix| prefix.eq_ignore_ascii_case("%2e"))
    })
}
