//! Config Save Routes
//!
//! Endpoints:
//! - POST /save-config      - Persist the editor's configuration as JSON
//! - POST /save-config.php  - Same handler, legacy path

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{method_not_allowed, AppError, Result};
use crate::site::has_required_keys;
use crate::state::AppState;

/// Header carrying the optional save API key
pub const API_KEY_HEADER: &str = "x-api-key";

// ============================================================================
// Wire Types
// ============================================================================

/// Body sent by the editor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub config: Value,
}

/// Response body of the save endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResponse {
    pub ok: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Router
// ============================================================================

/// Create the save router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/save-config", post(save_config).fallback(method_not_allowed))
        .route("/save-config.php", post(save_config).fallback(method_not_allowed))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /save-config
///
/// Validates the four top-level keys and writes the config, pretty printed,
/// into the site root under the basename of `name`.
async fn save_config(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SaveResponse>> {
    if let Some(expected) = &state.config().site.save_api_key {
        let provided = headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if provided != expected {
            return Err(AppError::Unauthorized("API key inválida".to_string()));
        }
    }

    if body.is_empty() {
        return Err(AppError::BadRequest("Cuerpo vacío".to_string()));
    }

    let data: Value = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("JSON inválido".to_string()))?;
    let Value::Object(mut data) = data else {
        return Err(AppError::BadRequest("JSON inválido".to_string()));
    };

    let name = config_file_name(
        data.get("name").and_then(Value::as_str),
        &state.config().site.default_config_name,
    )
    .ok_or_else(|| AppError::BadRequest("Nombre de archivo inválido".to_string()))?;

    let config = match data.remove("config") {
        Some(config) if is_truthy(&config) => config,
        _ => {
            return Err(AppError::BadRequest(
                "Campo \"config\" requerido".to_string(),
            ))
        }
    };

    if !has_required_keys(&config) {
        return Err(AppError::BadRequest(
            "Estructura inválida (faltan claves principales)".to_string(),
        ));
    }

    let json = serde_json::to_string_pretty(&config)
        .map_err(|_| AppError::Internal("No se pudo serializar el JSON".to_string()))?;

    let path = state.site_root().join(&name);
    tokio::fs::write(&path, json).await.map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Config write failed");
        AppError::Internal("No se pudo escribir el archivo".to_string())
    })?;

    tracing::info!(file = %name, "Configuration saved");

    Ok(Json(SaveResponse {
        ok: true,
        file: Some(name),
        error: None,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

/// Basename of the requested file name, falling back to `default`
///
/// Directory components (either separator) are dropped so the write always
/// lands in the site root. `None` when the basename is hidden or not a
/// `.json` file, so saves cannot replace other files served from the root.
pub fn config_file_name(requested: Option<&str>, default: &str) -> Option<String> {
    let Some(requested) = requested else {
        return Some(default.to_string());
    };

    let base = requested
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim();

    match base {
        "" | "." | ".." => Some(default.to_string()),
        name if name.starts_with('.') => None,
        name if !name.to_ascii_lowercase().ends_with(".json") => None,
        name => Some(name.to_string()),
    }
}

/// JSON truthiness: null, false, 0, "", "0" and empty containers are falsy
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
