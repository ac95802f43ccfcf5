//! Editor form model
//!
//! The editor works on its own deep copy of the configuration JSON and
//! addresses it through dotted field paths, the same paths the form inputs
//! use as element ids.

use serde_json::{Map, Number, Value};

use super::EditorError;
use crate::site::{missing_required_keys, validate, ConfigError, SiteConfig};

/// Editable form fields, in form order
pub const FORM_FIELDS: [&str; 14] = [
    "page.title",
    "brand.text",
    "brand.logo_alt",
    "brand.logo_url",
    "brand.logo_width",
    "brand.logo_height",
    "pdf.url",
    "pdf.allow_query_override",
    "texts.loading",
    "texts.prev",
    "texts.next",
    "texts.pagesHeader",
    "texts.pageInfoPattern",
    "texts.thumbAltPattern",
];

/// Text fields guarded by the lock toggle
pub const LOCKABLE_FIELDS: [&str; 6] = [
    "texts.loading",
    "texts.prev",
    "texts.next",
    "texts.pagesHeader",
    "texts.pageInfoPattern",
    "texts.thumbAltPattern",
];

/// Legacy text key removed on load
const LEGACY_TEXT_KEY: &str = "openPdf";

const LOGO_HEIGHT_FIELD: &str = "brand.logo_height";

/// Brand preview panel contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandPreview {
    pub text: String,
    pub width: String,
    pub height: String,
    pub logo_url: String,
    pub logo_alt: String,
}

/// Editor state over a configuration document
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSession {
    state: Value,
    texts_locked: bool,
}

impl EditorSession {
    /// Start editing a raw configuration document
    ///
    /// All four top-level sections must be present. The legacy
    /// `texts.openPdf` entry is dropped; everything else is kept as is.
    pub fn from_value(mut value: Value) -> Result<Self, EditorError> {
        if !value.is_object() {
            return Err(ConfigError::MissingKeys(missing_required_keys(&Value::Null)).into());
        }
        let missing = missing_required_keys(&value);
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing).into());
        }

        if let Some(texts) = value.get_mut("texts").and_then(Value::as_object_mut) {
            texts.remove(LEGACY_TEXT_KEY);
        }

        Ok(Self {
            state: value,
            texts_locked: true,
        })
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self, EditorError> {
        let value = serde_json::to_value(config).map_err(ConfigError::Json)?;
        Self::from_value(value)
    }

    /// The edited document
    pub fn config(&self) -> &Value {
        &self.state
    }

    pub fn into_config(self) -> Value {
        self.state
    }

    /// Typed view of the edited document
    pub fn to_site_config(&self) -> Result<SiteConfig, ConfigError> {
        validate(self.state.clone())
    }

    pub fn texts_locked(&self) -> bool {
        self.texts_locked
    }

    pub fn set_texts_locked(&mut self, locked: bool) {
        self.texts_locked = locked;
    }

    /// Current value at a dotted path
    pub fn field(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.state, |value, key| value.get(key))
    }

    /// Text shown in the input bound to `path`
    pub fn field_text(&self, path: &str) -> String {
        match self.field(path) {
            None | Some(Value::Null) => String::new(),
            Some(value) => display_value(value),
        }
    }

    /// Write a form value
    ///
    /// Intermediate objects are created as needed. `brand.logo_height` is
    /// stored as a number whenever the input parses as one.
    pub fn set_field(&mut self, path: &str, value: Value) -> Result<(), EditorError> {
        if !FORM_FIELDS.contains(&path) {
            return Err(EditorError::UnknownField(path.to_string()));
        }
        if self.texts_locked && LOCKABLE_FIELDS.contains(&path) {
            return Err(EditorError::TextsLocked(path.to_string()));
        }

        let value = if path == LOGO_HEIGHT_FIELD {
            coerce_number(value)
        } else {
            value
        };

        set_by_path(&mut self.state, path, value);
        Ok(())
    }

    /// Point the logo at a new URL, e.g. after an upload
    pub fn set_logo_url(&mut self, url: impl Into<String>) {
        set_by_path(&mut self.state, "brand.logo_url", Value::String(url.into()));
    }

    pub fn clear_logo(&mut self) {
        self.set_logo_url("");
    }

    pub fn set_pdf_url(&mut self, url: impl Into<String>) {
        set_by_path(&mut self.state, "pdf.url", Value::String(url.into()));
    }

    pub fn preview(&self) -> BrandPreview {
        let text_or = |path: &str, default: &str| match self.field(path) {
            None | Some(Value::Null) => default.to_string(),
            Some(value) => display_value(value),
        };

        BrandPreview {
            text: text_or("brand.text", ""),
            width: text_or("brand.logo_width", "auto"),
            height: text_or("brand.logo_height", "auto"),
            logo_url: text_or("brand.logo_url", ""),
            logo_alt: text_or("brand.logo_alt", "logo"),
        }
    }
}

/// Logo uploads must be images
pub fn check_logo_file(mime: &str) -> Result<(), EditorError> {
    if mime.starts_with("image/") {
        Ok(())
    } else {
        Err(EditorError::InvalidLogoFile)
    }
}

/// Document uploads must be PDFs
pub fn check_pdf_file(mime: &str) -> Result<(), EditorError> {
    if mime == "application/pdf" {
        Ok(())
    } else {
        Err(EditorError::InvalidPdfFile)
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric strings become JSON numbers; integers stay integers
fn coerce_number(value: Value) -> Value {
    let Value::String(text) = &value else {
        return value;
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return value;
    }

    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => {
            if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                Value::from(n as i64)
            } else {
                Number::from_f64(n).map(Value::Number).unwrap_or(value)
            }
        }
        _ => value,
    }
}

fn set_by_path(root: &mut Value, path: &str, value: Value) {
    let mut keys: Vec<&str> = path.split('.').collect();
    let Some(last) = keys.pop() else {
        return;
    };

    let mut node = root;
    for key in keys {
        node = object_mut(node)
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()));
    }
    object_mut(node).insert(last.to_string(), value);
}

/// Replace non-objects with an empty object and return its map
fn object_mut(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just made an object"),
    }
}
