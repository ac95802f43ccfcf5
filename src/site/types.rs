//! Site configuration types
//!
//! Mirrors `revista.config.json`. Unknown keys in `page`, `brand`, `pdf` and
//! at the top level are carried through untouched; `texts` only keeps the
//! keys the viewer understands, which is how legacy keys such as `openPdf`
//! disappear.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Top-level keys every configuration must carry
pub const REQUIRED_KEYS: [&str; 4] = ["page", "brand", "pdf", "texts"];

/// PDF used when the configuration does not name one
pub const DEFAULT_PDF_URL: &str = "./documento.pdf";

/// Complete site configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub page: PageSettings,
    pub brand: BrandSettings,
    pub pdf: PdfSettings,
    pub texts: TextSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Sections deserialize from a raw map so that a null or mistyped leaf never
// fails the whole configuration: the typed field stays `None` and the raw
// value is kept in `extra`, which serializes back in place.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct PageSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for PageSettings {
    fn from(mut map: Map<String, Value>) -> Self {
        Self {
            title: take_leaf(&mut map, "title"),
            extra: map,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct BrandSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_width: Option<LogoDimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_height: Option<LogoDimension>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for BrandSettings {
    fn from(mut map: Map<String, Value>) -> Self {
        Self {
            text: take_leaf(&mut map, "text"),
            logo_url: take_leaf(&mut map, "logo_url"),
            logo_alt: take_leaf(&mut map, "logo_alt"),
            logo_width: take_leaf(&mut map, "logo_width"),
            logo_height: take_leaf(&mut map, "logo_height"),
            extra: map,
        }
    }
}

/// Logo size as stored by the editor: a pixel count or a keyword like `auto`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogoDimension {
    Pixels(Number),
    Keyword(String),
}

impl LogoDimension {
    /// CSS length for the logo element, `None` when the value is empty or zero
    pub fn to_css(&self) -> Option<String> {
        match self {
            LogoDimension::Pixels(n) if n.as_f64() == Some(0.0) => None,
            LogoDimension::Pixels(n) => Some(format!("{}px", n)),
            LogoDimension::Keyword(k) if k.is_empty() => None,
            LogoDimension::Keyword(k) if k == "auto" => Some("auto".to_string()),
            LogoDimension::Keyword(k) => Some(format!("{}px", k)),
        }
    }

    /// Display form used by the editor preview
    pub fn display(&self) -> String {
        match self {
            LogoDimension::Pixels(n) => n.to_string(),
            LogoDimension::Keyword(k) => k.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct PdfSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_query_override: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for PdfSettings {
    fn from(mut map: Map<String, Value>) -> Self {
        Self {
            url: take_leaf(&mut map, "url"),
            allow_query_override: take_leaf(&mut map, "allow_query_override"),
            extra: map,
        }
    }
}

/// UI strings; only the recognized keys survive a load
///
/// `raw` holds recognized keys whose value is not a string (null included).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct TextSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_info_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_alt_pattern: Option<String>,
    #[serde(flatten)]
    pub raw: Map<String, Value>,
}

impl From<Map<String, Value>> for TextSettings {
    fn from(mut map: Map<String, Value>) -> Self {
        map.retain(|key, _| TEXT_KEYS.contains(&key.as_str()));
        Self {
            loading: take_leaf(&mut map, "loading"),
            prev: take_leaf(&mut map, "prev"),
            next: take_leaf(&mut map, "next"),
            pages_header: take_leaf(&mut map, "pagesHeader"),
            page_info_pattern: take_leaf(&mut map, "pageInfoPattern"),
            thumb_alt_pattern: take_leaf(&mut map, "thumbAltPattern"),
            raw: map,
        }
    }
}

/// Move `key` out of `map` when it holds a `T`; nulls and mistyped values
/// stay behind
fn take_leaf<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &str) -> Option<T> {
    let value = map.get(key).filter(|v| !v.is_null())?;
    let typed = T::deserialize(value).ok()?;
    map.remove(key);
    Some(typed)
}

/// Recognized text keys, as they appear in the JSON file
pub const TEXT_KEYS: [&str; 6] = [
    "loading",
    "prev",
    "next",
    "pagesHeader",
    "pageInfoPattern",
    "thumbAltPattern",
];

impl TextSettings {
    /// Look a text up by its JSON key
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "loading" => &self.loading,
            "prev" => &self.prev,
            "next" => &self.next,
            "pagesHeader" => &self.pages_header,
            "pageInfoPattern" => &self.page_info_pattern,
            "thumbAltPattern" => &self.thumb_alt_pattern,
            _ => return None,
        };
        value.as_deref()
    }
}

impl SiteConfig {
    /// PDF location from the config, or the bundled default
    pub fn pdf_url_or_default(config: Option<&SiteConfig>) -> String {
        config
            .and_then(|c| c.pdf.url.as_deref())
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_PDF_URL)
            .to_string()
    }
}

/// Required top-level keys that are absent or null
pub fn missing_required_keys(value: &Value) -> Vec<&'static str> {
    REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| value.get(*key).map_or(true, Value::is_null))
        .collect()
}

/// Whether `value` is an object carrying all four required keys
pub fn has_required_keys(value: &Value) -> bool {
    value.is_object() && missing_required_keys(value).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_keys() {
        let full = json!({"page": {}, "brand": {}, "pdf": {}, "texts": {}});
        assert!(has_required_keys(&full));

        let partial = json!({"page": {}, "brand": null, "pdf": {}});
        assert_eq!(missing_required_keys(&partial), vec!["brand", "texts"]);
        assert!(!has_required_keys(&partial));
        assert!(!has_required_keys(&json!("page")));
    }

    #[test]
    fn test_logo_dimension_css() {
        let width: LogoDimension = serde_json::from_value(json!("auto")).unwrap();
        assert_eq!(width.to_css().as_deref(), Some("auto"));

        let height: LogoDimension = serde_json::from_value(json!(48)).unwrap();
        assert_eq!(height.to_css().as_deref(), Some("48px"));
        assert_eq!(height.display(), "48");

        let zero: LogoDimension = serde_json::from_value(json!(0)).unwrap();
        assert!(zero.to_css().is_none());
    }

    #[test]
    fn test_pdf_url_default() {
        assert_eq!(SiteConfig::pdf_url_or_default(None), "./documento.pdf");
    }

    #[test]
    fn test_text_lookup() {
        let texts = TextSettings {
            pages_header: Some("Páginas".into()),
            ..Default::default()
        };
        assert_eq!(texts.get("pagesHeader"), Some("Páginas"));
        assert_eq!(texts.get("openPdf"), None);
    }
}
