//! Branding and UI text resolution
//!
//! Turns an optional [`SiteConfig`] into the concrete strings the viewer
//! shows, applying built-in defaults for anything missing.

use super::types::SiteConfig;

pub const DEFAULT_LOADING_TEXT: &str = "Cargando Revista";
pub const DEFAULT_PREV_TEXT: &str = "Anterior";
pub const DEFAULT_NEXT_TEXT: &str = "Siguiente";
pub const DEFAULT_PAGES_HEADER: &str = "Páginas";
pub const DEFAULT_PAGE_INFO_PATTERN: &str = "Página {page} de {total}";
pub const DEFAULT_THUMB_ALT_PATTERN: &str = "Pág {page}";
pub const DEFAULT_LOGO_ALT: &str = "Logo";

/// Replace `{name}` placeholders; unknown names become empty strings
///
/// Only word characters are accepted inside braces, anything else is copied
/// through literally.
pub fn format_pattern(pattern: &str, vars: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let name_len = after
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let closes = after[name_len..].starts_with('}');

        if name_len > 0 && closes {
            let name = &after[..name_len];
            if let Some((_, value)) = vars.iter().find(|(key, _)| *key == name) {
                out.push_str(value);
            }
            rest = &after[name_len + 1..];
        } else {
            out.push('{');
            rest = after;
        }
    }

    out.push_str(rest);
    out
}

/// Resolved UI strings
#[derive(Debug, Clone, PartialEq)]
pub struct UiTexts {
    pub loading: String,
    pub prev: String,
    pub next: String,
    pub pages_header: String,
    pub page_info_pattern: String,
    pub thumb_alt_pattern: String,
}

impl Default for UiTexts {
    fn default() -> Self {
        Self::resolve(None)
    }
}

impl UiTexts {
    pub fn resolve(config: Option<&SiteConfig>) -> Self {
        let text_or = |key: &str, default: &str| {
            config
                .and_then(|c| c.texts.get(key))
                .unwrap_or(default)
                .to_string()
        };

        Self {
            loading: text_or("loading", DEFAULT_LOADING_TEXT),
            prev: text_or("prev", DEFAULT_PREV_TEXT),
            next: text_or("next", DEFAULT_NEXT_TEXT),
            pages_header: text_or("pagesHeader", DEFAULT_PAGES_HEADER),
            page_info_pattern: text_or("pageInfoPattern", DEFAULT_PAGE_INFO_PATTERN),
            thumb_alt_pattern: text_or("thumbAltPattern", DEFAULT_THUMB_ALT_PATTERN),
        }
    }

    /// e.g. "Página 3 de 12"
    pub fn page_info(&self, page: usize, total: usize) -> String {
        format_pattern(
            &self.page_info_pattern,
            &[("page", page.to_string()), ("total", total.to_string())],
        )
    }

    /// Alt text of the thumbnail for 1-based `page`
    pub fn thumb_alt(&self, page: usize) -> String {
        format_pattern(&self.thumb_alt_pattern, &[("page", page.to_string())])
    }
}

/// Logo element attributes
#[derive(Debug, Clone, PartialEq)]
pub struct LogoView {
    pub src: String,
    pub alt: String,
    /// CSS width, `auto` or `<n>px`
    pub width: Option<String>,
    /// CSS height in pixels
    pub height: Option<String>,
}

/// Header branding derived from the configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrandView {
    /// Document title, when configured
    pub title: Option<String>,
    pub brand_text: Option<String>,
    /// Only present when a logo URL is configured
    pub logo: Option<LogoView>,
    pub loading_title: String,
}

impl BrandView {
    pub fn from_config(config: Option<&SiteConfig>) -> Self {
        let texts = UiTexts::resolve(config);
        let Some(config) = config else {
            return Self {
                loading_title: texts.loading,
                ..Default::default()
            };
        };

        let brand = &config.brand;
        let non_empty = |s: &Option<String>| s.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

        let logo = non_empty(&brand.logo_url).map(|src| LogoView {
            src,
            alt: non_empty(&brand.logo_alt)
                .or_else(|| non_empty(&brand.text))
                .unwrap_or_else(|| DEFAULT_LOGO_ALT.to_string()),
            width: brand.logo_width.as_ref().and_then(|w| w.to_css()),
            height: brand.logo_height.as_ref().and_then(|h| h.to_css()),
        });

        Self {
            title: non_empty(&config.page.title),
            brand_text: non_empty(&brand.text),
            logo,
            loading_title: texts.loading,
        }
    }
}
