//! Configuration loader
//!
//! Fetches `revista.config.json` once at startup. Failures degrade silently:
//! the caller gets `None` and falls back to built-in texts and the default
//! PDF path, because a branding problem must not stop the PDF from showing.

use std::path::Path;

use reqwest::{header, Client, Url};
use serde_json::Value;

use super::types::{missing_required_keys, SiteConfig};
use super::ConfigError;

/// Config file used when the page query does not override it
pub const DEFAULT_CONFIG_PATH: &str = "revista.config.json";

/// Query parameter that overrides the config path
pub const CONFIG_QUERY_PARAM: &str = "cfg";

/// Cache-buster query parameter
pub const CACHE_BUSTER_PARAM: &str = "_";

/// Parse and validate configuration bytes
pub fn parse_config(bytes: &[u8]) -> Result<SiteConfig, ConfigError> {
    let value: Value = serde_json::from_slice(bytes)?;
    validate(value)
}

/// Validate an already parsed JSON value
pub fn validate(value: Value) -> Result<SiteConfig, ConfigError> {
    let missing = missing_required_keys(&value);
    if !value.is_object() || !missing.is_empty() {
        return Err(ConfigError::MissingKeys(missing));
    }
    serde_json::from_value(value).map_err(ConfigError::Shape)
}

/// Config path from a page query string such as `cfg=otra.json&x=1`
pub fn config_path_from_query(query: Option<&str>) -> String {
    let Some(query) = query.map(|q| q.trim_start_matches('?')) else {
        return DEFAULT_CONFIG_PATH.to_string();
    };

    let parsed = Url::parse(&format!("http://localhost/?{}", query)).ok();
    parsed
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == CONFIG_QUERY_PARAM)
                .map(|(_, value)| value.into_owned())
        })
        .filter(|path| !path.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// HTTP loader for site configuration
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    client: Client,
    /// Base against which relative config paths are resolved
    base: Option<Url>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ConfigLoader {
    pub fn new(base: Option<Url>) -> Self {
        Self::with_client(Client::new(), base)
    }

    pub fn with_client(client: Client, base: Option<Url>) -> Self {
        Self { client, base }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Resolve `path` against the loader's base URL
    pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
        match Url::parse(path) {
            Ok(url) => Ok(url),
            Err(_) => match &self.base {
                Some(base) => base
                    .join(path)
                    .map_err(|_| ConfigError::InvalidUrl(path.to_string())),
                None => Err(ConfigError::InvalidUrl(path.to_string())),
            },
        }
    }

    /// Load configuration, logging and swallowing every failure
    pub async fn load(&self, path: &str) -> Option<SiteConfig> {
        match self.fetch(path).await {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path, "Could not load configuration JSON: {}", e);
                None
            }
        }
    }

    /// Fetch and validate configuration
    ///
    /// Single attempt, no retry; bypasses caches with a `no-cache` header and
    /// a millisecond cache-buster.
    pub async fn fetch(&self, path: &str) -> Result<SiteConfig, ConfigError> {
        let url = self.resolve(path)?;
        let buster = chrono::Utc::now().timestamp_millis().to_string();

        let response = self
            .client
            .get(url)
            .query(&[(CACHE_BUSTER_PARAM, buster.as_str())])
            .header(header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConfigError::Http(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let config = parse_config(&bytes)?;
        tracing::debug!(path = %path, "Configuration loaded");
        Ok(config)
    }

    /// Load configuration from the local filesystem
    pub async fn load_file(path: impl AsRef<Path>) -> Option<SiteConfig> {
        let path = path.as_ref();
        let result = match tokio::fs::read(path).await {
            Ok(bytes) => parse_config(&bytes),
            Err(e) => Err(ConfigError::Io(e)),
        };

        match result {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Could not load configuration JSON: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> Value {
        json!({
            "page": {"title": "Revista Unimo"},
            "brand": {
                "text": "Unimo",
                "logo_url": "https://example.org/logo.png",
                "logo_alt": "Logo Unimo",
                "logo_width": "auto",
                "logo_height": 40
            },
            "pdf": {"url": "./revista.pdf", "allow_query_override": false},
            "texts": {
                "loading": "Cargando Revista",
                "prev": "Anterior",
                "next": "Siguiente",
                "pagesHeader": "Páginas",
                "pageInfoPattern": "Página {page} de {total}",
                "thumbAltPattern": "Pág {page}"
            },
            "theme": {"accent": "#c00"}
        })
    }

    #[test]
    fn test_valid_config_round_trips() {
        let value = sample();
        let config = validate(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&config).unwrap(), value);
    }

    #[test]
    fn test_legacy_text_key_removed() {
        let mut value = sample();
        value["texts"]["openPdf"] = json!("Abrir PDF");

        let config = validate(value).unwrap();
        let out = serde_json::to_value(&config).unwrap();
        assert!(out["texts"].get("openPdf").is_none());
        assert_eq!(out, sample());
    }

    #[test]
    fn test_mistyped_leaves_kept() {
        let mut value = sample();
        value["pdf"]["allow_query_override"] = json!("true");
        value["brand"]["logo_width"] = json!(true);
        value["texts"]["prev"] = json!(3);

        let config = validate(value.clone()).unwrap();
        assert_eq!(config.pdf.url.as_deref(), Some("./revista.pdf"));
        assert_eq!(config.pdf.allow_query_override, None);
        assert_eq!(config.brand.logo_width, None);
        assert_eq!(config.brand.text.as_deref(), Some("Unimo"));
        assert_eq!(config.texts.prev, None);
        assert_eq!(serde_json::to_value(&config).unwrap(), value);
    }

    #[test]
    fn test_null_leaves_kept() {
        let mut value = sample();
        value["page"]["title"] = Value::Null;
        value["texts"]["loading"] = Value::Null;

        let config = validate(value.clone()).unwrap();
        assert_eq!(config.page.title, None);
        assert_eq!(config.texts.loading, None);
        assert_eq!(serde_json::to_value(&config).unwrap(), value);
    }

    #[test]
    fn test_non_object_section_rejected() {
        let mut value = sample();
        value["page"] = json!("Revista");
        assert!(matches!(validate(value), Err(ConfigError::Shape(_))));
    }

    #[test]
    fn test_missing_key_rejected() {
        let mut value = sample();
        value.as_object_mut().unwrap().remove("pdf");

        match validate(value) {
            Err(ConfigError::MissingKeys(keys)) => assert_eq!(keys, vec!["pdf"]),
            other => panic!("Expected MissingKeys, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(parse_config(b"{not json"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_config_path_from_query() {
        assert_eq!(config_path_from_query(None), "revista.config.json");
        assert_eq!(config_path_from_query(Some("?cfg=otra.config.json")), "otra.config.json");
        assert_eq!(
            config_path_from_query(Some("x=1&cfg=configs%2Fmarzo.json")),
            "configs/marzo.json"
        );
        assert_eq!(config_path_from_query(Some("cfg=")), "revista.config.json");
    }

    #[test]
    fn test_resolve_relative_path() {
        let loader = ConfigLoader::new(Some(Url::parse("https://site.example/revista/").unwrap()));
        let url = loader.resolve("revista.config.json").unwrap();
        assert_eq!(url.as_str(), "https://site.example/revista/revista.config.json");

        let bare = ConfigLoader::default();
        assert!(matches!(bare.resolve("revista.config.json"), Err(ConfigError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_load_file_degrades_to_none() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.json");
        let bad = temp_dir.path().join("bad.json");
        tokio::fs::write(&good, serde_json::to_vec(&sample()).unwrap()).await.unwrap();
        tokio::fs::write(&bad, b"{\"page\": {}}").await.unwrap();

        assert!(ConfigLoader::load_file(&good).await.is_some());
        assert!(ConfigLoader::load_file(&bad).await.is_none());
        assert!(ConfigLoader::load_file(temp_dir.path().join("missing.json")).await.is_none());
    }

    #[tokio::test]
    async fn test_load_unreachable_host_is_none() {
        let loader = ConfigLoader::new(Some(Url::parse("http://127.0.0.1:9/").unwrap()));
        assert!(loader.load("revista.config.json").await.is_none());
    }
}
