//! Configuration management for the Revista server

use std::env;
use std::path::PathBuf;

use serde::Deserialize;

/// Maximum upload size: 15MB
pub const DEFAULT_UPLOAD_MAX_BYTES: u64 = 15 * 1024 * 1024;

/// File name used when the editor does not send one
pub const DEFAULT_CONFIG_NAME: &str = "revista.config.json";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub server: ListenConfig,
    pub site: SiteRootConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteRootConfig {
    /// Directory holding the viewer assets and the saved config files
    pub root: PathBuf,
    pub default_config_name: String,
    /// When set, `save-config` requires a matching `X-Api-Key` header
    pub save_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_bytes: u64,
    /// Base for returned URLs; derived from the request Host when absent
    pub public_base_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let root = PathBuf::from(".");
        ServerConfig {
            server: ListenConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            upload: UploadConfig {
                dir: root.join("uploads"),
                max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
                public_base_url: None,
            },
            site: SiteRootConfig {
                root,
                default_config_name: DEFAULT_CONFIG_NAME.to_string(),
                save_api_key: None,
            },
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigEnvError> {
        let root = PathBuf::from(env::var("SITE_ROOT").unwrap_or_else(|_| ".".to_string()));
        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| root.join("uploads"));

        let port = match env::var("SERVER_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigEnvError::Invalid("SERVER_PORT", raw))?,
            Err(_) => 3000,
        };
        let max_bytes = match env::var("UPLOAD_MAX_BYTES") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigEnvError::Invalid("UPLOAD_MAX_BYTES", raw))?,
            Err(_) => DEFAULT_UPLOAD_MAX_BYTES,
        };

        Ok(ServerConfig {
            server: ListenConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
            },
            site: SiteRootConfig {
                root,
                default_config_name: env::var("DEFAULT_CONFIG_NAME")
                    .unwrap_or_else(|_| DEFAULT_CONFIG_NAME.to_string()),
                save_api_key: env::var("SAVE_API_KEY").ok().filter(|k| !k.is_empty()),
            },
            upload: UploadConfig {
                dir: upload_dir,
                max_bytes,
                public_base_url: env::var("PUBLIC_BASE_URL")
                    .ok()
                    .map(|u| u.trim_end_matches('/').to_string())
                    .filter(|u| !u.is_empty()),
            },
        })
    }

    /// Server config rooted at `root`, used by tests and embedders
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let mut config = ServerConfig::default();
        config.upload.dir = root.join("uploads");
        config.site.root = root;
        config
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigEnvError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
