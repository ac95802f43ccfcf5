//! Application state management

use std::path::Path;
use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: ServerConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Directory where saved config files are written
    pub fn site_root(&self) -> &Path {
        &self.inner.config.site.root
    }

    /// Directory where uploads are stored
    pub fn upload_dir(&self) -> &Path {
        &self.inner.config.upload.dir
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.inner.config.upload.max_bytes
    }
}
