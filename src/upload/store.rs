//! Upload storage on the local filesystem

use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::types::{extension_for_mime, UploadError};

/// Result of a stored upload
#[derive(Debug, Clone)]
pub struct StoredUpload {
    /// Generated file name, e.g. `9f86d081884c7d65.png`
    pub file_name: String,
    pub path: PathBuf,
}

/// Writes uploads into a single directory
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store `data` under a random name with an extension derived from `mime`
    pub async fn store(&self, data: &[u8], mime: &str) -> Result<StoredUpload, UploadError> {
        if !tokio::fs::try_exists(&self.dir).await.unwrap_or(false) {
            tokio::fs::create_dir_all(&self.dir)
                .await
                .map_err(UploadError::CreateDir)?;
        }

        let file_name = format!("{}.{}", random_stem(), extension_for_mime(mime));
        let path = self.dir.join(&file_name);

        tokio::fs::write(&path, data).await.map_err(UploadError::Write)?;

        tracing::info!(
            file_name = %file_name,
            mime = %mime,
            size = data.len(),
            "Upload stored"
        );

        Ok(StoredUpload { file_name, path })
    }
}

/// 8 random bytes as 16 hex characters
fn random_stem() -> String {
    let id = Uuid::new_v4();
    hex::encode(&id.as_bytes()[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_random_stem_shape() {
        let stem = random_stem();
        assert_eq!(stem.len(), 16);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(stem, random_stem());
    }

    #[tokio::test]
    async fn test_store_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = UploadStore::new(temp_dir.path().join("nested").join("uploads"));

        let stored = store.store(b"%PDF-1.4 body", "application/pdf").await.unwrap();

        assert!(stored.file_name.ends_with(".pdf"));
        let written = tokio::fs::read(&stored.path).await.unwrap();
        assert_eq!(written, b"%PDF-1.4 body");
    }
}
