//! HTTP client for the editor
//!
//! Talks to the same site the viewer is served from: reads the current
//! configuration, uploads logo and PDF files, and saves the edited
//! configuration back.

use reqwest::{header, multipart, Client, Url};
use serde_json::Value;

use super::form::{check_logo_file, check_pdf_file, EditorSession};
use super::EditorError;
use crate::config::DEFAULT_CONFIG_NAME;
use crate::routes::save::{SaveRequest, SaveResponse, API_KEY_HEADER};
use crate::site::loader::CACHE_BUSTER_PARAM;
use crate::upload::{UploadResponse, UPLOAD_FIELD};

/// Paths relative to the site base
pub const CONFIG_PATH: &str = "revista.config.json";
pub const UPLOAD_PATH: &str = "upload.php";
pub const SAVE_PATH: &str = "save-config.php";

/// Editor endpoints client
#[derive(Debug, Clone)]
pub struct EditorClient {
    client: Client,
    base: Url,
    api_key: Option<String>,
}

impl EditorClient {
    pub fn new(base: Url) -> Self {
        Self::with_client(Client::new(), base)
    }

    pub fn with_client(client: Client, base: Url) -> Self {
        Self {
            client,
            base,
            api_key: None,
        }
    }

    /// Send `X-Api-Key` with saves
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, EditorError> {
        self.base
            .join(path)
            .map_err(|_| EditorError::InvalidUrl(path.to_string()))
    }

    /// Fetch the live configuration and start an editing session
    pub async fn load(&self) -> Result<EditorSession, EditorError> {
        let url = self.endpoint(CONFIG_PATH)?;
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
            return Err(EditorError::Http(status.as_u16()));
        }

        let value: Value = response.json().await?;
        let session = EditorSession::from_value(value)?;
        tracing::info!("Configuración cargada");
        Ok(session)
    }

    /// Upload a file and return its public URL
    pub async fn upload(
        &self,
        file_name: &str,
        data: Vec<u8>,
        mime: &str,
    ) -> Result<String, EditorError> {
        let url = self.endpoint(UPLOAD_PATH)?;
        let part = multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);

        let response = self.client.post(url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EditorError::Http(status.as_u16()));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|_| EditorError::InvalidResponse)?;
        match body.url {
            Some(url) if body.ok && !url.is_empty() => {
                tracing::debug!(file = %file_name, url = %url, "Upload complete");
                Ok(url)
            }
            _ => Err(EditorError::InvalidResponse),
        }
    }

    /// Upload a logo image and point the session at it
    pub async fn upload_logo(
        &self,
        session: &mut EditorSession,
        file_name: &str,
        data: Vec<u8>,
        mime: &str,
    ) -> Result<String, EditorError> {
        check_logo_file(mime)?;
        let url = self.upload(file_name, data, mime).await?;
        session.set_logo_url(url.clone());
        Ok(url)
    }

    /// Upload a PDF and point the session at it
    pub async fn upload_pdf(
        &self,
        session: &mut EditorSession,
        file_name: &str,
        data: Vec<u8>,
        mime: &str,
    ) -> Result<String, EditorError> {
        check_pdf_file(mime)?;
        let url = self.upload(file_name, data, mime).await?;
        session.set_pdf_url(url.clone());
        Ok(url)
    }

    /// Save the edited configuration; returns the written file name
    ///
    /// The response body decides success, whatever the status code.
    pub async fn save(&self, session: &EditorSession) -> Result<String, EditorError> {
        let url = self.endpoint(SAVE_PATH)?;
        let request = SaveRequest {
            name: Some(DEFAULT_CONFIG_NAME.to_string()),
            config: session.config().clone(),
        };

        let mut builder = self.client.post(url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        let response = builder.send().await?;

        let body: SaveResponse = response
            .json()
            .await
            .map_err(|_| EditorError::InvalidResponse)?;
        if body.ok {
            let file = body.file.unwrap_or_else(|| DEFAULT_CONFIG_NAME.to_string());
            tracing::info!(file = %file, "Guardado en servidor correctamente");
            Ok(file)
        } else {
            Err(EditorError::Server(
                body.error.unwrap_or_else(|| "Error desconocido".to_string()),
            ))
        }
    }
}
