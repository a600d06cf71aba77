//! HTTP client for the retrieval/generation backend.
//!
//! Covers the four endpoints the frontend consumes: chat, file upload,
//! article listing and article deletion. No retries anywhere; a failed call
//! is reported once and retry is always a new user action.

use crate::config::BackendSettings;
use crate::models::document::Article;
use crate::models::settings::QueryConfig;
use reqwest::{multipart, Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure outcome of a backend call. Callers treat transport failures and
/// HTTP error statuses identically.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {0}")]
    Status(StatusCode),
}

/// Body of `POST /chat`. This is the whole wire contract: generation
/// parameters the backend does not accept are not sent.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub query: &'a str,
    pub mode: &'static str,
    pub top_k: u8,
    pub alpha: f64,
    pub model: &'a str,
    pub prompt: &'a str,
}

impl<'a> ChatRequest<'a> {
    /// Hybrid-mode request assembled from a configuration snapshot.
    pub fn hybrid(query: &'a str, config: &'a QueryConfig) -> Self {
        Self {
            query,
            mode: "hybrid",
            top_k: config.top_k,
            alpha: config.semantic_weight,
            model: &config.model,
            prompt: &config.system_prompt,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub answer: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

/// One retrieval hit cited by an answer. Only the title is displayed; the
/// remaining fields feed the raw-label fallback for untitled hits.
#[derive(Debug, Deserialize)]
pub struct SourceRef {
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SourceRef {
    pub fn label(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => serde_json::Value::Object(self.extra.clone()).to_string(),
        }
    }
}

/// Acknowledgement of `POST /upload/`. All fields are optional: the client
/// only needs the HTTP status to resolve a staged document.
#[derive(Debug, Deserialize)]
pub struct UploadAck {
    pub doc_id: Option<i64>,
    pub total_chunks: Option<u32>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleListing {
    articles: Vec<Article>,
}

pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(settings: &BackendSettings) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(settings.request_timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatResponse, BackendError> {
        let url = format!("{}/chat", self.base_url);

        tracing::debug!(
            model = %request.model,
            top_k = request.top_k,
            alpha = request.alpha,
            "Sending chat request"
        );

        let response = self.client.post(&url).json(request).send().await?;
        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }

        Ok(response.json().await?)
    }

    /// Upload one file as the backend's multipart `file` field.
    pub async fn upload(
        &self,
        file_name: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> Result<UploadAck, BackendError> {
        let url = format!("{}/upload/", self.base_url);

        let part = multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(mime_type)?;
        let form = multipart::Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }

        Ok(response.json().await?)
    }

    pub async fn list_articles(&self) -> Result<Vec<Article>, BackendError> {
        let url = format!("{}/articles", self.base_url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }

        let listing: ArticleListing = response.json().await?;
        Ok(listing.articles)
    }

    pub async fn delete_article(&self, id: i64) -> Result<(), BackendError> {
        let url = format!("{}/docs/{}", self.base_url, id);

        let response = self.client.delete(&url).send().await?;
        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }

        Ok(())
    }
}
