//! Staged-document lifecycle and the local mirror of backend articles.
//!
//! Two related but distinct document sets live here. Staged documents are
//! files the user has selected locally; they move `processing → completed`
//! or `processing → error` when their upload settles and disappear only on
//! explicit removal. Articles are what the backend has already ingested;
//! the local set is a cache replaced wholesale on every successful fetch.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::models::document::{Article, StagedDocument, StagedStatus};
use crate::services::backend_client::{BackendClient, BackendError};
use crate::services::metrics;

/// Bytes waiting to be shipped to the backend, held next to the staged
/// entry and consumed exactly once when the entry is submitted.
struct PendingPayload {
    mime_type: String,
    data: Vec<u8>,
}

struct StagedEntry {
    document: StagedDocument,
    payload: Option<PendingPayload>,
}

/// A file handed over for staging.
pub struct IncomingFile {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Summary of one submit batch.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct BatchOutcome {
    pub submitted: usize,
    pub completed: usize,
    pub failed: usize,
}

pub struct DocumentLibrary {
    backend: Arc<BackendClient>,
    staged: RwLock<Vec<StagedEntry>>,
    articles: RwLock<Vec<Article>>,
    active_batches: AtomicUsize,
    shutdown: CancellationToken,
}

impl DocumentLibrary {
    pub fn new(backend: Arc<BackendClient>, shutdown: CancellationToken) -> Self {
        Self {
            backend,
            staged: RwLock::new(Vec::new()),
            articles: RwLock::new(Vec::new()),
            active_batches: AtomicUsize::new(0),
            shutdown,
        }
    }

    /// Stage files for a later upload. A file whose name is already staged
    /// is skipped; nothing is sent to the backend here.
    pub async fn stage(&self, files: Vec<IncomingFile>) -> Vec<StagedDocument> {
        let mut staged = self.staged.write().await;
        let mut added = Vec::new();

        for file in files {
            if staged.iter().any(|entry| entry.document.name == file.name) {
                tracing::debug!(name = %file.name, "File already staged, skipping");
                continue;
            }

            let document = StagedDocument::new(file.name, file.data.len(), Utc::now());
            tracing::info!(
                document_id = %document.id,
                name = %document.name,
                "Staged document"
            );
            added.push(document.clone());
            staged.push(StagedEntry {
                document,
                payload: Some(PendingPayload {
                    mime_type: file.mime_type,
                    data: file.data,
                }),
            });
        }

        added
    }

    /// Ship every staged entry that still holds its payload.
    ///
    /// Uploads run concurrently and settle independently: each settlement
    /// updates only its own entry (keyed by staged id), and each success
    /// refreshes the article mirror. Entries whose payload was consumed by
    /// an earlier batch are already handled and skipped. The submitting
    /// indicator clears only once the whole batch has settled.
    pub async fn submit(&self) -> BatchOutcome {
        let batch: Vec<(String, String, PendingPayload)> = {
            let mut staged = self.staged.write().await;
            staged
                .iter_mut()
                .filter_map(|entry| {
                    entry
                        .payload
                        .take()
                        .map(|p| (entry.document.id.clone(), entry.document.name.clone(), p))
                })
                .collect()
        };

        if batch.is_empty() {
            return BatchOutcome {
                submitted: 0,
                completed: 0,
                failed: 0,
            };
        }

        let submitted = batch.len();
        tracing::info!(count = submitted, "Submitting upload batch");

        self.active_batches.fetch_add(1, Ordering::SeqCst);
        let settlements = join_all(
            batch
                .into_iter()
                .map(|(id, name, payload)| self.upload_one(id, name, payload)),
        )
        .await;
        self.active_batches.fetch_sub(1, Ordering::SeqCst);

        let completed = settlements.iter().filter(|ok| **ok).count();
        BatchOutcome {
            submitted,
            completed,
            failed: submitted - completed,
        }
    }

    /// One upload settlement: a status transition keyed by the staged id,
    /// then a mirror refresh if the backend accepted the file. A failure
    /// here never touches sibling entries.
    async fn upload_one(&self, id: String, name: String, payload: PendingPayload) -> bool {
        let result = tokio::select! {
            _ = self.shutdown.cancelled() => {
                tracing::info!(document_id = %id, "Upload abandoned by shutdown");
                return false;
            }
            result = self.backend.upload(&name, &payload.mime_type, payload.data) => result,
        };

        match result {
            Ok(ack) => {
                self.set_status(&id, StagedStatus::Completed).await;
                metrics::record_upload("completed");
                tracing::info!(
                    document_id = %id,
                    name = %name,
                    backend_doc_id = ?ack.doc_id,
                    "Upload completed"
                );
                if let Err(e) = self.refresh_articles().await {
                    tracing::warn!(error = %e, "Article refresh after upload failed");
                }
                true
            }
            Err(e) => {
                self.set_status(&id, StagedStatus::Error).await;
                metrics::record_upload("error");
                tracing::error!(document_id = %id, name = %name, error = %e, "Upload failed");
                false
            }
        }
    }

    async fn set_status(&self, id: &str, status: StagedStatus) {
        let mut staged = self.staged.write().await;
        match staged.iter_mut().find(|entry| entry.document.id == id) {
            Some(entry) => entry.document.status = status,
            // The user removed the entry while its upload was in flight.
            None => tracing::debug!(document_id = %id, "Settled upload for a removed document"),
        }
    }

    /// Remove a staged entry. Purely local: a completed entry's article
    /// stays on the backend, a failed or pending one simply vanishes.
    pub async fn remove_staged(&self, id: &str) -> bool {
        let mut staged = self.staged.write().await;
        let before = staged.len();
        staged.retain(|entry| entry.document.id != id);
        staged.len() != before
    }

    /// Replace the article mirror with the backend's current listing. The
    /// previous mirror survives a failed fetch.
    pub async fn refresh_articles(&self) -> Result<usize, BackendError> {
        let listing = self.backend.list_articles().await?;
        let count = listing.len();
        *self.articles.write().await = listing;
        Ok(count)
    }

    /// Delete an ingested article. The mirror entry goes away only after
    /// the backend confirms; staged documents are unaffected either way.
    pub async fn delete_article(&self, id: i64) -> Result<(), BackendError> {
        self.backend.delete_article(id).await?;
        self.articles.write().await.retain(|article| article.id != id);
        tracing::info!(article_id = id, "Deleted article");
        Ok(())
    }

    pub async fn staged(&self, filter: Option<&str>) -> Vec<StagedDocument> {
        self.staged
            .read()
            .await
            .iter()
            .filter(|entry| matches_filter(&entry.document.name, filter))
            .map(|entry| entry.document.clone())
            .collect()
    }

    pub async fn articles(&self, filter: Option<&str>) -> Vec<Article> {
        self.articles
            .read()
            .await
            .iter()
            .filter(|article| matches_filter(&article.title, filter))
            .cloned()
            .collect()
    }

    pub fn is_submitting(&self) -> bool {
        self.active_batches.load(Ordering::SeqCst) > 0
    }
}

/// Case-insensitive substring match shared by both listings.
fn matches_filter(value: &str, filter: Option<&str>) -> bool {
    match filter {
        Some(term) if !term.trim().is_empty() => {
            value.to_lowercase().contains(&term.trim().to_lowercase())
        }
        _ => true,
    }
}
