use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a locally staged document.
///
/// A staged document starts at `processing` and moves to exactly one of
/// `completed` or `error` when its upload settles. There is no transition
/// out of a terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StagedStatus {
    Processing,
    Completed,
    Error,
}

/// A file selected client-side, not yet confirmed ingested by the backend.
///
/// Distinct from [`Article`]: a successful upload makes the file part of the
/// backend's article set, but the staged entry itself stays around (marked
/// `completed`) until the user removes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedDocument {
    /// Locally generated identifier; the reconciliation key for uploads.
    pub id: String,
    pub name: String,
    pub size_label: String,
    pub date_label: String,
    pub status: StagedStatus,
}

impl StagedDocument {
    pub fn new(name: String, size: usize, staged_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            size_label: format_size(size as u64),
            date_label: staged_at.format("%d/%m/%Y").to_string(),
            status: StagedStatus::Processing,
        }
    }
}

/// A document the backend has already ingested and indexed, addressable by
/// its server-assigned id. The local set of these is a mirror of the
/// backend's listing, never the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    /// Opaque display value; the backend's timestamp format is not guaranteed.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Human-readable size, computed once at staging time.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
