use crate::models::document::{Article, StagedDocument};
use crate::services::library::{BatchOutcome, IncomingFile};
use crate::AppState;
use assistant_core::error::AppError;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
}

#[derive(Serialize)]
pub struct StagedListResponse {
    pub documents: Vec<StagedDocument>,
    /// True while an upload batch has unsettled uploads.
    pub submitting: bool,
}

#[derive(Serialize)]
pub struct ArticleListResponse {
    pub articles: Vec<Article>,
}

pub async fn list_staged(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<StagedListResponse> {
    let documents = state.library.staged(params.q.as_deref()).await;
    Json(StagedListResponse {
        documents,
        submitting: state.library.is_submitting(),
    })
}

/// Stage every file in the multipart form. Files whose name is already
/// staged are skipped; nothing is uploaded yet.
pub async fn stage_documents(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Vec<StagedDocument>>, AppError> {
    let mut files = Vec::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.file_name().unwrap_or("unnamed").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        match field.bytes().await {
            Ok(bytes) => files.push(IncomingFile {
                name,
                mime_type,
                data: bytes.to_vec(),
            }),
            Err(e) => {
                tracing::error!(name = %name, error = %e, "Failed to read file field");
                continue; // Continue with next file instead of returning
            }
        }
    }

    if files.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "no readable files in request"
        )));
    }

    Ok(Json(state.library.stage(files).await))
}

pub async fn submit_documents(State(state): State<AppState>) -> Json<BatchOutcome> {
    Json(state.library.submit().await)
}

pub async fn remove_staged(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.library.remove_staged(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(anyhow::anyhow!(
            "no staged document with id {id}"
        )))
    }
}

pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<ArticleListResponse> {
    Json(ArticleListResponse {
        articles: state.library.articles(params.q.as_deref()).await,
    })
}

pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.library.delete_article(id).await.map_err(|e| {
        tracing::error!(article_id = id, error = %e, "Article deletion failed");
        AppError::BadGateway(format!("article deletion failed: {}", e))
    })?;

    Ok(StatusCode::NO_CONTENT)
}
