use crate::models::chat::ChatMessage;
use crate::services::conversation::SendError;
use crate::AppState;
use assistant_core::error::AppError;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct TranscriptResponse {
    pub messages: Vec<ChatMessage>,
    pub typing: bool,
}

pub async fn transcript(State(state): State<AppState>) -> Json<TranscriptResponse> {
    Json(TranscriptResponse {
        messages: state.conversation.transcript().await,
        typing: state.conversation.is_typing().await,
    })
}

pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<ChatMessage>, AppError> {
    // Snapshot the configuration at request time.
    let config = state.query_config.read().await.clone();

    let reply = state
        .conversation
        .send(&body.message, config)
        .await
        .map_err(|e| match e {
            SendError::EmptyMessage => AppError::BadRequest(e.into()),
            SendError::AlreadyInFlight => AppError::Conflict(e.into()),
        })?;

    Ok(Json(reply))
}

pub async fn suggestions(State(state): State<AppState>) -> Json<Vec<&'static str>> {
    Json(state.conversation.suggestions().await)
}
