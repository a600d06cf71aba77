//! Conversation transcript and single-flight chat orchestration.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::chat::ChatMessage;
use crate::models::settings::QueryConfig;
use crate::services::backend_client::{BackendClient, ChatRequest};
use crate::services::metrics;

/// Greeting seeded into every new transcript.
const GREETING: &str = "Xin chào! Tôi là trợ lý AI chuyên về pháp luật Việt Nam. Tôi có thể giúp bạn:\n\n• Tra cứu văn bản pháp luật\n• Giải thích các điều khoản pháp lý\n• Tư vấn về quy trình pháp lý\n• Phân tích tài liệu đã tải lên\n\nBạn cần hỗ trợ gì?";

/// Shown when the backend answers without an `answer` field.
const EMPTY_ANSWER: &str = "Không có phản hồi từ server.";

/// Fixed assistant turn appended when the chat call fails.
const BACKEND_ERROR: &str = "Lỗi khi gọi API backend.";

/// Suggested questions offered while the transcript holds only the greeting.
const QUICK_QUESTIONS: [&str; 4] = [
    "Quy định về thời gian làm việc",
    "Các loại hình doanh nghiệp",
    "Điều kiện hợp đồng lao động",
    "Quy trình thành lập công ty",
];

/// A send that was not accepted. The transcript is untouched in both cases.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("a chat request is already in flight")]
    AlreadyInFlight,
}

struct TranscriptState {
    messages: Vec<ChatMessage>,
    in_flight: bool,
}

pub struct Conversation {
    backend: Arc<BackendClient>,
    state: RwLock<TranscriptState>,
}

impl Conversation {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self {
            backend,
            state: RwLock::new(TranscriptState {
                messages: vec![ChatMessage::assistant(GREETING, Vec::new())],
                in_flight: false,
            }),
        }
    }

    /// Send one user turn.
    ///
    /// The user message is appended before the backend call and exactly one
    /// assistant turn follows it, even when the call fails. Only one send
    /// may be in flight: a concurrent send is rejected, not queued.
    /// `config` is a snapshot taken by the caller at request time.
    pub async fn send(&self, text: &str, config: QueryConfig) -> Result<ChatMessage, SendError> {
        let query = text.trim().to_string();
        if query.is_empty() {
            return Err(SendError::EmptyMessage);
        }

        {
            let mut state = self.state.write().await;
            if state.in_flight {
                return Err(SendError::AlreadyInFlight);
            }
            state.in_flight = true;
            state.messages.push(ChatMessage::user(query.clone()));
        }

        let request = ChatRequest::hybrid(&query, &config);
        let reply = match self.backend.chat(&request).await {
            Ok(response) => {
                metrics::record_chat("completed");
                let sources: Vec<String> =
                    response.sources.iter().map(|source| source.label()).collect();
                let answer = response
                    .answer
                    .filter(|answer| !answer.is_empty())
                    .unwrap_or_else(|| EMPTY_ANSWER.to_string());
                ChatMessage::assistant(answer, sources)
            }
            Err(e) => {
                metrics::record_chat("error");
                tracing::error!(error = %e, "Chat request failed");
                ChatMessage::assistant(BACKEND_ERROR, Vec::new())
            }
        };

        let mut state = self.state.write().await;
        state.in_flight = false;
        state.messages.push(reply.clone());
        Ok(reply)
    }

    pub async fn transcript(&self) -> Vec<ChatMessage> {
        self.state.read().await.messages.clone()
    }

    pub async fn is_typing(&self) -> bool {
        self.state.read().await.in_flight
    }

    /// Quick questions are offered only before the first exchange. Picking
    /// one is a client-side affordance; nothing here auto-submits.
    pub async fn suggestions(&self) -> Vec<&'static str> {
        if self.state.read().await.messages.len() <= 1 {
            QUICK_QUESTIONS.to_vec()
        } else {
            Vec::new()
        }
    }
}
