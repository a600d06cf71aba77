use serde::{Deserialize, Serialize};
use validator::Validate;

/// The system prompt the assistant ships with (Vietnamese legal advisor
/// persona). `POST /api/settings/reset-prompt` restores it.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"Bạn là một trợ lý pháp lý thân thiện, lịch sự và trung thực của Việt Nam
Nhiệm vụ của bạn:
1. Nếu người dùng CHÀO HỎI → hãy trả lời chào hỏi tự nhiên, thân thiện.
2. Nếu người dùng hỏi VỀ PHÁP LUẬT → bạn chỉ được phép trả lời dựa trên TÀI LIỆU dưới đây (nếu có) và giải thích rõ ràng nếu người dùng cần, không hiểu.
3. Nếu câu hỏi KHÔNG LIÊN QUAN đến pháp luật → hãy lịch sự từ chối và nói rằng bạn chỉ hỗ trợ câu hỏi pháp luật.
4. Nếu không tìm thấy nội dung liên quan trong tài liệu → hãy trả lời:
"Tôi xin lỗi, tôi không có đủ thông tin trong tài liệu hiện tại để trả lời câu hỏi này."
"#;

/// Retrieval and generation parameters forwarded verbatim to the backend.
///
/// Handlers snapshot this into each chat request at send time; nothing reads
/// it from ambient state mid-request. The ranges mirror what the input
/// widgets allowed; out-of-range updates are rejected, not clamped.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QueryConfig {
    pub model: String,
    #[validate(range(min = 1, max = 20))]
    pub top_k: u8,
    /// Hybrid-search blend weight: 0 is pure keyword, 1 is pure semantic.
    #[validate(range(min = 0.0, max = 1.0))]
    pub semantic_weight: f64,
    pub system_prompt: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            top_k: 5,
            semantic_weight: 0.7,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_within_range() {
        assert!(QueryConfig::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_top_k_is_rejected() {
        let config = QueryConfig {
            top_k: 50,
            ..QueryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_weight_is_rejected() {
        let config = QueryConfig {
            semantic_weight: 1.5,
            ..QueryConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
