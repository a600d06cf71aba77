pub mod chat;
pub mod document;
pub mod settings;

pub use chat::{ChatMessage, Role};
pub use document::{Article, StagedDocument, StagedStatus};
