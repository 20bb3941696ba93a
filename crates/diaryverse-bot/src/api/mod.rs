// diaryverse-bot/src/api/mod.rs
//! API module - HTTP handlers for chat, QA, generation and status

pub mod error;
pub mod chat_api;
pub mod qa_api;
pub mod generate_api;
pub mod admin_api;

// Re-export API handlers
pub use error::ApiError;
pub use chat_api::{chat, reset_conversation, get_history};
pub use qa_api::answer_question;
pub use generate_api::generate_text;
pub use admin_api::{health, models_info, not_found};
