// crates/diaryverse-bot/src/lib.rs

pub mod api;
pub mod chatbot;
pub mod config;
pub mod memory;
pub mod metrics;
pub mod middleware;
pub mod model_runtime;
pub mod resolver;
pub mod server;
pub mod shared_state;
pub mod telemetry;
pub mod training;
pub mod utils;

// Public API exports
pub use chatbot::Chatbot;
pub use config::Config;
pub use memory::{ConversationStore, InMemoryConversationStore, Message};
pub use resolver::{Resolution, ResponseResolver, ResponseSource};
pub use server::{build_router, run_server};
pub use shared_state::AppState;
pub use training::{TrainedAnswers, TrainingClient};

// API exports
pub use api::{
    admin_api::{health, models_info},
    chat_api::{chat, get_history, reset_conversation, ChatRequest, ChatResponse},
    generate_api::{generate_text, GenerateRequest, GenerateResponse},
    qa_api::{answer_question, QaRequest, QaResponse},
};
