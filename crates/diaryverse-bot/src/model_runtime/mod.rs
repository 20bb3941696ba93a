//! Model runtimes
//!
//! Inference is delegated to external servers; each adapter here wraps one
//! task behind a trait so handlers and tests never see the wire format.
//!
//! - dialogue: OpenAI-compatible chat completions, with medium/large → small fallback
//! - question answering: Hugging Face pipeline endpoint
//! - text generation: OpenAI-compatible completions
pub mod runtime_trait;
pub mod dialogue_runtime;
pub mod qa_runtime;
pub mod textgen_runtime;
pub mod runtime_manager;
pub use runtime_trait::{DialogueModel, QuestionAnswerer, TextGenerator, SamplingParams, QaAnswer, ModelMetadata};
pub use dialogue_runtime::DialogueRuntime;
pub use qa_runtime::QaRuntime;
pub use textgen_runtime::TextGenRuntime;
pub use runtime_manager::{RuntimeManager, AdvancedRuntimes};
