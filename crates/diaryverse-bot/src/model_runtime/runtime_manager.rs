//! Runtime Manager
//!
//! Owns the question-answering and text-generation runtimes. They are only
//! needed by `/qa` and `/generate`, so construction is deferred to the first
//! request that uses them and shared afterwards.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{error, info};

use super::runtime_trait::*;
use crate::metrics;

pub const QA_FALLBACK_ANSWER: &str = "I couldn't find an answer in the provided context.";

/// The lazily created runtimes.
#[derive(Clone)]
pub struct AdvancedRuntimes {
    pub qa: Arc<dyn QuestionAnswerer>,
    pub text_gen: Arc<dyn TextGenerator>,
}

type RuntimeFactory = Arc<dyn Fn() -> anyhow::Result<AdvancedRuntimes> + Send + Sync>;

pub struct RuntimeManager {
    qa_model: String,
    text_gen_model: String,
    factory: RuntimeFactory,
    runtimes: OnceCell<AdvancedRuntimes>,
}

impl RuntimeManager {
    pub fn new<F>(qa_model: impl Into<String>, text_gen_model: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> anyhow::Result<AdvancedRuntimes> + Send + Sync + 'static,
    {
        Self {
            qa_model: qa_model.into(),
            text_gen_model: text_gen_model.into(),
            factory: Arc::new(factory),
            runtimes: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.runtimes.initialized()
    }

    pub fn qa_model(&self) -> &str {
        &self.qa_model
    }

    pub fn text_gen_model(&self) -> &str {
        &self.text_gen_model
    }

    /// Returns the runtimes, creating them on first use.
    pub async fn runtimes(&self) -> anyhow::Result<&AdvancedRuntimes> {
        self.runtimes
            .get_or_try_init(|| async {
                info!("Initializing advanced AI...");
                let runtimes = (self.factory)()?;
                info!("Advanced AI ready!");
                Ok::<_, anyhow::Error>(runtimes)
            })
            .await
    }

    /// Answers from the context. Inference failures degrade to a zero-confidence
    /// placeholder answer; only initialization failures are returned as errors.
    pub async fn answer_question(&self, question: &str, context: &str) -> anyhow::Result<QaAnswer> {
        let runtimes = self.runtimes().await?;
        let started = Instant::now();
        let result = runtimes.qa.answer(question, context).await;
        metrics::observe_inference("qa", started.elapsed().as_secs_f64());

        Ok(result.unwrap_or_else(|e| {
            error!("Error in question answering: {}", e);
            QaAnswer {
                answer: QA_FALLBACK_ANSWER.to_string(),
                confidence: 0.0,
                start: None,
                end: None,
            }
        }))
    }

    /// Continues the prompt. Inference failures degrade to a single
    /// placeholder sequence; only initialization failures are returned as errors.
    pub async fn generate_text(
        &self,
        prompt: &str,
        max_length: u32,
        num_sequences: u32,
    ) -> anyhow::Result<Vec<String>> {
        let runtimes = self.runtimes().await?;
        let started = Instant::now();
        let result = runtimes.text_gen
            .generate(prompt, &SamplingParams::creative(max_length), num_sequences)
            .await;
        metrics::observe_inference("text_generation", started.elapsed().as_secs_f64());

        Ok(result.unwrap_or_else(|e| {
            error!("Error in text generation: {}", e);
            vec![format!("{} (Error: Could not generate text)", prompt)]
        }))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) struct FixedQa(pub Option<QaAnswer>);

    #[async_trait]
    impl QuestionAnswerer for FixedQa {
        async fn answer(&self, _question: &str, _context: &str) -> anyhow::Result<QaAnswer> {
            self.0.clone().ok_or_else(|| anyhow::anyhow!("qa backend down"))
        }

        fn metadata(&self) -> ModelMetadata {
            ModelMetadata { model: "qa".into(), endpoint: "mem".into(), task: "question-answering".into() }
        }
    }

    pub(crate) struct EchoGenerator {
        pub fail: bool,
    }

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _params: &SamplingParams,
            num_sequences: u32,
        ) -> anyhow::Result<Vec<String>> {
            if self.fail {
                return Err(anyhow::anyhow!("generator down"));
            }
            Ok((0..num_sequences).map(|i| format!("{} #{}", prompt, i)).collect())
        }

        fn metadata(&self) -> ModelMetadata {
            ModelMetadata { model: "gen".into(), endpoint: "mem".into(), task: "text-generation".into() }
        }
    }

    pub(crate) fn manager_with(qa: Option<QaAnswer>, gen_fails: bool) -> RuntimeManager {
        RuntimeManager::new("qa-model", "gen-model", move || {
            Ok(AdvancedRuntimes {
                qa: Arc::new(FixedQa(qa.clone())),
                text_gen: Arc::new(EchoGenerator { fail: gen_fails }),
            })
        })
    }

    #[tokio::test]
    async fn test_runtimes_are_created_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let manager = RuntimeManager::new("qa", "gen", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(AdvancedRuntimes {
                qa: Arc::new(FixedQa(None)),
                text_gen: Arc::new(EchoGenerator { fail: false }),
            })
        });

        assert!(!manager.is_loaded());
        manager.generate_text("a", 10, 1).await.unwrap();
        manager.generate_text("b", 10, 1).await.unwrap();

        assert!(manager.is_loaded());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_initialization_is_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let manager = RuntimeManager::new("qa", "gen", move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(anyhow::anyhow!("first attempt fails"));
            }
            Ok(AdvancedRuntimes {
                qa: Arc::new(FixedQa(None)),
                text_gen: Arc::new(EchoGenerator { fail: false }),
            })
        });

        assert!(manager.answer_question("q", "c").await.is_err());
        assert!(!manager.is_loaded());
        assert!(manager.answer_question("q", "c").await.is_ok());
        assert!(manager.is_loaded());
    }

    #[tokio::test]
    async fn test_answer_question_passes_through() {
        let expected = QaAnswer { answer: "yes".into(), confidence: 0.7, start: Some(0), end: Some(3) };
        let manager = manager_with(Some(expected.clone()), false);

        assert_eq!(manager.answer_question("q", "yes").await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_answer_question_degrades_on_inference_error() {
        let manager = manager_with(None, false);
        let answer = manager.answer_question("q", "c").await.unwrap();

        assert_eq!(answer.answer, QA_FALLBACK_ANSWER);
        assert_eq!(answer.confidence, 0.0);
        assert!(answer.start.is_none());
        assert!(answer.end.is_none());
    }

    #[tokio::test]
    async fn test_generate_text_degrades_on_inference_error() {
        let manager = manager_with(None, true);
        let results = manager.generate_text("Once upon a time", 50, 3).await.unwrap();

        assert_eq!(results, vec!["Once upon a time (Error: Could not generate text)"]);
    }

    #[tokio::test]
    async fn test_generate_text_returns_all_sequences() {
        let manager = manager_with(None, false);
        let results = manager.generate_text("p", 50, 3).await.unwrap();
        assert_eq!(results, vec!["p #0", "p #1", "p #2"]);
    }
}
