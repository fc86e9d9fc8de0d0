//! Generation gateway.
//!
//! Wraps a [`GenerationProvider`] with a bounded, fixed-delay retry loop and
//! connects it to the quiz parser.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::error::ProviderError;
use crate::parser::{parse_quiz_response, ParseOutcome};
use crate::prompts::{quiz_prompt, QUIZ_SYSTEM_PROMPT};
use crate::traits::{GenerateRequest, GenerateResponse, GenerationProvider};

/// How many times to call the provider and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 act as 1.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Errors surfaced by the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("prompt is required")]
    EmptyPrompt,

    #[error("generation failed after {attempts} attempt(s)")]
    Exhausted {
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },
}

impl GatewayError {
    /// The provider error from the final attempt, when it was one.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            GatewayError::Exhausted { source, .. } => source.downcast_ref::<ProviderError>(),
            GatewayError::EmptyPrompt => None,
        }
    }
}

/// A quiz produced by the gateway.
#[derive(Debug, Clone)]
pub struct GeneratedQuiz {
    pub topic: String,
    pub outcome: ParseOutcome,
    pub response: GenerateResponse,
}

/// Provider plus model plus retry policy.
pub struct GenerationGateway {
    provider: Arc<dyn GenerationProvider>,
    model: String,
    policy: RetryPolicy,
}

impl GenerationGateway {
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        model: impl Into<String>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            policy,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Send `prompt` to the configured model.
    pub async fn generate(&self, prompt: &str) -> Result<GenerateResponse, GatewayError> {
        self.generate_request(&GenerateRequest::new(&self.model, prompt))
            .await
    }

    /// Send a fully specified request, retrying any provider failure.
    pub async fn generate_request(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, GatewayError> {
        if request.prompt.trim().is_empty() {
            return Err(GatewayError::EmptyPrompt);
        }

        let max_attempts = self.policy.max_attempts.max(1);
        let started = Instant::now();
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.policy.delay).await;
            }

            match self.provider.generate(request).await {
                Ok(response) => {
                    tracing::info!(
                        provider = self.provider.name(),
                        model = %response.model,
                        attempt,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "generation succeeded"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!(
                        provider = self.provider.name(),
                        attempt,
                        max_attempts,
                        hint = classify(&e),
                        "generation attempt failed: {e:#}"
                    );
                    last_error = Some(e);
                }
            }
        }

        let source = last_error.unwrap_or_else(|| anyhow::anyhow!("no attempt was made"));
        tracing::error!(
            provider = self.provider.name(),
            attempts = max_attempts,
            "generation gave up: {source:#}"
        );
        Err(GatewayError::Exhausted {
            attempts: max_attempts,
            source,
        })
    }

    /// Generate and parse a quiz for `topic`.
    ///
    /// Only the provider call can fail; parsing always yields questions.
    pub async fn generate_quiz(&self, topic: &str) -> Result<GeneratedQuiz, GatewayError> {
        let mut request = GenerateRequest::new(&self.model, quiz_prompt(topic));
        request.system_prompt = Some(QUIZ_SYSTEM_PROMPT.to_string());

        let response = self.generate_request(&request).await?;
        let outcome = parse_quiz_response(&response.content, topic);

        Ok(GeneratedQuiz {
            topic: topic.to_string(),
            outcome,
            response,
        })
    }
}

fn classify(error: &anyhow::Error) -> &'static str {
    error
        .downcast_ref::<ProviderError>()
        .map(ProviderError::hint)
        .unwrap_or("unclassified failure")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use crate::traits::{ModelInfo, TokenUsage};

    /// Fails the first `failures` calls, then echoes the prompt.
    struct FlakyProvider {
        failures: u32,
        calls: AtomicU32,
        reply: String,
    }

    impl FlakyProvider {
        fn new(failures: u32, reply: &str) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                reply: reply.to_string(),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationProvider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.failures {
                return Err(ProviderError::RateLimited { retry_after_ms: 10 }.into());
            }
            Ok(GenerateResponse {
                content: self.reply.clone(),
                model: request.model.clone(),
                token_usage: TokenUsage::default(),
                latency_ms: 1,
            })
        }

        fn available_models(&self) -> Vec<ModelInfo> {
            vec![]
        }
    }

    fn gateway(provider: Arc<FlakyProvider>) -> GenerationGateway {
        GenerationGateway::new(provider, "test-model", RetryPolicy::default())
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let provider = Arc::new(FlakyProvider::new(2, "ok"));
        let gw = gateway(provider.clone());

        let started = tokio::time::Instant::now();
        let response = gw.generate("hello").await.unwrap();

        assert_eq!(response.content, "ok");
        assert_eq!(response.model, "test-model");
        assert_eq!(provider.calls(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let provider = Arc::new(FlakyProvider::new(u32::MAX, "never"));
        let gw = gateway(provider.clone());

        let err = gw.generate("hello").await.unwrap_err();
        assert_eq!(provider.calls(), 3);
        match &err {
            GatewayError::Exhausted { attempts, .. } => assert_eq!(*attempts, 3),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            err.provider_error(),
            Some(ProviderError::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected_without_calling_provider() {
        let provider = Arc::new(FlakyProvider::new(0, "ok"));
        let gw = gateway(provider.clone());

        let err = gw.generate("   ").await.unwrap_err();
        assert!(matches!(err, GatewayError::EmptyPrompt));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_still_tries_once() {
        let provider = Arc::new(FlakyProvider::new(0, "ok"));
        let gw = GenerationGateway::new(
            provider.clone(),
            "m",
            RetryPolicy {
                max_attempts: 0,
                delay: Duration::from_millis(5),
            },
        );
        gw.generate("x").await.unwrap();
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn generate_quiz_falls_back_on_unusable_text() {
        let provider = Arc::new(FlakyProvider::new(0, "I cannot do that."));
        let gw = gateway(provider);

        let quiz = gw.generate_quiz("Python basics").await.unwrap();
        assert!(quiz.outcome.is_fallback());
        assert_eq!(quiz.outcome.questions().len(), 10);
        assert_eq!(quiz.topic, "Python basics");
    }

    #[tokio::test]
    async fn generate_quiz_parses_json_reply() {
        let reply = r#"[{"question":"Q","options":["a","b","c","d"],"correctAnswer":"b"}]"#;
        let provider = Arc::new(FlakyProvider::new(0, reply));
        let gw = gateway(provider);

        let quiz = gw.generate_quiz("letters").await.unwrap();
        assert_eq!(quiz.outcome.source_label(), "json");
        assert_eq!(quiz.outcome.questions()[0].correct_answer, "b");
    }
}
