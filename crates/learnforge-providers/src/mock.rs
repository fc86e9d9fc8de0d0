//! Mock provider for tests and offline runs.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use learnforge_core::error::ProviderError;
use learnforge_core::traits::{
    GenerateRequest, GenerateResponse, GenerationProvider, ModelInfo, TokenUsage,
};

/// A reply in the JSON shape the quiz prompt asks for.
pub const SAMPLE_QUIZ_RESPONSE: &str = r#"[
  {"question": "What is 2 + 2?", "options": ["3", "4", "5", "22"], "correctAnswer": "B", "explanation": "Two plus two is four."},
  {"question": "Which planet is known as the Red Planet?", "options": ["Venus", "Jupiter", "Mars", "Saturn"], "correctAnswer": "C"},
  {"question": "What is the boiling point of water at sea level?", "options": ["100 °C", "90 °C", "80 °C", "120 °C"], "correctAnswer": "A"},
  {"question": "How many continents are there?", "options": ["5", "6", "8", "7"], "correctAnswer": "D"},
  {"question": "Which gas do plants absorb?", "options": ["Oxygen", "Carbon dioxide", "Nitrogen", "Helium"], "correctAnswer": "B"}
]"#;

/// A mock generation provider.
///
/// Replies are chosen by prompt substring, in insertion order, with a
/// default for everything else. The first `failures` calls can be scripted
/// to fail with a network error.
pub struct MockProvider {
    /// Prompt substring → response text.
    responses: Vec<(String, String)>,
    /// Response if no prompt matches.
    default_response: String,
    /// Calls that still have to fail.
    failures_remaining: AtomicU32,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    /// Create a mock with the given prompt→response mappings.
    pub fn new(responses: Vec<(String, String)>) -> Self {
        Self {
            responses,
            default_response: SAMPLE_QUIZ_RESPONSE.to_string(),
            failures_remaining: AtomicU32::new(0),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        let mut mock = Self::new(Vec::new());
        mock.default_response = response.to_string();
        mock
    }

    /// Fail the next `count` calls before answering.
    pub fn failing_first(self, count: u32) -> Self {
        self.failures_remaining.store(count, Ordering::Relaxed);
        self
    }

    /// Fail every call.
    pub fn always_failing() -> Self {
        Self::new(Vec::new()).failing_first(u32::MAX)
    }

    /// Number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last request made to this provider.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request.lock().ok().and_then(|guard| guard.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        let should_fail = self
            .failures_remaining
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(ProviderError::NetworkError("mock failure".into()).into());
        }

        let content = self
            .responses
            .iter()
            .find(|(key, _)| request.prompt.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_response.clone());

        // Rough estimate
        let prompt_tokens = (request.prompt.len() / 4) as u32;
        let completion_tokens = (content.len() / 4) as u32;

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learnforge_core::parser::parse_quiz_response;

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response("hello");
        let request = GenerateRequest::new("mock", "anything");

        let response = provider.generate(&request).await.unwrap();
        assert_eq!(response.content, "hello");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.last_request().unwrap().prompt, "anything");
    }

    #[tokio::test]
    async fn prompt_matching() {
        let provider = MockProvider::new(vec![
            ("rivers".to_string(), "Nile".to_string()),
            ("mountains".to_string(), "Everest".to_string()),
        ]);

        let resp = provider
            .generate(&GenerateRequest::new("mock", "Tell me about rivers"))
            .await
            .unwrap();
        assert_eq!(resp.content, "Nile");

        let resp = provider
            .generate(&GenerateRequest::new("mock", "and mountains"))
            .await
            .unwrap();
        assert_eq!(resp.content, "Everest");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn scripted_failures_then_success() {
        let provider = MockProvider::with_fixed_response("ok").failing_first(2);
        let request = GenerateRequest::new("mock", "x");

        assert!(provider.generate(&request).await.is_err());
        assert!(provider.generate(&request).await.is_err());
        assert_eq!(provider.generate(&request).await.unwrap().content, "ok");
        assert_eq!(provider.call_count(), 3);
    }

    #[test]
    fn sample_response_parses_as_json_quiz() {
        let outcome = parse_quiz_response(SAMPLE_QUIZ_RESPONSE, "general");
        assert_eq!(outcome.source_label(), "json");
        assert_eq!(outcome.questions().len(), 5);
        assert_eq!(outcome.questions()[1].correct_option(), Some("Mars"));
    }
}
