//! Google Gemini generative-language API provider.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use learnforge_core::error::ProviderError;
use learnforge_core::traits::{
    GenerateRequest, GenerateResponse, GenerationProvider, ModelInfo, TokenUsage,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Gemini API provider.
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: &str, base_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            api_key: api_key.trim().to_string(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: UsageMetadata,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Map an HTTP error status and body to a provider error.
fn classify_error(status: u16, body: String, model: &str, retry_after: Option<u64>) -> ProviderError {
    let parsed = serde_json::from_str::<GeminiError>(&body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .unwrap_or(body);
    let api_status = parsed.and_then(|e| e.error.status).unwrap_or_default();

    match status {
        429 => ProviderError::RateLimited {
            retry_after_ms: retry_after.unwrap_or(5) * 1000,
        },
        401 | 403 => ProviderError::AuthenticationFailed(message),
        400 if message.to_lowercase().contains("api key") => {
            ProviderError::AuthenticationFailed(message)
        }
        404 => ProviderError::ModelNotFound(model.to_string()),
        _ if api_status == "RESOURCE_EXHAUSTED" => ProviderError::RateLimited {
            retry_after_ms: retry_after.unwrap_or(5) * 1000,
        },
        _ => ProviderError::ApiError { status, message },
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingApiKey.into());
        }

        let start = Instant::now();

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            system_instruction: request.system_prompt.as_ref().map(|text| GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: text.clone() }],
            }),
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, request.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, body, &request.model, retry_after).into());
        }

        let api_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("failed to parse response: {e}")))?;

        if let Some(reason) = api_response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Err(ProviderError::SafetyBlocked(format!("prompt blocked: {reason}")).into());
        }

        let candidate = api_response
            .candidates
            .first()
            .ok_or_else(|| ProviderError::InvalidResponse("response has no candidates".into()))?;

        let content: String = candidate
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();

        if content.is_empty() && candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(ProviderError::SafetyBlocked("response blocked: SAFETY".into()).into());
        }

        let usage = &api_response.usage_metadata;
        let total_tokens = if usage.total_token_count > 0 {
            usage.total_token_count
        } else {
            usage.prompt_token_count + usage.candidates_token_count
        };

        Ok(GenerateResponse {
            content,
            model: api_response
                .model_version
                .unwrap_or_else(|| request.model.clone()),
            token_usage: TokenUsage {
                prompt_tokens: usage.prompt_token_count,
                completion_tokens: usage.candidates_token_count,
                total_tokens,
            },
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: "gemini-1.5-flash".into(),
                name: "Gemini 1.5 Flash".into(),
                provider: "gemini".into(),
                max_context: 1_048_576,
            },
            ModelInfo {
                id: "gemini-1.5-pro".into(),
                name: "Gemini 1.5 Pro".into(),
                provider: "gemini".into(),
                max_context: 2_097_152,
            },
            ModelInfo {
                id: "gemini-2.0-flash".into(),
                name: "Gemini 2.0 Flash".into(),
                provider: "gemini".into(),
                max_context: 1_048_576,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

    fn request() -> GenerateRequest {
        GenerateRequest::new("gemini-1.5-flash", "Quiz me on rivers")
    }

    fn provider_error(err: anyhow::Error) -> ProviderError {
        err.downcast::<ProviderError>().unwrap()
    }

    #[tokio::test]
    async fn successful_generation() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "[{\"question\":"}, {"text": "\"Q\"}]"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 30, "totalTokenCount": 42},
            "modelVersion": "gemini-1.5-flash-002"
        });

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "Quiz me on rivers"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("test-key", Some(server.uri()));
        let response = provider.generate(&request()).await.unwrap();

        assert_eq!(response.content, "[{\"question\":\"Q\"}]");
        assert_eq!(response.model, "gemini-1.5-flash-002");
        assert_eq!(response.token_usage.prompt_tokens, 12);
        assert_eq!(response.token_usage.total_tokens, 42);
    }

    #[tokio::test]
    async fn system_prompt_is_sent_as_instruction() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(body_partial_json(serde_json::json!({
                "systemInstruction": {"parts": [{"text": "be brief"}]},
                "generationConfig": {"maxOutputTokens": 2048}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("k", Some(server.uri()));
        let mut req = request();
        req.system_prompt = Some("be brief".into());
        let response = provider.generate(&req).await.unwrap();
        assert_eq!(response.content, "ok");
        assert_eq!(response.model, "gemini-1.5-flash");
    }

    #[tokio::test]
    async fn missing_key_fails_before_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("  ", Some(server.uri()));
        let err = provider_error(provider.generate(&request()).await.unwrap_err());
        assert!(matches!(err, ProviderError::MissingApiKey));
    }

    #[tokio::test]
    async fn invalid_key_maps_to_authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT"
                }
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("bad-key", Some(server.uri()));
        let err = provider_error(provider.generate(&request()).await.unwrap_err());
        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
        assert_eq!(err.hint(), "check the provider API key");
    }

    #[tokio::test]
    async fn rate_limiting() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("test-key", Some(server.uri()));
        let err = provider_error(provider.generate(&request()).await.unwrap_err());
        assert_eq!(err.retry_after_ms(), Some(7000));
    }

    #[tokio::test]
    async fn unknown_model() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("test-key", Some(server.uri()));
        let err = provider_error(provider.generate(&request()).await.unwrap_err());
        assert!(matches!(err, ProviderError::ModelNotFound(m) if m == "gemini-1.5-flash"));
    }

    #[tokio::test]
    async fn server_error_keeps_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("test-key", Some(server.uri()));
        let err = provider_error(provider.generate(&request()).await.unwrap_err());
        assert_eq!(err.to_string(), "API error (HTTP 503): The model is overloaded.");
    }

    #[tokio::test]
    async fn blocked_prompt_is_a_safety_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("test-key", Some(server.uri()));
        let err = provider_error(provider.generate(&request()).await.unwrap_err());
        assert!(matches!(err, ProviderError::SafetyBlocked(_)));
    }

    #[tokio::test]
    async fn safety_finish_without_text_is_a_safety_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new("test-key", Some(server.uri()));
        let err = provider_error(provider.generate(&request()).await.unwrap_err());
        assert!(matches!(err, ProviderError::SafetyBlocked(_)));
    }

    #[test]
    fn resource_exhausted_is_rate_limited() {
        let body = r#"{"error":{"code":400,"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = classify_error(400, body.into(), "m", None);
        assert_eq!(err.retry_after_ms(), Some(5000));
    }
}
