//! `/api/ai`: raw generation and quiz generation through the gateway.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use learnforge_core::gateway::GatewayError;
use learnforge_core::model::QuizQuestion;
use learnforge_core::parser::{FallbackReason, ParseOutcome};

use super::present;
use crate::error::{ApiError, ApiJson};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate))
        .route("/test", get(test_connection))
        .route("/quiz", post(quiz))
}

#[derive(Debug, Deserialize)]
struct GenerateBody {
    prompt: Option<String>,
    topic: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuizBody {
    topic: Option<String>,
}

#[derive(Debug, Serialize)]
struct QuizResponse {
    topic: String,
    source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<FallbackReason>,
    questions: Vec<QuizQuestion>,
}

/// 500 body for a failed generation. The request id is also logged.
fn generation_failure(message: &str, err: &GatewayError) -> (StatusCode, Json<Value>) {
    let request_id = uuid::Uuid::new_v4().to_string();
    let details = match err.provider_error() {
        Some(provider) => format!("{err}: {provider} ({})", provider.hint()),
        None => format!("{err:#}"),
    };
    tracing::error!(%request_id, %details, "{message}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details,
            "requestId": request_id,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

async fn generate(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GenerateBody>,
) -> Result<Json<Value>, Response> {
    let Some(prompt) = present(&body.prompt) else {
        return Err(ApiError::bad_request("Prompt is required").into_response());
    };
    tracing::debug!(topic = ?body.topic, kind = ?body.kind, "generate request");

    match state.gateway.generate(prompt).await {
        Ok(response) => Ok(Json(json!({
            "candidates": [{ "output": response.content }],
        }))),
        Err(GatewayError::EmptyPrompt) => {
            Err(ApiError::bad_request("Prompt is required").into_response())
        }
        Err(err) => Err(generation_failure("Failed to generate suggestion", &err).into_response()),
    }
}

/// Sends a one-line prompt to check that the provider is reachable.
async fn test_connection(
    State(state): State<AppState>,
) -> Result<Json<Value>, Response> {
    match state
        .gateway
        .generate("Reply with the single word OK.")
        .await
    {
        Ok(response) => Ok(Json(json!({
            "success": true,
            "provider": state.gateway.provider_name(),
            "model": response.model,
            "output": response.content,
            "latencyMs": response.latency_ms,
        }))),
        Err(err) => Err(generation_failure("AI provider test failed", &err).into_response()),
    }
}

async fn quiz(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<QuizBody>,
) -> Result<Json<QuizResponse>, Response> {
    let Some(topic) = present(&body.topic) else {
        return Err(ApiError::bad_request("Topic is required").into_response());
    };

    let generated = state
        .gateway
        .generate_quiz(topic)
        .await
        .map_err(|err| generation_failure("Failed to generate quiz", &err).into_response())?;

    let source = generated.outcome.source_label();
    let (questions, reason) = match generated.outcome {
        ParseOutcome::Parsed { questions, .. } => (questions, None),
        ParseOutcome::Fallback { questions, reason } => (questions, Some(reason)),
    };

    Ok(Json(QuizResponse {
        topic: generated.topic,
        source,
        reason,
        questions,
    }))
}
