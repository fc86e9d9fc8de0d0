//! Minimal client for a running learnforge server.
//!
//! List responses are cached per client instance. A single CLI command
//! fetches each list at most once, so hits only occur when one `ApiClient`
//! serves several calls, as a long-lived embedder would.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::json;

use learnforge_core::cache::RevalidatingCache;
use learnforge_core::model::{LearningPathRecord, QuizQuestion, QuizRecord};

const LIST_TTL: Duration = Duration::from_secs(60);

pub struct ApiClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
    quizzes: RevalidatingCache<Vec<QuizRecord>>,
    learning_paths: RevalidatingCache<Vec<LearningPathRecord>>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self::with_ttl(base_url, token, LIST_TTL)
    }

    pub fn with_ttl(base_url: &str, token: &str, ttl: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            http: reqwest::Client::new(),
            quizzes: RevalidatingCache::new(ttl),
            learning_paths: RevalidatingCache::new(ttl),
        }
    }

    /// The user's quizzes. Served from cache while fresh.
    pub async fn list_quizzes(&mut self) -> Result<Vec<QuizRecord>> {
        if let Some(cached) = self.quizzes.get() {
            tracing::debug!(count = cached.len(), "quiz list from cache");
            return Ok(cached);
        }
        let quizzes: Vec<QuizRecord> = self
            .send(self.http.get(format!("{}/api/quiz", self.base_url)))
            .await?;
        self.quizzes.store(quizzes.clone());
        Ok(quizzes)
    }

    /// The user's learning paths. Served from cache while fresh.
    pub async fn list_learning_paths(&mut self) -> Result<Vec<LearningPathRecord>> {
        if let Some(cached) = self.learning_paths.get() {
            return Ok(cached);
        }
        let paths: Vec<LearningPathRecord> = self
            .send(self.http.get(format!("{}/api/learning-paths", self.base_url)))
            .await?;
        self.learning_paths.store(paths.clone());
        Ok(paths)
    }

    pub async fn create_quiz(
        &mut self,
        title: &str,
        topic: &str,
        questions: &[QuizQuestion],
    ) -> Result<QuizRecord> {
        let body = json!({ "title": title, "topic": topic, "questions": questions });
        let quiz = self
            .send(
                self.http
                    .post(format!("{}/api/quiz", self.base_url))
                    .json(&body),
            )
            .await?;
        self.quizzes.invalidate();
        Ok(quiz)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.base_url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or(body);
            anyhow::bail!("server returned {status}: {message}");
        }

        response
            .json::<T>()
            .await
            .context("server sent an unexpected response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn quiz_json(id: i64, title: &str) -> serde_json::Value {
        json!({
            "id": id,
            "userId": 1,
            "learningPathId": null,
            "title": title,
            "topic": "rust",
            "questions": "[]",
            "createdAt": "2024-05-01T10:00:00.000Z",
            "updatedAt": "2024-05-01T10:00:00.000Z"
        })
    }

    #[tokio::test]
    async fn list_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/quiz"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([quiz_json(1, "a")])))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = ApiClient::new(&server.uri(), "tok");
        assert_eq!(client.list_quizzes().await.unwrap().len(), 1);
        assert_eq!(client.list_quizzes().await.unwrap()[0].title, "a");
    }

    #[tokio::test]
    async fn create_invalidates_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/quiz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([quiz_json(1, "a")])))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/quiz"))
            .respond_with(ResponseTemplate::new(201).set_body_json(quiz_json(2, "b")))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = ApiClient::new(&server.uri(), "tok");
        client.list_quizzes().await.unwrap();
        let created = client.create_quiz("b", "rust", &[]).await.unwrap();
        assert_eq!(created.id, 2);
        client.list_quizzes().await.unwrap();
    }

    #[tokio::test]
    async fn learning_paths_have_their_own_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/learning-paths"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 3,
                "userId": 1,
                "title": "Rust",
                "status": "active",
                "modules": [],
                "createdAt": "2024-05-01T10:00:00.000Z",
                "updatedAt": "2024-05-01T10:00:00.000Z"
            }])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/quiz"))
            .respond_with(ResponseTemplate::new(201).set_body_json(quiz_json(2, "b")))
            .mount(&server)
            .await;

        let mut client = ApiClient::new(&server.uri(), "tok");
        let paths = client.list_learning_paths().await.unwrap();
        assert_eq!(paths[0].title, "Rust");
        client.create_quiz("b", "rust", &[]).await.unwrap();
        client.list_learning_paths().await.unwrap();
    }

    #[tokio::test]
    async fn zero_ttl_always_refetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/quiz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(2)
            .mount(&server)
            .await;

        let mut client = ApiClient::with_ttl(&server.uri(), "tok", Duration::ZERO);
        client.list_quizzes().await.unwrap();
        client.list_quizzes().await.unwrap();
    }

    #[tokio::test]
    async fn error_body_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/quiz"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "error": "Invalid or expired token" })),
            )
            .mount(&server)
            .await;

        let mut client = ApiClient::new(&server.uri(), "bad");
        let err = client.list_quizzes().await.unwrap_err().to_string();
        assert!(err.contains("401"));
        assert!(err.contains("Invalid or expired token"));
    }
}
