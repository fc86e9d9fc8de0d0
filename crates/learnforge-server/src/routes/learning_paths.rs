//! `/api/learning-paths`: per-user learning paths.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use learnforge_core::learning_path::{outline_modules, LearningModule};
use learnforge_core::model::{LearningPathRecord, LearningPathStatus};
use learnforge_core::prompts::learning_path_prompt;
use learnforge_store::{LearningPathUpdate, NewLearningPath};

use super::present;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiJson};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct CreateBody {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    topic: Option<String>,
    level: Option<String>,
    duration: Option<String>,
    status: Option<String>,
    /// Ask the AI provider for the path content.
    #[serde(default)]
    generate: bool,
}

#[derive(Debug, Deserialize)]
struct UpdateBody {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    status: Option<String>,
    modules: Option<Vec<LearningModule>>,
}

fn parse_status(status: &Option<String>) -> Result<Option<LearningPathStatus>, ApiError> {
    present(status)
        .map(|s| s.parse::<LearningPathStatus>().map_err(ApiError::BadRequest))
        .transpose()
}

async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<LearningPathRecord>>, ApiError> {
    Ok(Json(state.store.list_learning_paths(user.id())?))
}

async fn show(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<LearningPathRecord>, ApiError> {
    Ok(Json(state.store.get_learning_path(user.id(), id)?))
}

async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<CreateBody>,
) -> Result<(StatusCode, Json<LearningPathRecord>), ApiError> {
    let topic = present(&body.topic);
    let title = match (present(&body.title), topic) {
        (Some(title), _) => title.to_string(),
        (None, Some(topic)) => format!("{topic} Learning Path"),
        (None, None) => return Err(ApiError::bad_request("Title or topic is required")),
    };
    let duration = present(&body.duration);
    let modules = match (topic, duration) {
        (Some(topic), Some(duration)) => outline_modules(topic, duration),
        _ => Vec::new(),
    };

    let mut content = present(&body.content).map(str::to_string);
    if body.generate {
        let Some(topic) = topic else {
            return Err(ApiError::bad_request("A topic is required to generate a learning path"));
        };
        let prompt = learning_path_prompt(
            topic,
            present(&body.level).unwrap_or("beginner"),
            duration.unwrap_or("4-weeks"),
        );
        let response = state
            .gateway
            .generate(&prompt)
            .await
            .map_err(|e| ApiError::internal("Failed to generate learning path", format!("{e:#}")))?;
        content = Some(response.content);
    }

    let path = state.store.create_learning_path(
        user.id(),
        &NewLearningPath {
            title,
            description: present(&body.description).map(str::to_string),
            content,
            topic: topic.map(str::to_string),
            level: present(&body.level).map(str::to_string),
            duration: duration.map(str::to_string),
            status: parse_status(&body.status)?.unwrap_or_default(),
            modules,
        },
    )?;
    Ok((StatusCode::CREATED, Json(path)))
}

async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<UpdateBody>,
) -> Result<Json<LearningPathRecord>, ApiError> {
    let update = LearningPathUpdate {
        title: present(&body.title).map(str::to_string),
        description: body.description,
        content: body.content,
        status: parse_status(&body.status)?,
        modules: body.modules,
    };
    Ok(Json(state.store.update_learning_path(user.id(), id, &update)?))
}

async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_learning_path(user.id(), id)?;
    Ok(Json(json!({ "message": "Learning path deleted successfully" })))
}
