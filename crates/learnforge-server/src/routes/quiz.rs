//! `/api/quiz`: saved quizzes for the signed-in user, plus grading.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use learnforge_core::grading::{grade, GradeReport};
use learnforge_core::model::{ParsedQuiz, QuizRecord};
use learnforge_store::{NewQuiz, QuizUpdate};

use super::present;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiJson};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
        .route("/{id}/submit", post(submit))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizBody {
    title: Option<String>,
    topic: Option<String>,
    questions: Option<Value>,
    learning_path_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SubmitBody {
    #[serde(default)]
    answers: Vec<String>,
}

/// Questions arrive either as a JSON array or as that array serialized into
/// a string. Either way the stored form is the serialized array.
fn serialize_questions(value: &Value) -> Result<String, ApiError> {
    let parsed: ParsedQuiz = match value {
        Value::String(text) => serde_json::from_str(text),
        other => serde_json::from_value(other.clone()),
    }
    .map_err(|e| ApiError::bad_request(format!("questions must be an array of questions: {e}")))?;
    serde_json::to_string(&parsed).map_err(|e| ApiError::internal("Failed to store questions", e))
}

async fn list(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<QuizRecord>>, ApiError> {
    Ok(Json(state.store.list_quizzes(user.id())?))
}

async fn show(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<QuizRecord>, ApiError> {
    Ok(Json(state.store.get_quiz(user.id(), id)?))
}

async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<QuizBody>,
) -> Result<(StatusCode, Json<QuizRecord>), ApiError> {
    let (Some(title), Some(topic), Some(questions)) =
        (present(&body.title), present(&body.topic), body.questions.as_ref())
    else {
        return Err(ApiError::bad_request(
            "Title, topic, and questions are required",
        ));
    };

    let quiz = state.store.create_quiz(
        user.id(),
        &NewQuiz {
            title: title.to_string(),
            topic: topic.to_string(),
            questions: serialize_questions(questions)?,
            learning_path_id: body.learning_path_id,
        },
    )?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<QuizBody>,
) -> Result<Json<QuizRecord>, ApiError> {
    let questions = body.questions.as_ref().map(serialize_questions).transpose()?;
    let quiz = state.store.update_quiz(
        user.id(),
        id,
        &QuizUpdate {
            title: present(&body.title).map(str::to_string),
            topic: present(&body.topic).map(str::to_string),
            questions,
        },
    )?;
    Ok(Json(quiz))
}

async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_quiz(user.id(), id)?;
    Ok(Json(json!({ "message": "Quiz deleted successfully" })))
}

async fn submit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<SubmitBody>,
) -> Result<Json<GradeReport>, ApiError> {
    let quiz = state.store.get_quiz(user.id(), id)?;
    let questions = quiz
        .parsed_questions()
        .map_err(|e| ApiError::internal("Stored quiz is unreadable", e))?;
    let report = grade(&questions, &body.answers);
    tracing::info!(
        user_id = user.id(),
        quiz_id = id,
        correct = report.correct,
        total = report.total,
        "quiz submitted"
    );
    Ok(Json(report))
}
