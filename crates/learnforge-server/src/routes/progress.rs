//! `/api/progress`: module completion per learning path.

use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use learnforge_core::model::ProgressRecord;

use super::present;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiJson};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(upsert))
        .route("/{learning_path_id}", get(list_for_path))
        .route("/{learning_path_id}/{module}", delete(remove))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressBody {
    learning_path_id: Option<i64>,
    module: Option<String>,
    completion: Option<f64>,
}

async fn upsert(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<ProgressBody>,
) -> Result<Json<ProgressRecord>, ApiError> {
    let (Some(learning_path_id), Some(module), Some(completion)) =
        (body.learning_path_id, present(&body.module), body.completion)
    else {
        return Err(ApiError::bad_request(
            "learningPathId, module, and completion are required",
        ));
    };
    if !(0.0..=100.0).contains(&completion) {
        return Err(ApiError::bad_request("completion must be between 0 and 100"));
    }

    let record = state
        .store
        .upsert_progress(user.id(), learning_path_id, module, completion)?;
    Ok(Json(record))
}

async fn list_all(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ProgressRecord>>, ApiError> {
    Ok(Json(state.store.list_progress(user.id())?))
}

async fn list_for_path(
    State(state): State<AppState>,
    user: AuthUser,
    Path(learning_path_id): Path<i64>,
) -> Result<Json<Vec<ProgressRecord>>, ApiError> {
    Ok(Json(
        state
            .store
            .list_progress_for_path(user.id(), learning_path_id)?,
    ))
}

async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path((learning_path_id, module)): Path<(i64, String)>,
) -> Result<Json<Value>, ApiError> {
    state
        .store
        .delete_progress(user.id(), learning_path_id, &module)?;
    Ok(Json(json!({ "message": "Progress deleted successfully" })))
}
