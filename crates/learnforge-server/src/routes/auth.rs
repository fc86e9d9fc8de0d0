//! `/api/auth`: registration, password login, profile and OAuth sign-in.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use learnforge_core::model::{Role, UserProfile};
use learnforge_core::traits::IdentityProvider;
use learnforge_store::NewUser;

use super::present;
use crate::auth::{hash_password, verify_password, AuthUser};
use crate::error::{ApiError, ApiJson};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(profile))
        .route("/protected", get(protected))
        .route("/{provider}", get(oauth_start))
        .route("/{provider}/callback", get(oauth_callback))
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(username), Some(email), Some(password)) = (
        present(&body.username),
        present(&body.email),
        body.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request(
            "Username, email, and password are required",
        ));
    };
    if !email.contains('@') {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    let role = match present(&body.role) {
        Some(role) => role
            .parse::<Role>()
            .map_err(|_| ApiError::bad_request(format!("Invalid role: {role}")))?,
        None => Role::default(),
    };

    if state.store.email_exists(email)? {
        return Err(ApiError::Conflict("Email already registered".into()));
    }
    if state.store.username_exists(username)? {
        return Err(ApiError::Conflict("Username already taken".into()));
    }

    let password_hash = hash_password(password).await?;
    let user = state.store.create_user(&NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: Some(password_hash),
        role,
    })?;
    let token = state.tokens.issue(&user)?;

    Ok((StatusCode::CREATED, Json(json!({ "token": token, "user": user }))))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(email), Some(password)) = (present(&body.email), body.password.as_deref()) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };

    let invalid = || ApiError::unauthorized("Invalid credentials");
    let credentials = state.store.find_user_by_email(email)?.ok_or_else(invalid)?;
    // Accounts created through OAuth have no password.
    let hash = credentials.password_hash.as_deref().ok_or_else(invalid)?;
    if !verify_password(password, hash).await? {
        tracing::info!(user_id = credentials.profile.id, "failed login");
        return Err(invalid());
    }

    let token = state.tokens.issue(&credentials.profile)?;
    Ok(Json(json!({ "token": token })))
}

async fn profile(user: AuthUser) -> Json<UserProfile> {
    Json(user.profile)
}

async fn protected(user: AuthUser) -> Json<Value> {
    Json(json!({
        "message": "You have access to this protected route",
        "user": user.profile,
    }))
}

// ---------------------------------------------------------------------------
// OAuth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

fn identity_provider(state: &AppState, name: &str) -> Result<Arc<dyn IdentityProvider>, ApiError> {
    state
        .identity_providers
        .get(name)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("Sign-in with '{name}' is not configured")))
}

async fn oauth_start(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Redirect, ApiError> {
    let identity = identity_provider(&state, &provider)?;
    let oauth_state = state.tokens.issue_oauth_state(&provider)?;
    Ok(Redirect::to(&identity.authorize_url(&oauth_state)))
}

/// Always answers with a redirect to the front end once the provider is
/// known: the dashboard with a token, or the login page with an error flag.
async fn oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, ApiError> {
    let identity = identity_provider(&state, &provider)?;

    match complete_sign_in(&state, &provider, identity.as_ref(), query).await {
        Ok(token) => Ok(Redirect::to(&format!(
            "{}/dashboard?token={token}",
            state.client_url
        ))),
        Err(e) => {
            tracing::warn!(%provider, "OAuth sign-in failed: {e:#}");
            Ok(Redirect::to(&format!("{}/login?error=oauth", state.client_url)))
        }
    }
}

async fn complete_sign_in(
    state: &AppState,
    provider: &str,
    identity: &dyn IdentityProvider,
    query: CallbackQuery,
) -> anyhow::Result<String> {
    if let Some(error) = query.error {
        anyhow::bail!("provider returned '{error}'");
    }
    let oauth_state = query.state.context("missing state parameter")?;
    if !state.tokens.verify_oauth_state(&oauth_state, provider) {
        anyhow::bail!("state parameter is invalid or expired");
    }
    let code = present(&query.code).context("missing authorization code")?;

    let external = identity.exchange_code(code).await?;
    let user = state.store.find_or_create_oauth_user(&external)?;
    tracing::info!(user_id = user.id, %provider, "OAuth sign-in");
    Ok(state.tokens.issue(&user)?)
}
