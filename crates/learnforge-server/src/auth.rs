//! Bearer tokens, password hashing and the authenticated-user extractor.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use learnforge_core::model::{Role, UserProfile};

use crate::error::ApiError;
use crate::AppState;

/// Lifetime of the `state` parameter in an OAuth round trip.
const OAUTH_STATE_TTL_SECS: i64 = 600;

/// Claims carried in a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateClaims {
    provider: String,
    nonce: String,
    iat: i64,
    exp: i64,
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Issues and verifies HS256 tokens with one shared secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"***")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX / 2),
        }
    }

    pub fn issue(&self, user: &UserProfile) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();
        self.sign(&Claims {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            username: user.username.clone(),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        })
    }

    /// Sign arbitrary session claims.
    pub fn sign(&self, claims: &Claims) -> Result<String, ApiError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| ApiError::internal("Failed to issue token", e))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("rejected token: {e}");
                ApiError::unauthorized("Invalid or expired token")
            })
    }

    /// A signed, short-lived `state` value bound to one identity provider.
    pub fn issue_oauth_state(&self, provider: &str) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();
        let claims = StateClaims {
            provider: provider.to_string(),
            nonce: uuid::Uuid::new_v4().to_string(),
            iat: now,
            exp: now + OAUTH_STATE_TTL_SECS,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::internal("Failed to start sign-in", e))
    }

    pub fn verify_oauth_state(&self, state: &str, provider: &str) -> bool {
        decode::<StateClaims>(state, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims.provider == provider)
            .unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Passwords
// ---------------------------------------------------------------------------

/// Argon2id hash in PHC string form. Runs on the blocking pool.
pub async fn hash_password(password: &str) -> Result<String, ApiError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
    })
    .await
    .map_err(|e| ApiError::internal("Password hashing failed", e))?
    .map_err(|e| ApiError::internal("Password hashing failed", e))
}

/// `false` for a wrong password or an unreadable hash.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || {
        PasswordHash::new(&hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    })
    .await
    .map_err(|e| ApiError::internal("Password verification failed", e))
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// The caller behind a valid `Authorization: Bearer` token.
///
/// The account must still exist.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Claims,
    pub profile: UserProfile,
}

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.profile.id
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let claims = state.tokens.verify(token)?;
        let profile = state
            .store
            .find_user_by_id(claims.id)?
            .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

        Ok(AuthUser { claims, profile })
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
