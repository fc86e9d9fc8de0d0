//! OAuth 2.0 sign-in with Google and GitHub.
//!
//! Both providers use the authorization-code flow: the browser is sent to
//! [`IdentityProvider::authorize_url`], the provider redirects back with a
//! `code`, and [`IdentityProvider::exchange_code`] trades it for an access
//! token and reads the account profile.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use learnforge_core::traits::{ExternalIdentity, IdentityProvider};

use crate::config::OAuthClientConfig;

const USER_AGENT: &str = concat!("learnforge/", env!("CARGO_PKG_VERSION"));

/// Errors from the code exchange or profile lookup.
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("profile lookup failed: {0}")]
    Profile(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Endpoint URLs for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthEndpoints {
    pub authorize_url: String,
    pub token_url: String,
    /// Profile endpoint (Google userinfo) or API base (GitHub).
    pub profile_url: String,
}

impl OAuthEndpoints {
    pub fn google() -> Self {
        Self {
            authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".into(),
            token_url: "https://oauth2.googleapis.com/token".into(),
            profile_url: "https://openidconnect.googleapis.com/v1/userinfo".into(),
        }
    }

    pub fn github() -> Self {
        Self {
            authorize_url: "https://github.com/login/oauth/authorize".into(),
            token_url: "https://github.com/login/oauth/access_token".into(),
            profile_url: "https://api.github.com".into(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// State shared by both providers.
struct OAuthClient {
    client_id: String,
    client_secret: String,
    redirect_url: String,
    scope: &'static str,
    endpoints: OAuthEndpoints,
    http: reqwest::Client,
}

impl OAuthClient {
    fn new(config: &OAuthClientConfig, scope: &'static str, endpoints: OAuthEndpoints) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_url: config.redirect_url.clone().unwrap_or_default(),
            scope,
            endpoints,
            http,
        }
    }

    fn authorize_url(&self, state: &str) -> String {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
            ("response_type", "code"),
            ("scope", self.scope),
            ("state", state),
        ];
        match reqwest::Url::parse_with_params(&self.endpoints.authorize_url, &params) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::warn!(
                    url = %self.endpoints.authorize_url,
                    "invalid authorize URL: {e}"
                );
                self.endpoints.authorize_url.clone()
            }
        }
    }

    async fn exchange(&self, code: &str) -> Result<String, OAuthError> {
        let response = self
            .http
            .post(&self.endpoints.token_url)
            .header("accept", "application/json")
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::TokenExchange(format!("HTTP {status}: {e}")))?;

        match (body.access_token, body.error) {
            (Some(token), None) if !token.is_empty() => Ok(token),
            (_, Some(error)) => Err(OAuthError::TokenExchange(match body.error_description {
                Some(desc) => format!("{error}: {desc}"),
                None => error,
            })),
            _ => Err(OAuthError::TokenExchange(format!(
                "HTTP {status}: no access token in response"
            ))),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
    ) -> Result<T, OAuthError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header("accept", "application/json")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OAuthError::Profile(format!("GET {url} returned HTTP {status}")));
        }
        response
            .json()
            .await
            .map_err(|e| OAuthError::Profile(format!("GET {url}: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Google
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct GoogleUserInfo {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Google sign-in.
pub struct GoogleIdentityProvider {
    inner: OAuthClient,
}

impl GoogleIdentityProvider {
    pub fn new(config: &OAuthClientConfig) -> Self {
        Self::with_endpoints(config, OAuthEndpoints::google())
    }

    pub fn with_endpoints(config: &OAuthClientConfig, endpoints: OAuthEndpoints) -> Self {
        Self {
            inner: OAuthClient::new(config, "openid email profile", endpoints),
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn authorize_url(&self, state: &str) -> String {
        self.inner.authorize_url(state)
    }

    #[instrument(skip_all, fields(provider = "google"))]
    async fn exchange_code(&self, code: &str) -> anyhow::Result<ExternalIdentity> {
        let token = self.inner.exchange(code).await?;
        let info: GoogleUserInfo = self
            .inner
            .get_json(&self.inner.endpoints.profile_url, &token)
            .await?;

        Ok(ExternalIdentity {
            provider: "google".into(),
            subject: info.sub,
            email: info.email,
            display_name: info.name,
        })
    }
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct GitHubUser {
    id: u64,
    login: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct GitHubEmail {
    email: String,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    verified: bool,
}

/// GitHub sign-in.
pub struct GitHubIdentityProvider {
    inner: OAuthClient,
}

impl GitHubIdentityProvider {
    pub fn new(config: &OAuthClientConfig) -> Self {
        Self::with_endpoints(config, OAuthEndpoints::github())
    }

    pub fn with_endpoints(config: &OAuthClientConfig, endpoints: OAuthEndpoints) -> Self {
        Self {
            inner: OAuthClient::new(config, "user:email", endpoints),
        }
    }

    /// Primary verified address from `/user/emails`, for accounts whose
    /// profile email is private.
    async fn primary_email(&self, token: &str) -> Option<String> {
        let url = format!("{}/user/emails", self.inner.endpoints.profile_url);
        match self.inner.get_json::<Vec<GitHubEmail>>(&url, token).await {
            Ok(emails) => emails
                .into_iter()
                .find(|e| e.primary && e.verified)
                .map(|e| e.email),
            Err(e) => {
                tracing::debug!("could not read GitHub emails: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for GitHubIdentityProvider {
    fn name(&self) -> &str {
        "github"
    }

    fn authorize_url(&self, state: &str) -> String {
        self.inner.authorize_url(state)
    }

    #[instrument(skip_all, fields(provider = "github"))]
    async fn exchange_code(&self, code: &str) -> anyhow::Result<ExternalIdentity> {
        let token = self.inner.exchange(code).await?;
        let url = format!("{}/user", self.inner.endpoints.profile_url);
        let user: GitHubUser = self.inner.get_json(&url, &token).await?;

        let email = match user.email.filter(|e| !e.trim().is_empty()) {
            Some(email) => Some(email),
            None => self.primary_email(&token).await,
        };

        Ok(ExternalIdentity {
            provider: "github".into(),
            subject: user.id.to_string(),
            email,
            display_name: Some(user.name.unwrap_or(user.login)),
        })
    }
}
