//! Configuration and provider factories.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use learnforge_core::gateway::{GenerationGateway, RetryPolicy};
use learnforge_core::traits::{GenerationProvider, IdentityProvider};

use crate::gemini::GeminiProvider;
use crate::mock::MockProvider;
use crate::oauth::{GitHubIdentityProvider, GoogleIdentityProvider};

/// Configuration for a single generation provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Mock {
        /// Fixed reply; a sample quiz when unset.
        #[serde(default)]
        response: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Mock { response } => f
                .debug_struct("Mock")
                .field("response", &response.as_ref().map(|r| r.len()))
                .finish(),
        }
    }
}

/// Credentials for one OAuth application.
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthClientConfig {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Callback URL registered with the provider. Defaults to
    /// `{public_url}/api/auth/{provider}/callback`.
    #[serde(default)]
    pub redirect_url: Option<String>,
}

impl std::fmt::Debug for OAuthClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("redirect_url", &self.redirect_url)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OAuthConfig {
    #[serde(default)]
    pub google: Option<OAuthClientConfig>,
    #[serde(default)]
    pub github: Option<OAuthClientConfig>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Externally visible base URL of this server.
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Browser client base URL used for OAuth redirects.
    #[serde(default = "default_client_url")]
    pub client_url: String,
    /// Origins allowed by CORS.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_url: default_public_url(),
            client_url: default_client_url(),
            cors_origins: default_cors_origins(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Token signing and sign-in providers.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret. Must be set before serving.
    #[serde(default)]
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    #[serde(default)]
    pub oauth: OAuthConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: default_token_ttl(),
            oauth: OAuthConfig::default(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"***")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("oauth", &self.oauth)
            .finish()
    }
}

/// Top-level learnforge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnforgeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Default provider to use.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Default model to use.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Generation attempts per request, including the first.
    #[serde(default = "default_attempts")]
    pub max_attempts: u32,
    /// Fixed delay between attempts in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}
fn default_public_url() -> String {
    "http://localhost:5000".to_string()
}
fn default_client_url() -> String {
    "http://localhost:5173".to_string()
}
fn default_cors_origins() -> Vec<String> {
    (5173..=5175)
        .map(|port| format!("http://localhost:{port}"))
        .collect()
}
fn default_database_path() -> PathBuf {
    PathBuf::from("learnforge.db")
}
fn default_token_ttl() -> u64 {
    3600
}
fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_attempts() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    2000
}

impl Default for LearnforgeConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            max_attempts: default_attempts(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

impl LearnforgeConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    /// Configuration for the named provider.
    ///
    /// `gemini` and `mock` work without an explicit entry; a missing Gemini
    /// key surfaces as an error on the first generation.
    pub fn provider_config(&self, name: &str) -> Result<ProviderConfig> {
        if let Some(config) = self.providers.get(name) {
            return Ok(config.clone());
        }
        match name {
            "gemini" => Ok(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            }),
            "mock" => Ok(ProviderConfig::Mock { response: None }),
            other => anyhow::bail!(
                "provider '{other}' not configured. Add it to learnforge.toml under [providers.{other}]"
            ),
        }
    }

    /// Gateway for the named provider (or the default) with the configured
    /// model and retry policy.
    pub fn gateway(&self, provider: Option<&str>, model: Option<&str>) -> Result<GenerationGateway> {
        let name = provider.unwrap_or(&self.default_provider);
        let provider = create_provider(name, &self.provider_config(name)?)?;
        Ok(GenerationGateway::new(
            Arc::from(provider),
            model.unwrap_or(&self.default_model),
            self.retry_policy(),
        ))
    }

    /// Apply environment overrides using `lookup` to read variables.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("GEMINI_API_KEY") {
            let base_url = match self.providers.get("gemini") {
                Some(ProviderConfig::Gemini { base_url, .. }) => base_url.clone(),
                _ => None,
            };
            self.providers.insert(
                "gemini".into(),
                ProviderConfig::Gemini {
                    api_key: key,
                    base_url,
                },
            );
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(path) = lookup("LEARNFORGE_DATABASE") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(bind) = lookup("LEARNFORGE_BIND") {
            self.server.bind = bind;
        }
        override_oauth(&mut self.auth.oauth.google, "GOOGLE", &lookup);
        override_oauth(&mut self.auth.oauth.github, "GITHUB", &lookup);
    }

    /// Resolve `${VAR}` references in secret-bearing fields.
    fn resolve_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for config in self.providers.values_mut() {
            if let ProviderConfig::Gemini { api_key, base_url } = config {
                *api_key = resolve_env_vars(api_key, &lookup);
                if let Some(url) = base_url {
                    *url = resolve_env_vars(url, &lookup);
                }
            }
        }
        self.auth.jwt_secret = resolve_env_vars(&self.auth.jwt_secret, &lookup);
        for client in [&mut self.auth.oauth.google, &mut self.auth.oauth.github]
            .into_iter()
            .flatten()
        {
            client.client_id = resolve_env_vars(&client.client_id, &lookup);
            client.client_secret = resolve_env_vars(&client.client_secret, &lookup);
        }
    }
}

fn override_oauth(
    slot: &mut Option<OAuthClientConfig>,
    prefix: &str,
    lookup: &impl Fn(&str) -> Option<String>,
) {
    let id = lookup(&format!("{prefix}_CLIENT_ID"));
    let secret = lookup(&format!("{prefix}_CLIENT_SECRET"));
    if id.is_none() && secret.is_none() {
        return;
    }
    let client = slot.get_or_insert_with(|| OAuthClientConfig {
        client_id: String::new(),
        client_secret: String::new(),
        redirect_url: None,
    });
    if let Some(id) = id {
        client.client_id = id;
    }
    if let Some(secret) = secret {
        client.client_secret = secret;
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${") {
        let start = from + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = lookup(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        from = start + value.len();
    }
    result
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `learnforge.toml` in the current directory
/// 2. `~/.config/learnforge/config.toml`
///
/// Environment overrides: `GEMINI_API_KEY`, `JWT_SECRET`,
/// `LEARNFORGE_DATABASE`, `LEARNFORGE_BIND`, `GOOGLE_CLIENT_ID`,
/// `GOOGLE_CLIENT_SECRET`, `GITHUB_CLIENT_ID`, `GITHUB_CLIENT_SECRET`.
pub fn load_config() -> Result<LearnforgeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<LearnforgeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("learnforge.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            parse_config(
                &std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config: {}", path.display()))?,
            )
            .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => LearnforgeConfig::default(),
    };

    config.apply_overrides(env_lookup);
    config.resolve_env(env_lookup);
    Ok(config)
}

fn parse_config(content: &str) -> Result<LearnforgeConfig> {
    Ok(toml::from_str::<LearnforgeConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("learnforge"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Box<dyn GenerationProvider>> {
    tracing::debug!(provider = name, ?config, "creating provider");
    match config {
        ProviderConfig::Gemini { api_key, base_url } => {
            Ok(Box::new(GeminiProvider::new(api_key, base_url.clone())))
        }
        ProviderConfig::Mock { response } => Ok(Box::new(match response {
            Some(text) => MockProvider::with_fixed_response(text),
            None => MockProvider::default(),
        })),
    }
}

/// Identity providers with complete credentials, keyed by route name.
pub fn create_identity_providers(
    config: &LearnforgeConfig,
) -> HashMap<String, Arc<dyn IdentityProvider>> {
    let mut providers: HashMap<String, Arc<dyn IdentityProvider>> = HashMap::new();
    let oauth = &config.auth.oauth;

    if let Some(client) = complete_client(&oauth.google, "google", config) {
        providers.insert("google".into(), Arc::new(GoogleIdentityProvider::new(&client)));
    }
    if let Some(client) = complete_client(&oauth.github, "github", config) {
        providers.insert("github".into(), Arc::new(GitHubIdentityProvider::new(&client)));
    }
    providers
}

fn complete_client(
    client: &Option<OAuthClientConfig>,
    name: &str,
    config: &LearnforgeConfig,
) -> Option<OAuthClientConfig> {
    let client = client.as_ref()?;
    if client.client_id.is_empty() || client.client_secret.is_empty() {
        tracing::warn!(provider = name, "OAuth client is missing an id or secret, skipping");
        return None;
    }
    let mut client = client.clone();
    if client.redirect_url.is_none() {
        client.redirect_url = Some(format!(
            "{}/api/auth/{name}/callback",
            config.server.public_url.trim_end_matches('/')
        ));
    }
    Some(client)
}
