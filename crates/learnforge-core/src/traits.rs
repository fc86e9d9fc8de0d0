//! Core trait definitions for generation and identity providers.
//!
//! These async traits are implemented by the `learnforge-providers` crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Generation provider trait
// ---------------------------------------------------------------------------

/// Trait for generative-language backends.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Generate text from a prompt.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;

    /// List available models for this provider.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Request to generate text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "gemini-1.5-flash").
    pub model: String,
    /// The main prompt.
    pub prompt: String,
    /// Optional system instruction.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

impl GenerateRequest {
    /// A request with default sampling settings.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: 2048,
            temperature: 0.7,
        }
    }
}

/// Response from a generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The raw response text.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
}

// ---------------------------------------------------------------------------
// Identity provider trait
// ---------------------------------------------------------------------------

/// An external OAuth identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider name used in routes (e.g. "google").
    fn name(&self) -> &str;

    /// URL the browser is redirected to in order to sign in.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for the signed-in identity.
    async fn exchange_code(&self, code: &str) -> anyhow::Result<ExternalIdentity>;
}

/// A user identity asserted by an external provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    /// Provider name.
    pub provider: String,
    /// Stable provider-side account id.
    pub subject: String,
    /// Verified email address, when the provider shares one.
    pub email: Option<String>,
    /// Display name or login handle.
    pub display_name: Option<String>,
}

impl ExternalIdentity {
    /// Email used to find or create the local account.
    ///
    /// Providers may withhold the address; the account is then keyed on
    /// `{provider}_{subject}`.
    pub fn login_email(&self) -> String {
        match self.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => email.to_lowercase(),
            _ => format!("{}_{}", self.provider, self.subject),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_email_prefers_address() {
        let identity = ExternalIdentity {
            provider: "github".into(),
            subject: "42".into(),
            email: Some("Dev@Example.com".into()),
            display_name: None,
        };
        assert_eq!(identity.login_email(), "dev@example.com");
    }

    #[test]
    fn login_email_falls_back_to_subject() {
        let identity = ExternalIdentity {
            provider: "github".into(),
            subject: "42".into(),
            email: Some("  ".into()),
            display_name: Some("octo".into()),
        };
        assert_eq!(identity.login_email(), "github_42");
    }

    #[test]
    fn request_defaults() {
        let req = GenerateRequest::new("gemini-1.5-flash", "hi");
        assert_eq!(req.max_tokens, 2048);
        assert!(req.system_prompt.is_none());
    }
}
