//! Provider error types.
//!
//! These error types represent failures when talking to a generative-language
//! provider. Defined in `learnforge-core` so the gateway can downcast and
//! classify errors for logging without string matching.

use thiserror::Error;

/// Errors that can occur when interacting with a generation provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 / quota-exhausted response.
    #[error("rate limited (quota exceeded), retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// No API key was configured.
    #[error("API key is not configured")]
    MissingApiKey,

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The provider refused to answer because of its content filters.
    #[error("blocked by safety filter: {0}")]
    SafetyBlocked(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Short operator-facing hint about what to check.
    pub fn hint(&self) -> &'static str {
        match self {
            ProviderError::AuthenticationFailed(_) | ProviderError::MissingApiKey => {
                "check the provider API key"
            }
            ProviderError::RateLimited { .. } => "check provider usage limits",
            ProviderError::SafetyBlocked(_) => "content safety filter triggered",
            ProviderError::Timeout(_) | ProviderError::NetworkError(_) => {
                "check network connectivity"
            }
            ProviderError::ModelNotFound(_) => "check the configured model name",
            ProviderError::ApiError { .. } | ProviderError::InvalidResponse(_) => {
                "provider returned an unexpected response"
            }
        }
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_cover_key_and_quota() {
        assert_eq!(ProviderError::MissingApiKey.hint(), "check the provider API key");
        assert_eq!(
            ProviderError::RateLimited { retry_after_ms: 10 }.hint(),
            "check provider usage limits"
        );
        assert_eq!(
            ProviderError::RateLimited { retry_after_ms: 10 }.retry_after_ms(),
            Some(10)
        );
        assert_eq!(ProviderError::Timeout(5).retry_after_ms(), None);
    }

    #[test]
    fn display_mentions_status() {
        let e = ProviderError::ApiError {
            status: 503,
            message: "overloaded".into(),
        };
        assert_eq!(e.to_string(), "API error (HTTP 503): overloaded");
    }
}
