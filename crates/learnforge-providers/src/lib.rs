//! learnforge-providers: Generation and identity provider integrations.
//!
//! Implements `GenerationProvider` for Google's Gemini API (plus a mock for
//! tests and offline use) and `IdentityProvider` for Google and GitHub
//! OAuth sign-in, together with the TOML configuration that wires them up.

pub mod config;
pub mod gemini;
pub mod mock;
pub mod oauth;

pub use config::{
    create_identity_providers, create_provider, load_config, load_config_from, LearnforgeConfig,
    OAuthClientConfig, ProviderConfig,
};
pub use learnforge_core::error::ProviderError;
