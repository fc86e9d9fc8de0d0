//! HTTP API for learnforge.
//!
//! Routes live under `/api`: account and OAuth sign-in (`/api/auth`), AI
//! generation (`/api/ai`), and per-user quizzes, learning paths and progress.
//! All bodies are JSON; errors are `{"error": ...}`.

pub mod auth;
pub mod error;
pub mod routes;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use learnforge_core::gateway::GenerationGateway;
use learnforge_core::traits::IdentityProvider;
use learnforge_providers::{create_identity_providers, LearnforgeConfig};
use learnforge_store::Store;

pub use auth::{AuthUser, Claims, TokenIssuer};
pub use error::ApiError;

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub gateway: Arc<GenerationGateway>,
    pub tokens: Arc<TokenIssuer>,
    pub identity_providers: Arc<HashMap<String, Arc<dyn IdentityProvider>>>,
    /// Front-end origin that OAuth callbacks redirect back to.
    pub client_url: Arc<str>,
}

impl AppState {
    pub fn new(store: Store, gateway: GenerationGateway, tokens: TokenIssuer) -> Self {
        Self {
            store,
            gateway: Arc::new(gateway),
            tokens: Arc::new(tokens),
            identity_providers: Arc::new(HashMap::new()),
            client_url: Arc::from("http://localhost:5173"),
        }
    }

    pub fn with_identity_providers(
        mut self,
        providers: HashMap<String, Arc<dyn IdentityProvider>>,
    ) -> Self {
        self.identity_providers = Arc::new(providers);
        self
    }

    pub fn with_client_url(mut self, url: &str) -> Self {
        self.client_url = Arc::from(url.trim_end_matches('/'));
        self
    }

    /// Open the database and build the gateway and OAuth clients from config.
    pub fn from_config(config: &LearnforgeConfig) -> anyhow::Result<Self> {
        if config.auth.jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT secret is not set. Set JWT_SECRET or [auth].jwt_secret in learnforge.toml");
        }

        let store = Store::open(&config.database.path).with_context(|| {
            format!("failed to open database {}", config.database.path.display())
        })?;
        let gateway = config.gateway(None, None)?;
        let tokens = TokenIssuer::new(&config.auth.jwt_secret, config.auth.token_ttl_secs);
        let identity = create_identity_providers(config);

        tracing::info!(
            provider = gateway.provider_name(),
            model = gateway.model(),
            oauth = ?identity.keys().collect::<Vec<_>>(),
            "server state ready"
        );

        Ok(AppState::new(store, gateway, tokens)
            .with_identity_providers(identity)
            .with_client_url(&config.server.client_url))
    }
}

/// The full API router with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/auth", routes::auth::router())
        .nest("/api/ai", routes::ai::router())
        .nest("/api/quiz", routes::quiz::router())
        .nest("/api/learning-paths", routes::learning_paths::router())
        .nest("/api/progress", routes::progress::router())
        .merge(routes::health::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the given browser origins. Unparseable origins are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: &LearnforgeConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let app = router(state).layer(cors_layer(&config.server.cors_origins));

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    tracing::info!(addr = %listener.local_addr()?, "learnforge server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
