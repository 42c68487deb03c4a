//! HTTP server
//!
//! Routes:
//! - `GET /` and `GET /health`
//! - `GET /auth`, `GET /auth/callback`
//! - `POST /emails/search`, `POST /emails/analyze/:email_id`
//! - `DELETE /context`

mod error;
mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::agent::{AgentServices, GeminiClient};
use crate::auth::GoogleOAuth;
use crate::config::Config;
use crate::error::Error;
use crate::gmail::GmailClient;
use crate::session::SessionStore;
use crate::Result;

pub use error::ApiError;
pub use handlers::SESSION_HEADER;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub oauth: GoogleOAuth,
    pub sessions: SessionStore,
}

impl AppState {
    /// Wire the real Google, Gmail and Gemini clients
    pub fn new(config: Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let oauth = GoogleOAuth::new(config.google.clone(), http_client.clone());
        let services = AgentServices {
            mail: Arc::new(GmailClient::new(&config.gmail_api_url, http_client.clone())),
            llm: Arc::new(GeminiClient::new(&config.gemini, http_client)),
            oauth,
        };

        Ok(Self::with_services(config, services))
    }

    /// Build state around caller-supplied collaborators
    pub fn with_services(config: Config, services: AgentServices) -> Self {
        let oauth = services.oauth.clone();
        let sessions = SessionStore::new(services, config.context_capacity);
        Self {
            config,
            oauth,
            sessions,
        }
    }
}

/// Build the router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/auth", get(handlers::auth))
        .route("/auth/callback", get(handlers::auth_callback))
        .route("/emails/search", post(handlers::search_emails))
        .route("/emails/analyze/:email_id", post(handlers::analyze_email))
        .route("/context", delete(handlers::clear_context))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl+C
pub async fn serve(config: Config) -> Result<()> {
    let addr = config.server.addr();
    let environment = config.environment;
    let state = Arc::new(AppState::new(config)?);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Config(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Gmail agent listening on http://{} ({})", addr, environment);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
