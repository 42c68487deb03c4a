//! Request handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::error::ApiError;
use super::AppState;
use crate::agent::DEFAULT_MAX_RESULTS;
use crate::error::Error;
use crate::gmail::MessageSummary;
use crate::session::{SharedAgent, DEFAULT_SESSION};

/// Header carrying the caller's session id.
///
/// Session ids are chosen by the client and are not authenticated: anyone
/// who knows an id can use that session, and the OAuth `state` returned to
/// `/auth/callback` names the session that receives the new credentials.
pub const SESSION_HEADER: &str = "x-session-id";

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_SESSION)
        .to_string()
}

/// Existing session for the request; only the OAuth callback creates sessions
async fn authenticated_session(state: &AppState, headers: &HeaderMap) -> Result<SharedAgent, ApiError> {
    state
        .sessions
        .get(&session_id(headers))
        .await
        .ok_or_else(|| Error::NotAuthenticated.into())
}

#[derive(Debug, Serialize)]
pub struct AuthUrlResponse {
    pub url: String,
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub emails: Vec<MessageSummary>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub email_id: String,
    pub analysis: String,
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Gmail Agent API is running" }))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "environment": state.config.environment,
    }))
}

/// Google consent URL; the session id rides along as OAuth `state`
pub async fn auth(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ApiResult<AuthUrlResponse> {
    let session_id = session_id(&headers);
    let url = state.oauth.build_authorization_url(Some(session_id.as_str()))?;
    Ok(Json(AuthUrlResponse { url, session_id }))
}

pub async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> ApiResult<CallbackResponse> {
    if let Some(err) = params.error {
        let description = params
            .error_description
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(Error::Auth(format!("Authorization failed: {} - {}", err, description)).into());
    }

    let code = params
        .code
        .ok_or_else(|| ApiError::BadRequest("Missing authorization code".to_string()))?;
    let session_id = params
        .state
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION.to_string());

    let bundle = state.oauth.exchange_code(&code).await?;
    state
        .sessions
        .get_or_create(&session_id)
        .await
        .lock()
        .await
        .set_credentials(bundle);

    info!("Session {} authenticated", session_id);

    Ok(Json(CallbackResponse {
        message: "Authentication successful".to_string(),
        session_id,
    }))
}

pub async fn search_emails(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<SearchRequest>,
) -> ApiResult<SearchResponse> {
    let agent = authenticated_session(&state, &headers).await?;
    let emails = agent
        .lock()
        .await
        .search_emails(&request.query, request.max_results.unwrap_or(DEFAULT_MAX_RESULTS))
        .await?;

    Ok(Json(SearchResponse { emails }))
}

pub async fn analyze_email(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(email_id): Path<String>,
) -> ApiResult<AnalyzeResponse> {
    let agent = authenticated_session(&state, &headers).await?;
    let result = agent.lock().await.process_email(&email_id).await?;

    Ok(Json(AnalyzeResponse {
        email_id: result.email_id,
        analysis: result.analysis,
    }))
}

pub async fn clear_context(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<Value> {
    if let Some(agent) = state.sessions.get(&session_id(&headers)).await {
        agent.lock().await.clear_context();
    }
    Json(json!({ "message": "Context cleared" }))
}
