//! HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::Error;

/// Error returned by request handlers, rendered as `{"detail": "..."}`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Agent(Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Agent(Error::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Agent(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Agent(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Agent(err) => {
                if status.is_server_error() {
                    tracing::error!("Request failed: {}", err);
                }
                err.to_string()
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
