//! Error translation for songbook-api
//!
//! Every failure reaches the client through `ApiError::into_response`, so the
//! `{success: false, message}` envelope is the same whatever went wrong.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use songbook_common::Error;
use thiserror::Error;
use tracing::{error, warn};

use crate::AppState;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// No route matched the request path (404)
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    /// Path exists but not for this method (405)
    #[error("Method {method} not allowed: {path}")]
    MethodNotAllowed { method: String, path: String },

    /// Malformed request body or query string (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Error raised by the store or the aggregator
    #[error(transparent)]
    Common(#[from] Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Common(err) => match err {
                Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
                Error::NotFound(_) => StatusCode::NOT_FOUND,
                Error::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Client-facing message; internal faults never leak their text here
    pub fn public_message(&self) -> String {
        match self {
            ApiError::RouteNotFound(_) | ApiError::MethodNotAllowed { .. } => self.to_string(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Common(err) => err.public_message(),
        }
    }
}

/// Failure body returned to clients
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    /// Raw failure text, outside production only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Raw failure attached to error responses for `expose_failure_detail`
#[derive(Debug, Clone)]
pub struct FailureDetail {
    pub message: String,
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.public_message();
        let detail = self.to_string();

        if status.is_server_error() {
            error!("Request failed ({}): {}", status, detail);
        } else {
            warn!("Request rejected ({}): {}", status, detail);
        }

        let body = Json(ErrorBody {
            success: false,
            message: message.clone(),
            detail: None,
        });

        let mut response = (status, body).into_response();
        response
            .extensions_mut()
            .insert(FailureDetail { message, detail });
        response
    }
}

/// Middleware: give the router's bare 405 responses the failure envelope
///
/// The `Allow` header from the original response is kept.
pub async fn envelope_method_not_allowed(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    if response.status() != StatusCode::METHOD_NOT_ALLOWED
        || response.extensions().get::<FailureDetail>().is_some()
    {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut enveloped = ApiError::MethodNotAllowed { method, path }.into_response();
    if let Some(allow) = allow {
        enveloped.headers_mut().insert(header::ALLOW, allow);
    }
    enveloped
}

/// Middleware: re-render error bodies with the raw failure detail unless the
/// service runs in production
pub async fn expose_failure_detail(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let Some(failure) = response.extensions_mut().remove::<FailureDetail>() else {
        return response;
    };

    if state.environment.is_production() {
        return response;
    }

    let status = response.status();
    let body = Json(ErrorBody {
        success: false,
        message: failure.message,
        detail: Some(failure.detail),
    });
    (status, body).into_response()
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
