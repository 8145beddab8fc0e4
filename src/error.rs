//! Error types for mirror responses

use axum::{
    Json,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Caller-visible mirror errors
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// Resolution or origin failure carrying the upstream status code
    #[error("{message}")]
    EntryUnknown { status: u16, message: String },

    /// The origin could not be reached at all
    #[error("Entry not found")]
    EntryNotFound,

    /// Unrecognized repository type
    #[error("Sorry, we can't find the page you are looking for.")]
    PageNotFound,

    /// Neither organization nor repository given
    #[error("Repository not found")]
    RepoNotFound,

    /// A local cache root that must exist does not
    #[error("{0}")]
    NotFound(String),

    /// Generic failure inside the mirror (cache I/O, unreadable offline entry)
    #[error("proxy error: {0}")]
    Proxy(String),
}

pub type MirrorResult<T> = Result<T, MirrorError>;

impl MirrorError {
    pub fn proxy(message: impl Into<String>) -> Self {
        MirrorError::Proxy(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            MirrorError::EntryUnknown { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            MirrorError::EntryNotFound | MirrorError::PageNotFound | MirrorError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            MirrorError::RepoNotFound => StatusCode::UNAUTHORIZED,
            MirrorError::Proxy(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value of the `x-error-code` response header
    pub fn error_code(&self) -> &'static str {
        match self {
            MirrorError::EntryUnknown { .. } => "EntryUnknown",
            MirrorError::EntryNotFound => "EntryNotFound",
            MirrorError::PageNotFound => "PageNotFound",
            MirrorError::RepoNotFound => "RepoNotFound",
            MirrorError::NotFound(_) => "NotFound",
            MirrorError::Proxy(_) => "ProxyError",
        }
    }
}

impl IntoResponse for MirrorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        let message = match &self {
            MirrorError::Proxy(detail) => {
                tracing::error!(error = %detail, "Proxy error");
                "Proxy error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            error: message.clone(),
            timestamp: chrono::Utc::now(),
        });

        let mut response = (status, body).into_response();
        let headers = response.headers_mut();
        headers.insert("x-error-code", HeaderValue::from_static(code));
        if let Ok(value) = HeaderValue::from_str(&message) {
            headers.insert("x-error-message", value);
        }
        response
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    timestamp: chrono::DateTime<chrono::Utc>,
}
