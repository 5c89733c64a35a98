use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use clipwall_library::{ResolveError, SetRootError};
use thiserror::Error;
use tracing::{debug, error};

/// Errors surfaced by the HTTP handlers.
///
/// Renders as `{"error": ...}` JSON. Wrap in [`PlainText`] for endpoints whose
/// clients expect a text body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    ClientInput(&'static str),
    #[error("Forbidden")]
    PathConfinement,
    #[error("Not found")]
    NotFound,
    #[error("Range not satisfiable")]
    RangeNotSatisfiable { total: u64 },
    #[error("{context}")]
    Server {
        context: &'static str,
        cause: anyhow::Error,
    },
}

impl ApiError {
    pub fn server(context: &'static str, cause: impl Into<anyhow::Error>) -> Self {
        ApiError::Server {
            context,
            cause: cause.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ClientInput(_) => StatusCode::BAD_REQUEST,
            ApiError::PathConfinement => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            ApiError::Server { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn log(&self) {
        match self {
            ApiError::Server { context, cause } => error!("{context}: {cause:#}"),
            other => debug!(status = %other.status(), "request rejected: {other}"),
        }
    }

    fn into_parts(self, body: impl IntoResponse) -> Response {
        self.log();
        let status = self.status();
        match self {
            ApiError::RangeNotSatisfiable { total } => (
                status,
                [(header::CONTENT_RANGE, format!("bytes */{total}"))],
            )
                .into_response(),
            _ => (status, body).into_response(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        self.into_parts(body)
    }
}

/// Plain-text rendering of [`ApiError`]; server errors carry no detail.
#[derive(Debug)]
pub struct PlainText(pub ApiError);

impl From<ApiError> for PlainText {
    fn from(err: ApiError) -> Self {
        PlainText(err)
    }
}

impl IntoResponse for PlainText {
    fn into_response(self) -> Response {
        let body = match &self.0 {
            ApiError::Server { .. } => "Error".to_string(),
            other => other.to_string(),
        };
        self.0.into_parts(body)
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::InvalidPath | ResolveError::Traversal => ApiError::ClientInput("Bad path"),
            ResolveError::OutsideRoot => ApiError::PathConfinement,
            ResolveError::NotFound(_) => ApiError::NotFound,
            ResolveError::Io(err) => ApiError::server("Failed to open video", err),
        }
    }
}

impl From<SetRootError> for ApiError {
    fn from(err: SetRootError) -> Self {
        match err {
            SetRootError::Missing => ApiError::ClientInput("newRoot is required"),
            SetRootError::NotADirectory(_) => ApiError::ClientInput("Path is not an existing directory"),
            SetRootError::Index(err) => ApiError::server("Failed to set root", err),
        }
    }
}
