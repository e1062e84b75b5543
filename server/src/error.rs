//! Error handling.
//!
//! Every failure a handler can produce is a [`ServerError`] wrapping an
//! [`ErrorKind`]. Errors are rendered to the client as a structured JSON
//! envelope (`code`, `error`, `message`) so callers can distinguish
//! validation failures, persistence failures and the not-found signal
//! without string matching.

use std::error::Error as StdError;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use displaydoc::Display;
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// The kind of an error.
#[derive(Debug, Display)]
pub enum ErrorKind {
    /// The requested project does not exist
    NoSuchProject,

    /// Invalid request: {0}
    RequestError(anyhow::Error),

    /// Database error: {0}
    DatabaseError(anyhow::Error),
}

/// An error that can be rendered into an API response.
#[derive(Debug)]
pub struct ServerError {
    kind: ErrorKind,
}

impl ServerError {
    pub fn request_error(error: impl Into<anyhow::Error>) -> Self {
        ErrorKind::RequestError(error.into()).into()
    }

    pub fn database_error(error: impl Into<anyhow::Error>) -> Self {
        ErrorKind::DatabaseError(error.into()).into()
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl ErrorKind {
    /// The stable name of this error kind, as sent to clients.
    fn name(&self) -> &'static str {
        match self {
            Self::NoSuchProject => "NoSuchProject",
            Self::RequestError(_) => "RequestError",
            Self::DatabaseError(_) => "DatabaseError",
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            Self::NoSuchProject => StatusCode::NOT_FOUND,
            Self::RequestError(_) => StatusCode::BAD_REQUEST,
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ErrorKind> for ServerError {
    fn from(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl StdError for ServerError {}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.kind.http_status();

        if status.is_server_error() {
            tracing::error!("{}", self.kind);
        }

        let body = json!({
            "code": status.as_u16(),
            "error": self.kind.name(),
            "message": self.kind.to_string(),
        });

        (status, Json(body)).into_response()
    }
}
