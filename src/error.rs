//! The single failure shape of the HTTP API.
//!
//! Every handler failure becomes `500 {"message": "error", "error": <raw>}`.
//! The variants only exist so logs and `raw` can say what went wrong.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::notion::NotionError;
use crate::recipes::ShapeError;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error(transparent)]
    Upstream(#[from] NotionError),
    #[error("unexpected Notion response: {0}")]
    UnexpectedShape(#[from] ShapeError),
    #[error("malformed request body: {0}")]
    MalformedRequest(String),
}

impl ProxyError {
    /// Payload placed under `error` in the response body.
    pub fn raw(&self) -> Value {
        match self {
            ProxyError::Upstream(err) => err.to_raw(),
            ProxyError::UnexpectedShape(ShapeError::Missing { path }) => json!({
                "code": "unexpected_shape",
                "path": path,
                "message": self.to_string(),
            }),
            ProxyError::MalformedRequest(reason) => json!({
                "code": "malformed_request",
                "message": reason,
            }),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let raw = self.raw();
        tracing::error!(error = %self, raw = %raw, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "error", "error": raw })),
        )
            .into_response()
    }
}
