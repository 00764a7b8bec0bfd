//! Unified HTTP error type for axum request handlers.
//!
//! [`AppError`] carries the two ways a request can fail and converts itself
//! into the matching status code and JSON body via [`IntoResponse`], so
//! handlers return `Result<T, AppError>` and propagate with `?`.
//!
//! | variant      | status | `detail`               |
//! |--------------|--------|------------------------|
//! | `NotFound`   | 404    | `not_found`            |
//! | `Upstream`   | 502    | `upstream_unavailable` |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The requested recipe id has no record.
    #[error("not_found")]
    NotFound,

    /// The call to the recipe producer failed or returned something unusable.
    #[error("upstream request failed: {0:#}")]
    Upstream(anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::NotFound => json!({ "detail": "not_found" }),
            Self::Upstream(e) => {
                tracing::warn!(error = %format!("{e:#}"), "upstream error");
                json!({ "detail": "upstream_unavailable", "error": format!("{e:#}") })
            }
        };
        (status, Json(body)).into_response()
    }
}
