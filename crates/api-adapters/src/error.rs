//! # ApiError
//!
//! The few failures the web layer surfaces. Store failures never get here:
//! services log them and report an outcome instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domains::AuthError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("template rendering failed: {0}")]
    Render(#[from] askama::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("metrics encoding failed")]
    Metrics(#[from] std::fmt::Error),

    #[error("not found")]
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            other => {
                tracing::error!(error = %other, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
