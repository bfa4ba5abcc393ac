//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! | Variant | Status | Body |
//! |---------|--------|------|
//! | `Validation`, `Rule` | 400 | `{"message", "errors"}` |
//! | `NotFound` | 404 | `{"message"}` |
//! | `Internal` | 500 | `{"message", "error"}` |

use std::any::Any;

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use people_core::{Failure, FailureKind};
use serde_json::json;
use thiserror::Error;

pub const VALIDATION_FAILED: &str = "One or more validation errors occurred";
pub const UNEXPECTED_FAILURE: &str = "An internal server error occurred";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Malformed input rejected before any use case ran.
  #[error("validation failed: {}", .errors.join("; "))]
  Validation { errors: Vec<String> },

  /// A business rule declined the request.
  #[error("rule violated: {message}")]
  Rule { message: String, errors: Vec<String> },

  #[error("not found: {0}")]
  NotFound(String),

  /// Anything the store reported, cancellation included.
  #[error("{message}: {source}")]
  Internal {
    message: &'static str,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  pub fn internal<E>(message: &'static str, source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    tracing::error!(error = %source, "{message}");
    ApiError::Internal { message, source: Box::new(source) }
  }

  pub fn validation(errors: Vec<String>) -> Self {
    tracing::warn!(?errors, "request failed validation");
    ApiError::Validation { errors }
  }
}

impl From<Failure> for ApiError {
  fn from(f: Failure) -> Self {
    match f.kind {
      FailureKind::NotFound => ApiError::NotFound(f.message),
      FailureKind::Rule => ApiError::Rule { message: f.message, errors: f.errors },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Validation { errors } => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": VALIDATION_FAILED, "errors": errors })),
      )
        .into_response(),
      ApiError::Rule { message, errors } => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": message, "errors": errors })),
      )
        .into_response(),
      ApiError::NotFound(message) => {
        (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
      }
      ApiError::Internal { message, source } => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": message, "error": source.to_string() })),
      )
        .into_response(),
    }
  }
}

/// Responder for `CatchPanicLayer`: a handler panic still answers with the
/// usual 500 body.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
  let detail = if let Some(s) = panic.downcast_ref::<String>() {
    s.clone()
  } else if let Some(s) = panic.downcast_ref::<&str>() {
    (*s).to_owned()
  } else {
    "unknown panic".to_owned()
  };
  tracing::error!(panic = %detail, "handler panicked");
  (
    StatusCode::INTERNAL_SERVER_ERROR,
    Json(json!({ "message": UNEXPECTED_FAILURE, "error": detail })),
  )
    .into_response()
}
