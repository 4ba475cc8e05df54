//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use carshop_core::store::{Failure, StoreError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("unsupported media type: {0}")]
  UnsupportedMediaType(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error: conflicts and missing targets become client
  /// errors, everything else is a server error.
  pub fn store<E: StoreError>(e: E) -> Self {
    match e.failure() {
      Failure::Conflict => ApiError::Conflict(e.to_string()),
      Failure::TargetMissing | Failure::OwnerMissing => {
        ApiError::NotFound(e.to_string())
      }
      Failure::Other => ApiError::Store(Box::new(e)),
    }
  }
}

impl From<carshop_core::Error> for ApiError {
  fn from(e: carshop_core::Error) -> Self {
    use carshop_core::Error as E;
    match e {
      E::IdMismatch { .. } | E::InvalidFileName(_) => {
        ApiError::BadRequest(e.to_string())
      }
      E::UnsupportedMediaType(_) => ApiError::UnsupportedMediaType(e.to_string()),
      E::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
        ApiError::NotFound("file not found".to_owned())
      }
      E::Io(io) => ApiError::Store(Box::new(io)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::UnsupportedMediaType(m) => {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, m.clone())
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
