//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::envelope::Envelope;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  /// Provider and storage failures alike; details are logged, not returned.
  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<grace_core::Error> for ApiError {
  fn from(err: grace_core::Error) -> Self {
    match err {
      grace_core::Error::InvalidInput(message) => ApiError::BadRequest(message),
      other => ApiError::Internal(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::BadRequest(message) => {
        Envelope::message(StatusCode::BAD_REQUEST, message).into_response()
      }
      ApiError::Internal(err) => {
        error!(error = %err, "request failed");
        Envelope::message(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
          .into_response()
      }
    }
  }
}
