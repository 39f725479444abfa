//! The `{status, message, data}` response envelope.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
  pub status:  u16,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data:    Option<T>,
}

impl<T> Envelope<T> {
  pub fn data(status: StatusCode, data: T) -> Self {
    Self { status: status.as_u16(), message: None, data: Some(data) }
  }

  pub fn with_message(status: StatusCode, message: impl Into<String>, data: T) -> Self {
    Self { status: status.as_u16(), message: Some(message.into()), data: Some(data) }
  }
}

impl Envelope<()> {
  pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
    Self { status: status.as_u16(), message: Some(message.into()), data: None }
  }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
  fn into_response(self) -> Response {
    let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(self)).into_response()
  }
}
