//! Shared request plumbing.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Build the HTTP client every provider shares.
pub fn http_client(timeout: Duration) -> Result<Client> {
  Ok(
    Client::builder()
      .timeout(timeout)
      .user_agent(concat!("grace/", env!("CARGO_PKG_VERSION")))
      .build()?,
  )
}

/// Read a response body; a 404 is a clean not-found.
pub(crate) async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<Option<T>> {
  let status = response.status();
  let body = response.text().await?;
  decode_body(status, &body)
}

pub(crate) fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<Option<T>> {
  if status == StatusCode::NOT_FOUND {
    return Ok(None);
  }
  if !status.is_success() {
    return Err(Error::Api { status_code: status.as_u16(), message: body.to_owned() });
  }
  let deserializer = &mut serde_json::Deserializer::from_str(body);
  serde_path_to_error::deserialize(deserializer)
    .map(Some)
    .map_err(|e| Error::Json { path: e.path().to_string(), source: e.into_inner() })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, serde::Deserialize)]
  struct Thing {
    #[allow(dead_code)]
    id: i64,
  }

  #[test]
  fn not_found_is_none() {
    let result: Option<Thing> = decode_body(StatusCode::NOT_FOUND, "{}").unwrap();
    assert!(result.is_none());
  }

  #[test]
  fn server_errors_keep_status_and_body() {
    let err = decode_body::<Thing>(StatusCode::BAD_GATEWAY, "upstream down").unwrap_err();
    match err {
      Error::Api { status_code, message } => {
        assert_eq!(status_code, 502);
        assert_eq!(message, "upstream down");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn decode_errors_carry_a_path() {
    let err = decode_body::<Thing>(StatusCode::OK, r#"{"id":"seven"}"#).unwrap_err();
    match err {
      Error::Json { path, .. } => assert_eq!(path, "id"),
      other => panic!("unexpected error: {other}"),
    }
  }
}
