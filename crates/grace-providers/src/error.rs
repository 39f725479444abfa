//! Error type for `grace-providers`.

use grace_core::provider::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("API error: {status_code} - {message}")]
  Api { status_code: u16, message: String },

  #[error("failed to parse JSON response at {path}: {source}")]
  Json {
    path:   String,
    #[source]
    source: serde_json::Error,
  },

  #[error("authentication failed: {0}")]
  Auth(String),
}

impl From<Error> for ProviderError {
  fn from(err: Error) -> Self {
    match err {
      Error::Request(e) => ProviderError::Request(Box::new(e)),
      Error::Api { status_code, message } => ProviderError::Api { status_code, message },
      e @ Error::Json { .. } => ProviderError::Decode(e.to_string()),
      Error::Auth(message) => ProviderError::Authentication(message),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
